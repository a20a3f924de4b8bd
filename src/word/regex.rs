use std::fmt::{Display, Formatter};

/// Syntax tree of an omega-regular expression over single-character symbols.
///
/// A tree produced by [`crate::word::parse_regex`] never contains a [`RegexNode::Concat`] or
/// [`RegexNode::Union`] with fewer than two children, operands that consist of a single
/// element are returned as that element.
///
/// The [`Display`] implementation gives a canonical textual form which uses the minimal amount of
/// parentheses and always writes the omega suffix as `^w`. Parsing the canonical form yields a
/// tree that is structurally equal to the original one.
/// ```
/// use omega_membership::word::{parse_regex, RegexNode};
///
/// let tree = parse_regex("( a | (b) )  c* ^ω").unwrap();
/// assert_eq!(tree.to_string(), "(a|b)c*^w");
/// assert_eq!(parse_regex(&tree.to_string()).unwrap(), tree);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegexNode {
    /// A single symbol.
    Literal(char),
    /// Juxtaposition of the children, in order.
    Concat(Vec<RegexNode>),
    /// Choice between the children.
    Union(Vec<RegexNode>),
    /// Zero or more repetitions.
    Star(Box<RegexNode>),
    /// One or more repetitions.
    Plus(Box<RegexNode>),
    /// Infinite repetition.
    Omega(Box<RegexNode>),
}

impl RegexNode {
    /// Wraps `self` in a [`RegexNode::Star`].
    pub fn star(self) -> Self {
        Self::Star(Box::new(self))
    }

    /// Wraps `self` in a [`RegexNode::Plus`].
    pub fn plus(self) -> Self {
        Self::Plus(Box::new(self))
    }

    /// Wraps `self` in a [`RegexNode::Omega`].
    pub fn omega(self) -> Self {
        Self::Omega(Box::new(self))
    }

    /// Builds the concatenation of the given literal symbols, e.g. `RegexNode::word("ab")`
    /// is the same as parsing `ab`. A word of length one gives a plain literal.
    ///
    /// # Panics
    /// If `word` is empty, as there is no node representing the empty word.
    pub fn word(word: &str) -> Self {
        let mut literals: Vec<_> = word.chars().map(RegexNode::Literal).collect();
        assert!(!literals.is_empty(), "cannot build a node for the empty word");
        if literals.len() == 1 {
            literals.remove(0)
        } else {
            Self::Concat(literals)
        }
    }

    /// Returns the number of [`RegexNode::Omega`] nodes anywhere in the tree.
    pub fn omega_count(&self) -> usize {
        match self {
            RegexNode::Literal(_) => 0,
            RegexNode::Concat(children) | RegexNode::Union(children) => {
                children.iter().map(RegexNode::omega_count).sum()
            }
            RegexNode::Star(child) | RegexNode::Plus(child) => child.omega_count(),
            RegexNode::Omega(child) => 1 + child.omega_count(),
        }
    }

    /// Binding strength, used to decide where parentheses are needed when printing.
    fn precedence(&self) -> u8 {
        match self {
            RegexNode::Union(_) => 0,
            RegexNode::Concat(_) => 1,
            RegexNode::Star(_) | RegexNode::Plus(_) => 2,
            RegexNode::Omega(_) => 3,
            RegexNode::Literal(_) => 4,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, parenthesize: bool) -> std::fmt::Result {
        if parenthesize {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl Display for RegexNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RegexNode::Literal(sym) => write!(f, "{sym}"),
            RegexNode::Union(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    // a nested union would be flattened when reading it back
                    child.fmt_operand(f, matches!(child, RegexNode::Union(_)))?;
                }
                Ok(())
            }
            RegexNode::Concat(children) => {
                for child in children {
                    child.fmt_operand(f, child.precedence() <= 1)?;
                }
                Ok(())
            }
            RegexNode::Star(child) | RegexNode::Plus(child) => {
                // repeats may be stacked (`a*+`), anything binding weaker or an omega needs parentheses
                let parenthesize = !matches!(
                    **child,
                    RegexNode::Literal(_) | RegexNode::Star(_) | RegexNode::Plus(_)
                );
                child.fmt_operand(f, parenthesize)?;
                if matches!(self, RegexNode::Star(_)) {
                    write!(f, "*")
                } else {
                    write!(f, "+")
                }
            }
            RegexNode::Omega(child) => {
                let parenthesize = !matches!(
                    **child,
                    RegexNode::Literal(_) | RegexNode::Star(_) | RegexNode::Plus(_)
                );
                child.fmt_operand(f, parenthesize)?;
                write!(f, "^w")
            }
        }
    }
}
