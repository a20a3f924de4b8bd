use std::fmt::{Display, Formatter};

use thiserror::Error;
use tracing::debug;

use super::{parse_regex, RegexNode, RegexSyntaxError};

/// Represents the types of errors that can occur when parsing an omega word expression.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum OmegaWordError {
    /// The text is not a syntactically valid expression.
    #[error("syntax error: {0}")]
    Syntax(#[from] RegexSyntaxError),
    /// The expression contains no omega suffix.
    #[error("no omega suffix found, the expression must end with `^w` or `^ω`")]
    MissingOmega,
    /// The expression contains more than one omega suffix.
    #[error("multiple omega suffixes found ({0}), exactly one is allowed")]
    MultipleOmega(usize),
    /// The only omega suffix is not in trailing position.
    #[error("the omega suffix must apply to the last part of the expression, it may not be nested in a union, repetition or group")]
    OmegaNotTrailing,
}

/// An omega word expression `u v^w` that has been split into its finite prefix `u` and
/// the loop `v` that is repeated infinitely often. The omega node itself is stripped.
///
/// # Example
/// ```
/// use omega_membership::word::{parse_omega_word, RegexNode};
///
/// let word = parse_omega_word("a (bc)^w").unwrap();
/// assert_eq!(word.prefix(), Some(&RegexNode::Literal('a')));
/// assert_eq!(word.omega(), &RegexNode::word("bc"));
/// assert_eq!(word.to_string(), "a(bc)^w");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedOmegaWord {
    prefix: Option<RegexNode>,
    omega: RegexNode,
}

impl ParsedOmegaWord {
    /// Creates a new instance from its parts.
    pub fn new(prefix: Option<RegexNode>, omega: RegexNode) -> Self {
        Self { prefix, omega }
    }

    /// The finite prefix, if there is one.
    pub fn prefix(&self) -> Option<&RegexNode> {
        self.prefix.as_ref()
    }

    /// The expression that is repeated infinitely often.
    pub fn omega(&self) -> &RegexNode {
        &self.omega
    }

    /// Checks that `tree` contains exactly one omega node which is either the whole tree or the
    /// last element of a top level concatenation, and splits it accordingly.
    pub fn decompose(tree: RegexNode) -> Result<Self, OmegaWordError> {
        match tree.omega_count() {
            0 => return Err(OmegaWordError::MissingOmega),
            1 => {}
            n => return Err(OmegaWordError::MultipleOmega(n)),
        }

        match tree {
            RegexNode::Omega(inner) => Ok(Self::new(None, *inner)),
            RegexNode::Concat(mut factors) => match factors.pop() {
                Some(RegexNode::Omega(inner)) => {
                    let prefix = if factors.len() == 1 {
                        factors.remove(0)
                    } else {
                        RegexNode::Concat(factors)
                    };
                    Ok(Self::new(Some(prefix), *inner))
                }
                _ => Err(OmegaWordError::OmegaNotTrailing),
            },
            _ => Err(OmegaWordError::OmegaNotTrailing),
        }
    }
}

impl Display for ParsedOmegaWord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(prefix) = &self.prefix {
            if matches!(prefix, RegexNode::Union(_)) {
                write!(f, "({prefix})")?;
            } else {
                write!(f, "{prefix}")?;
            }
        }
        write!(f, "{}", self.omega.clone().omega())
    }
}

/// Parses an omega word expression and splits it into prefix and loop, see [`ParsedOmegaWord`].
///
/// # Example
/// ```
/// use omega_membership::word::{parse_omega_word, OmegaWordError};
///
/// assert!(parse_omega_word("a b^w").is_ok());
/// assert_eq!(parse_omega_word("(ab)^w|c"), Err(OmegaWordError::OmegaNotTrailing));
/// assert_eq!(parse_omega_word("ab"), Err(OmegaWordError::MissingOmega));
/// assert_eq!(parse_omega_word("a^w b^w"), Err(OmegaWordError::MultipleOmega(2)));
/// ```
pub fn parse_omega_word(input: &str) -> Result<ParsedOmegaWord, OmegaWordError> {
    let tree = parse_regex(input)?;
    let word = ParsedOmegaWord::decompose(tree)?;
    debug!(
        "split {input:?} into prefix {} and loop {}",
        word.prefix
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "ε".to_string()),
        word.omega
    );
    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::{parse_omega_word, OmegaWordError::*, ParsedOmegaWord};
    use crate::word::{parse_regex, RegexNode::*, RegexSyntaxError};

    #[test]
    fn decomposition() {
        let word = parse_omega_word("(ab)^w").unwrap();
        assert_eq!(word.prefix(), None);
        assert_eq!(word.omega(), &Concat(vec![Literal('a'), Literal('b')]));

        let word = parse_omega_word("a b* c^ω").unwrap();
        assert_eq!(
            word.prefix(),
            Some(&Concat(vec![Literal('a'), Literal('b').star()]))
        );
        assert_eq!(word.omega(), &Literal('c'));

        let word = parse_omega_word("(a b^w)").unwrap();
        assert_eq!(word.prefix(), Some(&Literal('a')));
    }

    #[test]
    fn placement_errors() {
        assert_eq!(parse_omega_word("(ab)^w|c"), Err(OmegaNotTrailing));
        assert_eq!(parse_omega_word("a^w b"), Err(OmegaNotTrailing));
        assert_eq!(parse_omega_word("(a^w)*"), Err(OmegaNotTrailing));
        assert_eq!(parse_omega_word("x(a b^w)"), Err(OmegaNotTrailing));
        assert_eq!(parse_omega_word("ab*"), Err(MissingOmega));
        assert_eq!(parse_omega_word("(a^w)^w"), Err(MultipleOmega(2)));
        assert_eq!(parse_omega_word("a^w|b^w|c^w"), Err(MultipleOmega(3)));
        assert_eq!(
            parse_omega_word("a^"),
            Err(Syntax(RegexSyntaxError::MalformedOmega { position: 1 }))
        );
    }

    #[test]
    fn accepted_trees_have_trailing_omega() {
        for text in ["a^w", "ab^w", "(a|b)*(ab)+^w", "a(b|c^w)", "((a)b)^w|c^w"] {
            let tree = parse_regex(text).unwrap();
            let trailing = match &tree {
                Omega(_) => tree.omega_count() == 1,
                Concat(factors) => {
                    tree.omega_count() == 1 && matches!(factors.last(), Some(Omega(_)))
                }
                _ => false,
            };
            assert_eq!(
                ParsedOmegaWord::decompose(tree).is_ok(),
                trailing,
                "mismatch for {text}"
            );
        }
    }

    #[test]
    fn display_round_trip() {
        for text in ["a b^w", "(a|b) c^w", "(ab)^w", "a(b|c)*(d+e)^w"] {
            let word = parse_omega_word(text).unwrap();
            assert_eq!(parse_omega_word(&word.to_string()).unwrap(), word);
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            parse_omega_word("a)").unwrap_err().to_string(),
            "syntax error: unparsed trailing input starting at position 1"
        );
        assert!(MissingOmega.to_string().contains("no omega suffix"));
    }
}
