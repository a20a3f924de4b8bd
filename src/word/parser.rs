use thiserror::Error;
use tracing::trace;

use super::RegexNode;

/// Characters that can never be used as a literal symbol.
pub const RESERVED: [char; 6] = ['(', ')', '|', '*', '+', '^'];

/// Maximal number of nested parentheses and postfix operators on a single operand. Trees
/// produced by [`parse_regex`] are therefore of bounded depth.
pub const MAX_NESTING: usize = 500;

/// Abstracts the syntax errors that can occur when parsing an omega-regular expression. Positions
/// are 0-based offsets counted in characters (not bytes).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RegexSyntaxError {
    /// The input contains nothing but whitespace.
    #[error("expression is empty")]
    Empty,
    /// A character that cannot start or continue an expression at this point.
    #[error("unexpected character `{character}` at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Where it was found.
        position: usize,
    },
    /// The input ended while an operand was still expected.
    #[error("unexpected end of input at position {position}")]
    UnexpectedEnd {
        /// Length of the input.
        position: usize,
    },
    /// An operator was found where an operand should have been.
    #[error("missing expression before operator `{operator}` at position {position}")]
    MissingOperand {
        /// The operator lacking an operand.
        operator: char,
        /// Where the operator was found.
        position: usize,
    },
    /// Parsing finished before the whole input was consumed.
    #[error("unparsed trailing input starting at position {position}")]
    TrailingInput {
        /// Start of the remaining input.
        position: usize,
    },
    /// An opening parenthesis is never closed.
    #[error("missing closing parenthesis for `(` at position {position}")]
    UnclosedParenthesis {
        /// Position of the opening parenthesis.
        position: usize,
    },
    /// A `^` which is not followed by `w` or `ω`.
    #[error("`^` at position {position} must be followed by `w` or `ω`")]
    MalformedOmega {
        /// Position of the `^`.
        position: usize,
    },
    /// More than [`MAX_NESTING`] parentheses or postfix operators are nested.
    #[error("expression is nested too deeply at position {position}")]
    NestingTooDeep {
        /// Position of the parenthesis or operator exceeding the limit.
        position: usize,
    },
}

/// Parses the given text into a [`RegexNode`]. This only checks the syntax, the placement of
/// omega suffixes is validated by [`super::parse_omega_word`].
///
/// The grammar, from weakest to strongest binding, is
/// ```text
/// union   := concat ('|' concat)*
/// concat  := postfix postfix*
/// postfix := primary ('*' | '+')* ('^w' | '^ω')?
/// primary := literal | '(' union ')'
/// ```
/// where a literal is any non-whitespace character that is not one of `()|*+^`. Whitespace between
/// tokens is ignored.
///
/// # Example
/// ```
/// use omega_membership::word::{parse_regex, RegexNode, RegexSyntaxError};
///
/// assert_eq!(parse_regex("a^w").unwrap(), RegexNode::Literal('a').omega());
/// assert_eq!(
///     parse_regex("a|*"),
///     Err(RegexSyntaxError::MissingOperand { operator: '*', position: 2 })
/// );
/// ```
pub fn parse_regex(input: &str) -> Result<RegexNode, RegexSyntaxError> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    if parser.at_end() {
        return Err(RegexSyntaxError::Empty);
    }

    let node = parser.union()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(RegexSyntaxError::TrailingInput {
            position: parser.position,
        });
    }

    trace!("parsed {input:?} into {node}");
    Ok(node)
}

/// Recursive descent parser with an explicit cursor over the characters of the input.
struct Parser {
    chars: Vec<char>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            depth: 0,
        }
    }

    /// Enters one more level of nesting for the token at the current position.
    fn descend(&mut self) -> Result<(), RegexSyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(RegexSyntaxError::NestingTooDeep {
                position: self.position,
            });
        }
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    /// Skips whitespace and returns the next character without consuming it.
    fn lookahead(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.peek()
    }

    fn is_literal(sym: char) -> bool {
        !sym.is_whitespace() && !RESERVED.contains(&sym)
    }

    fn union(&mut self) -> Result<RegexNode, RegexSyntaxError> {
        let mut branches = vec![self.concat()?];
        while self.lookahead() == Some('|') {
            self.position += 1;
            branches.push(self.concat()?);
        }

        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            RegexNode::Union(branches)
        })
    }

    fn concat(&mut self) -> Result<RegexNode, RegexSyntaxError> {
        let mut factors = vec![];
        while let Some(sym) = self.lookahead() {
            if sym == '(' || Self::is_literal(sym) {
                factors.push(self.postfix()?);
            } else {
                break;
            }
        }

        match factors.len() {
            0 => Err(self.missing_operand()),
            1 => Ok(factors.remove(0)),
            _ => Ok(RegexNode::Concat(factors)),
        }
    }

    /// Produces the error for a position where an operand was expected but none starts.
    fn missing_operand(&self) -> RegexSyntaxError {
        match self.peek() {
            None => RegexSyntaxError::UnexpectedEnd {
                position: self.position,
            },
            Some(operator @ ('|' | '*' | '+' | '^')) => RegexSyntaxError::MissingOperand {
                operator,
                position: self.position,
            },
            Some(character) => RegexSyntaxError::UnexpectedCharacter {
                character,
                position: self.position,
            },
        }
    }

    fn postfix(&mut self) -> Result<RegexNode, RegexSyntaxError> {
        let node = self.primary()?;
        let depth = self.depth;
        let node = self.postfix_operators(node);
        self.depth = depth;
        node
    }

    fn postfix_operators(&mut self, mut node: RegexNode) -> Result<RegexNode, RegexSyntaxError> {
        loop {
            match self.lookahead() {
                Some('*') => {
                    self.descend()?;
                    self.position += 1;
                    node = node.star();
                }
                Some('+') => {
                    self.descend()?;
                    self.position += 1;
                    node = node.plus();
                }
                Some('^') => {
                    self.descend()?;
                    self.omega_suffix()?;
                    node = node.omega();
                    // nothing may be applied on top of an omega suffix
                    return match self.lookahead() {
                        Some(character @ ('*' | '+' | '^')) => {
                            Err(RegexSyntaxError::UnexpectedCharacter {
                                character,
                                position: self.position,
                            })
                        }
                        _ => Ok(node),
                    };
                }
                _ => return Ok(node),
            }
        }
    }

    /// Consumes `^w` or `^ω`, the cursor must be on the `^`.
    fn omega_suffix(&mut self) -> Result<(), RegexSyntaxError> {
        let caret = self.position;
        self.position += 1;
        match self.peek() {
            Some('w' | 'ω') => {
                self.position += 1;
                Ok(())
            }
            _ => Err(RegexSyntaxError::MalformedOmega { position: caret }),
        }
    }

    fn primary(&mut self) -> Result<RegexNode, RegexSyntaxError> {
        match self.lookahead() {
            Some('(') => {
                let open = self.position;
                self.descend()?;
                self.position += 1;
                let inner = self.union()?;
                if self.lookahead() == Some(')') {
                    self.position += 1;
                    self.depth -= 1;
                    Ok(inner)
                } else {
                    Err(RegexSyntaxError::UnclosedParenthesis { position: open })
                }
            }
            Some(sym) if Self::is_literal(sym) => {
                self.position += 1;
                Ok(RegexNode::Literal(sym))
            }
            _ => Err(self.missing_operand()),
        }
    }
}
