use itertools::Itertools;
use omega_membership::{prelude::*, word::RESERVED};
use thiserror::Error;
use tracing::trace;

/// Errors that can occur while reading an automaton in the text format understood by [`parse_automaton`].
/// Line numbers start at 1.
#[derive(Debug, Error)]
pub enum AutomatonFormatError {
    #[error("could not read automaton: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: unknown header `{header}`")]
    UnknownHeader { line: usize, header: String },
    #[error("line {line}: header `{header}` is given more than once")]
    DuplicateHeader { line: usize, header: String },
    #[error("line {line}: expected `source symbol target`, found `{content}`")]
    MalformedTransition { line: usize, content: String },
    #[error("line {line}: `{symbol}` is not a single character")]
    InvalidSymbol { line: usize, symbol: String },
    #[error("line {line}: `{symbol}` is reserved for expressions and cannot be a symbol")]
    ReservedSymbol { line: usize, symbol: char },
    #[error("line {line}: header `{header}` expects exactly one state, found {found}")]
    InvalidInitial {
        line: usize,
        header: String,
        found: usize,
    },
    #[error("the automaton does not declare any states")]
    MissingStates,
}

fn symbol(line: usize, token: &str) -> Result<char, AutomatonFormatError> {
    let Some((sym,)) = token.chars().collect_tuple() else {
        return Err(AutomatonFormatError::InvalidSymbol {
            line,
            symbol: token.to_string(),
        });
    };
    if RESERVED.contains(&sym) {
        return Err(AutomatonFormatError::ReservedSymbol { line, symbol: sym });
    }
    Ok(sym)
}

/// Reads an automaton from its textual description. Everything after a `#` is a comment, blank lines
/// are ignored. Header lines have the form `name: values` for the names `states`, `alphabet`, `initial`
/// and `accepting`, all other lines are transitions `source symbol target`.
///
/// ```text
/// # a occurs finitely often
/// states: q0 q1
/// alphabet: a b
/// initial: q0
/// accepting: q1
/// q0 a q0
/// q0 b q1
/// q1 b q1
/// ```
///
/// The alphabet defaults to the symbols used by transitions, the initial state to the first declared
/// state.
pub fn parse_automaton(input: &str) -> Result<Automaton, AutomatonFormatError> {
    let mut builder = AutomatonBuilder::default();
    let mut seen_headers: Vec<&str> = vec![];
    let mut has_states = false;
    let mut has_alphabet = false;
    let mut used_symbols = vec![];

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        if let Some((header, values)) = content.split_once(':') {
            let header = header.trim();
            if seen_headers.contains(&header) {
                return Err(AutomatonFormatError::DuplicateHeader {
                    line,
                    header: header.to_string(),
                });
            }
            let values = values.split_whitespace().collect_vec();
            builder = match header {
                "states" => {
                    has_states = !values.is_empty();
                    builder.with_states(values)
                }
                "alphabet" => {
                    has_alphabet = true;
                    let symbols = values
                        .iter()
                        .map(|token| symbol(line, token))
                        .collect::<Result<Vec<_>, _>>()?;
                    builder.with_alphabet(symbols)
                }
                "initial" => match values.as_slice() {
                    [initial] => builder.with_initial(*initial),
                    _ => {
                        return Err(AutomatonFormatError::InvalidInitial {
                            line,
                            header: header.to_string(),
                            found: values.len(),
                        })
                    }
                },
                "accepting" => builder.with_accepting(values),
                _ => {
                    return Err(AutomatonFormatError::UnknownHeader {
                        line,
                        header: header.to_string(),
                    })
                }
            };
            trace!("read header {header} in line {line}");
            seen_headers.push(header);
            continue;
        }

        let Some((source, sym, target)) = content.split_whitespace().collect_tuple() else {
            return Err(AutomatonFormatError::MalformedTransition {
                line,
                content: content.to_string(),
            });
        };
        let sym = symbol(line, sym)?;
        if !used_symbols.contains(&sym) {
            used_symbols.push(sym);
        }
        builder = builder.with_transitions([(source, sym, target)]);
    }

    if !has_states {
        return Err(AutomatonFormatError::MissingStates);
    }
    if !has_alphabet {
        builder = builder.with_alphabet(used_symbols);
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::{parse_automaton, AutomatonFormatError};
    use omega_membership::prelude::*;

    const FINITELY_MANY_A: &str = "
        # a occurs finitely often
        states: q0 q1
        alphabet: a b
        initial: q0
        accepting: q1   # the b state
        q0 a q0
        q0 b q1
        q1 b q1
    ";

    #[test]
    fn reads_automaton() {
        let automaton = parse_automaton(FINITELY_MANY_A).unwrap();
        assert_eq!(automaton.states(), ["q0", "q1"]);
        assert_eq!(automaton.alphabet().size(), 2);
        assert_eq!(automaton.initial(), "q0");
        assert!(automaton.is_accepting("q1"));
        assert_eq!(automaton.transitions().len(), 3);

        assert!(check(&automaton, "a b^w").unwrap().accepted);
        assert!(!check(&automaton, "(ab)^w").unwrap().accepted);
    }

    #[test]
    fn defaults() {
        let automaton = parse_automaton("states: p q\np b q\nq a p").unwrap();
        assert_eq!(automaton.initial(), "p");
        assert_eq!(automaton.alphabet().universe().collect::<String>(), "ba");
        assert!(automaton.accepting().is_empty());
    }

    #[test]
    fn reports_errors_with_lines() {
        assert!(matches!(
            parse_automaton("states: p\nfinal: p"),
            Err(AutomatonFormatError::UnknownHeader { line: 2, .. })
        ));
        assert!(matches!(
            parse_automaton("states: p\nstates: q"),
            Err(AutomatonFormatError::DuplicateHeader { line: 2, .. })
        ));
        assert!(matches!(
            parse_automaton("states: p\n\np a"),
            Err(AutomatonFormatError::MalformedTransition { line: 3, .. })
        ));
        assert!(matches!(
            parse_automaton("states: p\np ab p"),
            Err(AutomatonFormatError::InvalidSymbol { line: 2, .. })
        ));
        assert!(matches!(
            parse_automaton("states: p\nalphabet: a *"),
            Err(AutomatonFormatError::ReservedSymbol { symbol: '*', .. })
        ));
        assert!(matches!(
            parse_automaton("states: p q\ninitial: p q"),
            Err(AutomatonFormatError::InvalidInitial {
                line: 2,
                found: 2,
                ..
            })
        ));
        assert!(matches!(
            parse_automaton("states: p q\ninitial:   # to be decided"),
            Err(AutomatonFormatError::InvalidInitial {
                line: 2,
                found: 0,
                ..
            })
        ));
        assert!(matches!(
            parse_automaton("# nothing here\n"),
            Err(AutomatonFormatError::MissingStates)
        ));
    }

    #[test]
    fn error_messages() {
        let err = parse_automaton("states: p\np ab p").unwrap_err();
        assert_eq!(err.to_string(), "line 2: `ab` is not a single character");

        let err = parse_automaton("states: p\ninitial:").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 2: header `initial` expects exactly one state, found 0"
        );
    }
}
