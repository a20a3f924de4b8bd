use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::{alphabet::CharAlphabet, math::Map, Show};

mod buchi;
pub use buchi::{check, evaluate, Evaluation, Reason};

/// A deterministic Büchi automaton as it is handed over by whoever read or constructed it.
///
/// States are referred to by name. The value is not validated beyond what is needed to evaluate
/// words on it: if the initial state is not among the declared states, every word is rejected with
/// [`Reason::InitialStateMissing`], and transitions mentioning undeclared states or symbols are
/// ignored. If two transitions are declared for the same state and symbol, the later one wins.
///
/// Use [`AutomatonBuilder`] for constructing instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    states: Vec<String>,
    alphabet: CharAlphabet,
    initial: String,
    accepting: Vec<String>,
    transitions: Vec<(String, char, String)>,
}

impl Automaton {
    /// Creates a new automaton from its raw parts.
    pub fn new(
        states: Vec<String>,
        alphabet: CharAlphabet,
        initial: String,
        accepting: Vec<String>,
        transitions: Vec<(String, char, String)>,
    ) -> Self {
        Self {
            states,
            alphabet,
            initial,
            accepting,
            transitions,
        }
    }

    /// The declared states in declaration order, may contain duplicates.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// The alphabet.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// Name of the initial state.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// Names of the accepting states.
    pub fn accepting(&self) -> &[String] {
        &self.accepting
    }

    /// Returns `true` if `state` is declared as accepting.
    pub fn is_accepting(&self, state: &str) -> bool {
        self.accepting.iter().any(|q| q == state)
    }

    /// The transitions in declaration order.
    pub fn transitions(&self) -> &[(String, char, String)] {
        &self.transitions
    }

    /// Returns the number of distinct declared states.
    pub fn size(&self) -> usize {
        self.states.iter().unique().count()
    }
}

impl Show for Automaton {
    /// Renders the transition table, with one row per state and one column per symbol. The initial
    /// state is marked with `→` and accepting states with `*`.
    fn show(&self) -> String {
        let mut table: Map<(&str, char), &str> = Map::default();
        for (source, sym, target) in &self.transitions {
            table.insert((source.as_str(), *sym), target.as_str());
        }

        let mut builder = tabled::builder::Builder::default();
        let mut header = vec!["".to_string()];
        header.extend(self.alphabet.universe().map(|sym| sym.to_string()));
        builder.push_record(header);

        for state in self.states.iter().map(String::as_str).unique() {
            let mut label = state.to_string();
            if self.is_accepting(state) {
                label = format!("{}*", label.green());
            }
            if state == self.initial {
                label = format!("→{label}");
            }

            let mut row = vec![label];
            row.extend(self.alphabet.universe().map(|sym| {
                table
                    .get(&(state, sym))
                    .map(|target| target.to_string())
                    .unwrap_or_else(|| "⊥".dimmed().to_string())
            }));
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

/// Builder for [`Automaton`]s.
///
/// # Example
/// ```
/// use omega_membership::prelude::*;
///
/// let automaton = AutomatonBuilder::default()
///     .with_states(["p", "q"])
///     .with_alphabet(['a'])
///     .with_initial("p")
///     .with_accepting(["q"])
///     .with_transitions([("p", 'a', "q"), ("q", 'a', "p")])
///     .build();
/// assert_eq!(automaton.size(), 2);
/// assert!(automaton.is_accepting("q"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    states: Vec<String>,
    alphabet: Vec<char>,
    initial: Option<String>,
    accepting: Vec<String>,
    transitions: Vec<(String, char, String)>,
}

impl AutomatonBuilder {
    /// Adds the given states.
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds the given symbols to the alphabet.
    pub fn with_alphabet<I: IntoIterator<Item = char>>(mut self, symbols: I) -> Self {
        self.alphabet.extend(symbols);
        self
    }

    /// Sets the initial state. If none is given, the first declared state is used.
    pub fn with_initial<S: Into<String>>(mut self, initial: S) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// Marks the given states as accepting.
    pub fn with_accepting<I, S>(mut self, accepting: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepting.extend(accepting.into_iter().map(Into::into));
        self
    }

    /// Adds transitions given as `(source, symbol, target)` triples.
    pub fn with_transitions<I, S, T>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (S, char, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        self.transitions.extend(
            transitions
                .into_iter()
                .map(|(source, sym, target)| (source.into(), sym, target.into())),
        );
        self
    }

    /// Consumes the builder and produces the [`Automaton`].
    pub fn build(self) -> Automaton {
        let initial = self
            .initial
            .or_else(|| self.states.first().cloned())
            .unwrap_or_default();
        Automaton::new(
            self.states,
            self.alphabet.into_iter().collect(),
            initial,
            self.accepting,
            self.transitions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::AutomatonBuilder;
    use crate::Show;

    #[test]
    fn builder_defaults_initial_to_first_state() {
        let automaton = AutomatonBuilder::default()
            .with_states(["x", "y", "x"])
            .with_alphabet("aba".chars())
            .build();
        assert_eq!(automaton.initial(), "x");
        assert_eq!(automaton.size(), 2);
        assert_eq!(automaton.alphabet().size(), 2);
        assert!(!automaton.is_accepting("x"));
    }

    #[test]
    fn shows_transition_table() {
        let table = crate::tests::only_b().show();
        assert!(table.contains("trap"));
        assert!(table.contains('→'));
        assert_eq!(table.lines().filter(|line| line.contains("ok")).count(), 1);
    }
}
