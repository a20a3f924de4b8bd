use bit_set::BitSet;
use tracing::{debug, warn};

use super::{find_periodic_cycle, run_word, CycleResult, Stuck};
use crate::{
    alphabet::CharAlphabet,
    automaton::Automaton,
    congruence::{StateMap, StateTransform},
    math::Bijection,
    Show, StateIndex,
};

/// An [`Automaton`] compiled into dense state indices. It provides the step function for running
/// concrete words as well as one [`StateTransform`] per symbol, which serve as the building blocks
/// for evaluating regular expressions.
///
/// Compilation is forgiving: duplicate state names are merged, transitions that mention an
/// undeclared state or a symbol outside of the alphabet are dropped (and logged), and a later
/// transition for the same state and symbol replaces an earlier one.
///
/// # Example
/// ```
/// use omega_membership::prelude::*;
///
/// let automaton = AutomatonBuilder::default()
///     .with_states(["p", "q"])
///     .with_alphabet("ab".chars())
///     .with_accepting(["q"])
///     .with_transitions([("p", 'a', "q"), ("p", 'a', "p"), ("q", 'b', "p")])
///     .build();
/// let table = TransitionTable::compile(&automaton);
///
/// let (p, q) = (table.index_of("p").unwrap(), table.index_of("q").unwrap());
/// assert_eq!(table.step(p, 'a'), Some(p)); // the later transition wins
/// assert_eq!(table.step(p, 'b'), None);
/// assert_eq!(table.step(q, 'b'), Some(p));
/// assert!(table.is_accepting(q));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    names: Bijection<StateIndex, String>,
    alphabet: CharAlphabet,
    initial: Option<StateIndex>,
    accepting: BitSet,
    /// Successor of state `q` on the symbol at position `i` is stored at `q * |alphabet| + i`.
    edges: Vec<Option<StateIndex>>,
    /// The map of each symbol, indexed by the symbol's position in the alphabet.
    letters: Vec<StateMap>,
}

impl TransitionTable {
    /// Compiles the given automaton.
    pub fn compile(automaton: &Automaton) -> Self {
        let mut names = Bijection::new();
        for name in automaton.states() {
            if !names.contains_right(name) {
                names.insert(names.len(), name.clone());
            }
        }
        let size = names.len();
        let alphabet = automaton.alphabet().clone();

        let initial = names.get_by_right(automaton.initial()).copied();
        if initial.is_none() {
            warn!(
                "initial state {} is not among the declared states",
                automaton.initial()
            );
        }

        let mut accepting = BitSet::with_capacity(size);
        for name in automaton.accepting() {
            match names.get_by_right(name) {
                Some(q) => {
                    accepting.insert(*q);
                }
                None => warn!("ignoring undeclared accepting state {name}"),
            }
        }

        let mut edges = vec![None; size * alphabet.size()];
        for (source, sym, target) in automaton.transitions() {
            let resolved = (
                names.get_by_right(source),
                alphabet.position(*sym),
                names.get_by_right(target),
            );
            match resolved {
                (Some(source), Some(position), Some(target)) => {
                    edges[source * alphabet.size() + position] = Some(*target);
                }
                _ => warn!("ignoring transition ({source}, {sym}, {target}) with unknown state or symbol"),
            }
        }

        let letters = (0..alphabet.size())
            .map(|position| {
                StateMap::from_targets(
                    (0..size).map(|q| edges[q * alphabet.size() + position]),
                    |q| accepting.contains(q),
                )
            })
            .collect();

        debug!(
            "compiled automaton with {size} states and {} symbols",
            alphabet.size()
        );

        Self {
            names,
            alphabet,
            initial,
            accepting,
            edges,
            letters,
        }
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// The alphabet.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// The index of the initial state, `None` if the initial state is not a declared state.
    pub fn initial(&self) -> Option<StateIndex> {
        self.initial
    }

    /// Returns `true` if `state` is accepting.
    pub fn is_accepting(&self, state: StateIndex) -> bool {
        self.accepting.contains(state)
    }

    /// Looks up the index of the state with the given name.
    pub fn index_of(&self, name: &str) -> Option<StateIndex> {
        self.names.get_by_right(name).copied()
    }

    /// Gives the name of the state with index `state`.
    pub fn name(&self, state: StateIndex) -> Option<&str> {
        self.names.get_by_left(&state).map(String::as_str)
    }

    /// The name of `state`, falling back to its index.
    pub fn label(&self, state: StateIndex) -> String {
        self.name(state)
            .map(str::to_string)
            .unwrap_or_else(|| state.show())
    }

    /// The successor of `state` on `symbol`, if there is one.
    pub fn step(&self, state: StateIndex, symbol: char) -> Option<StateIndex> {
        if state >= self.size() {
            return None;
        }
        let position = self.alphabet.position(symbol)?;
        self.edges[state * self.alphabet.size() + position]
    }

    /// The transform of the one letter word `symbol`. For a symbol outside of the alphabet, every
    /// run gets stuck.
    pub fn symbol_transform(&self, symbol: char) -> StateTransform {
        let map = match self.alphabet.position(symbol) {
            Some(position) => self.letters[position].clone(),
            None => StateMap::undefined(self.size()),
        };
        StateTransform::new(map, symbol.to_string())
    }

    /// Iterates over the transforms of all symbols, in alphabet order.
    pub fn symbol_transforms(&self) -> impl Iterator<Item = StateTransform> + '_ {
        self.alphabet.universe().map(|sym| self.symbol_transform(sym))
    }

    /// Runs `word` from `start`, see [`run_word`].
    pub fn run(&self, start: StateIndex, word: &str) -> Result<StateIndex, Stuck> {
        run_word(|q, sym| self.step(q, sym), start, word)
    }

    /// Repeats `loop_word` from `entry` until a state repeats, see [`find_periodic_cycle`].
    pub fn periodic_cycle(&self, entry: StateIndex, loop_word: &str) -> Result<CycleResult, Stuck> {
        find_periodic_cycle(|q, sym| self.step(q, sym), entry, loop_word)
    }
}

#[cfg(test)]
mod tests {
    use super::TransitionTable;
    use crate::{congruence::StateMap, prelude::*};

    #[test]
    fn compiles_reference_automaton() {
        let table = TransitionTable::compile(&crate::tests::only_b());
        assert_eq!(table.size(), 2);
        assert_eq!(table.initial(), Some(0));
        assert_eq!(table.label(1), "trap");
        assert!(table.is_accepting(0));
        assert!(!table.is_accepting(1));

        let transforms: Vec<_> = table.symbol_transforms().collect();
        assert_eq!(transforms.len(), 2);
        assert_eq!(
            transforms[0].map().targets().collect::<Vec<_>>(),
            vec![Some(1), Some(1)]
        );
        assert_eq!(transforms[1].word(), "b");
    }

    #[test_log::test]
    fn degrades_gracefully() {
        let automaton = AutomatonBuilder::default()
            .with_states(["p", "q", "p"])
            .with_alphabet(['a'])
            .with_initial("nowhere")
            .with_accepting(["q", "r"])
            .with_transitions([("p", 'a', "q"), ("p", 'b', "q"), ("r", 'a', "p")])
            .build();
        let table = TransitionTable::compile(&automaton);

        assert_eq!(table.size(), 2);
        assert_eq!(table.initial(), None);
        assert_eq!(table.step(0, 'a'), Some(1));
        assert_eq!(table.step(0, 'b'), None);
        assert_eq!(table.step(7, 'a'), None);
        assert_eq!(table.symbol_transform('b').map(), &StateMap::undefined(2));
        assert_eq!(table.label(5), "5");
    }
}
