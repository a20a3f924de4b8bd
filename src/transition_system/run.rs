use itertools::Itertools;
use tracing::trace;

use crate::{math::Map, Show, StateIndex};

/// Describes where a run got stuck: in `state`, no transition exists for `symbol`, which is
/// found at `position` (counted in characters) of the word that was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stuck {
    /// The state in which the run got stuck.
    pub state: StateIndex,
    /// Offset of the offending symbol in the word.
    pub position: usize,
    /// The symbol for which no transition exists.
    pub symbol: char,
}

impl Show for Stuck {
    fn show(&self) -> String {
        format!(
            "no transition for `{}` from state {} (position {})",
            self.symbol, self.state, self.position
        )
    }
}

/// The states that are visited infinitely often when a loop word is repeated forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleResult {
    /// States visited in one period, in order, starting with the state at which the
    /// periodic behaviour begins. A state may occur several times.
    pub cycle_states: Vec<StateIndex>,
    /// Explanation of how the cycle was found.
    pub reason: String,
}

impl CycleResult {
    /// Returns `true` if one of the states in the cycle satisfies `is_accepting`.
    pub fn visits<F: Fn(StateIndex) -> bool>(&self, is_accepting: F) -> bool {
        self.cycle_states.iter().any(|q| is_accepting(*q))
    }
}

/// Reads `word` symbol by symbol from `start`, using `step` as the transition function. Returns the
/// reached state, or the point at which no transition could be taken.
///
/// # Example
/// ```
/// use omega_membership::prelude::*;
///
/// // counts `a`s modulo 3, there is no transition for anything else
/// let step = |q: usize, sym: char| (sym == 'a').then_some((q + 1) % 3);
/// assert_eq!(run_word(step, 0, "aaaa"), Ok(1));
/// assert_eq!(run_word(step, 0, ""), Ok(0));
/// assert_eq!(
///     run_word(step, 0, "aab"),
///     Err(Stuck { state: 2, position: 2, symbol: 'b' })
/// );
/// ```
pub fn run_word<F>(step: F, start: StateIndex, word: &str) -> Result<StateIndex, Stuck>
where
    F: Fn(StateIndex, char) -> Option<StateIndex>,
{
    let mut state = start;
    for (position, symbol) in word.chars().enumerate() {
        state = step(state, symbol).ok_or(Stuck {
            state,
            position,
            symbol,
        })?;
    }
    Ok(state)
}

/// Repeats `loop_word` forever, starting in `entry`, and detects the cycle that the run eventually
/// settles in. The pairs of current state and offset into `loop_word` are recorded; as soon as a pair
/// repeats, the states that were visited since its first occurrence form the cycle.
///
/// This takes at most `|states| * |loop_word|` steps. An empty loop word is treated as staying in
/// `entry` forever. If the run gets stuck before a pair repeats, there is no cycle and the point of
/// failure is returned instead.
///
/// # Example
/// ```
/// use omega_membership::prelude::*;
///
/// // 0 -a-> 1 -a-> 2 -a-> 1, and `b` only loops on 2
/// let step = |q: usize, sym: char| match (q, sym) {
///     (0, 'a') => Some(1),
///     (1, 'a') => Some(2),
///     (2, 'a') => Some(1),
///     (2, 'b') => Some(2),
///     _ => None,
/// };
/// assert_eq!(find_periodic_cycle(step, 0, "a").unwrap().cycle_states, vec![1, 2]);
/// assert_eq!(find_periodic_cycle(step, 0, "").unwrap().cycle_states, vec![0]);
/// assert!(find_periodic_cycle(step, 0, "ab").is_err());
/// ```
pub fn find_periodic_cycle<F>(
    step: F,
    entry: StateIndex,
    loop_word: &str,
) -> Result<CycleResult, Stuck>
where
    F: Fn(StateIndex, char) -> Option<StateIndex>,
{
    let symbols = loop_word.chars().collect_vec();
    if symbols.is_empty() {
        return Ok(CycleResult {
            cycle_states: vec![entry],
            reason: format!("the loop is empty, the run stays in state {entry}"),
        });
    }

    let mut visited = vec![];
    let mut seen: Map<(StateIndex, usize), usize> = Map::default();
    let mut state = entry;
    let mut offset = 0;

    loop {
        if let Some(first) = seen.insert((state, offset), visited.len()) {
            let cycle_states = visited.split_off(first);
            trace!(
                "repeating {loop_word:?} from {entry} settles in cycle {} after {first} steps",
                cycle_states.show()
            );
            return Ok(CycleResult {
                reason: format!(
                    "repeating `{loop_word}` from state {entry} returns to state {state} at loop offset {offset}, the cycle has length {}",
                    cycle_states.len()
                ),
                cycle_states,
            });
        }
        visited.push(state);

        let symbol = symbols[offset];
        state = step(state, symbol).ok_or(Stuck {
            state,
            position: offset,
            symbol,
        })?;
        offset = (offset + 1) % symbols.len();
    }
}
