use itertools::Itertools;
use tracing::debug;

use crate::prelude::*;

/// Generate a random complete [`Automaton`] with `size` states over the first `symbols` letters by randomly
/// drawing transitions. States are named `q0`, `q1`, ... and `q0` is initial. The algorithm is as follows:
/// 1. Start with `size` states and no transitions.
/// 2. For each state, for each symbol draw a target state and add the corresponding edge.
/// 3. Mark each state as accepting with probability one half.
///
/// Note that depending on the drawn transitions, there may be unreachable states.
pub fn generate_random_automaton(symbols: usize, size: usize) -> Automaton {
    assert!(size > 0, "an automaton needs at least one state");
    let alphabet = CharAlphabet::of_size(symbols);
    let states = (0..size).map(|q| format!("q{q}")).collect_vec();

    let transitions = states
        .iter()
        .cartesian_product(alphabet.universe().collect_vec())
        .map(|(source, sym)| (source.clone(), sym, states[fastrand::usize(..size)].clone()))
        .collect_vec();
    let accepting = states
        .iter()
        .filter(|_| fastrand::bool())
        .cloned()
        .collect_vec();
    debug!(
        "generated random automaton with {size} states, {} of them accepting",
        accepting.len()
    );

    AutomatonBuilder::default()
        .with_states(states)
        .with_alphabet(alphabet.universe())
        .with_accepting(accepting)
        .with_transitions(transitions)
        .build()
}

/// Generate a random `String` over the universe of the `alphabet`
/// The length of the `String` is drawn uniformly from the range `min_len..=max_len`.
pub fn generate_random_word(alphabet: &CharAlphabet, min_len: usize, max_len: usize) -> String {
    let charset: Vec<char> = alphabet.universe().collect();

    let length = fastrand::usize(min_len..=max_len);
    (0..length)
        .map(|_| charset[fastrand::usize(..charset.len())])
        .collect()
}

/// Generate a random ultimately periodic word over the universe of the `alphabet`, given as a pair of
/// spoke and cycle. The length of the spoke is drawn uniformly from the range `min_len_spoke..=max_len_spoke`.
/// The length of the cycle is drawn uniformly from the range `min_len_cycle..=max_len_cycle`.
/// Panics if the length of the cycle can be 0.
pub fn generate_random_omega_word(
    alphabet: &CharAlphabet,
    min_len_spoke: usize,
    max_len_spoke: usize,
    min_len_cycle: usize,
    max_len_cycle: usize,
) -> (String, String) {
    assert!(min_len_spoke <= max_len_spoke);
    assert!(min_len_cycle <= max_len_cycle);
    assert!(min_len_cycle > 0);

    let spoke = generate_random_word(alphabet, min_len_spoke, max_len_spoke);
    let cycle = generate_random_word(alphabet, min_len_cycle, max_len_cycle);
    (spoke, cycle)
}

/// Writes the ultimately periodic word `spoke cycle^ω` as an expression that [`parse_omega_word`] accepts.
pub fn lasso_expression(spoke: &str, cycle: &str) -> String {
    format!("{spoke}({cycle})^w")
}

/// Generate a random regular expression over the universe of the `alphabet`, which has nesting depth
/// at most `depth`. Leaves are single symbols, inner nodes are drawn uniformly from concatenation,
/// union (both binary), star and plus.
pub fn generate_random_regex(alphabet: &CharAlphabet, depth: usize) -> RegexNode {
    let literal = || RegexNode::Literal(alphabet[fastrand::usize(..alphabet.size())]);
    if depth == 0 || fastrand::u8(..4) == 0 {
        return literal();
    }
    match fastrand::u8(..4) {
        0 => RegexNode::Concat(vec![
            generate_random_regex(alphabet, depth - 1),
            generate_random_regex(alphabet, depth - 1),
        ]),
        1 => RegexNode::Union(vec![
            generate_random_regex(alphabet, depth - 1),
            generate_random_regex(alphabet, depth - 1),
        ]),
        2 => generate_random_regex(alphabet, depth - 1).star(),
        _ => generate_random_regex(alphabet, depth - 1).plus(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congruence::star_closure;

    /// Decides acceptance of `spoke cycle^ω` by running the cycle until the state at the start of
    /// an iteration repeats, collecting every state visited in between.
    fn simulate_lasso(table: &TransitionTable, spoke: &str, cycle: &str) -> bool {
        let Some(mut state) = table.initial().and_then(|q| table.run(q, spoke).ok()) else {
            return false;
        };
        let mut boundaries = vec![];
        let mut visited = vec![];
        loop {
            if let Some(first) = boundaries.iter().position(|q| *q == state) {
                return visited[first..]
                    .iter()
                    .any(|states: &Vec<usize>| states.iter().any(|q| table.is_accepting(*q)));
            }
            boundaries.push(state);
            let mut states = vec![state];
            for sym in cycle.chars() {
                state = table.step(state, sym).expect("random automata are complete");
                states.push(state);
            }
            visited.push(states);
        }
    }

    #[test]
    fn random_automata_are_complete() {
        fastrand::seed(7);
        let automaton = generate_random_automaton(3, 5);
        assert_eq!(automaton.size(), 5);
        assert_eq!(automaton.transitions().len(), 15);
        assert_eq!(automaton.initial(), "q0");
        let table = TransitionTable::compile(&automaton);
        for q in 0..5 {
            for sym in "abc".chars() {
                assert!(table.step(q, sym).is_some());
            }
        }
    }

    #[test]
    fn random_words_respect_bounds() {
        fastrand::seed(11);
        let alphabet = CharAlphabet::of_size(2);
        for _ in 0..50 {
            let (spoke, cycle) = generate_random_omega_word(&alphabet, 0, 3, 1, 4);
            assert!(spoke.len() <= 3);
            assert!((1..=4).contains(&cycle.len()));
            assert!(spoke.chars().chain(cycle.chars()).all(|c| alphabet.contains(c)));
        }
    }

    #[test_log::test]
    fn evaluation_agrees_with_lasso_simulation() {
        fastrand::seed(42);
        for _ in 0..40 {
            let automaton = generate_random_automaton(2, fastrand::usize(1..=6));
            let table = TransitionTable::compile(&automaton);
            for _ in 0..10 {
                let (spoke, cycle) =
                    generate_random_omega_word(automaton.alphabet(), 0, 4, 1, 4);
                let result = check(&automaton, &lasso_expression(&spoke, &cycle)).unwrap();
                assert_eq!(
                    result.accepted,
                    simulate_lasso(&table, &spoke, &cycle),
                    "disagreement on {spoke}({cycle})^ω for\n{}",
                    automaton.show()
                );
            }
        }
    }

    #[test]
    fn star_closure_is_closed_under_base() {
        fastrand::seed(3);
        for _ in 0..20 {
            let automaton = generate_random_automaton(2, fastrand::usize(1..=4));
            let table = TransitionTable::compile(&automaton);
            let size = table.size();
            let base: TransformSet = table.symbol_transforms().collect();
            let closure = star_closure(&base, size);

            assert!(closure.contains(&StateMap::identity(size)));
            assert!(closure.len() <= (2 * size + 1).pow(size as u32));
            for (map, _) in closure.iter() {
                for (letter, _) in base.iter() {
                    assert!(closure.contains(&map.then(letter)));
                }
            }
        }
    }

    #[test]
    fn random_regex_evaluates() {
        fastrand::seed(5);
        let automaton = generate_random_automaton(3, 4);
        let table = TransitionTable::compile(&automaton);
        for _ in 0..20 {
            let regex = generate_random_regex(automaton.alphabet(), 4);
            let reparsed = crate::word::parse_regex(&regex.to_string()).unwrap();
            assert_eq!(reparsed.to_string(), regex.to_string());
            let candidates = crate::congruence::evaluate_regex(&regex, &table);
            assert!(!candidates.is_empty());
        }
    }
}
