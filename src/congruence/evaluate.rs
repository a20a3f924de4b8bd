use tracing::trace;

use super::{combine, plus_closure, star_closure, TransformSet};
use crate::{transition_system::TransitionTable, word::RegexNode, Show};

/// Computes the set of distinct transforms that the realizations of `node` induce on the
/// automaton compiled into `table`. Realizations inducing the same map are collapsed and the
/// first one that is encountered represents them.
///
/// A symbol that is not part of the alphabet leads to a transform under which every run gets
/// stuck, its word is kept nonetheless so that it can be reported. An omega node evaluates
/// to the transforms of its operand.
///
/// # Example
/// ```
/// use omega_membership::{congruence::evaluate_regex, prelude::*, word::parse_regex};
///
/// let automaton = AutomatonBuilder::default()
///     .with_states(["even", "odd"])
///     .with_alphabet(['a'])
///     .with_transitions([("even", 'a', "odd"), ("odd", 'a', "even")])
///     .build();
/// let table = TransitionTable::compile(&automaton);
///
/// let transforms = evaluate_regex(&parse_regex("a(aa)*").unwrap(), &table);
/// assert_eq!(transforms.words().collect::<Vec<_>>(), vec!["a"]);
/// ```
pub fn evaluate_regex(node: &RegexNode, table: &TransitionTable) -> TransformSet {
    let size = table.size();
    let out = match node {
        RegexNode::Literal(sym) => TransformSet::from_iter([table.symbol_transform(*sym)]),
        RegexNode::Concat(factors) => factors
            .iter()
            .fold(TransformSet::identity(size), |acc, factor| {
                combine(&acc, &evaluate_regex(factor, table))
            }),
        RegexNode::Union(branches) => {
            let mut out = TransformSet::new();
            for branch in branches {
                out.extend_from(&evaluate_regex(branch, table));
            }
            out
        }
        RegexNode::Star(inner) => star_closure(&evaluate_regex(inner, table), size),
        RegexNode::Plus(inner) => plus_closure(&evaluate_regex(inner, table), size),
        RegexNode::Omega(inner) => evaluate_regex(inner, table),
    };
    trace!("{node} evaluates to {} transforms\n{}", out.len(), out.show());
    out
}
