use std::fmt::{Display, Formatter};

use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::{debug, trace};

use super::Automaton;
use crate::{
    congruence::{evaluate_regex, TransformSet},
    transition_system::{CycleResult, Stuck, TransitionTable},
    word::{parse_omega_word, OmegaWordError, ParsedOmegaWord},
    Show, StateIndex,
};

/// Explains why a word was accepted or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The run settles in a cycle which contains the listed accepting states.
    Accepted {
        /// Accepting states on the cycle, in order of their first occurrence.
        accepting: Vec<String>,
        /// How the cycle was found.
        detail: String,
    },
    /// The run settles in a cycle without accepting states.
    NotAccepting {
        /// The state in which the loop is entered.
        entry: String,
        /// How the cycle was found.
        detail: String,
    },
    /// Repeating the loop gets stuck, so there is no infinite run.
    LoopStuck {
        /// State in which the run got stuck.
        state: String,
        /// The symbol without transition.
        symbol: char,
        /// Offset of the symbol in the loop word.
        position: usize,
    },
    /// Reading the prefix gets stuck, so the loop is never reached.
    PrefixStuck {
        /// State in which the run got stuck.
        state: String,
        /// The symbol without transition.
        symbol: char,
        /// Offset of the symbol in the prefix word.
        position: usize,
    },
    /// No combination of prefix and loop was tried, which only happens for an empty set of
    /// candidates. If candidates were tried, the most informative of their failures is reported
    /// instead, so a word whose every prefix gets stuck yields [`Reason::PrefixStuck`].
    NoValidRun,
    /// The initial state of the automaton is not one of its states.
    InitialStateMissing {
        /// The name given as initial state.
        initial: String,
    },
}

impl Display for Reason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::Accepted { accepting, detail } => write!(
                f,
                "the run visits the accepting state(s) {} infinitely often ({detail})",
                accepting.join(", ")
            ),
            Reason::NotAccepting { entry, detail } => write!(
                f,
                "the run enters the loop in state {entry} and cycles without visiting an accepting state ({detail})"
            ),
            Reason::LoopStuck {
                state,
                symbol,
                position,
            } => write!(
                f,
                "the loop causes the run to get stuck: no transition for `{symbol}` (loop position {position}) from state {state}"
            ),
            Reason::PrefixStuck {
                state,
                symbol,
                position,
            } => write!(
                f,
                "the prefix causes the run to get stuck: no transition for `{symbol}` (prefix position {position}) from state {state}"
            ),
            Reason::NoValidRun => write!(f, "no realization of the word yields a valid run"),
            Reason::InitialStateMissing { initial } => write!(
                f,
                "the initial state {initial} is not a state of the automaton"
            ),
        }
    }
}

/// Verdict of [`evaluate`], together with the witness that led to it.
///
/// For an accepted word, `prefix_word` and `loop_word` are concrete realizations of the prefix and loop
/// expressions such that `prefix_word loop_word^ω` is accepted, `entry_state` is the state reached after
/// the prefix and `cycle` lists the states that are visited infinitely often. For rejected words the fields
/// describe the most informative failed attempt, if there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Whether the word is accepted.
    pub accepted: bool,
    /// States visited infinitely often, in order.
    pub cycle: Vec<String>,
    /// Realization of the prefix.
    pub prefix_word: String,
    /// Realization of the loop.
    pub loop_word: String,
    /// State reached after reading the prefix.
    pub entry_state: Option<String>,
    /// Explanation of the verdict.
    pub reason: Reason,
}

impl Evaluation {
    fn rejected(reason: Reason) -> Self {
        Self {
            accepted: false,
            cycle: vec![],
            prefix_word: String::new(),
            loop_word: String::new(),
            entry_state: None,
            reason,
        }
    }

    /// Rank of a failed attempt, diagnostics with a higher rank are preferred.
    fn rank(&self) -> u8 {
        match self.reason {
            Reason::NotAccepting { .. } => 3,
            Reason::LoopStuck { .. } => 2,
            Reason::PrefixStuck { .. } => 1,
            _ => 0,
        }
    }
}

impl Show for Evaluation {
    fn show(&self) -> String {
        let verdict = if self.accepted {
            "accepted".green().bold().to_string()
        } else {
            "rejected".red().bold().to_string()
        };
        let mut out = format!("{verdict}: {}", self.reason);
        if let Some(entry) = &self.entry_state {
            out.push_str(&format!(
                "\n  witness: {}({})^ω, loop entered in {entry}",
                self.prefix_word, self.loop_word
            ));
        }
        if !self.cycle.is_empty() {
            out.push_str(&format!("\n  cycle: {}", self.cycle.iter().join(" → ")));
        }
        out
    }
}

/// Candidate search of the decision procedure, owns everything one evaluation call needs.
struct Search<'a> {
    table: &'a TransitionTable,
    best: Option<Evaluation>,
}

impl<'a> Search<'a> {
    /// Keeps `candidate` if it is more informative than what was seen so far.
    fn remember(&mut self, candidate: Evaluation) {
        if self
            .best
            .as_ref()
            .map_or(true, |best| best.rank() < candidate.rank())
        {
            self.best = Some(candidate);
        }
    }

    fn stuck_reason(&self, stuck: Stuck, in_prefix: bool) -> Reason {
        let state = self.table.label(stuck.state);
        if in_prefix {
            Reason::PrefixStuck {
                state,
                symbol: stuck.symbol,
                position: stuck.position,
            }
        } else {
            Reason::LoopStuck {
                state,
                symbol: stuck.symbol,
                position: stuck.position,
            }
        }
    }

    fn with_cycle(
        &self,
        prefix_word: &str,
        loop_word: &str,
        entry: StateIndex,
        cycle: &CycleResult,
    ) -> Evaluation {
        let accepting = cycle
            .cycle_states
            .iter()
            .filter(|q| self.table.is_accepting(**q))
            .unique()
            .map(|q| self.table.label(*q))
            .collect_vec();
        let states = cycle
            .cycle_states
            .iter()
            .map(|q| self.table.label(*q))
            .collect_vec();
        let entry_label = self.table.label(entry);
        let detail = match states.first() {
            Some(first) if !loop_word.is_empty() => format!(
                "repeating `{loop_word}` from state {entry_label} returns to state {first}, the cycle has length {}",
                states.len()
            ),
            _ => format!("the loop is empty, the run stays in state {entry_label}"),
        };
        let reason = if accepting.is_empty() {
            Reason::NotAccepting {
                entry: entry_label.clone(),
                detail,
            }
        } else {
            Reason::Accepted { accepting, detail }
        };

        Evaluation {
            accepted: matches!(reason, Reason::Accepted { .. }),
            cycle: states,
            prefix_word: prefix_word.to_string(),
            loop_word: loop_word.to_string(),
            entry_state: Some(entry_label),
            reason,
        }
    }

    /// Tries every loop candidate after the given prefix. Returns the accepting evaluation if one is found.
    fn try_prefix(
        &mut self,
        initial: StateIndex,
        prefix_word: &str,
        loops: &TransformSet,
    ) -> Option<Evaluation> {
        let entry = match self.table.run(initial, prefix_word) {
            Ok(entry) => entry,
            Err(stuck) => {
                trace!("prefix {prefix_word:?} gets stuck: {}", stuck.show());
                let mut failed = Evaluation::rejected(self.stuck_reason(stuck, true));
                failed.prefix_word = prefix_word.to_string();
                self.remember(failed);
                return None;
            }
        };

        let mut loop_stuck = false;
        let mut non_accepting = false;
        for loop_word in loops.words() {
            match self.table.periodic_cycle(entry, loop_word) {
                Err(stuck) => {
                    trace!("loop {loop_word:?} gets stuck: {}", stuck.show());
                    if !loop_stuck {
                        loop_stuck = true;
                        let mut failed = Evaluation::rejected(self.stuck_reason(stuck, false));
                        failed.prefix_word = prefix_word.to_string();
                        failed.loop_word = loop_word.to_string();
                        failed.entry_state = Some(self.table.label(entry));
                        self.remember(failed);
                    }
                }
                Ok(cycle) => {
                    let evaluation = self.with_cycle(prefix_word, loop_word, entry, &cycle);
                    if evaluation.accepted {
                        return Some(evaluation);
                    }
                    trace!(
                        "{prefix_word:?} ({loop_word:?})^ω cycles through {} without accepting state",
                        evaluation.cycle.iter().join(", ")
                    );
                    if !non_accepting {
                        non_accepting = true;
                        self.remember(evaluation);
                    }
                }
            }
        }
        None
    }
}

/// Decides whether some word described by `word` is accepted by `automaton`.
///
/// The prefix and the loop are first evaluated into sets of candidate transforms, one per
/// distinct effect on the automaton. For every prefix candidate, the run on its word is computed;
/// if that gets stuck, the candidate is discarded right away. Otherwise, every loop candidate is
/// repeated from the reached state until the run settles in a cycle. The word is accepted as soon
/// as one of these cycles contains an accepting state.
///
/// If no combination is accepting, the most informative failure is reported: a non-accepting
/// cycle is preferred over a loop that gets stuck, which in turn is preferred over a prefix
/// that gets stuck.
///
/// # Example
/// ```
/// use omega_membership::prelude::*;
///
/// let dba = AutomatonBuilder::default()
///     .with_states(["ok", "trap"])
///     .with_alphabet("ab".chars())
///     .with_accepting(["ok"])
///     .with_transitions([("ok", 'a', "trap"), ("ok", 'b', "ok"), ("trap", 'a', "trap"), ("trap", 'b', "trap")])
///     .build();
///
/// let result = evaluate(&dba, &parse_omega_word("a b^w").unwrap());
/// assert!(!result.accepted);
/// assert_eq!(result.entry_state.as_deref(), Some("trap"));
/// assert_eq!(result.cycle, vec!["trap"]);
/// ```
pub fn evaluate(automaton: &Automaton, word: &ParsedOmegaWord) -> Evaluation {
    let table = TransitionTable::compile(automaton);
    let Some(initial) = table.initial() else {
        return Evaluation::rejected(Reason::InitialStateMissing {
            initial: automaton.initial().to_string(),
        });
    };

    let prefixes = match word.prefix() {
        Some(prefix) => evaluate_regex(prefix, &table),
        None => TransformSet::identity(table.size()),
    };
    let loops = evaluate_regex(word.omega(), &table);
    debug!(
        "evaluating {word} with {} prefix and {} loop candidates",
        prefixes.len(),
        loops.len()
    );

    let mut search = Search { table: &table, best: None };
    for prefix_word in prefixes.words() {
        if let Some(accepted) = search.try_prefix(initial, prefix_word, &loops) {
            debug!(
                "accepted with witness {prefix_word:?} ({:?})^ω",
                accepted.loop_word
            );
            return accepted;
        }
    }

    let rejected = search
        .best
        .unwrap_or_else(|| Evaluation::rejected(Reason::NoValidRun));
    debug!("rejected: {}", rejected.reason);
    rejected
}

/// Parses `word` and evaluates it on `automaton`, see [`parse_omega_word`] and [`evaluate`].
pub fn check(automaton: &Automaton, word: &str) -> Result<Evaluation, OmegaWordError> {
    Ok(evaluate(automaton, &parse_omega_word(word)?))
}
