//! Decides whether an ultimately periodic word belongs to the language of a deterministic Büchi
//! automaton (DBA).
//!
//! Words are given as omega-regular expressions of the shape `u v^w` (or `u v^ω`), where `u` and `v`
//! are ordinary regular expressions over single-character symbols built with union `|`, juxtaposition,
//! `*`, `+` and parentheses. The expression describes a whole family of ultimately periodic words and
//! the question answered by [`check`] is whether *some* member of that family is accepted.
//!
//! The pipeline consists of the following stages:
//! - [`word::parse_omega_word`] parses the text into a [`word::RegexNode`] tree, makes sure that it contains precisely
//!   one omega suffix in trailing position and splits it into a prefix and a loop expression.
//! - [`transition_system::TransitionTable`] compiles an [`Automaton`] into dense state indices, a step function
//!   and one [`congruence::StateTransform`] per symbol. A state transform records the effect that reading some
//!   finite word has on every state at once.
//! - [`congruence::evaluate_regex`] maps a regex tree to the finite set of distinct state transforms that its
//!   realizations induce. Stars are handled by a worklist fixed point, which terminates as there are only
//!   finitely many functions on a finite state set.
//! - [`automaton::evaluate`] tries all combinations of prefix and loop candidates and searches for a periodic
//!   cycle of states containing an accepting state, see [`transition_system::find_periodic_cycle`].
//!
//! # Example
//! ```
//! use omega_membership::prelude::*;
//!
//! // accepts the words `a^n b^ω`, so `a` occurs only finitely often
//! let dba = AutomatonBuilder::default()
//!     .with_states(["q0", "q1"])
//!     .with_alphabet("ab".chars())
//!     .with_initial("q0")
//!     .with_accepting(["q1"])
//!     .with_transitions([("q0", 'a', "q0"), ("q0", 'b', "q1"), ("q1", 'b', "q1")])
//!     .build();
//!
//! assert!(check(&dba, "a b^w").unwrap().accepted);
//! assert!(!check(&dba, "(ab)^w").unwrap().accepted);
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use itertools::Itertools;

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use omega_membership::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::CharAlphabet,
        automaton::{check, evaluate, Automaton, AutomatonBuilder, Evaluation, Reason},
        congruence::{StateMap, StateTransform, TransformSet},
        math,
        transition_system::{find_periodic_cycle, run_word, CycleResult, Stuck, TransitionTable},
        word::{parse_omega_word, OmegaWordError, ParsedOmegaWord, RegexNode, RegexSyntaxError},
        Show, StateIndex,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Module that contains the definition of the alphabets automata operate on.
pub mod alphabet;

/// Defines the automaton value handed to the decision procedure, together with the procedure itself.
pub mod automaton;
pub use automaton::{check, evaluate, Automaton};

/// Compiled transition tables, runs of finite words and detection of periodic cycles.
pub mod transition_system;

/// State transforms, their composition and the evaluation of regular expressions into them.
pub mod congruence;

/// Omega-regular expressions: syntax tree, parser and decomposition into prefix and loop.
pub mod word;

/// Implements the generation of random automata and words.
#[cfg(feature = "random")]
pub mod random;

/// Dense index of a state, assigned in the order in which states are declared.
pub type StateIndex = usize;

/// Helper trait which can be used to display states, transforms and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state index that should be
    /// for example q0, q1, q2, ... and for a transform something like `[0 -> 1, 1 -> ⊥]`.
    /// This is mainly used for debugging purposes and for the command line front end.
    fn show(&self) -> String;
    /// Show a collection of the thing, for a collection of states this should be {q0, q1, q2, ...}.
    fn show_collection<'a, I>(iter: I) -> String
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        format!("{{{}}}", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a,
    {
        format!("[{}]", iter.into_iter().map(|x| x.show()).join(", "))
    }
}

impl Show for Option<usize> {
    fn show(&self) -> String {
        match self {
            None => "⊥".to_string(),
            Some(x) => x.show(),
        }
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }

    fn show_collection<'a, I: IntoIterator<Item = &'a Self>>(iter: I) -> String
    where
        Self: 'a,
    {
        format!("\"{}\"", iter.into_iter().join(""))
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        S::show_collection(self.iter())
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}
