use std::collections::VecDeque;

use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::trace;

use crate::{math::OrderedMap, Show, StateIndex};

/// Where a run from some state ends up, together with whether it passed through an accepting state
/// after leaving its origin (the state that is reached last counts as passed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reached {
    /// The state that is reached.
    pub state: StateIndex,
    /// Whether some state visited along the way is accepting.
    pub accepting: bool,
}

impl Show for Reached {
    fn show(&self) -> String {
        if self.accepting {
            format!("{}!", self.state)
        } else {
            self.state.to_string()
        }
    }
}

/// A total function on the states of an automaton, mapping each state to what a fixed finite word
/// reaches from it. `None` means that the run gets stuck. Two words inducing the same [`StateMap`]
/// are interchangeable for deciding Büchi acceptance, which is why maps are used as the key for
/// deduplicating realizations.
///
/// # Example
/// ```
/// use omega_membership::prelude::*;
///
/// let swap = StateMap::from_targets([Some(1), Some(0)], |_| false);
/// let stuck = StateMap::from_targets([None, Some(1)], |_| false);
/// assert_eq!(swap.then(&swap), StateMap::identity(2));
/// assert_eq!(swap.then(&stuck).targets().collect::<Vec<_>>(), vec![Some(1), None]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateMap(Vec<Option<Reached>>);

impl StateMap {
    /// Creates a map from its images, indexed by state.
    pub fn new(images: Vec<Option<Reached>>) -> Self {
        Self(images)
    }

    /// Builds a map from the reached targets, `is_accepting` is consulted for the flag
    /// that records whether an accepting state was passed.
    pub fn from_targets<I, F>(targets: I, is_accepting: F) -> Self
    where
        I: IntoIterator<Item = Option<StateIndex>>,
        F: Fn(StateIndex) -> bool,
    {
        Self(
            targets
                .into_iter()
                .map(|target| {
                    target.map(|state| Reached {
                        state,
                        accepting: is_accepting(state),
                    })
                })
                .collect(),
        )
    }

    /// The effect of the empty word on `size` states.
    pub fn identity(size: usize) -> Self {
        Self(
            (0..size)
                .map(|state| {
                    Some(Reached {
                        state,
                        accepting: false,
                    })
                })
                .collect(),
        )
    }

    /// The map under which every run on `size` states gets stuck.
    pub fn undefined(size: usize) -> Self {
        Self(vec![None; size])
    }

    /// Number of states the map is defined on.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Gives the image of `state`, or `None` if the run from it gets stuck (or `state` is out of range).
    pub fn apply(&self, state: StateIndex) -> Option<Reached> {
        self.0.get(state).copied().flatten()
    }

    /// Iterates over the images of all states, forgetting the accepting flags.
    pub fn targets(&self) -> impl Iterator<Item = Option<StateIndex>> + '_ {
        self.0.iter().map(|image| image.map(|reached| reached.state))
    }

    /// Composes `self` with `other`, i.e. first applies `self` and then `other`.
    pub fn then(&self, other: &StateMap) -> StateMap {
        debug_assert_eq!(self.size(), other.size());
        StateMap(
            self.0
                .iter()
                .map(|image| {
                    let first = (*image)?;
                    let second = other.apply(first.state)?;
                    Some(Reached {
                        state: second.state,
                        accepting: first.accepting || second.accepting,
                    })
                })
                .collect(),
        )
    }
}

impl Show for StateMap {
    fn show(&self) -> String {
        format!(
            "[{}]",
            self.0
                .iter()
                .enumerate()
                .map(|(q, image)| match image {
                    Some(reached) => format!("{q} -> {}", reached.show()),
                    None => format!("{q} -> ⊥"),
                })
                .join(", ")
        )
    }
}

/// The effect of running one concrete finite word from every state of an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateTransform {
    map: StateMap,
    word: String,
}

impl StateTransform {
    /// Creates a new transform.
    pub fn new(map: StateMap, word: String) -> Self {
        Self { map, word }
    }

    /// The transform of the empty word.
    pub fn identity(size: usize) -> Self {
        Self::new(StateMap::identity(size), String::new())
    }

    /// The induced map.
    pub fn map(&self) -> &StateMap {
        &self.map
    }

    /// The word realizing this transform.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Composition, the word of the result is the concatenation of both words.
    pub fn then(&self, other: &StateTransform) -> StateTransform {
        Self::new(self.map.then(&other.map), format!("{}{}", self.word, other.word))
    }
}

impl Show for StateTransform {
    fn show(&self) -> String {
        format!("{:?}: {}", self.word, self.map.show())
    }
}

/// A finite set of [`StateTransform`]s that contains at most one transform per [`StateMap`]. When a
/// transform whose map is already present is inserted, the word that was inserted first is kept.
/// Iteration follows insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformSet(OrderedMap<StateMap, String>);

impl TransformSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The set containing only the transform of the empty word.
    pub fn identity(size: usize) -> Self {
        Self::from_iter([StateTransform::identity(size)])
    }

    /// Inserts `transform`, returns `true` if its map was not present before.
    pub fn insert(&mut self, transform: StateTransform) -> bool {
        self.insert_parts(transform.map, transform.word)
    }

    fn insert_parts(&mut self, map: StateMap, word: String) -> bool {
        match self.0.entry(map) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(word);
                true
            }
        }
    }

    /// Returns the number of distinct maps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if a transform with the given map is present.
    pub fn contains(&self, map: &StateMap) -> bool {
        self.0.contains_key(map)
    }

    /// Gives the representative word for `map`, if present.
    pub fn word_for(&self, map: &StateMap) -> Option<&str> {
        self.0.get(map).map(String::as_str)
    }

    /// Iterates over the maps together with their representative words.
    pub fn iter(&self) -> impl Iterator<Item = (&StateMap, &str)> + '_ {
        self.0.iter().map(|(map, word)| (map, word.as_str()))
    }

    /// Iterates over the representative words.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.values().map(String::as_str)
    }

    /// Adds all transforms of `other` that are not present yet.
    pub fn extend_from(&mut self, other: &TransformSet) {
        for (map, word) in other.iter() {
            if !self.contains(map) {
                self.insert_parts(map.clone(), word.to_string());
            }
        }
    }

    /// Renders the set as a table, states are labelled using `label`.
    pub fn table<F: Fn(StateIndex) -> String>(&self, label: F) -> String {
        let mut builder = tabled::builder::Builder::default();
        let size = self.0.keys().next().map(StateMap::size).unwrap_or(0);

        let mut header = vec!["word".to_string()];
        header.extend((0..size).map(&label));
        builder.push_record(header);

        for (map, word) in self.iter() {
            let mut row = vec![if word.is_empty() {
                "ε".bold().to_string()
            } else {
                word.bold().to_string()
            }];
            row.extend((0..size).map(|q| match map.apply(q) {
                Some(reached) if reached.accepting => {
                    format!("{}!", label(reached.state)).green().to_string()
                }
                Some(reached) => label(reached.state).blue().to_string(),
                None => "⊥".dimmed().to_string(),
            }));
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::ascii())
            .to_string()
    }
}

impl FromIterator<StateTransform> for TransformSet {
    fn from_iter<T: IntoIterator<Item = StateTransform>>(iter: T) -> Self {
        let mut set = Self::new();
        for transform in iter {
            set.insert(transform);
        }
        set
    }
}

impl Show for TransformSet {
    fn show(&self) -> String {
        self.table(|q| q.show())
    }
}

/// Composes every transform of `left` with every transform of `right`, in this order. The result
/// is deduplicated by map.
pub fn combine(left: &TransformSet, right: &TransformSet) -> TransformSet {
    let mut out = TransformSet::new();
    for (left_map, left_word) in left.iter() {
        for (right_map, right_word) in right.iter() {
            out.insert_parts(
                left_map.then(right_map),
                format!("{left_word}{right_word}"),
            );
        }
    }
    out
}

/// Computes the least set that contains the identity on `size` states as well as `base`, and which
/// is closed under composition with elements of `base`. This corresponds to the Kleene star.
///
/// As maps also record whether an accepting state was passed, the result has at most `(2n + 1)^n`
/// elements for `n = size`.
///
/// The computation uses a worklist of maps that still have to be extended, so neither the stack
/// depth nor termination depend on the number of states. It terminates as there are only finitely
/// many maps on a finite set of states.
///
/// # Example
/// ```
/// use omega_membership::{congruence::star_closure, prelude::*};
///
/// // a single transform that rotates three states
/// let rotate = StateTransform::new(
///     StateMap::from_targets([Some(1), Some(2), Some(0)], |_| false),
///     "a".to_string(),
/// );
/// let closure = star_closure(&TransformSet::from_iter([rotate]), 3);
/// assert_eq!(closure.len(), 3);
/// assert_eq!(closure.words().collect::<Vec<_>>(), vec!["", "a", "aa"]);
/// ```
pub fn star_closure(base: &TransformSet, size: usize) -> TransformSet {
    let mut closure = TransformSet::identity(size);
    let mut queue = VecDeque::new();
    for (map, word) in base.iter() {
        if closure.insert_parts(map.clone(), word.to_string()) {
            queue.push_back(map.clone());
        }
    }

    while let Some(map) = queue.pop_front() {
        let word = closure.word_for(&map).unwrap_or_default().to_string();
        for (base_map, base_word) in base.iter() {
            let extended = map.then(base_map);
            if closure.insert_parts(extended.clone(), format!("{word}{base_word}")) {
                queue.push_back(extended);
            }
        }
    }

    trace!(
        "closure of {} base transforms has {} elements",
        base.len(),
        closure.len()
    );
    closure
}

/// Transforms of one or more repetitions, that is `base` composed with its [`star_closure`].
pub fn plus_closure(base: &TransformSet, size: usize) -> TransformSet {
    combine(base, &star_closure(base, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(targets: &[Option<StateIndex>], word: &str) -> StateTransform {
        StateTransform::new(
            StateMap::from_targets(targets.iter().copied(), |q| q == 0),
            word.to_string(),
        )
    }

    #[test]
    fn composition_tracks_stuck_runs_and_acceptance() {
        let a = transform(&[Some(1), Some(0), None], "a");
        let b = transform(&[Some(2), None, Some(2)], "b");

        let ab = a.then(&b);
        assert_eq!(ab.word(), "ab");
        assert_eq!(ab.map().targets().collect::<Vec<_>>(), vec![None, Some(2), None]);
        // 1 -a-> 0 -b-> 2 passes the accepting state 0
        assert!(ab.map().apply(1).unwrap().accepting);

        let ba = b.then(&a);
        assert_eq!(ba.map().targets().collect::<Vec<_>>(), vec![None, None, None]);
        assert_eq!(ba.map(), &StateMap::undefined(3));
    }

    #[test]
    fn first_word_wins() {
        let mut set = TransformSet::new();
        assert!(set.insert(transform(&[Some(1), Some(1)], "ab")));
        assert!(!set.insert(transform(&[Some(1), Some(1)], "b")));
        assert_eq!(set.len(), 1);
        assert_eq!(set.words().collect::<Vec<_>>(), vec!["ab"]);
    }

    #[test]
    fn combine_is_a_cross_product() {
        let left = TransformSet::from_iter([
            transform(&[Some(1), Some(0)], "a"),
            transform(&[Some(0), Some(1)], "c"),
        ]);
        let right = TransformSet::from_iter([transform(&[Some(1), Some(0)], "a")]);
        let combined = combine(&left, &right);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined.words().collect::<Vec<_>>(), vec!["aa", "ca"]);
    }

    #[test]
    fn star_closure_is_closed() {
        let base = TransformSet::from_iter([
            transform(&[Some(1), Some(2), Some(0)], "a"),
            transform(&[Some(1), Some(0), Some(2)], "b"),
        ]);
        let closure = star_closure(&base, 3);

        assert!(closure.contains(&StateMap::identity(3)));
        for (map, _) in closure.iter() {
            for (base_map, _) in base.iter() {
                assert!(closure.contains(&map.then(base_map)));
            }
        }
        // rotation and swap generate the full symmetric group on three elements
        let distinct_functions = closure
            .iter()
            .map(|(map, _)| map.targets().collect::<Vec<_>>())
            .unique()
            .count();
        assert_eq!(distinct_functions, 6);
        assert!(distinct_functions <= 3usize.pow(3));
        assert!(closure.len() <= 7usize.pow(3));
    }

    #[test]
    fn accepting_flag_separates_equal_functions() {
        // one accepting state with a self loop: the empty word and `a` induce the same function,
        // but only `a` passes the accepting state
        let base = TransformSet::from_iter([transform(&[Some(0)], "a")]);
        let closure = star_closure(&base, 1);
        assert_eq!(closure.len(), 2);
        assert_eq!(closure.words().collect::<Vec<_>>(), vec!["", "a"]);
        assert!(closure.len() <= 3usize.pow(1));
        assert_eq!(
            closure
                .iter()
                .map(|(map, _)| map.targets().collect::<Vec<_>>())
                .unique()
                .count(),
            1
        );
    }

    #[test]
    fn plus_closure_excludes_identity_unless_generated() {
        let base = TransformSet::from_iter([transform(&[Some(1), Some(1)], "a")]);
        let plus = plus_closure(&base, 2);
        assert!(!plus.contains(&StateMap::identity(2)));
        assert_eq!(plus.words().collect::<Vec<_>>(), vec!["a"]);

        let swap = TransformSet::from_iter([transform(&[Some(1), Some(0)], "s")]);
        let plus = plus_closure(&swap, 2);
        assert_eq!(plus.len(), 3);
    }

    #[test]
    fn table_rendering() {
        let set = TransformSet::from_iter([
            StateTransform::identity(2),
            transform(&[Some(1), None], "a"),
        ]);
        let rendered = set.show();
        assert!(rendered.contains("word"));
        assert!(rendered.contains('ε'));
        assert!(rendered.contains('⊥'));
    }
}
