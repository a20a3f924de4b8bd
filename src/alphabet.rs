use itertools::Itertools;

use crate::Show;

/// Represents an alphabet where a symbol is just a single `char`. Symbols keep the
/// order in which they were first declared, duplicates are dropped.
///
/// # Example
/// ```
/// use omega_membership::alphabet::CharAlphabet;
/// let alphabet = CharAlphabet::from_iter("abca".chars());
/// assert_eq!(alphabet.size(), 3);
/// assert_eq!(alphabet.position('c'), Some(2));
/// assert_eq!(alphabet.position('d'), None);
/// ```
#[derive(Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord, Default)]
pub struct CharAlphabet(Vec<char>);

impl CharAlphabet {
    /// Creates a new [`CharAlphabet`] alphabet of the given size. The symbols are just the first `size` letters
    /// of the alphabet, i.e. 'a' to 'z'.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self((0..size).map(|i| (b'a' + i as u8) as char).collect())
    }

    /// Returns the number of symbols.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the alphabet has no symbols at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gives the dense index of `symbol`, if it belongs to the alphabet.
    pub fn position(&self, symbol: char) -> Option<usize> {
        self.0.iter().position(|sym| *sym == symbol)
    }

    /// Returns `true` if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.0.contains(&symbol)
    }

    /// Iterates over all symbols in declaration order.
    pub fn universe(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

impl std::ops::Index<usize> for CharAlphabet {
    type Output = char;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl FromIterator<char> for CharAlphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self(iter.into_iter().unique().collect())
    }
}

impl Show for CharAlphabet {
    fn show(&self) -> String {
        format!("{{{}}}", self.0.iter().join(", "))
    }
}
