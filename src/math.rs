/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;
/// A map that remembers the order in which keys were first inserted. Iteration order is
/// therefore deterministic, which keeps witnesses and diagnostics stable between runs.
pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;
