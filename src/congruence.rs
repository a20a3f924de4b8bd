mod transform;
pub use transform::{
    combine, plus_closure, star_closure, Reached, StateMap, StateTransform, TransformSet,
};

mod evaluate;
pub use evaluate::evaluate_regex;
