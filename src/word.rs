mod regex;
pub use regex::RegexNode;

mod parser;
pub use parser::{parse_regex, RegexSyntaxError, RESERVED};

mod omega;
pub use omega::{parse_omega_word, OmegaWordError, ParsedOmegaWord};
