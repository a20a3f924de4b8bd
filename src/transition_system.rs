mod table;
pub use table::TransitionTable;

mod run;
pub use run::{find_periodic_cycle, run_word, CycleResult, Stuck};
