pub mod evaluator;
pub mod state;

pub use evaluator::{Rejection, RoleCounts, SquadEvaluator, SquadSnapshot, ToggleOutcome};
pub use state::SquadState;
