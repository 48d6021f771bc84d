//! # lineup_core - Squad Selection & Budget Constraint Engine
//!
//! Builds an 11-player fantasy lineup for a competition round:
//! - position ids classified into formation roles once per roster snapshot
//! - formation slot limits and budget enforced on every addition
//! - complete squads committed as a lineup plus its member rows, replacing
//!   whatever the team had saved for that round
//!
//! The data service (teams, rounds, roster, lineups) sits behind the async
//! traits in [`store`]; an in-memory and a JSON-file backend are bundled.

pub mod commit;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod squad;
pub mod store;

pub use commit::{
    commit_squad, validate_for_commit, CommitPlan, CommitReceipt, CompletenessIssue,
};
pub use config::{EngineConfig, CONFIG_PATH_ENV, DEFAULT_BUDGET};
pub use error::{CommitError, ConfigError, SessionError, SquadError, StoreError};
pub use models::{
    Athlete, AthleteId, Candidate, CandidatePool, Formation, FormationLimits, Lineup,
    LineupMember, Price, Role, Round, RoundId, Team, SQUAD_SIZE,
};
pub use session::{fetch_context, LoadTicket, LoadedContext, SquadSession};
pub use squad::{Rejection, RoleCounts, SquadEvaluator, SquadSnapshot, SquadState, ToggleOutcome};
pub use store::{
    CommitStep, DataService, InMemoryStore, JsonFileStore, LineupStore, RosterSource, RoundStore,
    TeamStore,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
