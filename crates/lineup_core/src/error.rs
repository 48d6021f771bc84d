use crate::commit::CompletenessIssue;
use crate::models::{AthleteId, LineupId, UserId};
use crate::store::CommitStep;
use thiserror::Error;

/// Shown when an underlying failure carries no message of its own.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SquadError {
    #[error("Invalid formation: {0}")]
    InvalidFormation(String),

    #[error("Captain {0} is not in the selected squad")]
    CaptainNotSelected(AthleteId),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store document version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Squad is not complete: {}", format_issues(.issues))]
    IncompleteSquad { issues: Vec<CompletenessIssue> },

    #[error("No team found for this account")]
    MissingTeam,

    #[error("No open round to save the lineup for")]
    MissingRound,

    #[error("Failed to {step}: {source}")]
    Store {
        step: CommitStep,
        #[source]
        source: StoreError,
    },

    #[error("Lineup {lineup_id} partially saved, failed to {step}: {source}")]
    PartiallySaved {
        lineup_id: LineupId,
        step: CommitStep,
        #[source]
        source: StoreError,
    },
}

impl CommitError {
    /// Every commit failure can be retried by saving again.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CommitError::IncompleteSquad { .. } => true,
            CommitError::MissingTeam | CommitError::MissingRound => true,
            CommitError::Store { .. } | CommitError::PartiallySaved { .. } => true,
        }
    }

    /// Validation failures are rejected before any store call is made.
    pub fn touched_store(&self) -> bool {
        matches!(self, CommitError::Store { .. } | CommitError::PartiallySaved { .. })
    }

    /// Message for the person pressing "save".
    pub fn user_message(&self) -> String {
        match self {
            CommitError::Store { source, .. } => cause_message(source),
            CommitError::PartiallySaved { source, .. } => {
                format!("Lineup partially saved. {}", cause_message(source))
            }
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No team found for user {0}")]
    MissingTeam(UserId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error("Session has not finished loading")]
    NotLoaded,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

fn cause_message(err: &StoreError) -> String {
    let msg = err.to_string();
    let msg = msg.trim();
    if msg.is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else {
        msg.to_string()
    }
}

fn format_issues(issues: &[CompletenessIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
