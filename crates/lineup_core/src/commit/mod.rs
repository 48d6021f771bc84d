pub mod protocol;

pub use protocol::{
    commit_squad, resolve_target, validate_for_commit, CommitPlan, CommitReceipt,
    CompletenessIssue,
};
