//! Contracts for the external data service, plus two bundled backends.
//!
//! - [`memory::InMemoryStore`]: mutex-guarded tables, used by tests and demos
//! - [`file::JsonFileStore`]: one JSON document on disk, rewritten atomically

pub mod document;
pub mod file;
pub mod memory;

use crate::error::StoreError;
use crate::models::{
    Athlete, AthleteId, Lineup, LineupId, LineupMember, LineupUpsert, Round, RoundId, Team,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use document::{StoreDocument, STORE_DOCUMENT_VERSION};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;

/// One external call of the lineup commit sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitStep {
    UpsertLineup,
    DeleteMembers,
    InsertMembers,
}

impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CommitStep::UpsertLineup => "save lineup",
            CommitStep::DeleteMembers => "clear previous lineup players",
            CommitStep::InsertMembers => "save lineup players",
        };
        f.write_str(s)
    }
}

/// Failure of a commit sequence, tagged with the step that failed and the
/// lineup id if the upsert had already gone through.
#[derive(Debug)]
pub struct CommitFailure {
    pub step: CommitStep,
    pub lineup_id: Option<LineupId>,
    pub source: StoreError,
}

impl CommitFailure {
    pub fn at(step: CommitStep, lineup_id: Option<LineupId>, source: StoreError) -> Self {
        Self { step, lineup_id, source }
    }
}

#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Purchasable athletes for `round_id`, or every athlete ordered by name
    /// when no round is open.
    async fn list_candidates(&self, round_id: Option<RoundId>) -> Result<Vec<Athlete>, StoreError>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn get_team(&self, user_id: &str) -> Result<Option<Team>, StoreError>;
}

#[async_trait]
pub trait RoundStore: Send + Sync {
    /// Highest-id round that is currently open.
    async fn get_open_round(&self) -> Result<Option<Round>, StoreError>;
}

#[async_trait]
pub trait LineupStore: Send + Sync {
    /// Insert or update the lineup keyed by (team, round); returns its id.
    async fn upsert_lineup(&self, lineup: &LineupUpsert) -> Result<LineupId, StoreError>;

    async fn delete_members(&self, lineup_id: &str) -> Result<(), StoreError>;

    async fn insert_members(&self, members: &[LineupMember]) -> Result<(), StoreError>;

    async fn get_lineup(
        &self,
        team_id: &str,
        round_id: RoundId,
    ) -> Result<Option<Lineup>, StoreError>;

    async fn list_members(&self, lineup_id: &str) -> Result<Vec<LineupMember>, StoreError>;

    /// Upsert the lineup, then replace its members.
    ///
    /// The provided sequence is three separate calls and can stop half way.
    /// Backends that can apply it as one unit override this.
    async fn commit_lineup(
        &self,
        lineup: &LineupUpsert,
        athlete_ids: &[AthleteId],
    ) -> Result<LineupId, CommitFailure> {
        commit_stepwise(self, lineup, athlete_ids).await
    }
}

/// Upsert, delete members, insert members; each as its own store call.
pub async fn commit_stepwise<S>(
    store: &S,
    lineup: &LineupUpsert,
    athlete_ids: &[AthleteId],
) -> Result<LineupId, CommitFailure>
where
    S: LineupStore + ?Sized,
{
    let lineup_id = store
        .upsert_lineup(lineup)
        .await
        .map_err(|e| CommitFailure::at(CommitStep::UpsertLineup, None, e))?;

    if let Err(e) = store.delete_members(&lineup_id).await {
        return Err(CommitFailure::at(CommitStep::DeleteMembers, Some(lineup_id), e));
    }

    let rows = starter_rows(&lineup_id, athlete_ids);
    if let Err(e) = store.insert_members(&rows).await {
        return Err(CommitFailure::at(CommitStep::InsertMembers, Some(lineup_id), e));
    }

    Ok(lineup_id)
}

/// Everything a squad-building session reads from and writes to.
pub trait DataService: RosterSource + TeamStore + RoundStore + LineupStore {}

impl<T> DataService for T where T: RosterSource + TeamStore + RoundStore + LineupStore {}

pub(crate) fn starter_rows(lineup_id: &str, athlete_ids: &[AthleteId]) -> Vec<LineupMember> {
    athlete_ids
        .iter()
        .map(|&athlete_id| LineupMember {
            lineup_id: lineup_id.to_string(),
            athlete_id,
            is_starter: true,
        })
        .collect()
}

/// Roster rule shared by the bundled backends: market rows for the round
/// with their price override, or every athlete by name when no round is open.
pub(crate) fn resolve_candidates(
    athletes: &[Athlete],
    market: &[crate::models::MarketEntry],
    round_id: Option<RoundId>,
) -> Vec<Athlete> {
    match round_id {
        Some(round_id) => market
            .iter()
            .filter(|entry| entry.round_id == round_id)
            .filter_map(|entry| {
                let athlete = athletes.iter().find(|a| a.id == entry.athlete_id)?;
                let mut listed = athlete.clone();
                listed.price = entry.price.or(athlete.price);
                Some(listed)
            })
            .collect(),
        None => {
            let mut all = athletes.to_vec();
            all.sort_by(|a, b| a.name.cmp(&b.name));
            all
        }
    }
}

pub(crate) fn pick_open_round(rounds: &[Round]) -> Option<Round> {
    rounds.iter().filter(|r| r.is_open).max_by_key(|r| r.id).copied()
}
