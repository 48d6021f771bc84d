use super::document::{now_ms, StoreDocument};
use super::{
    commit_stepwise, starter_rows, CommitFailure, CommitStep, LineupStore, RosterSource,
    RoundStore, TeamStore,
};
use crate::error::StoreError;
use crate::models::{
    Athlete, AthleteId, Lineup, LineupId, LineupMember, LineupUpsert, MarketEntry, Round, RoundId,
    Team,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Store kept entirely in memory.
///
/// Commits apply under a single lock, so a failed commit leaves nothing
/// behind. `stepwise()` switches to the three-call sequence instead, which is
/// what a plain remote table API gives you. Failures can be injected per step.
#[derive(Debug)]
pub struct InMemoryStore {
    doc: Mutex<StoreDocument>,
    failing: Mutex<HashSet<CommitStep>>,
    stepwise: bool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::from_document(StoreDocument::new())
    }

    pub fn from_document(doc: StoreDocument) -> Self {
        Self { doc: Mutex::new(doc), failing: Mutex::new(HashSet::new()), stepwise: false }
    }

    /// Commit as three independent calls rather than one unit.
    pub fn stepwise(mut self) -> Self {
        self.stepwise = true;
        self
    }

    pub fn with_team(self, team: Team) -> Self {
        self.edit(|d| d.teams.push(team));
        self
    }

    pub fn with_round(self, round: Round) -> Self {
        self.edit(|d| d.rounds.push(round));
        self
    }

    pub fn with_athletes(self, athletes: impl IntoIterator<Item = Athlete>) -> Self {
        self.edit(|d| d.athletes.extend(athletes));
        self
    }

    pub fn with_market(self, entries: impl IntoIterator<Item = MarketEntry>) -> Self {
        self.edit(|d| d.market.extend(entries));
        self
    }

    /// Make every later call of `step` fail with a backend error.
    pub fn fail_on(&self, step: CommitStep) {
        recover(&self.failing, "failure injection").insert(step);
    }

    pub fn clear_failures(&self) {
        recover(&self.failing, "failure injection").clear();
    }

    /// Copy of the current tables.
    pub fn document(&self) -> Result<StoreDocument, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn edit(&self, f: impl FnOnce(&mut StoreDocument)) {
        f(&mut recover(&self.doc, "store seed"));
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreDocument>, StoreError> {
        self.doc.lock().map_err(|_| StoreError::Poisoned)
    }

    fn check(&self, step: CommitStep) -> Result<(), StoreError> {
        let failing = self.failing.lock().map_err(|_| StoreError::Poisoned)?;
        if failing.contains(&step) {
            return Err(StoreError::Backend(format!("injected failure: {}", step)));
        }
        Ok(())
    }
}

/// Take the lock even if a panicking holder poisoned it, clearing the poison.
fn recover<'m, T>(mutex: &'m Mutex<T>, what: &str) -> MutexGuard<'m, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        tracing::warn!(what, "recovering poisoned in-memory store lock");
        mutex.clear_poison();
        poisoned.into_inner()
    })
}

#[async_trait]
impl RosterSource for InMemoryStore {
    async fn list_candidates(&self, round_id: Option<RoundId>) -> Result<Vec<Athlete>, StoreError> {
        Ok(self.lock()?.candidates(round_id))
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn get_team(&self, user_id: &str) -> Result<Option<Team>, StoreError> {
        Ok(self.lock()?.team_for_owner(user_id))
    }
}

#[async_trait]
impl RoundStore for InMemoryStore {
    async fn get_open_round(&self) -> Result<Option<Round>, StoreError> {
        Ok(self.lock()?.open_round())
    }
}

#[async_trait]
impl LineupStore for InMemoryStore {
    async fn upsert_lineup(&self, lineup: &LineupUpsert) -> Result<LineupId, StoreError> {
        self.check(CommitStep::UpsertLineup)?;
        Ok(self.lock()?.upsert_lineup(lineup, now_ms()))
    }

    async fn delete_members(&self, lineup_id: &str) -> Result<(), StoreError> {
        self.check(CommitStep::DeleteMembers)?;
        self.lock()?.delete_members(lineup_id);
        Ok(())
    }

    async fn insert_members(&self, members: &[LineupMember]) -> Result<(), StoreError> {
        self.check(CommitStep::InsertMembers)?;
        self.lock()?.insert_members(members)
    }

    async fn get_lineup(
        &self,
        team_id: &str,
        round_id: RoundId,
    ) -> Result<Option<Lineup>, StoreError> {
        Ok(self.lock()?.lineup(team_id, round_id))
    }

    async fn list_members(&self, lineup_id: &str) -> Result<Vec<LineupMember>, StoreError> {
        Ok(self.lock()?.members(lineup_id))
    }

    async fn commit_lineup(
        &self,
        lineup: &LineupUpsert,
        athlete_ids: &[AthleteId],
    ) -> Result<LineupId, CommitFailure> {
        if self.stepwise {
            return commit_stepwise(self, lineup, athlete_ids).await;
        }

        for step in [CommitStep::UpsertLineup, CommitStep::DeleteMembers, CommitStep::InsertMembers] {
            self.check(step).map_err(|e| CommitFailure::at(step, None, e))?;
        }

        let mut doc = self
            .lock()
            .map_err(|e| CommitFailure::at(CommitStep::UpsertLineup, None, e))?;

        // Work on a copy so a refused insert leaves the tables as they were.
        let mut staged = doc.clone();
        let lineup_id = staged.upsert_lineup(lineup, now_ms());
        staged.delete_members(&lineup_id);
        staged
            .insert_members(&starter_rows(&lineup_id, athlete_ids))
            .map_err(|e| CommitFailure::at(CommitStep::InsertMembers, None, e))?;
        *doc = staged;

        Ok(lineup_id)
    }
}
