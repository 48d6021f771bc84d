//! One squad-building session, from loading the round data to saving.
//!
//! Fetches are asynchronous and may finish after the owner has moved on.
//! Each load is tagged with a [`LoadTicket`]; results carrying an outdated
//! ticket, or arriving after [`SquadSession::teardown`], are dropped.

use crate::commit::{commit_squad, CommitReceipt};
use crate::config::EngineConfig;
use crate::error::{SessionError, SquadError};
use crate::models::{Athlete, AthleteId, CandidatePool, Formation, Round, Team};
use crate::squad::{SquadEvaluator, SquadSnapshot, SquadState, ToggleOutcome};
use crate::store::{DataService, LineupStore, RosterSource, RoundStore, TeamStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Data fetched for a session before it is applied.
#[derive(Debug, Clone)]
pub struct LoadedContext {
    pub team: Team,
    pub round: Option<Round>,
    pub athletes: Vec<Athlete>,
}

/// Fetch the team, the open round and the candidates for that round.
///
/// Without an open round the full athlete list is used.
pub async fn fetch_context<S>(store: &S, user_id: &str) -> Result<LoadedContext, SessionError>
where
    S: TeamStore + RoundStore + RosterSource + ?Sized,
{
    let team = store
        .get_team(user_id)
        .await?
        .ok_or_else(|| SessionError::MissingTeam(user_id.to_string()))?;
    let round = store.get_open_round().await?;
    let athletes = store.list_candidates(round.map(|r| r.id)).await?;

    tracing::debug!(
        team_id = %team.id,
        round_id = ?round.map(|r| r.id),
        athletes = athletes.len(),
        "session context fetched"
    );
    Ok(LoadedContext { team, round, athletes })
}

#[derive(Debug)]
pub struct SquadSession {
    config: EngineConfig,
    generation: u64,
    torn_down: bool,
    loaded: bool,
    team: Option<Team>,
    round: Option<Round>,
    pool: CandidatePool,
    state: SquadState,
}

impl SquadSession {
    pub fn new(config: EngineConfig) -> Self {
        let state = SquadState::with_formation(config.default_budget, config.default_formation);
        Self {
            config,
            generation: 0,
            torn_down: false,
            loaded: false,
            team: None,
            round: None,
            pool: CandidatePool::default(),
            state,
        }
    }

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        !self.torn_down && ticket.0 == self.generation
    }

    /// Apply fetched data. Returns `false` and drops `ctx` when the ticket
    /// is stale or the session was torn down.
    pub fn apply_load(&mut self, ticket: LoadTicket, ctx: LoadedContext) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!(
                ticket = ticket.0,
                current = self.generation,
                torn_down = self.torn_down,
                "discarding stale session load"
            );
            return false;
        }

        let budget = ctx.team.budget_or(self.config.default_budget);
        self.state = SquadState::with_formation(budget, self.config.default_formation);
        self.pool = CandidatePool::new(ctx.athletes);
        self.team = Some(ctx.team);
        self.round = ctx.round;
        self.loaded = true;

        tracing::info!(
            budget = %budget,
            candidates = self.pool.len(),
            round_id = ?self.round.map(|r| r.id),
            "session loaded"
        );
        true
    }

    /// Fetch and apply in one go.
    pub async fn load<S>(&mut self, store: &S, user_id: &str) -> Result<bool, SessionError>
    where
        S: DataService + ?Sized,
    {
        let ticket = self.begin_load();
        let ctx = fetch_context(store, user_id).await?;
        Ok(self.apply_load(ticket, ctx))
    }

    /// The owner is gone; nothing fetched from now on is applied.
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn team(&self) -> Option<&Team> {
        self.team.as_ref()
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn state(&self) -> &SquadState {
        &self.state
    }

    pub fn evaluator(&self) -> SquadEvaluator<'_> {
        SquadEvaluator::new(&self.pool)
    }

    pub fn toggle(&mut self, id: AthleteId) -> ToggleOutcome {
        SquadEvaluator::new(&self.pool).toggle_id(&mut self.state, id)
    }

    pub fn set_formation(&mut self, formation: Formation) {
        self.state.set_formation(formation);
    }

    pub fn set_captain(&mut self, id: AthleteId) -> Result<(), SquadError> {
        self.state.set_captain(id)
    }

    pub fn snapshot(&self) -> SquadSnapshot {
        self.evaluator().snapshot(&self.state)
    }

    /// Commit the current squad for the session's team and open round.
    pub async fn save<S>(&self, store: &S) -> Result<CommitReceipt, SessionError>
    where
        S: LineupStore + ?Sized,
    {
        if !self.loaded {
            return Err(SessionError::NotLoaded);
        }
        let receipt =
            commit_squad(store, self.team.as_ref(), self.round.as_ref(), &self.state, &self.pool)
                .await?;
        Ok(receipt)
    }
}
