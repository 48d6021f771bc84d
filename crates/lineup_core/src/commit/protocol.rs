use crate::error::CommitError;
use crate::models::{
    AthleteId, CandidatePool, Formation, LineupId, LineupUpsert, Role, Round, RoundId, Team,
    TeamId, SQUAD_SIZE,
};
use crate::squad::{SquadEvaluator, SquadState};
use crate::store::{CommitFailure, LineupStore};
use serde::Serialize;
use std::fmt;

/// One reason a squad cannot be saved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletenessIssue {
    WrongSize { expected: usize, found: usize },
    RoleMismatch { role: Role, expected: usize, found: usize },
}

impl fmt::Display for CompletenessIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompletenessIssue::WrongSize { expected, found } => {
                write!(f, "{} players selected, {} required", found, expected)
            }
            CompletenessIssue::RoleMismatch { role: Role::Unknown, found, .. } => {
                write!(f, "{} selected players are no longer available", found)
            }
            CompletenessIssue::RoleMismatch { role, expected, found } => {
                write!(f, "{} {} selected, {} required", found, role.label(), expected)
            }
        }
    }
}

/// A squad that passed every completeness check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitPlan {
    pub formation: Formation,
    pub captain_id: AthleteId,
    pub athlete_ids: Vec<AthleteId>,
}

impl CommitPlan {
    pub fn to_upsert(&self, team_id: &str, round_id: RoundId) -> LineupUpsert {
        LineupUpsert {
            team_id: team_id.to_string(),
            round_id,
            captain_id: self.captain_id,
            formation: self.formation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitReceipt {
    pub lineup_id: LineupId,
    pub team_id: TeamId,
    pub round_id: RoundId,
    pub formation: Formation,
    pub captain_id: AthleteId,
    pub members: Vec<AthleteId>,
}

/// Check that the selection fills the formation exactly.
///
/// Every mismatch is reported, not just the first. An unset captain falls
/// back to the first selected player.
pub fn validate_for_commit(
    state: &SquadState,
    pool: &CandidatePool,
) -> Result<CommitPlan, CommitError> {
    let evaluator = SquadEvaluator::new(pool);
    let counts = evaluator.counts(state);
    let limits = state.formation().limits();
    let mut issues = Vec::new();

    if state.len() != SQUAD_SIZE {
        issues.push(CompletenessIssue::WrongSize { expected: SQUAD_SIZE, found: state.len() });
    }

    for role in Role::SELECTABLE {
        let expected = limits.slots_for(role) as usize;
        let found = counts.get(role);
        if found != expected {
            issues.push(CompletenessIssue::RoleMismatch { role, expected, found });
        }
    }

    if counts.unknown > 0 {
        issues.push(CompletenessIssue::RoleMismatch {
            role: Role::Unknown,
            expected: 0,
            found: counts.unknown,
        });
    }

    if !issues.is_empty() {
        return Err(CommitError::IncompleteSquad { issues });
    }

    let Some(captain_id) = state.effective_captain() else {
        return Err(CommitError::IncompleteSquad {
            issues: vec![CompletenessIssue::WrongSize { expected: SQUAD_SIZE, found: state.len() }],
        });
    };

    Ok(CommitPlan {
        formation: state.formation(),
        captain_id,
        athlete_ids: state.selected_ids().to_vec(),
    })
}

/// Resolve the team and open round a lineup is saved for.
pub fn resolve_target<'a>(
    team: Option<&'a Team>,
    round: Option<&Round>,
) -> Result<(&'a Team, RoundId), CommitError> {
    let team = team.ok_or(CommitError::MissingTeam)?;
    let round = round.filter(|r| r.is_open).ok_or(CommitError::MissingRound)?;
    Ok((team, round.id))
}

/// Validate the squad and persist it as the team's lineup for the round.
///
/// All checks run before the first store call. The store receives the whole
/// lineup in one `commit_lineup` call; if it reports a failure after the
/// lineup header was written, the error is `PartiallySaved`.
pub async fn commit_squad<S>(
    store: &S,
    team: Option<&Team>,
    round: Option<&Round>,
    state: &SquadState,
    pool: &CandidatePool,
) -> Result<CommitReceipt, CommitError>
where
    S: LineupStore + ?Sized,
{
    let plan = validate_for_commit(state, pool)?;
    let (team, round_id) = resolve_target(team, round)?;
    let upsert = plan.to_upsert(&team.id, round_id);

    let lineup_id = store
        .commit_lineup(&upsert, &plan.athlete_ids)
        .await
        .map_err(into_commit_error)?;

    tracing::info!(
        lineup_id = %lineup_id,
        team_id = %team.id,
        round_id,
        formation = %plan.formation,
        captain_id = plan.captain_id,
        "lineup saved"
    );

    Ok(CommitReceipt {
        lineup_id,
        team_id: team.id.clone(),
        round_id,
        formation: plan.formation,
        captain_id: plan.captain_id,
        members: plan.athlete_ids,
    })
}

fn into_commit_error(failure: CommitFailure) -> CommitError {
    let CommitFailure { step, lineup_id, source } = failure;
    match lineup_id {
        Some(lineup_id) => {
            tracing::warn!(lineup_id = %lineup_id, %step, error = %source, "lineup partially saved");
            CommitError::PartiallySaved { lineup_id, step, source }
        }
        None => {
            tracing::warn!(%step, error = %source, "lineup save failed");
            CommitError::Store { step, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Athlete, Price};
    use crate::squad::ToggleOutcome;
    use crate::store::{CommitStep, InMemoryStore};

    fn athlete(id: AthleteId, position_id: u8) -> Athlete {
        Athlete {
            id,
            name: format!("A{}", id),
            nickname: None,
            position_id: Some(position_id),
            club_id: None,
            price: Some(Price::from_units(10)),
        }
    }

    fn pool() -> CandidatePool {
        let mut athletes = vec![athlete(1, 1)];
        athletes.extend((10..=14).map(|id| athlete(id, 2)));
        athletes.extend((20..=24).map(|id| athlete(id, 4)));
        athletes.extend((30..=32).map(|id| athlete(id, 5)));
        CandidatePool::new(athletes)
    }

    fn squad(pool: &CandidatePool, ids: &[AthleteId]) -> SquadState {
        let eval = SquadEvaluator::new(pool);
        let mut state = SquadState::new(Price::from_units(200));
        for &id in ids {
            assert!(eval.toggle_id(&mut state, id).is_applied());
        }
        state
    }

    const FULL_433: [AthleteId; 11] = [1, 10, 11, 12, 13, 20, 21, 22, 30, 31, 32];

    fn team() -> Team {
        Team { id: "team-1".into(), owner_id: "u".into(), name: "T".into(), balance: None }
    }

    #[test]
    fn test_complete_squad_defaults_captain_to_first_pick() {
        let pool = pool();
        let state = squad(&pool, &FULL_433);
        let plan = validate_for_commit(&state, &pool).unwrap();
        assert_eq!(plan.captain_id, 1);
        assert_eq!(plan.athlete_ids, FULL_433.to_vec());
    }

    #[test]
    fn test_formation_change_makes_squad_incomplete() {
        let pool = pool();
        let mut state = squad(&pool, &FULL_433);
        state.set_formation(Formation::F442);

        let err = validate_for_commit(&state, &pool).unwrap_err();
        let CommitError::IncompleteSquad { issues } = err else {
            panic!("expected incomplete squad");
        };
        assert_eq!(
            issues,
            vec![
                CompletenessIssue::RoleMismatch { role: Role::Midfielder, expected: 4, found: 3 },
                CompletenessIssue::RoleMismatch { role: Role::Forward, expected: 2, found: 3 },
            ]
        );
    }

    #[test]
    fn test_player_dropped_from_pool_blocks_commit_but_can_be_removed() {
        let full = pool();
        let mut state = squad(&full, &FULL_433);
        state.set_captain(1).unwrap();

        // Roster refreshed without forward 32.
        let shrunk = CandidatePool::new(
            full.iter().filter(|c| c.id() != 32).map(|c| c.athlete.clone()).collect(),
        );
        let eval = SquadEvaluator::new(&shrunk);

        let counts = eval.counts(&state);
        assert_eq!(counts.forwards, 2);
        assert_eq!(counts.unknown, 1);
        assert_eq!(counts.total(), SQUAD_SIZE);
        assert_eq!(eval.cost_of(32), Price::ZERO);
        assert_eq!(eval.remaining_budget(&state), Price::from_units(100));

        let err = validate_for_commit(&state, &shrunk).unwrap_err();
        assert!(err.to_string().contains("1 selected players are no longer available"));
        let CommitError::IncompleteSquad { issues } = err else {
            panic!("expected incomplete squad");
        };
        assert_eq!(
            issues,
            vec![
                CompletenessIssue::RoleMismatch { role: Role::Forward, expected: 3, found: 2 },
                CompletenessIssue::RoleMismatch { role: Role::Unknown, expected: 0, found: 1 },
            ]
        );

        assert_eq!(
            eval.toggle_id(&mut state, 32),
            ToggleOutcome::Removed { id: 32, captain_cleared: false }
        );
        assert_eq!(state.len(), SQUAD_SIZE - 1);
        assert_eq!(eval.counts(&state).unknown, 0);
        assert_eq!(state.captain(), Some(1));
    }

    #[test]
    fn test_missing_team_and_round() {
        let open = Round { id: 5, is_open: true };
        let closed = Round { id: 6, is_open: false };
        let t = team();
        assert!(matches!(resolve_target(None, Some(&open)), Err(CommitError::MissingTeam)));
        assert!(matches!(resolve_target(Some(&t), None), Err(CommitError::MissingRound)));
        assert!(matches!(resolve_target(Some(&t), Some(&closed)), Err(CommitError::MissingRound)));
        assert_eq!(resolve_target(Some(&t), Some(&open)).unwrap().1, 5);
    }

    #[tokio::test]
    async fn test_ten_players_never_reach_the_store() {
        let pool = pool();
        let state = squad(&pool, &FULL_433[..10]);
        let store = InMemoryStore::new();
        // Any store call would fail loudly.
        store.fail_on(CommitStep::UpsertLineup);

        let round = Round { id: 1, is_open: true };
        let err = commit_squad(&store, Some(&team()), Some(&round), &state, &pool).await.unwrap_err();
        assert!(matches!(err, CommitError::IncompleteSquad { .. }));
        assert!(!err.touched_store());
        assert!(store.document().unwrap().lineups.is_empty());
    }

    #[tokio::test]
    async fn test_partial_save_is_reported() {
        let pool = pool();
        let mut state = squad(&pool, &FULL_433);
        state.set_captain(30).unwrap();
        let store = InMemoryStore::new().stepwise();
        store.fail_on(CommitStep::DeleteMembers);
        let round = Round { id: 1, is_open: true };

        let err = commit_squad(&store, Some(&team()), Some(&round), &state, &pool).await.unwrap_err();
        match err {
            CommitError::PartiallySaved { step, .. } => assert_eq!(step, CommitStep::DeleteMembers),
            other => panic!("unexpected {other:?}"),
        }

        store.clear_failures();
        let receipt = commit_squad(&store, Some(&team()), Some(&round), &state, &pool).await.unwrap();
        assert_eq!(receipt.captain_id, 30);
        assert_eq!(receipt.members.len(), SQUAD_SIZE);
    }
}
