//! Constraint evaluation for squad building.
//!
//! Counts and remaining budget are always derived from the selected ids, never
//! cached on the state.

use super::state::SquadState;
use crate::models::{AthleteId, Candidate, CandidatePool, Formation, Price, Role, SQUAD_SIZE};
use serde::Serialize;
use std::fmt;

/// Why a candidate cannot be added right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    SquadFull { size: usize },
    OverBudget { price: Price, remaining: Price },
    SlotFull { role: Role, limit: u8 },
    UnknownRole,
    NotInPool,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::SquadFull { size } => write!(f, "squad already has {} players", size),
            Rejection::OverBudget { price, remaining } => {
                write!(f, "price {} exceeds remaining budget {}", price, remaining)
            }
            Rejection::SlotFull { role, limit } => {
                write!(f, "all {} {} slots are filled", limit, role.label().to_lowercase())
            }
            Rejection::UnknownRole => write!(f, "player has no selectable position"),
            Rejection::NotInPool => write!(f, "player is not available this round"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToggleOutcome {
    Added(AthleteId),
    Removed { id: AthleteId, captain_cleared: bool },
    Rejected { id: AthleteId, reason: Rejection },
}

impl ToggleOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, ToggleOutcome::Rejected { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub goalkeepers: usize,
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
    /// Selected ids that no longer resolve to a selectable candidate.
    pub unknown: usize,
}

impl RoleCounts {
    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::Goalkeeper => self.goalkeepers,
            Role::Defender => self.defenders,
            Role::Midfielder => self.midfielders,
            Role::Forward => self.forwards,
            Role::Unknown => self.unknown,
        }
    }

    fn bump(&mut self, role: Role) {
        match role {
            Role::Goalkeeper => self.goalkeepers += 1,
            Role::Defender => self.defenders += 1,
            Role::Midfielder => self.midfielders += 1,
            Role::Forward => self.forwards += 1,
            Role::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.goalkeepers + self.defenders + self.midfielders + self.forwards + self.unknown
    }
}

/// Point-in-time summary for display next to the candidate list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadSnapshot {
    pub formation: Formation,
    pub selected: usize,
    pub counts: RoleCounts,
    pub budget: Price,
    pub spent: Price,
    pub remaining: Price,
    pub captain: Option<AthleteId>,
}

impl SquadSnapshot {
    /// Slots still open for a role under the current formation.
    pub fn open_slots(&self, role: Role) -> usize {
        let limit = self.formation.limits().slots_for(role) as usize;
        limit.saturating_sub(self.counts.get(role))
    }

    /// True when the selection matches the formation exactly.
    pub fn is_complete(&self) -> bool {
        let limits = self.formation.limits();
        self.selected == SQUAD_SIZE
            && self.counts.unknown == 0
            && Role::SELECTABLE
                .iter()
                .all(|&role| self.counts.get(role) == limits.slots_for(role) as usize)
    }
}

/// Evaluates squad operations against one candidate pool.
#[derive(Debug, Clone, Copy)]
pub struct SquadEvaluator<'a> {
    pool: &'a CandidatePool,
}

impl<'a> SquadEvaluator<'a> {
    pub fn new(pool: &'a CandidatePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &'a CandidatePool {
        self.pool
    }

    /// Role of a selected id; ids missing from the pool are `Unknown`.
    pub fn role_of(&self, id: AthleteId) -> Role {
        self.pool.get(id).map_or(Role::Unknown, |c| c.role)
    }

    pub fn cost_of(&self, id: AthleteId) -> Price {
        self.pool.get(id).map_or(Price::ZERO, Candidate::cost)
    }

    pub fn counts(&self, state: &SquadState) -> RoleCounts {
        let mut counts = RoleCounts::default();
        for &id in state.selected_ids() {
            counts.bump(self.role_of(id));
        }
        counts
    }

    pub fn spent(&self, state: &SquadState) -> Price {
        state.selected_ids().iter().map(|&id| self.cost_of(id)).sum()
    }

    pub fn remaining_budget(&self, state: &SquadState) -> Price {
        state.budget() - self.spent(state)
    }

    /// Decide whether `candidate` may join the squad.
    ///
    /// Already-selected candidates always pass so they can be toggled off.
    pub fn check_add(&self, state: &SquadState, candidate: &Candidate) -> Result<(), Rejection> {
        if state.is_selected(candidate.id()) {
            return Ok(());
        }

        if state.len() >= SQUAD_SIZE {
            return Err(Rejection::SquadFull { size: state.len() });
        }

        let remaining = self.remaining_budget(state);
        let price = candidate.cost();
        if price > remaining {
            return Err(Rejection::OverBudget { price, remaining });
        }

        let role = candidate.role;
        if !role.is_selectable() {
            return Err(Rejection::UnknownRole);
        }

        let limit = state.formation().limits().slots_for(role);
        if self.counts(state).get(role) >= limit as usize {
            return Err(Rejection::SlotFull { role, limit });
        }

        Ok(())
    }

    pub fn can_add(&self, state: &SquadState, candidate: &Candidate) -> bool {
        self.check_add(state, candidate).is_ok()
    }

    /// Add or remove `candidate`. A refused addition leaves `state` untouched.
    pub fn toggle(&self, state: &mut SquadState, candidate: &Candidate) -> ToggleOutcome {
        let id = candidate.id();

        if state.is_selected(id) {
            return Self::remove(state, id);
        }

        match self.check_add(state, candidate) {
            Ok(()) => {
                state.selected.push(id);
                tracing::debug!(athlete_id = id, role = %candidate.role, "athlete added");
                ToggleOutcome::Added(id)
            }
            Err(reason) => {
                tracing::debug!(athlete_id = id, %reason, "athlete rejected");
                ToggleOutcome::Rejected { id, reason }
            }
        }
    }

    /// Toggle by id. Selected ids can always be removed even when they are
    /// no longer in the pool; unselected ids must resolve to a candidate.
    pub fn toggle_id(&self, state: &mut SquadState, id: AthleteId) -> ToggleOutcome {
        if state.is_selected(id) {
            return Self::remove(state, id);
        }
        match self.pool.get(id) {
            Some(candidate) => self.toggle(state, candidate),
            None => ToggleOutcome::Rejected { id, reason: Rejection::NotInPool },
        }
    }

    fn remove(state: &mut SquadState, id: AthleteId) -> ToggleOutcome {
        state.selected.retain(|&s| s != id);
        let captain_cleared = state.captain == Some(id);
        if captain_cleared {
            state.captain = None;
        }
        tracing::debug!(athlete_id = id, captain_cleared, "athlete removed");
        ToggleOutcome::Removed { id, captain_cleared }
    }

    /// Candidates that could be added now, in pool order.
    pub fn eligible<'s>(&'s self, state: &'s SquadState) -> impl Iterator<Item = &'a Candidate> + 's {
        self.pool
            .iter()
            .filter(move |c| !state.is_selected(c.id()) && self.can_add(state, c))
    }

    pub fn snapshot(&self, state: &SquadState) -> SquadSnapshot {
        let spent = self.spent(state);
        SquadSnapshot {
            formation: state.formation(),
            selected: state.len(),
            counts: self.counts(state),
            budget: state.budget(),
            spent,
            remaining: state.budget() - spent,
            captain: state.captain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Athlete;
    use proptest::prelude::*;

    fn athlete(id: AthleteId, position_id: u8, cents: i64) -> Athlete {
        Athlete {
            id,
            name: format!("A{}", id),
            nickname: None,
            position_id: Some(position_id),
            club_id: None,
            price: Some(Price::from_cents(cents)),
        }
    }

    /// 2 GK, 6 DEF, 6 MID, 5 FWD priced 10.00 each, ids grouped by role.
    fn pool() -> CandidatePool {
        let mut athletes = Vec::new();
        athletes.extend((1..=2).map(|id| athlete(id, 1, 1000)));
        athletes.extend((10..=15).map(|id| athlete(id, 3, 1000)));
        athletes.extend((20..=25).map(|id| athlete(id, 4, 1000)));
        athletes.extend((30..=34).map(|id| athlete(id, 5, 1000)));
        CandidatePool::new(athletes)
    }

    fn pick(eval: &SquadEvaluator, state: &mut SquadState, ids: &[AthleteId]) {
        for &id in ids {
            assert!(eval.toggle_id(state, id).is_applied(), "pick {} refused", id);
        }
    }

    #[test]
    fn test_single_goalkeeper() {
        let pool = pool();
        let eval = SquadEvaluator::new(&pool);
        let mut state = SquadState::new(Price::from_units(200));

        pick(&eval, &mut state, &[1]);
        let second = pool.get(2).unwrap();
        assert_eq!(
            eval.check_add(&state, second),
            Err(Rejection::SlotFull { role: Role::Goalkeeper, limit: 1 })
        );
    }

    #[test]
    fn test_slot_limits_follow_formation() {
        let pool = pool();
        let eval = SquadEvaluator::new(&pool);
        let mut state = SquadState::with_formation(Price::from_units(200), Formation::F442);

        pick(&eval, &mut state, &[10, 11, 12, 13]);
        assert!(!eval.can_add(&state, pool.get(14).unwrap()));

        state.set_formation(Formation::F532);
        assert!(eval.can_add(&state, pool.get(14).unwrap()));
        pick(&eval, &mut state, &[14]);

        // Going back to four defenders keeps the fifth but blocks a sixth.
        state.set_formation(Formation::F433);
        assert_eq!(eval.counts(&state).defenders, 5);
        assert!(!eval.can_add(&state, pool.get(15).unwrap()));
    }

    #[test]
    fn test_squad_full_before_budget_and_role() {
        let pool = pool();
        let eval = SquadEvaluator::new(&pool);
        let mut state = SquadState::new(Price::from_units(200));
        pick(&eval, &mut state, &[1, 10, 11, 12, 13, 20, 21, 22, 30, 31, 32]);
        assert_eq!(state.len(), SQUAD_SIZE);

        assert_eq!(
            eval.check_add(&state, pool.get(2).unwrap()),
            Err(Rejection::SquadFull { size: 11 })
        );
        // Selected players still pass so they can be removed.
        assert!(eval.can_add(&state, pool.get(30).unwrap()));
    }

    #[test]
    fn test_budget_boundary_is_inclusive() {
        let candidates = CandidatePool::new(vec![
            athlete(1, 1, 15_000),
            athlete(2, 3, 5_000),
            athlete(3, 3, 5_001),
        ]);
        let eval = SquadEvaluator::new(&candidates);
        let mut state = SquadState::new(Price::from_units(200));
        pick(&eval, &mut state, &[1]);
        assert_eq!(eval.remaining_budget(&state), Price::from_units(50));

        assert!(eval.can_add(&state, candidates.get(2).unwrap()));
        assert_eq!(
            eval.check_add(&state, candidates.get(3).unwrap()),
            Err(Rejection::OverBudget {
                price: Price::from_cents(5_001),
                remaining: Price::from_units(50),
            })
        );
    }

    #[test]
    fn test_unpriced_athlete_is_free() {
        let mut free = athlete(5, 5, 0);
        free.price = None;
        let candidates = CandidatePool::new(vec![free]);
        let eval = SquadEvaluator::new(&candidates);
        let mut state = SquadState::new(Price::ZERO);

        assert_eq!(eval.toggle_id(&mut state, 5), ToggleOutcome::Added(5));
        assert_eq!(eval.spent(&state), Price::ZERO);
    }

    #[test]
    fn test_unknown_role_never_added() {
        let stray = Candidate::new(Athlete {
            id: 99,
            name: "Coach".into(),
            nickname: None,
            position_id: Some(6),
            club_id: None,
            price: Some(Price::ZERO),
        });
        let pool = pool();
        let eval = SquadEvaluator::new(&pool);
        let mut state = SquadState::new(Price::from_units(200));

        assert_eq!(eval.check_add(&state, &stray), Err(Rejection::UnknownRole));
        assert_eq!(
            eval.toggle(&mut state, &stray),
            ToggleOutcome::Rejected { id: 99, reason: Rejection::UnknownRole }
        );
        assert!(state.is_empty());
    }

    #[test]
    fn test_toggle_by_unknown_id_is_rejected() {
        let pool = pool();
        let eval = SquadEvaluator::new(&pool);
        let mut state = SquadState::new(Price::from_units(200));
        assert_eq!(
            eval.toggle_id(&mut state, 404),
            ToggleOutcome::Rejected { id: 404, reason: Rejection::NotInPool }
        );
    }

    #[test]
    fn test_removing_captain_clears_it() {
        let pool = pool();
        let eval = SquadEvaluator::new(&pool);
        let mut state = SquadState::new(Price::from_units(200));
        pick(&eval, &mut state, &[1, 10, 20]);
        state.set_captain(10).unwrap();

        assert_eq!(
            eval.toggle_id(&mut state, 20),
            ToggleOutcome::Removed { id: 20, captain_cleared: false }
        );
        assert_eq!(state.captain(), Some(10));

        assert_eq!(
            eval.toggle_id(&mut state, 10),
            ToggleOutcome::Removed { id: 10, captain_cleared: true }
        );
        assert_eq!(state.captain(), None);
    }

    #[test]
    fn test_forward_slots_fill_then_close() {
        let pool = pool();
        let eval = SquadEvaluator::new(&pool);
        let mut state = SquadState::new(Price::from_units(200));
        pick(&eval, &mut state, &[10, 11, 12, 13, 20, 21, 22, 30, 31]);

        assert!(eval.can_add(&state, pool.get(32).unwrap()));
        pick(&eval, &mut state, &[32]);
        assert_eq!(
            eval.check_add(&state, pool.get(33).unwrap()),
            Err(Rejection::SlotFull { role: Role::Forward, limit: 3 })
        );
    }

    #[test]
    fn test_eligible_and_snapshot() {
        let pool = pool();
        let eval = SquadEvaluator::new(&pool);
        let mut state = SquadState::new(Price::from_units(30));
        pick(&eval, &mut state, &[1, 10]);

        let snap = eval.snapshot(&state);
        assert_eq!(snap.spent, Price::from_units(20));
        assert_eq!(snap.remaining, Price::from_units(10));
        assert_eq!(snap.open_slots(Role::Defender), 3);
        assert_eq!(snap.open_slots(Role::Goalkeeper), 0);
        assert!(!snap.is_complete());

        // Goalkeeper 2 is blocked by the slot, everyone else fits 10.00.
        let eligible: Vec<_> = eval.eligible(&state).map(Candidate::id).collect();
        assert!(!eligible.contains(&2));
        assert!(!eligible.contains(&1));
        assert!(eligible.contains(&11));
        assert!(eligible.contains(&34));
    }

    proptest! {
        #[test]
        fn prop_can_add_is_monotonic_in_budget(
            picks in proptest::collection::vec(0usize..19, 0..15),
            candidate in 0usize..19,
            budget in 0i64..30_000,
            extra in 1i64..10_000,
        ) {
            let pool = pool();
            let ids: Vec<AthleteId> = pool.iter().map(Candidate::id).collect();
            let eval = SquadEvaluator::new(&pool);

            let mut state = SquadState::new(Price::from_cents(budget));
            for i in picks {
                eval.toggle_id(&mut state, ids[i]);
            }
            let c = pool.get(ids[candidate]).unwrap();

            if eval.can_add(&state, c) {
                let mut richer = state.clone();
                richer.set_budget(Price::from_cents(budget + extra));
                prop_assert!(eval.can_add(&richer, c));
            }
        }

        #[test]
        fn prop_toggle_twice_restores_selection(
            picks in proptest::collection::vec(0usize..19, 0..15),
            target in 0usize..19,
        ) {
            let pool = pool();
            let ids: Vec<AthleteId> = pool.iter().map(Candidate::id).collect();
            let eval = SquadEvaluator::new(&pool);

            let mut state = SquadState::new(Price::from_units(200));
            for i in picks {
                eval.toggle_id(&mut state, ids[i]);
            }
            let mut before: Vec<_> = state.selected_ids().to_vec();
            before.sort_unstable();

            eval.toggle_id(&mut state, ids[target]);
            eval.toggle_id(&mut state, ids[target]);

            let mut after: Vec<_> = state.selected_ids().to_vec();
            after.sort_unstable();
            prop_assert_eq!(before, after);
        }
    }
}
