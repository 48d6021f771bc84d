use super::money::Price;
use super::position::{position_label, PositionId, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type AthleteId = u32;
pub type ClubId = u32;

/// A selectable player as listed for the current round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub position_id: Option<PositionId>,
    #[serde(default)]
    pub club_id: Option<ClubId>,
    /// Missing prices cost nothing against the budget.
    #[serde(default)]
    pub price: Option<Price>,
}

impl Athlete {
    /// Nickname when present and non-blank, otherwise the registered name.
    pub fn display_name(&self) -> &str {
        match self.nickname.as_deref().map(str::trim) {
            Some(nick) if !nick.is_empty() => nick,
            _ => &self.name,
        }
    }

    /// Price as counted against the budget.
    pub fn cost(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }

    pub fn price_label(&self) -> String {
        Price::label(self.price)
    }

    pub fn position_label(&self) -> &'static str {
        self.position_id.and_then(position_label).unwrap_or("-")
    }
}

/// An athlete paired with its role, classified once when the pool is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub athlete: Athlete,
    pub role: Role,
}

impl Candidate {
    pub fn new(athlete: Athlete) -> Self {
        let role = Role::classify(athlete.position_id);
        Self { athlete, role }
    }

    #[inline]
    pub fn id(&self) -> AthleteId {
        self.athlete.id
    }

    #[inline]
    pub fn cost(&self) -> Price {
        self.athlete.cost()
    }
}

/// Immutable snapshot of the purchasable players for one selection session.
///
/// Athletes without a selectable role (coach, missing position) are dropped
/// on construction. Source order is preserved for display.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
    index: HashMap<AthleteId, usize>,
    excluded: usize,
}

impl CandidatePool {
    pub fn new(athletes: Vec<Athlete>) -> Self {
        let mut pool = CandidatePool::default();

        for athlete in athletes {
            let candidate = Candidate::new(athlete);
            if !candidate.role.is_selectable() {
                pool.excluded += 1;
                continue;
            }
            if pool.index.contains_key(&candidate.id()) {
                tracing::warn!(athlete_id = candidate.id(), "duplicate athlete in roster, keeping first");
                pool.excluded += 1;
                continue;
            }
            pool.index.insert(candidate.id(), pool.candidates.len());
            pool.candidates.push(candidate);
        }

        tracing::debug!(
            candidates = pool.candidates.len(),
            excluded = pool.excluded,
            "candidate pool built"
        );
        pool
    }

    pub fn get(&self, id: AthleteId) -> Option<&Candidate> {
        self.index.get(&id).map(|&i| &self.candidates[i])
    }

    pub fn contains(&self, id: AthleteId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn by_role(&self, role: Role) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(move |c| c.role == role)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Roster entries dropped as unselectable or duplicate.
    pub fn excluded(&self) -> usize {
        self.excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete(id: AthleteId, position_id: Option<PositionId>) -> Athlete {
        Athlete {
            id,
            name: format!("Player {}", id),
            nickname: None,
            position_id,
            club_id: Some(262),
            price: Some(Price::from_units(5)),
        }
    }

    #[test]
    fn test_pool_drops_coach_and_unpositioned() {
        let pool = CandidatePool::new(vec![
            athlete(1, Some(1)),
            athlete(2, Some(6)),
            athlete(3, None),
            athlete(4, Some(3)),
        ]);

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.excluded(), 2);
        assert!(pool.get(2).is_none());
        assert_eq!(pool.get(4).map(|c| c.role), Some(Role::Defender));
    }

    #[test]
    fn test_pool_keeps_first_duplicate_and_order() {
        let mut dup = athlete(1, Some(5));
        dup.name = "Impostor".into();
        let pool = CandidatePool::new(vec![athlete(7, Some(4)), athlete(1, Some(1)), dup]);

        let ids: Vec<_> = pool.iter().map(Candidate::id).collect();
        assert_eq!(ids, vec![7, 1]);
        assert_eq!(pool.get(1).unwrap().role, Role::Goalkeeper);
        assert_eq!(pool.by_role(Role::Midfielder).count(), 1);
    }

    #[test]
    fn test_display_helpers() {
        let mut a = athlete(9, Some(5));
        assert_eq!(a.display_name(), "Player 9");
        a.nickname = Some("  ".into());
        assert_eq!(a.display_name(), "Player 9");
        a.nickname = Some("Gabigol".into());
        assert_eq!(a.display_name(), "Gabigol");
        assert_eq!(a.position_label(), "Atacante");

        a.price = None;
        assert_eq!(a.cost(), Price::ZERO);
        assert_eq!(a.price_label(), "unknown");
    }

    #[test]
    fn test_athlete_json_shape() {
        let a: Athlete = serde_json::from_str(
            r#"{"id": 42, "name": "Fulano", "nickname": null, "position_id": 2, "club_id": null, "price": 7.35}"#,
        )
        .unwrap();
        assert_eq!(a.price, Some(Price::from_cents(735)));
        assert_eq!(a.club_id, None);

        let minimal: Athlete = serde_json::from_str(r#"{"id": 1, "name": "X"}"#).unwrap();
        assert_eq!(minimal.position_id, None);
        assert_eq!(minimal.price, None);
    }
}
