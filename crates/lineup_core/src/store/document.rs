use super::{pick_open_round, resolve_candidates};
use crate::error::StoreError;
use crate::models::{
    Athlete, Lineup, LineupId, LineupMember, LineupUpsert, MarketEntry, Round, RoundId, Team,
};
use serde::{Deserialize, Serialize};

pub const STORE_DOCUMENT_VERSION: u32 = 1;

/// Tables backing the bundled stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub athletes: Vec<Athlete>,
    #[serde(default)]
    pub market: Vec<MarketEntry>,
    #[serde(default)]
    pub lineups: Vec<Lineup>,
    #[serde(default)]
    pub lineup_members: Vec<LineupMember>,
}

fn default_version() -> u32 {
    STORE_DOCUMENT_VERSION
}

impl StoreDocument {
    pub fn new() -> Self {
        Self { version: STORE_DOCUMENT_VERSION, ..Default::default() }
    }

    pub fn check_version(&self) -> Result<(), StoreError> {
        if self.version != STORE_DOCUMENT_VERSION {
            return Err(StoreError::VersionMismatch {
                found: self.version,
                expected: STORE_DOCUMENT_VERSION,
            });
        }
        Ok(())
    }

    pub fn team_for_owner(&self, user_id: &str) -> Option<Team> {
        self.teams.iter().find(|t| t.owner_id == user_id).cloned()
    }

    pub fn open_round(&self) -> Option<Round> {
        pick_open_round(&self.rounds)
    }

    pub fn candidates(&self, round_id: Option<RoundId>) -> Vec<Athlete> {
        resolve_candidates(&self.athletes, &self.market, round_id)
    }

    /// Update in place on (team, round) conflict, insert otherwise.
    pub fn upsert_lineup(&mut self, upsert: &LineupUpsert, now_ms: i64) -> LineupId {
        if let Some(existing) = self.lineups.iter_mut().find(|l| upsert.matches_key(l)) {
            existing.captain_id = upsert.captain_id;
            existing.formation = upsert.formation;
            existing.updated_at = now_ms;
            return existing.id.clone();
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.lineups.push(Lineup {
            id: id.clone(),
            team_id: upsert.team_id.clone(),
            round_id: upsert.round_id,
            captain_id: upsert.captain_id,
            formation: upsert.formation,
            updated_at: now_ms,
        });
        id
    }

    pub fn delete_members(&mut self, lineup_id: &str) -> usize {
        let before = self.lineup_members.len();
        self.lineup_members.retain(|m| m.lineup_id != lineup_id);
        before - self.lineup_members.len()
    }

    /// Insert rows; (lineup, athlete) pairs must be unique and the lineup
    /// must exist. Nothing is inserted if any row is refused.
    pub fn insert_members(&mut self, members: &[LineupMember]) -> Result<(), StoreError> {
        for (i, member) in members.iter().enumerate() {
            if !self.lineups.iter().any(|l| l.id == member.lineup_id) {
                return Err(StoreError::NotFound(format!("lineup {}", member.lineup_id)));
            }
            let clash = |m: &LineupMember| {
                m.lineup_id == member.lineup_id && m.athlete_id == member.athlete_id
            };
            if self.lineup_members.iter().any(clash) || members[..i].iter().any(clash) {
                return Err(StoreError::Backend(format!(
                    "duplicate member {} in lineup {}",
                    member.athlete_id, member.lineup_id
                )));
            }
        }
        self.lineup_members.extend_from_slice(members);
        Ok(())
    }

    pub fn lineup(&self, team_id: &str, round_id: RoundId) -> Option<Lineup> {
        self.lineups
            .iter()
            .find(|l| l.team_id == team_id && l.round_id == round_id)
            .cloned()
    }

    pub fn members(&self, lineup_id: &str) -> Vec<LineupMember> {
        self.lineup_members.iter().filter(|m| m.lineup_id == lineup_id).cloned().collect()
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
