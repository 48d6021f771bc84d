use super::athlete::AthleteId;
use super::formation::Formation;
use super::team::{RoundId, TeamId};
use serde::{Deserialize, Serialize};

pub type LineupId = String;

/// Persisted lineup header, unique per (team, round).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub id: LineupId,
    pub team_id: TeamId,
    pub round_id: RoundId,
    pub captain_id: AthleteId,
    pub formation: Formation,
    /// Unix milliseconds of the last upsert.
    #[serde(default)]
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupMember {
    pub lineup_id: LineupId,
    pub athlete_id: AthleteId,
    pub is_starter: bool,
}

/// Payload for `LineupStore::upsert_lineup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupUpsert {
    pub team_id: TeamId,
    pub round_id: RoundId,
    pub captain_id: AthleteId,
    pub formation: Formation,
}

impl LineupUpsert {
    pub fn matches_key(&self, lineup: &Lineup) -> bool {
        lineup.team_id == self.team_id && lineup.round_id == self.round_id
    }
}
