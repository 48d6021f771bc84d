use super::athlete::AthleteId;
use super::money::Price;
use serde::{Deserialize, Serialize};

pub type TeamId = String;
pub type UserId = String;
pub type RoundId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub owner_id: UserId,
    pub name: String,
    /// Unset balances fall back to the configured default budget.
    #[serde(default)]
    pub balance: Option<Price>,
}

impl Team {
    pub fn budget_or(&self, default_budget: Price) -> Price {
        self.balance.unwrap_or(default_budget)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub is_open: bool,
}

/// Per-round listing of a purchasable athlete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub round_id: RoundId,
    pub athlete_id: AthleteId,
    /// Overrides the athlete's list price when present.
    #[serde(default)]
    pub price: Option<Price>,
}
