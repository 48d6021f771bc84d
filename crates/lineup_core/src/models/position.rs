use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw position identifier as delivered by the roster feed.
pub type PositionId = u8;

pub const GOALKEEPER_POSITION_ID: PositionId = 1;
pub const FULLBACK_POSITION_ID: PositionId = 2;
pub const CENTER_BACK_POSITION_ID: PositionId = 3;
pub const MIDFIELDER_POSITION_ID: PositionId = 4;
pub const FORWARD_POSITION_ID: PositionId = 5;
/// Coach pseudo-position. Listed by the feed but never selectable.
pub const COACH_POSITION_ID: PositionId = 6;

/// Slot group a player occupies in a formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Unknown,
}

impl Role {
    /// Roles that can fill a formation slot, in display order.
    pub const SELECTABLE: [Role; 4] =
        [Role::Goalkeeper, Role::Defender, Role::Midfielder, Role::Forward];

    /// Total mapping from a (possibly missing) position id to a role.
    pub fn classify(position_id: Option<PositionId>) -> Role {
        match position_id {
            Some(GOALKEEPER_POSITION_ID) => Role::Goalkeeper,
            Some(FULLBACK_POSITION_ID) | Some(CENTER_BACK_POSITION_ID) => Role::Defender,
            Some(MIDFIELDER_POSITION_ID) => Role::Midfielder,
            Some(FORWARD_POSITION_ID) => Role::Forward,
            _ => Role::Unknown,
        }
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self, Role::Unknown)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Role::Goalkeeper => "GK",
            Role::Defender => "DEF",
            Role::Midfielder => "MID",
            Role::Forward => "FWD",
            Role::Unknown => "UNK",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Goalkeeper => "Goalkeeper",
            Role::Defender => "Defender",
            Role::Midfielder => "Midfielder",
            Role::Forward => "Forward",
            Role::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label the roster feed uses for a position id.
pub fn position_label(position_id: PositionId) -> Option<&'static str> {
    match position_id {
        GOALKEEPER_POSITION_ID => Some("Goleiro"),
        FULLBACK_POSITION_ID => Some("Lateral"),
        CENTER_BACK_POSITION_ID => Some("Zagueiro"),
        MIDFIELDER_POSITION_ID => Some("Meia"),
        FORWARD_POSITION_ID => Some("Atacante"),
        COACH_POSITION_ID => Some("Técnico"),
        _ => None,
    }
}
