use super::position::Role;
use crate::error::SquadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Players in a complete lineup.
pub const SQUAD_SIZE: usize = 11;

/// Goalkeepers in every formation.
pub const GOALKEEPER_SLOTS: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    #[serde(rename = "4-3-3")]
    F433,
    #[serde(rename = "4-4-2")]
    F442,
    #[serde(rename = "5-3-2")]
    F532,
    #[serde(rename = "5-2-3")]
    F523,
    #[serde(rename = "4-5-1")]
    F451,
}

/// Outfield slot counts for a formation. The goalkeeper slot is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationLimits {
    pub defenders: u8,
    pub midfielders: u8,
    pub forwards: u8,
}

impl FormationLimits {
    /// Slot count for any role. Unknown roles never get a slot.
    pub fn slots_for(&self, role: Role) -> u8 {
        match role {
            Role::Goalkeeper => GOALKEEPER_SLOTS,
            Role::Defender => self.defenders,
            Role::Midfielder => self.midfielders,
            Role::Forward => self.forwards,
            Role::Unknown => 0,
        }
    }

    pub fn total(&self) -> usize {
        (GOALKEEPER_SLOTS + self.defenders + self.midfielders + self.forwards) as usize
    }
}

impl Default for Formation {
    fn default() -> Self {
        Formation::DEFAULT
    }
}

impl Formation {
    pub const DEFAULT: Formation = Formation::F433;

    pub const ALL: [Formation; 5] =
        [Formation::F433, Formation::F442, Formation::F532, Formation::F523, Formation::F451];

    pub fn limits(&self) -> FormationLimits {
        let (defenders, midfielders, forwards) = match self {
            Formation::F433 => (4, 3, 3),
            Formation::F442 => (4, 4, 2),
            Formation::F532 => (5, 3, 2),
            Formation::F523 => (5, 2, 3),
            Formation::F451 => (4, 5, 1),
        };
        FormationLimits { defenders, midfielders, forwards }
    }

    /// Canonical formation code string (e.g., "4-3-3").
    pub fn code(&self) -> &'static str {
        match self {
            Formation::F433 => "4-3-3",
            Formation::F442 => "4-4-2",
            Formation::F532 => "5-3-2",
            Formation::F523 => "5-2-3",
            Formation::F451 => "4-5-1",
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Formation {
    type Err = SquadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Formation::ALL
            .into_iter()
            .find(|f| f.code() == code)
            .ok_or_else(|| SquadError::InvalidFormation(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_formation_fills_eleven() {
        for formation in Formation::ALL {
            let l = formation.limits();
            assert_eq!(
                (l.defenders + l.midfielders + l.forwards + 1) as usize,
                SQUAD_SIZE,
                "{} does not add up",
                formation
            );
            assert_eq!(l.total(), SQUAD_SIZE);
        }
    }

    #[test]
    fn test_default_is_433() {
        assert_eq!(Formation::default(), Formation::F433);
        assert_eq!(Formation::DEFAULT.limits().forwards, 3);
    }

    #[test]
    fn test_parse_and_serde_use_code() {
        assert_eq!("5-2-3".parse::<Formation>().unwrap(), Formation::F523);
        assert_eq!(" 4-5-1 ".parse::<Formation>().unwrap(), Formation::F451);
        assert!(matches!(
            "3-5-2".parse::<Formation>(),
            Err(SquadError::InvalidFormation(code)) if code == "3-5-2"
        ));

        assert_eq!(serde_json::to_string(&Formation::F442).unwrap(), "\"4-4-2\"");
        let f: Formation = serde_json::from_str("\"5-3-2\"").unwrap();
        assert_eq!(f, Formation::F532);
    }

    #[test]
    fn test_slots_for_role() {
        let l = Formation::F532.limits();
        assert_eq!(l.slots_for(Role::Goalkeeper), 1);
        assert_eq!(l.slots_for(Role::Defender), 5);
        assert_eq!(l.slots_for(Role::Unknown), 0);
    }
}
