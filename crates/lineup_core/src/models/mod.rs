pub mod athlete;
pub mod formation;
pub mod lineup;
pub mod money;
pub mod position;
pub mod team;

pub use athlete::{Athlete, AthleteId, Candidate, CandidatePool, ClubId};
pub use formation::{Formation, FormationLimits, GOALKEEPER_SLOTS, SQUAD_SIZE};
pub use lineup::{Lineup, LineupId, LineupMember, LineupUpsert};
pub use money::{InvalidPrice, Price, PRICE_SCALE};
pub use position::{position_label, PositionId, Role, COACH_POSITION_ID};
pub use team::{MarketEntry, Round, RoundId, Team, TeamId, UserId};
