//! Enumeration types used throughout the rules engine.

use serde::{Deserialize, Serialize};

/// Side of the conflict. Exactly two factions exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    #[default]
    Blue,
    Red,
}

impl Faction {
    /// The opposing faction.
    pub fn opponent(self) -> Self {
        match self {
            Faction::Blue => Faction::Red,
            Faction::Red => Faction::Blue,
        }
    }
}

/// Combat effectiveness of a squad. Only ever worsens during play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    #[default]
    Active,
    /// Can still fire, cannot move or assault.
    Pinned,
    /// Cannot act and cannot reactive fire.
    Suppressed,
}

/// Movement class, gating which terrain a unit may cross.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveType {
    #[default]
    Foot,
}

/// Result of a single fire resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireOutcome {
    Miss,
    Pin,
    Suppress,
    Kill,
}

impl FireOutcome {
    pub const ALL: [FireOutcome; 4] = [
        FireOutcome::Miss,
        FireOutcome::Pin,
        FireOutcome::Suppress,
        FireOutcome::Kill,
    ];
}

/// Result of a melee roll at the end of an assault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssaultOutcome {
    Success,
    Fail,
}

/// Reason a requested action was rejected. Never a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidAction {
    /// Acting unit's status forbids the action.
    InactiveUnit,
    /// Acting unit's faction does not hold initiative.
    NoInitiative,
    /// Target is friendly or otherwise not a legal target.
    BadEntity,
    /// Destination or line of fire is illegal.
    BadCoords,
}
