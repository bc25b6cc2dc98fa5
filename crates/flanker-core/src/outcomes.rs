//! Results produced by the action entry points.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::enums::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    /// The reactive shot that halted or killed the mover, if any.
    pub reactive_fire_outcome: Option<FireOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireResult {
    pub outcome: FireOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssaultResult {
    /// None when reactive fire aborted the assault before melee.
    pub outcome: Option<AssaultOutcome>,
    pub reactive_fire_outcome: Option<FireOutcome>,
}

/// Result of any action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionOutcome {
    Move(MoveResult),
    Fire(FireResult),
    Assault(AssaultResult),
}

/// One applied action and its result, as logged by agents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub faction: Faction,
    pub action: Action,
    pub outcome: ActionOutcome,
}
