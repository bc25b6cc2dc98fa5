//! Concrete actions an agent or caller can request against a world.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    Move { unit_id: EntityId, to: Vec2 },
    Fire { unit_id: EntityId, target_id: EntityId },
    Assault { unit_id: EntityId, target_id: EntityId },
}

impl Action {
    /// The unit performing the action.
    pub fn unit_id(&self) -> EntityId {
        match *self {
            Action::Move { unit_id, .. }
            | Action::Fire { unit_id, .. }
            | Action::Assault { unit_id, .. } => unit_id,
        }
    }
}
