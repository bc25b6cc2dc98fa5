//! Read-only views handed to external collaborators.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityId, TerrainFlags, Vec2};

/// A unit as seen from one faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub unit_id: EntityId,
    pub position: Vec2,
    pub status: UnitStatus,
    /// True if the unit belongs to the viewing faction.
    pub is_friendly: bool,
    /// True if the unit has spent its reactive fire.
    pub no_fire: bool,
    #[serde(default)]
    pub los_polygon: Vec<Vec2>,
}

/// Terrain polygon in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainView {
    pub terrain_id: EntityId,
    pub vertices: Vec<Vec2>,
    pub flag: TerrainFlags,
}
