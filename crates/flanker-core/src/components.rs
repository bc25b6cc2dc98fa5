//! Components attached to state-store entities.
//!
//! Components are plain data structs. Game logic lives in the
//! systems of `flanker-sim`, not here.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityId, TerrainFlags, Vec2};

/// A component the store knows how to copy and persist.
///
/// `KEY` is the name used in scene files. Components marked `SHARED`
/// never change during play and are placed in the store's read-only tier.
pub trait Component: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KEY: &'static str;
    const SHARED: bool = false;
}

/// World placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Heading in degrees, counter-clockwise.
    #[serde(default)]
    pub angle: f64,
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
        }
    }
}

/// A squad on the battlefield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatUnit {
    pub status: UnitStatus,
    pub faction: Faction,
    /// Parent in the command tree. The root is a `FactionRoot` entity.
    pub command_id: EntityId,
    /// Terrain polygons the unit currently stands inside.
    #[serde(default)]
    pub inside_terrains: BTreeSet<EntityId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveControls {
    pub move_type: MoveType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireControls {
    /// Cleared after a reactive shot misses; reset when initiative changes.
    pub can_reactive_fire: bool,
    /// Forces the next fire outcome of this unit.
    #[serde(default)]
    pub forced_outcome: Option<FireOutcome>,
    /// Cached visibility polygon from the unit's current position.
    #[serde(default)]
    pub los_polygon: Option<Vec<Vec2>>,
}

impl Default for FireControls {
    fn default() -> Self {
        Self {
            can_reactive_fire: true,
            forced_outcome: None,
            los_polygon: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssaultControls {
    /// Forces the next melee roll of this unit.
    #[serde(default)]
    pub forced_outcome: Option<AssaultOutcome>,
}

/// Static terrain polygon or polyline. Vertices are local to the
/// entity's `Transform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainFeature {
    pub vertices: Vec<Vec2>,
    pub flag: TerrainFlags,
    #[serde(default = "default_closed_loop")]
    pub is_closed_loop: bool,
}

fn default_closed_loop() -> bool {
    true
}

/// Faction currently holding initiative. One per playable world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InitiativeState {
    pub faction: Faction,
}

/// Win condition: destroying enough units of `target_faction` wins the
/// game for `winning_faction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EliminationObjective {
    pub target_faction: Faction,
    pub winning_faction: Faction,
    pub units_to_destroy: u32,
    #[serde(default)]
    pub units_destroyed_counter: u32,
}

/// Root of a faction's command tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionRoot {
    pub faction: Faction,
    #[serde(default)]
    pub name: String,
}

impl Component for Transform {
    const KEY: &'static str = "Transform";
}

impl Component for CombatUnit {
    const KEY: &'static str = "CombatUnit";
}

impl Component for MoveControls {
    const KEY: &'static str = "MoveControls";
}

impl Component for FireControls {
    const KEY: &'static str = "FireControls";
}

impl Component for AssaultControls {
    const KEY: &'static str = "AssaultControls";
}

impl Component for TerrainFeature {
    const KEY: &'static str = "TerrainFeature";
    const SHARED: bool = true;
}

impl Component for InitiativeState {
    const KEY: &'static str = "InitiativeState";
}

impl Component for EliminationObjective {
    const KEY: &'static str = "EliminationObjective";
}

impl Component for FactionRoot {
    const KEY: &'static str = "FactionRoot";
}
