//! Entity spawn factories for setting up a scenario.
//!
//! Creates terrain, command roots, squads, initiative and objectives with
//! the component bundles the systems expect.

use std::collections::BTreeSet;

use flanker_core::components::*;
use flanker_core::enums::{Faction, MoveType, UnitStatus};
use flanker_core::errors::StoreError;
use flanker_core::types::{EntityId, TerrainFlags, Vec2};

use crate::state::GameState;

/// Spawn the single initiative holder of the world.
pub fn spawn_initiative(state: &mut GameState, faction: Faction) -> EntityId {
    state.create((InitiativeState { faction },))
}

/// Spawn the root of a faction's command tree.
pub fn spawn_faction_root(state: &mut GameState, faction: Faction, name: &str) -> EntityId {
    state.create((FactionRoot {
        faction,
        name: name.to_string(),
    },))
}

/// Spawn a terrain feature into the shared tier.
pub fn spawn_terrain(state: &mut GameState, terrain: TerrainFeature, transform: Transform) -> EntityId {
    state.create_shared((terrain, transform))
}

/// Axis-aligned rectangle of terrain with its lower-left corner at `min`.
pub fn spawn_rect(state: &mut GameState, min: Vec2, size: Vec2, flag: TerrainFlags) -> EntityId {
    let terrain = TerrainFeature {
        vertices: vec![
            Vec2::ZERO,
            Vec2::new(size.x, 0.0),
            size,
            Vec2::new(0.0, size.y),
        ],
        flag,
        is_closed_loop: true,
    };
    spawn_terrain(state, terrain, Transform::at(min))
}

/// Opaque map edge enclosing `min..max`.
pub fn spawn_boundary(state: &mut GameState, min: Vec2, max: Vec2) -> EntityId {
    spawn_rect(
        state,
        min,
        max - min,
        TerrainFlags::BOUNDARY | TerrainFlags::OPAQUE,
    )
}

/// Spawn an active foot squad. Its `inside_terrains` starts as every
/// closed terrain polygon containing `position`.
pub fn spawn_squad(
    state: &mut GameState,
    faction: Faction,
    command_id: EntityId,
    position: Vec2,
) -> Result<EntityId, StoreError> {
    let inside_terrains: BTreeSet<EntityId> = state
        .obstacles(TerrainFlags::ALL)?
        .iter()
        .filter(|o| !o.flag.intersects(TerrainFlags::BOUNDARY) && o.contains(position))
        .map(|o| o.id)
        .collect();

    Ok(state.create((
        Transform::at(position),
        CombatUnit {
            status: UnitStatus::Active,
            faction,
            command_id,
            inside_terrains,
        },
        MoveControls {
            move_type: MoveType::Foot,
        },
        FireControls::default(),
        AssaultControls::default(),
    )))
}

/// Spawn an elimination objective.
pub fn spawn_objective(
    state: &mut GameState,
    target_faction: Faction,
    winning_faction: Faction,
    units_to_destroy: u32,
) -> EntityId {
    state.create((EliminationObjective {
        target_faction,
        winning_faction,
        units_to_destroy,
        units_destroyed_counter: 0,
    },))
}

/// A small two-squad-a-side skirmish on a 200 x 200 map with scattered
/// buildings and woods. Blue moves first.
pub fn setup_skirmish(state: &mut GameState) -> Result<(), StoreError> {
    spawn_boundary(state, Vec2::ZERO, Vec2::new(200.0, 200.0));

    let building = TerrainFlags::OPAQUE;
    let woods = TerrainFlags::OPAQUE | TerrainFlags::WALKABLE;
    spawn_rect(state, Vec2::new(60.0, 60.0), Vec2::new(20.0, 30.0), building);
    spawn_rect(state, Vec2::new(120.0, 110.0), Vec2::new(25.0, 20.0), building);
    spawn_rect(state, Vec2::new(85.0, 20.0), Vec2::new(30.0, 25.0), woods);
    spawn_rect(state, Vec2::new(90.0, 150.0), Vec2::new(30.0, 25.0), woods);

    spawn_initiative(state, Faction::Blue);
    let blue = spawn_faction_root(state, Faction::Blue, "Blue");
    let red = spawn_faction_root(state, Faction::Red, "Red");

    let blue_lead = spawn_squad(state, Faction::Blue, blue, Vec2::new(20.0, 30.0))?;
    spawn_squad(state, Faction::Blue, blue_lead, Vec2::new(30.0, 20.0))?;
    let red_lead = spawn_squad(state, Faction::Red, red, Vec2::new(180.0, 170.0))?;
    spawn_squad(state, Faction::Red, red_lead, Vec2::new(170.0, 180.0))?;

    spawn_objective(state, Faction::Red, Faction::Blue, 2);
    spawn_objective(state, Faction::Blue, Faction::Red, 2);
    Ok(())
}
