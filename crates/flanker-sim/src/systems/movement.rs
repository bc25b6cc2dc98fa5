//! Movement with reactive-fire interrupts.
//!
//! A move is walked in fixed steps. At every step each eligible enemy that
//! can see the new position takes one reactive shot. A miss spends the
//! spotter's reactive fire; any hit halts the move where it landed.

use std::collections::HashSet;

use flanker_core::components::{CombatUnit, FireControls, MoveControls, Transform};
use flanker_core::constants::{MAX_MOVE_DISTANCE, MOVE_STEP};
use flanker_core::enums::{FireOutcome, InvalidAction, MoveType, UnitStatus};
use flanker_core::errors::{ActionError, StoreError};
use flanker_core::outcomes::MoveResult;
use flanker_core::types::{EntityId, TerrainFlags, Vec2};
use flanker_geometry::crossings;

use crate::state::GameState;
use crate::systems::{fire, initiative, los};

/// Terrain flag a movement class needs on every feature it crosses.
pub fn required_flag(move_type: MoveType) -> TerrainFlags {
    match move_type {
        MoveType::Foot => TerrainFlags::WALKABLE,
    }
}

/// Check every precondition of moving `unit` to `to`.
pub fn validate_move(state: &GameState, unit_id: EntityId, to: Vec2) -> Result<(), ActionError> {
    if state.get::<CombatUnit>(unit_id)?.status != UnitStatus::Active {
        return Err(InvalidAction::InactiveUnit.into());
    }
    if !initiative::has_initiative(state, unit_id)? {
        return Err(InvalidAction::NoInitiative.into());
    }
    validate_path(state, unit_id, to)
}

fn validate_path(state: &GameState, unit_id: EntityId, to: Vec2) -> Result<(), ActionError> {
    let start = state.get::<Transform>(unit_id)?.position;
    let move_type = state.get::<MoveControls>(unit_id)?.move_type;
    if path_is_clear(state, start, to, move_type)? {
        Ok(())
    } else {
        Err(InvalidAction::BadCoords.into())
    }
}

/// True if a unit of `move_type` may travel the straight segment
/// `from -> to`: every terrain edge it crosses belongs to a feature the
/// movement class may enter, and none of them is the map boundary.
/// Segments longer than `MAX_MOVE_DISTANCE` are never clear.
pub fn path_is_clear(
    state: &GameState,
    from: Vec2,
    to: Vec2,
    move_type: MoveType,
) -> Result<bool, StoreError> {
    if !from.is_finite() || !to.is_finite() || from.distance(to) > MAX_MOVE_DISTANCE {
        return Ok(false);
    }
    let required = required_flag(move_type);
    let terrain = state.obstacles(TerrainFlags::ALL)?;

    for (terrain_id, _) in crossings(from, to, &terrain) {
        let Some(obstacle) = terrain.iter().find(|o| o.id == terrain_id) else {
            continue;
        };
        if obstacle.flag.intersects(TerrainFlags::BOUNDARY) || !obstacle.flag.intersects(required) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Positions visited by a move, ending exactly at `to`.
pub fn move_steps(start: Vec2, to: Vec2, step: f64) -> Vec<Vec2> {
    let length = start.distance(to);
    let direction = (to - start).normalize_or_zero();
    let count = (length / step) as usize + 1;

    let mut steps: Vec<Vec2> = Vec::new();
    for k in 1..=count {
        let point = start + direction * (k as f64 * step).min(length);
        if steps.last() != Some(&point) {
            steps.push(point);
        }
    }
    steps
}

/// Move `unit` toward `to`, resolving reactive fire along the way.
///
/// Only SUPPRESS and KILL interrupts cost the mover's faction initiative.
pub fn move_unit(state: &mut GameState, unit_id: EntityId, to: Vec2) -> Result<MoveResult, ActionError> {
    validate_move(state, unit_id, to)?;
    let result = walk(state, unit_id, to)?;

    if matches!(
        result.reactive_fire_outcome,
        Some(FireOutcome::Suppress | FireOutcome::Kill)
    ) {
        initiative::flip_initiative(state)?;
    }

    tracing::info!(unit = %unit_id, to = ?to, interrupt = ?result.reactive_fire_outcome, "move resolved");
    Ok(result)
}

/// Move several units in order. Initiative flips only if every leg was
/// stopped by SUPPRESS or KILL. Each unit may appear once.
pub fn group_move(
    state: &mut GameState,
    moves: &[(EntityId, Vec2)],
) -> Result<Vec<MoveResult>, ActionError> {
    let mut seen = HashSet::with_capacity(moves.len());
    for &(unit_id, to) in moves {
        if !seen.insert(unit_id) {
            return Err(InvalidAction::BadEntity.into());
        }
        validate_move(state, unit_id, to)?;
    }

    let mut results = Vec::with_capacity(moves.len());
    for &(unit_id, to) in moves {
        results.push(walk(state, unit_id, to)?);
    }

    let all_stopped = !results.is_empty()
        && results.iter().all(|r| {
            matches!(
                r.reactive_fire_outcome,
                Some(FireOutcome::Suppress | FireOutcome::Kill)
            )
        });
    if all_stopped {
        initiative::flip_initiative(state)?;
    }
    Ok(results)
}

/// Step the unit along its path. Assumes the move was validated.
fn walk(state: &mut GameState, unit_id: EntityId, to: Vec2) -> Result<MoveResult, StoreError> {
    let start = state.get::<Transform>(unit_id)?.position;

    for step in move_steps(start, to, MOVE_STEP) {
        for spotter_id in fire::spotter_candidates(state, unit_id)? {
            if !los::check(state, spotter_id, step)? {
                continue;
            }
            let outcome = fire::sample_outcome(state, spotter_id)?;
            tracing::debug!(unit = %unit_id, spotter = %spotter_id, at = ?step, outcome = ?outcome, "reactive fire");

            if outcome == FireOutcome::Miss {
                state.get_mut::<FireControls>(spotter_id)?.can_reactive_fire = false;
                continue;
            }
            if outcome != FireOutcome::Kill {
                relocate(state, unit_id, start, step)?;
            }
            let outcome = fire::apply_hit(state, unit_id, outcome)?;
            return Ok(MoveResult {
                reactive_fire_outcome: Some(outcome),
            });
        }
    }

    relocate(state, unit_id, start, to)?;
    Ok(MoveResult::default())
}

/// Place the unit at `to`, toggling membership of every terrain polygon
/// whose edge the path `from -> to` crosses.
fn relocate(state: &mut GameState, unit_id: EntityId, from: Vec2, to: Vec2) -> Result<(), StoreError> {
    let terrain = state.obstacles(TerrainFlags::ALL)?;
    let crossed = crossings(from, to, &terrain);

    let unit = state.get_mut::<CombatUnit>(unit_id)?;
    for (terrain_id, _) in crossed {
        if !unit.inside_terrains.remove(&terrain_id) {
            unit.inside_terrains.insert(terrain_id);
        }
    }

    state.get_mut::<Transform>(unit_id)?.position = to;
    state.get_mut::<FireControls>(unit_id)?.los_polygon = None;
    Ok(())
}
