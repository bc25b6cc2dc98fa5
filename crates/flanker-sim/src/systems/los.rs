//! Unit-level line of sight.

use flanker_core::components::{FireControls, Transform};
use flanker_core::constants::{LOS_JITTER, LOS_RADIUS};
use flanker_core::errors::StoreError;
use flanker_core::types::{EntityId, TerrainFlags, Vec2};
use flanker_geometry::{can_see, visibility_polygon};

use crate::state::GameState;

/// True if unit `spotter_id` can see `target`.
pub fn check(state: &GameState, spotter_id: EntityId, target: Vec2) -> Result<bool, StoreError> {
    let spotter = state.get::<Transform>(spotter_id)?.position;
    let opaque = state.obstacles(TerrainFlags::OPAQUE)?;
    Ok(can_see(spotter, target, &opaque))
}

/// Visibility polygon from an arbitrary point.
pub fn get_los_polygon(state: &GameState, position: Vec2) -> Result<Vec<Vec2>, StoreError> {
    let opaque = state.obstacles(TerrainFlags::OPAQUE)?;
    Ok(visibility_polygon(position, &opaque, LOS_RADIUS, LOS_JITTER))
}

/// Recompute the cached visibility polygon of a unit.
pub fn update_los_polygon(state: &mut GameState, unit_id: EntityId) -> Result<(), StoreError> {
    let position = state.get::<Transform>(unit_id)?.position;
    let polygon = get_los_polygon(state, position)?;
    state.get_mut::<FireControls>(unit_id)?.los_polygon = Some(polygon);
    Ok(())
}

/// The unit's visibility polygon, from cache when present.
pub fn unit_los_polygon(state: &GameState, unit_id: EntityId) -> Result<Vec<Vec2>, StoreError> {
    if let Some(polygon) = state.get::<FireControls>(unit_id)?.los_polygon.clone() {
        return Ok(polygon);
    }
    let position = state.get::<Transform>(unit_id)?.position;
    get_los_polygon(state, position)
}
