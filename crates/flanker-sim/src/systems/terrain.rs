//! Terrain lookup: flattened obstacles, boundary and terrain views.

use flanker_core::components::{TerrainFeature, Transform};
use flanker_core::errors::StoreError;
use flanker_core::types::{EntityId, TerrainFlags, Vec2};
use flanker_core::views::TerrainView;
use flanker_geometry::transform::terrain_outline;
use flanker_geometry::Obstacle;

use crate::state::GameState;

/// Flatten every terrain feature whose flags intersect `mask` into world
/// coordinates. `TerrainFlags::ALL` selects unflagged features too.
///
/// Callers normally go through `GameState::obstacles`, which caches this.
pub fn build_obstacles(state: &GameState, mask: TerrainFlags) -> Result<Vec<Obstacle>, StoreError> {
    let ids = state.query_ids::<(&TerrainFeature, &Transform)>();
    let mut obstacles = Vec::with_capacity(ids.len());
    for &id in ids.iter() {
        let terrain = state.get::<TerrainFeature>(id)?;
        if mask != TerrainFlags::ALL && !terrain.flag.intersects(mask) {
            continue;
        }
        let transform = state.get::<Transform>(id)?;
        obstacles.push(Obstacle::new(
            id,
            terrain.flag,
            terrain.is_closed_loop,
            terrain_outline(&terrain, &transform),
        ));
    }
    Ok(obstacles)
}

/// World outline of the map boundary, if the scene has one.
pub fn boundary_outline(state: &GameState) -> Result<Option<Vec<Vec2>>, StoreError> {
    let boundaries = state.obstacles(TerrainFlags::BOUNDARY)?;
    Ok(boundaries.first().map(|b| b.outline.clone()))
}

/// Every terrain feature in world coordinates.
pub fn get_terrain(state: &GameState) -> Result<Vec<TerrainView>, StoreError> {
    Ok(state
        .obstacles(TerrainFlags::ALL)?
        .iter()
        .map(|o| TerrainView {
            terrain_id: o.id,
            vertices: o.outline.clone(),
            flag: o.flag,
        })
        .collect())
}

/// Replace the local vertices of a terrain feature.
pub fn reshape_terrain(
    state: &mut GameState,
    id: EntityId,
    vertices: Vec<Vec2>,
) -> Result<(), StoreError> {
    state.edit_terrain(id, |terrain| terrain.vertices = vertices)
}
