//! Local-to-world transforms of terrain vertices.

use flanker_core::components::{TerrainFeature, Transform};
use flanker_core::types::Vec2;

/// Rotate `vertices` by `transform.angle` degrees, then translate.
pub fn to_world(vertices: &[Vec2], transform: &Transform) -> Vec<Vec2> {
    let rotation = Vec2::from_angle(transform.angle.to_radians());
    vertices
        .iter()
        .map(|v| rotation.rotate(*v) + transform.position)
        .collect()
}

/// World-space outline of a terrain feature. Closed loops repeat their
/// first vertex at the end.
pub fn terrain_outline(terrain: &TerrainFeature, transform: &Transform) -> Vec<Vec2> {
    let mut outline = to_world(&terrain.vertices, transform);
    if terrain.is_closed_loop {
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }
    }
    outline
}
