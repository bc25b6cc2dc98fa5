use flanker_core::types::Vec2;
use flanker_geometry::point_in_polygon;
use flanker_sim::systems::terrain;
use flanker_sim::GameState;

use crate::errors::AiError;

/// Regular grid of points inside the map boundary, starting `offset` in
/// from the boundary's lower-left bound and stepping by `spacing`.
pub fn grid_coordinates(world: &GameState, spacing: f64, offset: f64) -> Result<Vec<Vec2>, AiError> {
    let boundary = terrain::boundary_outline(world)?.ok_or(AiError::NoBoundary)?;
    if !(spacing > 0.0 && spacing.is_finite()) {
        return Ok(Vec::new());
    }

    let min = boundary.iter().fold(Vec2::INFINITY, |acc, v| acc.min(*v));
    let max = boundary.iter().fold(Vec2::NEG_INFINITY, |acc, v| acc.max(*v));

    let mut points = Vec::new();
    for row in 0u32.. {
        let y = min.y + offset + f64::from(row) * spacing;
        if y > max.y {
            break;
        }
        for column in 0u32.. {
            let x = min.x + offset + f64::from(column) * spacing;
            if x > max.x {
                break;
            }
            let point = Vec2::new(x, y);
            if point_in_polygon(point, &boundary) {
                points.push(point);
            }
        }
    }
    Ok(points)
}
