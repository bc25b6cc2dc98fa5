//! Terrain prepared for geometry queries.

use flanker_core::types::{EntityId, TerrainFlags, Vec2};

use crate::intersect::point_in_polygon;

/// A terrain feature flattened to world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: EntityId,
    pub flag: TerrainFlags,
    pub closed: bool,
    /// World-space outline. Closed outlines repeat their first vertex.
    pub outline: Vec<Vec2>,
}

impl Obstacle {
    pub fn new(id: EntityId, flag: TerrainFlags, closed: bool, outline: Vec<Vec2>) -> Self {
        Self {
            id,
            flag,
            closed,
            outline,
        }
    }

    /// True if `point` lies inside this obstacle. Open polylines contain nothing.
    pub fn contains(&self, point: Vec2) -> bool {
        self.closed && point_in_polygon(point, &self.outline)
    }

    /// Distinct vertices, without the closing repeat.
    pub fn vertices(&self) -> &[Vec2] {
        if self.closed && self.outline.len() > 1 {
            &self.outline[..self.outline.len() - 1]
        } else {
            &self.outline
        }
    }
}
