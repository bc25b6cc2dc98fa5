//! Geometry and visibility for FLANKER.
//!
//! Pure functions over points and polygons: segment intersection,
//! point-in-polygon, terrain transforms, visibility polygons and
//! line-of-sight checks. Nothing here touches the state store.

pub use flanker_core as core;

pub mod intersect;
pub mod los;
pub mod obstacle;
pub mod transform;

pub use intersect::{point_in_polygon, polyline_intersections, segment_intersect};
pub use los::{can_see, crossings, visibility_polygon, visible_points};
pub use obstacle::Obstacle;
