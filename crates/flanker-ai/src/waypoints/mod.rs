//! Waypoint-graph abstraction.
//!
//! The continuous map is reduced to a fixed set of nodes. Each node knows
//! which nodes it can see and, for every node it can walk to in a straight
//! line, the ordered nodes along that walk. Search then reasons about
//! reactive fire per node instead of per movement step.

pub mod graph;
pub mod grid;
pub mod state;

pub use graph::{WaypointGraph, WaypointNode};
pub use grid::grid_coordinates;
pub use state::{AbstractedUnit, WaypointAction, WaypointsState};
