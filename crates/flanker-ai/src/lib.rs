//! AI search layer for FLANKER.
//!
//! Two state representations over the same rules (the full world, and a
//! waypoint-graph abstraction of it), depth-limited minimax and
//! expectimax search over either, and agents that play a whole
//! initiative against the real world.

pub mod agent;
pub mod config;
pub mod errors;
pub mod heuristic;
pub mod representation;
pub mod search;
pub mod unabstracted;
pub mod waypoints;

pub use agent::{play_initiative, Agent};
pub use config::{manifest, AiConfig, AiConfigComponent, SearchConfig, SearchPolicy};
pub use errors::AiError;
pub use representation::RepresentationState;

#[cfg(test)]
mod tests;
