//! Rules engine for FLANKER.
//!
//! Owns the entity/component state store and the systems that resolve
//! Move, Fire and Assault actions against it, plus command and objective
//! bookkeeping and scene persistence.

pub mod manifest;
pub mod persistence;
pub mod scenario;
pub mod state;
pub mod systems;

pub use flanker_core as core;
pub use manifest::Manifest;
pub use state::{GameState, SimConfig};
