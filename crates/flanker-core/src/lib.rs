//! Core types and definitions for the FLANKER rules engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, actions, outcomes, errors, query views, and constants.
//! It holds no game logic and no storage.

pub mod actions;
pub mod components;
pub mod constants;
pub mod enums;
pub mod errors;
pub mod outcomes;
pub mod types;
pub mod views;

#[cfg(test)]
mod tests;
