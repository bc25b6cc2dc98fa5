//! AI configuration.
//!
//! `AiConfig` picks the representation an agent searches. It is stored
//! per faction in the world as an `AiConfigComponent`, so a saved scene
//! carries its AI setup. `SearchConfig` holds the search knobs.

use serde::{Deserialize, Serialize};

use flanker_core::components::Component;
use flanker_core::constants::{DEFAULT_SEARCH_DEPTH, MAX_ACTIONS_PER_INITIATIVE};
use flanker_core::enums::Faction;
use flanker_core::errors::StoreError;
use flanker_core::types::Vec2;
use flanker_sim::{GameState, Manifest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AiConfig {
    /// Search over a waypoint graph. An empty coordinate list means a
    /// default grid over the map boundary.
    Waypoints {
        #[serde(default)]
        waypoint_coordinates: Vec<Vec2>,
        #[serde(default)]
        path_tolerance: f64,
    },
    /// Search directly over copies of the world.
    Unabstracted,
    /// No search: fire when possible, otherwise close with the enemy.
    RandomHeuristic,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::Waypoints {
            waypoint_coordinates: Vec::new(),
            path_tolerance: 0.0,
        }
    }
}

/// Per-faction AI setup, stored as an entity in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfigComponent {
    pub faction: Faction,
    pub config: AiConfig,
}

impl Component for AiConfigComponent {
    const KEY: &'static str = "AiConfigComponent";
}

/// The standard component manifest plus AI configuration. Worlds that
/// carry an `AiConfigComponent` must be built with this manifest.
pub fn manifest() -> Manifest {
    Manifest::standard().with::<AiConfigComponent>()
}

/// The stored AI config of `faction`, if any.
pub fn ai_config(state: &GameState, faction: Faction) -> Result<Option<AiConfig>, StoreError> {
    for &id in state.query_ids::<&AiConfigComponent>().iter() {
        let component = state.get::<AiConfigComponent>(id)?;
        if component.faction == faction {
            return Ok(Some(component.config.clone()));
        }
    }
    Ok(None)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPolicy {
    /// Alpha-beta over the single most likely branch of each action.
    Minimax,
    /// Probability-weighted average over every branch of each action.
    #[default]
    Expectimax,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub depth: u32,
    pub policy: SearchPolicy,
    /// Expand root branches on the rayon pool.
    pub parallel: bool,
    /// Most actions an agent applies in one initiative before the
    /// initiative is forcibly passed.
    pub action_cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            policy: SearchPolicy::default(),
            parallel: false,
            action_cap: MAX_ACTIONS_PER_INITIATIVE,
        }
    }
}
