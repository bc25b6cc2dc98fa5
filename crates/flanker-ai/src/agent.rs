//! Agents that play out a whole initiative against the real world.

use std::sync::Arc;

use rand::Rng;

use flanker_core::actions::Action;
use flanker_core::constants::{DEFAULT_GRID_OFFSET, DEFAULT_GRID_SPACING};
use flanker_core::enums::Faction;
use flanker_core::errors::ActionError;
use flanker_core::outcomes::ActionRecord;
use flanker_sim::systems::{self, initiative, objective};
use flanker_sim::GameState;

use crate::config::{ai_config, AiConfig, SearchConfig};
use crate::errors::AiError;
use crate::heuristic;
use crate::representation::RepresentationState;
use crate::search::search;
use crate::unabstracted::UnabstractedState;
use crate::waypoints::{grid_coordinates, WaypointGraph, WaypointsState};

/// How an agent picks its actions.
#[derive(Debug, Clone)]
pub enum AgentKind {
    Unabstracted,
    /// Search over this graph, extended with unit positions each turn.
    Waypoints(Arc<WaypointGraph>),
    RandomHeuristic,
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub faction: Faction,
    pub search: SearchConfig,
    pub kind: AgentKind,
}

impl Agent {
    /// Build an agent for `faction`. Waypoint graphs are built here, once,
    /// against the world's terrain.
    pub fn new(
        world: &GameState,
        faction: Faction,
        config: &AiConfig,
        search: SearchConfig,
    ) -> Result<Self, AiError> {
        let kind = match config {
            AiConfig::Unabstracted => AgentKind::Unabstracted,
            AiConfig::RandomHeuristic => AgentKind::RandomHeuristic,
            AiConfig::Waypoints {
                waypoint_coordinates,
                path_tolerance,
            } => {
                let (points, tolerance) = if waypoint_coordinates.is_empty() {
                    let grid = grid_coordinates(world, DEFAULT_GRID_SPACING, DEFAULT_GRID_OFFSET)?;
                    (grid, DEFAULT_GRID_SPACING)
                } else {
                    (waypoint_coordinates.clone(), *path_tolerance)
                };
                let graph = WaypointGraph::build(world, &points, tolerance)?;
                tracing::info!(?faction, nodes = graph.len(), "waypoint graph built");
                AgentKind::Waypoints(Arc::new(graph))
            }
        };
        Ok(Self {
            faction,
            search,
            kind,
        })
    }

    /// Build an agent from the `AiConfigComponent` stored in the world.
    pub fn from_world(world: &GameState, faction: Faction, search: SearchConfig) -> Result<Self, AiError> {
        let config = ai_config(world, faction)?.ok_or(AiError::MissingConfig(faction))?;
        Self::new(world, faction, &config, search)
    }

    /// Act until initiative leaves this agent's faction, the game is won,
    /// no action is found, or the action cap is hit. The last three pass
    /// initiative on so play always moves forward.
    pub fn play_initiative(&self, world: &mut GameState) -> Result<Vec<ActionRecord>, AiError> {
        let mut records = Vec::new();

        while initiative::get_initiative(world)? == self.faction {
            if objective::get_winner(world)?.is_some() {
                break;
            }
            if records.len() >= self.search.action_cap {
                tracing::warn!(
                    faction = ?self.faction,
                    cap = self.search.action_cap,
                    "action cap reached, passing initiative"
                );
                initiative::flip_initiative(world)?;
                break;
            }
            let Some(action) = self.choose_action(world)? else {
                tracing::warn!(faction = ?self.faction, "no action available, passing initiative");
                initiative::flip_initiative(world)?;
                break;
            };

            match systems::perform(world, &action) {
                Ok(outcome) => {
                    tracing::info!(faction = ?self.faction, ?action, ?outcome, "action applied");
                    records.push(ActionRecord {
                        faction: self.faction,
                        action,
                        outcome,
                    });
                }
                Err(ActionError::Invalid(reason)) => {
                    tracing::warn!(
                        faction = ?self.faction,
                        ?action,
                        ?reason,
                        "chosen action rejected, passing initiative"
                    );
                    initiative::flip_initiative(world)?;
                    break;
                }
                Err(ActionError::Store(err)) => return Err(err.into()),
            }
        }
        Ok(records)
    }

    fn choose_action(&self, world: &mut GameState) -> Result<Option<Action>, AiError> {
        match &self.kind {
            AgentKind::RandomHeuristic => Ok(heuristic::choose_action(world, self.faction)?),
            AgentKind::Unabstracted => {
                let mut state = UnabstractedState::from_world(world)?;
                let outcome = search(&mut state, &self.search, self.faction)?;
                Ok(outcome.action.map(|a| state.deabstract(&a)))
            }
            AgentKind::Waypoints(graph) => {
                let seed: u64 = world.rng().gen();
                let mut state = WaypointsState::from_world(graph, world, seed)?;
                let outcome = search(&mut state, &self.search, self.faction)?;
                Ok(outcome.action.map(|a| state.deabstract(&a)))
            }
        }
    }
}

/// Play one initiative for `faction` with a freshly built agent.
pub fn play_initiative(
    world: &mut GameState,
    faction: Faction,
    search: &SearchConfig,
    config: &AiConfig,
) -> Result<Vec<ActionRecord>, AiError> {
    Agent::new(world, faction, config, search.clone())?.play_initiative(world)
}
