//! Search state over the waypoint graph.
//!
//! Units are reduced to the node they stand on plus their status. Action
//! effects mirror the real rules with the dice fixed at their most likely
//! harmful value; `get_branches` expands fire into its full distribution.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use flanker_core::actions::Action;
use flanker_core::components::{CombatUnit, EliminationObjective, FireControls, Transform};
use flanker_core::constants::{FIRE_DISTRIBUTION, WAYPOINT_MOVE_SAMPLES};
use flanker_core::enums::{Faction, FireOutcome, UnitStatus};
use flanker_core::errors::StoreError;
use flanker_core::types::{EntityId, Vec2};
use flanker_sim::systems::{initiative, objective};
use flanker_sim::GameState;

use crate::representation::{score_units, RepresentationState};
use crate::waypoints::graph::WaypointGraph;

/// A unit as the abstraction sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractedUnit {
    pub unit_id: EntityId,
    pub node: usize,
    pub status: UnitStatus,
    pub faction: Faction,
    /// Reactive fire already spent this initiative.
    pub no_fire: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WaypointAction {
    Move {
        unit_id: EntityId,
        to_node: usize,
        /// First node on the way an enemy would fire at.
        interrupt_at: Option<usize>,
    },
    Fire {
        unit_id: EntityId,
        target_id: EntityId,
    },
    Assault {
        unit_id: EntityId,
        target_id: EntityId,
        interrupt_at: Option<usize>,
    },
}

#[derive(Debug, Clone)]
pub struct WaypointsState {
    graph: Arc<WaypointGraph>,
    units: BTreeMap<EntityId, AbstractedUnit>,
    initiative: Faction,
    objectives: Vec<EliminationObjective>,
    rng: ChaCha8Rng,
}

impl WaypointsState {
    pub fn new(
        graph: Arc<WaypointGraph>,
        units: impl IntoIterator<Item = AbstractedUnit>,
        initiative: Faction,
        objectives: Vec<EliminationObjective>,
        seed: u64,
    ) -> Self {
        Self {
            graph,
            units: units.into_iter().map(|u| (u.unit_id, u)).collect(),
            initiative,
            objectives,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Abstract `world` onto `template`: each unit gets its own node at
    /// its current position, connected to the rest of the graph.
    pub fn from_world(template: &WaypointGraph, world: &GameState, seed: u64) -> Result<Self, StoreError> {
        let rows = world.query_map::<(&Transform, &CombatUnit, &FireControls), _>(
            |id: EntityId, (transform, unit, fire_controls): (&Transform, &CombatUnit, &FireControls)| {
                (
                    id,
                    transform.position,
                    unit.status,
                    unit.faction,
                    !fire_controls.can_reactive_fire,
                )
            },
        );

        let mut graph = template.clone();
        let positions: Vec<Vec2> = rows.iter().map(|row| row.1).collect();
        let nodes = graph.extend(world, &positions)?;

        let units = rows
            .into_iter()
            .zip(nodes)
            .map(|((unit_id, _, status, faction, no_fire), node)| AbstractedUnit {
                unit_id,
                node,
                status,
                faction,
                no_fire,
            });

        Ok(Self::new(
            Arc::new(graph),
            units,
            initiative::get_initiative(world)?,
            objective::objectives(world)?,
            seed,
        ))
    }

    pub fn graph(&self) -> &WaypointGraph {
        &self.graph
    }

    pub fn unit(&self, unit_id: EntityId) -> Option<&AbstractedUnit> {
        self.units.get(&unit_id)
    }

    pub fn units(&self) -> impl Iterator<Item = &AbstractedUnit> {
        self.units.values()
    }

    pub fn objectives(&self) -> &[EliminationObjective] {
        &self.objectives
    }

    /// First node on the walk from `unit`'s node to `to` that a
    /// non-suppressed enemy with reactive fire can see.
    pub fn move_interrupt(&self, unit: &AbstractedUnit, to: usize) -> Option<usize> {
        let path = self.graph.path(unit.node, to)?;
        path.iter().copied().find(|&node| {
            self.units.values().any(|enemy| {
                enemy.faction != unit.faction
                    && enemy.status != UnitStatus::Suppressed
                    && !enemy.no_fire
                    && self.graph.can_see(enemy.node, node)
            })
        })
    }

    /// The action is still legal here: actor present, holding initiative
    /// and fit to act; target present and hostile.
    fn available(&self, action: &WaypointAction) -> bool {
        let (unit_id, target_id) = match *action {
            WaypointAction::Move { unit_id, .. } => (unit_id, None),
            WaypointAction::Fire { unit_id, target_id }
            | WaypointAction::Assault {
                unit_id, target_id, ..
            } => (unit_id, Some(target_id)),
        };
        let Some(unit) = self.units.get(&unit_id) else {
            return false;
        };
        if unit.faction != self.initiative {
            return false;
        }
        let fit = match action {
            WaypointAction::Fire { .. } => unit.status != UnitStatus::Suppressed,
            WaypointAction::Move { .. } | WaypointAction::Assault { .. } => {
                unit.status == UnitStatus::Active
            }
        };
        let target_ok = target_id.map_or(true, |id| {
            self.units
                .get(&id)
                .is_some_and(|target| target.faction != unit.faction)
        });
        fit && target_ok
    }

    fn flip_initiative(&mut self) {
        self.initiative = self.initiative.opponent();
        for unit in self.units.values_mut() {
            unit.no_fire = false;
        }
    }

    fn set_initiative(&mut self, faction: Faction) {
        self.initiative = faction;
        for unit in self.units.values_mut().filter(|u| u.faction == faction) {
            unit.no_fire = false;
        }
    }

    fn remove_unit(&mut self, unit_id: EntityId) {
        if let Some(unit) = self.units.remove(&unit_id) {
            for objective in &mut self.objectives {
                if objective.target_faction == unit.faction {
                    objective.units_destroyed_counter += 1;
                }
            }
        }
    }

    /// Same effect and initiative rule as real fire, including the
    /// escalation of hits on a suppressed unit.
    fn apply_fire(&mut self, target_id: EntityId, outcome: FireOutcome) {
        let Some(target) = self.units.get_mut(&target_id) else {
            return;
        };
        let faction = target.faction;
        let effective = match (outcome, target.status) {
            (FireOutcome::Pin | FireOutcome::Suppress, UnitStatus::Suppressed) => FireOutcome::Kill,
            (other, _) => other,
        };
        match effective {
            FireOutcome::Miss => {}
            FireOutcome::Pin => target.status = UnitStatus::Pinned,
            FireOutcome::Suppress => target.status = UnitStatus::Suppressed,
            FireOutcome::Kill => self.remove_unit(target_id),
        }
        if matches!(effective, FireOutcome::Miss | FireOutcome::Pin) {
            self.set_initiative(faction);
        }
    }

    fn apply_fire_branch(&self, target_id: EntityId, outcome: FireOutcome) -> Self {
        let mut branch = self.clone();
        branch.apply_fire(target_id, outcome);
        branch
    }
}

impl RepresentationState for WaypointsState {
    type Action = WaypointAction;

    fn copy(&self) -> Result<Self, StoreError> {
        Ok(self.clone())
    }

    fn get_actions(&mut self) -> Result<Vec<WaypointAction>, StoreError> {
        let (friendly, enemies): (Vec<AbstractedUnit>, Vec<AbstractedUnit>) = self
            .units
            .values()
            .copied()
            .partition(|unit| unit.faction == self.initiative);

        let mut actions = Vec::new();
        for unit in &friendly {
            let Some(node) = self.graph.node(unit.node) else {
                continue;
            };

            for enemy in &enemies {
                let can_fire = matches!(unit.status, UnitStatus::Active | UnitStatus::Pinned);
                if can_fire && node.visible_nodes.contains(&enemy.node) {
                    actions.push(WaypointAction::Fire {
                        unit_id: unit.unit_id,
                        target_id: enemy.unit_id,
                    });
                }
                if unit.status == UnitStatus::Active && node.movable_paths.contains_key(&enemy.node) {
                    actions.push(WaypointAction::Assault {
                        unit_id: unit.unit_id,
                        target_id: enemy.unit_id,
                        interrupt_at: self.move_interrupt(unit, enemy.node),
                    });
                }
            }

            // Moves last so fire and assault are tried first under pruning
            if unit.status == UnitStatus::Active {
                let destinations: Vec<usize> = node.movable_paths.keys().copied().collect();
                let sampled: Vec<usize> = destinations
                    .choose_multiple(&mut self.rng, WAYPOINT_MOVE_SAMPLES)
                    .copied()
                    .collect();
                for to_node in sampled {
                    actions.push(WaypointAction::Move {
                        unit_id: unit.unit_id,
                        to_node,
                        interrupt_at: self.move_interrupt(unit, to_node),
                    });
                }
            }
        }
        Ok(actions)
    }

    fn get_branches(&self, action: &WaypointAction) -> Result<Vec<(f64, Self)>, StoreError> {
        match *action {
            WaypointAction::Fire { target_id, .. } if self.available(action) => Ok(FireOutcome::ALL
                .into_iter()
                .zip(FIRE_DISTRIBUTION)
                .map(|(outcome, probability)| (probability, self.apply_fire_branch(target_id, outcome)))
                .collect()),
            _ => Ok(self
                .get_deterministic_branch(action)?
                .map(|branch| vec![(1.0, branch)])
                .unwrap_or_default()),
        }
    }

    fn get_deterministic_branch(&self, action: &WaypointAction) -> Result<Option<Self>, StoreError> {
        if !self.available(action) {
            return Ok(None);
        }
        let mut branch = self.clone();

        match *action {
            WaypointAction::Move {
                unit_id,
                to_node,
                interrupt_at,
            } => {
                if let Some(unit) = branch.units.get_mut(&unit_id) {
                    match interrupt_at {
                        Some(node) => {
                            unit.status = UnitStatus::Pinned;
                            unit.node = node;
                        }
                        None => unit.node = to_node,
                    }
                }
            }
            WaypointAction::Fire { target_id, .. } => {
                branch.apply_fire(target_id, FireOutcome::Suppress);
            }
            WaypointAction::Assault {
                unit_id,
                target_id,
                interrupt_at,
            } => {
                let target = branch.units.get(&target_id).copied();
                if let Some(node) = interrupt_at {
                    // Suppressed on the way in; no melee
                    if let Some(unit) = branch.units.get_mut(&unit_id) {
                        unit.status = UnitStatus::Suppressed;
                        unit.node = node;
                    }
                    branch.flip_initiative();
                } else if let Some(target) = target {
                    if let Some(unit) = branch.units.get_mut(&unit_id) {
                        unit.node = target.node;
                    }
                    if target.status == UnitStatus::Suppressed {
                        branch.remove_unit(target_id);
                    } else {
                        branch.remove_unit(unit_id);
                    }
                }
            }
        }
        Ok(Some(branch))
    }

    fn get_score(&self, maximizing_faction: Faction) -> Result<f64, StoreError> {
        let winner = self.get_winner()?;
        let units = self.units.values().map(|u| (u.faction, u.status));
        Ok(score_units(winner, units, maximizing_faction))
    }

    fn get_winner(&self) -> Result<Option<Faction>, StoreError> {
        Ok(self
            .objectives
            .iter()
            .find(|o| o.units_destroyed_counter >= o.units_to_destroy)
            .map(|o| o.winning_faction))
    }

    fn get_initiative(&self) -> Result<Faction, StoreError> {
        Ok(self.initiative)
    }

    fn deabstract(&self, action: &WaypointAction) -> Action {
        match *action {
            WaypointAction::Move {
                unit_id, to_node, ..
            } => Action::Move {
                unit_id,
                to: self.graph.node(to_node).map_or(Vec2::NAN, |node| node.position),
            },
            WaypointAction::Fire { unit_id, target_id } => Action::Fire { unit_id, target_id },
            WaypointAction::Assault {
                unit_id, target_id, ..
            } => Action::Assault { unit_id, target_id },
        }
    }
}
