//! Search directly over copies of the real world.
//!
//! Every branch is a `selective_copy` in which units, initiative and
//! objectives are writable and terrain stays shared. Moves are sampled
//! as random offsets around each unit, so the branching factor is fixed
//! but the destinations are literal.

use rand::Rng;

use flanker_core::actions::Action;
use flanker_core::components::{
    AssaultControls, CombatUnit, EliminationObjective, FireControls, InitiativeState, Transform,
};
use flanker_core::constants::{FIRE_DISTRIBUTION, UNABSTRACTED_MOVE_RANGE, UNABSTRACTED_RANDOM_MOVES};
use flanker_core::enums::{AssaultOutcome, Faction, FireOutcome, UnitStatus};
use flanker_core::errors::{ActionError, StoreError};
use flanker_core::types::{EntityId, Vec2};
use flanker_sim::systems::{self, initiative, objective};
use flanker_sim::GameState;

use crate::representation::{score_units, RepresentationState};

pub struct UnabstractedState {
    world: GameState,
}

impl UnabstractedState {
    /// Wrap a world the representation may mutate freely.
    pub fn new(world: GameState) -> Self {
        Self { world }
    }

    /// A searchable copy of `world`, which is left untouched.
    pub fn from_world(world: &GameState) -> Result<Self, StoreError> {
        Ok(Self::new(world.selective_copy(&mutable_ids(world))?))
    }

    pub fn world(&self) -> &GameState {
        &self.world
    }

    pub fn into_world(self) -> GameState {
        self.world
    }

    /// Apply `action` with every random outcome pinned: reactive and
    /// primary fire to `fire`, and the melee roll to success exactly when
    /// the target is already suppressed.
    fn forced_branch(&self, action: &Action, fire: FireOutcome) -> Result<Option<Self>, StoreError> {
        let mut branch = self.copy()?;
        let world = &mut branch.world;

        set_fire_override(world, Some(fire))?;
        if let Action::Assault { unit_id, target_id } = *action {
            let melee = match world.try_get::<CombatUnit>(target_id).map(|t| t.status) {
                Some(UnitStatus::Suppressed) => AssaultOutcome::Success,
                _ => AssaultOutcome::Fail,
            };
            if world.has::<AssaultControls>(unit_id) {
                world.get_mut::<AssaultControls>(unit_id)?.forced_outcome = Some(melee);
            }
        }

        let result = systems::perform(world, action);

        set_fire_override(world, None)?;
        clear_melee_overrides(world)?;

        match result {
            Ok(_) => Ok(Some(branch)),
            Err(ActionError::Invalid(_)) => Ok(None),
            Err(ActionError::Store(err)) => Err(err),
        }
    }
}

impl RepresentationState for UnabstractedState {
    type Action = Action;

    fn copy(&self) -> Result<Self, StoreError> {
        Self::from_world(&self.world)
    }

    fn get_actions(&mut self) -> Result<Vec<Action>, StoreError> {
        let faction = initiative::get_initiative(&self.world)?;
        let units = self.world.query_ids::<(&CombatUnit, &Transform)>();

        let mut actions = Vec::new();
        for &unit_id in units.iter() {
            if self.world.get::<CombatUnit>(unit_id)?.faction != faction {
                continue;
            }
            let position = self.world.get::<Transform>(unit_id)?.position;

            actions.push(Action::Move {
                unit_id,
                to: position,
            });
            for _ in 0..UNABSTRACTED_RANDOM_MOVES {
                let rng = self.world.rng();
                let offset = Vec2::new(
                    f64::from(rng.gen_range(-UNABSTRACTED_MOVE_RANGE..UNABSTRACTED_MOVE_RANGE)),
                    f64::from(rng.gen_range(-UNABSTRACTED_MOVE_RANGE..UNABSTRACTED_MOVE_RANGE)),
                );
                actions.push(Action::Move {
                    unit_id,
                    to: position + offset,
                });
            }

            for &target_id in units.iter() {
                let target = self.world.get::<CombatUnit>(target_id)?;
                if target.faction == faction {
                    continue;
                }
                actions.push(if target.status == UnitStatus::Suppressed {
                    Action::Assault { unit_id, target_id }
                } else {
                    Action::Fire { unit_id, target_id }
                });
            }
        }
        Ok(actions)
    }

    fn get_branches(&self, action: &Action) -> Result<Vec<(f64, Self)>, StoreError> {
        if !matches!(action, Action::Fire { .. }) {
            return Ok(self
                .get_deterministic_branch(action)?
                .map(|branch| vec![(1.0, branch)])
                .unwrap_or_default());
        }

        let mut branches = Vec::with_capacity(FireOutcome::ALL.len());
        for (outcome, probability) in FireOutcome::ALL.into_iter().zip(FIRE_DISTRIBUTION) {
            match self.forced_branch(action, outcome)? {
                Some(branch) => branches.push((probability, branch)),
                None => return Ok(Vec::new()),
            }
        }
        Ok(branches)
    }

    fn get_deterministic_branch(&self, action: &Action) -> Result<Option<Self>, StoreError> {
        let fire = match action {
            Action::Fire { .. } => FireOutcome::Suppress,
            Action::Move { .. } | Action::Assault { .. } => FireOutcome::Pin,
        };
        self.forced_branch(action, fire)
    }

    fn get_score(&self, maximizing_faction: Faction) -> Result<f64, StoreError> {
        let winner = self.get_winner()?;
        let units = self
            .world
            .query_map::<&CombatUnit, _>(|_, unit: &CombatUnit| (unit.faction, unit.status));
        Ok(score_units(winner, units, maximizing_faction))
    }

    fn get_winner(&self) -> Result<Option<Faction>, StoreError> {
        objective::get_winner(&self.world)
    }

    fn get_initiative(&self) -> Result<Faction, StoreError> {
        initiative::get_initiative(&self.world)
    }

    fn deabstract(&self, action: &Action) -> Action {
        *action
    }
}

/// Entities a search branch may change.
fn mutable_ids(world: &GameState) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = Vec::new();
    ids.extend(world.query_ids::<&InitiativeState>().iter());
    ids.extend(world.query_ids::<&EliminationObjective>().iter());
    ids.extend(world.query_ids::<&CombatUnit>().iter());
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn set_fire_override(world: &mut GameState, outcome: Option<FireOutcome>) -> Result<(), StoreError> {
    let ids = world.query_ids::<&FireControls>();
    for &id in ids.iter() {
        world.get_mut::<FireControls>(id)?.forced_outcome = outcome;
    }
    Ok(())
}

fn clear_melee_overrides(world: &mut GameState) -> Result<(), StoreError> {
    let ids = world.query_ids::<&AssaultControls>();
    for &id in ids.iter() {
        world.get_mut::<AssaultControls>(id)?.forced_outcome = None;
    }
    Ok(())
}
