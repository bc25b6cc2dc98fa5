//! Assault: close with an enemy through reactive fire, then melee.

use rand::Rng;

use flanker_core::components::{AssaultControls, CombatUnit, Transform};
use flanker_core::constants::*;
use flanker_core::enums::{AssaultOutcome, InvalidAction, UnitStatus};
use flanker_core::errors::{ActionError, StoreError};
use flanker_core::outcomes::AssaultResult;
use flanker_core::types::EntityId;

use crate::state::GameState;
use crate::systems::{command, initiative, movement};

/// Melee success probability against a target of the given status.
pub fn success_threshold(target_status: UnitStatus) -> f64 {
    match target_status {
        UnitStatus::Active => ASSAULT_THRESHOLD_ACTIVE,
        UnitStatus::Pinned => ASSAULT_THRESHOLD_PINNED,
        UnitStatus::Suppressed => ASSAULT_THRESHOLD_SUPPRESSED,
    }
}

pub fn validate_assault(
    state: &GameState,
    attacker_id: EntityId,
    target_id: EntityId,
) -> Result<(), ActionError> {
    let attacker = state.get::<CombatUnit>(attacker_id)?;
    let target = state.get::<CombatUnit>(target_id)?;
    if attacker.status != UnitStatus::Active {
        return Err(InvalidAction::InactiveUnit.into());
    }
    if !initiative::has_initiative(state, attacker_id)? {
        return Err(InvalidAction::NoInitiative.into());
    }
    if attacker.faction == target.faction {
        return Err(InvalidAction::BadEntity.into());
    }
    let target_position = state.get::<Transform>(target_id)?.position;
    movement::validate_move(state, attacker_id, target_position)
}

/// Assault `target` with `attacker`.
///
/// The attacker moves onto the target's position. If reactive fire stops
/// it, the assault ends there with no melee. Otherwise the melee roll
/// kills the target on success and the attacker on failure.
pub fn assault(
    state: &mut GameState,
    attacker_id: EntityId,
    target_id: EntityId,
) -> Result<AssaultResult, ActionError> {
    validate_assault(state, attacker_id, target_id)?;

    let target_position = state.get::<Transform>(target_id)?.position;
    let moved = movement::move_unit(state, attacker_id, target_position)?;
    if moved.reactive_fire_outcome.is_some() {
        tracing::info!(attacker = %attacker_id, target = %target_id, interrupt = ?moved.reactive_fire_outcome, "assault stopped");
        return Ok(AssaultResult {
            outcome: None,
            reactive_fire_outcome: moved.reactive_fire_outcome,
        });
    }

    let outcome = roll_melee(state, attacker_id, target_id)?;
    match outcome {
        AssaultOutcome::Success => command::kill_unit(state, target_id)?,
        AssaultOutcome::Fail => command::kill_unit(state, attacker_id)?,
    }

    tracing::info!(attacker = %attacker_id, target = %target_id, outcome = ?outcome, "assault resolved");
    Ok(AssaultResult {
        outcome: Some(outcome),
        reactive_fire_outcome: None,
    })
}

/// The attacker's forced outcome if set, else a roll against the target's
/// status threshold.
fn roll_melee(
    state: &mut GameState,
    attacker_id: EntityId,
    target_id: EntityId,
) -> Result<AssaultOutcome, StoreError> {
    if let Some(forced) = state.get::<AssaultControls>(attacker_id)?.forced_outcome {
        return Ok(forced);
    }
    let threshold = success_threshold(state.get::<CombatUnit>(target_id)?.status);
    let roll: f64 = state.rng().gen();
    Ok(if roll <= threshold {
        AssaultOutcome::Success
    } else {
        AssaultOutcome::Fail
    })
}
