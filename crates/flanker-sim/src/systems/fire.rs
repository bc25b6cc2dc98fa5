//! Fire resolution, for both primary and reactive fire.
//!
//! Initiative rule: MISS and PIN hand initiative to the target's faction;
//! SUPPRESS and KILL leave it with the attacker.

use rand::Rng;

use flanker_core::components::{CombatUnit, FireControls, Transform};
use flanker_core::constants::FIRE_DISTRIBUTION;
use flanker_core::enums::{FireOutcome, InvalidAction, UnitStatus};
use flanker_core::errors::{ActionError, StoreError};
use flanker_core::outcomes::FireResult;
use flanker_core::types::EntityId;

use crate::state::GameState;
use crate::systems::{command, initiative, los};

/// Check every precondition of `attacker` firing on `target`.
pub fn validate_fire(
    state: &GameState,
    attacker_id: EntityId,
    target_id: EntityId,
) -> Result<(), ActionError> {
    let attacker = state.get::<CombatUnit>(attacker_id)?;
    let target = state.get::<CombatUnit>(target_id)?;

    if !matches!(attacker.status, UnitStatus::Active | UnitStatus::Pinned) {
        return Err(InvalidAction::InactiveUnit.into());
    }
    if attacker.faction == target.faction {
        return Err(InvalidAction::BadEntity.into());
    }
    let target_position = state.get::<Transform>(target_id)?.position;
    if !los::check(state, attacker_id, target_position)? {
        return Err(InvalidAction::BadCoords.into());
    }
    if !initiative::has_initiative(state, attacker_id)? {
        return Err(InvalidAction::NoInitiative.into());
    }
    Ok(())
}

/// Primary fire from `attacker` at `target`.
pub fn fire(
    state: &mut GameState,
    attacker_id: EntityId,
    target_id: EntityId,
) -> Result<FireResult, ActionError> {
    validate_fire(state, attacker_id, target_id)?;

    let outcome = sample_outcome(state, attacker_id)?;
    let target_faction = state.get::<CombatUnit>(target_id)?.faction;
    let outcome = apply_hit(state, target_id, outcome)?;

    if matches!(outcome, FireOutcome::Miss | FireOutcome::Pin) {
        initiative::set_initiative(state, target_faction)?;
    }

    tracing::info!(attacker = %attacker_id, target = %target_id, outcome = ?outcome, "fire resolved");
    Ok(FireResult { outcome })
}

/// Apply a fire outcome to `target`. Returns the effective outcome, which
/// escalates to KILL when an already suppressed unit is pinned or
/// suppressed again. Initiative is the caller's concern.
pub(crate) fn apply_hit(
    state: &mut GameState,
    target_id: EntityId,
    outcome: FireOutcome,
) -> Result<FireOutcome, StoreError> {
    let status = state.get::<CombatUnit>(target_id)?.status;
    let effective = match (outcome, status) {
        (FireOutcome::Miss, _) => FireOutcome::Miss,
        (FireOutcome::Pin | FireOutcome::Suppress, UnitStatus::Suppressed) => FireOutcome::Kill,
        (other, _) => other,
    };

    match effective {
        FireOutcome::Miss => {}
        FireOutcome::Pin => state.get_mut::<CombatUnit>(target_id)?.status = UnitStatus::Pinned,
        FireOutcome::Suppress => {
            state.get_mut::<CombatUnit>(target_id)?.status = UnitStatus::Suppressed
        }
        FireOutcome::Kill => command::kill_unit(state, target_id)?,
    }
    Ok(effective)
}

/// The unit's forced outcome if set, else a roll on the fire distribution.
pub fn sample_outcome(state: &mut GameState, unit_id: EntityId) -> Result<FireOutcome, StoreError> {
    if let Some(forced) = state.get::<FireControls>(unit_id)?.forced_outcome {
        return Ok(forced);
    }
    Ok(roll_outcome(state.rng()))
}

/// Draw one outcome from the fixed fire distribution.
pub fn roll_outcome(rng: &mut impl Rng) -> FireOutcome {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (outcome, probability) in FireOutcome::ALL.iter().zip(FIRE_DISTRIBUTION) {
        cumulative += probability;
        if roll < cumulative {
            return *outcome;
        }
    }
    FireOutcome::Kill
}

/// Enemies of `mover` able to take a reactive shot: not suppressed and
/// with reactive fire still available.
pub fn spotter_candidates(state: &GameState, mover_id: EntityId) -> Result<Vec<EntityId>, StoreError> {
    let mover_faction = state.get::<CombatUnit>(mover_id)?.faction;
    let mut candidates = Vec::new();
    for &id in state.query_ids::<(&CombatUnit, &FireControls, &Transform)>().iter() {
        let unit = state.get::<CombatUnit>(id)?;
        if unit.faction == mover_faction || unit.status == UnitStatus::Suppressed {
            continue;
        }
        if state.get::<FireControls>(id)?.can_reactive_fire {
            candidates.push(id);
        }
    }
    Ok(candidates)
}
