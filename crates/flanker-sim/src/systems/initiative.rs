//! Initiative: which faction may take primary actions.

use flanker_core::components::{CombatUnit, FireControls, InitiativeState};
use flanker_core::enums::Faction;
use flanker_core::errors::StoreError;
use flanker_core::types::EntityId;

use crate::state::GameState;

/// Entity holding the world's `InitiativeState`. A world must hold exactly
/// one.
pub fn initiative_entity(state: &GameState) -> Result<EntityId, StoreError> {
    match &*state.query_ids::<&InitiativeState>() {
        [] => Err(StoreError::MissingInitiative),
        [id] => Ok(*id),
        ids => Err(StoreError::DuplicateInitiative(ids.len())),
    }
}

pub fn get_initiative(state: &GameState) -> Result<Faction, StoreError> {
    let id = initiative_entity(state)?;
    let faction = state.get::<InitiativeState>(id)?.faction;
    Ok(faction)
}

/// True if the unit's faction holds initiative.
pub fn has_initiative(state: &GameState, unit_id: EntityId) -> Result<bool, StoreError> {
    let faction = state.get::<CombatUnit>(unit_id)?.faction;
    Ok(get_initiative(state)? == faction)
}

/// Give initiative to `faction` and restore its units' reactive fire.
pub fn set_initiative(state: &mut GameState, faction: Faction) -> Result<(), StoreError> {
    let id = initiative_entity(state)?;
    state.get_mut::<InitiativeState>(id)?.faction = faction;
    reset_reactive_fire(state, Some(faction))?;
    tracing::debug!(faction = ?faction, "initiative set");
    Ok(())
}

/// Pass initiative to the other faction and restore every unit's
/// reactive fire. Returns the faction now holding initiative.
pub fn flip_initiative(state: &mut GameState) -> Result<Faction, StoreError> {
    let id = initiative_entity(state)?;
    let next = state.get::<InitiativeState>(id)?.faction.opponent();
    state.get_mut::<InitiativeState>(id)?.faction = next;
    reset_reactive_fire(state, None)?;
    tracing::debug!(faction = ?next, "initiative flipped");
    Ok(next)
}

/// Re-enable reactive fire for units of `faction`, or all units.
/// Units that already have it are left untouched, so read-only units in
/// a partial copy are only an error if they actually need the reset.
fn reset_reactive_fire(state: &mut GameState, faction: Option<Faction>) -> Result<(), StoreError> {
    let ids = state.query_ids::<(&CombatUnit, &FireControls)>();
    for &id in ids.iter() {
        let unit_faction = state.get::<CombatUnit>(id)?.faction;
        if faction.is_some_and(|f| f != unit_faction) {
            continue;
        }
        if !state.get::<FireControls>(id)?.can_reactive_fire {
            state.get_mut::<FireControls>(id)?.can_reactive_fire = true;
        }
    }
    Ok(())
}
