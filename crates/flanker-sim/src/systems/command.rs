//! Command tree bookkeeping and the kill path.
//!
//! `CombatUnit::command_id` points at the parent entity. Chains end at an
//! entity without a `CombatUnit` (the faction root).

use std::collections::HashSet;

use flanker_core::components::CombatUnit;
use flanker_core::errors::StoreError;
use flanker_core::types::EntityId;

use crate::state::GameState;
use crate::systems::objective;

/// Direct subordinates of `commander`, in creation order.
pub fn subordinates(state: &GameState, commander: EntityId) -> Result<Vec<EntityId>, StoreError> {
    let mut found = Vec::new();
    for &id in state.query_ids::<&CombatUnit>().iter() {
        if id != commander && state.get::<CombatUnit>(id)?.command_id == commander {
            found.push(id);
        }
    }
    Ok(found)
}

/// Remove a unit from play.
///
/// The first subordinate inherits the unit's parent; the remaining
/// subordinates report to that first one. The kill is counted against
/// matching objectives, then the entity is destroyed.
pub fn kill_unit(state: &mut GameState, unit_id: EntityId) -> Result<(), StoreError> {
    let (parent, faction) = {
        let unit = state.get::<CombatUnit>(unit_id)?;
        (unit.command_id, unit.faction)
    };
    let subs = subordinates(state, unit_id)?;

    state.ensure_writable(unit_id)?;
    for &id in &subs {
        state.ensure_writable(id)?;
    }

    if let Some((&first, rest)) = subs.split_first() {
        state.get_mut::<CombatUnit>(first)?.command_id = parent;
        for &id in rest {
            state.get_mut::<CombatUnit>(id)?.command_id = first;
        }
    }
    objective::record_kill(state, faction)?;
    state.destroy(unit_id)?;

    tracing::info!(unit = %unit_id, faction = ?faction, subordinates = subs.len(), "unit killed");
    Ok(())
}

/// Walk every unit's chain of command and reject cycles or dangling
/// parents.
pub fn validate_command_tree(state: &GameState) -> Result<(), StoreError> {
    for &start in state.query_ids::<&CombatUnit>().iter() {
        let mut visited: HashSet<EntityId> = HashSet::from([start]);
        let mut current = state.get::<CombatUnit>(start)?.command_id;
        loop {
            if !visited.insert(current) {
                return Err(StoreError::CommandCycle(start));
            }
            if !state.contains(current) {
                return Err(StoreError::MissingEntity(current));
            }
            match state.try_get::<CombatUnit>(current) {
                Some(parent) => current = parent.command_id,
                None => break,
            }
        }
    }
    Ok(())
}
