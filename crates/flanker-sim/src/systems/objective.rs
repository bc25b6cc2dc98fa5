//! Elimination objectives and the winner query.

use flanker_core::components::EliminationObjective;
use flanker_core::enums::Faction;
use flanker_core::errors::StoreError;

use crate::state::GameState;

/// Count one destroyed unit of `faction` against every matching objective.
pub fn record_kill(state: &mut GameState, faction: Faction) -> Result<(), StoreError> {
    let ids = state.query_ids::<&EliminationObjective>();
    for &id in ids.iter() {
        if state.get::<EliminationObjective>(id)?.target_faction == faction {
            state.get_mut::<EliminationObjective>(id)?.units_destroyed_counter += 1;
        }
    }
    Ok(())
}

/// Winning faction of the first satisfied objective, if any.
pub fn get_winner(state: &GameState) -> Result<Option<Faction>, StoreError> {
    let ids = state.query_ids::<&EliminationObjective>();
    for &id in ids.iter() {
        let objective = state.get::<EliminationObjective>(id)?;
        if objective.units_destroyed_counter >= objective.units_to_destroy {
            return Ok(Some(objective.winning_faction));
        }
    }
    Ok(None)
}

/// Snapshot of every objective, in creation order.
pub fn objectives(state: &GameState) -> Result<Vec<EliminationObjective>, StoreError> {
    state
        .query_ids::<&EliminationObjective>()
        .iter()
        .map(|&id| state.get::<EliminationObjective>(id).map(|o| *o))
        .collect()
}
