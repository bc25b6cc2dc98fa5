//! Systems that read and mutate the state store.
//!
//! Systems are plain functions over `&mut GameState` (or `&GameState` for
//! read-only). They own no state; all state lives in components.
//!
//! Action entry points validate completely before their first mutation,
//! so an `ActionError::Invalid` return leaves the world untouched.

pub mod assault;
pub mod command;
pub mod fire;
pub mod initiative;
pub mod los;
pub mod movement;
pub mod objective;
pub mod terrain;
pub mod views;

use flanker_core::actions::Action;
use flanker_core::errors::ActionError;
use flanker_core::outcomes::ActionOutcome;

use crate::state::GameState;

pub use assault::assault;
pub use fire::fire;
pub use movement::{group_move, move_unit};

/// Dispatch one action to its entry point.
pub fn perform(state: &mut GameState, action: &Action) -> Result<ActionOutcome, ActionError> {
    match *action {
        Action::Move { unit_id, to } => move_unit(state, unit_id, to).map(ActionOutcome::Move),
        Action::Fire { unit_id, target_id } => {
            fire(state, unit_id, target_id).map(ActionOutcome::Fire)
        }
        Action::Assault { unit_id, target_id } => {
            assault(state, unit_id, target_id).map(ActionOutcome::Assault)
        }
    }
}
