//! Search-free agent policy.
//!
//! Take any legal shot; failing that, step the first unit that can move
//! a random distance toward its nearest enemy.

use rand::Rng;

use flanker_core::actions::Action;
use flanker_core::components::{CombatUnit, Transform};
use flanker_core::enums::{Faction, UnitStatus};
use flanker_core::errors::{ActionError, StoreError};
use flanker_core::types::{EntityId, Vec2};
use flanker_sim::systems::{fire, movement};
use flanker_sim::GameState;

/// Longest single advance.
const MAX_ADVANCE: f64 = 10.0;

/// Pick the next action for `faction`, or `None` if nothing is legal.
pub fn choose_action(world: &mut GameState, faction: Faction) -> Result<Option<Action>, StoreError> {
    let units = world.query_map::<(&Transform, &CombatUnit), _>(
        |id: EntityId, (transform, unit): (&Transform, &CombatUnit)| {
            (id, transform.position, unit.faction, unit.status)
        },
    );
    let (friendly, enemies): (Vec<_>, Vec<_>) =
        units.into_iter().partition(|(_, _, f, _)| *f == faction);

    for &(unit_id, _, _, status) in &friendly {
        if status == UnitStatus::Suppressed {
            continue;
        }
        for &(target_id, ..) in &enemies {
            if permitted(fire::validate_fire(world, unit_id, target_id))? {
                return Ok(Some(Action::Fire { unit_id, target_id }));
            }
        }
    }

    for &(unit_id, position, _, status) in &friendly {
        if status != UnitStatus::Active {
            continue;
        }
        let Some(nearest) = nearest(position, enemies.iter().map(|e| e.1)) else {
            break;
        };
        let distance = position.distance(nearest);
        let upper = (distance - 1.0).min(MAX_ADVANCE).max(1.1);
        let step = world.rng().gen_range(1.0..upper);
        let to = position + (nearest - position).normalize_or_zero() * step;

        if permitted(movement::validate_move(world, unit_id, to))? {
            return Ok(Some(Action::Move { unit_id, to }));
        }
    }
    Ok(None)
}

fn nearest(from: Vec2, candidates: impl Iterator<Item = Vec2>) -> Option<Vec2> {
    candidates.min_by(|a, b| from.distance(*a).total_cmp(&from.distance(*b)))
}

/// Rule rejections mean "not this one"; store failures are real errors.
fn permitted(check: Result<(), ActionError>) -> Result<bool, StoreError> {
    match check {
        Ok(()) => Ok(true),
        Err(ActionError::Invalid(_)) => Ok(false),
        Err(ActionError::Store(err)) => Err(err),
    }
}
