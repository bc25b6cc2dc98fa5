//! Read-only query entry points for external collaborators.
//!
//! Never modifies the world.

use flanker_core::components::{CombatUnit, FireControls, Transform};
use flanker_core::enums::Faction;
use flanker_core::errors::StoreError;
use flanker_core::types::EntityId;
use flanker_core::views::UnitView;

use crate::state::GameState;
use crate::systems::los;

pub use crate::systems::initiative::get_initiative;
pub use crate::systems::objective::get_winner;
pub use crate::systems::terrain::get_terrain;

/// Every unit as seen by `viewer`, in creation order.
pub fn get_units_view(state: &GameState, viewer: Faction) -> Result<Vec<UnitView>, StoreError> {
    let rows = state.query_map::<(&Transform, &CombatUnit, &FireControls), _>(
        |id: EntityId, (transform, unit, fire_controls): (&Transform, &CombatUnit, &FireControls)| {
            (
                id,
                UnitView {
                    unit_id: id,
                    position: transform.position,
                    status: unit.status,
                    is_friendly: unit.faction == viewer,
                    no_fire: !fire_controls.can_reactive_fire,
                    los_polygon: Vec::new(),
                },
            )
        },
    );

    rows.into_iter()
        .map(|(id, mut view)| {
            view.los_polygon = los::unit_los_polygon(state, id)?;
            Ok(view)
        })
        .collect()
}
