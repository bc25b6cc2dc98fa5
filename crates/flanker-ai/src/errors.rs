use thiserror::Error;

use flanker_core::enums::Faction;
use flanker_core::errors::StoreError;

#[derive(Error, Debug)]
pub enum AiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no AI config for faction {0:?}")]
    MissingConfig(Faction),

    #[error("waypoint grid needs a BOUNDARY terrain feature")]
    NoBoundary,
}
