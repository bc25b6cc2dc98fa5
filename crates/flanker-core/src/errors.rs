//! Error types.
//!
//! `InvalidAction` (see `enums`) is a normal play outcome. The errors here
//! are defects: a caller or data-integrity bug.

use thiserror::Error;

use crate::enums::InvalidAction;
use crate::types::EntityId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("entity {0} does not exist")]
    MissingEntity(EntityId),

    #[error("entity {id} has no {component} component")]
    MissingComponent {
        id: EntityId,
        component: &'static str,
    },

    #[error("entity {0} is shared read-only in this world")]
    ReadOnly(EntityId),

    #[error("unrecognized component: {0}")]
    UnrecognizedComponent(String),

    #[error("command chain of {0} loops back on itself")]
    CommandCycle(EntityId),

    #[error("world has no initiative state")]
    MissingInitiative,

    #[error("world has {0} initiative states, expected one")]
    DuplicateInitiative(usize),

    #[error("malformed scene: {0}")]
    Malformed(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of an action entry point.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("invalid action: {0:?}")]
    Invalid(InvalidAction),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<InvalidAction> for ActionError {
    fn from(reason: InvalidAction) -> Self {
        ActionError::Invalid(reason)
    }
}

impl ActionError {
    /// The rejection reason, if this is a domain rejection rather than a defect.
    pub fn invalid(&self) -> Option<InvalidAction> {
        match self {
            ActionError::Invalid(reason) => Some(*reason),
            ActionError::Store(_) => None,
        }
    }
}
