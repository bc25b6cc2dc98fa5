//! Scene save/load.
//!
//! A scene is the full entity -> component map plus the id counter:
//!
//! ```json
//! { "id_counter": 3, "entities": { "0": { "Transform": { ... } } } }
//! ```
//!
//! Loading goes through a caller-supplied `Manifest` and rejects any
//! component key it does not recognize.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flanker_core::errors::StoreError;
use flanker_core::types::EntityId;

use crate::manifest::Manifest;
use crate::state::{GameState, SimConfig};
use crate::systems::{command, initiative};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub id_counter: u32,
    pub entities: BTreeMap<EntityId, BTreeMap<String, Value>>,
}

/// Capture every entity of every tier.
pub fn save(state: &GameState) -> Result<SceneFile, StoreError> {
    let mut entities = BTreeMap::new();
    state.for_each_entity(|id, entity| {
        entities.insert(id, state.manifest().save_entity(id, entity)?);
        Ok(())
    })?;
    Ok(SceneFile {
        id_counter: state.id_counter(),
        entities,
    })
}

/// Rebuild a world from a scene. Entities carrying shared components
/// (terrain) land in the read-only tier.
///
/// The loaded world must hold exactly one initiative state and an acyclic
/// command tree with no dangling parents.
pub fn load(scene: SceneFile, manifest: Manifest, config: SimConfig) -> Result<GameState, StoreError> {
    let mut state = GameState::with_manifest(manifest, config);
    for (id, components) in scene.entities {
        if id.0 >= scene.id_counter {
            return Err(StoreError::Malformed(format!(
                "entity {id} is not below id_counter {}",
                scene.id_counter
            )));
        }
        let (mut builder, shared) = state.manifest().load_entity(components)?;
        state.spawn_loaded(id, builder.build(), shared);
    }
    state.set_id_counter(scene.id_counter);
    initiative::initiative_entity(&state)?;
    command::validate_command_tree(&state)?;
    tracing::debug!(entities = state.query_ids::<()>().len(), "scene loaded");
    Ok(state)
}

pub fn to_json(state: &GameState) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(&save(state)?)?)
}

pub fn from_json(json: &str, manifest: Manifest, config: SimConfig) -> Result<GameState, StoreError> {
    let scene: SceneFile = serde_json::from_str(json)?;
    load(scene, manifest, config)
}

pub fn save_to_path(state: &GameState, path: &Path) -> Result<(), StoreError> {
    std::fs::write(path, to_json(state)?)?;
    Ok(())
}

pub fn load_from_path(path: &Path, manifest: Manifest, config: SimConfig) -> Result<GameState, StoreError> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json, manifest, config)
}
