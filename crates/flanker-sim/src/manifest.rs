//! Registry of component types the store can copy and persist.
//!
//! hecs erases component types, so copying an entity between worlds or
//! writing it to a scene file needs a table of typed operations. Each
//! registered component contributes one row of function pointers.

use std::collections::BTreeMap;

use hecs::{EntityBuilder, EntityRef};
use serde_json::Value;

use flanker_core::components::*;
use flanker_core::errors::StoreError;
use flanker_core::types::EntityId;

type CloneFn = fn(&EntityRef<'_>, &mut EntityBuilder) -> bool;
type SaveFn = fn(&EntityRef<'_>) -> Option<Result<Value, serde_json::Error>>;
type LoadFn = fn(Value, &mut EntityBuilder) -> Result<(), serde_json::Error>;

#[derive(Clone, Copy)]
struct Entry {
    key: &'static str,
    shared: bool,
    clone_into: CloneFn,
    save: SaveFn,
    load: LoadFn,
}

/// Set of recognized component types.
#[derive(Clone, Default)]
pub struct Manifest {
    entries: Vec<Entry>,
}

impl Manifest {
    /// An empty manifest. Recognizes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// The core rules components.
    pub fn standard() -> Self {
        Self::new()
            .with::<Transform>()
            .with::<CombatUnit>()
            .with::<MoveControls>()
            .with::<FireControls>()
            .with::<AssaultControls>()
            .with::<TerrainFeature>()
            .with::<InitiativeState>()
            .with::<EliminationObjective>()
            .with::<FactionRoot>()
    }

    pub fn with<T: Component>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Register `T`. Registering the same key twice is a no-op.
    pub fn register<T: Component>(&mut self) {
        if self.recognizes(T::KEY) {
            return;
        }
        self.entries.push(Entry {
            key: T::KEY,
            shared: T::SHARED,
            clone_into: clone_component::<T>,
            save: save_component::<T>,
            load: load_component::<T>,
        });
    }

    pub fn recognizes(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    /// Deep-copy every component of `entity` into a builder.
    ///
    /// Fails if the entity carries a component type this manifest does not
    /// know, since it would be silently dropped otherwise.
    pub(crate) fn clone_entity(
        &self,
        id: EntityId,
        entity: &EntityRef<'_>,
    ) -> Result<EntityBuilder, StoreError> {
        let mut builder = EntityBuilder::new();
        let copied = self
            .entries
            .iter()
            .filter(|e| (e.clone_into)(entity, &mut builder))
            .count();
        ensure_all_recognized(id, entity, copied)?;
        Ok(builder)
    }

    /// Serialize every component of `entity`, keyed by component key.
    pub(crate) fn save_entity(
        &self,
        id: EntityId,
        entity: &EntityRef<'_>,
    ) -> Result<BTreeMap<String, Value>, StoreError> {
        let mut components = BTreeMap::new();
        for entry in &self.entries {
            if let Some(value) = (entry.save)(entity) {
                components.insert(entry.key.to_string(), value?);
            }
        }
        ensure_all_recognized(id, entity, components.len())?;
        Ok(components)
    }

    /// Build an entity from its saved components.
    ///
    /// Returns the builder and whether the entity belongs in the shared
    /// read-only tier. Unknown keys are rejected.
    pub(crate) fn load_entity(
        &self,
        components: BTreeMap<String, Value>,
    ) -> Result<(EntityBuilder, bool), StoreError> {
        let mut builder = EntityBuilder::new();
        let mut shared = false;
        for (key, value) in components {
            let entry = self
                .entries
                .iter()
                .find(|e| e.key == key)
                .ok_or(StoreError::UnrecognizedComponent(key))?;
            (entry.load)(value, &mut builder)?;
            shared |= entry.shared;
        }
        Ok((builder, shared))
    }
}

fn ensure_all_recognized(
    id: EntityId,
    entity: &EntityRef<'_>,
    handled: usize,
) -> Result<(), StoreError> {
    let present = entity.component_types().count();
    if handled == present {
        Ok(())
    } else {
        Err(StoreError::UnrecognizedComponent(format!(
            "{} unregistered component(s) on entity {id}",
            present - handled
        )))
    }
}

fn clone_component<T: Component>(entity: &EntityRef<'_>, out: &mut EntityBuilder) -> bool {
    match entity.get::<&T>() {
        Some(component) => {
            out.add(T::clone(&component));
            true
        }
        None => false,
    }
}

fn save_component<T: Component>(entity: &EntityRef<'_>) -> Option<Result<Value, serde_json::Error>> {
    entity
        .get::<&T>()
        .map(|component| serde_json::to_value(&*component))
}

fn load_component<T: Component>(value: Value, out: &mut EntityBuilder) -> Result<(), serde_json::Error> {
    let component: T = serde_json::from_value(value)?;
    out.add(component);
    Ok(())
}
