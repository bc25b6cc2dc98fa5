//! The state store: every entity and component of one simulated world.
//!
//! Entities live in one of two tiers. The *local* tier is a private,
//! mutable hecs `World`. The *shared* tier is a stack of read-only worlds
//! held behind `Arc`, so copies made for search share terrain and other
//! untouched entities instead of duplicating them.
//!
//! Every entity keeps the same `EntityId` in whichever tier holds it. When
//! an id exists in more than one tier the local copy wins, then the most
//! recently pushed shared layer.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use hecs::{DynamicBundle, Entity, Query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use flanker_core::components::{Component, TerrainFeature};
use flanker_core::constants::DEFAULT_SEED;
use flanker_core::errors::StoreError;
use flanker_core::types::{EntityId, TerrainFlags};
use flanker_geometry::Obstacle;

use crate::manifest::Manifest;
use crate::systems::terrain;

/// Configuration for a new world.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same rolls.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

/// Generation bits of every hecs handle we create.
const HANDLE_GENERATION: u64 = 1 << 32;

type QueryCache = Mutex<HashMap<&'static str, Arc<[EntityId]>>>;
type ObstacleCache = Arc<Mutex<HashMap<u32, Arc<[Obstacle]>>>>;

pub struct GameState {
    local: World,
    shared: Vec<Arc<World>>,
    next_id: u32,
    manifest: Arc<Manifest>,
    rng: ChaCha8Rng,
    /// Entity ids per query type. Cleared on create/destroy only.
    query_cache: QueryCache,
    /// Flattened terrain per flag mask. Shared with copies, since terrain
    /// cannot change under a copy.
    obstacle_cache: ObstacleCache,
}

impl GameState {
    pub fn new(config: SimConfig) -> Self {
        Self::with_manifest(Manifest::standard(), config)
    }

    pub fn with_manifest(manifest: Manifest, config: SimConfig) -> Self {
        Self {
            local: World::new(),
            shared: Vec::new(),
            next_id: 0,
            manifest: Arc::new(manifest),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            query_cache: Mutex::default(),
            obstacle_cache: ObstacleCache::default(),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Next id the counter will hand out.
    pub fn id_counter(&self) -> u32 {
        self.next_id
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // --- Structural changes ---

    /// Create a mutable entity.
    pub fn create(&mut self, components: impl DynamicBundle) -> EntityId {
        let id = self.allocate_id();
        let handle = handle(id);
        self.local.spawn_at(handle, components);
        self.invalidate_queries();
        if self.local.get::<&TerrainFeature>(handle).is_ok() {
            self.invalidate_obstacles();
        }
        id
    }

    /// Create an entity in the shared read-only tier. Used for terrain,
    /// which never changes during play.
    pub fn create_shared(&mut self, components: impl DynamicBundle) -> EntityId {
        let id = self.allocate_id();
        self.spawn_shared(handle(id), components);
        self.invalidate_queries();
        self.invalidate_obstacles();
        id
    }

    /// Destroy a mutable entity. Shared entities cannot be destroyed.
    pub fn destroy(&mut self, id: EntityId) -> Result<(), StoreError> {
        let handle = handle(id);
        if !self.local.contains(handle) {
            return Err(self.absent_from_local(id));
        }
        let was_terrain = self.local.get::<&TerrainFeature>(handle).is_ok();
        self.local
            .despawn(handle)
            .map_err(|_| StoreError::MissingEntity(id))?;
        self.invalidate_queries();
        if was_terrain {
            self.invalidate_obstacles();
        }
        Ok(())
    }

    // --- Access ---

    pub fn contains(&self, id: EntityId) -> bool {
        self.locate(id).is_ok()
    }

    /// True if the entity exists and may be mutated in this world.
    pub fn is_writable(&self, id: EntityId) -> bool {
        self.local.contains(handle(id))
    }

    /// Fail with `ReadOnly` or `MissingEntity` unless `id` is writable.
    pub fn ensure_writable(&self, id: EntityId) -> Result<(), StoreError> {
        if self.is_writable(id) {
            Ok(())
        } else {
            Err(self.absent_from_local(id))
        }
    }

    /// Borrow component `T` of `id`, from whichever tier holds it.
    pub fn get<T: Component>(&self, id: EntityId) -> Result<hecs::Ref<'_, T>, StoreError> {
        let (world, handle) = self.locate(id)?;
        world
            .get::<&T>(handle)
            .map_err(|_| StoreError::MissingComponent {
                id,
                component: T::KEY,
            })
    }

    /// Like `get`, but absence of the entity or component is not an error.
    pub fn try_get<T: Component>(&self, id: EntityId) -> Option<hecs::Ref<'_, T>> {
        self.get::<T>(id).ok()
    }

    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.try_get::<T>(id).is_some()
    }

    /// Mutably borrow component `T` of a local entity.
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Result<&mut T, StoreError> {
        let handle = handle(id);
        if !self.local.contains(handle) {
            return Err(self.absent_from_local(id));
        }
        self.local
            .query_one_mut::<&mut T>(handle)
            .map_err(|_| StoreError::MissingComponent {
                id,
                component: T::KEY,
            })
    }

    // --- Queries ---

    /// Ids of every entity matching `Q`, across all tiers, in creation order.
    ///
    /// Cached per query type until the next create/destroy. In-place
    /// component edits never invalidate it.
    pub fn query_ids<Q: Query>(&self) -> Arc<[EntityId]> {
        let key = std::any::type_name::<Q>();
        if let Some(ids) = lock(&self.query_cache).get(key) {
            return Arc::clone(ids);
        }

        let tiers = self.tiers();
        let mut ids: Vec<EntityId> = Vec::new();
        for (rank, world) in tiers.iter().enumerate() {
            let mut query = world.query::<Q>();
            for (handle, _) in query.iter() {
                if !shadowed(&tiers[..rank], handle) {
                    ids.push(EntityId(handle.id()));
                }
            }
        }
        ids.sort_unstable();

        let ids: Arc<[EntityId]> = ids.into();
        lock(&self.query_cache).insert(key, Arc::clone(&ids));
        ids
    }

    /// Read-only query across all tiers, mapped through `f`, in creation order.
    pub fn query_map<Q: Query, R>(&self, mut f: impl FnMut(EntityId, Q::Item<'_>) -> R) -> Vec<R> {
        let tiers = self.tiers();
        let mut rows: Vec<(EntityId, R)> = Vec::new();
        for (rank, world) in tiers.iter().enumerate() {
            let mut query = world.query::<Q>();
            for (handle, item) in query.iter() {
                if shadowed(&tiers[..rank], handle) {
                    continue;
                }
                let id = EntityId(handle.id());
                rows.push((id, f(id, item)));
            }
        }
        rows.sort_by_key(|(id, _)| *id);
        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Mutable query over local entities, in creation order.
    pub fn query_mut<Q: Query>(&mut self) -> Vec<(EntityId, Q::Item<'_>)> {
        let mut rows: Vec<(EntityId, Q::Item<'_>)> = self
            .local
            .query_mut::<Q>()
            .into_iter()
            .map(|(handle, item)| (EntityId(handle.id()), item))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows
    }

    /// Terrain flattened to world coordinates, restricted to features
    /// whose flags intersect `mask`.
    pub fn obstacles(&self, mask: TerrainFlags) -> Result<Arc<[Obstacle]>, StoreError> {
        if let Some(cached) = lock(&self.obstacle_cache).get(&mask.bits()) {
            return Ok(Arc::clone(cached));
        }
        let built: Arc<[Obstacle]> = terrain::build_obstacles(self, mask)?.into();
        lock(&self.obstacle_cache).insert(mask.bits(), Arc::clone(&built));
        Ok(built)
    }

    // --- Copies ---

    /// An independent world in which only `ids` are deep-copied and
    /// mutable. Everything else is shared read-only with `self`.
    ///
    /// Shared tiers are reused through their `Arc`. Unlisted entities of
    /// `self`'s local tier are cloned once into a new frozen layer, which
    /// is shared from then on: copies of this copy clone only what it holds
    /// locally. Terrain always lives in a shared tier and is never cloned.
    pub fn selective_copy(&self, ids: &[EntityId]) -> Result<GameState, StoreError> {
        let mut local = World::new();
        for &id in ids {
            let (world, handle) = self.locate(id)?;
            let entity = world
                .entity(handle)
                .map_err(|_| StoreError::MissingEntity(id))?;
            let mut builder = self.manifest.clone_entity(id, &entity)?;
            local.spawn_at(handle, builder.build());
        }

        // Unlisted local entities freeze into a new shared layer
        let listed: HashSet<EntityId> = ids.iter().copied().collect();
        let mut frozen = World::new();
        let mut frozen_count = 0usize;
        for entity in self.local.iter() {
            let id = EntityId(entity.entity().id());
            if listed.contains(&id) {
                continue;
            }
            let mut builder = self.manifest.clone_entity(id, &entity)?;
            frozen.spawn_at(entity.entity(), builder.build());
            frozen_count += 1;
        }

        let mut shared = self.shared.clone();
        if frozen_count > 0 {
            shared.push(Arc::new(frozen));
        }

        Ok(GameState {
            local,
            shared,
            next_id: self.next_id,
            manifest: Arc::clone(&self.manifest),
            rng: self.rng.clone(),
            query_cache: Mutex::default(),
            obstacle_cache: Arc::clone(&self.obstacle_cache),
        })
    }

    // --- Crate internals ---

    /// Put an entity at a fixed id, used by scene loading.
    pub(crate) fn spawn_loaded(
        &mut self,
        id: EntityId,
        components: impl DynamicBundle,
        shared: bool,
    ) {
        if shared {
            self.spawn_shared(handle(id), components);
        } else {
            self.local.spawn_at(handle(id), components);
        }
        self.next_id = self.next_id.max(id.0 + 1);
        self.invalidate_queries();
        self.invalidate_obstacles();
    }

    pub(crate) fn set_id_counter(&mut self, next_id: u32) {
        self.next_id = next_id;
    }

    /// Every entity with a handle to its tier, in creation order.
    pub(crate) fn for_each_entity(
        &self,
        mut f: impl FnMut(EntityId, &hecs::EntityRef<'_>) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let tiers = self.tiers();
        let mut entities: Vec<(EntityId, hecs::EntityRef<'_>)> = Vec::new();
        for (rank, world) in tiers.iter().enumerate() {
            for entity in world.iter() {
                if !shadowed(&tiers[..rank], entity.entity()) {
                    entities.push((EntityId(entity.entity().id()), entity));
                }
            }
        }
        entities.sort_by_key(|(id, _)| *id);
        for (id, entity) in &entities {
            f(*id, entity)?;
        }
        Ok(())
    }

    /// Mutate a terrain feature in place. Allowed only while no copy shares
    /// the layer holding it; this is a scenario-editing operation.
    pub fn edit_terrain(
        &mut self,
        id: EntityId,
        edit: impl FnOnce(&mut TerrainFeature),
    ) -> Result<(), StoreError> {
        let handle = handle(id);
        if self.local.contains(handle) {
            edit(self.get_mut::<TerrainFeature>(id)?);
        } else {
            let layer = self
                .shared
                .iter_mut()
                .rev()
                .find(|layer| layer.contains(handle))
                .ok_or(StoreError::MissingEntity(id))?;
            let world = Arc::get_mut(layer).ok_or(StoreError::ReadOnly(id))?;
            let feature = world
                .query_one_mut::<&mut TerrainFeature>(handle)
                .map_err(|_| StoreError::MissingComponent {
                    id,
                    component: TerrainFeature::KEY,
                })?;
            edit(feature);
        }
        self.invalidate_obstacles();
        Ok(())
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn spawn_shared(&mut self, handle: Entity, components: impl DynamicBundle) {
        let reusable = self
            .shared
            .last_mut()
            .map_or(false, |layer| Arc::get_mut(layer).is_some());
        if !reusable {
            self.shared.push(Arc::new(World::new()));
        }
        if let Some(layer) = self.shared.last_mut().and_then(Arc::get_mut) {
            layer.spawn_at(handle, components);
        }
    }

    /// Tiers in lookup precedence order.
    fn tiers(&self) -> Vec<&World> {
        std::iter::once(&self.local)
            .chain(self.shared.iter().rev().map(|layer| &**layer))
            .collect()
    }

    fn locate(&self, id: EntityId) -> Result<(&World, Entity), StoreError> {
        let handle = handle(id);
        self.tiers()
            .into_iter()
            .find(|world| world.contains(handle))
            .map(|world| (world, handle))
            .ok_or(StoreError::MissingEntity(id))
    }

    fn absent_from_local(&self, id: EntityId) -> StoreError {
        if self.contains(id) {
            StoreError::ReadOnly(id)
        } else {
            StoreError::MissingEntity(id)
        }
    }

    fn invalidate_queries(&mut self) {
        lock(&self.query_cache).clear();
    }

    fn invalidate_obstacles(&mut self) {
        // Copies may still hold the old cache; give this world a fresh one.
        self.obstacle_cache = ObstacleCache::default();
    }
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("local_entities", &self.local.len())
            .field("shared_layers", &self.shared.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// The hecs handle for `id`. Generation 1 is never zero, so the bit
/// pattern is always a valid handle.
fn handle(id: EntityId) -> Entity {
    Entity::from_bits(HANDLE_GENERATION | u64::from(id.0)).unwrap_or(Entity::DANGLING)
}

fn shadowed(higher: &[&World], handle: Entity) -> bool {
    higher.iter().any(|world| world.contains(handle))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
