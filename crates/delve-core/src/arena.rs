//! Arena module: the registry of world objects.
//!
//! The Arena is the container for every entity in the active map. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - A position index for proximity queries
//! - Entity lifecycle management (spawn/despawn, wholesale teardown)
//!
//! # Spatial Index Synchronization
//!
//! **Important**: The position index is NOT automatically synchronized when entity
//! positions change through `get_mut()`. Call `update_spatial(id)` afterward.
//! Spawning and despawning update the index automatically.
//!
//! ```
//! # use delve_core::arena::Arena;
//! # use delve_core::entity::{EntityInner, Transform};
//! # use glam::Vec3;
//! # let mut arena = Arena::new();
//! # let id = arena.spawn(Transform::at(Vec3::ZERO), EntityInner::Enemy);
//! if let Some(entity) = arena.get_mut(id) {
//!     entity.transform_mut().position = Vec3::new(8.0, 0.0, -4.0);
//! }
//! // REQUIRED: sync the index after a position change
//! arena.update_spatial(id);
//! assert_eq!(arena.spatial().get(id), Some(Vec3::new(8.0, 0.0, -4.0)));
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityInner, EntityTag, Transform};

// =============================================================================
// Spatial Index
// =============================================================================

/// Position index for proximity queries.
///
/// `HashMap` is acceptable here because every query that returns several ids
/// sorts them before handing them out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    positions: HashMap<EntityId, Vec3>,
}

impl SpatialIndex {
    /// Creates a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Inserts or updates an entity's position.
    pub fn insert(&mut self, id: EntityId, pos: Vec3) {
        self.positions.insert(id, pos);
    }

    /// Removes an entity from the index.
    pub fn remove(&mut self, id: EntityId) {
        self.positions.remove(&id);
    }

    /// Returns the indexed position of an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    /// Queries for entities within `radius` of `center`, sorted by id.
    #[must_use]
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut results: Vec<EntityId> = self
            .positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();

        results.sort();
        results
    }

    /// Returns the number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Registry of all entities in the active map.
///
/// Entity IDs are assigned monotonically and never reused, and the `BTreeMap`
/// keeps iteration in spawn order.
///
/// # Example
///
/// ```
/// use delve_core::arena::Arena;
/// use delve_core::entity::{EntityInner, EntityTag, Transform};
/// use glam::Vec3;
///
/// let mut arena = Arena::new();
/// let player = arena.spawn(Transform::at(Vec3::ZERO), EntityInner::Player);
/// let enemy = arena.spawn(Transform::at(Vec3::new(4.0, 0.0, 0.0)), EntityInner::Enemy);
///
/// let ids: Vec<_> = arena.entity_ids_sorted().collect();
/// assert_eq!(ids, vec![player, enemy]);
///
/// // Tear down everything except the player
/// arena.despawn_generated();
/// assert_eq!(arena.entity_count(), 1);
/// assert_eq!(arena.get(player).unwrap().tag(), EntityTag::Player);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    spatial: SpatialIndex,
}

impl Arena {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            spatial: SpatialIndex::new(),
        }
    }

    /// Spawns a new entity and returns its id.
    pub fn spawn(&mut self, transform: Transform, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        self.spatial.insert(id, transform.position);
        self.entities.insert(id, Entity::new(id, transform, inner));
        id
    }

    /// Despawns an entity, returning it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.entities.remove(&id)
    }

    /// Despawns every entity produced by map generation.
    ///
    /// Returns the removed ids in ascending order.
    pub fn despawn_generated(&mut self) -> Vec<EntityId> {
        self.despawn_where(Entity::is_generated)
    }

    /// Despawns every entity matching `predicate`, returning their ids in
    /// ascending order.
    pub fn despawn_where(&mut self, mut predicate: impl FnMut(&Entity) -> bool) -> Vec<EntityId> {
        let doomed: Vec<EntityId> = self
            .entities
            .values()
            .filter(|entity| predicate(entity))
            .map(Entity::id)
            .collect();
        for id in &doomed {
            self.despawn(*id);
        }
        doomed
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns true if the entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns an iterator over entity IDs in ascending order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in ascending ID order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over entities with the given tag, in ID order.
    pub fn entities_tagged(&self, tag: EntityTag) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(move |e| e.tag() == tag)
    }

    /// Counts entities with the given tag.
    #[must_use]
    pub fn count_tagged(&self, tag: EntityTag) -> usize {
        self.entities_tagged(tag).count()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a reference to the position index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Re-reads an entity's position into the index.
    ///
    /// Returns false if the entity does not exist.
    pub fn update_spatial(&mut self, id: EntityId) -> bool {
        match self.entities.get(&id) {
            Some(entity) => {
                self.spatial.insert(id, entity.transform().position);
                true
            }
            None => false,
        }
    }

    /// Moves an entity and keeps the index in sync.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.transform_mut().position = position;
            self.spatial.insert(id, position);
            true
        } else {
            false
        }
    }
}
