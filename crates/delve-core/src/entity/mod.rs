//! Entity records for the generated world.
//!
//! This module provides the core entity types stored in the [`Arena`](crate::arena::Arena):
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Type classification used for queries and teardown
//! - [`EntityInner`]: Type-specific payload
//! - [`Entity`]: The complete entity container
//!
//! Behavior (enemy brains, the player controller) lives outside the arena; the
//! arena is the index those systems use to find positions and identities.
//!
//! # Example
//!
//! ```
//! use delve_core::entity::{Entity, EntityId, EntityInner, EntityTag, Transform};
//! use glam::Vec3;
//!
//! let wall = Entity::new(
//!     EntityId::new(42),
//!     Transform::new(Vec3::new(0.0, 2.0, 2.0), 0.0),
//!     EntityInner::Wall(Default::default()),
//! );
//!
//! assert_eq!(wall.id().as_u64(), 42);
//! assert_eq!(wall.tag(), EntityTag::Wall);
//! assert!(wall.is_generated());
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    CombatFlags, Combatant, Direction, DoorComponents, FloorComponents, PortalComponents,
    PortalLink, Transform, WallComponents,
};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Identifiers are assigned
/// monotonically by the arena and never reused, so a stale id can never
/// alias a newer entity.
///
/// # Example
///
/// ```
/// use delve_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity type tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The persistent player character
    Player,
    /// A patrolling enemy
    Enemy,
    /// A floor tile
    Floor,
    /// A wall panel on the outer edge of a wall cell
    Wall,
    /// A door panel in front of a portal wall
    Door,
    /// A portal trigger volume
    Portal,
}

impl EntityTag {
    /// Returns true for tags produced by map generation.
    ///
    /// Enemies count as generated: they are spawned per map and torn down with
    /// the rest of the level. Only the player survives regeneration.
    #[must_use]
    pub const fn is_generated(self) -> bool {
        !matches!(self, Self::Player)
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Floor => write!(f, "Floor"),
            Self::Wall => write!(f, "Wall"),
            Self::Door => write!(f, "Door"),
            Self::Portal => write!(f, "Portal"),
        }
    }
}

/// Type-specific payload of an entity.
///
/// The variant determines the entity's [`EntityTag`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Player marker (state lives in the player controller)
    Player,
    /// Enemy marker (state lives in the enemy agent registry)
    Enemy,
    /// Floor tile
    Floor(FloorComponents),
    /// Wall panel
    Wall(WallComponents),
    /// Door panel
    Door(DoorComponents),
    /// Portal trigger
    Portal(PortalComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this payload.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Player => EntityTag::Player,
            Self::Enemy => EntityTag::Enemy,
            Self::Floor(_) => EntityTag::Floor,
            Self::Wall(_) => EntityTag::Wall,
            Self::Door(_) => EntityTag::Door,
            Self::Portal(_) => EntityTag::Portal,
        }
    }

    /// Returns the wall components, if this is a wall.
    #[must_use]
    pub const fn as_wall(&self) -> Option<&WallComponents> {
        match self {
            Self::Wall(components) => Some(components),
            _ => None,
        }
    }

    /// Returns the portal components, if this is a portal.
    #[must_use]
    pub const fn as_portal(&self) -> Option<&PortalComponents> {
        match self {
            Self::Portal(components) => Some(components),
            _ => None,
        }
    }
}

/// A complete entity record.
///
/// # Invariants
///
/// - The `EntityId` is unique within an arena
/// - The tag always matches the `EntityInner` variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    transform: Transform,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity record.
    #[must_use]
    pub const fn new(id: EntityId, transform: Transform, inner: EntityInner) -> Self {
        Self {
            id,
            transform,
            inner,
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns true if map regeneration removes this entity.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.tag().is_generated()
    }

    /// Returns the entity's transform.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Returns a mutable reference to the transform.
    ///
    /// Call [`Arena::update_spatial`](crate::arena::Arena::update_spatial)
    /// after moving the entity.
    #[must_use]
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Returns the entity's payload.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    mod entity_id_tests {
        use super::*;

        #[test]
        fn ids_are_ordered() {
            assert!(EntityId::new(1) < EntityId::new(2));
        }

        #[test]
        fn conversion_roundtrip() {
            let id: EntityId = 9u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 9);
        }

        #[test]
        fn debug_and_display() {
            let id = EntityId::new(5);
            assert_eq!(format!("{id:?}"), "EntityId(5)");
            assert_eq!(format!("{id}"), "5");
        }
    }

    mod tag_tests {
        use super::*;

        #[test]
        fn inner_determines_tag() {
            assert_eq!(EntityInner::Player.tag(), EntityTag::Player);
            assert_eq!(EntityInner::Enemy.tag(), EntityTag::Enemy);
            assert_eq!(
                EntityInner::Floor(FloorComponents::default()).tag(),
                EntityTag::Floor
            );
            assert_eq!(
                EntityInner::Door(DoorComponents::default()).tag(),
                EntityTag::Door
            );
        }

        #[test]
        fn only_player_survives_regeneration() {
            assert!(!EntityTag::Player.is_generated());
            for tag in [
                EntityTag::Enemy,
                EntityTag::Floor,
                EntityTag::Wall,
                EntityTag::Door,
                EntityTag::Portal,
            ] {
                assert!(tag.is_generated(), "{tag} should be generated");
            }
        }
    }

    #[test]
    fn entity_accessors() {
        let mut entity = Entity::new(
            EntityId::new(3),
            Transform::new(Vec3::ONE, 90.0),
            EntityInner::Wall(WallComponents {
                facing: Direction::East,
                asset: "Wall".to_string(),
            }),
        );
        assert_eq!(entity.inner().as_wall().unwrap().facing, Direction::East);
        assert!(entity.inner().as_portal().is_none());

        entity.transform_mut().position = Vec3::ZERO;
        assert_eq!(entity.transform().position, Vec3::ZERO);
    }
}
