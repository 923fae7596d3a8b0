//! Component structs carried by entities and agents.

use bitflags::bitflags;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Transform
// =============================================================================

/// World placement of an entity.
///
/// `yaw` is a rotation about the vertical axis in degrees; `0` faces `+z`
/// and `90` faces `+x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World position.
    pub position: Vec3,
    /// Heading about the vertical axis, in degrees.
    pub yaw: f32,
}

impl Transform {
    /// Creates a transform.
    #[must_use]
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Creates a transform with zero yaw.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, 0.0)
    }

    /// Unit vector the transform faces along.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        let radians = self.yaw.to_radians();
        Vec3::new(radians.sin(), 0.0, radians.cos())
    }
}

// =============================================================================
// Combat
// =============================================================================

bitflags! {
    /// Combat status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CombatFlags: u8 {
        /// Defeat has been processed; no further defeat events may fire.
        const DEFEATED = 0b0000_0001;
    }
}

/// Hit point pool of anything that can take damage.
///
/// # Invariants
///
/// - `max_hp >= 1`
/// - `0 <= current_hp <= max_hp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    current_hp: i32,
    max_hp: i32,
    flags: CombatFlags,
}

impl Combatant {
    /// Creates a combatant at full health. `max_hp` below 1 is raised to 1.
    #[must_use]
    pub fn new(max_hp: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            current_hp: max_hp,
            max_hp,
            flags: CombatFlags::empty(),
        }
    }

    /// Current hit points.
    #[must_use]
    pub const fn current_hp(&self) -> i32 {
        self.current_hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Sets hit points, clamped to `[0, max_hp]`. Never triggers defeat.
    pub fn set_current_hp(&mut self, hp: i32) {
        self.current_hp = hp.clamp(0, self.max_hp);
    }

    /// Status flags.
    #[must_use]
    pub const fn flags(&self) -> CombatFlags {
        self.flags
    }

    /// True once defeat has been processed.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.flags.contains(CombatFlags::DEFEATED)
    }

    /// Marks the combatant defeated. Returns `false` if it already was.
    pub fn mark_defeated(&mut self) -> bool {
        if self.is_defeated() {
            return false;
        }
        self.flags.insert(CombatFlags::DEFEATED);
        true
    }
}

// =============================================================================
// Map geometry
// =============================================================================

/// Cardinal direction on the tile grid.
///
/// North is the previous row (world `+z`), east the next column (world `+x`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Previous row, world `+z`.
    #[default]
    North,
    /// Next row, world `-z`.
    South,
    /// Previous column, world `-x`.
    West,
    /// Next column, world `+x`.
    East,
}

impl Direction {
    /// Probe order used when looking for a door side: up, down, left, right.
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::West, Self::East];

    /// Grid step `(d_col, d_row)` toward the neighbor in this direction.
    #[must_use]
    pub const fn grid_offset(self) -> (isize, isize) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }

    /// Horizontal world-space unit vector toward the neighbor.
    #[must_use]
    pub fn world_offset(self) -> Vec3 {
        match self {
            Self::North => Vec3::Z,
            Self::South => Vec3::NEG_Z,
            Self::West => Vec3::NEG_X,
            Self::East => Vec3::X,
        }
    }

    /// Yaw of a wall panel on this side: north 0, south 180, west -90, east 90.
    #[must_use]
    pub const fn wall_yaw(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::South => 180.0,
            Self::West => -90.0,
            Self::East => 90.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::North => write!(f, "north"),
            Self::South => write!(f, "south"),
            Self::West => write!(f, "west"),
            Self::East => write!(f, "east"),
        }
    }
}

/// Floor tile payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorComponents {
    /// Asset name used by the renderer.
    pub asset: String,
}

/// Wall panel payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallComponents {
    /// Outside side of the cell this panel closes off.
    pub facing: Direction,
    /// Asset name used by the renderer.
    pub asset: String,
}

/// Door panel payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoorComponents {
    /// Digit of the portal cell that owns this door.
    pub trigger_char: char,
    /// Asset name used by the renderer.
    pub asset: String,
}

/// Destination of a portal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortalLink {
    /// Map to load.
    pub target_map_id: String,
    /// Spawn index in the target map.
    pub target_spawn_id: u32,
}

/// Portal trigger payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalComponents {
    /// Where the portal leads.
    pub link: PortalLink,
    /// Horizontal half extents of the trigger box (x, z).
    pub half_extents: Vec2,
}

impl PortalComponents {
    /// Returns true if `point` lies inside the trigger box centered at `center`.
    #[must_use]
    pub fn contains(&self, center: Vec3, point: Vec3) -> bool {
        (point.x - center.x).abs() <= self.half_extents.x
            && (point.z - center.z).abs() <= self.half_extents.y
    }
}
