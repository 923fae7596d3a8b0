//! Maps: file format, level generation, portals and the map registry.
//!
//! # Architecture
//!
//! - [`MapData`] / [`TileGrid`]: the JSON map format and its character grid
//! - [`TileMapGenerator`]: grid to [`Blueprint`], blueprint into the world
//! - [`PortalTracker`]: enter-edge detection on portal triggers
//! - [`MapRegistry`]: id to map data, and the current map
//!
//! # Layout Characters
//!
//! | char | places |
//! |------|--------|
//! | space | nothing (outside) |
//! | `W` | floor and wall panels on outside sides |
//! | `0`-`9` | as `W`, plus a door and portal when the digit has a portal definition |
//! | `P` | floor, player start (spawn index 0) |
//! | `E` | floor, enemy spawn |
//! | other | floor |

mod generator;
mod layout;
mod portal;
mod registry;

pub use generator::{
    Blueprint, GenerationReport, Level, Placement, TileMapGenerator, DOOR_INSET, PLAYER_SPAWN,
};
pub use layout::{
    CellKind, MapData, PortalDef, TileGrid, DEFAULT_DOOR_ASSET, DEFAULT_FLOOR_ASSET,
    DEFAULT_WALL_ASSET,
};
pub use portal::PortalTracker;
pub use registry::MapRegistry;
