//! # Delve Core
//!
//! Combat, enemy AI and tile-map generation for delve, independent of any
//! engine.
//!
//! ## Architecture
//!
//! - **World**: [`arena::Arena`] holds every entity of the active map;
//!   [`agent::EnemyRoster`] and [`player::PlayerCombatController`] hold
//!   behavior
//! - **Behavior**: [`fsm::StateMachine`] drives [`ai`] states such as
//!   patrol; [`timer`] models multi-tick waits with cancellation
//! - **Combat**: [`combat::CombatResolver`] applies damage and defeat
//! - **Maps**: [`map`] parses map files, generates levels and tracks portals
//! - **Collaborators**: [`nav::Navigation`] and
//!   [`presentation::Presentation`] are injected, never looked up
//!
//! [`game::Game`] wires them together and runs the tick loop.
//!
//! ## Usage
//!
//! ```
//! use delve_core::{Game, GameConfig, InputFrame, MapRegistry};
//!
//! let registry = MapRegistry::from_json_strs([
//!     r#"{"mapId":"start","tileSize":4.0,"layout":["WWW","WPW","WWW"]}"#,
//! ]).unwrap();
//! let mut game = Game::new(GameConfig::default(), registry);
//! game.load_map("start", 0).unwrap();
//! game.step(&InputFrame::idle(), 1.0 / 60.0);
//! assert_eq!(game.current_map_id(), Some("start"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod ai;
pub mod arena;
pub mod combat;
pub mod config;
pub mod entity;
pub mod error;
pub mod fsm;
pub mod game;
pub mod map;
pub mod nav;
pub mod player;
pub mod presentation;
pub mod timer;

pub use agent::{EnemyAgent, EnemyRoster};
pub use arena::Arena;
pub use combat::{CombatResolver, DamageOutcome};
pub use config::GameConfig;
pub use entity::{EntityId, EntityTag};
pub use error::{CombatError, ConfigError, MapError};
pub use game::{Game, GameEvent};
pub use map::{MapData, MapRegistry, TileMapGenerator};
pub use nav::{GridNavigation, Navigation};
pub use player::{InputFrame, PlayerCombatController, PlayerEvent};
pub use presentation::{Presentation, PresentationEvent, PresentationLog};

#[cfg(test)]
mod tests;
