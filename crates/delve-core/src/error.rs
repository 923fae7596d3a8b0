//! Error types.
//!
//! Every failure the core can report is an explicit value. Nothing here is
//! used for control flow across component boundaries; callers inspect the
//! result and decide whether to degrade, skip, or abort.

use std::path::PathBuf;

use thiserror::Error;

use crate::entity::EntityId;

/// Errors raised by damage application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// No combatant was supplied.
    #[error("damage target is missing")]
    MissingTarget,

    /// The id does not name a live combatant.
    #[error("entity {0} is not a live combatant")]
    UnknownTarget(EntityId),
}

/// Errors raised while parsing, registering or loading maps.
#[derive(Debug, Error)]
pub enum MapError {
    /// The JSON document could not be parsed.
    #[error("map parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A map file could not be read.
    #[error("failed to read map file '{path}': {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No map with this id is registered.
    #[error("map '{0}' not found")]
    NotFound(String),

    /// The map declares an empty id.
    #[error("map id must not be empty")]
    EmptyId,

    /// Tile size must be a positive, finite number.
    #[error("map '{map_id}' has invalid tile size {tile_size}")]
    InvalidTileSize {
        /// Offending map.
        map_id: String,
        /// Declared size.
        tile_size: f32,
    },

    /// A portal trigger is not a single digit.
    #[error("map '{map_id}' has invalid portal trigger '{trigger}' (expected one digit 0-9)")]
    InvalidTrigger {
        /// Offending map.
        map_id: String,
        /// Declared trigger.
        trigger: String,
    },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The JSON document could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}
