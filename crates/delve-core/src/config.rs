//! Tunable parameters for the player, enemies and patrol behavior.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```
//! use delve_core::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "player": { "attack_range": 12.0 } }"#).unwrap();
//! assert_eq!(config.player.attack_range, 12.0);
//! assert_eq!(config.player.walk_speed, 2.0);
//! assert_eq!(config.enemy.max_hp, 3);
//! ```

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Player movement and combat parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Speed while the modifier is held.
    pub walk_speed: f32,
    /// Speed while the modifier is released.
    pub run_speed: f32,
    /// Facing responsiveness; the damping time is `1 / rotation_speed`.
    pub rotation_speed: f32,
    /// Downward acceleration (negative).
    pub gravity: f32,
    /// Vertical velocity the player is pinned to while grounded.
    pub grounded_velocity: f32,
    /// Seconds of free movement needed to fill the charge gauge.
    pub charge_time: f32,
    /// Maximum distance at which a shot lands.
    pub attack_range: f32,
    /// Delay between firing and leaving aim mode.
    pub post_fire_delay: f32,
    /// Exponential turn rate while aiming, per second.
    pub aim_turn_rate: f32,
    /// Height above the spawn tile the player is placed at.
    pub spawn_height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
            rotation_speed: 10.0,
            gravity: -9.81,
            grounded_velocity: -2.0,
            charge_time: 3.0,
            attack_range: 10.0,
            post_fire_delay: 0.5,
            aim_turn_rate: 10.0,
            spawn_height: 0.1,
        }
    }
}

/// Enemy agent parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Hit points of a fresh enemy.
    pub max_hp: i32,
    /// Damage a single player shot deals.
    pub shot_damage: i32,
    /// How long a new agent waits for the navigable surface.
    pub nav_ready_timeout: f32,
    /// Search radius when snapping a spawn onto the surface.
    pub spawn_snap_tolerance: f32,
    /// Travel speed.
    pub speed: f32,
    /// Arrival distance.
    pub stopping_distance: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_hp: 3,
            shot_damage: 1,
            nav_ready_timeout: 1.0,
            spawn_snap_tolerance: 2.0,
            speed: 3.5,
            stopping_distance: 0.5,
        }
    }
}

/// Patrol behavior parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Half-width of the square around home that destinations are drawn from.
    pub radius: f32,
    /// Candidates closer than this to the agent are rejected.
    pub min_distance: f32,
    /// Pause after arrival, drawn uniformly from `[x, y]` seconds.
    pub wait_range: Vec2,
    /// Sampling attempts before falling back to home.
    pub attempts: u32,
    /// Projection tolerance onto the navigable surface.
    pub sample_tolerance: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            min_distance: 2.0,
            wait_range: Vec2::new(0.5, 1.5),
            attempts: 6,
            sample_tolerance: 2.0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Master seed for patrol sampling.
    pub seed: u64,
    /// Player parameters.
    pub player: PlayerConfig,
    /// Enemy parameters.
    pub enemy: EnemyConfig,
    /// Patrol parameters.
    pub patrol: PatrolConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            patrol: PatrolConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`GameConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("player.walk_speed", self.player.walk_speed)?;
        non_negative("player.run_speed", self.player.run_speed)?;
        positive("player.rotation_speed", self.player.rotation_speed)?;
        finite("player.gravity", self.player.gravity)?;
        finite("player.charge_time", self.player.charge_time)?;
        non_negative("player.attack_range", self.player.attack_range)?;
        non_negative("player.post_fire_delay", self.player.post_fire_delay)?;
        positive("player.aim_turn_rate", self.player.aim_turn_rate)?;

        if self.enemy.max_hp < 1 {
            return Err(ConfigError::Invalid {
                field: "enemy.max_hp",
                reason: format!("must be at least 1, got {}", self.enemy.max_hp),
            });
        }
        non_negative("enemy.nav_ready_timeout", self.enemy.nav_ready_timeout)?;
        non_negative("enemy.spawn_snap_tolerance", self.enemy.spawn_snap_tolerance)?;
        non_negative("enemy.speed", self.enemy.speed)?;
        non_negative("enemy.stopping_distance", self.enemy.stopping_distance)?;

        non_negative("patrol.radius", self.patrol.radius)?;
        non_negative("patrol.min_distance", self.patrol.min_distance)?;
        non_negative("patrol.wait_range.x", self.patrol.wait_range.x)?;
        non_negative("patrol.wait_range.y", self.patrol.wait_range.y)?;
        if self.patrol.wait_range.x > self.patrol.wait_range.y {
            return Err(ConfigError::Invalid {
                field: "patrol.wait_range",
                reason: "lower bound exceeds upper bound".to_string(),
            });
        }
        non_negative("patrol.sample_tolerance", self.patrol.sample_tolerance)?;
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be finite, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_object_gives_defaults() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_override() {
        let config =
            GameConfig::from_json_str(r#"{"seed": 7, "patrol": {"wait_range": [1.0, 2.0]}}"#)
                .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.patrol.wait_range, Vec2::new(1.0, 2.0));
        assert_eq!(config.patrol.radius, 8.0);
    }

    #[test]
    fn inverted_wait_range_rejected() {
        let err = GameConfig::from_json_str(r#"{"patrol": {"wait_range": [2.0, 1.0]}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "patrol.wait_range",
                ..
            }
        ));
    }

    #[test]
    fn zero_max_hp_rejected() {
        let err = GameConfig::from_json_str(r#"{"enemy": {"max_hp": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "enemy.max_hp", .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            GameConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"player": {{"charge_time": 1.5}}}}"#).unwrap();
        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.player.charge_time, 1.5);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
