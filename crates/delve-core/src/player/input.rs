//! Per-tick input sample.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input for one tick.
///
/// `fire` and `cancel` are edges (pressed this tick); `modifier` is a held
/// state. Field names follow the script file format:
///
/// ```
/// use delve_core::player::InputFrame;
///
/// let frame: InputFrame =
///     serde_json::from_str(r#"{"moveAxis": [0.0, 1.0], "modifier": true}"#).unwrap();
/// assert_eq!(frame.move_axis.y, 1.0);
/// assert!(frame.modifier);
/// assert!(!frame.fire);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputFrame {
    /// Continuous 2D move vector; `y` is forward.
    pub move_axis: Vec2,
    /// Fire pressed this tick.
    pub fire: bool,
    /// Cancel pressed this tick.
    pub cancel: bool,
    /// Speed modifier held (walk instead of run).
    pub modifier: bool,
    /// Camera yaw in degrees; movement is relative to it.
    pub camera_yaw: f32,
}

impl InputFrame {
    /// A frame with no input.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// A frame that only presses fire.
    #[must_use]
    pub fn fire() -> Self {
        Self {
            fire: true,
            ..Self::default()
        }
    }

    /// A frame that only presses cancel.
    #[must_use]
    pub fn cancel() -> Self {
        Self {
            cancel: true,
            ..Self::default()
        }
    }

    /// A frame that only moves.
    #[must_use]
    pub fn moving(axis: Vec2) -> Self {
        Self {
            move_axis: axis,
            ..Self::default()
        }
    }
}
