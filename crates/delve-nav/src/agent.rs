//! Steering agent state.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier of an agent within a [`Crowd`](crate::Crowd).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(u64);

impl AgentId {
    /// Creates an agent identifier from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

/// Per-agent movement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Distance from the destination at which the agent counts as arrived.
    pub stopping_distance: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            speed: 3.5,
            stopping_distance: 0.5,
        }
    }
}

/// A single steering agent.
///
/// Fields are only mutated by the owning crowd; read them through the
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavAgent {
    pub(crate) position: Vec3,
    pub(crate) destination: Option<Vec3>,
    pub(crate) path_pending: bool,
    pub(crate) has_path: bool,
    pub(crate) velocity: Vec3,
    pub(crate) stopped: bool,
    pub(crate) on_surface: bool,
    pub(crate) params: AgentParams,
}

impl NavAgent {
    pub(crate) fn new(position: Vec3, params: AgentParams, on_surface: bool) -> Self {
        Self {
            position,
            destination: None,
            path_pending: false,
            has_path: false,
            velocity: Vec3::ZERO,
            stopped: false,
            on_surface,
            params,
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Last destination requested, if any.
    #[must_use]
    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// True between `set_destination` and the next crowd step.
    #[must_use]
    pub fn path_pending(&self) -> bool {
        self.path_pending
    }

    /// True while the agent is travelling along a resolved path.
    #[must_use]
    pub fn has_path(&self) -> bool {
        self.has_path
    }

    /// Velocity applied during the last step.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// True if movement has been halted explicitly.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// True if the agent stands on the navigable surface.
    #[must_use]
    pub fn is_on_surface(&self) -> bool {
        self.on_surface
    }

    /// Movement parameters.
    #[must_use]
    pub fn params(&self) -> AgentParams {
        self.params
    }

    /// Horizontal distance left to the destination, or `0.0` without one.
    #[must_use]
    pub fn remaining_distance(&self) -> f32 {
        self.destination.map_or(0.0, |dest| {
            let mut offset = dest - self.position;
            offset.y = 0.0;
            offset.length()
        })
    }
}
