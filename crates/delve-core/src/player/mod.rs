//! Player combat control.
//!
//! # Architecture
//!
//! - [`InputFrame`]: edge-detected buttons and the move vector for one tick
//! - [`ChargeGauge`]: time-based resource gating aim mode
//! - [`motor`]: facing and gravity math
//! - [`PlayerCombatController`]: the Free / Aiming state machine
//!
//! The controller never applies damage itself. It reports shots as
//! [`PlayerEvent::Fired`] and the owner resolves them through the combat
//! resolver, so the controller needs only read access to enemy positions
//! via [`TargetLookup`].

mod controller;
mod gauge;
mod input;
pub mod motor;

pub use controller::{CombatMode, PlayerCombatController};
pub use gauge::ChargeGauge;
pub use input::InputFrame;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Read access to attackable entities.
pub trait TargetLookup {
    /// Closest live target to `from` by Euclidean distance.
    ///
    /// Ties go to whichever candidate the implementation visits first.
    fn nearest_target(&self, from: Vec3) -> Option<(EntityId, Vec3)>;

    /// Current position of a live target.
    fn target_position(&self, id: EntityId) -> Option<Vec3>;
}

/// Something the controller did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Aim mode entered, locked onto `target` if one was found.
    AimStarted {
        /// Acquired target.
        target: Option<EntityId>,
    },
    /// A shot was fired. `hit` is true if the target was in range.
    Fired {
        /// Target at the time of firing.
        target: Option<EntityId>,
        /// Whether the shot lands.
        hit: bool,
    },
    /// Aim mode left without firing.
    AimCancelled,
    /// Aim mode left after the post-fire delay.
    AimEnded,
}
