//! Presentation collaborator.
//!
//! The core reports what happened (damage dealt, defeats, removals) and the
//! presentation layer decides how to show it: floating numbers, hit flashes,
//! removal effects. Notifications are fire-and-forget; an implementation must
//! not call back into the core.
//!
//! # Usage
//!
//! [`PresentationLog`] records every notification and is drained with
//! [`PresentationLog::take_events`], typically once per tick.
//!
//! ```
//! use delve_core::entity::EntityId;
//! use delve_core::presentation::{Presentation, PresentationEvent, PresentationLog};
//!
//! let mut log = PresentationLog::new();
//! log.notify_defeated(EntityId::new(4));
//!
//! assert_eq!(log.take_events(), vec![PresentationEvent::Defeated(EntityId::new(4))]);
//! assert!(log.is_empty());
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Height above a target at which floating damage text is anchored.
pub const DAMAGE_TEXT_HEIGHT: f32 = 1.5;

/// Payload of a "damage applied" notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageNotice {
    /// Entity that took the damage.
    pub target: EntityId,
    /// Damage requested, before clamping.
    pub amount: i32,
    /// Hit points before the hit.
    pub previous_hp: i32,
    /// Hit points after the hit.
    pub new_hp: i32,
    /// Anchor for floating text.
    pub world_position: Vec3,
}

/// Sink for core notifications.
pub trait Presentation {
    /// Damage was applied to a combatant.
    fn notify_damage(&mut self, notice: &DamageNotice);

    /// A combatant was defeated.
    fn notify_defeated(&mut self, target: EntityId);

    /// An entity is being removed from the world (plays the removal effect).
    fn notify_removed(&mut self, target: EntityId);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresentation;

impl Presentation for NullPresentation {
    fn notify_damage(&mut self, _notice: &DamageNotice) {}

    fn notify_defeated(&mut self, _target: EntityId) {}

    fn notify_removed(&mut self, _target: EntityId) {}
}

/// A recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PresentationEvent {
    /// See [`Presentation::notify_damage`].
    Damage(DamageNotice),
    /// See [`Presentation::notify_defeated`].
    Defeated(EntityId),
    /// See [`Presentation::notify_removed`].
    Removed(EntityId),
}

/// Presentation sink that records notifications in order.
#[derive(Debug, Clone, Default)]
pub struct PresentationLog {
    events: Vec<PresentationEvent>,
}

impl PresentationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Drains and returns the recorded events, oldest first.
    pub fn take_events(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[PresentationEvent] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Counts recorded defeat notifications for `target`.
    #[must_use]
    pub fn defeat_count(&self, target: EntityId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresentationEvent::Defeated(id) if *id == target))
            .count()
    }
}

impl Presentation for PresentationLog {
    fn notify_damage(&mut self, notice: &DamageNotice) {
        self.events.push(PresentationEvent::Damage(*notice));
    }

    fn notify_defeated(&mut self, target: EntityId) {
        self.events.push(PresentationEvent::Defeated(target));
    }

    fn notify_removed(&mut self, target: EntityId) {
        self.events.push(PresentationEvent::Removed(target));
    }
}
