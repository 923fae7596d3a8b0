//! Tick-driven timers with cancellation.
//!
//! Multi-frame waits (the navigation-ready wait, the post-fire delay) are
//! plain values advanced once per tick by their owner. Cancelling a timer
//! guarantees it never reports completion, so an owner torn down mid-wait
//! produces no further side effects.

use serde::{Deserialize, Serialize};

/// Counts down from a duration in seconds.
///
/// # Example
///
/// ```
/// use delve_core::timer::Countdown;
///
/// let mut delay = Countdown::new(0.5);
/// assert!(!delay.advance(0.3));
/// assert!(delay.advance(0.3));
/// // Completion is reported once.
/// assert!(!delay.advance(0.3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f32,
    fired: bool,
    cancelled: bool,
}

impl Countdown {
    /// Starts a countdown of `seconds`.
    #[must_use]
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
            fired: false,
            cancelled: false,
        }
    }

    /// Advances by `dt` seconds.
    ///
    /// Returns `true` exactly once: on the tick the countdown reaches zero.
    /// A cancelled countdown always returns `false`.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.cancelled || self.fired {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.fired = true;
            return true;
        }
        false
    }

    /// Seconds left before completion.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// True once the countdown has completed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.fired
    }

    /// Cancels the countdown.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// True if the countdown was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// True while the countdown can still complete.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.fired && !self.cancelled
    }
}
