//! Generic finite state machine.
//!
//! A [`StateMachine`] holds at most one active state. States receive a
//! caller-supplied context on every callback, so the machine itself never
//! owns the world it acts on.
//!
//! # Transition Order
//!
//! `change_state(next)` runs, synchronously and in this order:
//! 1. `exit` on the current state, if any
//! 2. replaces the current state with `next`
//! 3. `enter` on `next`, if it is `Some`
//!
//! Passing `None` is legal and leaves the machine idle. The previous state is
//! handed back so the caller can park it and re-enter it later.
//!
//! # Example
//!
//! ```
//! use delve_core::fsm::{State, StateMachine};
//!
//! struct Counter;
//!
//! impl State<u32> for Counter {
//!     fn name(&self) -> &'static str {
//!         "counter"
//!     }
//!
//!     fn tick(&mut self, ctx: &mut u32) {
//!         *ctx += 1;
//!     }
//! }
//!
//! let mut fsm: StateMachine<dyn State<u32>> = StateMachine::new();
//! let mut ticks: u32 = 0;
//!
//! fsm.tick(&mut ticks); // idle: no-op
//! fsm.change_state(Some(Box::new(Counter)), &mut ticks);
//! fsm.tick(&mut ticks);
//! fsm.tick(&mut ticks);
//! assert_eq!(ticks, 2);
//! ```

use std::fmt;

/// A behavior the machine can run.
///
/// Every callback has an empty default so states implement only what they
/// use.
pub trait State<C: ?Sized> {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Called once when the state becomes active.
    fn enter(&mut self, _ctx: &mut C) {}

    /// Called every tick while the state is active.
    fn tick(&mut self, _ctx: &mut C) {}

    /// Called once when the state stops being active.
    fn exit(&mut self, _ctx: &mut C) {}
}

/// Container driving one active state at a time.
///
/// `S` is usually a trait object such as `dyn State<Ctx>`.
pub struct StateMachine<S: ?Sized> {
    current: Option<Box<S>>,
}

impl<S: ?Sized> StateMachine<S> {
    /// Creates an idle machine.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Returns the active state.
    #[must_use]
    pub fn current(&self) -> Option<&S> {
        self.current.as_deref()
    }

    /// True if a state is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Switches to `next`, returning the state that was active before.
    pub fn change_state<C: ?Sized>(&mut self, next: Option<Box<S>>, ctx: &mut C) -> Option<Box<S>>
    where
        S: State<C>,
    {
        let mut previous = self.current.take();
        if let Some(state) = previous.as_mut() {
            state.exit(ctx);
        }
        self.current = next;
        if let Some(state) = self.current.as_mut() {
            tracing::trace!(state = state.name(), "entering state");
            state.enter(ctx);
        }
        previous
    }

    /// Ticks the active state. No-op while idle.
    pub fn tick<C: ?Sized>(&mut self, ctx: &mut C)
    where
        S: State<C>,
    {
        if let Some(state) = self.current.as_mut() {
            state.tick(ctx);
        }
    }

    /// Drops the active state without calling `exit`.
    ///
    /// Used on teardown, where the owner is already gone.
    pub fn clear(&mut self) -> Option<Box<S>> {
        self.current.take()
    }
}

impl<S: ?Sized> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("active", &self.is_active())
            .finish()
    }
}
