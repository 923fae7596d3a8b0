//! Enemy behavior states.
//!
//! Behaviors are [`State`]s over an [`AgentContext`], which lends them the
//! navigation capability and the random source for one callback. The
//! context is rebuilt every tick, so states never hold references into the
//! world.
//!
//! # Available States
//!
//! - [`PatrolState`]: wander around a home point, pause, repeat

mod patrol;

pub use patrol::{PatrolSettings, PatrolState};

use rand::RngCore;

use crate::entity::EntityId;
use crate::fsm::{State, StateMachine};
use crate::nav::Navigation;

/// Everything a behavior may touch during one callback.
pub struct AgentContext<'a> {
    /// The agent being driven.
    pub entity: EntityId,
    /// Navigation capability.
    pub nav: &'a mut dyn Navigation,
    /// Random source for sampling.
    pub rng: &'a mut dyn RngCore,
    /// Seconds since the previous tick.
    pub delta_seconds: f32,
}

/// Trait object type of an enemy behavior.
pub type AgentState = dyn for<'a> State<AgentContext<'a>>;

/// State machine driving one enemy.
pub type AgentStateMachine = StateMachine<AgentState>;
