//! Combat: damage application and defeat handling.
//!
//! # Architecture
//!
//! - [`Damageable`]: anything with a [`Combatant`] hit point pool
//! - [`CombatResolver`]: the single authority that mutates hit points
//!
//! The resolver owns no state. Callers hand it the target for the duration
//! of one call, together with the presentation sink that receives the
//! resulting notifications.

mod resolver;

pub use resolver::{CombatResolver, DamageOutcome};

use glam::Vec3;

use crate::entity::{Combatant, EntityId};
use crate::presentation::Presentation;

/// Something with an identity and a world position.
pub trait Targetable {
    /// Identity reported in notifications.
    fn target_id(&self) -> EntityId;

    /// Current world position.
    fn world_position(&self) -> Vec3;
}

/// Something that can take damage.
pub trait Damageable: Targetable {
    /// The hit point pool.
    fn combatant(&self) -> &Combatant;

    /// Mutable access to the hit point pool.
    fn combatant_mut(&mut self) -> &mut Combatant;

    /// Runs the destruction path. Called at most once per lifetime.
    fn on_defeated(&mut self, presentation: &mut dyn Presentation);
}
