//! Stateless damage resolver.
//!
//! # Defeat Handling
//!
//! When hit points reach 0 the combatant's `DEFEATED` flag is set and the
//! target's destruction path runs. The flag makes defeat idempotent: further
//! hits on a combatant that is still around (removal completes in the
//! cleanup phase) update hit points and notify damage, but never defeat it a
//! second time.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Damageable, Targetable};
use crate::entity::EntityId;
use crate::error::CombatError;
use crate::presentation::{DamageNotice, Presentation, DAMAGE_TEXT_HEIGHT};

/// Result of one damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Entity that was hit.
    pub target: EntityId,
    /// Hit points before the hit.
    pub previous_hp: i32,
    /// Stored hit points after the hit.
    pub new_hp: i32,
    /// True if this hit defeated the target.
    pub defeated: bool,
}

/// Central authority applying damage to combatants.
///
/// # Example
///
/// ```
/// use delve_core::combat::{CombatResolver, Damageable, Targetable};
/// use delve_core::entity::{Combatant, EntityId};
/// use delve_core::presentation::{Presentation, PresentationLog};
/// use glam::Vec3;
///
/// struct Dummy(Combatant);
///
/// impl Targetable for Dummy {
///     fn target_id(&self) -> EntityId { EntityId::new(1) }
///     fn world_position(&self) -> Vec3 { Vec3::ZERO }
/// }
///
/// impl Damageable for Dummy {
///     fn combatant(&self) -> &Combatant { &self.0 }
///     fn combatant_mut(&mut self) -> &mut Combatant { &mut self.0 }
///     fn on_defeated(&mut self, _: &mut dyn Presentation) {}
/// }
///
/// let resolver = CombatResolver::new();
/// let mut log = PresentationLog::new();
/// let mut dummy = Dummy(Combatant::new(3));
///
/// let outcome = resolver.apply_damage(Some(&mut dummy), 5, None, &mut log).unwrap();
/// assert_eq!(outcome.new_hp, 0);
/// assert!(outcome.defeated);
///
/// let again = resolver.apply_damage(Some(&mut dummy), 1, None, &mut log).unwrap();
/// assert!(!again.defeated);
/// assert_eq!(log.defeat_count(EntityId::new(1)), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Applies `amount` damage to `target`.
    ///
    /// Any amount is accepted; negative amounts heal. Stored hit points are
    /// always clamped to `[0, max_hp]`.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::MissingTarget`] if `target` is `None`. Nothing
    /// is mutated or notified in that case.
    pub fn apply_damage(
        &self,
        target: Option<&mut dyn Damageable>,
        amount: i32,
        attacker: Option<EntityId>,
        presentation: &mut dyn Presentation,
    ) -> Result<DamageOutcome, CombatError> {
        let Some(target) = target else {
            warn!("apply_damage called without a target");
            return Err(CombatError::MissingTarget);
        };

        let id = target.target_id();
        let previous_hp = target.combatant().current_hp();
        let max_hp = target.combatant().max_hp();
        let new_hp = previous_hp.saturating_sub(amount);
        target.combatant_mut().set_current_hp(new_hp);
        let stored_hp = target.combatant().current_hp();

        debug!(
            entity = %id,
            attacker = ?attacker,
            amount,
            "damage applied: hp {previous_hp} -> {stored_hp}/{max_hp}"
        );

        presentation.notify_damage(&DamageNotice {
            target: id,
            amount,
            previous_hp,
            new_hp: stored_hp,
            world_position: target.world_position() + Vec3::Y * DAMAGE_TEXT_HEIGHT,
        });

        let defeated = new_hp <= 0 && target.combatant_mut().mark_defeated();
        if defeated {
            info!(entity = %id, attacker = ?attacker, "combatant defeated");
            presentation.notify_defeated(id);
            target.on_defeated(presentation);
        }

        Ok(DamageOutcome {
            target: id,
            previous_hp,
            new_hp: stored_hp,
            defeated,
        })
    }

    /// Reports damage against the player.
    ///
    /// The player has no hit points yet, so nothing is mutated; the damage
    /// notification still fires with both hit point fields at 0.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::MissingTarget`] if `player` is `None`.
    pub fn apply_damage_to_player(
        &self,
        player: Option<&dyn Targetable>,
        amount: i32,
        attacker: Option<EntityId>,
        presentation: &mut dyn Presentation,
    ) -> Result<DamageNotice, CombatError> {
        let Some(player) = player else {
            warn!("apply_damage_to_player called without a player");
            return Err(CombatError::MissingTarget);
        };

        debug!(attacker = ?attacker, amount, "player took damage");
        let notice = DamageNotice {
            target: player.target_id(),
            amount,
            previous_hp: 0,
            new_hp: 0,
            world_position: player.world_position() + Vec3::Y * DAMAGE_TEXT_HEIGHT,
        };
        presentation.notify_damage(&notice);
        Ok(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Combatant;
    use crate::presentation::{PresentationEvent, PresentationLog};
    use proptest::prelude::*;

    struct Dummy {
        id: EntityId,
        combatant: Combatant,
        position: Vec3,
        destroyed: u32,
    }

    impl Dummy {
        fn new(max_hp: i32) -> Self {
            Self {
                id: EntityId::new(7),
                combatant: Combatant::new(max_hp),
                position: Vec3::new(2.0, 0.0, -4.0),
                destroyed: 0,
            }
        }
    }

    impl Targetable for Dummy {
        fn target_id(&self) -> EntityId {
            self.id
        }

        fn world_position(&self) -> Vec3 {
            self.position
        }
    }

    impl Damageable for Dummy {
        fn combatant(&self) -> &Combatant {
            &self.combatant
        }

        fn combatant_mut(&mut self) -> &mut Combatant {
            &mut self.combatant
        }

        fn on_defeated(&mut self, presentation: &mut dyn Presentation) {
            self.destroyed += 1;
            presentation.notify_removed(self.id);
        }
    }

    mod apply_damage_tests {
        use super::*;

        #[test]
        fn damage_reduces_hp() {
            let mut dummy = Dummy::new(3);
            let mut log = PresentationLog::new();
            let outcome = CombatResolver::new()
                .apply_damage(Some(&mut dummy), 1, None, &mut log)
                .unwrap();

            assert_eq!(outcome.previous_hp, 3);
            assert_eq!(outcome.new_hp, 2);
            assert!(!outcome.defeated);
            assert_eq!(dummy.combatant.current_hp(), 2);
        }

        #[test]
        fn notice_carries_floating_text_anchor() {
            let mut dummy = Dummy::new(3);
            let mut log = PresentationLog::new();
            CombatResolver::new()
                .apply_damage(Some(&mut dummy), 2, Some(EntityId::new(1)), &mut log)
                .unwrap();

            let events = log.take_events();
            let PresentationEvent::Damage(notice) = events[0] else {
                panic!("expected damage notice, got {events:?}");
            };
            assert_eq!(notice.amount, 2);
            assert_eq!(notice.previous_hp, 3);
            assert_eq!(notice.new_hp, 1);
            assert_eq!(notice.world_position, Vec3::new(2.0, 1.5, -4.0));
        }

        #[test]
        fn overkill_defeats_exactly_once() {
            let mut dummy = Dummy::new(3);
            let mut log = PresentationLog::new();
            let resolver = CombatResolver::new();

            let first = resolver
                .apply_damage(Some(&mut dummy), 5, None, &mut log)
                .unwrap();
            assert_eq!(first.new_hp, 0);
            assert!(first.defeated);

            let second = resolver
                .apply_damage(Some(&mut dummy), 1, None, &mut log)
                .unwrap();
            assert!(!second.defeated);
            assert_eq!(dummy.combatant.current_hp(), 0);

            assert_eq!(log.defeat_count(dummy.id), 1);
            assert_eq!(dummy.destroyed, 1);
        }

        #[test]
        fn defeat_order_is_damage_defeated_removed() {
            let mut dummy = Dummy::new(1);
            let mut log = PresentationLog::new();
            CombatResolver::new()
                .apply_damage(Some(&mut dummy), 1, None, &mut log)
                .unwrap();

            let events = log.take_events();
            assert_eq!(events.len(), 3);
            assert!(matches!(events[0], PresentationEvent::Damage(_)));
            assert_eq!(events[1], PresentationEvent::Defeated(dummy.id));
            assert_eq!(events[2], PresentationEvent::Removed(dummy.id));
        }

        #[test]
        fn negative_damage_heals_up_to_max() {
            let mut dummy = Dummy::new(3);
            let mut log = PresentationLog::new();
            let resolver = CombatResolver::new();
            resolver
                .apply_damage(Some(&mut dummy), 2, None, &mut log)
                .unwrap();
            let outcome = resolver
                .apply_damage(Some(&mut dummy), -10, None, &mut log)
                .unwrap();
            assert_eq!(outcome.new_hp, 3);
        }

        #[test]
        fn extreme_amounts_do_not_overflow() {
            let mut dummy = Dummy::new(3);
            let mut log = PresentationLog::new();
            let resolver = CombatResolver::new();
            let healed = resolver
                .apply_damage(Some(&mut dummy), i32::MIN, None, &mut log)
                .unwrap();
            assert_eq!(healed.new_hp, 3);
            let killed = resolver
                .apply_damage(Some(&mut dummy), i32::MAX, None, &mut log)
                .unwrap();
            assert_eq!(killed.new_hp, 0);
            assert!(killed.defeated);
        }

        #[test]
        fn missing_target_is_an_error() {
            let mut log = PresentationLog::new();
            let result = CombatResolver::new().apply_damage(None, 1, None, &mut log);
            assert_eq!(result, Err(CombatError::MissingTarget));
            assert!(log.is_empty());
        }
    }

    mod player_damage_tests {
        use super::*;

        #[test]
        fn player_damage_only_notifies() {
            let dummy = Dummy::new(3);
            let mut log = PresentationLog::new();
            let notice = CombatResolver::new()
                .apply_damage_to_player(Some(&dummy), 4, None, &mut log)
                .unwrap();
            assert_eq!(notice.amount, 4);
            assert_eq!(log.len(), 1);
            assert_eq!(dummy.combatant.current_hp(), 3);
        }

        #[test]
        fn missing_player_is_an_error() {
            let mut log = PresentationLog::new();
            let result = CombatResolver::new().apply_damage_to_player(None, 1, None, &mut log);
            assert_eq!(result, Err(CombatError::MissingTarget));
        }
    }

    proptest! {
        #[test]
        fn hp_stays_within_bounds(
            max_hp in 1i32..100,
            hits in prop::collection::vec(any::<i32>(), 1..20),
        ) {
            let mut dummy = Dummy::new(max_hp);
            let mut log = PresentationLog::new();
            let resolver = CombatResolver::new();
            for amount in hits {
                let outcome = resolver
                    .apply_damage(Some(&mut dummy), amount, None, &mut log)
                    .unwrap();
                prop_assert!(outcome.new_hp >= 0);
                prop_assert!(outcome.new_hp <= max_hp);
            }
            prop_assert!(log.defeat_count(dummy.id) <= 1);
            prop_assert!(dummy.destroyed <= 1);
        }
    }
}
