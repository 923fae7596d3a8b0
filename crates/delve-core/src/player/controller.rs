//! The player's Free / Aiming state machine.
//!
//! # Modes
//!
//! - **Free**: camera-relative movement; the charge gauge fills. A fire
//!   press while the gauge is full enters Aiming and locks onto the nearest
//!   target.
//! - **Aiming**: facing turns toward the target. Cancel leaves without
//!   firing. Fire checks range at that moment, reports the shot, and leaves
//!   after the post-fire delay; inputs are ignored while the delay runs.
//!
//! Leaving Aiming always empties the gauge and clears the target. Gravity
//! applies in both modes.

use glam::Vec3;
use tracing::debug;

use super::gauge::ChargeGauge;
use super::input::InputFrame;
use super::motor::{bearing, lerp_angle, smooth_damp_angle, yaw_direction, VerticalMotion};
use super::{PlayerEvent, TargetLookup};
use crate::combat::Targetable;
use crate::config::PlayerConfig;
use crate::entity::{EntityId, Transform};
use crate::timer::Countdown;

/// Move inputs shorter than this are ignored.
const MOVE_DEADZONE: f32 = 0.1;

/// Macro-state of the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombatMode {
    /// Moving and charging.
    Free,
    /// Locked on, waiting for fire or cancel.
    Aiming {
        /// Acquired target, if any.
        target: Option<EntityId>,
        /// Post-fire delay, once a shot has been fired.
        exit: Option<Countdown>,
    },
}

/// Movement, charge gauge and aiming for the player character.
///
/// # Example
///
/// ```
/// use delve_core::config::PlayerConfig;
/// use delve_core::entity::EntityId;
/// use delve_core::player::{InputFrame, PlayerCombatController, PlayerEvent, TargetLookup};
/// use glam::Vec3;
///
/// struct NoTargets;
///
/// impl TargetLookup for NoTargets {
///     fn nearest_target(&self, _: Vec3) -> Option<(EntityId, Vec3)> { None }
///     fn target_position(&self, _: EntityId) -> Option<Vec3> { None }
/// }
///
/// let config = PlayerConfig { charge_time: 1.0, ..PlayerConfig::default() };
/// let mut player = PlayerCombatController::new(EntityId::new(0), Vec3::ZERO, config);
///
/// for _ in 0..10 {
///     player.update(&InputFrame::idle(), 0.1, &NoTargets);
/// }
/// assert!(player.charge_ratio() >= 1.0);
///
/// let events = player.update(&InputFrame::fire(), 0.1, &NoTargets);
/// assert_eq!(events, vec![PlayerEvent::AimStarted { target: None }]);
/// assert!(player.is_aiming());
/// ```
#[derive(Debug, Clone)]
pub struct PlayerCombatController {
    id: EntityId,
    config: PlayerConfig,
    transform: Transform,
    vertical: VerticalMotion,
    yaw_velocity: f32,
    gauge: ChargeGauge,
    mode: CombatMode,
    torn_down: bool,
}

impl PlayerCombatController {
    /// Creates a controller in Free mode at `position`.
    #[must_use]
    pub fn new(id: EntityId, position: Vec3, config: PlayerConfig) -> Self {
        Self {
            id,
            gauge: ChargeGauge::new(config.charge_time),
            config,
            transform: Transform::at(position),
            vertical: VerticalMotion::new(),
            yaw_velocity: 0.0,
            mode: CombatMode::Free,
            torn_down: false,
        }
    }

    /// The player's entity id. Stable for the controller's lifetime.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Current placement.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Current facing in degrees.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.transform.yaw
    }

    /// Current macro-state.
    #[must_use]
    pub const fn mode(&self) -> &CombatMode {
        &self.mode
    }

    /// True while in aim mode.
    #[must_use]
    pub const fn is_aiming(&self) -> bool {
        matches!(self.mode, CombatMode::Aiming { .. })
    }

    /// The locked target while aiming.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        match self.mode {
            CombatMode::Aiming { target, .. } => target,
            CombatMode::Free => None,
        }
    }

    /// Charge gauge fill ratio for the HUD.
    #[must_use]
    pub fn charge_ratio(&self) -> f32 {
        self.gauge.ratio()
    }

    /// The charge gauge.
    #[must_use]
    pub const fn gauge(&self) -> &ChargeGauge {
        &self.gauge
    }

    /// True once [`PlayerCombatController::teardown`] has run.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Places the player at `position`, keeping mode and gauge.
    pub fn teleport(&mut self, position: Vec3) {
        self.transform.position = position;
        self.vertical.reset();
    }

    /// Drops `id` as the locked target. The shot and exit still play out.
    pub fn forget_target(&mut self, id: EntityId) {
        if let CombatMode::Aiming { target, .. } = &mut self.mode {
            if *target == Some(id) {
                *target = None;
            }
        }
    }

    /// Stops the controller and cancels any pending aim exit.
    pub fn teardown(&mut self) {
        if let CombatMode::Aiming {
            exit: Some(countdown),
            ..
        } = &mut self.mode
        {
            countdown.cancel();
        }
        self.torn_down = true;
    }

    /// Advances one tick.
    pub fn update(
        &mut self,
        input: &InputFrame,
        dt: f32,
        targets: &dyn TargetLookup,
    ) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        if self.torn_down {
            return events;
        }

        match self.mode {
            CombatMode::Free => self.update_free(input, dt, targets, &mut events),
            CombatMode::Aiming { .. } => self.update_aiming(input, dt, targets, &mut events),
        }

        self.vertical.apply(
            &mut self.transform.position,
            self.config.gravity,
            self.config.grounded_velocity,
            dt,
        );
        events
    }

    fn update_free(
        &mut self,
        input: &InputFrame,
        dt: f32,
        targets: &dyn TargetLookup,
        events: &mut Vec<PlayerEvent>,
    ) {
        self.apply_movement(input, dt);
        self.gauge.charge(dt);

        if input.fire && self.gauge.is_ready() {
            let target = targets
                .nearest_target(self.transform.position)
                .map(|(id, _)| id);
            debug!(target = ?target, "entering aim mode");
            self.mode = CombatMode::Aiming { target, exit: None };
            events.push(PlayerEvent::AimStarted { target });
        }
    }

    fn update_aiming(
        &mut self,
        input: &InputFrame,
        dt: f32,
        targets: &dyn TargetLookup,
        events: &mut Vec<PlayerEvent>,
    ) {
        let CombatMode::Aiming { target, exit } = self.mode else {
            return;
        };

        if let Some(mut countdown) = exit {
            if countdown.advance(dt) {
                self.exit_aiming();
                events.push(PlayerEvent::AimEnded);
            } else {
                self.mode = CombatMode::Aiming {
                    target,
                    exit: Some(countdown),
                };
            }
            return;
        }

        if input.cancel {
            self.exit_aiming();
            events.push(PlayerEvent::AimCancelled);
            return;
        }

        let target_position = target.and_then(|id| targets.target_position(id));
        if let Some(aim_point) = target_position {
            let t = 1.0 - (-self.config.aim_turn_rate * dt).exp();
            let heading = bearing(self.transform.position, aim_point);
            self.transform.yaw = lerp_angle(self.transform.yaw, heading, t);
        }

        if input.fire {
            let hit = target_position
                .is_some_and(|p| self.transform.position.distance(p) <= self.config.attack_range);
            debug!(target = ?target, hit, "shot fired");
            events.push(PlayerEvent::Fired { target, hit });
            self.mode = CombatMode::Aiming {
                target,
                exit: Some(Countdown::new(self.config.post_fire_delay)),
            };
        }
    }

    fn exit_aiming(&mut self) {
        self.mode = CombatMode::Free;
        self.gauge.reset();
    }

    fn apply_movement(&mut self, input: &InputFrame, dt: f32) {
        if input.move_axis.length() < MOVE_DEADZONE {
            return;
        }
        let direction = input.move_axis.normalize();
        let target_yaw = direction.x.atan2(direction.y).to_degrees() + input.camera_yaw;

        self.transform.yaw = smooth_damp_angle(
            self.transform.yaw,
            target_yaw,
            &mut self.yaw_velocity,
            1.0 / self.config.rotation_speed,
            dt,
        );

        let speed = if input.modifier {
            self.config.walk_speed
        } else {
            self.config.run_speed
        };
        self.transform.position += yaw_direction(target_yaw) * speed * dt;
    }
}

impl Targetable for PlayerCombatController {
    fn target_id(&self) -> EntityId {
        self.id
    }

    fn world_position(&self) -> Vec3 {
        self.transform.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::collections::BTreeMap;

    /// Fixed set of targets for driving the controller.
    #[derive(Default)]
    struct Targets(BTreeMap<EntityId, Vec3>);

    impl Targets {
        fn with(targets: &[(u64, Vec3)]) -> Self {
            Self(
                targets
                    .iter()
                    .map(|(id, p)| (EntityId::new(*id), *p))
                    .collect(),
            )
        }
    }

    impl TargetLookup for Targets {
        fn nearest_target(&self, from: Vec3) -> Option<(EntityId, Vec3)> {
            let mut best: Option<(f32, EntityId, Vec3)> = None;
            for (id, p) in &self.0 {
                let d = from.distance(*p);
                if best.map_or(true, |(bd, _, _)| d < bd) {
                    best = Some((d, *id, *p));
                }
            }
            best.map(|(_, id, p)| (id, p))
        }

        fn target_position(&self, id: EntityId) -> Option<Vec3> {
            self.0.get(&id).copied()
        }
    }

    fn config() -> PlayerConfig {
        PlayerConfig {
            charge_time: 1.0,
            ..PlayerConfig::default()
        }
    }

    fn charged(targets: &Targets) -> PlayerCombatController {
        let mut player = PlayerCombatController::new(EntityId::new(0), Vec3::ZERO, config());
        for _ in 0..11 {
            player.update(&InputFrame::idle(), 0.1, targets);
        }
        assert!(player.gauge().is_ready());
        player
    }

    mod gauge_tests {
        use super::*;

        #[test]
        fn fire_before_ready_does_nothing() {
            let targets = Targets::default();
            let mut player = PlayerCombatController::new(EntityId::new(0), Vec3::ZERO, config());
            let events = player.update(&InputFrame::fire(), 0.1, &targets);
            assert!(events.is_empty());
            assert!(!player.is_aiming());
        }

        #[test]
        fn ratio_monotone_in_free_and_zero_after_exit() {
            let targets = Targets::with(&[(1, Vec3::new(3.0, 0.0, 0.0))]);
            let mut player = PlayerCombatController::new(EntityId::new(0), Vec3::ZERO, config());
            let mut last = 0.0;
            for _ in 0..15 {
                player.update(&InputFrame::moving(Vec2::Y), 0.1, &targets);
                assert!(player.charge_ratio() >= last);
                last = player.charge_ratio();
            }
            player.update(&InputFrame::fire(), 0.1, &targets);
            player.update(&InputFrame::cancel(), 0.1, &targets);
            assert_eq!(player.charge_ratio(), 0.0);
        }

        #[test]
        fn gauge_does_not_charge_while_aiming() {
            let targets = Targets::default();
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            let before = player.gauge().charge_value();
            player.update(&InputFrame::idle(), 0.1, &targets);
            assert_eq!(player.gauge().charge_value(), before);
        }
    }

    mod aiming_tests {
        use super::*;

        #[test]
        fn aim_locks_nearest_target() {
            let targets = Targets::with(&[
                (1, Vec3::new(8.0, 0.0, 0.0)),
                (2, Vec3::new(0.0, 0.0, 3.0)),
            ]);
            let mut player = charged(&targets);
            let events = player.update(&InputFrame::fire(), 0.1, &targets);
            assert_eq!(
                events,
                vec![PlayerEvent::AimStarted {
                    target: Some(EntityId::new(2))
                }]
            );
            assert_eq!(player.target(), Some(EntityId::new(2)));
        }

        #[test]
        fn aiming_turns_toward_target() {
            let targets = Targets::with(&[(1, Vec3::new(5.0, 0.0, 0.0))]);
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            for _ in 0..60 {
                player.update(&InputFrame::idle(), 0.05, &targets);
            }
            assert!((player.yaw() - 90.0).abs() < 1.0, "yaw {}", player.yaw());
        }

        #[test]
        fn cancel_exits_without_firing() {
            let targets = Targets::with(&[(1, Vec3::new(5.0, 0.0, 0.0))]);
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            let events = player.update(&InputFrame::cancel(), 0.1, &targets);
            assert_eq!(events, vec![PlayerEvent::AimCancelled]);
            assert!(!player.is_aiming());
            assert_eq!(player.target(), None);
        }

        #[test]
        fn in_range_shot_hits_then_exits_after_delay() {
            let targets = Targets::with(&[(1, Vec3::new(5.0, 0.0, 0.0))]);
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            let events = player.update(&InputFrame::fire(), 0.1, &targets);
            assert_eq!(
                events,
                vec![PlayerEvent::Fired {
                    target: Some(EntityId::new(1)),
                    hit: true
                }]
            );

            // Inputs are ignored during the delay.
            let during = player.update(&InputFrame::cancel(), 0.2, &targets);
            assert!(during.is_empty());
            assert!(player.is_aiming());

            let mut ended = false;
            for _ in 0..5 {
                if player.update(&InputFrame::idle(), 0.1, &targets) == vec![PlayerEvent::AimEnded] {
                    ended = true;
                    break;
                }
            }
            assert!(ended);
            assert_eq!(player.charge_ratio(), 0.0);
        }

        #[test]
        fn out_of_range_shot_misses_but_still_exits() {
            let targets = Targets::with(&[(1, Vec3::new(11.0, 0.0, 0.0))]);
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            let events = player.update(&InputFrame::fire(), 0.1, &targets);
            assert_eq!(
                events,
                vec![PlayerEvent::Fired {
                    target: Some(EntityId::new(1)),
                    hit: false
                }]
            );

            let mut elapsed = 0.0;
            while player.is_aiming() && elapsed < 2.0 {
                player.update(&InputFrame::idle(), 0.05, &targets);
                elapsed += 0.05;
            }
            assert!(!player.is_aiming());
            assert!(elapsed >= 0.45 && elapsed <= 0.6, "exited after {elapsed}s");
        }

        #[test]
        fn range_is_checked_at_fire_time() {
            let mut targets = Targets::with(&[(1, Vec3::new(5.0, 0.0, 0.0))]);
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            targets.0.insert(EntityId::new(1), Vec3::new(30.0, 0.0, 0.0));
            let events = player.update(&InputFrame::fire(), 0.1, &targets);
            assert!(matches!(events[..], [PlayerEvent::Fired { hit: false, .. }]));
        }

        #[test]
        fn aiming_without_targets_keeps_facing() {
            let targets = Targets::default();
            let mut player = charged(&targets);
            let yaw = player.yaw();
            player.update(&InputFrame::fire(), 0.1, &targets);
            player.update(&InputFrame::idle(), 0.1, &targets);
            assert_eq!(player.yaw(), yaw);
            let events = player.update(&InputFrame::fire(), 0.1, &targets);
            assert_eq!(events, vec![PlayerEvent::Fired { target: None, hit: false }]);
        }

        #[test]
        fn forgotten_target_still_exits() {
            let targets = Targets::with(&[(1, Vec3::new(5.0, 0.0, 0.0))]);
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            player.forget_target(EntityId::new(1));
            assert_eq!(player.target(), None);
            for _ in 0..10 {
                player.update(&InputFrame::idle(), 0.1, &targets);
            }
            assert!(!player.is_aiming());
        }

        #[test]
        fn teardown_cancels_pending_exit() {
            let targets = Targets::with(&[(1, Vec3::new(5.0, 0.0, 0.0))]);
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            player.teardown();
            for _ in 0..10 {
                assert!(player.update(&InputFrame::idle(), 0.1, &targets).is_empty());
            }
            assert!(player.is_aiming());
            assert!(matches!(
                player.mode(),
                CombatMode::Aiming { exit: Some(c), .. } if c.is_cancelled()
            ));
        }
    }

    mod movement_tests {
        use super::*;

        #[test]
        fn small_input_is_ignored() {
            let targets = Targets::default();
            let mut player = PlayerCombatController::new(EntityId::new(0), Vec3::ZERO, config());
            player.update(&InputFrame::moving(Vec2::new(0.05, 0.05)), 0.1, &targets);
            assert_eq!(player.position().x, 0.0);
            assert_eq!(player.position().z, 0.0);
        }

        #[test]
        fn run_and_walk_speeds() {
            let targets = Targets::default();
            let mut runner = PlayerCombatController::new(EntityId::new(0), Vec3::ZERO, config());
            runner.update(&InputFrame::moving(Vec2::Y), 1.0, &targets);
            assert!((runner.position().z - 5.0).abs() < 1e-4);

            let mut walker = PlayerCombatController::new(EntityId::new(0), Vec3::ZERO, config());
            let walk = InputFrame {
                modifier: true,
                ..InputFrame::moving(Vec2::Y)
            };
            walker.update(&walk, 1.0, &targets);
            assert!((walker.position().z - 2.0).abs() < 1e-4);
        }

        #[test]
        fn movement_is_camera_relative() {
            let targets = Targets::default();
            let mut player = PlayerCombatController::new(EntityId::new(0), Vec3::ZERO, config());
            let input = InputFrame {
                camera_yaw: 90.0,
                ..InputFrame::moving(Vec2::Y)
            };
            player.update(&input, 0.5, &targets);
            assert!((player.position().x - 2.5).abs() < 1e-4);
            assert!(player.position().z.abs() < 1e-4);
        }

        #[test]
        fn no_movement_while_aiming() {
            let targets = Targets::default();
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            let before = player.position();
            player.update(&InputFrame::moving(Vec2::X), 0.5, &targets);
            assert_eq!(player.position().x, before.x);
            assert_eq!(player.position().z, before.z);
        }

        #[test]
        fn gravity_applies_while_aiming() {
            let targets = Targets::default();
            let mut player = charged(&targets);
            player.update(&InputFrame::fire(), 0.1, &targets);
            player.teleport(Vec3::new(0.0, 2.0, 0.0));
            player.update(&InputFrame::idle(), 0.1, &targets);
            assert!(player.position().y < 2.0);
        }
    }
}
