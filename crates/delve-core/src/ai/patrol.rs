//! Patrol behavior: wander around a home point, pause, repeat.
//!
//! # Destination Selection
//!
//! Up to `attempts` candidates are drawn uniformly from the axis-aligned
//! square of half-width `radius` around home (a square, not a disk), each
//! projected onto the navigable surface. Candidates closer than
//! `min_distance` to the agent are rejected. If every attempt fails the
//! agent heads back toward home; if home is not navigable either, no
//! destination is set this cycle.

use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::debug;

use super::AgentContext;
use crate::config::PatrolConfig;
use crate::fsm::State;

/// Slack added to the stopping distance when checking arrival.
const ARRIVAL_SLACK: f32 = 0.1;

/// Squared speed below which the agent counts as standing still.
const REST_SPEED_SQ: f32 = 0.01;

/// Tuning for a [`PatrolState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolSettings {
    /// Half-width of the sampling square around home.
    pub radius: f32,
    /// Minimum distance between the agent and a new destination.
    pub min_distance: f32,
    /// Pause after arrival, drawn from `[x, y]`.
    pub wait_range: Vec2,
    /// Sampling attempts per selection.
    pub attempts: u32,
    /// Projection tolerance onto the surface.
    pub sample_tolerance: f32,
}

impl Default for PatrolSettings {
    fn default() -> Self {
        Self::from(&PatrolConfig::default())
    }
}

impl From<&PatrolConfig> for PatrolSettings {
    fn from(config: &PatrolConfig) -> Self {
        Self {
            radius: config.radius,
            min_distance: config.min_distance,
            wait_range: config.wait_range,
            attempts: config.attempts,
            sample_tolerance: config.sample_tolerance,
        }
    }
}

/// Wander state for enemies.
///
/// `home` is fixed at creation. The wait timer survives exit, so the state
/// can be parked and re-entered.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolState {
    home: Vec3,
    settings: PatrolSettings,
    wait_timer: f32,
    wait_duration: f32,
}

impl PatrolState {
    /// Creates a patrol around `home`.
    #[must_use]
    pub fn new(home: Vec3, settings: PatrolSettings) -> Self {
        Self {
            home,
            settings,
            wait_timer: 0.0,
            wait_duration: 0.0,
        }
    }

    /// The fixed home point.
    #[must_use]
    pub fn home(&self) -> Vec3 {
        self.home
    }

    /// Seconds left in the current pause, or `<= 0` when not pausing.
    #[must_use]
    pub fn wait_timer(&self) -> f32 {
        self.wait_timer
    }

    /// Length of the most recent pause.
    #[must_use]
    pub fn wait_duration(&self) -> f32 {
        self.wait_duration
    }

    fn has_arrived(ctx: &AgentContext<'_>) -> bool {
        let entity = ctx.entity;
        !ctx.nav.has_path(entity)
            && ctx.nav.remaining_distance(entity)
                <= ctx.nav.stopping_distance(entity) + ARRIVAL_SLACK
            && ctx.nav.current_velocity(entity).length_squared() < REST_SPEED_SQ
    }

    fn draw_wait(&self, ctx: &mut AgentContext<'_>) -> f32 {
        let lo = self.settings.wait_range.x.min(self.settings.wait_range.y);
        let hi = self.settings.wait_range.x.max(self.settings.wait_range.y);
        ctx.rng.gen_range(lo..=hi)
    }

    fn pick_next_destination(&mut self, ctx: &mut AgentContext<'_>) {
        let entity = ctx.entity;
        if !ctx.nav.is_on_navigable_surface(entity) {
            return;
        }
        self.wait_timer = 0.0;

        let Some(current) = ctx.nav.position(entity) else {
            return;
        };
        let radius = self.settings.radius.abs();
        let tolerance = self.settings.sample_tolerance;

        for _ in 0..self.settings.attempts {
            let candidate = self.home
                + Vec3::new(
                    ctx.rng.gen_range(-radius..=radius),
                    0.0,
                    ctx.rng.gen_range(-radius..=radius),
                );
            let Some(hit) = ctx.nav.sample_nearest_navigable_point(candidate, tolerance) else {
                continue;
            };
            if current.distance(hit) < self.settings.min_distance {
                continue;
            }
            ctx.nav.set_destination(entity, hit);
            return;
        }

        if let Some(home) = ctx.nav.sample_nearest_navigable_point(self.home, tolerance) {
            debug!(%entity, "no patrol candidate accepted, heading home");
            ctx.nav.set_destination(entity, home);
        } else {
            debug!(%entity, "home is not navigable, no destination this cycle");
        }
    }
}

impl<'a> State<AgentContext<'a>> for PatrolState {
    fn name(&self) -> &'static str {
        "patrol"
    }

    fn enter(&mut self, ctx: &mut AgentContext<'a>) {
        let entity = ctx.entity;
        if !ctx.nav.is_on_navigable_surface(entity) {
            let snapped = ctx.nav.position(entity).and_then(|p| {
                ctx.nav
                    .sample_nearest_navigable_point(p, self.settings.sample_tolerance)
            });
            match snapped {
                Some(point) => {
                    ctx.nav.warp(entity, point);
                }
                None => {
                    debug!(%entity, "patrol entered off the surface, agent stopped");
                    ctx.nav.set_stopped(entity, true);
                    return;
                }
            }
        }

        ctx.nav.set_stopped(entity, false);
        self.pick_next_destination(ctx);
    }

    fn tick(&mut self, ctx: &mut AgentContext<'a>) {
        if ctx.nav.is_path_pending(ctx.entity) {
            return;
        }
        if !Self::has_arrived(ctx) {
            return;
        }

        if self.wait_timer <= 0.0 {
            self.wait_duration = self.draw_wait(ctx);
            self.wait_timer = self.wait_duration;
        }

        self.wait_timer -= ctx.delta_seconds;
        if self.wait_timer <= 0.0 {
            self.pick_next_destination(ctx);
        }
    }
}
