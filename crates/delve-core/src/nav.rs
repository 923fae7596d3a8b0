//! Navigation collaborator.
//!
//! The core drives agents through the [`Navigation`] trait and never looks
//! at how paths are computed. [`GridNavigation`] is the concrete
//! implementation over the `delve-nav` tile surface.

use delve_nav::{AgentId, AgentParams, Crowd, NavSurface};
use glam::Vec3;

use crate::entity::EntityId;

/// Navigation capability consumed by enemy agents and map generation.
///
/// Queries about unknown entities answer conservatively: not on the surface,
/// no path, zero distance and velocity.
pub trait Navigation {
    /// Registers a steering agent for `entity` at `position`.
    ///
    /// Returns whether the agent starts on the navigable surface.
    fn add_agent(&mut self, entity: EntityId, position: Vec3, speed: f32, stopping_distance: f32)
        -> bool;

    /// Unregisters an agent.
    fn remove_agent(&mut self, entity: EntityId);

    /// True if `entity` has a registered agent.
    fn has_agent(&self, entity: EntityId) -> bool;

    /// Current position of an agent.
    fn position(&self, entity: EntityId) -> Option<Vec3>;

    /// True if the agent stands on the navigable surface.
    fn is_on_navigable_surface(&self, entity: EntityId) -> bool;

    /// Projects `position` onto the surface, if a point lies within `tolerance`.
    fn sample_nearest_navigable_point(&self, position: Vec3, tolerance: f32) -> Option<Vec3>;

    /// Requests a path. Returns `false` if the request was refused.
    fn set_destination(&mut self, entity: EntityId, position: Vec3) -> bool;

    /// True while a requested path is still being computed.
    fn is_path_pending(&self, entity: EntityId) -> bool;

    /// True while the agent follows a path.
    fn has_path(&self, entity: EntityId) -> bool;

    /// Horizontal distance left to the destination.
    fn remaining_distance(&self, entity: EntityId) -> f32;

    /// Distance at which the agent counts as arrived.
    fn stopping_distance(&self, entity: EntityId) -> f32;

    /// Velocity during the last step.
    fn current_velocity(&self, entity: EntityId) -> Vec3;

    /// Halts or resumes movement.
    fn set_stopped(&mut self, entity: EntityId, stopped: bool);

    /// Teleports the agent. Returns whether it landed on the surface.
    fn warp(&mut self, entity: EntityId, position: Vec3) -> bool;

    /// Replaces the navigable surface with the given floor tiles.
    fn rebuild_surface(&mut self, tile_size: f32, tile_centers: &[Vec3]);

    /// Advances every agent by `dt` seconds.
    fn step(&mut self, dt: f32);
}

fn agent_id(entity: EntityId) -> AgentId {
    AgentId::new(entity.as_u64())
}

/// [`Navigation`] over a square-tile surface with straight-line steering.
///
/// # Example
///
/// ```
/// use delve_core::entity::EntityId;
/// use delve_core::nav::{GridNavigation, Navigation};
/// use glam::Vec3;
///
/// let mut nav = GridNavigation::new();
/// nav.rebuild_surface(4.0, &[Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)]);
///
/// let id = EntityId::new(1);
/// assert!(nav.add_agent(id, Vec3::ZERO, 3.5, 0.5));
/// assert!(nav.set_destination(id, Vec3::new(4.0, 0.0, 0.0)));
/// assert!(nav.is_path_pending(id));
///
/// nav.step(0.1);
/// assert!(!nav.is_path_pending(id));
/// assert!(nav.has_path(id));
/// ```
#[derive(Debug, Clone)]
pub struct GridNavigation {
    surface: NavSurface,
    crowd: Crowd,
}

impl GridNavigation {
    /// Creates a navigation with an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self {
            surface: NavSurface::new(1.0),
            crowd: Crowd::new(),
        }
    }

    /// The current surface.
    #[must_use]
    pub fn surface(&self) -> &NavSurface {
        &self.surface
    }

    /// Number of registered agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.crowd.len()
    }
}

impl Default for GridNavigation {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigation for GridNavigation {
    fn add_agent(
        &mut self,
        entity: EntityId,
        position: Vec3,
        speed: f32,
        stopping_distance: f32,
    ) -> bool {
        let params = AgentParams {
            speed,
            stopping_distance,
        };
        self.crowd
            .add(agent_id(entity), position, params, &self.surface)
    }

    fn remove_agent(&mut self, entity: EntityId) {
        self.crowd.remove(agent_id(entity));
    }

    fn has_agent(&self, entity: EntityId) -> bool {
        self.crowd.get(agent_id(entity)).is_some()
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.crowd.get(agent_id(entity)).map(|a| a.position())
    }

    fn is_on_navigable_surface(&self, entity: EntityId) -> bool {
        self.crowd
            .get(agent_id(entity))
            .is_some_and(|a| a.is_on_surface())
    }

    fn sample_nearest_navigable_point(&self, position: Vec3, tolerance: f32) -> Option<Vec3> {
        self.surface.sample_nearest(position, tolerance)
    }

    fn set_destination(&mut self, entity: EntityId, position: Vec3) -> bool {
        self.crowd.set_destination(agent_id(entity), position)
    }

    fn is_path_pending(&self, entity: EntityId) -> bool {
        self.crowd
            .get(agent_id(entity))
            .is_some_and(|a| a.path_pending())
    }

    fn has_path(&self, entity: EntityId) -> bool {
        self.crowd.get(agent_id(entity)).is_some_and(|a| a.has_path())
    }

    fn remaining_distance(&self, entity: EntityId) -> f32 {
        self.crowd
            .get(agent_id(entity))
            .map_or(0.0, |a| a.remaining_distance())
    }

    fn stopping_distance(&self, entity: EntityId) -> f32 {
        self.crowd
            .get(agent_id(entity))
            .map_or(0.0, |a| a.params().stopping_distance)
    }

    fn current_velocity(&self, entity: EntityId) -> Vec3 {
        self.crowd
            .get(agent_id(entity))
            .map_or(Vec3::ZERO, |a| a.velocity())
    }

    fn set_stopped(&mut self, entity: EntityId, stopped: bool) {
        self.crowd.set_stopped(agent_id(entity), stopped);
    }

    fn warp(&mut self, entity: EntityId, position: Vec3) -> bool {
        self.crowd.warp(agent_id(entity), position, &self.surface)
    }

    fn rebuild_surface(&mut self, tile_size: f32, tile_centers: &[Vec3]) {
        self.surface = NavSurface::from_tiles(tile_size, tile_centers.iter().copied());
        self.crowd.refresh_surface(&self.surface);
        tracing::debug!(tiles = self.surface.len(), "navigable surface rebuilt");
    }

    fn step(&mut self, dt: f32) {
        self.crowd.step(dt, &self.surface);
    }
}
