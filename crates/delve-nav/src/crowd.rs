//! Collection of steering agents advanced together.
//!
//! # Path latency
//!
//! A destination request leaves the agent in the *pending* state until the
//! next [`Crowd::step`], mirroring asynchronous path computation. Movement
//! starts on the step after that.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::{AgentId, AgentParams, NavAgent};
use crate::surface::NavSurface;

/// Agents keyed by id, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Crowd {
    agents: BTreeMap<AgentId, NavAgent>,
}

impl Crowd {
    /// Creates an empty crowd.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an agent at `position`.
    ///
    /// Returns whether the agent starts on the surface.
    pub fn add(
        &mut self,
        id: AgentId,
        position: Vec3,
        params: AgentParams,
        surface: &NavSurface,
    ) -> bool {
        let on_surface = surface.contains(position);
        self.agents
            .insert(id, NavAgent::new(position, params, on_surface));
        on_surface
    }

    /// Removes an agent.
    pub fn remove(&mut self, id: AgentId) -> Option<NavAgent> {
        self.agents.remove(&id)
    }

    /// Removes every agent.
    pub fn clear(&mut self) {
        self.agents.clear();
    }

    /// Returns an agent by id.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&NavAgent> {
        self.agents.get(&id)
    }

    /// Returns the number of agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns true if the crowd is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Requests a path to `destination`.
    ///
    /// Fails (returns `false`) for unknown agents and agents that are not on
    /// the surface.
    pub fn set_destination(&mut self, id: AgentId, destination: Vec3) -> bool {
        match self.agents.get_mut(&id) {
            Some(agent) if agent.on_surface => {
                agent.destination = Some(destination);
                agent.path_pending = true;
                agent.has_path = false;
                true
            }
            _ => false,
        }
    }

    /// Teleports an agent, dropping any path.
    pub fn warp(&mut self, id: AgentId, position: Vec3, surface: &NavSurface) -> bool {
        let Some(agent) = self.agents.get_mut(&id) else {
            return false;
        };
        agent.position = position;
        agent.destination = None;
        agent.path_pending = false;
        agent.has_path = false;
        agent.velocity = Vec3::ZERO;
        agent.on_surface = surface.contains(position);
        agent.on_surface
    }

    /// Halts or resumes movement.
    pub fn set_stopped(&mut self, id: AgentId, stopped: bool) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.stopped = stopped;
        }
    }

    /// Re-evaluates every agent against a rebuilt surface.
    pub fn refresh_surface(&mut self, surface: &NavSurface) {
        for agent in self.agents.values_mut() {
            agent.on_surface = surface.contains(agent.position);
            if !agent.on_surface {
                agent.path_pending = false;
                agent.has_path = false;
                agent.velocity = Vec3::ZERO;
            }
        }
    }

    /// Advances all agents by `dt` seconds.
    pub fn step(&mut self, dt: f32, surface: &NavSurface) {
        for (id, agent) in &mut self.agents {
            agent.velocity = Vec3::ZERO;
            if !agent.on_surface {
                continue;
            }

            if agent.path_pending {
                agent.path_pending = false;
                agent.has_path = agent.destination.is_some();
                continue;
            }

            if !agent.has_path || agent.stopped {
                continue;
            }
            let Some(destination) = agent.destination else {
                agent.has_path = false;
                continue;
            };

            let mut offset = destination - agent.position;
            offset.y = 0.0;
            let distance = offset.length();
            let stopping = agent.params.stopping_distance;
            if distance <= stopping {
                agent.has_path = false;
                continue;
            }

            let travel = (agent.params.speed * dt).min(distance);
            let direction = offset / distance;
            let next = agent.position + direction * travel;
            if !surface.contains(next) {
                // Ends like a partial path: the agent counts as arrived where it stands.
                debug!(agent = ?id, "steering blocked at surface edge");
                agent.has_path = false;
                agent.destination = Some(agent.position);
                continue;
            }

            agent.position = next;
            if distance - travel <= stopping {
                agent.has_path = false;
            } else {
                agent.velocity = direction * agent.params.speed;
            }
        }
    }
}
