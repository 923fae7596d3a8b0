//! # Delve Nav
//!
//! Navigable-surface substrate for delve's enemy agents.
//!
//! The surface is a sparse set of square floor tiles lying on the `y = 0` plane.
//! Agents live in a [`Crowd`] and steer in straight lines toward their
//! destination, stopping when they reach their stopping distance or when the
//! next step would leave the surface.
//!
//! ## Quick Start
//!
//! ```
//! use delve_nav::{AgentId, AgentParams, Crowd, NavSurface};
//! use glam::Vec3;
//!
//! let mut surface = NavSurface::new(4.0);
//! for col in 0..4 {
//!     surface.insert_tile(Vec3::new(col as f32 * 4.0, 0.0, 0.0));
//! }
//!
//! let mut crowd = Crowd::new();
//! let id = AgentId::new(7);
//! crowd.add(id, Vec3::ZERO, AgentParams::default(), &surface);
//! assert!(crowd.set_destination(id, Vec3::new(12.0, 0.0, 0.0)));
//!
//! // First step resolves the path, later steps move the agent.
//! for _ in 0..200 {
//!     crowd.step(0.05, &surface);
//! }
//! let agent = crowd.get(id).unwrap();
//! assert!(!agent.has_path());
//! assert!(agent.position().distance(Vec3::new(12.0, 0.0, 0.0)) <= 0.5 + 1e-3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod crowd;
pub mod surface;

pub use agent::{AgentId, AgentParams, NavAgent};
pub use crowd::Crowd;
pub use surface::{CellCoord, NavSurface};

/// Vertical distance from the surface plane within which a point still
/// counts as standing on it.
pub const VERTICAL_TOLERANCE: f32 = 0.5;
