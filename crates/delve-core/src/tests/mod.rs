//! Crate-level tests that drive the whole game loop.
//!
//! # Test Structure
//!
//! - `determinism.rs`: same seed, maps and inputs give the same run
//! - `integration.rs`: end-to-end combat, map loading and portal scenarios
//! - `helpers.rs`: map fixtures and game drivers

mod helpers;

pub use helpers::*;
