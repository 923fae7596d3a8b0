//! Subcommands.

pub mod inspect;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use delve_core::MapRegistry;

/// Output format for command reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Loads every map file in `dir`.
pub fn load_maps(dir: &Path) -> Result<MapRegistry> {
    let registry = MapRegistry::load_dir(dir)
        .with_context(|| format!("failed to load maps from {}", dir.display()))?;
    if registry.is_empty() {
        anyhow::bail!("no maps found in {}", dir.display());
    }
    Ok(registry)
}
