//! `delve inspect`: print the blueprint a map generates.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use delve_core::map::{Blueprint, TileMapGenerator};
use delve_core::EntityTag;
use serde::Serialize;

use super::{load_maps, OutputFormat};

#[derive(Parser)]
pub struct Inspect {
    /// Directory of map JSON files
    #[arg(short, long, value_name = "DIR")]
    maps: PathBuf,

    /// Map id to generate
    #[arg(long, value_name = "MAP_ID")]
    map: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Counts derived from a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintSummary {
    pub map_id: String,
    pub tile_size: f32,
    pub floors: usize,
    pub walls: usize,
    pub doors: usize,
    pub portals: usize,
    pub spawn_indices: Vec<u32>,
    pub enemy_spawns: usize,
}

impl BlueprintSummary {
    pub fn from_blueprint(blueprint: &Blueprint) -> Self {
        Self {
            map_id: blueprint.map_id.clone(),
            tile_size: blueprint.tile_size,
            floors: blueprint.count(EntityTag::Floor),
            walls: blueprint.count(EntityTag::Wall),
            doors: blueprint.count(EntityTag::Door),
            portals: blueprint.count(EntityTag::Portal),
            spawn_indices: blueprint.spawn_points.keys().copied().collect(),
            enemy_spawns: blueprint.enemy_spawns.len(),
        }
    }

    fn render_text(&self) -> String {
        let spawns: Vec<String> = self.spawn_indices.iter().map(u32::to_string).collect();
        format!(
            "map {} (tile size {})\n  floors: {}\n  walls: {}\n  doors: {}\n  portals: {}\n  spawn indices: [{}]\n  enemy spawns: {}",
            self.map_id,
            self.tile_size,
            self.floors,
            self.walls,
            self.doors,
            self.portals,
            spawns.join(", "),
            self.enemy_spawns,
        )
    }
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let registry = load_maps(&self.maps)?;
        let map = registry
            .get(&self.map)
            .with_context(|| format!("map '{}' not found in {}", self.map, self.maps.display()))?;

        let blueprint = TileMapGenerator::default().generate(map);
        let summary = BlueprintSummary::from_blueprint(&blueprint);

        match self.format {
            OutputFormat::Text => println!("{}", summary.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        }
        Ok(())
    }
}
