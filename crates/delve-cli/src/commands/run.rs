//! `delve run`: drive a game headlessly from a script.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use delve_core::{Game, GameConfig, GameEvent, PlayerEvent};
use glam::Vec3;
use serde::Serialize;
use tracing::{debug, info};

use super::{load_maps, OutputFormat};
use crate::script::Script;

/// Ticks run when neither `--ticks` nor a script is given.
const DEFAULT_TICKS: usize = 600;

#[derive(Parser)]
pub struct Run {
    /// Directory of map JSON files
    #[arg(short, long, value_name = "DIR")]
    maps: PathBuf,

    /// Map id to start on
    #[arg(short, long, value_name = "MAP_ID")]
    start: String,

    /// Spawn index to start at
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    spawn: u32,

    /// Game config JSON; defaults apply to missing keys
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Input script; idle input once it runs out
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Ticks to run [default: script length, or 600]
    #[arg(short, long, value_name = "N")]
    ticks: Option<usize>,

    /// Seconds per tick
    #[arg(long, value_name = "SECONDS", default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Overrides the config seed
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// What happened over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub map_id: Option<String>,
    pub player_position: Vec3,
    pub charge_ratio: f32,
    pub enemies_remaining: usize,
    pub shots_fired: usize,
    pub hits: usize,
    pub damage_dealt: i32,
    pub defeats: usize,
    pub enemies_removed: usize,
    pub portals_entered: usize,
    pub maps_loaded: usize,
    pub missing_maps: Vec<String>,
    pub failed_loads: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Player(PlayerEvent::Fired { hit, .. }) => {
                self.shots_fired += 1;
                self.hits += usize::from(*hit);
            }
            GameEvent::Player(_) | GameEvent::ShotFailed(_) => {}
            GameEvent::Damage(outcome) => {
                self.damage_dealt += outcome.previous_hp - outcome.new_hp;
                self.defeats += usize::from(outcome.defeated);
            }
            GameEvent::PortalEntered(_) => self.portals_entered += 1,
            GameEvent::MapLoaded(_) => self.maps_loaded += 1,
            GameEvent::MapMissing(id) => self.missing_maps.push(id.clone()),
            GameEvent::MapLoadFailed { map_id, reason } => {
                self.failed_loads.push(format!("{map_id}: {reason}"));
            }
            GameEvent::EnemyRemoved(_) => self.enemies_removed += 1,
        }
    }

    fn render_text(&self) -> String {
        let p = self.player_position;
        let mut out = format!(
            "ticks: {}\nmap: {}\nplayer: ({:.2}, {:.2}, {:.2})\ncharge: {:.0}%\nenemies remaining: {}\nshots: {} ({} hit, {} damage)\ndefeats: {}\nremoved: {}\nportals: {} entered, {} maps loaded",
            self.ticks,
            self.map_id.as_deref().unwrap_or("-"),
            p.x,
            p.y,
            p.z,
            self.charge_ratio * 100.0,
            self.enemies_remaining,
            self.shots_fired,
            self.hits,
            self.damage_dealt,
            self.defeats,
            self.enemies_removed,
            self.portals_entered,
            self.maps_loaded,
        );
        if !self.missing_maps.is_empty() {
            out.push_str(&format!("\nmissing maps: {}", self.missing_maps.join(", ")));
        }
        for failure in &self.failed_loads {
            out.push_str(&format!("\nload failed: {failure}"));
        }
        out
    }
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let summary = self.simulate()?;
        match self.format {
            OutputFormat::Text => println!("{}", summary.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        }
        Ok(())
    }

    fn load_config(path: Option<&Path>) -> Result<GameConfig> {
        match path {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            None => Ok(GameConfig::default()),
        }
    }

    /// Builds the game and steps it, returning the summary.
    pub fn simulate(&self) -> Result<RunSummary> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            anyhow::bail!("--dt must be a positive number of seconds, got {}", self.dt);
        }

        let mut config = Self::load_config(self.config.as_deref())?;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        let script = match &self.script {
            Some(path) => Script::load(path)?,
            None => Script::default(),
        };
        let ticks = self.ticks.unwrap_or(if script.is_empty() {
            DEFAULT_TICKS
        } else {
            script.len()
        });

        let registry = load_maps(&self.maps)?;
        info!(maps = registry.len(), seed = config.seed, ticks, "starting run");

        let mut game = Game::new(config, registry);
        let report = game
            .load_map(&self.start, self.spawn)
            .with_context(|| format!("cannot start on map '{}'", self.start))?;
        debug!(?report, "start map placed");
        game.take_events();

        let mut summary = RunSummary::default();
        for tick in 0..ticks {
            game.step(&script.frame(tick), self.dt);
            for event in game.take_events() {
                debug!(tick, ?event, "event");
                summary.record(&event);
            }
        }

        summary.ticks = game.tick();
        summary.map_id = game.current_map_id().map(str::to_string);
        summary.player_position = game.player().position();
        summary.charge_ratio = game.charge_ratio();
        summary.enemies_remaining = game.roster().len();
        game.shutdown();

        info!(
            ticks = summary.ticks,
            shots = summary.shots_fired,
            defeats = summary.defeats,
            "run finished"
        );
        Ok(summary)
    }
}
