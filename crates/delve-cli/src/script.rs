//! Scripted input files.
//!
//! A script is a JSON array of input frames. Each entry may carry a
//! `repeat` count (default 1, at most [`MAX_REPEAT`]) and is held that many
//! ticks in a row. `fire` and `cancel` are presses, so they only land on the
//! first tick of a repeated entry:
//!
//! ```json
//! [
//!   { "moveAxis": [0.0, 1.0], "repeat": 30 },
//!   { "fire": true },
//!   { "repeat": 10 }
//! ]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use delve_core::InputFrame;
use serde::Deserialize;

/// Largest accepted `repeat` count.
pub const MAX_REPEAT: u32 = 100_000;

/// One script entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptStep {
    /// Input for each tick of this step.
    #[serde(flatten)]
    pub frame: InputFrame,
    /// Ticks to hold the input.
    #[serde(default = "one")]
    pub repeat: u32,
}

const fn one() -> u32 {
    1
}

/// Expanded per-tick input sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    frames: Vec<InputFrame>,
}

impl Script {
    /// Parses a script document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let steps: Vec<ScriptStep> = serde_json::from_str(json).context("invalid script JSON")?;
        Self::from_steps(&steps)
    }

    /// Reads and parses a script file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in script {}", path.display()))
    }

    /// Expands `repeat` counts into one frame per tick.
    pub fn from_steps(steps: &[ScriptStep]) -> Result<Self> {
        let mut frames = Vec::new();
        for (index, step) in steps.iter().enumerate() {
            ensure!(
                step.repeat <= MAX_REPEAT,
                "entry {index}: repeat {} exceeds the limit of {MAX_REPEAT}",
                step.repeat
            );
            let held = InputFrame {
                fire: false,
                cancel: false,
                ..step.frame
            };
            frames.extend((0..step.repeat).map(|tick| if tick == 0 { step.frame } else { held }));
        }
        Ok(Self { frames })
    }

    /// Number of scripted ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if the script has no ticks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Input for `tick`; idle once the script runs out.
    #[must_use]
    pub fn frame(&self, tick: usize) -> InputFrame {
        self.frames.get(tick).copied().unwrap_or_default()
    }
}
