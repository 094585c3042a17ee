use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const LIFE_MAX: f64 = 100.0;
pub const LIFE_MIN: f64 = 0.0;
pub const FRAME_INTERVAL_MAX: f64 = 100.0;
pub const FRAME_INTERVAL_MIN: f64 = 1.0;

const DEFAULT_INITIAL_LIFE: f64 = 50.0;
const DEFAULT_PASSED_GRACE_MS: f64 = 500.0;
const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;
const DEFAULT_TAIL_MS: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PlayConfig {
    pub initial_life: f64,
    /// Song time at which lane hits start being accepted (None = from the start)
    pub input_start_ms: Option<f64>,
    /// How long a passed note stays visible before display cleanup
    pub passed_grace_ms: f64,
    /// Simulation step of the headless runner
    pub frame_interval_ms: f64,
    /// How long the headless runner keeps going after the last note's window
    pub tail_ms: f64,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            initial_life: DEFAULT_INITIAL_LIFE,
            input_start_ms: None,
            passed_grace_ms: DEFAULT_PASSED_GRACE_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            tail_ms: DEFAULT_TAIL_MS,
        }
    }
}

impl PlayConfig {
    pub fn validate(&mut self) {
        self.initial_life =
            finite_or(self.initial_life, DEFAULT_INITIAL_LIFE).clamp(LIFE_MIN, LIFE_MAX);
        self.input_start_ms = self.input_start_ms.filter(|t| t.is_finite());
        self.passed_grace_ms = finite_or(self.passed_grace_ms, DEFAULT_PASSED_GRACE_MS).max(0.0);
        self.frame_interval_ms = finite_or(self.frame_interval_ms, DEFAULT_FRAME_INTERVAL_MS)
            .clamp(FRAME_INTERVAL_MIN, FRAME_INTERVAL_MAX);
        self.tail_ms = finite_or(self.tail_ms, DEFAULT_TAIL_MS).max(0.0);
    }

    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut config: PlayConfig = serde_json::from_str(&data)?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
