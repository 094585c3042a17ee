use serde::{Deserialize, Serialize};

use crate::judgement::Judgement;

pub const MIN_LIFE: f64 = 0.0;
pub const MAX_LIFE: f64 = 100.0;
pub const DEFAULT_INITIAL_LIFE: f64 = 50.0;
/// Life strictly below this fails the play.
pub const FAILURE_THRESHOLD: f64 = 2.0;
/// Life strictly below this is shown as danger.
pub const DANGER_THRESHOLD: f64 = 20.0;

/// The judgement that dropped life below [`FAILURE_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeFailure {
    pub judgement: Judgement,
    pub final_life: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeChange {
    pub previous: f64,
    pub current: f64,
    /// Set on the one change that failed the gauge
    pub failure: Option<GaugeFailure>,
}

/// Life gauge. Once failed, the value is frozen until [`LifeGauge::reset`].
#[derive(Debug, Clone)]
pub struct LifeGauge {
    value: f64,
    failed: bool,
}

impl Default for LifeGauge {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_LIFE)
    }
}

impl LifeGauge {
    pub fn new(initial_life: f64) -> Self {
        Self {
            value: clamp_life(initial_life),
            failed: false,
        }
    }

    /// Apply one judgement. Returns `None` once the gauge has failed.
    pub fn apply(&mut self, judgement: &Judgement) -> Option<GaugeChange> {
        if self.failed {
            return None;
        }
        let previous = self.value;
        self.value = clamp_life(self.value + judgement.tier.life_adjustment());

        let failure = if self.value < FAILURE_THRESHOLD {
            self.failed = true;
            Some(GaugeFailure {
                judgement: *judgement,
                final_life: self.value,
            })
        } else {
            None
        };
        Some(GaugeChange {
            previous,
            current: self.value,
            failure,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn is_in_danger(&self) -> bool {
        self.value < DANGER_THRESHOLD && !self.failed
    }

    pub fn reset(&mut self, initial_life: f64) {
        self.value = clamp_life(initial_life);
        self.failed = false;
    }
}

fn clamp_life(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_LIFE;
    }
    value.clamp(MIN_LIFE, MAX_LIFE)
}
