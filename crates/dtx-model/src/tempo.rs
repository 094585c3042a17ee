use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::{BEATS_PER_MEASURE, TICKS_PER_MEASURE};

/// Tempo and measure-length layout of a chart.
///
/// A BPM change applies from the start of its measure until the next change.
/// A measure-length override (ratio of a 4/4 measure) applies to its own
/// measure only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoMap {
    initial_bpm: f64,
    #[serde(default)]
    bpm_changes: BTreeMap<u32, f64>,
    #[serde(default)]
    measure_lengths: BTreeMap<u32, f64>,
}

impl TempoMap {
    pub fn new(initial_bpm: f64) -> Result<Self, ChartError> {
        check_bpm(0, initial_bpm)?;
        Ok(Self {
            initial_bpm,
            bpm_changes: BTreeMap::new(),
            measure_lengths: BTreeMap::new(),
        })
    }

    pub fn with_bpm_change(mut self, measure: u32, bpm: f64) -> Result<Self, ChartError> {
        check_bpm(measure, bpm)?;
        self.bpm_changes.insert(measure, bpm);
        Ok(self)
    }

    pub fn with_measure_length(mut self, measure: u32, length: f64) -> Result<Self, ChartError> {
        check_length(measure, length)?;
        self.measure_lengths.insert(measure, length);
        Ok(self)
    }

    /// Re-check every entry. Needed for maps that came in through serde.
    pub fn validate(&self) -> Result<(), ChartError> {
        check_bpm(0, self.initial_bpm)?;
        for (&measure, &bpm) in &self.bpm_changes {
            check_bpm(measure, bpm)?;
        }
        for (&measure, &length) in &self.measure_lengths {
            check_length(measure, length)?;
        }
        Ok(())
    }

    pub fn initial_bpm(&self) -> f64 {
        self.initial_bpm
    }

    pub fn bpm_at(&self, measure: u32) -> f64 {
        self.bpm_changes
            .range(..=measure)
            .next_back()
            .map_or(self.initial_bpm, |(_, &bpm)| bpm)
    }

    pub fn measure_length(&self, measure: u32) -> f64 {
        self.measure_lengths.get(&measure).copied().unwrap_or(1.0)
    }

    pub fn measure_duration_ms(&self, measure: u32) -> f64 {
        self.measure_length(measure) * f64::from(BEATS_PER_MEASURE) * 60000.0
            / self.bpm_at(measure)
    }

    /// Start time of `bar`. Runs of measures with no override are summed as a
    /// single multiplication, so a constant-tempo chart matches the closed form.
    pub fn measure_start_ms(&self, bar: u32) -> f64 {
        let mut time = 0.0;
        let mut measure = 0;
        while measure < bar {
            if self.measure_lengths.contains_key(&measure) {
                time += self.measure_duration_ms(measure);
                measure += 1;
                continue;
            }
            let next = self.next_boundary(measure).map_or(bar, |b| b.min(bar));
            time += f64::from(next - measure) * self.measure_duration_ms(measure);
            measure = next;
        }
        time
    }

    pub fn time_ms(&self, bar: u32, tick: u32) -> Result<f64, ChartError> {
        if tick >= TICKS_PER_MEASURE {
            return Err(ChartError::TickOutOfRange {
                bar,
                tick,
                limit: TICKS_PER_MEASURE,
            });
        }
        let fraction = f64::from(tick) / f64::from(TICKS_PER_MEASURE);
        Ok(self.measure_start_ms(bar) + fraction * self.measure_duration_ms(bar))
    }

    fn next_boundary(&self, measure: u32) -> Option<u32> {
        let bpm = self.bpm_changes.range((Excluded(measure), Unbounded)).next();
        let len = self
            .measure_lengths
            .range((Excluded(measure), Unbounded))
            .next();
        match (bpm, len) {
            (Some((&a, _)), Some((&b, _))) => Some(a.min(b)),
            (Some((&a, _)), None) => Some(a),
            (None, Some((&b, _))) => Some(b),
            (None, None) => None,
        }
    }
}

fn check_bpm(measure: u32, bpm: f64) -> Result<(), ChartError> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(())
    } else {
        Err(ChartError::InvalidBpm { measure, bpm })
    }
}

fn check_length(measure: u32, length: f64) -> Result<(), ChartError> {
    if length.is_finite() && length > 0.0 {
        Ok(())
    } else {
        Err(ChartError::InvalidMeasureLength { measure, length })
    }
}
