//! Headless replay runner.
//!
//! Steps a [`PlaySession`] at a fixed frame interval, feeding recorded hits
//! through the session's input queue as they fall due, the same way a live
//! input thread would.

use std::sync::Arc;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use dtx_config::PlayConfig;
use dtx_model::{Chart, ChartTimeline};
use dtx_rule::{DETECTION_WINDOW_MS, PlayEvent, PlayResult, PlaySession, input_queue};

use crate::replay_data::ReplayData;

/// Upper bound on simulated frames (about 46 hours at 60 fps).
pub const MAX_FRAMES: usize = 10_000_000;

/// Everything a headless run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    pub events: Vec<PlayEvent>,
    pub result: PlayResult,
    pub frames: usize,
    /// Song time of the last simulated frame
    pub end_ms: f64,
    /// Notes already cleaned from the display at the last frame
    pub cleared_notes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayRunner {
    config: PlayConfig,
}

impl ReplayRunner {
    pub fn new(mut config: PlayConfig) -> Self {
        config.validate();
        Self { config }
    }

    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    pub fn run(&self, chart: Arc<Chart>, replay: &ReplayData) -> Result<ReplayOutcome> {
        let first_note_ms = chart.notes().first().map(|n| n.time_ms);
        let last_note_ms = chart.last_note_time_ms();
        let (tx, rx) = input_queue::channel();
        let mut session = PlaySession::builder()
            .chart(ChartTimeline::from_arc(chart))
            .input(rx)
            .initial_life(self.config.initial_life)
            .input_start_ms(self.config.input_start_ms)
            .build()?;

        // Hits outside the chart's detection span can never match a note, so
        // they only need to be delivered, not simulated frame by frame.
        let earliest_ms = first_note_ms.map_or(0.0, |t| t - DETECTION_WINDOW_MS);
        let latest_ms = last_note_ms.map_or(0.0, |t| t + DETECTION_WINDOW_MS);
        let first_hit_ms = replay.hits.first().map_or(0.0, |h| h.time_ms);
        let start_ms = first_hit_ms.max(earliest_ms).min(0.0);
        let end_ms = latest_ms + self.config.tail_ms;
        let interval = self.config.frame_interval_ms;

        let expected_frames = (end_ms - start_ms) / interval;
        if !(expected_frames < MAX_FRAMES as f64) {
            bail!(
                "replay spans {start_ms:.1}ms..{end_ms:.1}ms, more than {MAX_FRAMES} frames of {interval:.1}ms"
            );
        }

        log::info!(
            "Replaying {} hits against {} notes ({:.1}ms frames, until {:.1}ms)",
            replay.hits.len(),
            session.timeline().len(),
            interval,
            end_ms
        );

        let mut events = Vec::new();
        let mut pending = replay.hits.iter().peekable();
        let mut frames = 0;
        let mut now = start_ms;
        loop {
            while let Some(hit) = pending.next_if(|h| h.time_ms <= now) {
                tx.send((*hit).into())?;
            }
            events.extend(session.frame(now));
            frames += 1;
            if session.is_finished() && now >= end_ms {
                break;
            }
            if frames >= MAX_FRAMES {
                bail!("replay did not finish within {MAX_FRAMES} frames");
            }
            now += interval;
        }
        // hits recorded after the last frame cannot match any note
        let dropped = pending.count();
        if dropped > 0 {
            log::debug!("{dropped} hits after {now:.1}ms were not replayed");
        }

        let result = session.result();
        let cleared_notes = session
            .timeline()
            .passed_notes(now, self.config.passed_grace_ms)
            .len();
        log::info!(
            "Replay finished: score {} ({:.2}%), max combo {}, life {:.1}{}",
            result.score,
            result.percentage,
            result.max_combo,
            result.life,
            if result.failed { ", FAILED" } else { "" }
        );

        Ok(ReplayOutcome {
            events,
            result,
            frames,
            end_ms: now,
            cleared_notes,
        })
    }
}
