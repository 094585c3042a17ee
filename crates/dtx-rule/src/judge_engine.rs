//! Judgement engine.
//!
//! Matches lane hits to notes and times out notes whose detection window has
//! elapsed. Judgements are returned to the caller in emission order; the
//! engine itself holds no score, combo or gauge state.

use dtx_model::{ChartTimeline, Note, NoteId};

use crate::DETECTION_WINDOW_MS;
use crate::judgement::{Judgement, JudgementKind};
use crate::tier::JudgeTier;

#[derive(Debug, Clone)]
pub struct JudgementEngine {
    /// lane -> note ids in time order
    lane_notes: Vec<Vec<NoteId>>,
    /// note id -> index inside its lane list
    lane_position: Vec<usize>,
    /// lane -> index of the first unjudged note in `lane_notes[lane]`
    lane_cursor: Vec<usize>,
    /// First note (global time order) not yet checked for timeout
    timeout_cursor: usize,
    judged: Vec<bool>,
    judged_count: usize,
    processing_enabled: bool,
    /// lane -> time of the last processed hit
    last_hit_ms: Vec<Option<f64>>,
}

impl JudgementEngine {
    pub fn new(timeline: &ChartTimeline) -> Self {
        let notes = timeline.notes();
        let lane_count = timeline.chart().lane_count();

        let mut lane_notes: Vec<Vec<NoteId>> = vec![Vec::new(); lane_count];
        let mut lane_position = vec![0; notes.len()];
        // Notes are already time sorted, so each lane list is too
        for note in notes {
            lane_position[note.id] = lane_notes[note.lane].len();
            lane_notes[note.lane].push(note.id);
        }

        Self {
            lane_notes,
            lane_position,
            lane_cursor: vec![0; lane_count],
            timeout_cursor: 0,
            judged: vec![false; notes.len()],
            judged_count: 0,
            processing_enabled: true,
            last_hit_ms: vec![None; lane_count],
        }
    }

    /// Process a hit on `lane` at `time_ms`.
    ///
    /// Returns nothing when processing is disabled or no unjudged note of the
    /// lane lies within the detection window. Otherwise the nearest note is
    /// judged, preceded by a `Miss` for every earlier unjudged note of the lane.
    pub fn hit(&mut self, timeline: &ChartTimeline, lane: usize, time_ms: f64) -> Vec<Judgement> {
        if !self.processing_enabled || lane >= self.lane_notes.len() || time_ms.is_nan() {
            return Vec::new();
        }

        if let Some(last) = self.last_hit_ms[lane] {
            if time_ms < last {
                log::warn!("Out-of-order hit on lane {lane}: {time_ms:.3}ms after {last:.3}ms");
            }
        }
        self.last_hit_ms[lane] = Some(time_ms);

        let window = timeline.notes_in_window(
            time_ms - DETECTION_WINDOW_MS,
            time_ms + DETECTION_WINDOW_MS,
        );
        let mut best: Option<(&Note, f64)> = None;
        for note in window
            .iter()
            .filter(|n| n.lane == lane && !self.judged[n.id])
        {
            let distance = (time_ms - note.time_ms).abs();
            // strict: ties keep the earlier note
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((note, distance));
            }
        }
        let Some((target, _)) = best else {
            return Vec::new();
        };

        let target_pos = self.lane_position[target.id];
        let mut judgements = Vec::new();

        // Earlier unjudged notes of this lane resolve first so the lane stays in order
        let skipped_ids: Vec<NoteId> = self.lane_notes[lane][self.lane_cursor[lane]..target_pos]
            .iter()
            .copied()
            .filter(|&id| !self.judged[id])
            .collect();
        for id in skipped_ids {
            let Some(note) = timeline.note(id) else {
                continue;
            };
            let delta_ms = time_ms - note.time_ms;
            let kind = if delta_ms > DETECTION_WINDOW_MS {
                JudgementKind::Timeout
            } else {
                JudgementKind::Skipped
            };
            if let Some(j) = self.judge(note, delta_ms, JudgeTier::Miss, kind) {
                judgements.push(j);
            }
        }

        let delta_ms = time_ms - target.time_ms;
        let tier = JudgeTier::from_delta(delta_ms);
        if let Some(j) = self.judge(target, delta_ms, tier, JudgementKind::Hit) {
            judgements.push(j);
        }
        judgements
    }

    /// Time out every unjudged note with `time_ms + DETECTION_WINDOW_MS < now_ms`,
    /// in time order. Runs whether or not hit processing is enabled.
    pub fn advance(&mut self, timeline: &ChartTimeline, now_ms: f64) -> Vec<Judgement> {
        if now_ms.is_nan() {
            log::warn!("Ignoring timeout pass at NaN song time");
            return Vec::new();
        }
        let notes = timeline.notes();
        let mut judgements = Vec::new();
        while let Some(note) = notes.get(self.timeout_cursor) {
            if note.time_ms + DETECTION_WINDOW_MS >= now_ms {
                break;
            }
            self.timeout_cursor += 1;
            if self.judged[note.id] {
                continue;
            }
            let delta_ms = now_ms - note.time_ms;
            if let Some(j) = self.judge(note, delta_ms, JudgeTier::Miss, JudgementKind::Timeout) {
                judgements.push(j);
            }
        }
        judgements
    }

    /// Record a judgement. Judging a note twice is a contract violation.
    fn judge(
        &mut self,
        note: &Note,
        delta_ms: f64,
        tier: JudgeTier,
        kind: JudgementKind,
    ) -> Option<Judgement> {
        debug_assert!(!self.judged[note.id], "note {} judged twice", note.id);
        if self.judged[note.id] {
            log::warn!("Ignoring second judgement of note {}", note.id);
            return None;
        }
        self.judged[note.id] = true;
        self.judged_count += 1;

        let lane = note.lane;
        let lane_list = &self.lane_notes[lane];
        let cursor = &mut self.lane_cursor[lane];
        while *cursor < lane_list.len() && self.judged[lane_list[*cursor]] {
            *cursor += 1;
        }

        log::debug!(
            "Note {} lane {} {} {:+.3}ms ({:?})",
            note.id,
            lane,
            tier,
            delta_ms,
            kind
        );
        Some(Judgement {
            note_id: note.id,
            lane,
            delta_ms,
            tier,
            kind,
        })
    }

    pub fn set_processing_enabled(&mut self, enabled: bool) {
        self.processing_enabled = enabled;
    }

    pub fn processing_enabled(&self) -> bool {
        self.processing_enabled
    }

    pub fn is_judged(&self, id: NoteId) -> bool {
        self.judged.get(id).copied().unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.judged_count == self.judged.len()
    }

    pub fn judged_count(&self) -> usize {
        self.judged_count
    }

    pub fn pending_count(&self) -> usize {
        self.judged.len() - self.judged_count
    }

    /// Forget all judgements. The processing flag is left as is.
    pub fn reset(&mut self) {
        self.lane_cursor.fill(0);
        self.timeout_cursor = 0;
        self.judged.fill(false);
        self.judged_count = 0;
        self.last_hit_ms.fill(None);
    }
}
