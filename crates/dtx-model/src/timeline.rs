use std::cell::Cell;
use std::sync::Arc;

use crate::chart::Chart;
use crate::note::{Note, NoteId};

/// How far a cursor walks linearly before falling back to binary search.
const LINEAR_SCAN_LIMIT: usize = 64;

/// Time-ordered, read-only query view over a finalized chart.
///
/// Window queries carry two cursors between calls so that a monotonically
/// advancing window costs amortized O(1). The cursors live in `Cell`s, so the
/// timeline is `Send` but not `Sync`: one reader per timeline. Use
/// [`ChartTimeline::share`] for a second reader over the same chart.
#[derive(Debug)]
pub struct ChartTimeline {
    chart: Arc<Chart>,
    start_cursor: Cell<usize>,
    end_cursor: Cell<usize>,
    fallbacks: Cell<u64>,
}

impl ChartTimeline {
    pub fn new(chart: Chart) -> Self {
        Self::from_arc(Arc::new(chart))
    }

    pub fn from_arc(chart: Arc<Chart>) -> Self {
        Self {
            chart,
            start_cursor: Cell::new(0),
            end_cursor: Cell::new(0),
            fallbacks: Cell::new(0),
        }
    }

    /// A new timeline over the same chart with its own cursors.
    pub fn share(&self) -> Self {
        Self::from_arc(Arc::clone(&self.chart))
    }

    pub fn chart(&self) -> &Arc<Chart> {
        &self.chart
    }

    pub fn notes(&self) -> &[Note] {
        self.chart.notes()
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.chart.notes().get(id)
    }

    pub fn len(&self) -> usize {
        self.chart.note_count()
    }

    pub fn is_empty(&self) -> bool {
        self.chart.note_count() == 0
    }

    /// All notes with `from_ms <= time_ms <= to_ms`, in time order.
    pub fn notes_in_window(&self, from_ms: f64, to_ms: f64) -> &[Note] {
        // also rejects NaN bounds
        if !(from_ms <= to_ms) {
            return &[];
        }
        let start = self.seek(&self.start_cursor, |n| n.time_ms < from_ms);
        let end = self.seek(&self.end_cursor, |n| n.time_ms <= to_ms);
        &self.chart.notes()[start..end.max(start)]
    }

    /// First note strictly after `after_ms`, any lane.
    pub fn next_note(&self, after_ms: f64) -> Option<&Note> {
        let notes = self.chart.notes();
        let idx = notes.partition_point(|n| n.time_ms <= after_ms);
        notes.get(idx)
    }

    /// First note in `lane` strictly after `after_ms`.
    pub fn next_note_in_lane(&self, lane: usize, after_ms: f64) -> Option<&Note> {
        let notes = self.chart.notes();
        let idx = notes.partition_point(|n| n.time_ms <= after_ms);
        notes[idx..].iter().find(|n| n.lane == lane)
    }

    /// Notes scheduled before `now_ms - grace_ms`. Only meant for display cleanup;
    /// judgement state is tracked elsewhere.
    pub fn passed_notes(&self, now_ms: f64, grace_ms: f64) -> &[Note] {
        let notes = self.chart.notes();
        let limit = now_ms - grace_ms;
        &notes[..notes.partition_point(|n| n.time_ms < limit)]
    }

    /// Number of times a window query had to fall back to binary search.
    pub fn seek_fallbacks(&self) -> u64 {
        self.fallbacks.get()
    }

    /// Move `cursor` to the first note for which `before` is false.
    /// `before` must be monotone over the sorted note list.
    fn seek(&self, cursor: &Cell<usize>, before: impl Fn(&Note) -> bool) -> usize {
        let notes = self.chart.notes();
        let mut idx = cursor.get().min(notes.len());

        if idx > 0 && !before(&notes[idx - 1]) {
            // window moved backwards
            idx = notes.partition_point(&before);
            self.fallbacks.set(self.fallbacks.get() + 1);
        } else {
            let limit = (idx + LINEAR_SCAN_LIMIT).min(notes.len());
            while idx < limit && before(&notes[idx]) {
                idx += 1;
            }
            if idx == limit && idx < notes.len() && before(&notes[idx]) {
                idx = notes.partition_point(&before);
                self.fallbacks.set(self.fallbacks.get() + 1);
            }
        }

        cursor.set(idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartBuilder;
    use crate::tempo::TempoMap;

    /// 120 BPM, lane = i % 3, one note every 48 ticks (500 ms)
    fn timeline(count: u32) -> ChartTimeline {
        let mut builder = ChartBuilder::new(TempoMap::new(120.0).unwrap());
        for i in 0..count {
            builder = builder.note((i % 3) as usize, i / 4, (i % 4) * 48);
        }
        ChartTimeline::new(builder.build().unwrap())
    }

    fn ids(notes: &[Note]) -> Vec<usize> {
        notes.iter().map(|n| n.id).collect()
    }

    // -- Window queries --

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let tl = timeline(10);
        assert_eq!(ids(tl.notes_in_window(500.0, 1500.0)), vec![1, 2, 3]);
        assert_eq!(ids(tl.notes_in_window(500.1, 1499.9)), vec![2]);
    }

    #[test]
    fn reversed_window_is_empty() {
        let tl = timeline(10);
        assert!(tl.notes_in_window(2000.0, 1000.0).is_empty());
        assert!(tl.notes_in_window(f64::NAN, 1000.0).is_empty());
    }

    #[test]
    fn window_before_and_after_chart() {
        let tl = timeline(4);
        assert!(tl.notes_in_window(-1000.0, -1.0).is_empty());
        assert!(tl.notes_in_window(10_000.0, 20_000.0).is_empty());
        assert_eq!(ids(tl.notes_in_window(-1000.0, 0.0)), vec![0]);
    }

    #[test]
    fn sequential_windows_avoid_binary_search() {
        let tl = timeline(400);
        let mut t = -200.0;
        while t < 200_000.0 {
            let window = tl.notes_in_window(t - 200.0, t + 200.0);
            for note in window {
                assert!(note.time_ms >= t - 200.0 && note.time_ms <= t + 200.0);
            }
            t += 1000.0 / 60.0;
        }
        assert_eq!(tl.seek_fallbacks(), 0);
    }

    #[test]
    fn backward_and_far_jumps_still_correct() {
        let tl = timeline(400);
        assert_eq!(ids(tl.notes_in_window(100_000.0, 100_600.0)), vec![200, 201]);
        assert_eq!(ids(tl.notes_in_window(0.0, 600.0)), vec![0, 1]);
        assert_eq!(ids(tl.notes_in_window(150_000.0, 150_000.0)), vec![300]);
        assert!(tl.seek_fallbacks() > 0);
    }

    #[test]
    fn windows_match_brute_force() {
        let tl = timeline(120);
        let queries = [
            (0.0, 0.0),
            (250.0, 7000.0),
            (3000.0, 3500.0),
            (100.0, 120.0),
            (59_000.0, 70_000.0),
            (10.0, 45_000.0),
            (44_000.0, 44_999.0),
        ];
        for (from, to) in queries {
            let expected: Vec<usize> = tl
                .notes()
                .iter()
                .filter(|n| n.time_ms >= from && n.time_ms <= to)
                .map(|n| n.id)
                .collect();
            assert_eq!(ids(tl.notes_in_window(from, to)), expected, "window {from}..{to}");
        }
    }

    // -- Point queries --

    #[test]
    fn next_note_is_strictly_after() {
        let tl = timeline(10);
        assert_eq!(tl.next_note(-1.0).map(|n| n.id), Some(0));
        assert_eq!(tl.next_note(0.0).map(|n| n.id), Some(1));
        assert_eq!(tl.next_note(4500.0), None);
    }

    #[test]
    fn next_note_in_lane_filters() {
        let tl = timeline(10);
        assert_eq!(tl.next_note_in_lane(2, 0.0).map(|n| n.id), Some(2));
        assert_eq!(tl.next_note_in_lane(2, 1000.0).map(|n| n.id), Some(5));
        assert_eq!(tl.next_note_in_lane(0, 4000.0).map(|n| n.id), Some(9));
        assert_eq!(tl.next_note_in_lane(0, 4500.0), None);
        assert_eq!(tl.next_note_in_lane(7, 0.0), None);
    }

    #[test]
    fn passed_notes_respect_grace() {
        let tl = timeline(10);
        assert!(tl.passed_notes(400.0, 500.0).is_empty());
        assert_eq!(ids(tl.passed_notes(1000.0, 500.0)), vec![0]);
        assert_eq!(ids(tl.passed_notes(1000.1, 500.0)), vec![0, 1]);
        assert_eq!(tl.passed_notes(100_000.0, 0.0).len(), 10);
    }

    proptest::proptest! {
        #[test]
        fn cursor_queries_match_binary_search(
            positions in proptest::collection::vec((0usize..8, 0u32..40, 0u32..192), 0..300),
            queries in proptest::collection::vec((-1000.0f64..90_000.0, 0.0f64..3000.0), 1..100),
        ) {
            let mut builder = ChartBuilder::new(TempoMap::new(120.0).unwrap());
            for (lane, bar, tick) in positions {
                builder = builder.note(lane, bar, tick);
            }
            let tl = ChartTimeline::new(builder.build().unwrap());
            for (from, width) in queries {
                let to = from + width;
                let notes = tl.notes();
                let lo = notes.partition_point(|n| n.time_ms < from);
                let hi = notes.partition_point(|n| n.time_ms <= to);
                proptest::prop_assert_eq!(tl.notes_in_window(from, to), &notes[lo..hi]);
            }
        }
    }

    // -- Sharing --

    #[test]
    fn shared_timeline_has_independent_cursor() {
        let tl = timeline(400);
        tl.notes_in_window(100_000.0, 100_600.0);
        let other = tl.share();
        assert!(Arc::ptr_eq(tl.chart(), other.chart()));
        assert_eq!(ids(other.notes_in_window(0.0, 0.0)), vec![0]);
        assert_eq!(other.seek_fallbacks(), 0);
    }
}
