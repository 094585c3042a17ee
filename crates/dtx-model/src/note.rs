use serde::{Deserialize, Serialize};

/// Stable note identifier, assigned at chart finalization in time order.
pub type NoteId = usize;

/// A single hittable note in a finalized chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Index into the finalized note list (0-indexed, time order)
    pub id: NoteId,
    /// Lane index (0-indexed)
    pub lane: usize,
    /// Scheduled time in milliseconds from song start
    pub time_ms: f64,
    /// Measure number in the source chart
    pub bar: u32,
    /// Position inside the measure (0..192)
    pub tick: u32,
    /// Source channel number
    pub channel: u16,
    /// Source chip/wav value
    pub value: u16,
}

impl Note {
    /// Signed offset of `time_ms` from this note's scheduled time.
    /// Negative = before the note, positive = after.
    pub fn offset_from(&self, time_ms: f64) -> f64 {
        time_ms - self.time_ms
    }
}

/// A background audio cue.
///
/// Shares the note timing derivation but has no lane and is never judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgCue {
    /// Trigger time in milliseconds
    pub time_ms: f64,
    pub bar: u32,
    pub tick: u32,
    pub channel: u16,
    pub value: u16,
}

/// A note as delivered by the chart parser, before timing is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePosition {
    pub lane: usize,
    pub bar: u32,
    pub tick: u32,
    #[serde(default)]
    pub channel: u16,
    #[serde(default)]
    pub value: u16,
}

impl NotePosition {
    pub fn new(lane: usize, bar: u32, tick: u32) -> Self {
        Self {
            lane,
            bar,
            tick,
            channel: 0,
            value: 0,
        }
    }
}

/// A background cue as delivered by the chart parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuePosition {
    pub bar: u32,
    pub tick: u32,
    #[serde(default)]
    pub channel: u16,
    #[serde(default)]
    pub value: u16,
}
