// DTX chart data model: notes, tempo map, chart finalization, timeline queries

mod chart;
mod error;
mod note;
mod tempo;
mod timeline;

pub use chart::{Chart, ChartBuilder, ChartSource};
pub use error::ChartError;
pub use note::{BgCue, CuePosition, Note, NoteId, NotePosition};
pub use tempo::TempoMap;
pub use timeline::ChartTimeline;

/// Tick resolution of one measure
pub const TICKS_PER_MEASURE: u32 = 192;

/// Beats in an unmodified (4/4) measure
pub const BEATS_PER_MEASURE: u32 = 4;

/// Exclusive upper bound on note lanes
pub const MAX_LANES: usize = 64;
