use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("Invalid BPM {bpm} at measure {measure}")]
    InvalidBpm { measure: u32, bpm: f64 },

    #[error("Invalid measure length {length} at measure {measure}")]
    InvalidMeasureLength { measure: u32, length: f64 },

    #[error("Tick {tick} out of range at measure {bar} (must be < {limit})")]
    TickOutOfRange { bar: u32, tick: u32, limit: u32 },

    #[error("Lane {lane} out of range at measure {bar} (must be < {limit})")]
    LaneOutOfRange { bar: u32, lane: usize, limit: usize },
}
