use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Play session needs a chart timeline")]
    MissingChart,

    #[error("Play session needs an input queue")]
    MissingInput,

    #[error("Initial life {0} out of range (0..=100)")]
    InvalidInitialLife(f64),
}

/// The consuming half of the input queue was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Input queue closed")]
pub struct QueueClosed;
