// Replay data, hit input log, headless replay runner

pub mod hit_log;
pub mod replay_data;
pub mod runner;

pub use hit_log::HitLog;
pub use replay_data::{ReplayData, read_compressed, write_compressed};
pub use runner::{ReplayOutcome, ReplayRunner};
