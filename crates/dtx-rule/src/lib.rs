// Judgement tiers, judgement engine, score, combo, life gauge, play session

mod combo;
mod error;
pub mod input_queue;
mod judge_engine;
mod judge_stats;
mod judgement;
mod life_gauge;
mod play_session;
mod score;
mod tier;

pub use combo::{ComboChange, ComboTracker};
pub use error::{QueueClosed, SessionError};
pub use input_queue::{HitReceiver, HitSender, LaneHit};
pub use judge_engine::JudgementEngine;
pub use judge_stats::JudgeStats;
pub use judgement::{Judgement, JudgementKind};
pub use life_gauge::{GaugeChange, GaugeFailure, LifeGauge};
pub use play_session::{PlayEvent, PlayResult, PlaySession, PlaySessionBuilder};
pub use score::{ScoreAccumulator, ScoreChange};
pub use tier::JudgeTier;

/// Half-width of the hit detection window (ms). Notes farther than this from a
/// hit are not candidates; notes older than this time out.
pub const DETECTION_WINDOW_MS: f64 = 200.0;

/// Upper bound of the score accumulator.
pub const MAX_SCORE: u64 = 1_000_000;
