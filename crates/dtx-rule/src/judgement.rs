use dtx_model::NoteId;
use serde::{Deserialize, Serialize};

use crate::tier::JudgeTier;

/// How a note came to be judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JudgementKind {
    /// Matched by a lane hit
    Hit,
    /// Detection window elapsed with no hit
    Timeout,
    /// Passed over by a hit on a later note in the same lane
    Skipped,
}

/// The outcome for one note. Exactly one is produced per note per session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    pub note_id: NoteId,
    pub lane: usize,
    /// Signed offset: hit time (or current time for timeouts) minus scheduled time
    pub delta_ms: f64,
    pub tier: JudgeTier,
    pub kind: JudgementKind,
}

impl Judgement {
    pub fn is_hit(&self) -> bool {
        self.kind == JudgementKind::Hit
    }

    /// Hit before the scheduled time.
    pub fn is_fast(&self) -> bool {
        self.is_hit() && self.tier != JudgeTier::Exact && self.delta_ms < 0.0
    }

    /// Hit after the scheduled time.
    pub fn is_slow(&self) -> bool {
        self.is_hit() && self.tier != JudgeTier::Exact && self.delta_ms > 0.0
    }
}
