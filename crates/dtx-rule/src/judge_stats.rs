use serde::{Deserialize, Serialize};

use crate::judgement::Judgement;
use crate::tier::JudgeTier;

/// Per-tier and early/late counts for a play session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeStats {
    pub exact: u32,
    pub great: u32,
    pub good: u32,
    pub poor: u32,
    pub miss: u32,
    /// Non-Exact hits before the scheduled time
    pub fast: u32,
    /// Non-Exact hits after the scheduled time
    pub slow: u32,
    /// Judgements that came from a lane hit
    pub hits: u32,
    offset_sum_ms: f64,
}

impl JudgeStats {
    pub fn record(&mut self, judgement: &Judgement) {
        match judgement.tier {
            JudgeTier::Exact => self.exact += 1,
            JudgeTier::Great => self.great += 1,
            JudgeTier::Good => self.good += 1,
            JudgeTier::Poor => self.poor += 1,
            JudgeTier::Miss => self.miss += 1,
        }
        if judgement.is_fast() {
            self.fast += 1;
        } else if judgement.is_slow() {
            self.slow += 1;
        }
        if judgement.is_hit() {
            self.hits += 1;
            self.offset_sum_ms += judgement.delta_ms;
        }
    }

    pub fn count(&self, tier: JudgeTier) -> u32 {
        match tier {
            JudgeTier::Exact => self.exact,
            JudgeTier::Great => self.great,
            JudgeTier::Good => self.good,
            JudgeTier::Poor => self.poor,
            JudgeTier::Miss => self.miss,
        }
    }

    pub fn judged(&self) -> u32 {
        JudgeTier::ALL.iter().map(|&t| self.count(t)).sum()
    }

    /// Mean signed offset of lane hits; `None` before the first hit.
    pub fn mean_offset_ms(&self) -> Option<f64> {
        (self.hits > 0).then(|| self.offset_sum_ms / f64::from(self.hits))
    }

    pub fn is_full_combo(&self) -> bool {
        self.judged() > 0 && self.poor == 0 && self.miss == 0
    }

    pub fn is_all_exact(&self) -> bool {
        self.judged() > 0 && self.judged() == self.exact
    }
}
