//! Judgement tiers and their per-tier properties.

use serde::{Deserialize, Serialize};

/// Upper |delta| bound (ms, inclusive) per tier.
pub const EXACT_MS: f64 = 25.0;
pub const GREAT_MS: f64 = 50.0;
pub const GOOD_MS: f64 = 100.0;
pub const POOR_MS: f64 = 150.0;

/// Denominator for [`JudgeTier::score_numerator`].
pub const SCORE_DENOMINATOR: u64 = 10;

/// Timing accuracy tier of a judgement.
///
/// Declared worst to best so the derived ordering gives `Exact > Great > ... > Miss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JudgeTier {
    Miss,
    Poor,
    Good,
    Great,
    Exact,
}

impl JudgeTier {
    /// Best to worst.
    pub const ALL: [JudgeTier; 5] = [
        JudgeTier::Exact,
        JudgeTier::Great,
        JudgeTier::Good,
        JudgeTier::Poor,
        JudgeTier::Miss,
    ];

    /// Classify a signed hit offset. Each bound is inclusive on the tighter tier.
    pub fn from_delta(delta_ms: f64) -> Self {
        let abs = delta_ms.abs();
        if abs <= EXACT_MS {
            JudgeTier::Exact
        } else if abs <= GREAT_MS {
            JudgeTier::Great
        } else if abs <= GOOD_MS {
            JudgeTier::Good
        } else if abs <= POOR_MS {
            JudgeTier::Poor
        } else {
            JudgeTier::Miss
        }
    }

    /// Score multiplier as a fraction of [`SCORE_DENOMINATOR`].
    pub fn score_numerator(self) -> u64 {
        match self {
            JudgeTier::Exact => 10,
            JudgeTier::Great => 9,
            JudgeTier::Good => 5,
            JudgeTier::Poor | JudgeTier::Miss => 0,
        }
    }

    pub fn score_multiplier(self) -> f64 {
        self.score_numerator() as f64 / SCORE_DENOMINATOR as f64
    }

    pub fn continues_combo(self) -> bool {
        matches!(self, JudgeTier::Exact | JudgeTier::Great | JudgeTier::Good)
    }

    pub fn life_adjustment(self) -> f64 {
        match self {
            JudgeTier::Exact => 2.0,
            JudgeTier::Great => 1.5,
            JudgeTier::Good => 1.0,
            JudgeTier::Poor => -1.5,
            JudgeTier::Miss => -3.0,
        }
    }

    /// Position in [`JudgeTier::ALL`].
    pub fn index(self) -> usize {
        match self {
            JudgeTier::Exact => 0,
            JudgeTier::Great => 1,
            JudgeTier::Good => 2,
            JudgeTier::Poor => 3,
            JudgeTier::Miss => 4,
        }
    }
}

impl std::fmt::Display for JudgeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JudgeTier::Exact => "EXACT",
            JudgeTier::Great => "GREAT",
            JudgeTier::Good => "GOOD",
            JudgeTier::Poor => "POOR",
            JudgeTier::Miss => "MISS",
        };
        f.write_str(name)
    }
}
