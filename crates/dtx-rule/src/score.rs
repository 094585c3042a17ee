use serde::{Deserialize, Serialize};

use crate::MAX_SCORE;
use crate::judgement::Judgement;
use crate::tier::SCORE_DENOMINATOR;

/// Score transition caused by one judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub previous: u64,
    pub current: u64,
    /// Points actually added after clamping
    pub awarded: u64,
}

/// Integer score accumulator capped at [`MAX_SCORE`].
///
/// Each note is worth `floor(MAX_SCORE / total_notes)` at Exact, scaled down
/// by the tier multiplier in integer arithmetic.
#[derive(Debug, Clone)]
pub struct ScoreAccumulator {
    total_notes: usize,
    per_note_budget: u64,
    current: u64,
}

impl ScoreAccumulator {
    pub fn new(total_notes: usize) -> Self {
        let per_note_budget = if total_notes == 0 {
            0
        } else {
            MAX_SCORE / total_notes as u64
        };
        Self {
            total_notes,
            per_note_budget,
            current: 0,
        }
    }

    pub fn apply(&mut self, judgement: &Judgement) -> ScoreChange {
        let previous = self.current;
        let points = self.per_note_budget * judgement.tier.score_numerator() / SCORE_DENOMINATOR;
        self.current = self.current.saturating_add(points).min(MAX_SCORE);
        ScoreChange {
            previous,
            current: self.current,
            awarded: self.current - previous,
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn per_note_budget(&self) -> u64 {
        self.per_note_budget
    }

    pub fn total_notes(&self) -> usize {
        self.total_notes
    }

    /// Score of an all-Exact run. Never exceeds [`MAX_SCORE`].
    pub fn theoretical_max(&self) -> u64 {
        self.per_note_budget * self.total_notes as u64
    }

    /// Current score as a percentage of [`ScoreAccumulator::theoretical_max`].
    pub fn percentage(&self) -> f64 {
        let max = self.theoretical_max();
        if max == 0 {
            0.0
        } else {
            self.current as f64 * 100.0 / max as f64
        }
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}
