use serde::{Deserialize, Serialize};

use crate::judgement::Judgement;

/// Combo transition caused by one judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboChange {
    pub previous: u32,
    pub current: u32,
    pub max: u32,
    pub was_reset: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ComboTracker {
    current: u32,
    max: u32,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, judgement: &Judgement) -> ComboChange {
        let previous = self.current;
        if judgement.tier.continues_combo() {
            self.current += 1;
            self.max = self.max.max(self.current);
        } else {
            self.current = 0;
        }
        ComboChange {
            previous,
            current: self.current,
            max: self.max,
            was_reset: !judgement.tier.continues_combo(),
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn has_combo(&self) -> bool {
        self.current > 0
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.max = 0;
    }
}
