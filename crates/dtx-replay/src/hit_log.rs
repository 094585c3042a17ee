// Recorded lane hit for replay.

use dtx_rule::LaneHit;
use serde::{Deserialize, Serialize};

/// A single recorded lane hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitLog {
    /// Hit time in milliseconds from song start.
    pub time_ms: f64,
    /// Lane index.
    pub lane: usize,
}

impl HitLog {
    pub fn new(time_ms: f64, lane: usize) -> Self {
        Self { time_ms, lane }
    }

    pub fn is_valid(&self) -> bool {
        self.time_ms.is_finite()
    }
}

impl From<HitLog> for LaneHit {
    fn from(log: HitLog) -> Self {
        LaneHit {
            lane: log.lane,
            time_ms: log.time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(HitLog::new(0.0, 0).is_valid());
        assert!(HitLog::new(-120.5, 3).is_valid());
        assert!(!HitLog::new(f64::NAN, 0).is_valid());
        assert!(!HitLog::new(f64::INFINITY, 0).is_valid());
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_string(&HitLog::new(1500.0, 2)).unwrap();
        assert_eq!(json, r#"{"timeMs":1500.0,"lane":2}"#);
    }

    #[test]
    fn test_into_lane_hit() {
        let hit: LaneHit = HitLog::new(42.0, 7).into();
        assert_eq!(hit.lane, 7);
        assert_eq!(hit.time_ms, 42.0);
    }
}
