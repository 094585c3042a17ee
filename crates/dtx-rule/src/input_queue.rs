//! Single-producer, single-consumer hand-off of lane hits.
//!
//! The input side pushes timestamped hits; the frame loop drains them all
//! before advancing. Neither half is `Clone`.

use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::error::QueueClosed;

/// A timestamped lane press.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneHit {
    pub lane: usize,
    pub time_ms: f64,
}

pub fn channel() -> (HitSender, HitReceiver) {
    let (tx, rx) = mpsc::channel();
    (HitSender { tx }, HitReceiver { rx })
}

#[derive(Debug)]
pub struct HitSender {
    tx: mpsc::Sender<LaneHit>,
}

impl HitSender {
    pub fn send(&self, hit: LaneHit) -> Result<(), QueueClosed> {
        self.tx.send(hit).map_err(|_| QueueClosed)
    }

    pub fn hit(&self, lane: usize, time_ms: f64) -> Result<(), QueueClosed> {
        self.send(LaneHit { lane, time_ms })
    }
}

#[derive(Debug)]
pub struct HitReceiver {
    rx: mpsc::Receiver<LaneHit>,
}

impl HitReceiver {
    /// Every pending hit, in arrival order.
    pub fn drain(&self) -> Vec<LaneHit> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_arrival_order() {
        let (tx, rx) = channel();
        tx.hit(2, 30.0).unwrap();
        tx.hit(0, 10.0).unwrap();
        tx.hit(1, 20.0).unwrap();
        let lanes: Vec<usize> = rx.drain().iter().map(|h| h.lane).collect();
        assert_eq!(lanes, vec![2, 0, 1]);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn producer_on_another_thread() {
        let (tx, rx) = channel();
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                tx.hit(i % 4, f64::from(i as u32)).unwrap();
            }
        });
        handle.join().unwrap();
        let hits = rx.drain();
        assert_eq!(hits.len(), 100);
        assert!(hits.windows(2).all(|w| w[0].time_ms < w[1].time_ms));
    }

    #[test]
    fn send_after_receiver_dropped() {
        let (tx, rx) = channel();
        drop(rx);
        assert_eq!(tx.hit(0, 0.0), Err(QueueClosed));
    }
}
