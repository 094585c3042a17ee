//! Play session: one chart, one input queue, one set of score/combo/gauge state.
//!
//! Each judgement from the engine is fanned out to the score accumulator,
//! combo tracker, life gauge and statistics, and reported to the caller as a
//! sequence of [`PlayEvent`]s.

use dtx_model::ChartTimeline;
use serde::{Deserialize, Serialize};

use crate::combo::{ComboChange, ComboTracker};
use crate::error::SessionError;
use crate::input_queue::HitReceiver;
use crate::judge_engine::JudgementEngine;
use crate::judge_stats::JudgeStats;
use crate::judgement::Judgement;
use crate::life_gauge::{
    DEFAULT_INITIAL_LIFE, GaugeChange, GaugeFailure, LifeGauge, MAX_LIFE, MIN_LIFE,
};
use crate::score::{ScoreAccumulator, ScoreChange};

/// Events emitted by a play session.
///
/// Per judgement: `JudgementMade`, `ScoreChanged`, `ComboChanged`, then
/// `GaugeChanged` while the gauge is live, then `Failed` once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayEvent {
    JudgementMade(Judgement),
    ScoreChanged(ScoreChange),
    ComboChanged(ComboChange),
    GaugeChanged(GaugeChange),
    Failed(GaugeFailure),
}

/// Summary of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayResult {
    pub total_notes: usize,
    pub score: u64,
    pub percentage: f64,
    pub max_combo: u32,
    pub life: f64,
    pub failed: bool,
    pub stats: JudgeStats,
}

pub struct PlaySessionBuilder {
    timeline: Option<ChartTimeline>,
    input: Option<HitReceiver>,
    initial_life: f64,
    input_start_ms: Option<f64>,
}

impl Default for PlaySessionBuilder {
    fn default() -> Self {
        Self {
            timeline: None,
            input: None,
            initial_life: DEFAULT_INITIAL_LIFE,
            input_start_ms: None,
        }
    }
}

impl PlaySessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(mut self, timeline: ChartTimeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    pub fn input(mut self, input: HitReceiver) -> Self {
        self.input = Some(input);
        self
    }

    pub fn initial_life(mut self, life: f64) -> Self {
        self.initial_life = life;
        self
    }

    /// Song time from which lane hits are accepted. `None` accepts from the start.
    pub fn input_start_ms(mut self, start: Option<f64>) -> Self {
        self.input_start_ms = start;
        self
    }

    pub fn build(self) -> Result<PlaySession, SessionError> {
        let timeline = self.timeline.ok_or(SessionError::MissingChart)?;
        let input = self.input.ok_or(SessionError::MissingInput)?;
        if !(MIN_LIFE..=MAX_LIFE).contains(&self.initial_life) {
            return Err(SessionError::InvalidInitialLife(self.initial_life));
        }

        let mut engine = JudgementEngine::new(&timeline);
        engine.set_processing_enabled(self.input_start_ms.is_none());
        let score = ScoreAccumulator::new(timeline.len());
        log::debug!(
            "Play session: {} notes, budget {} per note, initial life {}",
            timeline.len(),
            score.per_note_budget(),
            self.initial_life
        );

        Ok(PlaySession {
            timeline,
            input,
            engine,
            score,
            combo: ComboTracker::new(),
            gauge: LifeGauge::new(self.initial_life),
            stats: JudgeStats::default(),
            initial_life: self.initial_life,
            input_start_ms: self.input_start_ms,
        })
    }
}

pub struct PlaySession {
    timeline: ChartTimeline,
    input: HitReceiver,
    engine: JudgementEngine,
    score: ScoreAccumulator,
    combo: ComboTracker,
    gauge: LifeGauge,
    stats: JudgeStats,
    initial_life: f64,
    input_start_ms: Option<f64>,
}

impl PlaySession {
    pub fn builder() -> PlaySessionBuilder {
        PlaySessionBuilder::new()
    }

    /// Judge a single lane hit directly, bypassing the input queue.
    pub fn hit(&mut self, lane: usize, time_ms: f64) -> Vec<PlayEvent> {
        let judgements = self.engine.hit(&self.timeline, lane, time_ms);
        self.apply_all(judgements)
    }

    /// Time out expired notes.
    pub fn advance(&mut self, now_ms: f64) -> Vec<PlayEvent> {
        let judgements = self.engine.advance(&self.timeline, now_ms);
        self.apply_all(judgements)
    }

    /// One frame of the play loop: enable input once its start time is reached,
    /// process every queued hit in arrival order, then time out expired notes.
    /// Hits stamped before the input start time are dropped whenever they arrive.
    pub fn frame(&mut self, now_ms: f64) -> Vec<PlayEvent> {
        if !self.engine.processing_enabled() && self.input_start_ms.is_none_or(|s| now_ms >= s) {
            log::debug!("Input processing enabled at {now_ms:.3}ms");
            self.engine.set_processing_enabled(true);
        }

        let mut events = Vec::new();
        for hit in self.input.drain() {
            if self.input_start_ms.is_some_and(|s| hit.time_ms < s) {
                log::debug!(
                    "Dropping lane {} hit at {:.3}ms before input start",
                    hit.lane,
                    hit.time_ms
                );
                continue;
            }
            events.extend(self.hit(hit.lane, hit.time_ms));
        }
        events.extend(self.advance(now_ms));
        events
    }

    fn apply_all(&mut self, judgements: Vec<Judgement>) -> Vec<PlayEvent> {
        let mut events = Vec::with_capacity(judgements.len() * 4);
        for judgement in judgements {
            self.apply(judgement, &mut events);
        }
        events
    }

    fn apply(&mut self, judgement: Judgement, events: &mut Vec<PlayEvent>) {
        let score = self.score.apply(&judgement);
        let combo = self.combo.apply(&judgement);
        let gauge = self.gauge.apply(&judgement);
        self.stats.record(&judgement);

        events.push(PlayEvent::JudgementMade(judgement));
        events.push(PlayEvent::ScoreChanged(score));
        events.push(PlayEvent::ComboChanged(combo));
        if let Some(change) = gauge {
            let failure = change.failure;
            events.push(PlayEvent::GaugeChanged(change));
            if let Some(failure) = failure {
                log::info!(
                    "Gauge failed at note {} ({}), life {:.1}",
                    failure.judgement.note_id,
                    failure.judgement.tier,
                    failure.final_life
                );
                events.push(PlayEvent::Failed(failure));
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_complete()
    }

    pub fn result(&self) -> PlayResult {
        PlayResult {
            total_notes: self.timeline.len(),
            score: self.score.current(),
            percentage: self.score.percentage(),
            max_combo: self.combo.max(),
            life: self.gauge.value(),
            failed: self.gauge.has_failed(),
            stats: self.stats.clone(),
        }
    }

    /// Back to the initial state. Queued hits are discarded.
    pub fn reset(&mut self) {
        self.input.drain();
        self.engine.reset();
        self.engine.set_processing_enabled(self.input_start_ms.is_none());
        self.score.reset();
        self.combo.reset();
        self.gauge.reset(self.initial_life);
        self.stats = JudgeStats::default();
    }

    pub fn timeline(&self) -> &ChartTimeline {
        &self.timeline
    }

    pub fn engine(&self) -> &JudgementEngine {
        &self.engine
    }

    pub fn score(&self) -> &ScoreAccumulator {
        &self.score
    }

    pub fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    pub fn gauge(&self) -> &LifeGauge {
        &self.gauge
    }

    pub fn stats(&self) -> &JudgeStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_queue::{self, HitSender};
    use crate::judgement::JudgementKind;
    use crate::tier::JudgeTier;
    use dtx_model::{ChartBuilder, TempoMap};

    /// `count` notes on lane 0, one every 500 ms starting at 2000 ms.
    fn session(count: u32) -> (PlaySession, HitSender) {
        session_with(count, |b| b)
    }

    fn session_with(
        count: u32,
        configure: impl FnOnce(PlaySessionBuilder) -> PlaySessionBuilder,
    ) -> (PlaySession, HitSender) {
        let mut builder = ChartBuilder::new(TempoMap::new(120.0).unwrap());
        for i in 0..count {
            builder = builder.note(0, 1 + i / 4, (i % 4) * 48);
        }
        let timeline = ChartTimeline::new(builder.build().unwrap());
        let (tx, rx) = input_queue::channel();
        let session = configure(PlaySession::builder().chart(timeline).input(rx))
            .build()
            .unwrap();
        (session, tx)
    }

    // -- Builder --

    #[test]
    fn builder_rejects_missing_parts() {
        let (_tx, rx) = input_queue::channel();
        assert_eq!(
            PlaySession::builder().input(rx).build().err(),
            Some(SessionError::MissingChart)
        );

        let timeline = ChartTimeline::new(
            ChartBuilder::new(TempoMap::new(120.0).unwrap())
                .build()
                .unwrap(),
        );
        assert_eq!(
            PlaySession::builder().chart(timeline).build().err(),
            Some(SessionError::MissingInput)
        );
    }

    #[test]
    fn builder_rejects_bad_life() {
        for life in [-0.1, 100.5, f64::NAN] {
            let (_tx, rx) = input_queue::channel();
            let timeline = ChartTimeline::new(
                ChartBuilder::new(TempoMap::new(120.0).unwrap())
                    .build()
                    .unwrap(),
            );
            let result = PlaySession::builder()
                .chart(timeline)
                .input(rx)
                .initial_life(life)
                .build();
            assert!(matches!(result, Err(SessionError::InvalidInitialLife(_))));
        }
    }

    // -- Event ordering --

    #[test]
    fn hit_event_sequence() {
        let (mut session, _tx) = session(2);
        let events = session.hit(0, 2010.0);
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[0],
            PlayEvent::JudgementMade(Judgement {
                tier: JudgeTier::Exact,
                ..
            })
        ));
        assert!(matches!(events[1], PlayEvent::ScoreChanged(_)));
        assert!(matches!(events[2], PlayEvent::ComboChanged(_)));
        assert!(matches!(events[3], PlayEvent::GaugeChanged(_)));
    }

    #[test]
    fn failure_is_emitted_once_and_scoring_continues() {
        let (mut session, _tx) = session_with(3, |b| b.initial_life(4.0));
        let first = session.hit(0, 2000.0 + 120.0); // Poor: 4.0 -> 2.5
        assert!(!first.iter().any(|e| matches!(e, PlayEvent::Failed(_))));

        let second = session.advance(10_000.0);
        let failed: Vec<&PlayEvent> = second
            .iter()
            .filter(|e| matches!(e, PlayEvent::Failed(_)))
            .collect();
        assert_eq!(failed.len(), 1);
        // second judgement fails the gauge, the third has no gauge event
        let gauge_events = second
            .iter()
            .filter(|e| matches!(e, PlayEvent::GaugeChanged(_)))
            .count();
        assert_eq!(gauge_events, 1);
        let score_events = second
            .iter()
            .filter(|e| matches!(e, PlayEvent::ScoreChanged(_)))
            .count();
        assert_eq!(score_events, 2);
        assert!(session.gauge().has_failed());
        assert_eq!(session.gauge().value(), 0.0);
    }

    // -- Frame loop --

    #[test]
    fn frame_drains_queue_before_timeouts() {
        let (mut session, tx) = session(1);
        // hit inside the window but processed on a frame after the window closed
        tx.hit(0, 2150.0).unwrap();
        let events = session.frame(2300.0);
        let judgement = events.iter().find_map(|e| match e {
            PlayEvent::JudgementMade(j) => Some(*j),
            _ => None,
        });
        let judgement = judgement.unwrap();
        assert_eq!(judgement.kind, JudgementKind::Hit);
        assert_eq!(judgement.tier, JudgeTier::Poor);
        assert!(session.is_finished());
    }

    #[test]
    fn input_start_gates_hits() {
        let (mut session, tx) = session_with(2, |b| b.input_start_ms(Some(2400.0)));
        assert!(!session.engine().processing_enabled());

        tx.hit(0, 2000.0).unwrap();
        assert!(session.frame(2100.0).is_empty());

        // note 0 times out even though input is still closed
        let timeout = session.frame(2250.0);
        assert!(matches!(
            timeout[0],
            PlayEvent::JudgementMade(Judgement {
                kind: JudgementKind::Timeout,
                ..
            })
        ));

        tx.hit(0, 2500.0).unwrap();
        let events = session.frame(2500.0);
        assert!(session.engine().processing_enabled());
        assert!(matches!(
            events[0],
            PlayEvent::JudgementMade(Judgement {
                tier: JudgeTier::Exact,
                ..
            })
        ));
    }

    #[test]
    fn input_start_uses_hit_time_not_frame_time() {
        // notes at 2000, 2500, 3000
        let (mut session, tx) = session_with(3, |b| b.input_start_ms(Some(3000.0)));

        // stamped while input was closed, drained after it opened
        tx.hit(0, 2995.0).unwrap();
        let events = session.frame(3006.0);
        assert!(session.engine().processing_enabled());
        assert!(!events.iter().any(|e| matches!(
            e,
            PlayEvent::JudgementMade(Judgement {
                kind: JudgementKind::Hit,
                ..
            })
        )));
        assert!(!session.engine().is_judged(2));

        tx.hit(0, 3010.0).unwrap();
        let events = session.frame(3020.0);
        assert!(matches!(
            events[0],
            PlayEvent::JudgementMade(Judgement {
                note_id: 2,
                tier: JudgeTier::Exact,
                ..
            })
        ));
    }

    #[test]
    fn events_serialize_as_json() {
        let (mut session, _tx) = session(1);
        let events = session.hit(0, 2030.0);
        let json = serde_json::to_string(&events).unwrap();
        assert!(json.contains("JudgementMade"));
        assert!(json.contains("\"tier\":\"Great\""));
        let parsed: Vec<PlayEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), events.len());
        assert_eq!(parsed[0], events[0]);
    }

    // -- Whole-session scenarios --

    #[test]
    fn single_note_perfect_is_max_score() {
        let (mut session, tx) = session(1);
        tx.hit(0, 2000.0).unwrap();
        session.frame(2000.0);
        let result = session.result();
        assert_eq!(result.score, crate::MAX_SCORE);
        assert!((result.percentage - 100.0).abs() < 1e-9);
        assert_eq!(result.max_combo, 1);
    }

    #[test]
    fn reset_restores_initial_state() {
        let (mut session, tx) = session_with(2, |b| b.initial_life(30.0));
        session.hit(0, 2000.0);
        session.advance(10_000.0);
        tx.hit(0, 2500.0).unwrap();
        session.reset();

        assert!(!session.is_finished());
        assert_eq!(session.score().current(), 0);
        assert_eq!(session.combo().max(), 0);
        assert!((session.gauge().value() - 30.0).abs() < 1e-9);
        assert_eq!(session.stats().judged(), 0);
        // the queued hit was discarded by reset
        assert!(session.frame(2100.0).is_empty());
    }
}
