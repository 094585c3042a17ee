use serde::{Deserialize, Serialize};

use crate::MAX_LANES;
use crate::error::ChartError;
use crate::note::{BgCue, CuePosition, Note, NotePosition};
use crate::tempo::TempoMap;

/// Parser output: lanes and bar/tick positions already resolved, times not yet derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSource {
    pub tempo: TempoMap,
    #[serde(default)]
    pub notes: Vec<NotePosition>,
    #[serde(default)]
    pub cues: Vec<CuePosition>,
}

impl ChartSource {
    pub fn finalize(self) -> Result<Chart, ChartError> {
        Chart::finalize(self)
    }
}

/// Fluent construction of a [`ChartSource`].
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    source: ChartSource,
}

impl ChartBuilder {
    pub fn new(tempo: TempoMap) -> Self {
        Self {
            source: ChartSource {
                tempo,
                notes: Vec::new(),
                cues: Vec::new(),
            },
        }
    }

    pub fn note(self, lane: usize, bar: u32, tick: u32) -> Self {
        self.note_at(NotePosition::new(lane, bar, tick))
    }

    pub fn note_at(mut self, position: NotePosition) -> Self {
        self.source.notes.push(position);
        self
    }

    pub fn cue(mut self, position: CuePosition) -> Self {
        self.source.cues.push(position);
        self
    }

    pub fn build(self) -> Result<Chart, ChartError> {
        Chart::finalize(self.source)
    }
}

/// A finalized, immutable chart. Notes are sorted by time and ids match indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    tempo: TempoMap,
    notes: Vec<Note>,
    cues: Vec<BgCue>,
    lane_count: usize,
}

impl Chart {
    fn finalize(source: ChartSource) -> Result<Self, ChartError> {
        let ChartSource {
            tempo,
            notes,
            cues,
        } = source;
        tempo.validate()?;

        let mut resolved = notes
            .iter()
            .map(|pos| {
                if pos.lane >= MAX_LANES {
                    return Err(ChartError::LaneOutOfRange {
                        bar: pos.bar,
                        lane: pos.lane,
                        limit: MAX_LANES,
                    });
                }
                Ok(Note {
                    id: 0,
                    lane: pos.lane,
                    time_ms: tempo.time_ms(pos.bar, pos.tick)?,
                    bar: pos.bar,
                    tick: pos.tick,
                    channel: pos.channel,
                    value: pos.value,
                })
            })
            .collect::<Result<Vec<_>, ChartError>>()?;
        // sort_by is stable: simultaneous notes keep parse order
        resolved.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        for (id, note) in resolved.iter_mut().enumerate() {
            note.id = id;
        }

        let mut resolved_cues = cues
            .iter()
            .map(|pos| {
                Ok(BgCue {
                    time_ms: tempo.time_ms(pos.bar, pos.tick)?,
                    bar: pos.bar,
                    tick: pos.tick,
                    channel: pos.channel,
                    value: pos.value,
                })
            })
            .collect::<Result<Vec<_>, ChartError>>()?;
        resolved_cues.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));

        let lane_count = resolved.iter().map(|n| n.lane + 1).max().unwrap_or(0);
        log::debug!(
            "Chart finalized: {} notes, {} cues, {} lanes",
            resolved.len(),
            resolved_cues.len(),
            lane_count
        );

        Ok(Self {
            tempo,
            notes: resolved,
            cues: resolved_cues,
            lane_count,
        })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn cues(&self) -> &[BgCue] {
        &self.cues
    }

    pub fn tempo(&self) -> &TempoMap {
        &self.tempo
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn last_note_time_ms(&self) -> Option<f64> {
        self.notes.last().map(|n| n.time_ms)
    }
}
