// ReplayData: recorded lane hits with an optional packed form.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use dtx_config::PlayConfig;
use dtx_model::Chart;

use crate::hit_log::HitLog;

/// Bytes per packed hit: lane (u16 LE) + time (f64 LE).
const PACKED_HIT_LEN: usize = 10;

/// Recorded input for one play.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayData {
    /// Player name.
    #[serde(default)]
    pub player: String,
    /// Free-form chart identifier (title or hash).
    #[serde(default)]
    pub chart: String,
    /// Hits in time order (populated after `validate()`).
    #[serde(default)]
    pub hits: Vec<HitLog>,
    /// Packed hits (Base64 URL-safe encoded GZIP).
    /// Populated by `shrink()`, cleared by `validate()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packed_hits: Option<String>,
    /// Play configuration the replay was recorded with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PlayConfig>,
}

impl ReplayData {
    pub fn new(hits: Vec<HitLog>) -> Self {
        let mut replay = Self {
            hits,
            ..Default::default()
        };
        replay.validate();
        replay
    }

    /// One hit per note, exactly on time.
    pub fn autoplay(chart: &Chart) -> Self {
        let hits = chart
            .notes()
            .iter()
            .map(|n| HitLog::new(n.time_ms, n.lane))
            .collect();
        Self {
            player: "AUTO".to_string(),
            hits,
            ..Default::default()
        }
    }

    /// Pack `hits` into `packed_hits`. Left as is when a lane does not fit in u16.
    pub fn shrink(&mut self) {
        let mut raw = Vec::with_capacity(self.hits.len() * PACKED_HIT_LEN);
        for hit in &self.hits {
            let Ok(lane) = u16::try_from(hit.lane) else {
                log::warn!("Lane {} too large to pack, keeping plain hit list", hit.lane);
                return;
            };
            raw.extend_from_slice(&lane.to_le_bytes());
            raw.extend_from_slice(&hit.time_ms.to_le_bytes());
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        if encoder.write_all(&raw).is_err() {
            return;
        }
        if let Ok(compressed) = encoder.finish() {
            self.packed_hits = Some(URL_SAFE.encode(&compressed));
            self.hits.clear();
        }
    }

    /// Unpack `packed_hits` if present, drop non-finite timestamps and sort by time.
    ///
    /// Returns `true` if any hits remain.
    pub fn validate(&mut self) -> bool {
        if let Some(packed) = self.packed_hits.take() {
            match unpack(&packed) {
                Some(hits) => self.hits = hits,
                None => log::warn!("Discarding unreadable packed hit data"),
            }
        }

        let before = self.hits.len();
        self.hits.retain(HitLog::is_valid);
        if self.hits.len() != before {
            log::warn!("Dropped {} hits with invalid timestamps", before - self.hits.len());
        }
        // stable: simultaneous hits keep recorded order
        self.hits.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        !self.hits.is_empty()
    }

    /// Read a plain JSON replay file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut replay: ReplayData = serde_json::from_str(&data)?;
        replay.validate();
        Ok(replay)
    }

    /// Write a plain JSON replay file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn unpack(packed: &str) -> Option<Vec<HitLog>> {
    let compressed = URL_SAFE.decode(packed).ok()?;
    let mut raw = Vec::new();
    GzDecoder::new(&compressed[..]).read_to_end(&mut raw).ok()?;

    let hits = raw
        .chunks_exact(PACKED_HIT_LEN)
        .map(|chunk| {
            let lane = u16::from_le_bytes([chunk[0], chunk[1]]);
            let mut time = [0u8; 8];
            time.copy_from_slice(&chunk[2..]);
            HitLog::new(f64::from_le_bytes(time), usize::from(lane))
        })
        .collect();
    Some(hits)
}

/// Read a GZIP-compressed JSON replay file.
pub fn read_compressed(path: &Path) -> Result<ReplayData> {
    let file = std::fs::File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut replay: ReplayData = serde_json::from_reader(decoder)?;
    replay.validate();
    Ok(replay)
}

/// Write a GZIP-compressed JSON replay file with packed hits.
pub fn write_compressed(replay: &mut ReplayData, path: &Path) -> Result<()> {
    replay.shrink();
    let file = std::fs::File::create(path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    serde_json::to_writer(&mut encoder, replay)?;
    encoder.finish()?;
    Ok(())
}
