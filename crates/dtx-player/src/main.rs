// dtx-player: headless judgement run of a chart against a replay.
//
// Loads a finalized-chart source, steps a play session frame by frame and
// prints the result as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;

use dtx_config::PlayConfig;
use dtx_model::ChartSource;
use dtx_replay::{ReplayData, ReplayOutcome, ReplayRunner};
use dtx_rule::{PlayEvent, PlayResult};

#[derive(Parser, Debug)]
#[command(name = "dtx-player", about = "Headless DTX judgement runner")]
struct Args {
    /// Path to a chart source JSON file.
    #[arg(long)]
    chart: PathBuf,

    /// Path to a replay file (plain JSON, or GZIP JSON with a .gz extension).
    #[arg(long, conflicts_with = "autoplay")]
    replay: Option<PathBuf>,

    /// Hit every note exactly on time instead of reading a replay.
    #[arg(long)]
    autoplay: bool,

    /// Path to play config JSON file.
    #[arg(long, default_value = "play_config.json")]
    config: PathBuf,

    /// Override the simulation frame interval (ms).
    #[arg(long, env = "DTX_FRAME_MS")]
    frame_ms: Option<f64>,

    /// Include the full event stream in the output.
    #[arg(long)]
    events: bool,

    /// Log judgement details.
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<'a> {
    result: &'a PlayResult,
    frames: usize,
    end_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<&'a [PlayEvent]>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    info!("dtx-player starting");

    let data = std::fs::read_to_string(&args.chart)
        .with_context(|| format!("reading chart {}", args.chart.display()))?;
    let source: ChartSource = serde_json::from_str(&data)
        .with_context(|| format!("parsing chart {}", args.chart.display()))?;
    let chart = Arc::new(source.finalize()?);
    info!(
        "Loaded chart: {} notes on {} lanes",
        chart.note_count(),
        chart.lane_count()
    );

    let replay = match (&args.replay, args.autoplay) {
        (Some(path), _) => load_replay(path)?,
        (None, true) => ReplayData::autoplay(&chart),
        (None, false) => bail!("either --replay or --autoplay is required"),
    };

    let mut config = load_config(&args.config, replay.config.as_ref());
    if let Some(frame_ms) = args.frame_ms {
        config.frame_interval_ms = frame_ms;
    }

    let outcome = ReplayRunner::new(config).run(chart, &replay)?;
    print_outcome(&outcome, args.events)?;
    Ok(())
}

/// Config file, falling back to the replay's recorded config, then defaults.
fn load_config(path: &Path, recorded: Option<&PlayConfig>) -> PlayConfig {
    match PlayConfig::read(path) {
        Ok(c) => {
            info!("Loaded play config from {}", path.display());
            return c;
        }
        Err(_) if !path.exists() => info!("Config not found at {}", path.display()),
        Err(e) => warn!("Failed to load config {}: {e:#}", path.display()),
    }
    match recorded {
        Some(c) => {
            info!("Using the replay's recorded config");
            c.clone()
        }
        None => {
            info!("Using default play config");
            PlayConfig::default()
        }
    }
}

fn load_replay(path: &Path) -> Result<ReplayData> {
    let replay = if path.extension().is_some_and(|ext| ext == "gz") {
        dtx_replay::read_compressed(path)
    } else {
        ReplayData::read(path)
    }
    .with_context(|| format!("reading replay {}", path.display()))?;
    info!("Loaded replay: {} hits", replay.hits.len());
    Ok(replay)
}

fn print_outcome(outcome: &ReplayOutcome, with_events: bool) -> Result<()> {
    let output = Output {
        result: &outcome.result,
        frames: outcome.frames,
        end_ms: outcome.end_ms,
        events: with_events.then_some(outcome.events.as_slice()),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
