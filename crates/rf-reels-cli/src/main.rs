//! rf-reels — headless spin driver
//!
//! Usage:
//!   rf-reels                          - one spin with normal timing
//!   rf-reels --spins 10 --seed 7      - ten reproducible spins
//!   rf-reels --fast-stop-at 0.5       - press stop half a second into each spin
//!   rf-reels --config game.yaml --json

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use parking_lot::Mutex;
use serde::Serialize;

use rf_reels::{
    GameConfig, GameState, PathTextureProvider, SpinEvent, SpinOrchestrator, SpinStats,
    SpinTiming, SymbolSet, TextureTable, TimingProfile,
};

#[derive(Parser)]
#[command(name = "rf-reels", about = "Run headless reel spin sessions")]
struct Cli {
    /// Game config file (.json, .yaml or .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Timing profile (overrides the config file)
    #[arg(short, long, value_enum)]
    profile: Option<ProfileArg>,

    /// Number of spins to run
    #[arg(short, long, default_value_t = 1)]
    spins: u32,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Press stop this many seconds into each spin
    #[arg(long)]
    fast_stop_at: Option<f64>,

    /// Print the session report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Normal,
    Turbo,
    Instant,
}

impl From<ProfileArg> for TimingProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Normal => TimingProfile::Normal,
            ProfileArg::Turbo => TimingProfile::Turbo,
            ProfileArg::Instant => TimingProfile::Instant,
        }
    }
}

/// Outcome of one spin
#[derive(Debug, Serialize)]
struct SpinReport {
    spin: u32,
    started_at: f64,
    all_stopped_at: f64,
    fast_stop: bool,
    /// Symbol names per reel, top to bottom
    reels: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct SessionReport {
    config: GameConfig,
    spins: Vec<SpinReport>,
    stats: SpinStats,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if !(cli.fps > 0.0 && cli.fps.is_finite()) {
        bail!("--fps must be a positive number, got {}", cli.fps);
    }

    let config = build_config(&cli)?;
    let symbols = SymbolSet::classic();
    let textures = TextureTable::load(&PathTextureProvider, &symbols)
        .context("Failed to load symbol textures")?;
    let mut game = SpinOrchestrator::new(config.clone(), Arc::new(textures))
        .context("Failed to create reels")?;

    let all_stopped = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&all_stopped);
    game.subscribe(move |event| {
        log::debug!("{:?}", event);
        if let SpinEvent::AllStopped { at } = event {
            *sink.lock() = Some(*at);
        }
    });

    let mut spins = Vec::with_capacity(cli.spins as usize);
    for spin in 0..cli.spins {
        all_stopped.lock().take();
        let report = run_spin(&mut game, spin, &cli, &symbols, &all_stopped)?;
        log::info!(
            "Spin {} finished at t={:.3}: {:?}",
            spin,
            report.all_stopped_at,
            report.reels
        );
        spins.push(report);
    }

    let report = SessionReport {
        config,
        spins,
        stats: game.stats().clone(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(profile) = cli.profile {
        config.timing = SpinTiming::from_profile(profile.into());
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    config.validate().context("Invalid game config")?;
    Ok(config)
}

fn run_spin(
    game: &mut SpinOrchestrator<String>,
    spin: u32,
    cli: &Cli,
    symbols: &SymbolSet,
    all_stopped: &Arc<Mutex<Option<f64>>>,
) -> Result<SpinReport> {
    let frame = 1.0 / cli.fps;
    let timing = &game.config().timing;
    let budget = timing.min_spin_secs()
        + timing.total_stop_duration(game.reel_count(), true)
        + 10.0;

    if !game.press_button() {
        bail!("Spin {} could not start from {:?}", spin, game.state());
    }
    let started_at = game.clock();
    let mut fast_stop = false;

    while game.state() != GameState::Idle {
        if game.clock() - started_at > budget {
            bail!("Spin {} did not stop within {:.1}s", spin, budget);
        }
        if let Some(at) = cli.fast_stop_at {
            if !fast_stop && game.state() == GameState::Spinning && game.clock() - started_at >= at
            {
                fast_stop = game.press_button();
            }
        }
        game.advance(frame);
    }

    let reels = game
        .symbol_grid()
        .iter()
        .map(|column| {
            column
                .iter()
                .map(|&s| symbols.get(s).map_or_else(|| "?".to_string(), |d| d.name.clone()))
                .collect()
        })
        .collect();

    let stopped_at = *all_stopped.lock();
    Ok(SpinReport {
        spin,
        started_at,
        all_stopped_at: stopped_at.unwrap_or(game.clock()),
        fast_stop,
        reels,
    })
}

fn print_report(report: &SessionReport) {
    for spin in &report.spins {
        println!(
            "spin {:>3}  {:>8.3}s -> {:>8.3}s{}",
            spin.spin,
            spin.started_at,
            spin.all_stopped_at,
            if spin.fast_stop { "  (fast stop)" } else { "" }
        );
        let rows = spin.reels.first().map_or(0, |r| r.len());
        for row in 0..rows {
            let line: Vec<String> = spin
                .reels
                .iter()
                .map(|reel| format!("{:<8}", reel[row]))
                .collect();
            println!("    {}", line.join(" "));
        }
    }

    let stats = &report.stats;
    println!(
        "{} spins, {} manual stop(s), {} auto stop(s), {} reel stops, {} ignored request(s)",
        stats.spins_started,
        stats.manual_stops,
        stats.auto_stops,
        stats.reels_stopped,
        stats.ignored_requests
    );
}
