//! plant-sim entry point: CLI wiring and config-driven simulation runs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::info;

use plant_sim::config::PlantConfig;
use plant_sim::io::export::export_csv;
use plant_sim::logging;
use plant_sim::sim::clock::{IntervalSource, ManualClock};
use plant_sim::sim::engine::PlantSimulation;
use plant_sim::sim::kpi::SessionSummary;
use plant_sim::sim::regulatory::Jurisdiction;
use plant_sim::sim::scheduler;
use plant_sim::sim::snapshot::PlantSnapshot;
use plant_sim::sim::types::ChartPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Power-plant simulator: unit readings, CO2 credits and compliance figures.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Load plant configuration from a TOML file
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Use a built-in preset (kvarken, clean_transition, peak_diesel)
    #[arg(long)]
    preset: Option<String>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the reporting jurisdiction (eu, us, china)
    #[arg(long)]
    jurisdiction: Option<Jurisdiction>,

    /// Chart period selected for display and export
    #[arg(long)]
    chart: Option<ChartPeriod>,

    /// Number of ticks to run
    #[arg(short = 'n', long, default_value_t = 30)]
    ticks: u64,

    /// Tick on the wall clock instead of stepping; Ctrl-C stops early
    #[arg(long, default_value_t = false)]
    realtime: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Export the selected history series to CSV
    #[arg(long)]
    history_out: Option<PathBuf>,

    /// Default log filter when neither PLANT_SIM_LOG nor RUST_LOG is set
    #[arg(long, env = "PLANT_SIM_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn load_config(args: &Args) -> Result<PlantConfig> {
    let mut config = match (&args.config, &args.preset) {
        (Some(path), _) => {
            PlantConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        (None, Some(name)) => PlantConfig::from_preset(name)?,
        (None, None) => PlantConfig::kvarken(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(jurisdiction) = args.jurisdiction {
        config.regulatory.jurisdiction = jurisdiction;
    }
    if let Some(period) = args.chart {
        config.simulation.chart_period = period;
    }
    Ok(config)
}

fn print_snapshot(snapshot: &PlantSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{snapshot}\n"),
        OutputFormat::Json => println!("{}", serde_json::to_string(snapshot)?),
    }
    Ok(())
}

fn print_summary(summary: &SessionSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{summary}"),
        OutputFormat::Json => println!("{}", serde_json::to_string(summary)?),
    }
    Ok(())
}

/// Steps a manual clock; simulated time advances without waiting.
fn run_stepped(
    mut sim: PlantSimulation,
    config: &PlantConfig,
    ticks: u64,
    format: OutputFormat,
) -> Result<(SessionSummary, PlantSnapshot)> {
    let interval_secs = config.simulation.tick_interval_secs;
    let mut clock = ManualClock::new(Utc::now(), interval_secs, Some(ticks));
    let mut summary = SessionSummary::default();
    while let Some(tick) = clock.tick() {
        match sim.tick(&tick) {
            Ok(report) => {
                match format {
                    OutputFormat::Text => println!("{report}"),
                    OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
                }
                summary.record(&report);
            }
            Err(_) => summary.record_skipped(),
        }
    }
    let snapshot = sim.snapshot();
    print_snapshot(&snapshot, format)?;
    Ok((summary, snapshot))
}

/// Runs the tokio scheduler on the wall clock until the tick budget is used
/// or Ctrl-C arrives.
async fn run_realtime(
    sim: PlantSimulation,
    config: &PlantConfig,
    ticks: u64,
    format: OutputFormat,
) -> Result<(SessionSummary, PlantSnapshot)> {
    let period = Duration::from_secs_f64(config.simulation.tick_interval_secs);
    let handle = scheduler::spawn(sim, IntervalSource::new(period, Some(ticks)));
    let mut rx = handle.subscribe();
    info!(?period, ticks, "real-time scheduler started");

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("received ctrl_c; shutting down");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = Arc::clone(&rx.borrow_and_update());
                print_snapshot(&snapshot, format)?;
            }
        }
    }

    let summary = handle.shutdown().await.context("scheduler task failed")?;
    let snapshot = PlantSnapshot::clone(&rx.borrow());
    Ok((summary, snapshot))
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_level)?;

    let config = load_config(&args)?;
    info!(
        units = config.units.len(),
        jurisdiction = %config.regulatory.jurisdiction,
        source = ?config.history.source,
        seed = config.simulation.seed,
        "plant configured"
    );
    let sim = PlantSimulation::from_config(&config, Utc::now())?;

    let (summary, snapshot) = if args.realtime {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("building tokio runtime")?;
        runtime.block_on(run_realtime(sim, &config, args.ticks, args.format))?
    } else {
        run_stepped(sim, &config, args.ticks, args.format)?
    };
    print_summary(&summary, args.format)?;

    if let Some(path) = &args.history_out {
        let series = snapshot.selected_series();
        export_csv(series, path).with_context(|| format!("writing {}", path.display()))?;
        info!(
            path = %path.display(),
            points = series.len(),
            period = ?snapshot.chart_period,
            "history exported"
        );
    }

    Ok(())
}
