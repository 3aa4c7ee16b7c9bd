#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Courier Chase headless.

mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use courier_chase_core::{TicksPerCell, TraversabilityMask};
use courier_chase_session::{SessionConfig, Signal, SimulationSession};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Scenario selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Deliver between random waypoints.
    Courier,
    /// Chase a hider with a seeker.
    Pursuit,
}

/// Runs a Courier Chase simulation without a window.
#[derive(Debug, Parser)]
#[command(name = "courier-chase", version, about)]
struct Args {
    /// TOML file with session settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// ASCII map, `.` open and `#` blocked. Defaults to an open grid.
    #[arg(long)]
    map: Option<PathBuf>,
    /// Scenario to run.
    #[arg(long, value_enum, default_value_t = Mode::Courier)]
    mode: Mode,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 3_000)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Overrides the configured random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Courier speed slider position between 1 (slowest) and 15 (fastest).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=15))]
    speed: Option<u32>,
    /// Plans a detour whenever the courier is blocked.
    #[arg(long)]
    reroute: bool,
    /// Prints the final snapshot as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Courier Chase command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(slider) = args.speed {
        config.courier_speed = TicksPerCell::from_slider(slider).get();
    }

    let mask = match &args.map {
        Some(path) => config::load_map(path)?,
        None => TraversabilityMask::open(config.columns, config.rows),
    };
    (config.columns, config.rows) = mask.dimensions();

    let mut session = SimulationSession::new(config);
    let open_cells = session.load_mask(mask).context("failed to install map")?;
    info!(open_cells, mode = ?args.mode, "session ready");

    let dt = Duration::from_millis(args.tick_ms);
    match args.mode {
        Mode::Courier => run_courier(&mut session, args, dt)?,
        Mode::Pursuit => run_pursuit(&mut session, args, dt)?,
    }

    let snapshot = session.snapshot();
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("failed to encode snapshot")?
        );
    } else {
        for agent in &snapshot.agents {
            println!(
                "agent {} at ({}, {}) heading {:.2} rad, {:?}",
                agent.agent.get(),
                agent.cell.column(),
                agent.cell.row(),
                agent.heading_radians,
                agent.state
            );
        }
        println!(
            "tick {} | path length {} | speed {} ({})",
            snapshot.tick,
            snapshot.path_length,
            snapshot.courier_speed.get(),
            snapshot.speed_label
        );
        if let Some(outcome) = snapshot.outcome {
            println!("outcome {outcome:?}");
        }
    }
    Ok(())
}

fn run_courier(session: &mut SimulationSession, args: &Args, dt: Duration) -> Result<()> {
    let length = session.randomize().context("failed to plan a delivery")?;
    info!(length, "delivery planned");
    session.start().context("failed to start the courier")?;

    for _ in 0..args.ticks {
        for signal in session.tick(dt) {
            match signal {
                Signal::Idle { .. } => {
                    info!("delivery complete");
                    return Ok(());
                }
                Signal::Blocked { cell, .. } => {
                    warn!(?cell, "courier blocked");
                    if args.reroute && !session.reroute().context("failed to reroute")? {
                        warn!("no detour available");
                        return Ok(());
                    }
                }
                Signal::Caught { .. } | Signal::Stopped => {}
            }
        }
    }
    warn!(ticks = args.ticks, "tick budget exhausted before delivery");
    Ok(())
}

fn run_pursuit(session: &mut SimulationSession, args: &Args, dt: Duration) -> Result<()> {
    let placement = session
        .start_pursuit_mode()
        .context("failed to place seeker and hider")?;
    info!(seeker = ?placement.seeker, hider = ?placement.hider, "pursuit placed");

    for _ in 0..args.ticks {
        for signal in session.tick(dt) {
            match signal {
                Signal::Caught { elapsed } => {
                    info!(seconds = elapsed.as_secs_f32(), "hider caught");
                    return Ok(());
                }
                Signal::Blocked { agent, cell } => {
                    warn!(agent = agent.get(), ?cell, "pursuit agent blocked");
                }
                Signal::Idle { .. } | Signal::Stopped => {}
            }
        }
    }

    let _ = session
        .stop_pursuit_mode()
        .context("failed to stop pursuit")?;
    info!(ticks = args.ticks, "tick budget exhausted, pursuit stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_parse_with_defaults() {
        let args = Args::try_parse_from(["courier-chase"]).expect("defaults parse");
        assert_eq!(args.mode, Mode::Courier);
        assert_eq!(args.ticks, 3_000);
        assert!(args.config.is_none());
    }

    #[test]
    fn speed_slider_is_bounded() {
        assert!(Args::try_parse_from(["courier-chase", "--speed", "16"]).is_err());
        let args = Args::try_parse_from(["courier-chase", "--speed", "15", "--mode", "pursuit"])
            .expect("valid arguments");
        assert_eq!(args.speed, Some(15));
        assert_eq!(args.mode, Mode::Pursuit);
    }

    #[test]
    fn courier_run_completes_on_open_grid() {
        let args = Args::try_parse_from(["courier-chase", "--ticks", "20000", "--seed", "3"])
            .expect("valid arguments");
        let mut session = SimulationSession::new(SessionConfig {
            columns: 12,
            rows: 8,
            ..SessionConfig::default()
        });
        let _ = session
            .load_mask(TraversabilityMask::open(12, 8))
            .expect("dimensions match");

        run_courier(&mut session, &args, Duration::from_millis(16)).expect("run succeeds");

        let plan = session.courier_plan().expect("plan installed");
        let courier = session
            .agents()
            .iter()
            .next()
            .map(|agent| agent.cell)
            .expect("courier placed");
        assert_eq!(Some(&courier), plan.waypoints().last());
    }
}
