// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Control Station - headless simulator runner
//!
//! Starts the station, streams telemetry, state changes and alerts to the
//! log (or stdout as JSON lines) until Ctrl+C or the requested duration.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use control_station::core::{Event, EventPayload};
use control_station::{AlertSeverity, Config, ControlStation, VERSION};

/// Control Station - control-room operator simulator
#[derive(Parser, Debug)]
#[command(name = "control-station")]
#[command(version = VERSION)]
#[command(about = "Deterministic telemetry simulator with threshold alerting")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Override the telemetry tick interval (ms)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Override the maximum temperature (°C)
    #[arg(long)]
    max_temp: Option<f64>,

    /// Override the maximum pressure (bar)
    #[arg(long)]
    max_pressure: Option<f64>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    duration: Option<u64>,

    /// Do not start the station automatically
    #[arg(long)]
    no_autostart: bool,

    /// Print events to stdout as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    if let Some(tick_ms) = args.tick_ms {
        config.telemetry.tick_interval_ms = tick_ms;
    }

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(!args.json)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{} v{}", control_station::NAME, VERSION);
    info!("Configuration loaded from {:?}", config_path);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, args))
}

async fn run(config: Config, args: Args) -> Result<()> {
    let station = ControlStation::new(config)?;
    let mut events = station.subscribe_events();

    if args.max_temp.is_some() || args.max_pressure.is_some() {
        let current = station.thresholds();
        let max_temp = args.max_temp.unwrap_or(current.max_temperature);
        let max_pressure = args.max_pressure.unwrap_or(current.max_pressure);
        if let Err(e) = station.apply_configuration(max_temp, max_pressure) {
            warn!("Keeping previous thresholds: {}", e);
        }
    }

    if !args.no_autostart {
        station.start()?;
    }

    info!(
        "Running with MaxTemp={}°C MaxPress={} bar, tick {} ms",
        station.thresholds().max_temperature,
        station.thresholds().max_pressure,
        station.config().telemetry.tick_interval_ms
    );
    info!("   Press Ctrl+C to shutdown");

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => report(&event, args.json)?,
                Err(RecvError::Lagged(skipped)) => warn!("Dropped {} events", skipped),
                Err(RecvError::Closed) => break,
            },
            _ = &mut deadline => {
                info!("Requested duration elapsed");
                break;
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Shutdown signal received, cleaning up...");
                break;
            }
        }
    }

    if station.can_stop() {
        station.stop()?;
    } else if station.can_reset() {
        station.reset()?;
    }

    let status = station.status();
    info!(
        "Final state {} with {} alert(s) logged",
        status.state, status.alert_count
    );
    Ok(())
}

fn report(event: &Event, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match &event.payload {
        EventPayload::Telemetry(sample) => debug!(
            "Telemetry #{}: {:.1}°C {:.2} bar {:.1} MW",
            sample.tick, sample.temperature, sample.pressure, sample.power_output
        ),
        EventPayload::StateChanged(state) => info!("State -> {}", state),
        EventPayload::Alert(alert) => match alert.severity {
            AlertSeverity::Info => info!("{}", alert),
            AlertSeverity::Warning => warn!("{}", alert),
            AlertSeverity::Critical => error!("{}", alert),
        },
    }
    Ok(())
}
