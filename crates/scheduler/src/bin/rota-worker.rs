//! rota-worker — headless scheduler daemon.
//!
//! Loads configuration from `ROTA_*` environment variables, resumes the
//! latest snapshot if one exists, runs the scheduler until interrupted, and
//! shuts down gracefully (final snapshot included).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rota_core::config::{load_dotenv, SchedulerConfig};
use rota_scheduler::Scheduler;

/// Cyclic turn-based command scheduler daemon.
#[derive(Parser, Debug)]
#[command(name = "rota-worker", version, about)]
struct Cli {
    /// Data directory for snapshots (overrides ROTA_DATA_DIR).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Turn duration in seconds (overrides ROTA_TURN_SECONDS).
    #[arg(long)]
    turn_seconds: Option<u64>,

    /// Start from a fresh state, ignoring any existing snapshot.
    #[arg(long, default_value_t = false)]
    fresh: bool,

    /// Seconds between visualization dumps to the log (0 = never).
    #[arg(long, env = "ROTA_STATUS_INTERVAL", default_value_t = 60)]
    status_interval: u64,
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut config = SchedulerConfig::from_env();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(turn_seconds) = cli.turn_seconds {
        config.turn_duration_seconds = turn_seconds;
    }
    config.log_summary();

    let scheduler = Scheduler::new(config).context("failed to create scheduler")?;

    if !cli.fresh {
        match scheduler.resume_latest() {
            Ok(true) => info!("resumed from latest snapshot"),
            Ok(false) => info!("no snapshot found, starting fresh"),
            Err(e) => warn!(error = %e, "snapshot resume failed, starting fresh"),
        }
    }

    scheduler.start();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("interrupt received, shutting down");
            running.store(false, Ordering::SeqCst);
        })
        .context("failed to install signal handler")?;
    }

    let mut since_status = 0u64;
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_secs(1));
        since_status += 1;
        if cli.status_interval > 0 && since_status >= cli.status_interval {
            since_status = 0;
            for line in scheduler.get_visualization().lines() {
                info!("{line}");
            }
        }
    }

    scheduler.stop();
    Ok(())
}
