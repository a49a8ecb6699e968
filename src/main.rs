//! ChidraNav - gap-seeking drive loop
//!
//! Loads configuration, creates the configured device and runs the
//! navigator until it halts.
//!
//! Configuration lookup:
//! - `chidra-nav --config <path>`
//! - `chidra.toml` in the working directory
//! - built-in defaults (mock device)

use chidra_nav::devices::create_device;
use chidra_nav::{Error, HaltReason, NavConfig, Navigator, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const DEFAULT_CONFIG: &str = "chidra.toml";

/// Gap-seeking navigation for a sweeping range sensor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the cycle budget
    #[arg(long)]
    max_cycles: Option<u32>,

    /// Override the mock device's random seed (0 = random)
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(args: &Args) -> Result<(NavConfig, String)> {
    let (mut config, source) = match &args.config {
        Some(path) => (NavConfig::load(path)?, path.display().to_string()),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            (NavConfig::load(DEFAULT_CONFIG)?, DEFAULT_CONFIG.to_string())
        }
        None => (NavConfig::default(), "defaults".to_string()),
    };

    if let Some(max_cycles) = args.max_cycles {
        config.navigation.max_cycles = max_cycles;
    }
    if let Some(seed) = args.seed {
        config.device.simulation.random_seed = seed;
    }
    config.validate()?;
    Ok((config, source))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, source) = load_config(&args)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("ChidraNav v{} starting", env!("CARGO_PKG_VERSION"));
    log::info!("Using config: {}", source);
    log::info!(
        "Device: {} ({})",
        config.device.name,
        config.device.device_type
    );
    log::info!(
        "Sweep step {:.2}° over {:.0}°..{:.0}°, {} sample(s) per step",
        config.scan_increment(),
        config.navigation.start_angle,
        config.navigation.end_angle,
        config.navigation.samples_per_step
    );

    let device = create_device(&config.device)?;

    // Cleared by Ctrl-C; the navigator checks it between cycles
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal, halting after this cycle");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Io(std::io::Error::other(format!("Error setting Ctrl-C handler: {}", e))))?;

    let mut navigator = Navigator::new(config.navigator_config(), device.actuator, device.sensor)
        .with_running_flag(running);

    let outcome = navigator.run()?;
    match outcome.reason {
        HaltReason::NoViableGap => log::info!("Navigation complete: no path found"),
        HaltReason::CycleBudgetExhausted => {
            log::info!("Navigation complete: {} cycle(s) used", outcome.cycles)
        }
        HaltReason::Cancelled => log::info!("Navigation cancelled"),
    }
    if let Some(gap) = outcome.last_gap {
        log::info!(
            "Last gap: {:.1}° ({:.1}cm wide)",
            gap.center_angle,
            gap.width
        );
    }

    Ok(())
}
