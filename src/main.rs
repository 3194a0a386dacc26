//! netft-relay - continuous Net F/T to TCP relay
//!
//! Establishes the device association and the downstream connection, sends
//! one start request, then forwards every received sample until Ctrl-C, a
//! fatal error, or the end of a finite sample request.

use netft_relay::config::AppConfig;
use netft_relay::error::{Error, Result};
use netft_relay::protocol::StartRequest;
use netft_relay::streaming::Session;
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `netft-relay <path>` (positional)
/// - `netft-relay --config <path>` (flag-based)
/// - `netft-relay -c <path>` (short flag)
///
/// Defaults to `netft.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "netft.toml".to_string()
}

/// Load the config file, falling back to defaults when it does not exist
fn load_config(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        AppConfig::from_file(path)
    } else {
        Ok(AppConfig::default())
    }
}

fn run() -> Result<()> {
    let config_path = parse_config_path();
    let config = load_config(&config_path)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("netft-relay starting...");
    log::info!("Using config: {}", config_path);
    log::info!(
        "Device: {}  Downstream: {}",
        config.device_addr(),
        config.relay_addr()
    );

    // Cancellation flag, set from the Ctrl-C handler and polled once per
    // loop iteration
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);

    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Setup(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut session = Session::new();
    session.connect_device(&config.device_addr())?;
    session.connect_relay(&config.relay_addr())?;

    let request = StartRequest::new(config.device.command, config.device.sample_count);
    let forwarded = session.stream(&request, &running)?;

    log::info!("Relayed {} samples", forwarded);
    log::info!("netft-relay stopped");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("netft-relay: {}", e);
        std::process::exit(1);
    }
}
