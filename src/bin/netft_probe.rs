//! netft-probe - request and print a single Net F/T sample
//!
//! Diagnostic entry point: asks the device for exactly one sample, prints
//! the decoded reading, and exits. No downstream connection is made.

use netft_relay::config::AppConfig;
use netft_relay::error::Result;
use netft_relay::protocol::{StartRequest, AXIS_NAMES, COUNTS_PER_UNIT};
use netft_relay::streaming::DeviceStream;
use std::env;
use std::path::Path;

/// Parse config path from command line arguments (same forms as the relay)
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

fn run() -> Result<()> {
    let config_path = parse_config_path();
    let config = if Path::new(&config_path).exists() {
        AppConfig::from_file(&config_path)?
    } else {
        AppConfig::default()
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let device = DeviceStream::connect(&config.device_addr())?;
    device.start_streaming(&StartRequest::new(config.device.command, 1))?;

    log::info!("Waiting for data...");
    let sample = device.recv_sample()?;

    println!("RDT sequence: {}", sample.rdt_sequence);
    println!("FT sequence:  {}", sample.ft_sequence);
    println!("Status:       0x{:08x}", sample.status);
    for (name, counts) in AXIS_NAMES.iter().zip(sample.ft_data.iter()) {
        println!(
            "{}: {:>12} counts  ({:.6})",
            name,
            counts,
            f64::from(*counts) / f64::from(COUNTS_PER_UNIT)
        );
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("netft-probe: {}", e);
        std::process::exit(1);
    }
}
