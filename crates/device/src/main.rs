//! revringd - RevRing shift light daemon.
//!
//! Listens for race-telemetry UDP broadcasts, normalizes them, and
//! drives the LED ring and text panel at a fixed tick rate.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use revring_device::{
    DatagramSource, DeviceConfig, LoggingLedRing, LoggingTextPanel, ShiftLightLoop,
    UdpDatagramSource,
};

#[derive(Parser)]
#[command(name = "revringd")]
#[command(about = "RevRing shift light - race telemetry to LED ring and display")]
#[command(version)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "revring.json")]
    config: PathBuf,

    /// Verbose logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Skip the boot sweep animation.
    #[arg(long)]
    no_sweep: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = DeviceConfig::load_or_default(&cli.config)?;
    let profiles = config.profiles()?;
    info!(
        protocols = ?profiles.iter().map(|p| p.protocol().id()).collect::<Vec<_>>(),
        tick_hz = config.tick_hz,
        "starting revringd"
    );

    // One socket per distinct port; several protocols may share one.
    let mut ports: Vec<u16> = profiles.iter().map(|p| p.port()).collect();
    ports.sort_unstable();
    ports.dedup();

    let mut sources: Vec<Box<dyn DatagramSource>> = Vec::with_capacity(ports.len());
    for port in ports {
        match UdpDatagramSource::bind(port) {
            Ok(source) => sources.push(Box::new(source)),
            Err(error) => warn!(%error, port, "skipping unbindable telemetry port"),
        }
    }
    if sources.is_empty() {
        anyhow::bail!("no telemetry port could be bound");
    }

    let ring = LoggingLedRing::new(config.led_count);
    let panel = LoggingTextPanel;
    let mut device = ShiftLightLoop::new(&config, sources, ring, panel)?;

    if !cli.no_sweep {
        device.startup_sweep().await;
    }

    device.run().await
}
