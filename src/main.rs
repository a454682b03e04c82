use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use poolwatch::duration::format_duration;
use poolwatch::{DeviceSettings, Settings, SimulatedClient};
use poolwatch_core::{NodeTypeRegistry, Outbound, Output, SchemaVersion, CLIENT_TYPE};
use tokio::time::{interval_at, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "poolwatch")]
#[command(about = "Round-robin monitor pool over simulated temperature devices")]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How often the next device is fetched (e.g., "900ms", "2s")
    #[arg(long)]
    fetch_interval: Option<String>,

    /// How often a snapshot is published (e.g., "1s")
    #[arg(long)]
    tick_interval: Option<String>,

    /// Stop after this many ticks (0 runs until Ctrl-C)
    #[arg(short = 'n', long)]
    ticks: Option<u64>,

    /// Also write the latest event to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also send every event as a JSON line to this address (host:port)
    #[arg(long)]
    tcp: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Request a failure reset right after this tick
    #[arg(long)]
    reset_after: Option<u64>,

    /// Simulate an extra device with this id (repeatable)
    #[arg(short, long = "device")]
    devices: Vec<String>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(fetch_interval) = self.fetch_interval {
            settings.fetch_interval = fetch_interval;
        }
        if let Some(tick_interval) = self.tick_interval {
            settings.tick_interval = tick_interval;
        }
        if let Some(ticks) = self.ticks {
            settings.ticks = ticks;
        }
        if self.output.is_some() {
            settings.output = self.output;
        }
        if self.tcp.is_some() {
            settings.tcp = self.tcp;
        }
        if let Some(log_level) = self.log_level {
            settings.log_level = log_level;
        }
        if self.reset_after.is_some() {
            settings.reset_after = self.reset_after;
        }
        settings
            .devices
            .extend(self.devices.into_iter().map(DeviceSettings::new));
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    // Logs go to stderr; stdout carries the event stream
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(settings))
}

async fn run(settings: Settings) -> Result<()> {
    let fetch_interval = settings.fetch_interval()?;
    let tick_interval = settings.tick_interval()?;

    let client = SimulatedClient::from_settings(&settings.devices);
    if settings.devices.is_empty() {
        warn!("No devices configured; nothing will be published");
    }

    let mut registry = NodeTypeRegistry::new();
    registry.init();
    let shared = client.clone();
    registry.register_client(CLIENT_TYPE, move || Box::new(shared.clone()));

    let (channel, mut events) = Output::channel(64);
    let mut builder = registry
        .compose()?
        .into_driver()
        .fetch_interval(fetch_interval)
        .output(channel);
    if let Some(path) = &settings.output {
        builder = builder.output(Output::file(path));
    }
    if let Some(addr) = &settings.tcp {
        builder = builder.output(Output::tcp(addr.as_str()));
    }
    let handle = builder.build().start();

    info!(
        schema = %SchemaVersion::CURRENT,
        fetch_interval = %format_duration(fetch_interval),
        tick_interval = %format_duration(tick_interval),
        devices = settings.devices.len(),
        "Monitor pool running"
    );

    for device_id in client.device_ids() {
        handle.add_device(device_id)?;
    }

    let mut ticker = interval_at(Instant::now() + tick_interval, tick_interval);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                ticks += 1;
                handle.tick()?;
                if settings.reset_after == Some(ticks) {
                    info!(tick = ticks, "Requesting failure reset");
                    handle.request_failure_reset()?;
                }
                if settings.ticks != 0 && ticks >= settings.ticks {
                    break;
                }
            }
            Some(event) = events.recv() => print_event(&event)?,
            _ = &mut interrupted => {
                info!("Interrupted");
                break;
            }
        }
    }

    handle.shutdown().await;
    while let Ok(event) = events.try_recv() {
        print_event(&event)?;
    }

    info!(ticks, "Monitor pool stopped");
    Ok(())
}

fn print_event(event: &Outbound) -> Result<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
