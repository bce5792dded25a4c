use anyhow::{Context, Result};
use clap::Parser;
use lexprobe_session::{ClockSource, ProbeConfig};
use lexprobe_timing::{ManualClock, MonotonicClock, WallClock};
use tracing::info;

mod args;
mod commands;
mod logger;

use args::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(&args);

    let config = match &args.config {
        Some(path) => ProbeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ProbeConfig::default(),
    };
    info!(
        version = env!("CARGO_PKG_VERSION"),
        clock = ?config.clock,
        virtual_time = args.virtual_time,
        "lexprobe starting"
    );

    let stdout = std::io::stdout();
    let out = stdout.lock();
    if args.virtual_time {
        return commands::run(&args.command, &config, ManualClock::new(), out);
    }
    match config.clock {
        ClockSource::Monotonic => commands::run(&args.command, &config, MonotonicClock::new(), out),
        ClockSource::Wall => commands::run(&args.command, &config, WallClock, out),
    }
}
