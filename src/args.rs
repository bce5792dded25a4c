use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Structured,
    Debug,
}

/// Audio latency and reaction-time probe for lexical-decision trials
#[derive(Parser, Debug)]
#[command(name = "lexprobe", author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short = 'l', long, default_value_t = LevelFilter::INFO)]
    pub log_level: LevelFilter,

    #[arg(short = 'F', long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Disable colors in log output
    #[arg(long)]
    pub no_color: bool,

    /// Run on a virtual clock instead of sleeping for real
    #[arg(long)]
    pub virtual_time: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Measure audio latency against the calibration cue and print the report
    Calibrate {
        /// Number of cue playbacks (overrides calibration.samples)
        #[arg(short, long)]
        samples: Option<usize>,
    },
    /// Calibrate, then run simulated trials and print one JSON record per trial
    Simulate {
        #[arg(short, long, default_value_t = 4)]
        trials: usize,
    },
}
