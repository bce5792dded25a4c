use lexprobe_core::CoreError;
use lexprobe_timing::ProbeError;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid choices: {0}")]
    Choices(#[from] CoreError),
    #[error("calibration.samples must be at least 1")]
    NoCalibrationSamples,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write result record")]
    Io(#[from] io::Error),
    #[error("failed to encode result record")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no trial in progress")]
    NoActiveTrial,
    #[error("trial already in progress")]
    TrialInProgress,
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
