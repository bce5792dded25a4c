use lexprobe_core::{Hook, Interval};

/// Ordering and availability problems reported by the probe.
///
/// None of these abort a trial; the snapshot reports the affected fields as
/// not applicable.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0} timestamp not yet available")]
    NotYetAvailable(Hook),
    #[error("{0} already recorded for this trial")]
    AlreadyMarked(Hook),
    #[error("{0} recorded after {1}")]
    OutOfOrder(Hook, Hook),
    #[error("unknown response choice {0:?}")]
    UnknownChoice(String),
    #[error("audio latency already calibrated ({0} ms)")]
    CalibrationAlreadySet(Interval),
    #[error("calibration measured no onset; audio latency left unset")]
    CalibrationUnmeasured,
    #[error("calibration needs at least one sample")]
    NoCalibrationSamples,
    #[error("playback failed")]
    Playback(#[source] Box<dyn std::error::Error + Send + Sync>),
}
