pub mod calibration;
pub mod clock;
pub mod error;
pub mod playback;
pub mod probe;

pub use calibration::{calibrate, CalibratedLatency, CalibrationReport, LatencyStats, DEFAULT_CUE};
pub use clock::{Clock, ManualClock, MonotonicClock, WallClock};
pub use error::ProbeError;
pub use playback::{MediaRef, PlaybackDevice, SimulatedDevice};
pub use probe::TimingProbe;
