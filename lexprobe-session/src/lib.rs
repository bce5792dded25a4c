pub mod config;
pub mod error;
pub mod session;
pub mod sink;
pub use config::{CalibrationConfig, ClockSource, ProbeConfig, SimulationConfig};
pub use error::{ConfigError, SessionError, SinkError};
pub use session::ProbeSession;
pub use sink::{JsonLinesSink, MemorySink, ResultSink};
