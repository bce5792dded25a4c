pub mod choice;
pub mod error;
pub mod measurement;
pub mod record;
pub mod state;

pub use choice::{ChoiceSet, ResponseChoice};
pub use error::CoreError;
pub use measurement::{Interval, Measurement, NOT_APPLICABLE, Timestamp};
pub use record::{ProbeSnapshot, ReactionTimes, TrialMetadata, TrialRecord};
pub use state::{Hook, ProbeState};
