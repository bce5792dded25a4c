use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Sub;
use std::time::Duration;

/// Literal written in place of a duration that was never measured.
pub const NOT_APPLICABLE: &str = "NA";

/// A point on a clock's own timeline, in nanoseconds.
///
/// Signed so that wall clocks stepping backwards still produce a value that
/// can be subtracted and inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Signed distance from `earlier` to `self`.
    pub fn since(self, earlier: Timestamp) -> Interval {
        Interval(self.0.saturating_sub(earlier.0))
    }
}

impl Sub for Timestamp {
    type Output = Interval;

    fn sub(self, rhs: Timestamp) -> Interval {
        self.since(rhs)
    }
}

/// Signed difference between two timestamps of the same clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(i64);

impl Interval {
    pub const ZERO: Interval = Interval(0);

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `None` when the interval runs backwards.
    pub fn to_duration(self) -> Option<Duration> {
        u64::try_from(self.0).ok().map(Duration::from_nanos)
    }
}

impl From<Duration> for Interval {
    fn from(d: Duration) -> Self {
        Interval(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_millis_f64())
    }
}

/// A derived duration, or the explicit marker that it was never measured.
///
/// A measured zero and an unmeasured value are distinct: only
/// `Measured(Interval::ZERO)` means "no delay".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Measurement {
    Measured(Interval),
    #[default]
    NotApplicable,
}

impl Measurement {
    pub fn interval(&self) -> Option<Interval> {
        match self {
            Measurement::Measured(i) => Some(*i),
            Measurement::NotApplicable => None,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Measurement::Measured(_))
    }

    pub fn millis(&self) -> Option<f64> {
        self.interval().map(Interval::as_millis_f64)
    }
}

impl From<Option<Interval>> for Measurement {
    fn from(value: Option<Interval>) -> Self {
        value.map_or(Measurement::NotApplicable, Measurement::Measured)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Measured(i) => i.fmt(f),
            Measurement::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

/// Milliseconds as a number, or `"NA"`.
impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Measurement::Measured(i) => serializer.serialize_f64(i.as_millis_f64()),
            Measurement::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}
