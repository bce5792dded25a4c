use crate::clock::Clock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::Duration;

/// Reference to a stimulus or cue the playback device understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can start media and tell us when it is actually audible.
///
/// `start` is the "play requested" point. The device must call `on_onset`
/// when output begins; a device may call it more than once (only the first
/// call is used) or never (no latency is measured).
pub trait PlaybackDevice {
    type Error: std::error::Error + Send + Sync + 'static;

    fn start(&mut self, media: &MediaRef, on_onset: &mut dyn FnMut()) -> Result<(), Self::Error>;
}

/// Stand-in device that waits a fixed delay plus uniform jitter on its
/// clock before signalling onset.
#[derive(Debug, Clone)]
pub struct SimulatedDevice<C: Clock> {
    clock: C,
    delay: Duration,
    jitter: Duration,
    rng: StdRng,
}

impl<C: Clock> SimulatedDevice<C> {
    pub fn new(clock: C, delay: Duration) -> Self {
        Self {
            clock,
            delay,
            jitter: Duration::ZERO,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn with_jitter(mut self, jitter: Duration, seed: u64) -> Self {
        self.jitter = jitter;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn next_delay(&mut self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let bound = u64::try_from(self.jitter.as_nanos()).unwrap_or(u64::MAX);
        let extra = self.rng.random_range(0..=bound);
        self.delay.saturating_add(Duration::from_nanos(extra))
    }
}

impl<C: Clock> PlaybackDevice for SimulatedDevice<C> {
    type Error = std::convert::Infallible;

    fn start(&mut self, media: &MediaRef, on_onset: &mut dyn FnMut()) -> Result<(), Self::Error> {
        let delay = self.next_delay();
        let delay_ns = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
        tracing::trace!(media = %media, delay_ns, "simulated playback");
        self.clock.sleep(delay);
        on_onset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use lexprobe_core::Timestamp;

    #[test]
    fn jitter_stays_within_bounds() {
        let clock = ManualClock::new();
        let mut device = SimulatedDevice::new(clock.clone(), Duration::from_millis(100))
            .with_jitter(Duration::from_millis(20), 7);
        for _ in 0..50 {
            let before = clock.now();
            let mut fired = 0;
            device
                .start(&MediaRef::new("beep.wav"), &mut || fired += 1)
                .unwrap();
            let waited = clock.now() - before;
            assert_eq!(fired, 1);
            assert!(waited.as_nanos() >= 100_000_000);
            assert!(waited.as_nanos() <= 120_000_000);
        }
    }

    #[test]
    fn same_seed_same_delays() {
        let run = |seed| {
            let clock = ManualClock::starting_at(Timestamp::from_millis(0));
            let mut device = SimulatedDevice::new(clock.clone(), Duration::from_millis(5))
                .with_jitter(Duration::from_millis(5), seed);
            for _ in 0..10 {
                device.start(&MediaRef::new("a"), &mut || {}).unwrap();
            }
            clock.now()
        };
        assert_eq!(run(3), run(3));
    }

    #[test]
    fn huge_delay_and_jitter_saturate() {
        let clock = ManualClock::starting_at(Timestamp::from_millis(0));
        let mut device =
            SimulatedDevice::new(clock.clone(), Duration::MAX).with_jitter(Duration::MAX, 1);
        let mut fired = false;
        device
            .start(&MediaRef::new("long.wav"), &mut || fired = true)
            .unwrap();
        assert!(fired);
        assert_eq!(clock.now(), Timestamp::from_nanos(i64::MAX));
    }
}
