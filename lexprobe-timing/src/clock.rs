use lexprobe_core::Timestamp;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of timestamps for a probe.
///
/// Every timestamp a probe compares must come from the same clock.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Timestamp;
    fn sleep(&self, d: Duration);
    fn name(&self) -> &'static str;
}

/// Monotonic clock anchored at its creation instant.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(i64::try_from(self.start.elapsed().as_nanos()).unwrap_or(i64::MAX))
    }
    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
    fn name(&self) -> &'static str {
        "monotonic"
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(target_os = "macos")]
        self.macos_sleep(duration);
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

        let mut req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };
        let mut rem = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        // Resume after signal interruptions with whatever is left.
        loop {
            let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) };
            if rc != libc::EINTR {
                break;
            }
            req = rem;
        }
    }

    #[cfg(target_os = "macos")]
    fn macos_sleep(&self, duration: Duration) {
        use mach2::mach_time::{mach_absolute_time, mach_timebase_info, mach_timebase_info_data_t};

        if duration.as_nanos() < 100_000 {
            unsafe {
                let start = mach_absolute_time();
                let mut timebase = mach_timebase_info_data_t { numer: 0, denom: 0 };
                mach_timebase_info(&mut timebase);

                let target_ticks =
                    duration.as_nanos() as u64 * timebase.denom as u64 / timebase.numer as u64;

                while mach_absolute_time() - start < target_ticks {
                    std::hint::spin_loop();
                }
            }
        } else {
            std::thread::sleep(duration);
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// System time since the Unix epoch. Can jump under NTP or sleep/resume.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> Timestamp {
        let nanos = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
            Err(e) => -i64::try_from(e.duration().as_nanos()).unwrap_or(i64::MAX),
        };
        Timestamp::from_nanos(nanos)
    }
    fn sleep(&self, d: Duration) {
        std::thread::sleep(d)
    }
    fn name(&self) -> &'static str {
        "wall"
    }
}

/// Hand-driven clock. Clones share the same reading; `sleep` advances it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ts: Timestamp) -> Self {
        let clock = Self::new();
        clock.set(ts);
        clock
    }

    pub fn set(&self, ts: Timestamp) {
        self.nanos.store(ts.as_nanos(), Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: i64) {
        self.set(Timestamp::from_millis(millis));
    }

    /// Move the clock forward by `d`, stopping at the largest representable
    /// timestamp.
    pub fn advance(&self, d: Duration) {
        let step = i64::try_from(d.as_nanos()).unwrap_or(i64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(step))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d)
    }
    fn name(&self) -> &'static str {
        "manual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let mut last = clock.now();
        for _ in 0..1000 {
            let now = clock.now();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn monotonic_sleep_waits_at_least_requested() {
        let clock = MonotonicClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_millis(2));
        let slept = clock.now() - before;
        assert!(slept.as_nanos() >= 2_000_000);
    }

    #[test]
    fn wall_clock_is_after_epoch() {
        assert!(WallClock.now().as_nanos() > 0);
    }

    #[test]
    fn manual_clones_share_reading() {
        let clock = ManualClock::starting_at(Timestamp::from_millis(1000));
        let other = clock.clone();
        other.sleep(Duration::from_millis(120));
        assert_eq!(clock.now(), Timestamp::from_millis(1120));
        clock.set_millis(10);
        assert_eq!(other.now(), Timestamp::from_millis(10));
    }

    #[test]
    fn manual_advance_stops_at_max() {
        let clock = ManualClock::starting_at(Timestamp::from_millis(5));
        clock.advance(Duration::from_nanos(u64::MAX));
        assert_eq!(clock.now(), Timestamp::from_nanos(i64::MAX));
        clock.sleep(Duration::from_secs(1));
        assert_eq!(clock.now(), Timestamp::from_nanos(i64::MAX));
    }
}
