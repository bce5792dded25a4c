use crate::clock::Clock;
use crate::error::ProbeError;
use crate::playback::{MediaRef, PlaybackDevice};
use crate::probe::TimingProbe;
use lexprobe_core::{ChoiceSet, Interval, Measurement};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{info, warn};

/// Media played for calibration unless configured otherwise.
pub const DEFAULT_CUE: &str = "calibration_beep.wav";

static GLOBAL: CalibratedLatency = CalibratedLatency::new();

/// Audio latency measured once before any trial, then only read.
///
/// Only a measured value is stored; a calibration that saw no onset leaves
/// the cell empty so it can be retried.
#[derive(Debug, Default)]
pub struct CalibratedLatency {
    cell: OnceCell<Interval>,
}

impl CalibratedLatency {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The process-lifetime instance.
    pub fn global() -> &'static CalibratedLatency {
        &GLOBAL
    }

    pub fn set(&self, latency: Measurement) -> Result<(), ProbeError> {
        let interval = latency
            .interval()
            .ok_or(ProbeError::CalibrationUnmeasured)?;
        self.cell
            .try_insert(interval)
            .map_err(|(existing, _)| ProbeError::CalibrationAlreadySet(*existing))?;
        info!(audio_latency = %latency, "audio latency calibrated");
        Ok(())
    }

    /// Not applicable until calibrated.
    pub fn get(&self) -> Measurement {
        self.interval().into()
    }

    pub fn interval(&self) -> Option<Interval> {
        self.cell.get().copied()
    }

    pub fn is_calibrated(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Spread of repeated request-to-onset measurements, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyStats {
    pub samples: usize,
    pub mean_ms: f64,
    pub jitter_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl LatencyStats {
    pub fn from_intervals(intervals: &[Interval]) -> Option<Self> {
        if intervals.is_empty() {
            return None;
        }
        let times: Vec<f64> = intervals.iter().map(|i| i.as_millis_f64()).collect();
        let n = times.len() as f64;
        let mean = times.iter().sum::<f64>() / n;
        let var = times.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            samples: times.len(),
            mean_ms: mean,
            jitter_ms: var.sqrt(),
            min_ms: min,
            max_ms: max,
        })
    }

    fn mean_interval(intervals: &[Interval]) -> Option<Interval> {
        if intervals.is_empty() {
            return None;
        }
        let sum: i128 = intervals.iter().map(|i| i.as_nanos() as i128).sum();
        Some(Interval::from_nanos((sum / intervals.len() as i128) as i64))
    }
}

/// Outcome of a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub cue: String,
    pub clock: &'static str,
    pub audio_latency: Measurement,
    pub stats: Option<LatencyStats>,
    pub unmeasured: usize,
}

/// Play `cue` `samples` times and derive the audio latency.
///
/// One sample yields that sample; several yield their mean. Samples where
/// the device never signalled onset are counted in `unmeasured`.
pub fn calibrate<C, D>(
    clock: &C,
    device: &mut D,
    cue: &MediaRef,
    samples: usize,
) -> Result<CalibrationReport, ProbeError>
where
    C: Clock,
    D: PlaybackDevice,
{
    if samples == 0 {
        return Err(ProbeError::NoCalibrationSamples);
    }

    let mut probe = TimingProbe::new(clock.clone(), ChoiceSet::default());
    let mut measured = Vec::with_capacity(samples);
    let mut unmeasured = 0;
    for _ in 0..samples {
        probe.reset();
        probe.play(device, cue)?;
        match probe.compute_latency() {
            Ok(latency) => measured.push(latency),
            Err(_) => unmeasured += 1,
        }
    }
    if unmeasured > 0 {
        warn!(unmeasured, samples, cue = %cue, "calibration samples without onset");
    }

    Ok(CalibrationReport {
        cue: cue.to_string(),
        clock: clock.name(),
        audio_latency: LatencyStats::mean_interval(&measured).into(),
        stats: LatencyStats::from_intervals(&measured),
        unmeasured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::playback::SimulatedDevice;
    use std::time::Duration;

    #[test]
    fn set_once_then_read_many() {
        let cal = CalibratedLatency::new();
        assert_eq!(cal.get(), Measurement::NotApplicable);
        assert!(!cal.is_calibrated());

        let first = Measurement::Measured(Interval::from_millis(35));
        cal.set(first).unwrap();
        let err = cal
            .set(Measurement::Measured(Interval::from_millis(99)))
            .unwrap_err();
        assert!(matches!(
            err,
            ProbeError::CalibrationAlreadySet(m) if m == Interval::from_millis(35)
        ));
        assert_eq!(err.to_string(), "audio latency already calibrated (35 ms)");
        for _ in 0..3 {
            assert_eq!(cal.get(), first);
        }
    }

    #[test]
    fn unmeasured_latency_is_not_stored() {
        let cal = CalibratedLatency::new();
        assert!(matches!(
            cal.set(Measurement::NotApplicable),
            Err(ProbeError::CalibrationUnmeasured)
        ));
        assert!(!cal.is_calibrated());

        cal.set(Measurement::Measured(Interval::from_millis(12)))
            .unwrap();
        assert_eq!(cal.interval(), Some(Interval::from_millis(12)));
    }

    struct MuteDevice;

    impl PlaybackDevice for MuteDevice {
        type Error = std::convert::Infallible;

        fn start(
            &mut self,
            _media: &MediaRef,
            _on_onset: &mut dyn FnMut(),
        ) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn calibration_without_onset_reports_na() {
        let clock = ManualClock::new();
        let report = calibrate(&clock, &mut MuteDevice, &MediaRef::new(DEFAULT_CUE), 3).unwrap();
        assert_eq!(report.audio_latency, Measurement::NotApplicable);
        assert_eq!(report.unmeasured, 3);
        assert!(report.stats.is_none());
    }

    #[test]
    fn global_instance_is_shared() {
        let a = CalibratedLatency::global();
        let b = CalibratedLatency::global();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn single_sample_calibration() {
        let clock = ManualClock::new();
        let mut device = SimulatedDevice::new(clock.clone(), Duration::from_millis(42));
        let report = calibrate(&clock, &mut device, &MediaRef::new(DEFAULT_CUE), 1).unwrap();
        assert_eq!(
            report.audio_latency,
            Measurement::Measured(Interval::from_millis(42))
        );
        assert_eq!(report.unmeasured, 0);
        assert_eq!(report.clock, "manual");
        let stats = report.stats.unwrap();
        assert_eq!(stats.samples, 1);
        assert_eq!(stats.jitter_ms, 0.0);
    }

    #[test]
    fn repeated_samples_average() {
        let clock = ManualClock::new();
        let mut device = SimulatedDevice::new(clock.clone(), Duration::from_millis(40))
            .with_jitter(Duration::from_millis(10), 11);
        let report = calibrate(&clock, &mut device, &MediaRef::new(DEFAULT_CUE), 25).unwrap();
        let stats = report.stats.unwrap();
        assert_eq!(stats.samples, 25);
        assert!(stats.min_ms >= 40.0 && stats.max_ms <= 50.0);
        let latency = report.audio_latency.millis().unwrap();
        assert!((latency - stats.mean_ms).abs() < 1e-5);
    }

    #[test]
    fn zero_samples_is_an_error() {
        let clock = ManualClock::new();
        let mut device = SimulatedDevice::new(clock.clone(), Duration::ZERO);
        assert!(matches!(
            calibrate(&clock, &mut device, &MediaRef::new(DEFAULT_CUE), 0),
            Err(ProbeError::NoCalibrationSamples)
        ));
    }

    #[test]
    fn stats_match_hand_computation() {
        let stats = LatencyStats::from_intervals(&[
            Interval::from_millis(10),
            Interval::from_millis(20),
            Interval::from_millis(30),
        ])
        .unwrap();
        assert_eq!(stats.mean_ms, 20.0);
        assert_eq!(stats.min_ms, 10.0);
        assert_eq!(stats.max_ms, 30.0);
        assert!((stats.jitter_ms - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!(LatencyStats::from_intervals(&[]).is_none());
    }
}
