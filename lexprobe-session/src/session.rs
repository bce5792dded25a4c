use crate::error::SessionError;
use crate::sink::ResultSink;
use lexprobe_core::{ChoiceSet, Measurement, ProbeSnapshot, TrialMetadata, TrialRecord};
use lexprobe_timing::{
    calibrate, CalibratedLatency, CalibrationReport, Clock, MediaRef, PlaybackDevice, ProbeError,
    TimingProbe,
};
use tracing::{debug, info, warn};

/// Per-trial timing for a trial driver.
///
/// The driver opens a trial with metadata, reports the hooks as they happen
/// and finishes the trial, at which point the record is handed to the sink.
/// The calibrated audio latency is shared by every trial of the session.
pub struct ProbeSession<'a, C: Clock, K: ResultSink> {
    probe: TimingProbe<C>,
    calibration: &'a CalibratedLatency,
    sink: K,
    current: Option<TrialMetadata>,
    completed: usize,
}

impl<'a, C: Clock, K: ResultSink> ProbeSession<'a, C, K> {
    pub fn new(clock: C, choices: ChoiceSet, calibration: &'a CalibratedLatency, sink: K) -> Self {
        Self {
            probe: TimingProbe::new(clock, choices),
            calibration,
            sink,
            current: None,
            completed: 0,
        }
    }

    /// Measure audio latency against `cue`. Only the first measured
    /// calibration of the shared cell takes effect; later calls fail without
    /// measuring. A run that saw no onset fails and leaves the cell empty.
    pub fn calibrate<D: PlaybackDevice>(
        &mut self,
        device: &mut D,
        cue: &MediaRef,
        samples: usize,
    ) -> Result<CalibrationReport, SessionError> {
        if let Some(existing) = self.calibration.interval() {
            return Err(ProbeError::CalibrationAlreadySet(existing).into());
        }
        let report = calibrate(self.probe.clock(), device, cue, samples)?;
        self.calibration.set(report.audio_latency)?;
        Ok(report)
    }

    pub fn audio_latency(&self) -> Measurement {
        self.calibration.get()
    }

    pub fn begin_trial(&mut self, metadata: TrialMetadata) -> Result<(), SessionError> {
        if self.current.is_some() {
            return Err(SessionError::TrialInProgress);
        }
        self.probe.reset();
        debug!(item = %metadata.item, stimulus = %metadata.stimulus, "trial started");
        self.current = Some(metadata);
        Ok(())
    }

    pub fn in_trial(&self) -> bool {
        self.current.is_some()
    }

    fn active(&mut self) -> Result<&mut TimingProbe<C>, SessionError> {
        if self.current.is_none() {
            return Err(SessionError::NoActiveTrial);
        }
        Ok(&mut self.probe)
    }

    pub fn mark_play_requested(&mut self) -> Result<(), SessionError> {
        self.active()?.mark_play_requested();
        Ok(())
    }

    pub fn mark_onset(&mut self) -> Result<(), SessionError> {
        Ok(self.active()?.mark_onset()?)
    }

    pub fn play<D: PlaybackDevice>(
        &mut self,
        device: &mut D,
        media: &MediaRef,
    ) -> Result<(), SessionError> {
        Ok(self.active()?.play(device, media)?)
    }

    pub fn record_response(&mut self, label: &str) -> Result<(), SessionError> {
        Ok(self.active()?.record_response(label)?)
    }

    pub fn probe(&self) -> &TimingProbe<C> {
        &self.probe
    }

    pub fn snapshot(&self) -> Result<ProbeSnapshot, SessionError> {
        if self.current.is_none() {
            return Err(SessionError::NoActiveTrial);
        }
        Ok(self.probe.snapshot())
    }

    /// Close the trial and persist its record.
    ///
    /// A trial without a response is still persisted, with every reaction
    /// time not applicable. If the sink fails the trial stays open so the
    /// driver can retry.
    pub fn finish_trial(&mut self) -> Result<TrialRecord, SessionError> {
        let metadata = self.current.clone().ok_or(SessionError::NoActiveTrial)?;
        let snapshot = self.probe.snapshot();
        if snapshot.response_choice.is_none() {
            warn!(item = %metadata.item, "trial finished without a response");
        }
        if !self.calibration.is_calibrated() {
            warn!(item = %metadata.item, "trial finished before audio latency calibration");
        }
        let record = TrialRecord {
            metadata,
            snapshot,
            audio_latency: self.calibration.get(),
        };
        self.sink.persist(&record)?;
        self.current = None;
        self.completed += 1;
        info!(
            item = %record.metadata.item,
            latency = %record.snapshot.latency,
            choice = record.snapshot.response_choice.as_ref().map(|c| c.label()),
            "trial persisted"
        );
        Ok(record)
    }

    pub fn completed_trials(&self) -> usize {
        self.completed
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }
}
