use crate::clock::Clock;
use crate::error::ProbeError;
use crate::playback::{MediaRef, PlaybackDevice};
use lexprobe_core::{
    ChoiceSet, Hook, Interval, Measurement, ProbeSnapshot, ProbeState, ReactionTimes,
    ResponseChoice, Timestamp,
};
use tracing::{debug, warn};

/// Timestamps for one trial and the durations derived from them.
///
/// Fields start unset; derived values are only produced when every operand
/// was recorded, otherwise they read as not applicable.
#[derive(Debug, Clone)]
pub struct TimingProbe<C: Clock> {
    clock: C,
    choices: ChoiceSet,
    play_requested: Option<Timestamp>,
    onset: Option<Timestamp>,
    response: Option<(ResponseChoice, Timestamp)>,
}

impl<C: Clock> TimingProbe<C> {
    pub fn new(clock: C, choices: ChoiceSet) -> Self {
        Self {
            clock,
            choices,
            play_requested: None,
            onset: None,
            response: None,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn choices(&self) -> &ChoiceSet {
        &self.choices
    }

    /// Forget every timestamp. Called at the start of each trial.
    pub fn reset(&mut self) {
        self.play_requested = None;
        self.onset = None;
        self.response = None;
    }

    pub fn state(&self) -> ProbeState {
        if self.response.is_some() {
            ProbeState::Responded
        } else if self.onset.is_some() {
            ProbeState::OnsetMarked
        } else if self.play_requested.is_some() {
            ProbeState::PlayRequested
        } else {
            ProbeState::Idle
        }
    }

    /// Record the moment playback is requested. A repeat call moves the
    /// reference point.
    pub fn mark_play_requested(&mut self) {
        let now = self.clock.now();
        if let Some(previous) = self.play_requested.replace(now) {
            warn!(
                previous_ns = previous.as_nanos(),
                now_ns = now.as_nanos(),
                "play request marked twice in one trial"
            );
        }
        if self.onset.is_some() {
            warn!("play request marked after onset");
        }
        debug!(clock = self.clock.name(), ts_ns = now.as_nanos(), "play requested");
    }

    /// Record the moment playback actually started. Only the first onset of
    /// a trial counts, and only if no response has been recorded yet.
    pub fn mark_onset(&mut self) -> Result<(), ProbeError> {
        let now = self.clock.now();
        self.record_onset_at(now)
    }

    fn record_onset_at(&mut self, ts: Timestamp) -> Result<(), ProbeError> {
        if self.onset.is_some() {
            return Err(ProbeError::AlreadyMarked(Hook::Onset));
        }
        if self.response.is_some() {
            warn!(ts_ns = ts.as_nanos(), "onset after response ignored; reaction time unavailable");
            return Err(ProbeError::OutOfOrder(Hook::Onset, Hook::Response));
        }
        if self.play_requested.is_none() {
            warn!("onset marked without a play request; latency will be unavailable");
        }
        self.onset = Some(ts);
        debug!(clock = self.clock.name(), ts_ns = ts.as_nanos(), "onset");
        Ok(())
    }

    /// Request playback on `device` and record the first onset it signals.
    pub fn play<D: PlaybackDevice>(
        &mut self,
        device: &mut D,
        media: &MediaRef,
    ) -> Result<(), ProbeError> {
        self.mark_play_requested();

        let clock = self.clock.clone();
        let mut first_onset: Option<Timestamp> = None;
        device
            .start(media, &mut || {
                if first_onset.is_none() {
                    first_onset = Some(clock.now());
                }
            })
            .map_err(|e| ProbeError::Playback(Box::new(e)))?;

        match first_onset {
            Some(ts) => self.record_onset_at(ts),
            None => {
                warn!(media = %media, "playback returned without signalling onset");
                Ok(())
            }
        }
    }

    /// `onset - play request`. Negative results are returned unchanged.
    pub fn compute_latency(&self) -> Result<Interval, ProbeError> {
        let requested = self
            .play_requested
            .ok_or(ProbeError::NotYetAvailable(Hook::PlayRequest))?;
        let onset = self.onset.ok_or(ProbeError::NotYetAvailable(Hook::Onset))?;
        let latency = onset - requested;
        if latency.is_negative() {
            warn!(
                latency_ns = latency.as_nanos(),
                clock = self.clock.name(),
                "onset precedes play request; clock stepped or hooks out of order"
            );
        }
        Ok(latency)
    }

    pub fn latency(&self) -> Measurement {
        self.compute_latency().ok().into()
    }

    /// Record the participant's answer. At most once per trial.
    pub fn record_response(&mut self, label: &str) -> Result<(), ProbeError> {
        let now = self.clock.now();
        if self.response.is_some() {
            return Err(ProbeError::AlreadyMarked(Hook::Response));
        }
        let choice = self
            .choices
            .get(label)
            .cloned()
            .ok_or_else(|| ProbeError::UnknownChoice(label.to_string()))?;
        if self.onset.is_none() {
            warn!(choice = %choice, "response before onset; reaction time unavailable");
        }
        debug!(choice = %choice, ts_ns = now.as_nanos(), "response");
        self.response = Some((choice, now));
        Ok(())
    }

    /// `response - onset` for the chosen option.
    pub fn reaction_time(&self) -> Result<Interval, ProbeError> {
        let onset = self.onset.ok_or(ProbeError::NotYetAvailable(Hook::Onset))?;
        let (_, responded) = self
            .response
            .as_ref()
            .ok_or(ProbeError::NotYetAvailable(Hook::Response))?;
        let rt = *responded - onset;
        if rt.is_negative() {
            warn!(rt_ns = rt.as_nanos(), "response precedes onset");
        }
        Ok(rt)
    }

    pub fn reaction_times(&self) -> ReactionTimes {
        match &self.response {
            Some((choice, _)) => ReactionTimes::answered(
                &self.choices,
                choice,
                self.reaction_time().ok().into(),
            ),
            None => ReactionTimes::unanswered(&self.choices),
        }
    }

    pub fn response_choice(&self) -> Option<&ResponseChoice> {
        self.response.as_ref().map(|(c, _)| c)
    }

    pub fn snapshot(&self) -> ProbeSnapshot {
        ProbeSnapshot {
            latency: self.latency(),
            reaction_times: self.reaction_times(),
            response_choice: self.response_choice().cloned(),
        }
    }
}
