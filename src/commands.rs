use anyhow::Result;
use lexprobe_core::TrialMetadata;
use lexprobe_session::{JsonLinesSink, ProbeConfig, ProbeSession};
use lexprobe_timing::{calibrate, CalibratedLatency, Clock, MediaRef, SimulatedDevice};
use std::io::Write;
use tracing::info;

use crate::args::Command;

pub fn run<C: Clock, W: Write>(
    command: &Command,
    config: &ProbeConfig,
    clock: C,
    out: W,
) -> Result<()> {
    match command {
        Command::Calibrate { samples } => {
            run_calibrate(config, clock, samples.unwrap_or(config.calibration.samples), out)
        }
        Command::Simulate { trials } => run_simulate(config, clock, *trials, out),
    }
}

fn device<C: Clock>(config: &ProbeConfig, clock: C) -> SimulatedDevice<C> {
    let sim = &config.simulation;
    SimulatedDevice::new(clock, sim.device_delay()).with_jitter(sim.jitter(), sim.seed)
}

pub fn run_calibrate<C: Clock, W: Write>(
    config: &ProbeConfig,
    clock: C,
    samples: usize,
    mut out: W,
) -> Result<()> {
    let mut device = device(config, clock.clone());
    let report = calibrate(
        &clock,
        &mut device,
        &MediaRef::new(config.calibration.cue.as_str()),
        samples,
    )?;
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

/// Drives `trials` trials through a session; responses cycle through the
/// configured choices.
pub fn run_simulate<C: Clock, W: Write>(
    config: &ProbeConfig,
    clock: C,
    trials: usize,
    out: W,
) -> Result<()> {
    let choices = config.choice_set()?;
    let labels: Vec<String> = choices.iter().map(|c| c.label().to_string()).collect();
    let mut device = device(config, clock.clone());
    let mut session = ProbeSession::new(
        clock.clone(),
        choices,
        CalibratedLatency::global(),
        JsonLinesSink::new(out),
    );

    session.calibrate(
        &mut device,
        &MediaRef::new(config.calibration.cue.as_str()),
        config.calibration.samples,
    )?;

    for i in 0..trials {
        let item = (i + 1).to_string();
        let audio_file = format!("item{item}.wav");
        session.begin_trial(TrialMetadata {
            stimulus: format!("item-{item}"),
            kind: "simulated".into(),
            block: "1".into(),
            order: item.clone(),
            item: item.clone(),
            subject: "sim".into(),
            audio_file: audio_file.clone(),
        })?;
        session.play(&mut device, &MediaRef::new(audio_file))?;
        clock.sleep(config.simulation.response_after());
        session.record_response(&labels[i % labels.len()])?;
        session.finish_trial()?;
    }

    info!(
        trials = session.completed_trials(),
        audio_latency = %session.audio_latency(),
        "simulation finished"
    );
    Ok(())
}
