use crate::error::ConfigError;
use lexprobe_core::ChoiceSet;
use lexprobe_timing::DEFAULT_CUE;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockSource {
    #[default]
    Monotonic,
    Wall,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default = "CalibrationConfig::default_cue")]
    pub cue: String,
    #[serde(default = "CalibrationConfig::default_samples")]
    pub samples: usize,
}

impl CalibrationConfig {
    fn default_cue() -> String {
        DEFAULT_CUE.to_string()
    }

    fn default_samples() -> usize {
        1
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            cue: Self::default_cue(),
            samples: Self::default_samples(),
        }
    }
}

/// Parameters for the simulated playback device and participant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_device_delay_ms")]
    pub device_delay_ms: u64,
    #[serde(default)]
    pub jitter_ms: u64,
    #[serde(default = "SimulationConfig::default_seed")]
    pub seed: u64,
    #[serde(default = "SimulationConfig::default_response_after_ms")]
    pub response_after_ms: u64,
}

impl SimulationConfig {
    fn default_device_delay_ms() -> u64 {
        120
    }

    fn default_seed() -> u64 {
        42
    }

    fn default_response_after_ms() -> u64 {
        780
    }

    pub fn device_delay(&self) -> Duration {
        Duration::from_millis(self.device_delay_ms)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }

    pub fn response_after(&self) -> Duration {
        Duration::from_millis(self.response_after_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            device_delay_ms: Self::default_device_delay_ms(),
            jitter_ms: 0,
            seed: Self::default_seed(),
            response_after_ms: Self::default_response_after_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub clock: ClockSource,
    #[serde(default = "ProbeConfig::default_choices")]
    pub choices: Vec<String>,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl ProbeConfig {
    fn default_choices() -> Vec<String> {
        vec!["no".into(), "yes".into()]
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: ProbeConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.choice_set()?;
        if self.calibration.samples == 0 {
            return Err(ConfigError::NoCalibrationSamples);
        }
        Ok(())
    }

    pub fn choice_set(&self) -> Result<ChoiceSet, ConfigError> {
        Ok(ChoiceSet::new(&self.choices)?)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            clock: ClockSource::default(),
            choices: Self::default_choices(),
            calibration: CalibrationConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}
