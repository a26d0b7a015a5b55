use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Failed to read config file '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}", path = path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Run configuration for a [`Simulation`](super::simulation::Simulation).
///
/// `steps` is the run target; everything else defaults to off. Writer
/// intervals are consumed by the [`workflows`](crate::workflows) layer when
/// it registers the standard observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub steps: u64,
    #[serde(default)]
    pub checkpoint_interval: u64,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub restart: bool,
    #[serde(default)]
    pub enable_speedometer: bool,
    #[serde(default)]
    pub trajectory_interval: u64,
    #[serde(default)]
    pub thermo_interval: u64,
}

impl SimulationConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    steps: Option<u64>,
    checkpoint_interval: Option<u64>,
    output_path: Option<PathBuf>,
    restart: Option<bool>,
    enable_speedometer: Option<bool>,
    trajectory_interval: Option<u64>,
    thermo_interval: Option<u64>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(mut self, steps: u64) -> Self {
        self.steps = Some(steps);
        self
    }
    pub fn checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = Some(interval);
        self
    }
    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }
    pub fn restart(mut self, restart: bool) -> Self {
        self.restart = Some(restart);
        self
    }
    pub fn enable_speedometer(mut self, enable: bool) -> Self {
        self.enable_speedometer = Some(enable);
        self
    }
    pub fn trajectory_interval(mut self, interval: u64) -> Self {
        self.trajectory_interval = Some(interval);
        self
    }
    pub fn thermo_interval(mut self, interval: u64) -> Self {
        self.thermo_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        Ok(SimulationConfig {
            steps: self.steps.ok_or(ConfigError::MissingParameter("steps"))?,
            checkpoint_interval: self.checkpoint_interval.unwrap_or(0),
            output_path: self.output_path,
            restart: self.restart.unwrap_or(false),
            enable_speedometer: self.enable_speedometer.unwrap_or(false),
            trajectory_interval: self.trajectory_interval.unwrap_or(0),
            thermo_interval: self.thermo_interval.unwrap_or(0),
        })
    }
}
