use super::config::ConfigError;
use crate::core::io::xyz::XyzError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Backend failed while advancing to step {step}: {message}")]
    Backend { step: u64, message: String },

    #[error("Observer '{label}' failed at step {step}: {source}")]
    Observer {
        label: String,
        step: u64,
        #[source]
        source: Box<EngineError>,
    },

    #[error("Checkpoint failed at step {step}: {source}")]
    Checkpoint {
        step: u64,
        #[source]
        source: Box<EngineError>,
    },

    #[error("Trajectory I/O failed: {source}")]
    Trajectory {
        #[from]
        source: XyzError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
