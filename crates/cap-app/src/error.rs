//! Error types for the cap-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Study error: {0}")]
    Study(String),

    #[error("Failed to read study file: {path}")]
    StudyFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write study file: {path}")]
    StudyFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Study validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cap-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cap_core::CapError> for AppError {
    fn from(err: cap_core::CapError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<cap_devices::DeviceError> for AppError {
    fn from(err: cap_devices::DeviceError) -> Self {
        AppError::Device(err.to_string())
    }
}

impl From<cap_sim::SimError> for AppError {
    fn from(err: cap_sim::SimError) -> Self {
        if err.is_configuration() {
            AppError::Config(err.to_string())
        } else {
            AppError::Simulation(err.to_string())
        }
    }
}

impl From<cap_results::ResultsError> for AppError {
    fn from(err: cap_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
