//! Error types for discharge and sweep operations.

use cap_core::error::CapError;
use cap_devices::DeviceError;
use thiserror::Error;

/// Errors encountered while discharging a device or sweeping a protocol.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid discharge mode {mode}")]
    UnknownDischargeMode { mode: String },

    #[error("Discharge mode {mode} cannot be swept")]
    UnsupportedSweepMode { mode: String },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Convergence failed: {what} after {steps} steps")]
    ConvergenceFailed { what: &'static str, steps: usize },

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Configuration error: {0}")]
    Config(#[from] CapError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// True for failures caused by the inputs rather than by the numerics.
    pub fn is_configuration(&self) -> bool {
        match self {
            SimError::InvalidArg { .. }
            | SimError::UnknownDischargeMode { .. }
            | SimError::UnsupportedSweepMode { .. }
            | SimError::Config(_) => true,
            SimError::Device(e) => matches!(
                e,
                DeviceError::InvalidArg { .. }
                    | DeviceError::UnknownType { .. }
                    | DeviceError::Config(_)
            ),
            SimError::NonPhysical { .. } | SimError::ConvergenceFailed { .. } => false,
        }
    }
}
