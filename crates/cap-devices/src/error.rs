//! Error types for device operations.

use cap_core::error::CapError;
use thiserror::Error;

/// Errors that can occur while building, evolving or persisting a device.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Unknown device type: {type_name}")]
    UnknownType { type_name: String },

    #[error("Device type {tag} is not registered for persistence")]
    UnregisteredType { tag: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] CapError),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

impl From<serde_json::Error> for DeviceError {
    fn from(e: serde_json::Error) -> Self {
        DeviceError::Serialization {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DeviceError::UnknownType {
            type_name: "InvalidDeviceType".to_string(),
        };
        assert!(err.to_string().contains("InvalidDeviceType"));
    }

    #[test]
    fn config_errors_convert() {
        let err: DeviceError = CapError::MissingParameter {
            key: "capacitance".to_string(),
        }
        .into();
        assert!(matches!(err, DeviceError::Config(_)));
        assert!(err.to_string().contains("capacitance"));
    }
}
