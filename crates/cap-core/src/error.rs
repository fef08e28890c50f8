use thiserror::Error;

pub type CapResult<T> = Result<T, CapError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Missing required parameter: {key}")]
    MissingParameter { key: String },

    #[error("Parameter {key} has the wrong type (expected {expected})")]
    WrongParameterType { key: String, expected: &'static str },
}
