//! cap-results: on-disk storage for Ragone sweeps and device checkpoints.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::compute_sweep_id;
pub use store::RagoneStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Device error: {0}")]
    Device(#[from] cap_devices::DeviceError),

    #[error("Sweep not found: {sweep_id}")]
    SweepNotFound { sweep_id: String },

    #[error("No checkpoint stored for sweep {sweep_id}")]
    CheckpointNotFound { sweep_id: String },
}
