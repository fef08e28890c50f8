//! Shared application service layer for the cap workspace.
//!
//! Loads study files and runs discharges and Ragone sweeps on the devices
//! they describe, caching sweeps in the study's output directory.

pub mod error;
pub mod run_service;
pub mod study;

pub use error::{AppError, AppResult};
pub use run_service::{
    DischargeResponse, RagoneResponse, RunOptions, checkpoint_device, describe_device,
    restore_device, run_discharge, run_ragone, run_ragone_with_progress,
};
pub use study::{OutputDef, StudyFile, load_study, load_study_json, save_study, validate_study};
