//! Study files: a device section plus the protocols to run on it.
//!
//! ```yaml
//! device:
//!   type: SeriesRC
//!   series_resistance: 0.001
//!   capacitance: 1.0
//! discharge:
//!   discharge_mode: constant_current
//!   discharge_current: 1.0
//!   initial_voltage: 2.0
//!   final_voltage: 1.0
//!   time_step: 0.1
//! ragone:
//!   discharge_mode: constant_power
//!   discharge_power_lower_limit: 0.1
//!   discharge_power_upper_limit: 10.0
//!   steps_per_decade: 3
//!   initial_voltage: 2.0
//!   final_voltage: 1.0
//!   time_step: 0.01
//! output:
//!   directory: runs
//! ```

use crate::error::{AppError, AppResult};
use cap_core::{ExecutionContext, ParameterMap};
use cap_sim::{DischargeProtocol, RagoneSweep};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyFile {
    pub device: ParameterMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge: Option<ParameterMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ragone: Option<ParameterMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDef {
    pub directory: PathBuf,
}

impl StudyFile {
    pub fn discharge_protocol(&self) -> AppResult<DischargeProtocol> {
        let section = self
            .discharge
            .as_ref()
            .ok_or_else(|| AppError::Validation("Study has no discharge section".to_string()))?;
        Ok(DischargeProtocol::from_parameters(section)?)
    }

    pub fn ragone_sweep(&self) -> AppResult<RagoneSweep> {
        let section = self
            .ragone
            .as_ref()
            .ok_or_else(|| AppError::Validation("Study has no ragone section".to_string()))?;
        Ok(RagoneSweep::from_parameters(section)?)
    }
}

/// Load a study from a YAML file.
pub fn load_study(path: &Path) -> AppResult<StudyFile> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::StudyFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_yaml::from_str(&content)
        .map_err(|e| AppError::Study(format!("Failed to parse study YAML: {}", e)))
}

/// Load a study from a JSON file.
pub fn load_study_json(path: &Path) -> AppResult<StudyFile> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::StudyFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::Study(format!("Failed to parse study JSON: {}", e)))
}

/// Save a study to a YAML file.
pub fn save_study(path: &Path, study: &StudyFile) -> AppResult<()> {
    let content = serde_yaml::to_string(study)
        .map_err(|e| AppError::Study(format!("Failed to serialize study: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::StudyFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Check that every section present builds.
pub fn validate_study(study: &StudyFile) -> AppResult<()> {
    if study.discharge.is_none() && study.ragone.is_none() {
        return Err(AppError::Validation(
            "Study must have a discharge or a ragone section".to_string(),
        ));
    }

    cap_devices::build_device(&study.device, &ExecutionContext::serial())?;
    if study.discharge.is_some() {
        study.discharge_protocol()?;
    }
    if study.ragone.is_some() {
        study.ragone_sweep()?;
    }

    Ok(())
}
