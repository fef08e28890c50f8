//! Stored sweep metadata.

use cap_sim::{DischargeMode, SweepReport, SweepTermination};
use serde::{Deserialize, Serialize};

pub type SweepId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepManifest {
    pub sweep_id: SweepId,
    pub timestamp: String,
    pub device_type: String,
    pub mode: DischargeMode,
    pub termination: SweepTermination,
    pub point_count: usize,
    pub engine_version: String,
}

impl SweepManifest {
    /// Describe `report`, stamped with the current UTC time.
    pub fn for_report(
        sweep_id: SweepId,
        device_type: impl Into<String>,
        report: &SweepReport,
        engine_version: impl Into<String>,
    ) -> Self {
        Self {
            sweep_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            device_type: device_type.into(),
            mode: report.mode,
            termination: report.termination.clone(),
            point_count: report.points.len(),
            engine_version: engine_version.into(),
        }
    }
}
