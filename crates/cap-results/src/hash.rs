//! Content-based hashing for sweep ids.

use crate::ResultsResult;
use cap_core::ParameterMap;
use sha2::{Digest, Sha256};

/// SHA-256 over the device and sweep sections plus the engine version.
///
/// `ParameterMap` keeps its keys ordered, so equal studies hash equally
/// regardless of the key order in the study file.
pub fn compute_sweep_id(
    device: &ParameterMap,
    ragone: &ParameterMap,
    engine_version: &str,
) -> ResultsResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(device)?.as_bytes());
    hasher.update(serde_json::to_string(ragone)?.as_bytes());
    hasher.update(engine_version.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
