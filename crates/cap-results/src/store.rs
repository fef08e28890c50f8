//! Sweep storage API.
//!
//! Layout under the store root, one directory per sweep id:
//! `manifest.json`, `points.jsonl` and optionally `checkpoint.json`.

use crate::types::SweepManifest;
use crate::{ResultsError, ResultsResult};
use cap_devices::{DeviceRegistry, EnergyStorageDevice};
use cap_sim::RagonePoint;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct RagoneStore {
    root_dir: PathBuf,
}

impl RagoneStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn sweep_dir(&self, sweep_id: &str) -> PathBuf {
        self.root_dir.join(sweep_id)
    }

    pub fn has_sweep(&self, sweep_id: &str) -> bool {
        self.sweep_dir(sweep_id).join("manifest.json").exists()
    }

    pub fn save_sweep(&self, manifest: &SweepManifest, points: &[RagonePoint]) -> ResultsResult<()> {
        let sweep_dir = self.sweep_dir(&manifest.sweep_id);
        fs::create_dir_all(&sweep_dir)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(sweep_dir.join("manifest.json"), manifest_json)?;

        let mut content = String::new();
        for point in points {
            content.push_str(&serde_json::to_string(point)?);
            content.push('\n');
        }
        fs::write(sweep_dir.join("points.jsonl"), content)?;
        Ok(())
    }

    pub fn load_manifest(&self, sweep_id: &str) -> ResultsResult<SweepManifest> {
        let path = self.sweep_dir(sweep_id).join("manifest.json");
        if !path.exists() {
            return Err(ResultsError::SweepNotFound {
                sweep_id: sweep_id.to_string(),
            });
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn load_points(&self, sweep_id: &str) -> ResultsResult<Vec<RagonePoint>> {
        let path = self.sweep_dir(sweep_id).join("points.jsonl");
        if !path.exists() {
            return Err(ResultsError::SweepNotFound {
                sweep_id: sweep_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        let mut points = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                points.push(serde_json::from_str(line)?);
            }
        }
        Ok(points)
    }

    pub fn list_sweeps(&self) -> ResultsResult<Vec<SweepManifest>> {
        let mut sweeps = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let sweep_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&sweep_id) {
                    sweeps.push(manifest);
                }
            }
        }
        sweeps.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(sweeps)
    }

    pub fn delete_sweep(&self, sweep_id: &str) -> ResultsResult<()> {
        let sweep_dir = self.sweep_dir(sweep_id);
        if sweep_dir.exists() {
            fs::remove_dir_all(sweep_dir)?;
        }
        Ok(())
    }

    /// Store the full state of `device` next to the sweep.
    pub fn save_checkpoint(
        &self,
        sweep_id: &str,
        registry: &DeviceRegistry,
        device: &dyn EnergyStorageDevice,
    ) -> ResultsResult<PathBuf> {
        let sweep_dir = self.sweep_dir(sweep_id);
        fs::create_dir_all(&sweep_dir)?;
        let path = sweep_dir.join("checkpoint.json");
        fs::write(&path, registry.save(device)?)?;
        Ok(path)
    }

    pub fn load_checkpoint(
        &self,
        sweep_id: &str,
        registry: &DeviceRegistry,
    ) -> ResultsResult<Box<dyn EnergyStorageDevice>> {
        let path = self.sweep_dir(sweep_id).join("checkpoint.json");
        if !path.exists() {
            return Err(ResultsError::CheckpointNotFound {
                sweep_id: sweep_id.to_string(),
            });
        }
        Ok(registry.restore(&fs::read_to_string(path)?)?)
    }
}
