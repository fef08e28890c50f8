//! Discharge and Ragone execution, result caching and checkpoints.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cap_core::ExecutionContext;
use cap_devices::{DeviceRegistry, EnergyStorageDevice, ParameterInspector, build_device};
use cap_results::{RagoneStore, SweepManifest, compute_sweep_id};
use cap_sim::{
    CrossCheckedPoint, DischargeOutcome, ExactDischarge, ExactSolution, RagonePoint, SweepReport,
    SweepTermination, cross_check, find_power_energy,
};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::study::StudyFile;

/// Options for running studies.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
    /// Compare every result with the closed-form solution.
    pub exact: bool,
    /// Store the end-of-run device state next to the sweep.
    pub checkpoint: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            exact: false,
            checkpoint: false,
        }
    }
}

/// Result of a single discharge.
#[derive(Debug, Clone)]
pub struct DischargeResponse {
    pub device_type: String,
    pub device_parameters: BTreeMap<String, f64>,
    pub outcome: DischargeOutcome,
    pub exact: Option<ExactDischarge>,
}

/// Result of a Ragone sweep.
#[derive(Debug, Clone)]
pub struct RagoneResponse {
    pub sweep_id: String,
    pub device_type: String,
    pub device_parameters: BTreeMap<String, f64>,
    pub report: SweepReport,
    pub cross_checked: Option<Vec<CrossCheckedPoint>>,
    pub manifest: Option<SweepManifest>,
    pub loaded_from_cache: bool,
}

/// Type tag and circuit parameters of `device`.
pub fn describe_device(device: &mut dyn EnergyStorageDevice) -> (String, BTreeMap<String, f64>) {
    let mut inspector = ParameterInspector::new();
    device.accept(&mut inspector);
    let type_name = inspector
        .kind
        .map(|kind| kind.tag().to_string())
        .unwrap_or_else(|| device.kind().tag().to_string());
    (type_name, inspector.parameters)
}

fn build_study_device(study: &StudyFile) -> AppResult<Box<dyn EnergyStorageDevice>> {
    Ok(build_device(&study.device, &ExecutionContext::serial())?)
}

/// Run the study's discharge section once.
pub fn run_discharge(study: &StudyFile, options: &RunOptions) -> AppResult<DischargeResponse> {
    let protocol = study.discharge_protocol()?;
    let mut device = build_study_device(study)?;
    let (device_type, device_parameters) = describe_device(device.as_mut());

    let exact = if options.exact {
        let solution = ExactSolution::for_device(device.as_mut(), &protocol)?;
        Some(solution.evaluate(protocol.magnitude)?)
    } else {
        None
    };

    let outcome = find_power_energy(device.as_mut(), &protocol)?;
    info!(
        steps = outcome.steps,
        power = outcome.power,
        energy = outcome.energy,
        "discharge complete"
    );

    Ok(DischargeResponse {
        device_type,
        device_parameters,
        outcome,
        exact,
    })
}

/// Run the study's Ragone sweep, or load it from the output directory.
pub fn run_ragone(study: &StudyFile, options: &RunOptions) -> AppResult<RagoneResponse> {
    run_ragone_with_progress(study, options, None)
}

/// Run the Ragone sweep, handing each newly measured point to `progress_cb`.
///
/// Points loaded from the cache are not streamed.
pub fn run_ragone_with_progress(
    study: &StudyFile,
    options: &RunOptions,
    mut progress_cb: Option<&mut dyn FnMut(&RagonePoint)>,
) -> AppResult<RagoneResponse> {
    let sweep = study.ragone_sweep()?;
    let ragone = study
        .ragone
        .as_ref()
        .ok_or_else(|| AppError::Validation("Study has no ragone section".to_string()))?;
    let mut device = build_study_device(study)?;
    let (device_type, device_parameters) = describe_device(device.as_mut());
    let sweep_id = compute_sweep_id(&study.device, ragone, &options.engine_version)?;

    let store = match &study.output {
        Some(output) => Some(RagoneStore::new(output.directory.clone())?),
        None => None,
    };

    let cached = match &store {
        Some(store) if options.use_cache && store.has_sweep(&sweep_id) => {
            info!(%sweep_id, "loading cached sweep");
            let manifest = store.load_manifest(&sweep_id)?;
            let points = store.load_points(&sweep_id)?;
            Some((manifest, points))
        }
        _ => None,
    };

    let (report, manifest, loaded_from_cache) = match cached {
        Some((manifest, points)) => {
            if options.checkpoint {
                // Device state is not part of the cache; replay to reach it.
                info!(%sweep_id, "replaying cached sweep for checkpoint");
                sweep.run(device.as_mut());
            }
            let report = rebuild_report(&manifest, points);
            (report, Some(manifest), true)
        }
        None => {
            let report = sweep.run_with(device.as_mut(), |point| {
                if let Some(cb) = progress_cb.as_deref_mut() {
                    cb(point);
                }
            });
            let manifest = match &store {
                Some(store) => {
                    let manifest = SweepManifest::for_report(
                        sweep_id.clone(),
                        device_type.clone(),
                        &report,
                        options.engine_version.clone(),
                    );
                    store.save_sweep(&manifest, &report.points)?;
                    Some(manifest)
                }
                None => None,
            };
            (report, manifest, false)
        }
    };

    if options.checkpoint {
        match &store {
            Some(store) => {
                let registry = DeviceRegistry::with_builtin();
                let path = store.save_checkpoint(&sweep_id, &registry, device.as_ref())?;
                info!(path = %path.display(), "stored device checkpoint");
            }
            None => warn!("checkpoint requested but the study has no output directory"),
        }
    }

    let cross_checked = if options.exact {
        let exact = ExactSolution::for_device(device.as_mut(), sweep.template())?;
        Some(cross_check(&report, &exact)?)
    } else {
        None
    };

    if !report.termination.is_complete() {
        warn!(
            termination = ?report.termination,
            points = report.points.len(),
            "sweep ended before its upper limit"
        );
    }

    Ok(RagoneResponse {
        sweep_id,
        device_type,
        device_parameters,
        report,
        cross_checked,
        manifest,
        loaded_from_cache,
    })
}

/// The attempted values are the accepted ones plus the one that stopped the
/// sweep, so a stored sweep rebuilds its report exactly.
fn rebuild_report(manifest: &SweepManifest, points: Vec<RagonePoint>) -> SweepReport {
    let mut swept: Vec<f64> = points.iter().map(|p| p.swept_value).collect();
    match &manifest.termination {
        SweepTermination::RangeExhausted => {}
        SweepTermination::ResolutionFloor { value }
        | SweepTermination::NumericalFailure { value, .. } => swept.push(*value),
    }
    SweepReport {
        mode: manifest.mode,
        swept,
        points,
        termination: manifest.termination.clone(),
    }
}

/// Discharge the study device, then write its full state to `path`.
pub fn checkpoint_device(study: &StudyFile, path: &Path) -> AppResult<PathBuf> {
    let protocol = study.discharge_protocol()?;
    let mut device = build_study_device(study)?;
    find_power_energy(device.as_mut(), &protocol)?;

    let stream = DeviceRegistry::with_builtin().save(device.as_ref())?;
    std::fs::write(path, stream)?;
    info!(path = %path.display(), kind = %device.kind(), "checkpoint written");
    Ok(path.to_path_buf())
}

/// Read a checkpoint written by [`checkpoint_device`].
pub fn restore_device(path: &Path) -> AppResult<Box<dyn EnergyStorageDevice>> {
    let stream = std::fs::read_to_string(path)?;
    Ok(DeviceRegistry::with_builtin().restore(&stream)?)
}
