use cap_core::ParameterMap;
use cap_core::units::{farad, ohm};
use cap_devices::{DeviceError, DeviceKind, DeviceRegistry, EnergyStorageDevice, ParallelRc, SeriesRc};
use cap_results::*;
use cap_sim::{DischargeMode, DischargeProtocol, RagoneSweep, SweepTermination};

fn fresh_store(name: &str) -> RagoneStore {
    let temp_dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&temp_dir);
    RagoneStore::new(temp_dir).unwrap()
}

#[test]
fn save_and_load_sweep() {
    let store = fresh_store("cap_results_test");

    let mut device = SeriesRc::new(ohm(1e-3), farad(1.0), 0.0).unwrap();
    let template =
        DischargeProtocol::new(DischargeMode::ConstantCurrent, 0.1, 2.0, 1.0, 0.1).unwrap();
    let report = RagoneSweep::new(template, 0.1, 1.0, 2)
        .unwrap()
        .run(&mut device);

    let study_device = ParameterMap::new()
        .with("type", "SeriesRC")
        .with("series_resistance", 1e-3)
        .with("capacitance", 1.0);
    let sweep_id = compute_sweep_id(&study_device, &ParameterMap::new(), "v1").unwrap();
    let manifest = SweepManifest::for_report(sweep_id.clone(), "SeriesRC", &report, "v1");
    store.save_sweep(&manifest, &report.points).unwrap();

    assert!(store.has_sweep(&sweep_id));
    let loaded = store.load_manifest(&sweep_id).unwrap();
    assert_eq!(loaded, manifest);
    assert_eq!(loaded.termination, SweepTermination::RangeExhausted);
    assert_eq!(loaded.point_count, report.points.len());

    // float_roundtrip keeps every stored value bit-identical
    assert_eq!(store.load_points(&sweep_id).unwrap(), report.points);

    let listed = store.list_sweeps().unwrap();
    assert_eq!(listed.len(), 1);

    store.delete_sweep(&sweep_id).unwrap();
    assert!(!store.has_sweep(&sweep_id));
}

#[test]
fn missing_sweep_is_reported() {
    let store = fresh_store("cap_results_test_missing");
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::SweepNotFound { .. })
    ));
    assert!(matches!(
        store.load_checkpoint("nope", &DeviceRegistry::with_builtin()),
        Err(ResultsError::CheckpointNotFound { .. })
    ));
}

#[test]
fn checkpoint_round_trip() {
    let store = fresh_store("cap_results_test_checkpoint");
    let registry = DeviceRegistry::with_builtin();

    let mut device = ParallelRc::new(ohm(0.05), ohm(20.0), farad(3.0), 2.0).unwrap();
    device.evolve_one_time_step_constant_power(0.1, -0.7).unwrap();
    store.save_checkpoint("run-a", &registry, &device).unwrap();

    let mut restored = store.load_checkpoint("run-a", &registry).unwrap();
    assert_eq!(restored.kind(), DeviceKind::ParallelRc);
    assert_eq!(restored.voltage(), device.voltage());
    assert_eq!(restored.current(), device.current());

    device.evolve_one_time_step_constant_load(0.1, 4.0).unwrap();
    restored.evolve_one_time_step_constant_load(0.1, 4.0).unwrap();
    assert_eq!(restored.voltage(), device.voltage());
}

#[test]
fn checkpoint_with_unregistered_type_fails() {
    let store = fresh_store("cap_results_test_unregistered");
    let device = SeriesRc::new(ohm(0.1), farad(1.0), 1.0).unwrap();
    store
        .save_checkpoint("run-b", &DeviceRegistry::with_builtin(), &device)
        .unwrap();

    let mut parallel_only = DeviceRegistry::new();
    parallel_only.register(DeviceKind::ParallelRc);
    assert!(matches!(
        store.load_checkpoint("run-b", &parallel_only),
        Err(ResultsError::Device(DeviceError::UnregisteredType { .. }))
    ));
}
