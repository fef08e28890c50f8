//! Builder, inspector and persistence checks across every device kind.

use cap_core::{ExecutionContext, ParameterMap};
use cap_devices::{
    DeviceError, DeviceInspector, DeviceKind, DeviceRegistry, EnergyStorageDevice, ParallelRc,
    SeriesRc, build_device,
};
use proptest::prelude::*;

fn series_rc_params() -> ParameterMap {
    ParameterMap::new()
        .with("type", "SeriesRC")
        .with("series_resistance", 50e-3)
        .with("capacitance", 3.0)
        .with("initial_voltage", 1.1)
}

fn parallel_rc_params() -> ParameterMap {
    ParameterMap::new()
        .with("type", "ParallelRC")
        .with("series_resistance", 50e-3)
        .with("parallel_resistance", 2.5e6)
        .with("capacitance", 3.0)
        .with("initial_voltage", 1.1)
}

fn valid_device_inputs() -> Vec<ParameterMap> {
    vec![series_rc_params(), parallel_rc_params()]
}

#[test]
fn builders_accept_valid_inputs_and_reject_unknown_type() {
    let ctx = ExecutionContext::serial();
    for params in valid_device_inputs() {
        assert!(build_device(&params, &ctx).is_ok());
    }

    let params = ParameterMap::new().with("type", "InvalidDeviceType");
    assert!(matches!(
        build_device(&params, &ctx),
        Err(DeviceError::UnknownType { .. })
    ));
}

/// Names the concrete type, then forces the terminal voltage to 1.4 V.
#[derive(Default)]
struct ClampInspector {
    seen: Option<DeviceKind>,
}

impl DeviceInspector for ClampInspector {
    fn inspect_series_rc(&mut self, device: &mut SeriesRc) {
        self.seen = Some(DeviceKind::SeriesRc);
        device.evolve_one_time_step_constant_voltage(1.0, 1.4).unwrap();
    }

    fn inspect_parallel_rc(&mut self, device: &mut ParallelRc) {
        self.seen = Some(DeviceKind::ParallelRc);
        device.evolve_one_time_step_constant_voltage(1.0, 1.4).unwrap();
    }
}

#[test]
fn inspector_reaches_concrete_device() {
    let mut device = build_device(&series_rc_params(), &ExecutionContext::serial()).unwrap();
    assert_ne!(device.voltage(), 1.4);

    let mut inspector = ClampInspector::default();
    device.accept(&mut inspector);

    assert_eq!(inspector.seen, Some(DeviceKind::SeriesRc));
    assert_eq!(device.voltage(), 1.4);
}

#[test]
fn serialization_round_trip_is_exact() {
    let registry = DeviceRegistry::with_builtin();
    for params in valid_device_inputs() {
        let mut original = build_device(&params, &ExecutionContext::serial()).unwrap();
        original
            .evolve_one_time_step_constant_voltage(0.1, 2.1)
            .unwrap();

        let stream = registry.save(original.as_ref()).unwrap();
        assert!(!stream.is_empty());

        let mut restored = registry.restore(&stream).unwrap();
        assert_eq!(restored.kind(), original.kind());
        assert_eq!(restored.voltage(), original.voltage());
        assert_eq!(restored.current(), original.current());

        // identical futures
        original
            .evolve_one_time_step_constant_power(0.05, -0.3)
            .unwrap();
        restored
            .evolve_one_time_step_constant_power(0.05, -0.3)
            .unwrap();
        assert_eq!(restored.voltage(), original.voltage());
        assert_eq!(restored.current(), original.current());
    }
}

fn arb_device() -> impl Strategy<Value = Box<dyn EnergyStorageDevice>> {
    (
        0.0_f64..1.0,
        1.0_f64..1.0e3,
        0.1_f64..10.0,
        0.5_f64..3.0,
        any::<bool>(),
    )
        .prop_map(|(r_s, r_p, c, u0, parallel)| {
            let mut params = ParameterMap::new()
                .with("series_resistance", r_s)
                .with("capacitance", c)
                .with("initial_voltage", u0);
            if parallel {
                params.put("type", "ParallelRC");
                params.put("parallel_resistance", r_p);
            } else {
                params.put("type", "SeriesRC");
            }
            build_device(&params, &ExecutionContext::serial()).unwrap()
        })
}

proptest! {
    #[test]
    fn restored_device_is_observationally_identical(
        mut device in arb_device(),
        steps in prop::collection::vec((1e-4_f64..0.5, -2.0_f64..0.0), 1..8),
    ) {
        for (dt, current) in &steps {
            device.evolve_one_time_step_constant_current(*dt, *current).unwrap();
        }
        let registry = DeviceRegistry::with_builtin();
        let stream = registry.save(device.as_ref()).unwrap();
        let mut restored = registry.restore(&stream).unwrap();
        prop_assert_eq!(restored.voltage(), device.voltage());
        prop_assert_eq!(restored.current(), device.current());

        device.evolve_one_time_step_constant_load(0.01, 1.0).unwrap();
        restored.evolve_one_time_step_constant_load(0.01, 1.0).unwrap();
        prop_assert_eq!(restored.voltage(), device.voltage());
        prop_assert_eq!(restored.current(), device.current());
    }

    #[test]
    fn load_step_obeys_ohms_law(mut device in arb_device(), dt in 1e-4_f64..1.0, load in 0.1_f64..100.0) {
        device.evolve_one_time_step_constant_load(dt, load).unwrap();
        let residual = device.voltage() + load * device.current();
        prop_assert!(residual.abs() <= 1e-12 * device.voltage().abs().max(1.0));
    }
}
