//! Time-stepped discharges converge to the closed-form solutions.

use cap_core::ParameterMap;
use cap_core::numeric::relative_error;
use cap_devices::{EnergyStorageDevice, ParallelRc, SeriesRc};
use cap_sim::{DischargeMode, DischargeProtocol, ExactSolution, find_power_energy};
use cap_core::units::{farad, ohm};

const MODES: [(DischargeMode, f64); 3] = [
    (DischargeMode::ConstantCurrent, 0.5),
    (DischargeMode::ConstantPower, 0.5),
    (DischargeMode::ConstantLoad, 2.0),
];

fn devices() -> Vec<Box<dyn EnergyStorageDevice>> {
    vec![
        Box::new(SeriesRc::new(ohm(0.05), farad(3.0), 0.0).unwrap()),
        Box::new(ParallelRc::new(ohm(0.05), ohm(20.0), farad(3.0), 0.0).unwrap()),
    ]
}

#[test]
fn discharge_error_is_first_order_in_time_step() {
    for mut device in devices() {
        for (mode, magnitude) in MODES {
            for time_step in [1e-2, 1e-3] {
                let protocol = DischargeProtocol::new(mode, magnitude, 2.0, 1.0, time_step).unwrap();
                let exact = ExactSolution::for_device(device.as_mut(), &protocol)
                    .unwrap()
                    .evaluate(magnitude)
                    .unwrap();
                let outcome = find_power_energy(device.as_mut(), &protocol).unwrap();

                let label = format!("{} {mode} dt={time_step}", device.kind());
                assert_eq!(outcome.refinements, 0, "{label}");
                assert!(
                    (outcome.discharge_time - exact.discharge_time).abs() <= 1.5 * time_step,
                    "{label}: time {} vs {}",
                    outcome.discharge_time,
                    exact.discharge_time
                );
                assert!(
                    relative_error(outcome.energy, exact.energy).abs() <= 0.1 * time_step,
                    "{label}: energy {} vs {}",
                    outcome.energy,
                    exact.energy
                );
                assert!(
                    relative_error(outcome.power, exact.power()).abs() <= 0.5 * time_step,
                    "{label}: power {} vs {}",
                    outcome.power,
                    exact.power()
                );
            }
        }
    }
}

#[test]
fn energy_error_shrinks_with_time_step() {
    for mut device in devices() {
        for (mode, magnitude) in MODES {
            let mut errors = Vec::new();
            for time_step in [1e-2, 1e-3] {
                let protocol = DischargeProtocol::new(mode, magnitude, 2.0, 1.0, time_step).unwrap();
                let exact = ExactSolution::for_device(device.as_mut(), &protocol)
                    .unwrap()
                    .evaluate(magnitude)
                    .unwrap();
                let outcome = find_power_energy(device.as_mut(), &protocol).unwrap();
                errors.push(relative_error(outcome.energy, exact.energy).abs());
            }
            assert!(errors[1] < errors[0], "{} {mode}: {errors:?}", device.kind());
        }
    }
}

#[test]
fn exact_solution_from_study_parameters_matches_inspection() {
    let params = ParameterMap::new()
        .with("type", "ParallelRC")
        .with("series_resistance", 0.05)
        .with("parallel_resistance", 20.0)
        .with("capacitance", 3.0);
    let protocol =
        DischargeProtocol::new(DischargeMode::ConstantCurrent, 0.5, 2.0, 1.0, 1e-3).unwrap();
    let mut device = cap_devices::build_device(&params, &Default::default()).unwrap();
    assert_eq!(
        ExactSolution::from_parameters(&params, &protocol).unwrap(),
        ExactSolution::for_device(device.as_mut(), &protocol).unwrap()
    );
}
