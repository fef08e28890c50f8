//! Adaptive discharge controller.
//!
//! A discharge is integrated from `initial_voltage` down to `final_voltage`
//! with a fixed step. When the first pass resolves the discharge in fewer
//! than `min_steps_per_discharge` steps, the step is refined to
//! `elapsed / max_steps_per_discharge` and the discharge is redone once.

use crate::error::{SimError, SimResult};
use crate::protocol::{DischargeOutcome, DischargeProtocol};
use cap_devices::EnergyStorageDevice;
use tracing::debug;

#[derive(Clone, Copy, Debug)]
struct Pass {
    steps: usize,
    time: f64,
    energy: f64,
}

/// Discharge `device` under `protocol` and report mean power and energy.
///
/// The device is reset to `initial_voltage` at the start of every pass and
/// is left in its end-of-discharge state.
pub fn find_power_energy(
    device: &mut dyn EnergyStorageDevice,
    protocol: &DischargeProtocol,
) -> SimResult<DischargeOutcome> {
    protocol.validate()?;

    let mut time_step = protocol.time_step;
    let mut refinements = 0;
    let mut pass = run_pass(device, protocol, time_step)?;
    debug!(
        mode = %protocol.mode,
        magnitude = protocol.magnitude,
        time_step,
        steps = pass.steps,
        "discharge pass complete"
    );

    if pass.steps < protocol.min_steps_per_discharge {
        time_step = pass.time / protocol.max_steps_per_discharge as f64;
        refinements = 1;
        pass = run_pass(device, protocol, time_step)?;
        debug!(
            mode = %protocol.mode,
            magnitude = protocol.magnitude,
            time_step,
            steps = pass.steps,
            "refined discharge pass complete"
        );
    }

    Ok(DischargeOutcome {
        power: pass.energy / pass.time,
        energy: pass.energy,
        discharge_time: pass.time,
        steps: pass.steps,
        time_step,
        refinements,
    })
}

fn run_pass(
    device: &mut dyn EnergyStorageDevice,
    protocol: &DischargeProtocol,
    time_step: f64,
) -> SimResult<Pass> {
    device.reset_voltage(protocol.initial_voltage)?;

    let mut pass = Pass {
        steps: 0,
        time: 0.0,
        energy: 0.0,
    };
    let mut voltage = device.voltage();
    while voltage >= protocol.final_voltage {
        if pass.steps >= protocol.step_cap {
            return Err(SimError::ConvergenceFailed {
                what: "final voltage not reached before the step cap",
                steps: pass.steps,
            });
        }
        protocol.evolve(device, time_step)?;
        pass.steps += 1;
        pass.time += time_step;
        voltage = device.voltage();
        let current = device.current();
        pass.energy -= voltage * current * time_step;
    }
    Ok(pass)
}
