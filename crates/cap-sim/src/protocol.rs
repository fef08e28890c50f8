//! Discharge protocol inputs and outcomes.

use crate::error::{SimError, SimResult};
use cap_core::ParameterMap;
use cap_devices::{DeviceResult, EnergyStorageDevice};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MIN_STEPS_PER_DISCHARGE: usize = 10;
pub const DEFAULT_MAX_STEPS_PER_DISCHARGE: usize = 100;
pub const DEFAULT_STEP_CAP: usize = 10_000_000;

/// Control law imposed on the device while it discharges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DischargeMode {
    ConstantCurrent,
    ConstantPower,
    ConstantLoad,
}

impl DischargeMode {
    pub const ALL: [DischargeMode; 3] = [
        DischargeMode::ConstantCurrent,
        DischargeMode::ConstantPower,
        DischargeMode::ConstantLoad,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            DischargeMode::ConstantCurrent => "constant_current",
            DischargeMode::ConstantPower => "constant_power",
            DischargeMode::ConstantLoad => "constant_load",
        }
    }

    pub fn from_tag(tag: &str) -> SimResult<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.tag() == tag)
            .ok_or_else(|| SimError::UnknownDischargeMode {
                mode: tag.to_string(),
            })
    }

    /// Parameter key holding the magnitude for this mode.
    pub fn magnitude_key(self) -> &'static str {
        match self {
            DischargeMode::ConstantCurrent => "discharge_current",
            DischargeMode::ConstantPower => "discharge_power",
            DischargeMode::ConstantLoad => "discharge_load",
        }
    }

    pub fn is_sweepable(self) -> bool {
        matches!(
            self,
            DischargeMode::ConstantCurrent | DischargeMode::ConstantPower
        )
    }
}

impl fmt::Display for DischargeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Immutable description of one discharge attempt.
///
/// `magnitude` is the positive size of the control input: amperes drawn,
/// watts drawn or ohms of load, depending on `mode`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DischargeProtocol {
    pub mode: DischargeMode,
    pub magnitude: f64,
    pub initial_voltage: f64,
    pub final_voltage: f64,
    pub time_step: f64,
    pub min_steps_per_discharge: usize,
    pub max_steps_per_discharge: usize,
    /// Hard limit on steps in a single pass.
    pub step_cap: usize,
}

impl DischargeProtocol {
    pub fn new(
        mode: DischargeMode,
        magnitude: f64,
        initial_voltage: f64,
        final_voltage: f64,
        time_step: f64,
    ) -> SimResult<Self> {
        let protocol = Self {
            mode,
            magnitude,
            initial_voltage,
            final_voltage,
            time_step,
            min_steps_per_discharge: DEFAULT_MIN_STEPS_PER_DISCHARGE,
            max_steps_per_discharge: DEFAULT_MAX_STEPS_PER_DISCHARGE,
            step_cap: DEFAULT_STEP_CAP,
        };
        protocol.validate()?;
        Ok(protocol)
    }

    /// Read a single-discharge protocol; the magnitude comes from the
    /// mode-specific key (`discharge_current`, `discharge_power` or
    /// `discharge_load`).
    pub fn from_parameters(params: &ParameterMap) -> SimResult<Self> {
        let mode = DischargeMode::from_tag(params.get_str("discharge_mode")?)?;
        let magnitude = params.get_f64(mode.magnitude_key())?;
        Self::with_magnitude_from_parameters(params, mode, magnitude)
    }

    /// Read every field except the magnitude, which the caller supplies.
    pub fn with_magnitude_from_parameters(
        params: &ParameterMap,
        mode: DischargeMode,
        magnitude: f64,
    ) -> SimResult<Self> {
        let protocol = Self {
            mode,
            magnitude,
            initial_voltage: params.get_f64("initial_voltage")?,
            final_voltage: params.get_f64("final_voltage")?,
            time_step: params.get_f64("time_step")?,
            min_steps_per_discharge: params
                .get_usize_or("min_steps_per_discharge", DEFAULT_MIN_STEPS_PER_DISCHARGE)?,
            max_steps_per_discharge: params.get_usize_or(
                "max_steps_per_discharge",
                params.get_usize_or("max_steps_per_decade", DEFAULT_MAX_STEPS_PER_DISCHARGE)?,
            )?,
            step_cap: params.get_usize_or("step_cap", DEFAULT_STEP_CAP)?,
        };
        protocol.validate()?;
        Ok(protocol)
    }

    pub fn with_magnitude(&self, magnitude: f64) -> Self {
        Self {
            magnitude,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.magnitude.is_finite() && self.magnitude > 0.0) {
            return Err(SimError::InvalidArg {
                what: "discharge magnitude must be positive and finite",
            });
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SimError::InvalidArg {
                what: "time_step must be positive",
            });
        }
        if !(self.initial_voltage.is_finite() && self.final_voltage.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "voltages must be finite",
            });
        }
        if self.initial_voltage <= self.final_voltage {
            return Err(SimError::InvalidArg {
                what: "initial_voltage must exceed final_voltage",
            });
        }
        if self.max_steps_per_discharge == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps_per_discharge must be positive",
            });
        }
        if self.max_steps_per_discharge < self.min_steps_per_discharge {
            return Err(SimError::InvalidArg {
                what: "max_steps_per_discharge must be at least min_steps_per_discharge",
            });
        }
        if self.step_cap == 0 {
            return Err(SimError::InvalidArg {
                what: "step_cap must be positive",
            });
        }
        Ok(())
    }

    /// Advance the device by one step under this protocol's control law.
    pub fn evolve(&self, device: &mut dyn EnergyStorageDevice, dt: f64) -> DeviceResult<()> {
        match self.mode {
            DischargeMode::ConstantCurrent => {
                device.evolve_one_time_step_constant_current(dt, -self.magnitude)
            }
            DischargeMode::ConstantPower => {
                device.evolve_one_time_step_constant_power(dt, -self.magnitude)
            }
            DischargeMode::ConstantLoad => device.evolve_one_time_step_constant_load(dt, self.magnitude),
        }
    }
}

/// What a completed discharge measured.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DischargeOutcome {
    /// Mean power delivered (energy over discharge time), watts.
    pub power: f64,
    /// Energy delivered, joules.
    pub energy: f64,
    pub discharge_time: f64,
    pub steps: usize,
    /// Step size of the accepted pass.
    pub time_step: f64,
    /// 0 when the first pass was accepted, 1 after a refinement.
    pub refinements: usize,
}
