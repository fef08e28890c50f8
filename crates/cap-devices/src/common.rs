//! Closed-form single-step response shared by the RC devices.
//!
//! Over one step of length `dt` with the branch current held at `I`, both
//! topologies update the capacitor voltage affinely,
//!
//! ```text
//! U_C(t + dt) = a * U_C(t) + b * I
//! U           = U_C(t + dt) + R_s * I
//! ```
//!
//! so the current required by a power or load constraint at the end of the
//! step has a closed form.

use crate::error::{DeviceError, DeviceResult};
use cap_core::numeric::ensure_finite;
use serde::{Deserialize, Serialize};

/// Ensure a value is finite, returning DeviceError if not.
pub fn check_finite(value: f64, what: &'static str) -> DeviceResult<f64> {
    ensure_finite(value, what).map_err(|_| DeviceError::NonPhysical { what })
}

/// Reject non-positive or non-finite time steps.
pub fn check_time_step(dt: f64) -> DeviceResult<f64> {
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(DeviceError::InvalidArg {
            what: "time step must be positive",
        })
    }
}

/// Coefficients of the affine one-step update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResponse {
    /// Capacitor voltage carried over from the previous step.
    pub a: f64,
    /// Capacitor voltage gained per ampere of branch current.
    pub b: f64,
    /// Resistance in series with the capacitor branch.
    pub series_resistance: f64,
}

impl StepResponse {
    /// Total resistance seen by the branch current within one step.
    fn stiffness(&self) -> f64 {
        self.b + self.series_resistance
    }

    /// Current that makes `U * I == power` at the end of the step.
    ///
    /// Solves `(b + R_s) I^2 + a U_C I - P = 0` and keeps the root that tends
    /// to `P / U_C` as the resistances vanish.
    pub fn current_for_power(&self, capacitor_voltage: f64, power: f64) -> DeviceResult<f64> {
        if power == 0.0 {
            return Ok(0.0);
        }
        let m = self.a * capacitor_voltage;
        let discriminant = m * m + 4.0 * self.stiffness() * power;
        if discriminant < 0.0 {
            return Err(DeviceError::NonPhysical {
                what: "requested power exceeds what the device can deliver",
            });
        }
        let denominator = m + discriminant.sqrt();
        if denominator == 0.0 {
            return Err(DeviceError::NonPhysical {
                what: "no current satisfies the requested power",
            });
        }
        check_finite(2.0 * power / denominator, "constant power current")
    }

    /// Current drawn by a load resistance connected across the terminals.
    pub fn current_for_load(&self, capacitor_voltage: f64, load: f64) -> DeviceResult<f64> {
        if !(load.is_finite() && load >= 0.0) {
            return Err(DeviceError::InvalidArg {
                what: "load resistance must be non-negative",
            });
        }
        check_finite(
            -self.a * capacitor_voltage / (load + self.stiffness()),
            "constant load current",
        )
    }
}

/// Electrical state shared by the RC devices.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircuitState {
    /// Voltage across the capacitor (V).
    pub capacitor_voltage: f64,
    /// Terminal voltage (V).
    pub voltage: f64,
    /// Branch current (A).
    pub current: f64,
}

impl CircuitState {
    /// At rest: no current, terminal voltage equals capacitor voltage.
    pub fn at_rest(voltage: f64) -> Self {
        Self {
            capacitor_voltage: voltage,
            voltage,
            current: 0.0,
        }
    }

    /// Apply the affine update with the given branch current.
    pub fn advance(&mut self, response: &StepResponse, current: f64) -> DeviceResult<()> {
        let capacitor_voltage = check_finite(
            response.a * self.capacitor_voltage + response.b * current,
            "capacitor voltage",
        )?;
        let voltage = check_finite(
            capacitor_voltage + response.series_resistance * current,
            "terminal voltage",
        )?;
        *self = Self {
            capacitor_voltage,
            voltage,
            current,
        };
        Ok(())
    }
}
