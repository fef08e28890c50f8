//! Resistor in series with a parallel RC branch.

use crate::common::{CircuitState, StepResponse, check_finite, check_time_step};
use crate::error::{DeviceError, DeviceResult};
use crate::snapshot::{DeviceSnapshot, ParallelRcSnapshot};
use crate::traits::{DeviceInspector, DeviceKind, EnergyStorageDevice};
use cap_core::numeric::ensure_positive;
use cap_core::params::ParameterMap;
use cap_core::units::{Capacitance, Resistance, farad, ohm};

/// Parallel RC equivalent circuit.
///
/// ```text
///              +--[ R_p ]--+
///  o--[ R_s ]--+           +--o
///              +--| C |----+
/// ```
///
/// The branch current splits between the leakage resistor and the
/// capacitor. For a constant branch current the capacitor voltage decays
/// exponentially toward `R_p I` with time constant `R_p C`.
#[derive(Debug, Clone)]
pub struct ParallelRc {
    /// Series resistance (ohm), non-negative
    pub series_resistance: Resistance,
    /// Leakage resistance across the capacitor (ohm), positive
    pub parallel_resistance: Resistance,
    /// Capacitance (farad), positive
    pub capacitance: Capacitance,
    state: CircuitState,
}

impl ParallelRc {
    /// Create a device at rest at `initial_voltage`.
    pub fn new(
        series_resistance: Resistance,
        parallel_resistance: Resistance,
        capacitance: Capacitance,
        initial_voltage: f64,
    ) -> DeviceResult<Self> {
        if !(series_resistance.value.is_finite() && series_resistance.value >= 0.0) {
            return Err(DeviceError::InvalidArg {
                what: "series_resistance must be non-negative",
            });
        }
        ensure_positive(
            parallel_resistance.value,
            "parallel_resistance must be positive",
        )?;
        ensure_positive(capacitance.value, "capacitance must be positive")?;
        let initial_voltage = check_finite(initial_voltage, "initial voltage")?;
        Ok(Self {
            series_resistance,
            parallel_resistance,
            capacitance,
            state: CircuitState::at_rest(initial_voltage),
        })
    }

    /// Build from a `type: ParallelRC` parameter section.
    pub fn from_parameters(params: &ParameterMap) -> DeviceResult<Self> {
        Self::new(
            ohm(params.get_f64("series_resistance")?),
            ohm(params.get_f64("parallel_resistance")?),
            farad(params.get_f64("capacitance")?),
            params.get_f64_or("initial_voltage", 0.0)?,
        )
    }

    /// Voltage across the capacitor (V).
    pub fn capacitor_voltage(&self) -> f64 {
        self.state.capacitor_voltage
    }

    /// Characteristic time constant `R_p C` (s).
    pub fn time_constant(&self) -> f64 {
        self.parallel_resistance.value * self.capacitance.value
    }

    fn step_response(&self, dt: f64) -> DeviceResult<StepResponse> {
        let dt = check_time_step(dt)?;
        let a = (-dt / self.time_constant()).exp();
        Ok(StepResponse {
            a,
            b: self.parallel_resistance.value * (1.0 - a),
            series_resistance: self.series_resistance.value,
        })
    }

    pub(crate) fn from_snapshot(snapshot: ParallelRcSnapshot) -> DeviceResult<Self> {
        let mut device = Self::new(
            ohm(snapshot.series_resistance),
            ohm(snapshot.parallel_resistance),
            farad(snapshot.capacitance),
            snapshot.state.capacitor_voltage,
        )?;
        device.state = snapshot.state;
        Ok(device)
    }
}

impl EnergyStorageDevice for ParallelRc {
    fn kind(&self) -> DeviceKind {
        DeviceKind::ParallelRc
    }

    fn evolve_one_time_step_constant_current(
        &mut self,
        dt: f64,
        current: f64,
    ) -> DeviceResult<()> {
        let response = self.step_response(dt)?;
        let current = check_finite(current, "applied current")?;
        self.state.advance(&response, current)
    }

    fn evolve_one_time_step_constant_voltage(
        &mut self,
        dt: f64,
        voltage: f64,
    ) -> DeviceResult<()> {
        let dt = check_time_step(dt)?;
        let voltage = check_finite(voltage, "applied voltage")?;
        let r_s = self.series_resistance.value;
        let r_p = self.parallel_resistance.value;
        if r_s == 0.0 {
            return Err(DeviceError::NonPhysical {
                what: "constant voltage across an ideal capacitor draws infinite current",
            });
        }
        // The capacitor sees the divider R_p / (R_s + R_p) of the applied
        // voltage through R_s || R_p.
        let equilibrium = voltage * r_p / (r_s + r_p);
        let tau = self.capacitance.value * r_s * r_p / (r_s + r_p);
        let decay = (-dt / tau).exp();
        let capacitor_voltage = check_finite(
            equilibrium + (self.state.capacitor_voltage - equilibrium) * decay,
            "capacitor voltage",
        )?;
        self.state = CircuitState {
            capacitor_voltage,
            voltage,
            current: (voltage - capacitor_voltage) / r_s,
        };
        Ok(())
    }

    fn evolve_one_time_step_constant_power(&mut self, dt: f64, power: f64) -> DeviceResult<()> {
        let response = self.step_response(dt)?;
        let power = check_finite(power, "applied power")?;
        let current = response.current_for_power(self.state.capacitor_voltage, power)?;
        self.state.advance(&response, current)
    }

    fn evolve_one_time_step_constant_load(&mut self, dt: f64, load: f64) -> DeviceResult<()> {
        let response = self.step_response(dt)?;
        let current = response.current_for_load(self.state.capacitor_voltage, load)?;
        self.state.advance(&response, current)
    }

    fn voltage(&self) -> f64 {
        self.state.voltage
    }

    fn current(&self) -> f64 {
        self.state.current
    }

    fn reset_voltage(&mut self, voltage: f64) -> DeviceResult<()> {
        self.state = CircuitState::at_rest(check_finite(voltage, "reset voltage")?);
        Ok(())
    }

    fn accept(&mut self, inspector: &mut dyn DeviceInspector) {
        inspector.inspect_parallel_rc(self);
    }

    fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot::ParallelRc(ParallelRcSnapshot {
            series_resistance: self.series_resistance.value,
            parallel_resistance: self.parallel_resistance.value,
            capacitance: self.capacitance.value,
            state: self.state,
        })
    }
}
