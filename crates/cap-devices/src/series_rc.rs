//! Capacitor in series with a resistor.

use crate::common::{CircuitState, StepResponse, check_finite, check_time_step};
use crate::error::{DeviceError, DeviceResult};
use crate::snapshot::{DeviceSnapshot, SeriesRcSnapshot};
use crate::traits::{DeviceInspector, DeviceKind, EnergyStorageDevice};
use cap_core::numeric::ensure_positive;
use cap_core::params::ParameterMap;
use cap_core::units::{Capacitance, Resistance, farad, ohm};

/// Series RC equivalent circuit.
///
/// ```text
///  o---[ R ]---| C |---o
/// ```
///
/// The branch current is uniform, so a constant current changes the
/// capacitor voltage linearly: `U_C += I dt / C`.
#[derive(Debug, Clone)]
pub struct SeriesRc {
    /// Series resistance (ohm), non-negative
    pub series_resistance: Resistance,
    /// Capacitance (farad), positive
    pub capacitance: Capacitance,
    state: CircuitState,
}

impl SeriesRc {
    /// Create a device at rest at `initial_voltage`.
    pub fn new(
        series_resistance: Resistance,
        capacitance: Capacitance,
        initial_voltage: f64,
    ) -> DeviceResult<Self> {
        if !(series_resistance.value.is_finite() && series_resistance.value >= 0.0) {
            return Err(DeviceError::InvalidArg {
                what: "series_resistance must be non-negative",
            });
        }
        ensure_positive(capacitance.value, "capacitance must be positive")?;
        let initial_voltage = check_finite(initial_voltage, "initial voltage")?;
        Ok(Self {
            series_resistance,
            capacitance,
            state: CircuitState::at_rest(initial_voltage),
        })
    }

    /// Build from a `type: SeriesRC` parameter section.
    pub fn from_parameters(params: &ParameterMap) -> DeviceResult<Self> {
        Self::new(
            ohm(params.get_f64("series_resistance")?),
            farad(params.get_f64("capacitance")?),
            params.get_f64_or("initial_voltage", 0.0)?,
        )
    }

    /// Voltage across the capacitor (V).
    pub fn capacitor_voltage(&self) -> f64 {
        self.state.capacitor_voltage
    }

    fn step_response(&self, dt: f64) -> DeviceResult<StepResponse> {
        let dt = check_time_step(dt)?;
        Ok(StepResponse {
            a: 1.0,
            b: dt / self.capacitance.value,
            series_resistance: self.series_resistance.value,
        })
    }

    pub(crate) fn from_snapshot(snapshot: SeriesRcSnapshot) -> DeviceResult<Self> {
        let mut device = Self::new(
            ohm(snapshot.series_resistance),
            farad(snapshot.capacitance),
            snapshot.state.capacitor_voltage,
        )?;
        device.state = snapshot.state;
        Ok(device)
    }
}

impl EnergyStorageDevice for SeriesRc {
    fn kind(&self) -> DeviceKind {
        DeviceKind::SeriesRc
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
        let r = self.series_resistance.value;
        if r == 0.0 {
            return Err(DeviceError::NonPhysical {
                what: "constant voltage across an ideal capacitor draws infinite current",
            });
        }
        // Exact relaxation of U_C toward the applied voltage.
        let decay = (-dt / (r * self.capacitance.value)).exp();
        let capacitor_voltage = check_finite(
            voltage - (voltage - self.state.capacitor_voltage) * decay,
            "capacitor voltage",
        )?;
        self.state = CircuitState {
            capacitor_voltage,
            voltage,
            current: (voltage - capacitor_voltage) / r,
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
        inspector.inspect_series_rc(self);
    }

    fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot::SeriesRc(SeriesRcSnapshot {
            series_resistance: self.series_resistance.value,
            capacitance: self.capacitance.value,
            state: self.state,
        })
    }
}
