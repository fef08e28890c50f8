//! Closed-form discharge solutions for the equivalent circuits.
//!
//! Used to cross-check the time-stepped discharges. All solutions stop at
//! the moment the terminal voltage reaches `final_voltage`.

use crate::error::{SimError, SimResult};
use crate::protocol::{DischargeMode, DischargeProtocol};
use cap_core::ParameterMap;
use cap_devices::{DeviceError, DeviceKind, EnergyStorageDevice, ParameterInspector};
use serde::{Deserialize, Serialize};

/// Exact discharge time and delivered energy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExactDischarge {
    pub discharge_time: f64,
    pub energy: f64,
}

impl ExactDischarge {
    pub fn power(&self) -> f64 {
        self.energy / self.discharge_time
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExactSolution {
    pub kind: DeviceKind,
    pub mode: DischargeMode,
    pub series_resistance: f64,
    /// Only meaningful for `ParallelRC`.
    pub parallel_resistance: f64,
    pub capacitance: f64,
    pub initial_voltage: f64,
    pub final_voltage: f64,
}

impl ExactSolution {
    /// Build from a device section (`type`, resistances, `capacitance`).
    pub fn from_parameters(device: &ParameterMap, protocol: &DischargeProtocol) -> SimResult<Self> {
        let type_name = device.get_str("type")?;
        let kind = DeviceKind::from_tag(type_name).ok_or_else(|| {
            SimError::Device(DeviceError::UnknownType {
                type_name: type_name.to_string(),
            })
        })?;
        let parallel_resistance = match kind {
            DeviceKind::SeriesRc => f64::INFINITY,
            DeviceKind::ParallelRc => device.get_f64("parallel_resistance")?,
        };
        Ok(Self {
            kind,
            mode: protocol.mode,
            series_resistance: device.get_f64("series_resistance")?,
            parallel_resistance,
            capacitance: device.get_f64("capacitance")?,
            initial_voltage: protocol.initial_voltage,
            final_voltage: protocol.final_voltage,
        })
    }

    /// Build from a live device by inspecting its parameters.
    pub fn for_device(
        device: &mut dyn EnergyStorageDevice,
        protocol: &DischargeProtocol,
    ) -> SimResult<Self> {
        let mut inspector = ParameterInspector::new();
        device.accept(&mut inspector);
        let param = |key: &'static str| {
            inspector
                .parameters
                .get(key)
                .copied()
                .ok_or(SimError::InvalidArg {
                    what: "inspected device lacks a circuit parameter",
                })
        };
        let kind = device.kind();
        let parallel_resistance = match kind {
            DeviceKind::SeriesRc => f64::INFINITY,
            DeviceKind::ParallelRc => param("parallel_resistance")?,
        };
        Ok(Self {
            kind,
            mode: protocol.mode,
            series_resistance: param("series_resistance")?,
            parallel_resistance,
            capacitance: param("capacitance")?,
            initial_voltage: protocol.initial_voltage,
            final_voltage: protocol.final_voltage,
        })
    }

    /// Discharge time and energy at the given control magnitude.
    pub fn evaluate(&self, magnitude: f64) -> SimResult<ExactDischarge> {
        let (discharge_time, energy) = match (self.kind, self.mode) {
            (DeviceKind::SeriesRc, DischargeMode::ConstantCurrent) => {
                self.series_current(-magnitude)
            }
            (DeviceKind::ParallelRc, DischargeMode::ConstantCurrent) => {
                self.parallel_current(-magnitude)
            }
            (DeviceKind::SeriesRc, DischargeMode::ConstantPower) => {
                let energy = self.series_power_energy(-magnitude);
                (energy / magnitude, energy)
            }
            (DeviceKind::ParallelRc, DischargeMode::ConstantPower) => {
                let energy = self.parallel_power_energy(-magnitude);
                (energy / magnitude, energy)
            }
            (_, DischargeMode::ConstantLoad) => self.load(magnitude),
        };
        if !(discharge_time.is_finite() && energy.is_finite()) {
            return Err(SimError::NonPhysical {
                what: "no closed-form discharge for these parameters",
            });
        }
        if discharge_time < 0.0 {
            return Err(SimError::NonPhysical {
                what: "terminal voltage starts below final voltage",
            });
        }
        Ok(ExactDischarge {
            discharge_time,
            energy,
        })
    }

    fn series_current(&self, current: f64) -> (f64, f64) {
        let r = self.series_resistance;
        let c = self.capacitance;
        let v0 = self.initial_voltage;
        let vf = self.final_voltage;
        let t = (vf - v0 - r * current) * c / current;
        let energy =
            -((r * current * current + v0 * current) * t + current * current * t * t / (2.0 * c));
        (t, energy)
    }

    fn parallel_current(&self, current: f64) -> (f64, f64) {
        let rs = self.series_resistance;
        let rp = self.parallel_resistance;
        let c = self.capacitance;
        let v0 = self.initial_voltage;
        let vf = self.final_voltage;
        let tau = rp * c;
        let t = -tau * ((vf - (rs + rp) * current) / (v0 - rp * current)).ln();
        let energy = -((rs + rp) * current * current * t
            + (v0 * current - rp * current * current) * (-tau) * (-t / tau).exp_m1());
        (t, energy)
    }

    /// Terminal voltage at the first instant of a constant-power discharge.
    fn initial_terminal_voltage(&self, power: f64) -> f64 {
        let v0 = self.initial_voltage;
        v0 / 2.0 + (v0 * v0 / 4.0 + self.series_resistance * power).sqrt()
    }

    fn series_power_energy(&self, power: f64) -> f64 {
        let r = self.series_resistance;
        let c = self.capacitance;
        let vf = self.final_voltage;
        let u0 = self.initial_terminal_voltage(power);
        c / 2.0 * (r * power * ((u0 * u0) / (vf * vf)).ln() + u0 * u0 - vf * vf)
    }

    fn parallel_power_energy(&self, power: f64) -> f64 {
        let rs = self.series_resistance;
        let rp = self.parallel_resistance;
        let c = self.capacitance;
        let vf = self.final_voltage;
        let u0 = self.initial_terminal_voltage(power);
        let leak = power * (1.0 + rs / rp);
        let k = (vf * vf / rp - leak) / (u0 * u0 / rp - leak);
        c * power / 2.0 * (rp * k.ln() + rp * rs / (rp + rs) * (k * u0 * u0 / (vf * vf)).ln())
    }

    fn load(&self, load: f64) -> (f64, f64) {
        let rs = self.series_resistance;
        let c = self.capacitance;
        let v0 = self.initial_voltage;
        let vf = self.final_voltage;
        let external = rs + load;
        let tau = match self.kind {
            DeviceKind::SeriesRc => c * external,
            DeviceKind::ParallelRc => {
                let rp = self.parallel_resistance;
                c * rp * external / (rp + external)
            }
        };
        let divider = load / external;
        let u0 = divider * v0;
        let t = tau * (u0 / vf).ln();
        let energy = tau * (u0 * u0 - vf * vf) / (2.0 * load);
        (t, energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_core::units::{farad, ohm};
    use cap_devices::{ParallelRc, SeriesRc};

    fn protocol(mode: DischargeMode) -> DischargeProtocol {
        DischargeProtocol::new(mode, 1.0, 2.0, 1.0, 0.01).unwrap()
    }

    fn series(r: f64) -> ExactSolution {
        let mut device = SeriesRc::new(ohm(r), farad(1.0), 0.0).unwrap();
        ExactSolution::for_device(&mut device, &protocol(DischargeMode::ConstantCurrent)).unwrap()
    }

    #[test]
    fn ideal_capacitor_at_constant_current() {
        let exact = series(0.0).evaluate(1.0).unwrap();
        assert!((exact.discharge_time - 1.0).abs() < 1e-12);
        // E = C (V0^2 - Vf^2) / 2
        assert!((exact.energy - 1.5).abs() < 1e-12);
        assert!((exact.power() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn ir_drop_eating_the_window_gives_zero_time() {
        let exact = series(1.0).evaluate(1.0).unwrap();
        assert!(exact.discharge_time.abs() < 1e-12);
    }

    #[test]
    fn ir_drop_beyond_the_window_is_non_physical() {
        assert!(matches!(
            series(2.0).evaluate(1.0),
            Err(SimError::NonPhysical { .. })
        ));
    }

    #[test]
    fn parallel_power_tends_to_series_power_for_large_leak_resistance() {
        let params = ParameterMap::new()
            .with("type", "ParallelRC")
            .with("series_resistance", 0.05)
            .with("parallel_resistance", 1e9)
            .with("capacitance", 3.0);
        let proto = protocol(DischargeMode::ConstantPower);
        let parallel = ExactSolution::from_parameters(&params, &proto)
            .unwrap()
            .evaluate(0.5)
            .unwrap();
        let params = params.with("type", "SeriesRC");
        let series = ExactSolution::from_parameters(&params, &proto)
            .unwrap()
            .evaluate(0.5)
            .unwrap();
        assert!((parallel.energy - series.energy).abs() / series.energy < 1e-5);
    }

    #[test]
    fn load_energy_for_ideal_capacitor() {
        let params = ParameterMap::new()
            .with("type", "SeriesRC")
            .with("series_resistance", 0.0)
            .with("capacitance", 2.0);
        let exact = ExactSolution::from_parameters(&params, &protocol(DischargeMode::ConstantLoad))
            .unwrap()
            .evaluate(0.5)
            .unwrap();
        assert!((exact.discharge_time - 2.0_f64.ln()).abs() < 1e-12);
        assert!((exact.energy - 3.0).abs() < 1e-12);
    }

    #[test]
    fn inspected_parallel_matches_parameters() {
        let mut device = ParallelRc::new(ohm(0.05), ohm(20.0), farad(3.0), 0.0).unwrap();
        let proto = protocol(DischargeMode::ConstantCurrent);
        let exact = ExactSolution::for_device(&mut device, &proto).unwrap();
        assert_eq!(exact.kind, DeviceKind::ParallelRc);
        assert_eq!(exact.parallel_resistance, 20.0);
        assert_eq!(exact.capacitance, 3.0);
    }
}
