//! Ready-made device inspectors.

use crate::parallel_rc::ParallelRc;
use crate::series_rc::SeriesRc;
use crate::traits::{DeviceInspector, DeviceKind};
use std::collections::BTreeMap;

/// Records the device type and its circuit parameters.
#[derive(Debug, Clone, Default)]
pub struct ParameterInspector {
    pub kind: Option<DeviceKind>,
    pub parameters: BTreeMap<String, f64>,
}

impl ParameterInspector {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, key: &str, value: f64) {
        self.parameters.insert(key.to_string(), value);
    }
}

impl DeviceInspector for ParameterInspector {
    fn inspect_series_rc(&mut self, device: &mut SeriesRc) {
        self.kind = Some(DeviceKind::SeriesRc);
        self.record("series_resistance", device.series_resistance.value);
        self.record("capacitance", device.capacitance.value);
        self.record("capacitor_voltage", device.capacitor_voltage());
    }

    fn inspect_parallel_rc(&mut self, device: &mut ParallelRc) {
        self.kind = Some(DeviceKind::ParallelRc);
        self.record("series_resistance", device.series_resistance.value);
        self.record("parallel_resistance", device.parallel_resistance.value);
        self.record("capacitance", device.capacitance.value);
        self.record("capacitor_voltage", device.capacitor_voltage());
        self.record("time_constant", device.time_constant());
    }
}
