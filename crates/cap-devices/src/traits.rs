//! Core traits for energy storage devices.

use crate::error::DeviceResult;
use crate::parallel_rc::ParallelRc;
use crate::series_rc::SeriesRc;
use crate::snapshot::DeviceSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device topology tag, spelled the way study files and snapshots spell it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "SeriesRC")]
    SeriesRc,
    #[serde(rename = "ParallelRC")]
    ParallelRc,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 2] = [DeviceKind::SeriesRc, DeviceKind::ParallelRc];

    pub fn tag(self) -> &'static str {
        match self {
            DeviceKind::SeriesRc => "SeriesRC",
            DeviceKind::ParallelRc => "ParallelRC",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Trait implemented by every equivalent-circuit device.
///
/// Sign convention: current and power are positive while charging and
/// negative while discharging. A load resistance is always positive.
///
/// Every `evolve_*` call leaves voltage and current consistent with the
/// applied control input; a failed call leaves the state untouched.
pub trait EnergyStorageDevice: fmt::Debug + Send {
    /// Topology tag of the concrete device.
    fn kind(&self) -> DeviceKind;

    /// Advance by `dt` seconds with the branch current held at `current`.
    fn evolve_one_time_step_constant_current(&mut self, dt: f64, current: f64)
    -> DeviceResult<()>;

    /// Advance by `dt` seconds with the terminal voltage held at `voltage`.
    fn evolve_one_time_step_constant_voltage(&mut self, dt: f64, voltage: f64)
    -> DeviceResult<()>;

    /// Advance by `dt` seconds delivering `power` (`voltage * current`).
    fn evolve_one_time_step_constant_power(&mut self, dt: f64, power: f64) -> DeviceResult<()>;

    /// Advance by `dt` seconds discharging through a load resistance.
    fn evolve_one_time_step_constant_load(&mut self, dt: f64, load: f64) -> DeviceResult<()>;

    /// Terminal voltage (V).
    fn voltage(&self) -> f64;

    /// Branch current (A).
    fn current(&self) -> f64;

    /// Discard history and start from rest at `voltage`.
    fn reset_voltage(&mut self, voltage: f64) -> DeviceResult<()>;

    /// Double dispatch: hand the concrete device to `inspector`.
    fn accept(&mut self, inspector: &mut dyn DeviceInspector);

    /// Full internal state, tagged with the device kind.
    fn snapshot(&self) -> DeviceSnapshot;
}

/// Visitor over the closed set of device variants.
///
/// Each variant calls the method matching its own type, so inspection code
/// can read or mutate variant-specific internals without downcasting.
pub trait DeviceInspector {
    fn inspect_series_rc(&mut self, device: &mut SeriesRc);

    fn inspect_parallel_rc(&mut self, device: &mut ParallelRc);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for kind in DeviceKind::ALL {
            assert_eq!(DeviceKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(DeviceKind::from_tag("SuperCapacitor"), None);
    }

    #[test]
    fn serde_uses_tags() {
        let json = serde_json::to_string(&DeviceKind::ParallelRc).unwrap();
        assert_eq!(json, "\"ParallelRC\"");
    }
}
