//! Checkpoint and restore of device state.
//!
//! A snapshot is a self-describing JSON object tagged with the device type:
//!
//! ```json
//! {"type":"SeriesRC","series_resistance":0.1,"capacitance":2.5,
//!  "state":{"capacitor_voltage":2.04,"voltage":2.1,"current":0.6}}
//! ```
//!
//! Restoring goes through a [`DeviceRegistry`]: the tag is resolved against
//! the kinds registered by the caller before any state is decoded.

use crate::common::CircuitState;
use crate::error::{DeviceError, DeviceResult};
use crate::parallel_rc::ParallelRc;
use crate::series_rc::SeriesRc;
use crate::traits::{DeviceKind, EnergyStorageDevice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRcSnapshot {
    pub series_resistance: f64,
    pub capacitance: f64,
    pub state: CircuitState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelRcSnapshot {
    pub series_resistance: f64,
    pub parallel_resistance: f64,
    pub capacitance: f64,
    pub state: CircuitState,
}

/// Full state of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeviceSnapshot {
    #[serde(rename = "SeriesRC")]
    SeriesRc(SeriesRcSnapshot),
    #[serde(rename = "ParallelRC")]
    ParallelRc(ParallelRcSnapshot),
}

impl DeviceSnapshot {
    pub fn kind(&self) -> DeviceKind {
        match self {
            DeviceSnapshot::SeriesRc(_) => DeviceKind::SeriesRc,
            DeviceSnapshot::ParallelRc(_) => DeviceKind::ParallelRc,
        }
    }

    /// Rebuild a live device from this snapshot.
    pub fn into_device(self) -> DeviceResult<Box<dyn EnergyStorageDevice>> {
        Ok(match self {
            DeviceSnapshot::SeriesRc(s) => Box::new(SeriesRc::from_snapshot(s)?),
            DeviceSnapshot::ParallelRc(s) => Box::new(ParallelRc::from_snapshot(s)?),
        })
    }
}

/// Closed registry of device kinds accepted when saving and restoring.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    kinds: BTreeSet<DeviceKind>,
}

impl DeviceRegistry {
    /// Empty registry; nothing can be saved or restored until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in device kind.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for kind in DeviceKind::ALL {
            registry.register(kind);
        }
        registry
    }

    pub fn register(&mut self, kind: DeviceKind) -> &mut Self {
        self.kinds.insert(kind);
        self
    }

    pub fn is_registered(&self, kind: DeviceKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn check(&self, kind: DeviceKind) -> DeviceResult<()> {
        if self.is_registered(kind) {
            Ok(())
        } else {
            Err(DeviceError::UnregisteredType {
                tag: kind.tag().to_string(),
            })
        }
    }

    /// Serialize `device` into a tagged JSON token stream.
    pub fn save(&self, device: &dyn EnergyStorageDevice) -> DeviceResult<String> {
        self.check(device.kind())?;
        Ok(serde_json::to_string(&device.snapshot())?)
    }

    /// Decode a snapshot, resolving its tag against the registry first.
    pub fn decode(&self, stream: &str) -> DeviceResult<DeviceSnapshot> {
        let value: serde_json::Value = serde_json::from_str(stream)?;
        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| DeviceError::Serialization {
                message: "snapshot has no type tag".to_string(),
            })?;
        let kind = DeviceKind::from_tag(tag).ok_or_else(|| DeviceError::UnregisteredType {
            tag: tag.to_string(),
        })?;
        self.check(kind)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Reconstruct a device from a stream produced by [`DeviceRegistry::save`].
    pub fn restore(&self, stream: &str) -> DeviceResult<Box<dyn EnergyStorageDevice>> {
        self.decode(stream)?.into_device()
    }
}
