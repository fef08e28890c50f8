//! cap-devices: equivalent-circuit energy storage devices.
//!
//! Provides:
//! - `SeriesRc`: capacitor in series with a resistor
//! - `ParallelRc`: leakage resistor across the capacitor, plus a series resistor
//! - `build_device`: factory keyed by the `type` parameter
//! - `DeviceInspector`: visitor giving typed access to a concrete device
//! - `DeviceRegistry`: tagged checkpoint/restore of full device state
//!
//! All devices implement the `EnergyStorageDevice` trait and advance their
//! state with closed-form one-step updates.
//!
//! # Example
//!
//! ```
//! use cap_core::{ExecutionContext, ParameterMap};
//! use cap_devices::build_device;
//!
//! let params = ParameterMap::new()
//!     .with("type", "SeriesRC")
//!     .with("series_resistance", 0.1)
//!     .with("capacitance", 2.5)
//!     .with("initial_voltage", 2.0);
//!
//! let mut device = build_device(&params, &ExecutionContext::serial()).unwrap();
//! device.evolve_one_time_step_constant_current(0.1, -1.0).unwrap();
//! assert!(device.voltage() < 2.0);
//! ```

pub mod builder;
pub mod common;
pub mod error;
pub mod inspect;
pub mod parallel_rc;
pub mod series_rc;
pub mod snapshot;
pub mod traits;

// Re-exports
pub use builder::build_device;
pub use common::CircuitState;
pub use error::{DeviceError, DeviceResult};
pub use inspect::ParameterInspector;
pub use parallel_rc::ParallelRc;
pub use series_rc::SeriesRc;
pub use snapshot::{DeviceRegistry, DeviceSnapshot, ParallelRcSnapshot, SeriesRcSnapshot};
pub use traits::{DeviceInspector, DeviceKind, EnergyStorageDevice};
