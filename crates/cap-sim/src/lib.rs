//! cap-sim: discharge protocols, the adaptive discharge controller and
//! Ragone sweeps over equivalent-circuit devices.

pub mod discharge;
pub mod error;
pub mod exact;
pub mod protocol;
pub mod ragone;
pub mod report;

pub use discharge::find_power_energy;
pub use error::{SimError, SimResult};
pub use exact::{ExactDischarge, ExactSolution};
pub use protocol::{DischargeMode, DischargeOutcome, DischargeProtocol};
pub use ragone::{
    CrossCheckedPoint, RagonePoint, RagoneSweep, SweepReport, SweepTermination, cross_check,
};
pub use report::{format_ragone_line, write_ragone_line, write_ragone_table};
