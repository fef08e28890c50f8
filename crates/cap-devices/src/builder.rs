//! Device factory.

use crate::error::{DeviceError, DeviceResult};
use crate::parallel_rc::ParallelRc;
use crate::series_rc::SeriesRc;
use crate::traits::{DeviceKind, EnergyStorageDevice};
use cap_core::context::ExecutionContext;
use cap_core::params::ParameterMap;

/// Build a device from its parameter section.
///
/// `type` selects the topology; the remaining keys are topology specific.
/// An unrecognized `type` fails before anything is constructed.
pub fn build_device(
    params: &ParameterMap,
    _context: &ExecutionContext,
) -> DeviceResult<Box<dyn EnergyStorageDevice>> {
    let type_name = params.get_str("type")?;
    let kind = DeviceKind::from_tag(type_name).ok_or_else(|| DeviceError::UnknownType {
        type_name: type_name.to_string(),
    })?;
    Ok(match kind {
        DeviceKind::SeriesRc => Box::new(SeriesRc::from_parameters(params)?),
        DeviceKind::ParallelRc => Box::new(ParallelRc::from_parameters(params)?),
    })
}
