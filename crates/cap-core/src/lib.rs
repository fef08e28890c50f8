//! cap-core: shared foundation for the cap workspace.
//!
//! Contains:
//! - units (uom SI circuit element types + constructors)
//! - numeric (Real + tolerances + float helpers + report formatting)
//! - params (string-keyed parameter maps read from study files)
//! - context (opaque execution context handed to device builders)
//! - error (shared error types)

pub mod context;
pub mod error;
pub mod numeric;
pub mod params;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use context::ExecutionContext;
pub use error::{CapError, CapResult};
pub use numeric::*;
pub use params::{ParamValue, ParameterMap};
pub use units::*;
