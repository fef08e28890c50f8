//! Execution context handed to device builders.
//!
//! Runs are single-process. The context carries no state yet, so builders
//! keep a stable signature if distributed devices are added.

/// Opaque description of where a device is being built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    _private: (),
}

impl ExecutionContext {
    /// Single-process context.
    pub fn serial() -> Self {
        Self { _private: () }
    }
}
