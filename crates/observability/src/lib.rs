//! Process-wide logging setup shared by the binaries.

/// Structured log output (JSON lines, `RUST_LOG` filtering).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize JSON logging with the `info` default filter.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER, LogFormat::Json);
}
