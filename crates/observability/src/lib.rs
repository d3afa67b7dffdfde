//! Tracing/logging setup shared by the binaries.

/// Install the process-wide subscriber with the given output format.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}

/// Subscriber construction (filter, formatter).
pub mod tracing;

pub use tracing::{LogFormat, UnknownLogFormat};
