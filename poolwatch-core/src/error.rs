//! Error types for the pool controller.

use poolwatch_types::{InPort, PacketError};
use thiserror::Error;

/// Errors a single controller invocation can report.
///
/// None of these are fatal: the pool and both cursors stay usable for the
/// next event, and a failed invocation never leaves a partial mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// The pool could not grow to hold a newly discovered device.
    #[error("Resource pool exhausted while adding device {device_id}")]
    ResourceExhausted { device_id: String },

    /// A cursor addresses a position the pool does not hold.
    #[error("No resource at index {index} (pool holds {len})")]
    NotFound { index: usize, len: usize },

    /// Telemetry arrived before any device was asked for it.
    #[error("No device has been fetched yet")]
    NothingFetched,

    /// An inbound packet could not be decoded for its port.
    #[error("Malformed packet on {port} port: {source}")]
    Malformed {
        port: InPort,
        #[source]
        source: PacketError,
    },
}

impl ControllerError {
    /// Whether this is one of the not-found conditions.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ControllerError::NotFound { .. } | ControllerError::NothingFetched
        )
    }
}
