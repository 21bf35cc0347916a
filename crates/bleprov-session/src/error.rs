//! Error types for the session layer.

/// Errors that can occur during session lookups.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given device — it was never connected
    /// or has already disconnected. Callers treat this as "operation
    /// not possible right now", never as a crash.
    #[error("no session for device {0}")]
    NotFound(bleprov_protocol::DeviceId),
}
