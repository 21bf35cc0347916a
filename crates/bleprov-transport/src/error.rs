//! Error types for the transport layer.

use bleprov_protocol::DeviceId;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The command channel to the central's executor is closed.
    #[error("central executor is gone, command not submitted")]
    SubmitFailed,

    /// A command referenced a device the central has never seen.
    #[error("unknown device {0}")]
    DeviceUnknown(DeviceId),

    /// No usable Bluetooth adapter on this host.
    #[error("no Bluetooth adapter available")]
    AdapterUnavailable,

    /// An error surfaced verbatim from the platform BLE stack.
    #[error("BLE backend error: {0}")]
    Backend(String),
}
