//! Unified error type for the bleprov client.

use bleprov_protocol::{Characteristic, DeviceId, ProtocolError};
use bleprov_session::SessionError;
use bleprov_transport::TransportError;

/// Top-level error returned by [`Provisioner`](crate::Provisioner)
/// operations.
///
/// Outbound calls report encoding and capability problems here,
/// synchronously, before anything touches the transport. Inbound
/// decode failures never surface as errors (or events) — they are
/// logged and the notification is dropped.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// A transport-level error (submit queue gone, adapter missing).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (request record failed to encode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (device not connected).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The connected peripheral does not expose the characteristic
    /// this operation needs — it does not implement this protocol
    /// extension.
    #[error("device {device} does not expose {characteristic}")]
    CapabilityMissing {
        device: DeviceId,
        characteristic: Characteristic,
    },
}
