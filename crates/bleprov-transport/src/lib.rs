//! Transport abstraction layer for bleprov.
//!
//! The BLE radio stack is an external collaborator; this crate pins
//! down its boundary. A central is a capability with two halves:
//!
//! - outbound: non-blocking [`Command`] submission via the
//!   [`BleCentral`] trait — nothing here blocks the caller;
//! - inbound: a stream of [`TransportEvent`]s delivered over a tokio
//!   mpsc channel, in arrival order.
//!
//! Completion of a command is never a return value — it shows up later
//! as an event (or not at all, for fire-and-forget scans).
//!
//! # Feature flags
//!
//! - `btleplug` — real central backed by the `btleplug` crate

mod error;

#[cfg(feature = "btleplug")]
mod central;

pub use error::TransportError;

#[cfg(feature = "btleplug")]
pub use central::BtleplugCentral;

use bleprov_protocol::DeviceId;
use uuid::Uuid;

/// Power/availability state of the host's BLE adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralState {
    Unknown,
    Unsupported,
    PoweredOff,
    PoweredOn,
}

/// An operation submitted to the central. All submits are
/// fire-and-forget at this layer; results arrive as
/// [`TransportEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Begin advertising-report scanning.
    StartScan,
    /// Stop scanning.
    StopScan,
    /// Initiate a connection to a discovered device.
    Connect(DeviceId),
    /// Tear down the connection to a device.
    Disconnect(DeviceId),
    /// Discover the services on a connected device.
    DiscoverServices(DeviceId),
    /// Discover the characteristics of one service.
    DiscoverCharacteristics { device: DeviceId, service: Uuid },
    /// Subscribe to notifications on a characteristic.
    Subscribe {
        device: DeviceId,
        characteristic: Uuid,
    },
    /// Read a characteristic; the value is delivered as a
    /// [`TransportEvent::Notification`].
    Read {
        device: DeviceId,
        characteristic: Uuid,
    },
    /// One acknowledged (write-with-response) characteristic write.
    Write {
        device: DeviceId,
        characteristic: Uuid,
        payload: Vec<u8>,
    },
}

/// An event reported by the central. The dispatcher consumes these in
/// arrival order; per-device ordering is the transport's contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The adapter changed power/availability state.
    AdapterStateChanged(CentralState),
    /// A peripheral was discovered while scanning.
    DeviceDiscovered(DeviceId),
    /// A connection attempt succeeded.
    Connected(DeviceId),
    /// A connection attempt failed.
    ConnectFailed { device: DeviceId, reason: String },
    /// The link to a device dropped. `cause` is `None` for clean,
    /// host-initiated teardown.
    Disconnected {
        device: DeviceId,
        cause: Option<String>,
    },
    /// Service discovery completed.
    ServicesDiscovered {
        device: DeviceId,
        services: Vec<Uuid>,
    },
    /// Characteristic discovery completed for one service.
    CharacteristicsDiscovered {
        device: DeviceId,
        service: Uuid,
        characteristics: Vec<Uuid>,
    },
    /// A notification (or read result) arrived on a characteristic.
    Notification {
        device: DeviceId,
        characteristic: Uuid,
        payload: Vec<u8>,
    },
}

/// A BLE central as seen by the dispatcher: a non-blocking command
/// sink. The matching event stream is handed out by the concrete
/// implementation's constructor.
pub trait BleCentral: Send + Sync + 'static {
    /// Queues one command for execution.
    ///
    /// # Errors
    /// Returns [`TransportError::SubmitFailed`] if the central's
    /// executor is gone. Command execution failures are reported as
    /// events, not here.
    fn submit(&self, command: Command) -> Result<(), TransportError>;
}
