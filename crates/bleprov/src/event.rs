//! Typed events emitted to subscribers.
//!
//! The source of truth for "something happened" is this enum, not
//! ambient global state: every observable outcome — lifecycle,
//! device-info values, network operation results — arrives here.
//! Inbound payloads that fail to decode are logged and dropped; they
//! never produce an event.

use bleprov_protocol::{DeviceId, NetworkRecord, OpStatus};
use bleprov_transport::CentralState;
use uuid::Uuid;

/// Everything a subscriber can observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionerEvent {
    /// The host adapter changed state.
    CentralStateChanged(CentralState),

    /// A new peripheral identity was discovered. Re-discovery of a
    /// known identity is dropped and never re-emitted.
    PeripheralDiscovered(DeviceId),

    /// A connection completed and a fresh session exists.
    PeripheralConnected(DeviceId),

    /// The session was torn down. `cause` is `None` for a clean,
    /// host-initiated disconnect.
    PeripheralDisconnected {
        device: DeviceId,
        cause: Option<String>,
    },

    /// A connection attempt failed; no session was created.
    PeripheralConnectFailed(DeviceId),

    /// Service discovery finished for a session.
    ServicesDiscovered(DeviceId),

    /// Characteristic discovery finished for one service; the session
    /// is subscribed to everything the service exposes.
    CharacteristicsDiscovered { device: DeviceId, service: Uuid },

    /// Firmware version reported by the device.
    DeviceInfoAfrVersion { device: DeviceId, version: String },

    /// Messaging-broker endpoint reported by the device.
    DeviceInfoBrokerEndpoint { device: DeviceId, endpoint: String },

    /// Validated MTU (always greater than 3), also cached on the
    /// session.
    DeviceInfoMtu { device: DeviceId, mtu: u16 },

    /// One wifi record from a list stream, already merged into the
    /// session's lists. Emitted per record so observers can render
    /// progressive updates.
    NetworkListed {
        device: DeviceId,
        record: NetworkRecord,
    },

    /// Result of a SaveNetwork request.
    NetworkSaved { device: DeviceId, status: OpStatus },

    /// Result of an EditNetwork request.
    NetworkEdited { device: DeviceId, status: OpStatus },

    /// Result of a DeleteNetwork request.
    NetworkDeleted { device: DeviceId, status: OpStatus },
}
