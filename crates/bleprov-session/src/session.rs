//! Session types: what the host remembers about one connected device.

use std::collections::HashSet;

use bleprov_protocol::{DeviceId, NetworkRecord};
use uuid::Uuid;

/// Where a connected session is in its lifecycle.
///
/// ```text
///   (connect) ──→ DiscoveringServices ──→ Subscribed
///                        │                    │
///                        └──── (disconnect) ──┴──→ session removed
/// ```
///
/// The pre-connect `Connecting` phase is tracked by the dispatcher's
/// pending set — a session only exists once the transport reports a
/// successful connection. Disconnection removes the session entirely,
/// so there is no `Disconnected` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connected; service/characteristic discovery is in flight.
    DiscoveringServices,

    /// Discovery finished and notifications are subscribed; the
    /// session can carry protocol traffic.
    Subscribed,
}

/// One connected device's state.
///
/// Created on successful connect, destroyed on disconnect. The network
/// lists are two named, independently ordered sequences:
///
/// - `saved`: credential slots on the device, ascending by `index`,
///   no two entries with equal `index`.
/// - `scanned`: access points seen over the air, descending by `rssi`,
///   no two entries with an equal `(ssid, security)` pair.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which device this session belongs to.
    pub device_id: DeviceId,

    /// Lifecycle state, driven by transport callbacks.
    pub state: ConnectionState,

    /// Negotiated MTU once reported; always greater than 3 when set.
    pub mtu: Option<u16>,

    /// Every characteristic discovered on the peripheral, protocol or
    /// not. Used for capability checks before outbound writes.
    pub characteristics: HashSet<Uuid>,

    /// Saved credential slots, ascending by index.
    pub saved: Vec<NetworkRecord>,

    /// Scan results, descending by rssi.
    pub scanned: Vec<NetworkRecord>,
}

impl Session {
    /// Creates a fresh session with empty network lists.
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            state: ConnectionState::DiscoveringServices,
            mtu: None,
            characteristics: HashSet::new(),
            saved: Vec::new(),
            scanned: Vec::new(),
        }
    }

    /// `true` if discovery reported this characteristic on the
    /// peripheral.
    pub fn has_characteristic(&self, uuid: Uuid) -> bool {
        self.characteristics.contains(&uuid)
    }
}
