//! The protocol dispatcher: outbound request routing and inbound
//! notification dispatch.
//!
//! One [`Provisioner`] owns the session registry, the wire codec, and
//! a handle to the BLE central. Inbound dispatch is synchronous: given
//! one [`TransportEvent`] at a time, [`handle_event`] mutates session
//! state, submits follow-up commands, and emits typed events. Feeding
//! events from a single consumer task serializes all per-device
//! mutations (the merge algorithm is order-sensitive), while separate
//! provisioners — or separate devices within one event stream — never
//! share mutable state.
//!
//! [`handle_event`]: Provisioner::handle_event

use std::collections::HashSet;
use std::str;

use serde::Serialize;
use tokio::sync::mpsc;

use bleprov_protocol::{
    Characteristic, DeleteNetworkRequest, DeviceId, EditNetworkRequest,
    ListNetworkRequest, NetworkRecord, SaveNetworkRequest,
    StatusResponse, WireCodec,
};
use bleprov_session::{Session, SessionError, SessionRegistry};
use bleprov_transport::{BleCentral, Command, TransportEvent};

use crate::{ProvisionError, ProvisionerEvent};

/// The BLE wifi-provisioning client.
///
/// Constructed together with the receiving end of its event channel;
/// drop the receiver to silence events without affecting dispatch.
pub struct Provisioner<B: BleCentral, C: WireCodec> {
    registry: SessionRegistry,
    central: B,
    codec: C,
    events: mpsc::UnboundedSender<ProvisionerEvent>,

    /// Devices with a connect in flight; cleared by Connected or
    /// ConnectFailed.
    pending_connects: HashSet<DeviceId>,

    /// Devices the caller asked to disconnect. A disconnect event for
    /// a member is expected and never triggers auto-reconnect.
    expected_disconnects: HashSet<DeviceId>,
}

impl<B: BleCentral, C: WireCodec> Provisioner<B, C> {
    /// Creates a provisioner over the given central and codec, plus
    /// the subscription stream for its events.
    pub fn new(
        central: B,
        codec: C,
    ) -> (Self, mpsc::UnboundedReceiver<ProvisionerEvent>) {
        let (events, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                registry: SessionRegistry::new(),
                central,
                codec,
                events,
                pending_connects: HashSet::new(),
                expected_disconnects: HashSet::new(),
            },
            event_rx,
        )
    }

    /// Read access to a device's session, if connected.
    pub fn session(&self, device: &DeviceId) -> Option<&Session> {
        self.registry.get(device)
    }

    /// Consumes the transport event stream until it closes, feeding
    /// every event through [`handle_event`](Self::handle_event).
    pub async fn run(
        mut self,
        mut transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        while let Some(event) = transport_events.recv().await {
            self.handle_event(event);
        }
        tracing::debug!("transport event stream closed, provisioner stopping");
    }

    // -----------------------------------------------------------------
    // Outbound operations
    // -----------------------------------------------------------------

    /// Starts peripheral scanning.
    pub fn start_scan(&self) -> Result<(), ProvisionError> {
        self.central.submit(Command::StartScan)?;
        Ok(())
    }

    /// Stops peripheral scanning.
    pub fn stop_scan(&self) -> Result<(), ProvisionError> {
        self.central.submit(Command::StopScan)?;
        Ok(())
    }

    /// Initiates a connection. The session appears once the transport
    /// reports success. A second call while an attempt is already in
    /// flight is a no-op.
    pub fn connect(&mut self, device: DeviceId) -> Result<(), ProvisionError> {
        if !self.pending_connects.insert(device) {
            tracing::debug!(%device, "connect already in flight");
            return Ok(());
        }
        self.central.submit(Command::Connect(device))?;
        Ok(())
    }

    /// Tears down a connection. Marks the disconnect as expected so it
    /// never triggers auto-reconnect.
    pub fn disconnect(
        &mut self,
        device: DeviceId,
    ) -> Result<(), ProvisionError> {
        self.expected_disconnects.insert(device);
        self.central.submit(Command::Disconnect(device))?;
        Ok(())
    }

    /// Sets or clears the auto-reconnect flag for an identity. The
    /// flag outlives the session until explicitly cleared.
    pub fn set_auto_reconnect(&mut self, device: DeviceId, enabled: bool) {
        self.registry.set_auto_reconnect(device, enabled);
    }

    /// Requests the device's firmware version; the value arrives as
    /// [`ProvisionerEvent::DeviceInfoAfrVersion`].
    pub fn read_afr_version(
        &self,
        device: DeviceId,
    ) -> Result<(), ProvisionError> {
        self.read_info(device, Characteristic::AfrVersion)
    }

    /// Requests the device's messaging-broker endpoint.
    pub fn read_broker_endpoint(
        &self,
        device: DeviceId,
    ) -> Result<(), ProvisionError> {
        self.read_info(device, Characteristic::BrokerEndpoint)
    }

    /// Requests the negotiated MTU.
    pub fn read_mtu(&self, device: DeviceId) -> Result<(), ProvisionError> {
        self.read_info(device, Characteristic::Mtu)
    }

    /// Asks the device to stream its network lists. Records arrive as
    /// [`ProvisionerEvent::NetworkListed`], one per notification; the
    /// host never times the stream out locally.
    pub fn list_networks(
        &self,
        device: DeviceId,
        request: ListNetworkRequest,
    ) -> Result<(), ProvisionError> {
        self.write_request(device, Characteristic::ListNetwork, &request)
    }

    /// Saves a credential into a device slot. The result arrives as
    /// [`ProvisionerEvent::NetworkSaved`].
    pub fn save_network(
        &self,
        device: DeviceId,
        request: SaveNetworkRequest,
    ) -> Result<(), ProvisionError> {
        self.write_request(device, Characteristic::SaveNetwork, &request)
    }

    /// Moves a saved network between slots. The result arrives as
    /// [`ProvisionerEvent::NetworkEdited`].
    pub fn edit_network(
        &self,
        device: DeviceId,
        request: EditNetworkRequest,
    ) -> Result<(), ProvisionError> {
        self.write_request(device, Characteristic::EditNetwork, &request)
    }

    /// Deletes a saved network slot. The result arrives as
    /// [`ProvisionerEvent::NetworkDeleted`].
    pub fn delete_network(
        &self,
        device: DeviceId,
        request: DeleteNetworkRequest,
    ) -> Result<(), ProvisionError> {
        self.write_request(device, Characteristic::DeleteNetwork, &request)
    }

    /// Encodes a request and issues exactly one acknowledged write.
    ///
    /// Fails fast — encode errors first, then capability — without
    /// touching the transport. Responses are matched to the *session*,
    /// not to this call: back-to-back requests of the same kind have
    /// inherently ambiguous response attribution, so callers needing
    /// precise correlation must serialize per characteristic.
    fn write_request<T: Serialize>(
        &self,
        device: DeviceId,
        characteristic: Characteristic,
        request: &T,
    ) -> Result<(), ProvisionError> {
        let payload = self.codec.encode(request)?;
        self.require_characteristic(device, characteristic)?;
        self.central.submit(Command::Write {
            device,
            characteristic: characteristic.uuid(),
            payload,
        })?;
        Ok(())
    }

    fn read_info(
        &self,
        device: DeviceId,
        characteristic: Characteristic,
    ) -> Result<(), ProvisionError> {
        self.require_characteristic(device, characteristic)?;
        self.central.submit(Command::Read {
            device,
            characteristic: characteristic.uuid(),
        })?;
        Ok(())
    }

    fn require_characteristic(
        &self,
        device: DeviceId,
        characteristic: Characteristic,
    ) -> Result<(), ProvisionError> {
        let session = self
            .registry
            .get(&device)
            .ok_or(SessionError::NotFound(device))?;
        if session.has_characteristic(characteristic.uuid()) {
            Ok(())
        } else {
            Err(ProvisionError::CapabilityMissing {
                device,
                characteristic,
            })
        }
    }

    // -----------------------------------------------------------------
    // Inbound dispatch
    // -----------------------------------------------------------------

    /// Processes one transport event.
    ///
    /// Never fails: inbound trash (empty payloads, undecodable
    /// records, unknown characteristics) is logged at debug and
    /// dropped, and command submission failures during follow-ups are
    /// logged — a dead transport will surface through its own closed
    /// event stream.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::AdapterStateChanged(state) => {
                self.emit(ProvisionerEvent::CentralStateChanged(state));
            }

            TransportEvent::DeviceDiscovered(device) => {
                if self.registry.on_discovered(device) {
                    self.emit(ProvisionerEvent::PeripheralDiscovered(
                        device,
                    ));
                } else {
                    tracing::debug!(%device, "duplicate discovery dropped");
                }
            }

            TransportEvent::Connected(device) => {
                self.pending_connects.remove(&device);
                self.registry.on_connect(device);
                self.submit(Command::DiscoverServices(device));
                self.emit(ProvisionerEvent::PeripheralConnected(device));
            }

            TransportEvent::ConnectFailed { device, reason } => {
                self.pending_connects.remove(&device);
                tracing::warn!(%device, %reason, "connect failed");
                self.emit(ProvisionerEvent::PeripheralConnectFailed(
                    device,
                ));
            }

            TransportEvent::Disconnected { device, cause } => {
                self.on_disconnected(device, cause);
            }

            TransportEvent::ServicesDiscovered { device, services } => {
                if self.registry.get(&device).is_none() {
                    tracing::debug!(%device, "services for unknown session dropped");
                    return;
                }
                // Request characteristics for every service, known or
                // not — forward compatibility over special-casing.
                for service in services {
                    self.submit(Command::DiscoverCharacteristics {
                        device,
                        service,
                    });
                }
                self.emit(ProvisionerEvent::ServicesDiscovered(device));
            }

            TransportEvent::CharacteristicsDiscovered {
                device,
                service,
                characteristics,
            } => {
                let Some(session) = self.registry.get_mut(&device) else {
                    tracing::debug!(%device, "characteristics for unknown session dropped");
                    return;
                };
                session.characteristics.extend(characteristics.iter());
                session.state =
                    bleprov_session::ConnectionState::Subscribed;
                for characteristic in characteristics {
                    self.submit(Command::Subscribe {
                        device,
                        characteristic,
                    });
                }
                self.emit(ProvisionerEvent::CharacteristicsDiscovered {
                    device,
                    service,
                });
            }

            TransportEvent::Notification {
                device,
                characteristic,
                payload,
            } => {
                self.on_notification(device, characteristic, payload);
            }
        }
    }

    fn on_disconnected(&mut self, device: DeviceId, cause: Option<String>) {
        let expected = self.expected_disconnects.remove(&device);
        let outcome = self.registry.on_disconnect(device);
        if !outcome.had_session {
            // Already gone: idempotent, no event.
            return;
        }

        if outcome.reconnect_requested && !expected {
            // Exactly one immediate attempt; backoff and retry caps
            // are the caller's policy, layered on top.
            tracing::info!(%device, "unexpected disconnect, auto-reconnecting");
            if self.pending_connects.insert(device) {
                self.submit(Command::Connect(device));
            }
        }

        self.emit(ProvisionerEvent::PeripheralDisconnected {
            device,
            cause,
        });
    }

    fn on_notification(
        &mut self,
        device: DeviceId,
        characteristic: uuid::Uuid,
        payload: Vec<u8>,
    ) {
        if self.registry.get(&device).is_none() {
            tracing::debug!(%device, "notification for unknown session dropped");
            return;
        }
        if payload.is_empty() {
            tracing::debug!(%device, %characteristic, "empty notification dropped");
            return;
        }
        let Some(characteristic) = Characteristic::from_uuid(characteristic)
        else {
            tracing::debug!(%device, %characteristic, "notification on unknown characteristic dropped");
            return;
        };

        match characteristic {
            Characteristic::AfrVersion => {
                if let Some(version) = utf8_payload(device, payload) {
                    self.emit(ProvisionerEvent::DeviceInfoAfrVersion {
                        device,
                        version,
                    });
                }
            }
            Characteristic::BrokerEndpoint => {
                if let Some(endpoint) = utf8_payload(device, payload) {
                    self.emit(
                        ProvisionerEvent::DeviceInfoBrokerEndpoint {
                            device,
                            endpoint,
                        },
                    );
                }
            }
            Characteristic::Mtu => self.on_mtu(device, payload),
            Characteristic::ListNetwork => {
                self.on_network_record(device, payload);
            }
            Characteristic::SaveNetwork
            | Characteristic::EditNetwork
            | Characteristic::DeleteNetwork => {
                self.on_status(device, characteristic, payload);
            }
        }
    }

    /// An MTU payload is a UTF-8 decimal string; anything that fails
    /// to parse, or parses to a value of 3 or less, is rejected — the
    /// cached MTU stays put and no event is emitted.
    fn on_mtu(&mut self, device: DeviceId, payload: Vec<u8>) {
        let mtu = str::from_utf8(&payload)
            .ok()
            .and_then(|text| text.trim().parse::<u16>().ok())
            .filter(|mtu| *mtu > 3);
        let Some(mtu) = mtu else {
            tracing::debug!(%device, "invalid mtu payload dropped");
            return;
        };
        if let Some(session) = self.registry.get_mut(&device) {
            session.mtu = Some(mtu);
        }
        self.emit(ProvisionerEvent::DeviceInfoMtu { device, mtu });
    }

    fn on_network_record(&mut self, device: DeviceId, payload: Vec<u8>) {
        let record: NetworkRecord = match self.codec.decode(&payload) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(%device, error = %e, "undecodable network record dropped");
                return;
            }
        };
        let Some(session) = self.registry.get_mut(&device) else {
            return;
        };
        session.merge_record(record.clone());
        self.emit(ProvisionerEvent::NetworkListed { device, record });
    }

    fn on_status(
        &mut self,
        device: DeviceId,
        characteristic: Characteristic,
        payload: Vec<u8>,
    ) {
        let response: StatusResponse = match self.codec.decode(&payload) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%device, %characteristic, error = %e, "undecodable status response dropped");
                return;
            }
        };
        let status = response.status;
        let event = match characteristic {
            Characteristic::SaveNetwork => {
                ProvisionerEvent::NetworkSaved { device, status }
            }
            Characteristic::EditNetwork => {
                ProvisionerEvent::NetworkEdited { device, status }
            }
            _ => ProvisionerEvent::NetworkDeleted { device, status },
        };
        self.emit(event);
    }

    /// Follow-up command submission inside inbound dispatch: failures
    /// are logged, not propagated, so one dead submit can't wedge the
    /// event loop.
    fn submit(&self, command: Command) {
        if let Err(e) = self.central.submit(command) {
            tracing::warn!(error = %e, "command submission failed");
        }
    }

    fn emit(&self, event: ProvisionerEvent) {
        // A dropped receiver means nobody is listening; dispatch
        // continues regardless.
        let _ = self.events.send(event);
    }
}

/// Device-info values are plain UTF-8 strings on the wire.
fn utf8_payload(device: DeviceId, payload: Vec<u8>) -> Option<String> {
    match String::from_utf8(payload) {
        Ok(text) => Some(text),
        Err(_) => {
            tracing::debug!(%device, "non-utf8 device info payload dropped");
            None
        }
    }
}
