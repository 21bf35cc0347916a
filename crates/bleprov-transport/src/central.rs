//! Real BLE central backed by `btleplug`.
//!
//! Structure: one command-executor task drains the submit queue and
//! calls into btleplug; one pump task translates btleplug central
//! events into [`TransportEvent`]s; one forwarder task per connected
//! peripheral relays its notification stream. All three feed the same
//! event channel, so the dispatcher sees a single ordered stream.

use std::collections::HashMap;
use std::sync::Arc;

use btleplug::api::{
    Central, CentralEvent, CentralState as BtState, Manager as _,
    Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures_util::StreamExt;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use bleprov_protocol::DeviceId;

use crate::{
    BleCentral, CentralState, Command, TransportError, TransportEvent,
};

type EventTx = mpsc::UnboundedSender<TransportEvent>;

/// Platform peripheral handles, keyed by the stable identity we derive
/// from them.
type DeviceMap = Arc<Mutex<HashMap<DeviceId, PeripheralId>>>;

/// A [`BleCentral`] implemented on the first Bluetooth adapter the
/// platform exposes.
pub struct BtleplugCentral {
    commands: mpsc::UnboundedSender<Command>,
}

impl BtleplugCentral {
    /// Opens the adapter and starts the executor and pump tasks.
    /// Returns the capability handle plus the inbound event stream.
    ///
    /// # Errors
    /// [`TransportError::AdapterUnavailable`] when the host has no
    /// Bluetooth adapter; [`TransportError::Backend`] for platform
    /// stack failures.
    pub async fn new() -> Result<
        (Self, mpsc::UnboundedReceiver<TransportEvent>),
        TransportError,
    > {
        let manager = Manager::new().await.map_err(backend)?;
        let adapter = manager
            .adapters()
            .await
            .map_err(backend)?
            .into_iter()
            .next()
            .ok_or(TransportError::AdapterUnavailable)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let devices: DeviceMap = Arc::new(Mutex::new(HashMap::new()));

        tokio::spawn(pump_central_events(
            adapter.clone(),
            Arc::clone(&devices),
            event_tx.clone(),
        ));
        tokio::spawn(run_commands(adapter, devices, cmd_rx, event_tx));

        Ok((Self { commands: cmd_tx }, event_rx))
    }
}

impl BleCentral for BtleplugCentral {
    fn submit(&self, command: Command) -> Result<(), TransportError> {
        self.commands
            .send(command)
            .map_err(|_| TransportError::SubmitFailed)
    }
}

fn backend(e: btleplug::Error) -> TransportError {
    TransportError::Backend(e.to_string())
}

/// Derives the stable identity for a platform peripheral and records
/// the mapping for later command lookups.
async fn register(devices: &DeviceMap, id: &PeripheralId) -> DeviceId {
    let device = DeviceId::from_platform_id(&id.to_string());
    devices.lock().await.insert(device, id.clone());
    device
}

async fn lookup(
    adapter: &Adapter,
    devices: &DeviceMap,
    device: DeviceId,
) -> Result<Peripheral, TransportError> {
    let platform_id = devices
        .lock()
        .await
        .get(&device)
        .cloned()
        .ok_or(TransportError::DeviceUnknown(device))?;
    adapter.peripheral(&platform_id).await.map_err(backend)
}

/// Translates btleplug central events into transport events and
/// spawns a notification forwarder per connected peripheral.
async fn pump_central_events(
    adapter: Adapter,
    devices: DeviceMap,
    events: EventTx,
) {
    let mut stream = match adapter.events().await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "central event stream unavailable");
            return;
        }
    };

    while let Some(event) = stream.next().await {
        match event {
            CentralEvent::DeviceDiscovered(id) => {
                let device = register(&devices, &id).await;
                let _ =
                    events.send(TransportEvent::DeviceDiscovered(device));
            }
            CentralEvent::DeviceConnected(id) => {
                let device = register(&devices, &id).await;
                if let Ok(peripheral) = adapter.peripheral(&id).await {
                    tokio::spawn(forward_notifications(
                        peripheral,
                        device,
                        events.clone(),
                    ));
                }
                let _ = events.send(TransportEvent::Connected(device));
            }
            CentralEvent::DeviceDisconnected(id) => {
                let device = register(&devices, &id).await;
                let _ = events.send(TransportEvent::Disconnected {
                    device,
                    cause: None,
                });
            }
            CentralEvent::StateUpdate(state) => {
                let state = match state {
                    BtState::PoweredOn => CentralState::PoweredOn,
                    BtState::PoweredOff => CentralState::PoweredOff,
                    _ => CentralState::Unknown,
                };
                let _ = events
                    .send(TransportEvent::AdapterStateChanged(state));
            }
            _ => {} // advertisement payloads are not part of this protocol
        }
    }
    tracing::debug!("central event stream ended");
}

/// Relays one peripheral's notification stream into the shared event
/// channel. Ends when the peripheral disconnects.
async fn forward_notifications(
    peripheral: Peripheral,
    device: DeviceId,
    events: EventTx,
) {
    let mut stream = match peripheral.notifications().await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::debug!(%device, error = %e, "notification stream unavailable");
            return;
        }
    };
    while let Some(notification) = stream.next().await {
        let sent = events.send(TransportEvent::Notification {
            device,
            characteristic: notification.uuid,
            payload: notification.value,
        });
        if sent.is_err() {
            break;
        }
    }
}

/// Drains the submit queue. Execution failures are logged and, for
/// connects, reported as events; they never tear the executor down.
async fn run_commands(
    adapter: Adapter,
    devices: DeviceMap,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: EventTx,
) {
    while let Some(command) = commands.recv().await {
        if let Err(e) =
            execute(&adapter, &devices, &events, command).await
        {
            tracing::warn!(error = %e, "BLE command failed");
        }
    }
    tracing::debug!("command channel closed, executor stopping");
}

async fn execute(
    adapter: &Adapter,
    devices: &DeviceMap,
    events: &EventTx,
    command: Command,
) -> Result<(), TransportError> {
    match command {
        Command::StartScan => adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(backend)?,
        Command::StopScan => {
            adapter.stop_scan().await.map_err(backend)?
        }
        Command::Connect(device) => {
            let peripheral = lookup(adapter, devices, device).await?;
            // Success surfaces as CentralEvent::DeviceConnected.
            if let Err(e) = peripheral.connect().await {
                let _ = events.send(TransportEvent::ConnectFailed {
                    device,
                    reason: e.to_string(),
                });
            }
        }
        Command::Disconnect(device) => {
            let peripheral = lookup(adapter, devices, device).await?;
            peripheral.disconnect().await.map_err(backend)?;
        }
        Command::DiscoverServices(device) => {
            let peripheral = lookup(adapter, devices, device).await?;
            peripheral.discover_services().await.map_err(backend)?;
            let services: Vec<Uuid> = peripheral
                .services()
                .iter()
                .map(|s| s.uuid)
                .collect();
            let _ = events.send(TransportEvent::ServicesDiscovered {
                device,
                services,
            });
        }
        Command::DiscoverCharacteristics { device, service } => {
            let peripheral = lookup(adapter, devices, device).await?;
            // btleplug discovers characteristics together with
            // services; answer from the cached tree.
            let characteristics: Vec<Uuid> = peripheral
                .services()
                .iter()
                .find(|s| s.uuid == service)
                .map(|s| {
                    s.characteristics.iter().map(|c| c.uuid).collect()
                })
                .unwrap_or_default();
            let _ =
                events.send(TransportEvent::CharacteristicsDiscovered {
                    device,
                    service,
                    characteristics,
                });
        }
        Command::Subscribe {
            device,
            characteristic,
        } => {
            let peripheral = lookup(adapter, devices, device).await?;
            let target =
                find_characteristic(&peripheral, characteristic)?;
            peripheral.subscribe(&target).await.map_err(backend)?;
        }
        Command::Read {
            device,
            characteristic,
        } => {
            let peripheral = lookup(adapter, devices, device).await?;
            let target =
                find_characteristic(&peripheral, characteristic)?;
            let value =
                peripheral.read(&target).await.map_err(backend)?;
            // Read results flow through the same path as notifies so
            // the dispatcher has one inbound route per characteristic.
            let _ = events.send(TransportEvent::Notification {
                device,
                characteristic,
                payload: value,
            });
        }
        Command::Write {
            device,
            characteristic,
            payload,
        } => {
            let peripheral = lookup(adapter, devices, device).await?;
            let target =
                find_characteristic(&peripheral, characteristic)?;
            peripheral
                .write(&target, &payload, WriteType::WithResponse)
                .await
                .map_err(backend)?;
        }
    }
    Ok(())
}

fn find_characteristic(
    peripheral: &Peripheral,
    uuid: Uuid,
) -> Result<btleplug::api::Characteristic, TransportError> {
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == uuid)
        .ok_or_else(|| {
            TransportError::Backend(format!(
                "characteristic {uuid} not present on peripheral"
            ))
        })
}
