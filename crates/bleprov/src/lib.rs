//! # bleprov
//!
//! Host-side client for a constrained-device BLE wifi-provisioning
//! protocol: discover peripherals, connect, manage their saved wifi
//! credentials, and read their messaging-broker endpoint.
//!
//! The [`Provisioner`] is the entry point. It owns one session per
//! connected device, routes outbound requests to the right GATT
//! characteristic, correlates asynchronous notifications back to
//! sessions, and merges streamed wifi records into consistent
//! per-device lists. Callers subscribe to typed [`ProvisionerEvent`]s
//! instead of polling.
//!
//! ## Quick start
//!
//! The provisioner is generic over the central; production code uses
//! `bleprov_transport::BtleplugCentral` (behind the `btleplug`
//! feature), whose constructor also hands back the transport event
//! stream.
//!
//! ```rust,no_run
//! use bleprov::{BleCentral, Provisioner};
//! use bleprov_protocol::CborCodec;
//! use bleprov_transport::{Command, TransportError};
//!
//! struct MyCentral;
//!
//! impl BleCentral for MyCentral {
//!     fn submit(&self, command: Command) -> Result<(), TransportError> {
//!         // hand the command to the radio stack
//!         # let _ = command;
//!         Ok(())
//!     }
//! }
//!
//! # fn run() -> Result<(), bleprov::ProvisionError> {
//! let (mut provisioner, mut events) =
//!     Provisioner::new(MyCentral, CborCodec);
//!
//! provisioner.start_scan()?;
//! // feed transport events into `provisioner.handle_event(..)` (or
//! // hand the stream to `Provisioner::run`) and react to `events`.
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod error;
mod event;

pub use dispatcher::Provisioner;
pub use error::ProvisionError;
pub use event::ProvisionerEvent;

// The sub-crate types callers need to drive the provisioner.
pub use bleprov_protocol::{
    Characteristic, DeleteNetworkRequest, DeviceId, EditNetworkRequest,
    ListNetworkRequest, NetworkRecord, OpStatus, SaveNetworkRequest,
    SecurityType,
};
pub use bleprov_session::Session;
pub use bleprov_transport::{BleCentral, CentralState, TransportEvent};
