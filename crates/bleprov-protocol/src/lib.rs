//! Wire protocol for bleprov.
//!
//! This crate defines the "language" spoken between the host and a
//! provisioning-capable peripheral:
//!
//! - **Types** ([`NetworkRecord`], the request/response records,
//!   [`DeviceId`]) — the structures that travel on the wire.
//! - **Characteristic table** ([`Characteristic`] and the service
//!   UUID constants) — which GATT endpoint carries which record.
//! - **Codec** ([`WireCodec`] trait, [`CborCodec`]) — how records are
//!   converted to/from the compact binary map representation.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw characteristic
//! payloads) and the session layer (per-device state). It knows nothing
//! about connections or network lists — only how to name endpoints and
//! serialize records.
//!
//! ```text
//! Transport (bytes) → Protocol (records) → Session (device context)
//! ```

mod characteristics;
mod codec;
mod error;
mod types;

pub use characteristics::{
    AFR_VERSION_UUID, BROKER_ENDPOINT_UUID, Characteristic,
    DELETE_NETWORK_UUID, DEVICE_INFO_SERVICE, EDIT_NETWORK_UUID,
    LIST_NETWORK_UUID, MTU_UUID, NETWORK_CONFIG_SERVICE,
    SAVE_NETWORK_UUID,
};
#[cfg(feature = "cbor")]
pub use codec::CborCodec;
pub use codec::WireCodec;
pub use error::ProtocolError;
pub use types::{
    DeleteNetworkRequest, DeviceId, EditNetworkRequest,
    ListNetworkRequest, NetworkRecord, OpStatus, SCAN_RECORD_INDEX,
    SaveNetworkRequest, SecurityType, StatusResponse,
};
