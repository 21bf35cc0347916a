//! GATT protocol surface: service and characteristic UUIDs.
//!
//! Two logical service groups:
//!
//! - **Device info** (read/notify): firmware version, messaging-broker
//!   endpoint, negotiated MTU. Payloads are plain UTF-8 strings.
//! - **Network config** (write-with-response, replies via notify):
//!   list/save/edit/delete wifi networks. Payloads are CBOR maps.

use std::fmt;

use uuid::{Uuid, uuid};

/// Device-info service: version, broker endpoint, and MTU.
pub const DEVICE_INFO_SERVICE: Uuid =
    uuid!("c8aa1000-5c3e-4f1a-9b62-d0f54c291d07");

/// Firmware version characteristic (UTF-8 string).
pub const AFR_VERSION_UUID: Uuid =
    uuid!("c8aa1001-5c3e-4f1a-9b62-d0f54c291d07");

/// Messaging-broker endpoint characteristic (UTF-8 string).
pub const BROKER_ENDPOINT_UUID: Uuid =
    uuid!("c8aa1002-5c3e-4f1a-9b62-d0f54c291d07");

/// Negotiated MTU characteristic (UTF-8 decimal string, must parse to
/// an integer greater than 3).
pub const MTU_UUID: Uuid = uuid!("c8aa1003-5c3e-4f1a-9b62-d0f54c291d07");

/// Network-config service: wifi credential management.
pub const NETWORK_CONFIG_SERVICE: Uuid =
    uuid!("c8aa2000-5c3e-4f1a-9b62-d0f54c291d07");

/// ListNetwork characteristic; responses stream one record per notify.
pub const LIST_NETWORK_UUID: Uuid =
    uuid!("c8aa2001-5c3e-4f1a-9b62-d0f54c291d07");

/// SaveNetwork characteristic.
pub const SAVE_NETWORK_UUID: Uuid =
    uuid!("c8aa2002-5c3e-4f1a-9b62-d0f54c291d07");

/// EditNetwork characteristic.
pub const EDIT_NETWORK_UUID: Uuid =
    uuid!("c8aa2003-5c3e-4f1a-9b62-d0f54c291d07");

/// DeleteNetwork characteristic.
pub const DELETE_NETWORK_UUID: Uuid =
    uuid!("c8aa2004-5c3e-4f1a-9b62-d0f54c291d07");

/// The known protocol characteristics.
///
/// Inbound notifications are routed by looking the characteristic UUID
/// up in this table; anything not listed here is dropped by the
/// dispatcher (peripherals are free to expose additional endpoints we
/// subscribe to but do not interpret).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    AfrVersion,
    BrokerEndpoint,
    Mtu,
    ListNetwork,
    SaveNetwork,
    EditNetwork,
    DeleteNetwork,
}

impl Characteristic {
    /// Every protocol characteristic, device-info group first.
    pub const ALL: [Characteristic; 7] = [
        Characteristic::AfrVersion,
        Characteristic::BrokerEndpoint,
        Characteristic::Mtu,
        Characteristic::ListNetwork,
        Characteristic::SaveNetwork,
        Characteristic::EditNetwork,
        Characteristic::DeleteNetwork,
    ];

    /// Looks a UUID up in the protocol table.
    pub fn from_uuid(uuid: Uuid) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.uuid() == uuid)
    }

    /// The characteristic's 128-bit UUID.
    pub fn uuid(self) -> Uuid {
        match self {
            Characteristic::AfrVersion => AFR_VERSION_UUID,
            Characteristic::BrokerEndpoint => BROKER_ENDPOINT_UUID,
            Characteristic::Mtu => MTU_UUID,
            Characteristic::ListNetwork => LIST_NETWORK_UUID,
            Characteristic::SaveNetwork => SAVE_NETWORK_UUID,
            Characteristic::EditNetwork => EDIT_NETWORK_UUID,
            Characteristic::DeleteNetwork => DELETE_NETWORK_UUID,
        }
    }

    /// The service the characteristic belongs to.
    pub fn service(self) -> Uuid {
        match self {
            Characteristic::AfrVersion
            | Characteristic::BrokerEndpoint
            | Characteristic::Mtu => DEVICE_INFO_SERVICE,
            _ => NETWORK_CONFIG_SERVICE,
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Characteristic::AfrVersion => "AfrVersion",
            Characteristic::BrokerEndpoint => "BrokerEndpoint",
            Characteristic::Mtu => "Mtu",
            Characteristic::ListNetwork => "ListNetwork",
            Characteristic::SaveNetwork => "SaveNetwork",
            Characteristic::EditNetwork => "EditNetwork",
            Characteristic::DeleteNetwork => "DeleteNetwork",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_uuid_round_trips_every_characteristic() {
        for c in Characteristic::ALL {
            assert_eq!(Characteristic::from_uuid(c.uuid()), Some(c));
        }
    }

    #[test]
    fn test_from_uuid_unknown_returns_none() {
        let foreign = uuid!("00000000-0000-0000-0000-00000000beef");
        assert_eq!(Characteristic::from_uuid(foreign), None);
    }

    #[test]
    fn test_uuids_are_distinct() {
        let mut uuids: Vec<Uuid> =
            Characteristic::ALL.iter().map(|c| c.uuid()).collect();
        uuids.push(DEVICE_INFO_SERVICE);
        uuids.push(NETWORK_CONFIG_SERVICE);
        let before = uuids.len();
        uuids.sort();
        uuids.dedup();
        assert_eq!(uuids.len(), before);
    }

    #[test]
    fn test_service_grouping() {
        assert_eq!(
            Characteristic::Mtu.service(),
            DEVICE_INFO_SERVICE
        );
        assert_eq!(
            Characteristic::ListNetwork.service(),
            NETWORK_CONFIG_SERVICE
        );
    }
}
