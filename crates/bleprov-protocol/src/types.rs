//! Core wire types: device identity, wifi records, and the four
//! request records.
//!
//! Every record serializes to a compact binary map keyed by fixed
//! single-character tags (the `#[serde(rename = "…")]` attributes
//! below). Constrained firmware omits tags it has no value for, so
//! every response field carries `#[serde(default)]` — an absent tag
//! decodes to the type-appropriate zero value instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Saved-network slots use indices `>= 0`; a record carrying this
/// sentinel (or any negative index) came from an active scan, not
/// from device storage.
pub const SCAN_RECORD_INDEX: i32 = -1;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Opaque, stable identifier for one physical peripheral.
///
/// All per-device state is keyed by this. The transport layer is
/// responsible for deriving a stable `DeviceId` from whatever handle
/// the platform BLE stack exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
    /// Derives a stable identity from a platform peripheral handle
    /// (UUIDv5 over the handle's string form, so the same physical
    /// device always maps to the same `DeviceId` on a given host).
    pub fn from_platform_id(raw: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes()))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dev-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Wire enums
// ---------------------------------------------------------------------------

/// Wifi security mode, as reported by the device.
///
/// The wire representation is a small integer; unknown integers decode
/// to [`SecurityType::NotSupported`] rather than failing, so newer
/// firmware with additional modes doesn't break older hosts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(from = "u8", into = "u8")]
pub enum SecurityType {
    #[default]
    Open,
    Wep,
    Wpa,
    Wpa2,
    NotSupported,
}

impl From<u8> for SecurityType {
    fn from(value: u8) -> Self {
        match value {
            0 => SecurityType::Open,
            1 => SecurityType::Wep,
            2 => SecurityType::Wpa,
            3 => SecurityType::Wpa2,
            _ => SecurityType::NotSupported,
        }
    }
}

impl From<SecurityType> for u8 {
    fn from(value: SecurityType) -> u8 {
        match value {
            SecurityType::Open => 0,
            SecurityType::Wep => 1,
            SecurityType::Wpa => 2,
            SecurityType::Wpa2 => 3,
            SecurityType::NotSupported => 4,
        }
    }
}

/// Result of a save/edit/delete operation on the device.
///
/// Meaningful only in response records; list-stream records carry it
/// too but devices leave it at `Success`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(from = "u8", into = "u8")]
pub enum OpStatus {
    #[default]
    Success,
    Failure,
    Timeout,
    NotSupported,
}

impl From<u8> for OpStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => OpStatus::Success,
            1 => OpStatus::Failure,
            2 => OpStatus::Timeout,
            _ => OpStatus::NotSupported,
        }
    }
}

impl From<OpStatus> for u8 {
    fn from(value: OpStatus) -> u8 {
        match value {
            OpStatus::Success => 0,
            OpStatus::Failure => 1,
            OpStatus::Timeout => 2,
            OpStatus::NotSupported => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkRecord — one wifi network as reported by the device
// ---------------------------------------------------------------------------

/// One wifi network, either a saved credential slot (`index >= 0`) or
/// an access point seen during an active scan (`index < 0`).
///
/// Arrives one record per notification on the ListNetwork
/// characteristic — devices stream list results incrementally, never
/// as a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    /// Saved-slot index, or a negative sentinel for scan results.
    #[serde(rename = "g", default)]
    pub index: i32,

    /// Network name.
    #[serde(rename = "r", default)]
    pub ssid: String,

    /// 6-byte hardware address (a CBOR byte string on the wire).
    #[serde(rename = "b", default, with = "serde_bytes")]
    pub bssid: Vec<u8>,

    /// Security mode.
    #[serde(rename = "q", default)]
    pub security: SecurityType,

    /// Signal strength; larger (less negative) is stronger.
    #[serde(rename = "p", default)]
    pub rssi: i32,

    /// The network does not broadcast its SSID.
    #[serde(rename = "f", default)]
    pub hidden: bool,

    /// The device is currently associated with this network.
    #[serde(rename = "e", default)]
    pub connected: bool,

    /// Operation result, meaningful for save/edit/delete responses.
    #[serde(rename = "s", default)]
    pub status: OpStatus,
}

impl NetworkRecord {
    /// `true` if this record came from an active scan rather than a
    /// saved-network slot.
    pub fn is_scan_result(&self) -> bool {
        self.index < 0
    }
}

// ---------------------------------------------------------------------------
// Request records (host → device)
// ---------------------------------------------------------------------------

/// Asks the device to stream its saved networks followed by a fresh
/// scan, one [`NetworkRecord`] notification per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNetworkRequest {
    /// Cap on the number of scan results the device reports.
    #[serde(rename = "h")]
    pub max_networks: i32,

    /// Scan timeout in seconds, enforced on the device. The host does
    /// not time the operation locally.
    #[serde(rename = "t")]
    pub timeout_secs: i32,
}

/// Stores a credential in the given saved-network slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveNetworkRequest {
    #[serde(rename = "g")]
    pub index: i32,
    #[serde(rename = "r")]
    pub ssid: String,
    #[serde(rename = "b", with = "serde_bytes")]
    pub bssid: Vec<u8>,
    /// Pre-shared key, passed through verbatim.
    #[serde(rename = "m")]
    pub psk: String,
    #[serde(rename = "q")]
    pub security: SecurityType,
}

/// Moves a saved network from one slot to another (priority reorder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditNetworkRequest {
    #[serde(rename = "g")]
    pub index: i32,
    #[serde(rename = "j")]
    pub new_index: i32,
}

/// Removes the credential in the given saved-network slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteNetworkRequest {
    #[serde(rename = "g")]
    pub index: i32,
}

// ---------------------------------------------------------------------------
// Response records (device → host)
// ---------------------------------------------------------------------------

/// Result notification for save/edit/delete requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "s", default)]
    pub status: OpStatus,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Wire-shape tests. The protocol fixes exact single-character map
    //! tags; a mismatch means real firmware can't parse our requests,
    //! so these assert the encoded CBOR map keys directly.

    use ciborium::value::Value;

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn encode<T: Serialize>(value: &T) -> Vec<u8> {
        let mut out = Vec::new();
        ciborium::ser::into_writer(value, &mut out).unwrap();
        out
    }

    fn as_map(bytes: &[u8]) -> Vec<(Value, Value)> {
        match ciborium::de::from_reader(bytes).unwrap() {
            Value::Map(entries) => entries,
            other => panic!("expected CBOR map, got {other:?}"),
        }
    }

    fn lookup<'a>(map: &'a [(Value, Value)], tag: &str) -> &'a Value {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Text(t) if t == tag))
            .map(|(_, v)| v)
            .unwrap_or_else(|| panic!("tag {tag:?} missing"))
    }

    // =====================================================================
    // DeviceId
    // =====================================================================

    #[test]
    fn test_device_id_from_platform_id_is_stable() {
        let a = DeviceId::from_platform_id("hci0/dev_AA_BB_CC_DD_EE_FF");
        let b = DeviceId::from_platform_id("hci0/dev_AA_BB_CC_DD_EE_FF");
        assert_eq!(a, b);
    }

    #[test]
    fn test_device_id_from_platform_id_distinct_inputs_differ() {
        let a = DeviceId::from_platform_id("dev-one");
        let b = DeviceId::from_platform_id("dev-two");
        assert_ne!(a, b);
    }

    #[test]
    fn test_device_id_display_prefix() {
        let id = DeviceId::from_platform_id("x");
        assert!(id.to_string().starts_with("dev-"));
    }

    // =====================================================================
    // Wire enums
    // =====================================================================

    #[test]
    fn test_security_type_wire_integers() {
        assert_eq!(u8::from(SecurityType::Open), 0);
        assert_eq!(u8::from(SecurityType::Wep), 1);
        assert_eq!(u8::from(SecurityType::Wpa), 2);
        assert_eq!(u8::from(SecurityType::Wpa2), 3);
        assert_eq!(u8::from(SecurityType::NotSupported), 4);
    }

    #[test]
    fn test_security_type_unknown_integer_decodes_to_not_supported() {
        assert_eq!(SecurityType::from(99), SecurityType::NotSupported);
    }

    #[test]
    fn test_op_status_wire_integers() {
        assert_eq!(u8::from(OpStatus::Success), 0);
        assert_eq!(u8::from(OpStatus::Failure), 1);
        assert_eq!(u8::from(OpStatus::Timeout), 2);
        assert_eq!(u8::from(OpStatus::NotSupported), 3);
    }

    #[test]
    fn test_op_status_unknown_integer_decodes_to_not_supported() {
        assert_eq!(OpStatus::from(42), OpStatus::NotSupported);
    }

    // =====================================================================
    // Request records — exact map tags
    // =====================================================================

    #[test]
    fn test_list_network_request_uses_h_and_t_tags() {
        let req = ListNetworkRequest {
            max_networks: 10,
            timeout_secs: 5,
        };
        let map = as_map(&encode(&req));

        assert_eq!(map.len(), 2);
        assert_eq!(lookup(&map, "h"), &Value::Integer(10.into()));
        assert_eq!(lookup(&map, "t"), &Value::Integer(5.into()));
    }

    #[test]
    fn test_save_network_request_tags_and_bssid_byte_string() {
        let req = SaveNetworkRequest {
            index: 0,
            ssid: "shop-floor".into(),
            bssid: vec![0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF],
            psk: "secret".into(),
            security: SecurityType::Wpa2,
        };
        let map = as_map(&encode(&req));

        assert_eq!(lookup(&map, "g"), &Value::Integer(0.into()));
        assert_eq!(lookup(&map, "r"), &Value::Text("shop-floor".into()));
        assert_eq!(lookup(&map, "m"), &Value::Text("secret".into()));
        assert_eq!(lookup(&map, "q"), &Value::Integer(3.into()));
        // bssid must be a CBOR byte string, not an integer array.
        assert_eq!(
            lookup(&map, "b"),
            &Value::Bytes(vec![0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])
        );
    }

    #[test]
    fn test_edit_network_request_uses_g_and_j_tags() {
        let req = EditNetworkRequest {
            index: 2,
            new_index: 0,
        };
        let map = as_map(&encode(&req));

        assert_eq!(map.len(), 2);
        assert_eq!(lookup(&map, "g"), &Value::Integer(2.into()));
        assert_eq!(lookup(&map, "j"), &Value::Integer(0.into()));
    }

    #[test]
    fn test_delete_network_request_uses_g_tag() {
        let map = as_map(&encode(&DeleteNetworkRequest { index: 1 }));

        assert_eq!(map.len(), 1);
        assert_eq!(lookup(&map, "g"), &Value::Integer(1.into()));
    }

    // =====================================================================
    // NetworkRecord decoding
    // =====================================================================

    #[test]
    fn test_network_record_round_trip() {
        let record = NetworkRecord {
            index: SCAN_RECORD_INDEX,
            ssid: "cafe".into(),
            bssid: vec![1, 2, 3, 4, 5, 6],
            security: SecurityType::Wpa2,
            rssi: -48,
            hidden: false,
            connected: true,
            status: OpStatus::Success,
        };
        let bytes = encode(&record);
        let decoded: NetworkRecord =
            ciborium::de::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_network_record_missing_tags_default_to_zero_values() {
        // A map carrying only the ssid: every other field takes its
        // type-appropriate zero value instead of failing to decode.
        let map = Value::Map(vec![(
            Value::Text("r".into()),
            Value::Text("bare".into()),
        )]);
        let bytes = encode(&map);
        let record: NetworkRecord =
            ciborium::de::from_reader(bytes.as_slice()).unwrap();

        assert_eq!(record.ssid, "bare");
        assert_eq!(record.index, 0);
        assert_eq!(record.rssi, 0);
        assert!(record.bssid.is_empty());
        assert_eq!(record.security, SecurityType::Open);
        assert_eq!(record.status, OpStatus::Success);
        assert!(!record.hidden);
        assert!(!record.connected);
    }

    #[test]
    fn test_network_record_is_scan_result() {
        let mut record = NetworkRecord {
            index: SCAN_RECORD_INDEX,
            ssid: String::new(),
            bssid: Vec::new(),
            security: SecurityType::Open,
            rssi: 0,
            hidden: false,
            connected: false,
            status: OpStatus::Success,
        };
        assert!(record.is_scan_result());

        record.index = 0;
        assert!(!record.is_scan_result());
    }

    // =====================================================================
    // StatusResponse
    // =====================================================================

    #[test]
    fn test_status_response_decodes_s_tag() {
        let map = Value::Map(vec![(
            Value::Text("s".into()),
            Value::Integer(2.into()),
        )]);
        let bytes = encode(&map);
        let resp: StatusResponse =
            ciborium::de::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(resp.status, OpStatus::Timeout);
    }

    #[test]
    fn test_status_response_missing_tag_defaults_to_success() {
        let bytes = encode(&Value::Map(vec![]));
        let resp: StatusResponse =
            ciborium::de::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(resp.status, OpStatus::Success);
    }
}
