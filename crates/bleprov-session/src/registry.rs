//! The session registry: one [`Session`] per connected device.
//!
//! Responsibilities:
//! - Creating or resetting a session when a device connects
//! - Tearing down transient state when it disconnects
//! - Deduplicating discovery reports
//! - Holding auto-reconnect flags across session teardown
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself — it uses plain
//! collections. This is intentional: the registry is owned by the
//! dispatcher, which processes transport events one at a time, so
//! per-device mutations are serialized by construction and there is
//! no hidden locking.

use std::collections::{HashMap, HashSet};

use bleprov_protocol::DeviceId;

use crate::Session;

/// What [`SessionRegistry::on_disconnect`] observed, so the caller can
/// decide whether to emit an event and whether to reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// A session existed and its transient state was removed.
    /// `false` means the disconnect was a no-op (already gone).
    pub had_session: bool,

    /// The identity is flagged for auto-reconnect. The registry never
    /// talks to the transport itself; issuing the reconnect command is
    /// the dispatcher's job.
    pub reconnect_requested: bool,
}

/// Tracks every device the central has seen, and a [`Session`] for
/// each one that is currently connected.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Live sessions, keyed by device identity.
    sessions: HashMap<DeviceId, Session>,

    /// Every identity ever reported by discovery. Re-discovery of a
    /// member is dropped, not re-inserted.
    known: HashSet<DeviceId>,

    /// Identities flagged for auto-reconnect. Kept separate from
    /// `sessions` because the flag must survive session teardown.
    auto_reconnect: HashSet<DeviceId>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a discovery report. Returns `false` for an identity
    /// that is already known — the caller drops the event.
    pub fn on_discovered(&mut self, device: DeviceId) -> bool {
        self.known.insert(device)
    }

    /// Creates a session for a freshly connected device, or resets the
    /// existing one: network lists cleared, MTU and discovered
    /// characteristics forgotten.
    pub fn on_connect(&mut self, device: DeviceId) -> &mut Session {
        self.known.insert(device);
        self.sessions.insert(device, Session::new(device));
        tracing::info!(%device, "session created");
        self.sessions.get_mut(&device).expect("just inserted")
    }

    /// Removes the session's transient state. Idempotent: a device
    /// with no session yields `had_session: false` and nothing else
    /// happens.
    pub fn on_disconnect(&mut self, device: DeviceId) -> DisconnectOutcome {
        let had_session = self.sessions.remove(&device).is_some();
        if had_session {
            tracing::info!(%device, "session removed");
        }
        DisconnectOutcome {
            had_session,
            reconnect_requested: had_session
                && self.auto_reconnect.contains(&device),
        }
    }

    /// Sets or clears the auto-reconnect flag. Idempotent; does not
    /// itself alter connection state.
    pub fn set_auto_reconnect(&mut self, device: DeviceId, enabled: bool) {
        if enabled {
            self.auto_reconnect.insert(device);
        } else {
            self.auto_reconnect.remove(&device);
        }
    }

    /// `true` if the identity is flagged for auto-reconnect.
    pub fn auto_reconnect_enabled(&self, device: &DeviceId) -> bool {
        self.auto_reconnect.contains(device)
    }

    /// Looks up the session for a device, if one is connected.
    pub fn get(&self, device: &DeviceId) -> Option<&Session> {
        self.sessions.get(device)
    }

    /// Mutable session lookup.
    pub fn get_mut(&mut self, device: &DeviceId) -> Option<&mut Session> {
        self.sessions.get_mut(device)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// `true` if no device is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionRegistry`, following the naming
    //! convention `test_{function}_{scenario}_{expected}`.

    use bleprov_protocol::{
        NetworkRecord, OpStatus, SCAN_RECORD_INDEX, SecurityType,
    };

    use super::*;
    use crate::ConnectionState;

    // -- Helpers ----------------------------------------------------------

    fn dev(name: &str) -> DeviceId {
        DeviceId::from_platform_id(name)
    }

    fn scan_record(ssid: &str) -> NetworkRecord {
        NetworkRecord {
            index: SCAN_RECORD_INDEX,
            ssid: ssid.into(),
            bssid: vec![0; 6],
            security: SecurityType::Wpa2,
            rssi: -50,
            hidden: false,
            connected: false,
            status: OpStatus::Success,
        }
    }

    // =====================================================================
    // on_discovered()
    // =====================================================================

    #[test]
    fn test_on_discovered_new_device_returns_true() {
        let mut reg = SessionRegistry::new();
        assert!(reg.on_discovered(dev("a")));
    }

    #[test]
    fn test_on_discovered_duplicate_returns_false() {
        let mut reg = SessionRegistry::new();
        reg.on_discovered(dev("a"));
        assert!(!reg.on_discovered(dev("a")));
    }

    #[test]
    fn test_on_discovered_after_disconnect_still_duplicate() {
        // Disconnecting does not forget the identity; re-discovery of
        // a previously connected device is still dropped.
        let mut reg = SessionRegistry::new();
        reg.on_discovered(dev("a"));
        reg.on_connect(dev("a"));
        reg.on_disconnect(dev("a"));

        assert!(!reg.on_discovered(dev("a")));
    }

    // =====================================================================
    // on_connect()
    // =====================================================================

    #[test]
    fn test_on_connect_creates_fresh_session() {
        let mut reg = SessionRegistry::new();
        let session = reg.on_connect(dev("a"));

        assert_eq!(session.state, ConnectionState::DiscoveringServices);
        assert!(session.saved.is_empty());
        assert!(session.scanned.is_empty());
        assert_eq!(session.mtu, None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_on_connect_resets_existing_session_state() {
        // Reconnecting must clear both lists and the cached MTU before
        // any new record is merged.
        let mut reg = SessionRegistry::new();
        {
            let session = reg.on_connect(dev("a"));
            session.mtu = Some(185);
            session.merge_record(scan_record("stale"));
            session.state = ConnectionState::Subscribed;
        }

        let session = reg.on_connect(dev("a"));
        assert!(session.scanned.is_empty());
        assert!(session.saved.is_empty());
        assert_eq!(session.mtu, None);
        assert_eq!(session.state, ConnectionState::DiscoveringServices);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_on_connect_marks_identity_known() {
        // A device connected without a prior discovery report must not
        // later be treated as newly discovered.
        let mut reg = SessionRegistry::new();
        reg.on_connect(dev("a"));
        assert!(!reg.on_discovered(dev("a")));
    }

    // =====================================================================
    // on_disconnect()
    // =====================================================================

    #[test]
    fn test_on_disconnect_removes_session() {
        let mut reg = SessionRegistry::new();
        reg.on_connect(dev("a"));

        let outcome = reg.on_disconnect(dev("a"));

        assert!(outcome.had_session);
        assert!(!outcome.reconnect_requested);
        assert!(reg.get(&dev("a")).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_on_disconnect_unknown_device_is_noop() {
        let mut reg = SessionRegistry::new();

        let outcome = reg.on_disconnect(dev("ghost"));

        assert!(!outcome.had_session);
        assert!(!outcome.reconnect_requested);
    }

    #[test]
    fn test_on_disconnect_twice_second_is_noop() {
        let mut reg = SessionRegistry::new();
        reg.on_connect(dev("a"));
        reg.on_disconnect(dev("a"));

        let outcome = reg.on_disconnect(dev("a"));
        assert!(!outcome.had_session);
    }

    #[test]
    fn test_on_disconnect_flagged_device_requests_reconnect() {
        let mut reg = SessionRegistry::new();
        reg.on_connect(dev("a"));
        reg.set_auto_reconnect(dev("a"), true);

        let outcome = reg.on_disconnect(dev("a"));
        assert!(outcome.had_session);
        assert!(outcome.reconnect_requested);
    }

    // =====================================================================
    // set_auto_reconnect()
    // =====================================================================

    #[test]
    fn test_set_auto_reconnect_is_idempotent() {
        let mut reg = SessionRegistry::new();
        reg.set_auto_reconnect(dev("a"), true);
        reg.set_auto_reconnect(dev("a"), true);
        assert!(reg.auto_reconnect_enabled(&dev("a")));

        reg.set_auto_reconnect(dev("a"), false);
        reg.set_auto_reconnect(dev("a"), false);
        assert!(!reg.auto_reconnect_enabled(&dev("a")));
    }

    #[test]
    fn test_auto_reconnect_flag_survives_session_teardown() {
        // The flag is keyed by identity, not by session, so it holds
        // across disconnect/reconnect cycles until explicitly cleared.
        let mut reg = SessionRegistry::new();
        reg.on_connect(dev("a"));
        reg.set_auto_reconnect(dev("a"), true);
        reg.on_disconnect(dev("a"));

        assert!(reg.auto_reconnect_enabled(&dev("a")));

        reg.on_connect(dev("a"));
        let outcome = reg.on_disconnect(dev("a"));
        assert!(outcome.reconnect_requested);
    }

    #[test]
    fn test_set_auto_reconnect_does_not_create_session() {
        let mut reg = SessionRegistry::new();
        reg.set_auto_reconnect(dev("a"), true);
        assert!(reg.get(&dev("a")).is_none());
        assert!(reg.is_empty());
    }

    // =====================================================================
    // Multiple devices
    // =====================================================================

    #[test]
    fn test_devices_have_independent_sessions() {
        let mut reg = SessionRegistry::new();
        reg.on_connect(dev("a"))
            .merge_record(scan_record("net-a"));
        reg.on_connect(dev("b"))
            .merge_record(scan_record("net-b"));

        reg.on_disconnect(dev("a"));

        let b = reg.get(&dev("b")).expect("b still connected");
        assert_eq!(b.scanned.len(), 1);
        assert_eq!(b.scanned[0].ssid, "net-b");
    }
}
