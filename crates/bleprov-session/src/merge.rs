//! Network reconciliation: folding one streamed record into a
//! session's lists.
//!
//! Devices deliver list results incrementally, one BLE notification
//! per record, and the saved and scanned halves arrive interleaved in
//! whatever order the firmware produces them. The merge therefore has
//! to be online and idempotent: redelivering a record must not
//! duplicate an entry, and a stronger-signal duplicate must supersede
//! a weaker one.

use bleprov_protocol::NetworkRecord;

use crate::Session;

impl Session {
    /// Applies one incoming record to the correct list.
    ///
    /// Saved-origin records (`index >= 0`) append to the saved list,
    /// which is then re-sorted ascending by index. The saved list is
    /// cleared on every (re)connect, so a fresh list request never
    /// appends onto stale slots; duplicate indices within one stream
    /// are a device-side protocol anomaly this engine does not defend
    /// against.
    ///
    /// Scan-origin records (`index < 0`) dedup against both lists on
    /// the `(ssid, security)` pair:
    ///
    /// - matching saved entry with weaker rssi: the saved entry is
    ///   enriched in place (status/bssid/rssi/hidden) and the scanned
    ///   list is untouched;
    /// - matching saved entry with equal-or-stronger rssi: the record
    ///   is discarded;
    /// - matching scanned entry: replaced only by a strictly stronger
    ///   record;
    /// - otherwise: appended, and the scanned list re-sorted
    ///   descending by rssi (stable for ties).
    pub fn merge_record(&mut self, record: NetworkRecord) {
        if record.is_scan_result() {
            self.merge_scanned(record);
        } else {
            self.merge_saved(record);
        }
    }

    fn merge_saved(&mut self, record: NetworkRecord) {
        self.saved.push(record);
        self.saved.sort_by_key(|r| r.index);
    }

    fn merge_scanned(&mut self, record: NetworkRecord) {
        // A scan result for an already-saved network never enters the
        // scanned list; it only strengthens the saved entry. The key
        // deliberately ignores bssid, so distinct access points
        // sharing an SSID collapse into one entry.
        if let Some(saved) = self
            .saved
            .iter_mut()
            .find(|s| s.ssid == record.ssid && s.security == record.security)
        {
            if saved.rssi < record.rssi {
                saved.status = record.status;
                saved.bssid = record.bssid;
                saved.rssi = record.rssi;
                saved.hidden = record.hidden;
            }
            return;
        }

        let existing = self
            .scanned
            .iter()
            .position(|s| s.ssid == record.ssid && s.security == record.security);
        match existing {
            Some(i) if self.scanned[i].rssi < record.rssi => {
                self.scanned[i] = record;
            }
            Some(_) => return, // weaker duplicate, discard
            None => self.scanned.push(record),
        }
        self.scanned.sort_by(|a, b| b.rssi.cmp(&a.rssi));
    }
}

// =========================================================================
// Tests
// =========================================================================
