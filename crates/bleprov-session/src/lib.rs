//! Per-device session state for bleprov.
//!
//! This crate owns everything the host remembers about one connected
//! peripheral:
//!
//! 1. **Session tracking** — which devices are connected and how far
//!    through the connection lifecycle they are ([`SessionRegistry`])
//! 2. **Network reconciliation** — merging the device's streamed wifi
//!    records into consistent saved/scanned lists
//!    ([`Session::merge_record`])
//! 3. **Auto-reconnect flags** — retained per identity across session
//!    teardown
//!
//! # How it fits in the stack
//!
//! ```text
//! Dispatcher (above)  ← routes transport events into the registry
//!     ↕
//! Session layer (this crate)  ← per-device lists, MTU, lifecycle state
//!     ↕
//! Protocol layer (below)  ← provides DeviceId and NetworkRecord
//! ```

mod error;
mod merge;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::{DisconnectOutcome, SessionRegistry};
pub use session::{ConnectionState, Session};
