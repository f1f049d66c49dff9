//! Pending-sync outbox.
//!
//! Deliveries that failed their first attempt wait here under
//! `pendingSyncData` until a drain either delivers them or learns that their
//! professional no longer exists. Ambiguous failures never drop an entry.

mod entry;
mod error;
mod outbox;

pub use entry::{new_pending_key, PendingSyncEntry, PENDING_KEY_PREFIX};
pub use error::{OutboxError, OutboxResult};
pub use outbox::{DrainReport, OutboxStatus, SyncOutbox};
