//! # Result Synchronizer
//!
//! The collaborator-facing entry point of practice-sync. Exercise screens
//! hand finished or abandoned sessions to [`Synchronizer::record_result`] and
//! manage the professional link with [`Synchronizer::connect`] and
//! [`Synchronizer::disconnect`].
//!
//! Every result is written to the local log before anything touches the
//! network. With an active connection one immediate delivery is attempted,
//! and a failed delivery waits in the outbox until [`Synchronizer::drain_outbox`]
//! runs (app resume, new connection).
//!
//! ```text
//! record_result ─▶ ResultStore.append ─▶ connection? ──no──▶ StoredLocally
//!                                            │yes
//!                                            ▼
//!                                      RemoteWriter.write ──ok──▶ Synced
//!                                            │fail
//!                                            ▼
//!                                      SyncOutbox.enqueue ─────▶ Queued
//! ```

mod error;
mod synchronizer;

#[cfg(test)]
mod tests;

pub use error::{SyncError, SyncResult};
pub use synchronizer::{ConnectReport, RecordOutcome, SyncStatus, Synchronizer};

pub use exercise_result_log::{ConnectionData, ExerciseResult, ExerciseSummary, ResultStore};
pub use session_clock::{Clock, ManualClock, SessionClock, SystemClock};
pub use sync_outbox::{DrainReport, PendingSyncEntry};
