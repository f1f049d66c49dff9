//! Scenario tests for the synchronizer.
//!
//! - `harness.rs`   - scripted backend and a synchronizer over an in-memory medium
//! - `recording.rs` - recording results: durability first, live delivery, queueing
//! - `connect.rs`   - connect ordering and atomicity, disconnect
//! - `drain.rs`     - outbox retry, pruning, convergence, drain serialization

mod drain;
