//! Local-first result log.
//!
//! Owns the three result-side records of the key-value medium:
//! - the ordered log of [`ExerciseResult`]s and the uploaded-id index
//!   ([`ResultStore`])
//! - the single active professional link ([`ConnectionRegistry`])
//!
//! Nothing here touches the network. Synchronization lives in the
//! `sync-outbox` and `result-synchronizer` crates.

mod connection;
mod error;
mod id;
mod model;
mod store;

pub use connection::{normalize_professional_id, ConnectionData, ConnectionRegistry};
pub use error::{ResultLogError, ResultLogResult};
pub use id::{new_record_id, random_suffix, RANDOM_SUFFIX_LEN};
pub use model::{ExerciseResult, ExerciseSummary};
pub use store::ResultStore;
