//! Persisted outbox entries.

use chrono::{DateTime, Utc};
use exercise_result_log::random_suffix;
use professional_remote::StatisticDelivery;
use serde::{Deserialize, Serialize};

pub const PENDING_KEY_PREFIX: &str = "pending-";

/// `pending-{unix millis}-{random suffix}`.
pub fn new_pending_key(at: DateTime<Utc>) -> String {
    format!("{PENDING_KEY_PREFIX}{}-{}", at.timestamp_millis(), random_suffix())
}

/// One delivery waiting for a retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSyncEntry {
    pub key: String,
    #[serde(flatten)]
    pub delivery: StatisticDelivery,
    pub enqueued_at: DateTime<Utc>,
    /// Failed delivery attempts since the entry was queued.
    #[serde(default)]
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl PendingSyncEntry {
    pub fn new(delivery: StatisticDelivery, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            key: new_pending_key(enqueued_at),
            delivery,
            enqueued_at,
            attempts: 0,
            last_error: None,
        }
    }
}
