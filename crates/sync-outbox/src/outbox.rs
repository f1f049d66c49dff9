//! The pending-sync outbox and its drain pass.

use crate::{OutboxError, OutboxResult, PendingSyncEntry};
use chrono::{DateTime, Utc};
use exercise_result_log::ResultStore;
use practice_kv_storage::{JsonStoreExt, KeyValueStore, StorageKeys};
use professional_remote::{RemoteValidator, RemoteWriter, StatisticDelivery, TargetStatus};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

type PendingMap = BTreeMap<String, PendingSyncEntry>;

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Entries delivered and removed.
    pub synced: usize,
    /// Entries removed because their professional no longer exists.
    pub invalid_target: usize,
    /// Entries left for a later pass.
    pub still_pending: usize,
    /// Entries dropped without a write because their result was already
    /// delivered through another path.
    pub already_delivered: usize,
    /// Local result ids carried by the synced entries.
    pub synced_result_ids: Vec<String>,
}

impl DrainReport {
    /// Number of entries the pass looked at.
    pub fn processed(&self) -> usize {
        self.synced + self.invalid_target + self.still_pending + self.already_delivered
    }
}

/// Snapshot for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboxStatus {
    pub pending: usize,
    pub oldest_enqueued_at: Option<DateTime<Utc>>,
}

/// Durable queue of failed deliveries.
#[derive(Clone)]
pub struct SyncOutbox {
    storage: Arc<dyn KeyValueStore>,
    results: ResultStore,
    validator: RemoteValidator,
    writer: RemoteWriter,
}

impl SyncOutbox {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        validator: RemoteValidator,
        writer: RemoteWriter,
    ) -> Self {
        Self {
            results: ResultStore::new(storage.clone()),
            storage,
            validator,
            writer,
        }
    }

    /// Durably add a delivery under a fresh key.
    pub fn enqueue(&self, delivery: StatisticDelivery) -> OutboxResult<PendingSyncEntry> {
        if delivery.professional_id.trim().is_empty() {
            return Err(OutboxError::InvalidEntry(
                "delivery has no professional id".to_string(),
            ));
        }

        let mut entry = PendingSyncEntry::new(delivery, Utc::now());
        let entry = self
            .storage
            .update_json(StorageKeys::PENDING_SYNC_DATA, |pending: &mut PendingMap| {
                while pending.contains_key(&entry.key) {
                    entry.key = crate::new_pending_key(entry.enqueued_at);
                }
                pending.insert(entry.key.clone(), entry.clone());
                entry
            })?;

        debug!(
            key = %entry.key,
            professional_id = %entry.delivery.professional_id,
            result_id = ?entry.delivery.result_id,
            "Enqueued pending delivery"
        );
        Ok(entry)
    }

    /// Pending entries, oldest first.
    pub fn pending(&self) -> OutboxResult<Vec<PendingSyncEntry>> {
        let pending: PendingMap = self.storage.load_json(StorageKeys::PENDING_SYNC_DATA)?;
        let mut entries: Vec<PendingSyncEntry> = pending.into_values().collect();
        entries.sort_by(|a, b| {
            a.enqueued_at
                .cmp(&b.enqueued_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(entries)
    }

    /// Result ids waiting for delivery to `professional_id`.
    pub fn pending_result_ids(&self, professional_id: &str) -> OutboxResult<HashSet<String>> {
        Ok(self
            .pending()?
            .into_iter()
            .filter(|e| e.delivery.professional_id == professional_id)
            .filter_map(|e| e.delivery.result_id)
            .collect())
    }

    pub fn pending_count(&self) -> OutboxResult<usize> {
        Ok(self.pending()?.len())
    }

    pub fn status(&self) -> OutboxResult<OutboxStatus> {
        let pending = self.pending()?;
        Ok(OutboxStatus {
            pending: pending.len(),
            oldest_enqueued_at: pending.first().map(|e| e.enqueued_at),
        })
    }

    /// Drop one entry. Returns whether it was present.
    pub fn remove(&self, key: &str) -> OutboxResult<bool> {
        Ok(self
            .storage
            .update_json(StorageKeys::PENDING_SYNC_DATA, |pending: &mut PendingMap| {
                pending.remove(key).is_some()
            })?)
    }

    /// Re-validate and retry every pending entry once.
    ///
    /// Per entry: a result already in the uploaded index is dropped without a
    /// write; a professional confirmed absent prunes the entry without a
    /// write; an unverifiable professional leaves it untouched; otherwise one
    /// write is attempted and the entry is removed on success or annotated on
    /// failure. Each professional id is checked at most once per pass.
    ///
    /// A delivered result is marked uploaded before its entry is removed, so
    /// a storage error that stops the pass never loses the mark of an entry
    /// already handled. Entries enqueued meanwhile stay for the next pass.
    pub async fn drain_and_retry(&self) -> OutboxResult<DrainReport> {
        let entries = self.pending()?;
        let mut report = DrainReport::default();

        if entries.is_empty() {
            debug!("Outbox empty, nothing to drain");
            return Ok(report);
        }

        info!(pending = entries.len(), "Draining outbox");

        let mut targets: HashMap<String, TargetStatus> = HashMap::new();

        for entry in entries {
            if let Some(result_id) = entry.delivery.result_id.as_deref() {
                if self.results.is_uploaded(result_id)? {
                    self.remove(&entry.key)?;
                    debug!(
                        key = %entry.key,
                        result_id,
                        "Result already delivered, dropping entry"
                    );
                    report.already_delivered += 1;
                    continue;
                }
            }

            let professional_id = entry.delivery.professional_id.clone();
            let status = match targets.get(&professional_id) {
                Some(status) => *status,
                None => {
                    let status = self.validator.check(&professional_id).await;
                    targets.insert(professional_id.clone(), status);
                    status
                }
            };

            match status {
                TargetStatus::Absent => {
                    self.remove(&entry.key)?;
                    warn!(
                        key = %entry.key,
                        professional_id = %professional_id,
                        "Pruned entry for missing professional"
                    );
                    report.invalid_target += 1;
                }
                TargetStatus::Unknown => {
                    debug!(key = %entry.key, "Target unverifiable, keeping entry");
                    report.still_pending += 1;
                }
                TargetStatus::Present => match self.writer.try_write(&entry.delivery).await {
                    Ok(()) => {
                        if let Some(result_id) = entry.delivery.result_id.clone() {
                            self.results.mark_uploaded([result_id.as_str()])?;
                            report.synced_result_ids.push(result_id);
                        }
                        self.remove(&entry.key)?;
                        report.synced += 1;
                    }
                    Err(e) => {
                        self.record_failure(&entry.key, e.to_string())?;
                        report.still_pending += 1;
                    }
                },
            }
        }

        info!(
            synced = report.synced,
            invalid_target = report.invalid_target,
            still_pending = report.still_pending,
            already_delivered = report.already_delivered,
            "Outbox drain complete"
        );
        Ok(report)
    }

    fn record_failure(&self, key: &str, error: String) -> OutboxResult<()> {
        self.storage
            .update_json(StorageKeys::PENDING_SYNC_DATA, |pending: &mut PendingMap| {
                if let Some(entry) = pending.get_mut(key) {
                    entry.attempts += 1;
                    entry.last_error = Some(error);
                }
            })?;
        Ok(())
    }
}
