//! Orchestration of the result log, connection registry and outbox.

use crate::{SyncError, SyncResult};
use exercise_result_log::{
    normalize_professional_id, ConnectionData, ConnectionRegistry, ExerciseResult, ResultStore,
};
use practice_config_and_utils::{Config, Paths};
use practice_kv_storage::{KeyValueStore, SqliteKvStore};
use professional_remote::{
    ProfessionalBackend, RemoteValidator, RemoteWriter, StatisticDelivery, SupabaseClient,
    TargetStatus,
};
use session_clock::SessionClock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use sync_outbox::{DrainReport, PendingSyncEntry, SyncOutbox};
use tracing::{debug, error, info, warn};

/// Where a recorded result ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// No connection: stored in the local log only.
    StoredLocally,
    /// Stored and delivered to the connected professional.
    Synced,
    /// Stored; delivery failed and waits in the outbox under `key`.
    Queued { key: String },
}

/// Result of a successful [`Synchronizer::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectReport {
    pub connection: ConnectionData,
    /// History records delivered (and marked uploaded).
    pub history_uploaded: usize,
    /// History records that failed. They stay unuploaded and are not queued.
    pub history_failed: usize,
    /// Outbox drain run after the connection was stored. `None` when another
    /// drain was already in progress or the drain hit a storage error.
    pub drain: Option<DrainReport>,
}

/// Informational sync signal for the UI. Never blocks on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub connection: Option<ConnectionData>,
    pub pending: usize,
    pub unuploaded: usize,
    pub drain_in_progress: bool,
}

impl SyncStatus {
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

/// Releases the drain flag when dropped, including when a drain future is
/// cancelled mid-pass.
struct DrainGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Local-first recorder and synchronizer.
pub struct Synchronizer {
    results: ResultStore,
    registry: ConnectionRegistry,
    outbox: SyncOutbox,
    validator: RemoteValidator,
    writer: RemoteWriter,
    draining: AtomicBool,
}

impl Synchronizer {
    /// Assemble a synchronizer over any medium and backend.
    pub fn new(storage: Arc<dyn KeyValueStore>, backend: Arc<dyn ProfessionalBackend>) -> Self {
        let validator = RemoteValidator::new(backend.clone());
        let writer = RemoteWriter::new(backend);

        Self {
            results: ResultStore::new(storage.clone()),
            registry: ConnectionRegistry::new(storage.clone()),
            outbox: SyncOutbox::new(storage, validator.clone(), writer.clone()),
            validator,
            writer,
            draining: AtomicBool::new(false),
        }
    }

    /// Production stack: SQLite medium under `paths`, Supabase backend from `config`.
    pub fn open(config: &Config, paths: &Paths) -> SyncResult<Self> {
        paths.ensure_dirs()?;
        let storage = SqliteKvStore::open(&paths.database_file())?;
        let backend = SupabaseClient::from_config(config)?;

        info!(
            database = %paths.database_file().display(),
            backend = ?backend,
            "Synchronizer opened"
        );
        Ok(Self::new(Arc::new(storage), Arc::new(backend)))
    }

    /// Read-only access to the local result log.
    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    /// Deliveries waiting in the outbox, oldest first.
    pub fn pending_deliveries(&self) -> SyncResult<Vec<PendingSyncEntry>> {
        Ok(self.outbox.pending()?)
    }

    /// Record a finished or abandoned session.
    ///
    /// The result is appended to the local log first; a storage failure is
    /// returned before any remote call. With an active connection one
    /// immediate delivery is attempted and a failure is queued.
    pub async fn record_result(&self, result: ExerciseResult) -> SyncResult<RecordOutcome> {
        self.results.append(&result)?;

        let Some(connection) = self.registry.get()? else {
            debug!(result_id = %result.id, "No connection, result stored locally");
            return Ok(RecordOutcome::StoredLocally);
        };

        let delivery = StatisticDelivery::for_result(
            &connection.professional_id,
            &connection.client_identifier,
            &result,
            true,
        )?;

        if self.writer.write(&delivery).await {
            if let Err(e) = self.results.mark_uploaded([result.id.as_str()]) {
                error!(result_id = %result.id, error = %e, "Delivered but failed to mark uploaded");
            }
            info!(result_id = %result.id, "Result synced");
            return Ok(RecordOutcome::Synced);
        }

        let entry = self.outbox.enqueue(delivery)?;
        warn!(result_id = %result.id, key = %entry.key, "Result queued for retry");
        Ok(RecordOutcome::Queued { key: entry.key })
    }

    /// Record an abandoned session with the exercise's progress snapshot.
    pub async fn save_partial_progress(
        &self,
        exercise_name: &str,
        progress: serde_json::Value,
        duration_seconds: u64,
    ) -> SyncResult<(ExerciseResult, RecordOutcome)> {
        let result = ExerciseResult::partial(exercise_name, progress, duration_seconds);
        let outcome = self.record_result(result.clone()).await?;
        Ok((result, outcome))
    }

    /// Finish `clock` and record a completed session with its active time.
    pub async fn record_completed_session(
        &self,
        exercise_name: &str,
        score: u32,
        clock: &mut SessionClock,
        details: serde_json::Value,
    ) -> SyncResult<(ExerciseResult, RecordOutcome)> {
        let result = ExerciseResult::completed(exercise_name, score, clock.finish(), details);
        let outcome = self.record_result(result.clone()).await?;
        Ok((result, outcome))
    }

    /// Finish `clock` and save the session as abandoned with `progress`.
    pub async fn abandon_session(
        &self,
        exercise_name: &str,
        progress: serde_json::Value,
        clock: &mut SessionClock,
    ) -> SyncResult<(ExerciseResult, RecordOutcome)> {
        let duration_seconds = clock.finish();
        self.save_partial_progress(exercise_name, progress, duration_seconds)
            .await
    }

    pub fn get_connection(&self) -> SyncResult<Option<ConnectionData>> {
        Ok(self.registry.get()?)
    }

    /// Link this device to a professional.
    ///
    /// Order: id syntax check, remote existence check, history upload, trial
    /// write, store connection, drain outbox. The stored connection changes
    /// only when both the existence check and the trial write succeed.
    pub async fn connect(
        &self,
        professional_id: &str,
        client_identifier: &str,
        local_history: &[ExerciseResult],
    ) -> SyncResult<ConnectReport> {
        let professional_id = normalize_professional_id(professional_id)?;
        let client_identifier = client_identifier.trim();
        if client_identifier.is_empty() {
            return Err(SyncError::Validation(
                "client identifier must not be blank".to_string(),
            ));
        }

        match self.validator.check(&professional_id).await {
            TargetStatus::Present => {}
            TargetStatus::Absent => return Err(SyncError::InvalidTarget(professional_id)),
            TargetStatus::Unknown => return Err(SyncError::RemoteUnavailable(professional_id)),
        }

        let mut history_uploaded = 0;
        let mut history_failed = 0;
        for result in local_history {
            let delivery =
                StatisticDelivery::for_result(&professional_id, client_identifier, result, false)?;
            if self.writer.write(&delivery).await {
                self.results.mark_uploaded([result.id.as_str()])?;
                history_uploaded += 1;
            } else {
                history_failed += 1;
            }
        }
        debug!(history_uploaded, history_failed, "History upload finished");

        let trial = StatisticDelivery::connection_check(&professional_id, client_identifier);
        if !self.writer.write(&trial).await {
            return Err(SyncError::TrialWriteFailed(professional_id));
        }

        let connection = self.registry.set(&professional_id, client_identifier)?;
        info!(
            professional_id = %connection.professional_id,
            history_uploaded,
            history_failed,
            "Connected to professional"
        );

        let drain = match self.drain_outbox().await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Outbox drain after connect failed");
                None
            }
        };

        Ok(ConnectReport {
            connection,
            history_uploaded,
            history_failed,
            drain,
        })
    }

    /// [`Synchronizer::connect`] with every not-yet-uploaded local result as history.
    ///
    /// Results already queued for the same professional are left to the
    /// drain that follows the connect, so each is delivered once.
    pub async fn connect_with_local_history(
        &self,
        professional_id: &str,
        client_identifier: &str,
    ) -> SyncResult<ConnectReport> {
        let normalized = normalize_professional_id(professional_id)?;
        let queued = self.outbox.pending_result_ids(&normalized)?;
        let history: Vec<ExerciseResult> = self
            .results
            .list_unuploaded()?
            .into_iter()
            .filter(|result| !queued.contains(&result.id))
            .collect();

        if !queued.is_empty() {
            debug!(queued = queued.len(), "Queued results left to the outbox drain");
        }
        self.connect(&normalized, client_identifier, &history).await
    }

    /// Drop the connection. The result log and outbox are left as they are.
    pub fn disconnect(&self) -> SyncResult<bool> {
        let existed = self.registry.clear()?;
        info!(existed, "Disconnected from professional");
        Ok(existed)
    }

    /// Run one outbox pass, unless one is already running.
    ///
    /// Returns `None` without touching the outbox when another drain holds
    /// the in-progress flag. Delivered results are marked uploaded by the
    /// pass itself.
    pub async fn drain_outbox(&self) -> SyncResult<Option<DrainReport>> {
        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            debug!("Drain already in progress, skipping");
            return Ok(None);
        };

        Ok(Some(self.outbox.drain_and_retry().await?))
    }

    pub fn status(&self) -> SyncResult<SyncStatus> {
        Ok(SyncStatus {
            connection: self.registry.get()?,
            pending: self.outbox.pending_count()?,
            unuploaded: self.results.list_unuploaded()?.len(),
            drain_in_progress: self.draining.load(Ordering::Acquire),
        })
    }
}
