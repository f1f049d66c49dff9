//! Durable result log and uploaded index.

use crate::{ExerciseResult, ExerciseSummary, ResultLogError, ResultLogResult};
use practice_kv_storage::{JsonStoreExt, KeyValueStore, StorageKeys};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Append-only log of exercise results plus the set of ids already delivered.
///
/// Records are kept in insertion order under [`StorageKeys::EXERCISE_RESULTS`];
/// delivered ids under [`StorageKeys::UPLOADED_RESULTS`].
#[derive(Clone)]
pub struct ResultStore {
    storage: Arc<dyn KeyValueStore>,
}

impl ResultStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Durably persist a result at the end of the log.
    pub fn append(&self, result: &ExerciseResult) -> ResultLogResult<()> {
        result.validate()?;

        let duplicate = self
            .storage
            .update_json(StorageKeys::EXERCISE_RESULTS, |log: &mut Vec<ExerciseResult>| {
                if log.iter().any(|r| r.id == result.id) {
                    true
                } else {
                    log.push(result.clone());
                    false
                }
            })
            .map_err(|e| {
                error!(result_id = %result.id, error = %e, "Failed to append result");
                e
            })?;

        if duplicate {
            return Err(ResultLogError::Validation(format!(
                "result {} is already in the log",
                result.id
            )));
        }

        debug!(
            result_id = %result.id,
            exercise = %result.exercise_name,
            completed = result.completed,
            "Appended result"
        );
        Ok(())
    }

    /// Every stored result in insertion order.
    pub fn list_all(&self) -> ResultLogResult<Vec<ExerciseResult>> {
        Ok(self.storage.load_json(StorageKeys::EXERCISE_RESULTS)?)
    }

    pub fn get(&self, id: &str) -> ResultLogResult<Option<ExerciseResult>> {
        Ok(self.list_all()?.into_iter().find(|r| r.id == id))
    }

    pub fn list_by_exercise(&self, exercise_name: &str) -> ResultLogResult<Vec<ExerciseResult>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|r| r.exercise_name == exercise_name)
            .collect())
    }

    pub fn len(&self) -> ResultLogResult<usize> {
        Ok(self.list_all()?.len())
    }

    pub fn is_empty(&self) -> ResultLogResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every result and the uploaded index. Irreversible.
    pub fn clear_all(&self) -> ResultLogResult<()> {
        self.storage.delete(StorageKeys::EXERCISE_RESULTS)?;
        self.storage.delete(StorageKeys::UPLOADED_RESULTS)?;
        info!("Cleared result log");
        Ok(())
    }

    /// Record an abandoned session with its progress snapshot.
    pub fn save_partial(
        &self,
        exercise_name: &str,
        progress: serde_json::Value,
        duration_seconds: u64,
    ) -> ResultLogResult<ExerciseResult> {
        let result = ExerciseResult::partial(exercise_name, progress, duration_seconds);
        self.append(&result)?;
        Ok(result)
    }

    /// Add ids to the uploaded index. Already present ids are ignored.
    pub fn mark_uploaded<I, S>(&self, ids: I) -> ResultLogResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let added = self.storage.update_json(
            StorageKeys::UPLOADED_RESULTS,
            |uploaded: &mut BTreeSet<String>| {
                ids.iter()
                    .filter(|id| uploaded.insert((*id).clone()))
                    .count()
            },
        )?;

        debug!(added, "Marked results uploaded");
        Ok(())
    }

    pub fn is_uploaded(&self, id: &str) -> ResultLogResult<bool> {
        Ok(self.uploaded_ids()?.contains(id))
    }

    /// Results not yet delivered to any professional, in log order.
    pub fn list_unuploaded(&self) -> ResultLogResult<Vec<ExerciseResult>> {
        let uploaded = self.uploaded_ids()?;
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|r| !uploaded.contains(&r.id))
            .collect())
    }

    /// Per-exercise aggregates, sorted by exercise name.
    pub fn summaries(&self) -> ResultLogResult<Vec<ExerciseSummary>> {
        let mut by_name: BTreeMap<String, ExerciseSummary> = BTreeMap::new();
        for result in self.list_all()? {
            let summary = match by_name.remove(&result.exercise_name) {
                Some(summary) => summary.with(&result),
                None => ExerciseSummary::from_first(&result),
            };
            by_name.insert(result.exercise_name.clone(), summary);
        }
        Ok(by_name.into_values().collect())
    }

    fn uploaded_ids(&self) -> ResultLogResult<BTreeSet<String>> {
        Ok(self.storage.load_json(StorageKeys::UPLOADED_RESULTS)?)
    }
}
