//! Result log data types.

use crate::{new_record_id, ResultLogError, ResultLogResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed or partial session outcome.
///
/// Immutable once created. `details` is carried through to the remote
/// verbatim, whatever shape the exercise chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseResult {
    pub id: String,
    pub exercise_name: String,
    pub score: u32,
    pub duration_seconds: u64,
    pub date: DateTime<Utc>,
    pub completed: bool,
    pub exited_early: bool,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl ExerciseResult {
    /// A session played to the end.
    pub fn completed(
        exercise_name: impl Into<String>,
        score: u32,
        duration_seconds: u64,
        details: serde_json::Value,
    ) -> Self {
        Self::finished_at(Utc::now(), exercise_name, score, duration_seconds, details)
    }

    /// Same as [`ExerciseResult::completed`] with an explicit completion time.
    pub fn finished_at(
        date: DateTime<Utc>,
        exercise_name: impl Into<String>,
        score: u32,
        duration_seconds: u64,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: new_record_id(date),
            exercise_name: exercise_name.into(),
            score,
            duration_seconds,
            date,
            completed: true,
            exited_early: false,
            details,
        }
    }

    /// A session abandoned midway. Score is always 0 and `details` holds
    /// the exercise's progress snapshot.
    pub fn partial(
        exercise_name: impl Into<String>,
        progress: serde_json::Value,
        duration_seconds: u64,
    ) -> Self {
        let date = Utc::now();
        Self {
            id: new_record_id(date),
            exercise_name: exercise_name.into(),
            score: 0,
            duration_seconds,
            date,
            completed: false,
            exited_early: true,
            details: progress,
        }
    }

    /// Check the record before it is persisted.
    pub fn validate(&self) -> ResultLogResult<()> {
        if self.completed && self.exited_early {
            return Err(ResultLogError::Validation(format!(
                "result {} is marked both completed and exited early",
                self.id
            )));
        }
        if self.id.trim().is_empty() {
            return Err(ResultLogError::Validation("result id is empty".to_string()));
        }
        if self.exercise_name.trim().is_empty() {
            return Err(ResultLogError::Validation(format!(
                "result {} has no exercise name",
                self.id
            )));
        }
        Ok(())
    }

    pub fn is_partial(&self) -> bool {
        self.exited_early
    }
}

/// Aggregate over every logged session of one exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSummary {
    pub exercise_name: String,
    pub sessions: usize,
    pub completed_sessions: usize,
    pub best_score: u32,
    pub total_seconds: u64,
    pub last_played: DateTime<Utc>,
}

impl ExerciseSummary {
    pub(crate) fn from_first(result: &ExerciseResult) -> Self {
        Self {
            exercise_name: result.exercise_name.clone(),
            sessions: 0,
            completed_sessions: 0,
            best_score: 0,
            total_seconds: 0,
            last_played: result.date,
        }
        .with(result)
    }

    pub(crate) fn with(mut self, result: &ExerciseResult) -> Self {
        self.sessions += 1;
        if result.completed {
            self.completed_sessions += 1;
        }
        self.best_score = self.best_score.max(result.score);
        self.total_seconds += result.duration_seconds;
        self.last_played = self.last_played.max(result.date);
        self
    }
}
