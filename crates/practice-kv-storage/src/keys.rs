//! Storage key constants.

/// Logical keys persisted in the medium.
pub struct StorageKeys;

impl StorageKeys {
    /// Ordered list of every `ExerciseResult` (JSON array)
    pub const EXERCISE_RESULTS: &'static str = "exerciseResults";

    /// Ids of results already delivered to the remote (JSON array)
    pub const UPLOADED_RESULTS: &'static str = "uploadedResults";

    /// Active professional connection (JSON object)
    pub const PROFESSIONAL_CONNECTION: &'static str = "professionalConnection";

    /// Pending outbox entries keyed by entry key (JSON object)
    pub const PENDING_SYNC_DATA: &'static str = "pendingSyncData";
}
