//! Backend trait definition.

use crate::{RemoteResult, StatisticDelivery};
use async_trait::async_trait;

/// Remote store holding professionals and the statistics delivered to them.
#[async_trait]
pub trait ProfessionalBackend: Send + Sync {
    /// Whether a professional with this id exists.
    ///
    /// `Ok(false)` means the backend answered and the id is absent; any error
    /// means the question could not be answered.
    async fn professional_exists(&self, professional_id: &str) -> RemoteResult<bool>;

    /// Insert one client statistic row.
    async fn insert_client_statistic(&self, delivery: &StatisticDelivery) -> RemoteResult<()>;
}
