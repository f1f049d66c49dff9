//! Best-effort statistic delivery.

use crate::{ProfessionalBackend, RemoteResult, StatisticDelivery};
use std::sync::Arc;
use tracing::{debug, warn};

/// Single-row writes that report success as a bool.
#[derive(Clone)]
pub struct RemoteWriter {
    backend: Arc<dyn ProfessionalBackend>,
}

impl RemoteWriter {
    pub fn new(backend: Arc<dyn ProfessionalBackend>) -> Self {
        Self { backend }
    }

    /// Deliver one statistic. Every failure is logged and collapses to `false`.
    pub async fn write(&self, delivery: &StatisticDelivery) -> bool {
        self.try_write(delivery).await.is_ok()
    }

    /// Same as [`RemoteWriter::write`] but hands the cause back, for callers
    /// that keep a record of why a delivery failed.
    pub async fn try_write(&self, delivery: &StatisticDelivery) -> RemoteResult<()> {
        match self.backend.insert_client_statistic(delivery).await {
            Ok(()) => {
                debug!(
                    professional_id = %delivery.professional_id,
                    result_id = ?delivery.result_id,
                    "Delivery succeeded"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    professional_id = %delivery.professional_id,
                    result_id = ?delivery.result_id,
                    error = %e,
                    "Delivery failed"
                );
                Err(e)
            }
        }
    }
}
