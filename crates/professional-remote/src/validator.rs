//! Remote existence checks for professionals.

use crate::ProfessionalBackend;
use std::sync::Arc;
use tracing::{debug, warn};

/// Answer to "does this professional exist?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// The backend confirmed the professional exists.
    Present,
    /// The backend answered and the professional does not exist.
    Absent,
    /// The backend could not be asked (network error, non-success status).
    Unknown,
}

/// Existence checks that never fail.
#[derive(Clone)]
pub struct RemoteValidator {
    backend: Arc<dyn ProfessionalBackend>,
}

impl RemoteValidator {
    pub fn new(backend: Arc<dyn ProfessionalBackend>) -> Self {
        Self { backend }
    }

    /// Three-valued existence check. Errors are logged and become `Unknown`.
    pub async fn check(&self, professional_id: &str) -> TargetStatus {
        match self.backend.professional_exists(professional_id).await {
            Ok(true) => TargetStatus::Present,
            Ok(false) => {
                debug!(professional_id, "Professional not found");
                TargetStatus::Absent
            }
            Err(e) => {
                warn!(professional_id, error = %e, "Professional check failed");
                TargetStatus::Unknown
            }
        }
    }

    /// `true` only when existence is confirmed.
    pub async fn exists(&self, professional_id: &str) -> bool {
        self.check(professional_id).await == TargetStatus::Present
    }
}
