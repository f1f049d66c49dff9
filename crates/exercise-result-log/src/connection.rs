//! The single active link to a supervising professional.

use crate::{ResultLogError, ResultLogResult};
use chrono::{DateTime, Utc};
use practice_kv_storage::{KeyValueStore, StorageKeys};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Persisted connection record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    /// Lowercase hyphenated UUID
    pub professional_id: String,
    /// Label the local user chose for themselves
    pub client_identifier: String,
    pub connected_at: DateTime<Utc>,
}

/// Parse a professional id and return its canonical lowercase hyphenated form.
///
/// Accepts any textual UUID form (`simple`, `hyphenated`, `braced`, `urn`).
pub fn normalize_professional_id(raw: &str) -> ResultLogResult<String> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.hyphenated().to_string())
        .map_err(|e| {
            ResultLogError::Validation(format!("professional id {raw:?} is not a UUID: {e}"))
        })
}

/// Zero-or-one [`ConnectionData`] under [`StorageKeys::PROFESSIONAL_CONNECTION`].
#[derive(Clone)]
pub struct ConnectionRegistry {
    storage: Arc<dyn KeyValueStore>,
}

impl ConnectionRegistry {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn get(&self) -> ResultLogResult<Option<ConnectionData>> {
        match self.storage.get(StorageKeys::PROFESSIONAL_CONNECTION)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn is_connected(&self) -> ResultLogResult<bool> {
        Ok(self.get()?.is_some())
    }

    /// Replace any prior connection.
    ///
    /// Fails with `Validation` on a non-UUID id or a blank client identifier,
    /// leaving the stored record untouched.
    pub fn set(
        &self,
        professional_id: &str,
        client_identifier: &str,
    ) -> ResultLogResult<ConnectionData> {
        let professional_id = normalize_professional_id(professional_id)?;
        let client_identifier = client_identifier.trim();
        if client_identifier.is_empty() {
            return Err(ResultLogError::Validation(
                "client identifier must not be blank".to_string(),
            ));
        }

        let data = ConnectionData {
            professional_id,
            client_identifier: client_identifier.to_string(),
            connected_at: Utc::now(),
        };
        let raw = serde_json::to_string(&data)?;
        self.storage.set(StorageKeys::PROFESSIONAL_CONNECTION, &raw)?;

        info!(
            professional_id = %data.professional_id,
            client_identifier = %data.client_identifier,
            "Connection stored"
        );
        Ok(data)
    }

    /// Drop the connection. Returns whether one existed.
    pub fn clear(&self) -> ResultLogResult<bool> {
        let existed = self.storage.delete(StorageKeys::PROFESSIONAL_CONNECTION)?;
        if existed {
            info!("Connection cleared");
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_kv_storage::MemoryKvStore;

    const PRO_ID: &str = "3F2504E0-4F89-11D3-9A0C-0305E82C3301";

    fn registry() -> ConnectionRegistry {
        ConnectionRegistry::new(Arc::new(MemoryKvStore::new()))
    }

    #[test]
    fn empty_registry_has_no_connection() {
        let registry = registry();
        assert_eq!(registry.get().unwrap(), None);
        assert!(!registry.is_connected().unwrap());
    }

    #[test]
    fn set_normalizes_and_persists() {
        let registry = registry();
        let data = registry.set(PRO_ID, "  Ayşe  ").unwrap();

        assert_eq!(data.professional_id, "3f2504e0-4f89-11d3-9a0c-0305e82c3301");
        assert_eq!(data.client_identifier, "Ayşe");
        assert_eq!(registry.get().unwrap(), Some(data));
    }

    #[test]
    fn set_replaces_prior_value() {
        let registry = registry();
        registry.set(PRO_ID, "first").unwrap();
        let second = registry
            .set("6ba7b810-9dad-11d1-80b4-00c04fd430c8", "second")
            .unwrap();

        assert_eq!(registry.get().unwrap(), Some(second));
    }

    #[test]
    fn set_rejects_non_uuid_and_keeps_prior() {
        let registry = registry();
        let prior = registry.set(PRO_ID, "client").unwrap();

        let err = registry.set("not-a-uuid", "client").unwrap_err();
        assert!(matches!(err, ResultLogError::Validation(_)));

        let err = registry.set(PRO_ID, "   ").unwrap_err();
        assert!(matches!(err, ResultLogError::Validation(_)));

        assert_eq!(registry.get().unwrap(), Some(prior));
    }

    #[test]
    fn clear_removes_connection() {
        let registry = registry();
        registry.set(PRO_ID, "client").unwrap();

        assert!(registry.clear().unwrap());
        assert!(!registry.clear().unwrap());
        assert_eq!(registry.get().unwrap(), None);
    }

    #[test]
    fn normalize_accepts_simple_form() {
        let id = normalize_professional_id("3f2504e04f8911d39a0c0305e82c3301").unwrap();
        assert_eq!(id, "3f2504e0-4f89-11d3-9a0c-0305e82c3301");
    }
}
