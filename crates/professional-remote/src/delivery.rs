//! Payload delivered to the statistics table.

use crate::RemoteResult;
use chrono::{DateTime, Utc};
use exercise_result_log::ExerciseResult;
use serde::{Deserialize, Serialize};

/// `type` tag of the marker payload sent as the trial write during connect.
pub const CONNECTION_CHECK_TYPE: &str = "connection_check";

/// One statistic destined for a professional.
///
/// Persisted in the outbox with camelCase fields. [`StatisticDelivery::row`]
/// produces the snake_case body PostgREST expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticDelivery {
    pub professional_id: String,
    pub client_identifier: String,
    pub exercise_data: serde_json::Value,
    /// True for results recorded while connected, false for history uploads
    /// and the trial write.
    pub is_client_mode_session: bool,
    pub session_timestamp: DateTime<Utc>,
    /// Local result carried by this delivery, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,
}

/// Insert body for the statistics table.
#[derive(Debug, Serialize)]
pub(crate) struct ClientStatisticRow<'a> {
    professional_id: &'a str,
    client_identifier: &'a str,
    exercise_data: &'a serde_json::Value,
    is_client_mode_session: bool,
    session_timestamp: String,
}

impl StatisticDelivery {
    /// Delivery carrying a full result record.
    pub fn for_result(
        professional_id: &str,
        client_identifier: &str,
        result: &ExerciseResult,
        is_client_mode_session: bool,
    ) -> RemoteResult<Self> {
        Ok(Self {
            professional_id: professional_id.to_string(),
            client_identifier: client_identifier.to_string(),
            exercise_data: serde_json::to_value(result)?,
            is_client_mode_session,
            session_timestamp: result.date,
            result_id: Some(result.id.clone()),
        })
    }

    /// Marker payload used to prove the target accepts writes.
    pub fn connection_check(professional_id: &str, client_identifier: &str) -> Self {
        let now = Utc::now();
        Self {
            professional_id: professional_id.to_string(),
            client_identifier: client_identifier.to_string(),
            exercise_data: serde_json::json!({
                "type": CONNECTION_CHECK_TYPE,
                "checkedAt": now,
            }),
            is_client_mode_session: false,
            session_timestamp: now,
            result_id: None,
        }
    }

    pub fn is_connection_check(&self) -> bool {
        self.exercise_data.get("type").and_then(|t| t.as_str()) == Some(CONNECTION_CHECK_TYPE)
    }

    pub(crate) fn row(&self) -> ClientStatisticRow<'_> {
        ClientStatisticRow {
            professional_id: &self.professional_id,
            client_identifier: &self.client_identifier,
            exercise_data: &self.exercise_data,
            is_client_mode_session: self.is_client_mode_session,
            session_timestamp: self.session_timestamp.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PRO_ID: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

    #[test]
    fn for_result_embeds_full_record() {
        let result = ExerciseResult::completed("Hafıza Oyunu", 80, 45, json!({ "pairs": 8 }));
        let delivery = StatisticDelivery::for_result(PRO_ID, "Ayşe", &result, true).unwrap();

        assert_eq!(delivery.exercise_data["exerciseName"], "Hafıza Oyunu");
        assert_eq!(delivery.exercise_data["details"]["pairs"], 8);
        assert_eq!(delivery.session_timestamp, result.date);
        assert_eq!(delivery.result_id.as_deref(), Some(result.id.as_str()));
        assert!(delivery.is_client_mode_session);
        assert!(!delivery.is_connection_check());
    }

    #[test]
    fn connection_check_is_marked() {
        let delivery = StatisticDelivery::connection_check(PRO_ID, "Ayşe");
        assert!(delivery.is_connection_check());
        assert!(!delivery.is_client_mode_session);
        assert!(delivery.result_id.is_none());
    }

    #[test]
    fn row_uses_snake_case_and_omits_result_id() {
        let result = ExerciseResult::completed("Stroop", 1, 2, json!(null));
        let delivery = StatisticDelivery::for_result(PRO_ID, "Ayşe", &result, false).unwrap();
        let body = serde_json::to_value(delivery.row()).unwrap();

        let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "client_identifier",
                "exercise_data",
                "is_client_mode_session",
                "professional_id",
                "session_timestamp",
            ]
        );
        assert_eq!(body["is_client_mode_session"], false);
    }

    #[test]
    fn persisted_form_is_camel_case() {
        let delivery = StatisticDelivery::connection_check(PRO_ID, "Ayşe");
        let value = serde_json::to_value(&delivery).unwrap();

        assert_eq!(value["professionalId"], PRO_ID);
        assert_eq!(value["isClientModeSession"], false);
        assert!(value.get("resultId").is_none());
    }
}
