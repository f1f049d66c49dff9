//! Supabase REST API client.

use crate::{ProfessionalBackend, RemoteError, RemoteResult, StatisticDelivery};
use async_trait::async_trait;
use practice_config_and_utils::{
    Config, DEFAULT_PROFESSIONALS_TABLE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STATISTICS_TABLE,
};
use std::time::Duration;
use tracing::{debug, error};

/// PostgREST client for the professionals and statistics tables.
#[derive(Clone)]
pub struct SupabaseClient {
    http_client: reqwest::Client,
    api_url: String,
    anon_key: String,
    professionals_table: String,
    statistics_table: String,
}

impl SupabaseClient {
    /// Create a new Supabase client with the default tables and timeout.
    ///
    /// # Arguments
    /// * `api_url` - The Supabase project API URL (e.g., `https://xyz.supabase.co`)
    /// * `anon_key` - The Supabase anonymous API key
    pub fn new(api_url: impl Into<String>, anon_key: impl Into<String>) -> RemoteResult<Self> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let anon_key = anon_key.into();
        if api_url.is_empty() {
            return Err(RemoteError::Config("Supabase URL is empty".to_string()));
        }
        if anon_key.is_empty() {
            return Err(RemoteError::Config("Supabase anon key is empty".to_string()));
        }

        Ok(Self {
            http_client: build_http_client(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))?,
            api_url,
            anon_key,
            professionals_table: DEFAULT_PROFESSIONALS_TABLE.to_string(),
            statistics_table: DEFAULT_STATISTICS_TABLE.to_string(),
        })
    }

    /// Client built from the loaded configuration.
    pub fn from_config(config: &Config) -> RemoteResult<Self> {
        let url = config
            .supabase_url()
            .map_err(|e| RemoteError::Config(e.to_string()))?;

        Self::new(url.as_str(), config.supabase_anon_key.clone())?
            .with_tables(&config.professionals_table, &config.statistics_table)
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_tables(mut self, professionals_table: &str, statistics_table: &str) -> Self {
        self.professionals_table = professionals_table.to_string();
        self.statistics_table = statistics_table.to_string();
        self
    }

    /// Replace the HTTP client with one using the given per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> RemoteResult<Self> {
        self.http_client = build_http_client(timeout)?;
        Ok(self)
    }

    /// Build the REST API URL for a table.
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }

    fn professional_lookup_url(&self, professional_id: &str) -> String {
        format!(
            "{}?id=eq.{}&select=id&limit=1",
            self.rest_url(&self.professionals_table),
            professional_id
        )
    }

    /// Check HTTP response for errors.
    async fn check_response(&self, response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status, body = %body, "Supabase request failed");
            return Err(RemoteError::Supabase {
                status,
                message: body,
            });
        }
        Ok(response)
    }
}

fn build_http_client(timeout: Duration) -> RemoteResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

#[async_trait]
impl ProfessionalBackend for SupabaseClient {
    async fn professional_exists(&self, professional_id: &str) -> RemoteResult<bool> {
        let url = self.professional_lookup_url(professional_id);

        debug!(professional_id, "Checking professional in Supabase");

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = self.check_response(response).await?.json().await?;

        debug!(professional_id, found = !rows.is_empty(), "Professional lookup complete");
        Ok(!rows.is_empty())
    }

    async fn insert_client_statistic(&self, delivery: &StatisticDelivery) -> RemoteResult<()> {
        let url = self.rest_url(&self.statistics_table);

        debug!(
            professional_id = %delivery.professional_id,
            client_mode = delivery.is_client_mode_session,
            "Inserting client statistic"
        );

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&delivery.row())
            .send()
            .await?;

        self.check_response(response).await?;

        debug!(professional_id = %delivery.professional_id, "Client statistic inserted");
        Ok(())
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("api_url", &self.api_url)
            .field("professionals_table", &self.professionals_table)
            .field("statistics_table", &self.statistics_table)
            .finish_non_exhaustive()
    }
}
