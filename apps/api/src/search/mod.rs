//! External job-search gateway: the single point of entry for all calls to
//! the third-party search API. No other module may call the provider
//! directly.
//!
//! Fails closed: any transport error or non-2xx response becomes
//! `SearchUnavailable`. No retry, no caching.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use crate::errors::AppError;

const APIJOBS_URL: &str = "https://api.apijobs.dev/v1/job/search";

/// The search backend trait. Carried in `AppState` as
/// `Arc<dyn JobSearchProvider>` so tests can swap in a stub without touching
/// the handler or router.
#[async_trait]
pub trait JobSearchProvider: Send + Sync {
    /// Runs a free-text query and returns the provider's JSON body verbatim.
    async fn search(&self, query: &str) -> Result<Value, AppError>;
}

/// Production client for the apijobs.dev search API.
#[derive(Clone)]
pub struct ApiJobsClient {
    client: Client,
    api_key: String,
}

impl ApiJobsClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl JobSearchProvider for ApiJobsClient {
    async fn search(&self, query: &str) -> Result<Value, AppError> {
        let response = self
            .client
            .post(APIJOBS_URL)
            .header("apikey", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| {
                warn!("Job search request failed: {e}");
                AppError::SearchUnavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Job search API returned {status}: {body}");
            return Err(AppError::SearchUnavailable);
        }

        response.json().await.map_err(|e| {
            warn!("Job search API returned unparseable body: {e}");
            AppError::SearchUnavailable
        })
    }
}
