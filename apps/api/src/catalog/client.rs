//! CareerNet job-information API client.
//!
//! The aggregated search goes through the `CatalogSource` trait so the fetcher
//! can be exercised against an in-memory catalog. The single-call proxies
//! (detail, themes, aptitudes, job codes) pass upstream JSON through untouched.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::catalog::models::{CatalogPage, CatalogQuery};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed upstream response: {0}")]
    Malformed(String),

    #[error("Page task failed: {0}")]
    Task(String),
}

/// A paginated remote job catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches one page (1-based) of jobs matching `query`.
    async fn fetch_page(
        &self,
        query: &CatalogQuery,
        page_index: u32,
    ) -> Result<CatalogPage, CatalogError>;
}

#[derive(Clone)]
pub struct CareerNetClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CareerNetClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, CatalogError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("CareerNet GET {url} {params:?}");

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CatalogError::Malformed(e.to_string()))
    }

    /// Full detail record for one job.
    pub async fn job_detail(&self, code: &str) -> Result<Value, CatalogError> {
        self.get("job.json", &[("seq", code)]).await
    }

    pub async fn themes(&self) -> Result<Value, CatalogError> {
        self.get("jobs.json", &[("searchThemeCode", "all"), ("pageIndex", "1")])
            .await
    }

    pub async fn aptitudes(&self) -> Result<Value, CatalogError> {
        self.get("jobs.json", &[("searchAptdCodes", "all"), ("pageIndex", "1")])
            .await
    }

    pub async fn job_codes(&self) -> Result<Value, CatalogError> {
        self.get("jobs.json", &[("searchJobCd", "all"), ("pageIndex", "1")])
            .await
    }
}

#[async_trait]
impl CatalogSource for CareerNetClient {
    async fn fetch_page(
        &self,
        query: &CatalogQuery,
        page_index: u32,
    ) -> Result<CatalogPage, CatalogError> {
        let page = page_index.to_string();
        let mut params = query.filters();
        params.push(("pageIndex", page.as_str()));
        self.get("jobs.json", &params).await
    }
}
