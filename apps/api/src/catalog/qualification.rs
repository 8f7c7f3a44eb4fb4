//! Q-Net national qualification API — single-call passthrough.

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::catalog::client::CatalogError;

const LIST_PATH: &str = "InquiryListNationalQualifcationSVC/getList";

#[derive(Clone)]
pub struct QualificationClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl QualificationClient {
    pub fn new(base_url: String, service_key: String) -> Result<Self, CatalogError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }

    /// Lists national qualifications, optionally narrowed to names containing `keyword`.
    /// Q-Net has no server-side name filter, so narrowing happens here.
    pub async fn list(&self, keyword: Option<&str>) -> Result<Value, CatalogError> {
        let url = format!("{}/{}", self.base_url, LIST_PATH);
        debug!("Q-Net GET {url}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("_type", "json"),
            ])
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

        let body: Value = response
            .json()
            .await
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;

        Ok(match keyword.map(str::trim).filter(|k| !k.is_empty()) {
            Some(keyword) => filter_items(body, keyword),
            None => body,
        })
    }
}

/// Keeps only items whose `jmfldnm` (qualification name) contains `keyword`.
/// Bodies that do not have the expected `response.body.items.item` shape pass through.
fn filter_items(mut body: Value, keyword: &str) -> Value {
    let items = body
        .pointer_mut("/response/body/items/item")
        .and_then(Value::as_array_mut);

    if let Some(items) = items {
        items.retain(|item| {
            item.get("jmfldnm")
                .and_then(Value::as_str)
                .is_some_and(|name| name.contains(keyword))
        });
    }
    body
}
