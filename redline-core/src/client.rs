//! HTTP client for the review backend.

use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;
use crate::review_sync::ReviewSource;
use crate::types::ReviewRecord;

/// Reads review records from `GET {base}/api/ai-review/comparisons/{id}/review`.
#[derive(Debug, Clone)]
pub struct ReviewClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReviewClient {
    /// Create a client for the given backend base URL, e.g.
    /// `http://localhost:8000`. A trailing slash is dropped.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_owned() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn review_url(&self, comparison_id: &str) -> String {
        format!("{}/api/ai-review/comparisons/{}/review", self.base_url, comparison_id)
    }
}

#[async_trait]
impl ReviewSource for ReviewClient {
    async fn fetch_reviews(&self, comparison_id: &str) -> Result<Vec<ReviewRecord>, FetchError> {
        let url = self.review_url(comparison_id);
        debug!(url = %url, "fetching reviews");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server { status: status.as_u16(), body });
        }
        // Read the body first so malformed JSON surfaces as `Json`, not `Http`.
        let bytes = resp.bytes().await?;
        let reviews: Vec<ReviewRecord> = serde_json::from_slice(&bytes)?;
        debug!(count = reviews.len(), "fetched reviews");
        Ok(reviews)
    }
}
