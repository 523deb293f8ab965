use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("denylist request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("denylist service rate limit reached")]
    RateLimited,
    #[error("unexpected denylist response: {0}")]
    Malformed(String),
}

/// Anything that can produce the full current set of flagged identifiers.
#[async_trait]
pub trait DenylistSource: Send + Sync {
    async fn fetch_flagged(&self) -> Result<HashSet<String>, ApiError>;
}

pub struct DenylistApi {
    client: Client,
    base_url: String,
}

impl DenylistApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DenylistSource for DenylistApi {
    async fn fetch_flagged(&self) -> Result<HashSet<String>, ApiError> {
        let url = format!("{}/flagged", self.base_url);

        debug!("Sending request to {}", url);
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if response.status() == 429 {
            debug!("Rate limit hit for {}", url);
            return Err(ApiError::RateLimited);
        }

        let json: Value = response.error_for_status()?.json().await?;
        parse_flagged(&json)
    }
}

// The /flagged payload is an array of objects, each carrying at least an
// "id" field. Entries without one are skipped.
fn parse_flagged(json: &Value) -> Result<HashSet<String>, ApiError> {
    let entries = json
        .as_array()
        .ok_or_else(|| ApiError::Malformed("expected array of flagged entries".to_string()))?;

    let mut ids = HashSet::new();
    for entry in entries {
        if let Some(id) = entry.get("id").and_then(|i| i.as_str()) {
            ids.insert(id.to_string());
        }
    }
    debug!("Parsed {} flagged identifiers from response", ids.len());

    Ok(ids)
}
