use anyhow::Result;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Connection settings for the link-reader service.
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Why a single URL could not be turned into content.
///
/// None of these abort a request; they end up as inline text in the prompt.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Unfortunately, I could not extract any data from that URL: {url}")]
    Forbidden { url: String },

    #[error("Metadata service returned {status} for url: {url}")]
    Status { status: u16, url: String },

    #[error("Metadata request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid metadata response: {0}")]
    Decode(String),
}

/// What the service told us about one URL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataResult {
    pub url: String,
    pub content: String,
    pub summary: Option<String>,
    pub error: Option<String>,
}

impl MetadataResult {
    pub fn failed(url: &str, error: &MetadataError) -> Self {
        Self {
            url: url.to_string(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    url: Option<String>,
    content: Option<String>,
    summary: Option<String>,
}

pub struct MetadataFetcher {
    client: Client,
    config: MetadataConfig,
}

impl MetadataFetcher {
    pub fn new(config: MetadataConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    /// Fetch one URL. Failures come back as an error-carrying result.
    pub async fn fetch(&self, url: &str) -> MetadataResult {
        debug!("Fetching content from: {}", url);
        match self.request(url).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Metadata fetch for {} failed: {}", url, e);
                MetadataResult::failed(url, &e)
            }
        }
    }

    /// Fetch all URLs concurrently. Results line up with `urls`.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<MetadataResult> {
        join_all(urls.iter().map(|url| self.fetch(url))).await
    }

    async fn request(&self, url: &str) -> Result<MetadataResult, MetadataError> {
        let mut request = self.client.post(&self.config.url).json(&json!({ "url": url }));
        if let Some(api_key) = &self.config.api_key {
            request = request.header("API-Key", api_key);
        }

        let response = request.send().await?;

        match response.status() {
            StatusCode::FORBIDDEN => Err(MetadataError::Forbidden {
                url: url.to_string(),
            }),
            status if !status.is_success() => Err(MetadataError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
            _ => {
                let body: MetadataResponse = response
                    .json()
                    .await
                    .map_err(|e| MetadataError::Decode(e.to_string()))?;

                Ok(MetadataResult {
                    url: body.url.unwrap_or_else(|| url.to_string()),
                    content: body.content.unwrap_or_default(),
                    summary: body.summary,
                    error: None,
                })
            }
        }
    }
}
