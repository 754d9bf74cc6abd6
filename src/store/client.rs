//! HTTP client for the Sanity query API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::query::Query;
use super::{queries, ContentStore, StoreError};
use crate::config::SanityConfig;
use crate::content::{Post, PostSlug, PostSummary};

/// Sanity query API response wrapper
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Executes queries against `https://<project>.api.sanity.io`
pub struct SanityClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SanityClient {
    /// Create a client for the configured project and dataset
    pub fn new(config: &SanityConfig) -> Result<Self, StoreError> {
        if config.project_id.is_empty() {
            return Err(StoreError::MissingConfig("sanity.project_id"));
        }
        if config.dataset.is_empty() {
            return Err(StoreError::MissingConfig("sanity.dataset"));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| StoreError::MissingConfig("sanity.token (invalid header value)"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: query_endpoint(config),
        })
    }

    /// Execute a query and decode its `result`
    pub async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<T, StoreError> {
        let groq = query.to_groq();
        tracing::debug!(single = query.is_single(), "GROQ: {}", groq);

        let mut pairs = vec![("query".to_string(), groq)];
        for (name, value) in query.params() {
            pairs.push((format!("${}", name), value.to_string()));
        }

        let response = self.client.get(&self.endpoint).query(&pairs).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let decoded: QueryResponse<T> = serde_json::from_slice(&bytes)?;
        Ok(decoded.result)
    }
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn post_slugs(&self) -> Result<Vec<PostSlug>, StoreError> {
        self.fetch(&queries::post_paths()).await
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        self.fetch(&queries::post_by_slug(slug)).await
    }

    async fn post_summaries(&self) -> Result<Vec<PostSummary>, StoreError> {
        self.fetch(&queries::post_index()).await
    }
}

/// `https://<project>.api[cdn].sanity.io/v<version>/data/query/<dataset>`
fn query_endpoint(config: &SanityConfig) -> String {
    let host = if config.use_cdn && config.token.is_none() {
        "apicdn"
    } else {
        "api"
    };
    format!(
        "https://{}.{}.sanity.io/v{}/data/query/{}",
        config.project_id,
        host,
        config.api_version.trim_start_matches('v'),
        config.dataset
    )
}
