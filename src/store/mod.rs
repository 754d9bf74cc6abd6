//! Content store access
//!
//! The blog reads posts through [`ContentStore`]. [`SanityClient`] executes
//! the typed queries in [`queries`] against the Sanity HTTP API;
//! [`MemoryStore`] answers the same questions from a dataset export.

mod client;
mod memory;
pub mod queries;
pub mod query;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::{Post, PostSlug, PostSummary};

pub use client::SanityClient;
pub use memory::MemoryStore;

/// Errors raised while talking to the content store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing content store configuration: {0}")]
    MissingConfig(&'static str),

    #[error("request to content store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode content store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read dataset export {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only access to posts
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Id and slug of every post, in the store's natural order
    async fn post_slugs(&self) -> Result<Vec<PostSlug>, StoreError>;

    /// One post with author and approved comments, or `None` if no post has this slug
    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError>;

    /// Posts for the index page
    async fn post_summaries(&self) -> Result<Vec<PostSummary>, StoreError>;
}

/// Open the store described by the site configuration
pub fn open(config: &SiteConfig, base_dir: &std::path::Path) -> Result<Arc<dyn ContentStore>, StoreError> {
    match &config.sanity.fixture {
        Some(fixture) => {
            let path = base_dir.join(fixture);
            tracing::info!("Reading content from dataset export {:?}", path);
            Ok(Arc::new(MemoryStore::load(&path)?))
        }
        None => {
            tracing::info!(
                "Reading content from Sanity project {:?} (dataset {:?})",
                config.sanity.project_id,
                config.sanity.dataset
            );
            Ok(Arc::new(SanityClient::new(&config.sanity)?))
        }
    }
}
