//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,

    // Date / Time format (Moment.js style tokens)
    pub datetime_format: String,

    // Static generation
    /// Seconds before a generated page may be regenerated in the background
    pub revalidate: u64,

    // Content store
    #[serde(default)]
    pub sanity: SanityConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Medium Blog".to_string(),
            description: String::new(),
            language: "en".to_string(),
            timezone: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),

            datetime_format: "M/D/YYYY, h:mm:ss A".to_string(),

            revalidate: 60,

            sanity: SanityConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `SANITY_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides using the given variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(project_id) = non_empty("SANITY_PROJECT_ID") {
            tracing::debug!("Using project id from SANITY_PROJECT_ID");
            self.sanity.project_id = project_id;
        }
        if let Some(dataset) = non_empty("SANITY_DATASET") {
            tracing::debug!("Using dataset from SANITY_DATASET");
            self.sanity.dataset = dataset;
        }
        if let Some(token) = non_empty("SANITY_API_TOKEN") {
            self.sanity.token = Some(token);
        }
    }

    /// Revalidation interval as a duration
    pub fn revalidate_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.revalidate)
    }

    /// Timezone used for displayed timestamps (UTC when unset or unknown)
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, falling back to UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// Sanity project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    /// Read token for private datasets
    pub token: Option<String>,
    /// Dataset export (JSON array or NDJSON) to build from instead of the API
    pub fixture: Option<String>,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2021-10-21".to_string(),
            use_cdn: true,
            token: None,
            fixture: None,
        }
    }
}
