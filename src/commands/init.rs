//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Default `_config.yml`
const DEFAULT_CONFIG: &str = r#"# sanity-blog configuration

# Site
title: Medium Blog
description: ''
language: en
# IANA timezone for displayed timestamps (UTC when empty)
timezone: ''

# URL
url: http://example.com
root: /

# Directory
source_dir: source
public_dir: public

# Timestamp format (Moment.js tokens)
datetime_format: 'M/D/YYYY, h:mm:ss A'

# Seconds before a served page is regenerated in the background
revalidate: 60

# Content store. SANITY_PROJECT_ID, SANITY_DATASET and SANITY_API_TOKEN
# override these values.
sanity:
  project_id: ''
  dataset: production
  api_version: '2021-10-21'
  use_cdn: true
  # Build from a dataset export instead of the API
  # fixture: data.ndjson
"#;

const DEFAULT_STYLE: &str = "body {\n  font-family: ui-sans-serif, system-ui, sans-serif;\n}\n";

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("source/css"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }
    fs::write(&config_path, DEFAULT_CONFIG)?;

    let style_path = target_dir.join("source/css/style.css");
    if !style_path.exists() {
        fs::write(&style_path, DEFAULT_STYLE)?;
    }

    tracing::debug!("Wrote {:?}", config_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        let config = SiteConfig::load(tmp.path().join("_config.yml")).unwrap();
        assert_eq!(config.revalidate, 60);
        assert_eq!(config.sanity.dataset, "production");
        assert!(config.sanity.fixture.is_none());
        assert!(tmp.path().join("source/css/style.css").exists());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();
        assert!(init_site(tmp.path()).is_err());
    }
}
