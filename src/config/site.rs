//! Site configuration (_config.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::helpers::is_valid_date_format;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub layout_dir: String,
    pub public_dir: String,

    // Writing
    pub new_post_name: String,
    pub default_layout: String,
    pub render_drafts: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Date format (Moment.js style)
    pub date_format: String,

    // Length of the generated plain-text summary
    pub summary_length: usize,

    /// Additional fields, exposed to templates as `site.<key>`
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            layout_dir: "layouts".to_string(),
            public_dir: "public".to_string(),

            new_post_name: ":year-:month-:day-:title.md".to_string(),
            default_layout: "default".to_string(),
            render_drafts: false,
            highlight: HighlightConfig::default(),

            date_format: "YYYY-MM-DD".to_string(),
            summary_length: 160,

            extra: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        // An empty file deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        if !is_valid_date_format(&config.date_format) {
            tracing::warn!(
                "Invalid date_format {:?} in {:?}, using YYYY-MM-DD",
                config.date_format,
                path.as_ref()
            );
            config.date_format = Self::default().date_format;
        }
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.source_dir, "source");
        assert_eq!(config.default_layout, "default");
        assert!(!config.highlight.enable);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Packets & Prose
author: Test User
public_dir: _site
highlight:
  enable: true
github_username: someone
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Packets & Prose");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.public_dir, "_site");
        assert_eq!(config.layout_dir, "layouts");
        assert!(config.highlight.enable);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(
            config.extra.get("github_username").and_then(|v| v.as_str()),
            Some("someone")
        );
    }

    #[test]
    fn test_load_replaces_invalid_date_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "date_format: \"100%\"\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.date_format, "YYYY-MM-DD");
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "My Blog");
    }
}
