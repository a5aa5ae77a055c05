//! Content document model

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use super::{MetaValue, Metadata};
use crate::config::SiteConfig;
use crate::helpers::{date_xml, format_date, full_url_for, path_to_url, summarize, url_for};
use crate::templates::Value;

/// How a document's body is turned into HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Markdown, rendered once at load time
    Markdown,
    /// An HTML template evaluated by the composer (listing pages)
    Html,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => Some(SourceKind::Markdown),
            Some("html") | Some("htm") => Some(SourceKind::Html),
            _ => None,
        }
    }
}

/// A content file with its metadata and rendered body
#[derive(Debug, Clone)]
pub struct ContentDocument {
    /// Source file path relative to the source directory
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    pub kind: SourceKind,

    /// Raw file text, front-matter included
    pub raw: String,

    pub metadata: Metadata,

    /// Body text after the front-matter
    pub body: String,

    /// Rendered HTML; empty for HTML sources until composed
    pub content: String,

    /// Rendered excerpt (before `<!-- more -->`)
    pub excerpt: Option<String>,

    /// Title from metadata, or derived from the file name
    pub title: String,

    /// Publication date from metadata or a `YYYY-MM-DD-` file name prefix
    pub date: Option<NaiveDateTime>,

    /// Output path relative to the public directory
    pub output_path: PathBuf,

    /// URL path (with root)
    pub url: String,
}

impl ContentDocument {
    /// Whether this document belongs in the site index
    pub fn is_indexed(&self) -> bool {
        self.kind == SourceKind::Markdown && self.metadata.is_published()
    }

    /// Template view of this document
    ///
    /// Every metadata key is exposed; computed fields take precedence.
    pub fn to_value(&self, config: &SiteConfig) -> Value {
        let mut map: IndexMap<String, Value> = self
            .metadata
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    MetaValue::Scalar(s) => Value::from(s.as_str()),
                    MetaValue::List(items) => Value::from(items.clone()),
                };
                (key.clone(), value)
            })
            .collect();

        map.insert("title".to_string(), Value::from(self.title.as_str()));
        map.insert("url".to_string(), Value::from(self.url.as_str()));
        map.insert(
            "permalink".to_string(),
            Value::from(full_url_for(config, &self.url_path())),
        );
        map.insert("path".to_string(), Value::from(self.source.as_str()));
        map.insert(
            "date".to_string(),
            Value::from(self.date.map(|d| format_date(&d, &config.date_format))),
        );
        map.insert(
            "date_xml".to_string(),
            Value::from(self.date.as_ref().map(date_xml)),
        );
        map.insert("tags".to_string(), Value::from(self.metadata.get_list("tags")));
        map.insert(
            "categories".to_string(),
            Value::from(self.categories()),
        );
        map.insert(
            "summary".to_string(),
            Value::from(self.summary(config.summary_length)),
        );
        map.insert("content".to_string(), Value::from(self.content.as_str()));
        map.insert("excerpt".to_string(), Value::from(self.excerpt.clone()));

        Value::Map(map)
    }

    /// `categories`, falling back to the singular `category` key
    pub fn categories(&self) -> Vec<String> {
        match self.metadata.get_list("categories") {
            list if list.is_empty() => self.metadata.get_list("category"),
            list => list,
        }
    }

    /// The `summary` metadata, or a plain-text digest of the content
    pub fn summary(&self, length: usize) -> String {
        match self.metadata.get_str("summary") {
            Some(summary) => summary.to_string(),
            None => summarize(self.excerpt.as_deref().unwrap_or(&self.content), length),
        }
    }

    fn url_path(&self) -> String {
        path_to_url(&self.output_path)
    }
}

/// Output path for a source file
///
/// The source's relative path with its extension changed to `.html`, unless
/// a `permalink` overrides it. Permalinks ending in `/` get `index.html`.
pub fn output_path_for(relative_source: &Path, permalink: Option<&str>) -> PathBuf {
    if let Some(permalink) = permalink {
        let trimmed = permalink.trim_start_matches('/');
        let mut path: PathBuf = trimmed
            .split('/')
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .collect();
        if trimmed.is_empty() || trimmed.ends_with('/') {
            path.push("index.html");
        } else if path.extension().is_none() {
            path.set_extension("html");
        }
        return path;
    }

    relative_source.with_extension("html")
}

/// Public URL for an output path
pub fn url_for_output(config: &SiteConfig, output_path: &Path) -> String {
    url_for(config, &path_to_url(output_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind() {
        assert_eq!(
            SourceKind::from_path(Path::new("a/b.md")),
            Some(SourceKind::Markdown)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("index.html")),
            Some(SourceKind::Html)
        );
        assert_eq!(SourceKind::from_path(Path::new("logo.png")), None);
    }

    #[test]
    fn test_output_path_from_source() {
        let path = output_path_for(Path::new("_posts/2025-01-01-tcp.md"), None);
        assert_eq!(path, PathBuf::from("_posts/2025-01-01-tcp.html"));
        assert_eq!(
            output_path_for(Path::new("about.markdown"), None),
            PathBuf::from("about.html")
        );
    }

    #[test]
    fn test_output_path_from_permalink() {
        assert_eq!(
            output_path_for(Path::new("x.md"), Some("/tcp/handshake/")),
            PathBuf::from("tcp/handshake/index.html")
        );
        assert_eq!(
            output_path_for(Path::new("x.md"), Some("udp")),
            PathBuf::from("udp.html")
        );
        assert_eq!(
            output_path_for(Path::new("x.md"), Some("/../feed.xml")),
            PathBuf::from("feed.xml")
        );
        assert_eq!(
            output_path_for(Path::new("x.md"), Some("/")),
            PathBuf::from("index.html")
        );
    }

    #[test]
    fn test_url_for_output() {
        let config = SiteConfig {
            root: "/blog/".to_string(),
            ..SiteConfig::default()
        };
        let path: PathBuf = ["posts", "a.html"].iter().collect();
        assert_eq!(url_for_output(&config, &path), "/blog/posts/a.html");
    }
}
