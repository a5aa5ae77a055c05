//! Content loader - discovers and loads documents from the source directory

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::document::{output_path_for, url_for_output, ContentDocument, SourceKind};
use super::{MarkdownRenderer, Metadata};
use crate::error::BuildError;
use crate::helpers::{date_from_file_stem, parse_date};
use crate::Site;

/// Files found under the source directory
#[derive(Debug, Default)]
pub struct Discovered {
    /// Markdown and HTML content, in lexical path order
    pub content: Vec<PathBuf>,
    /// Everything else, copied verbatim
    pub assets: Vec<PathBuf>,
}

/// Documents that loaded, and the ones that did not
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<ContentDocument>,
    pub failures: Vec<BuildError>,
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        let renderer = MarkdownRenderer::with_options(&site.config.highlight);
        Self { site, renderer }
    }

    /// Walk the source directory
    ///
    /// Entries whose first path component starts with `_` or `.` are
    /// skipped, except `_posts` and (with `render_drafts`) `_drafts`.
    pub fn discover(&self) -> Result<Discovered, BuildError> {
        let source_dir = &self.site.source_dir;
        if !source_dir.is_dir() {
            return Err(BuildError::MissingInput {
                what: "source directory",
                path: source_dir.clone(),
            });
        }

        let mut discovered = Discovered::default();

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e.path()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if SourceKind::from_path(path).is_some() {
                discovered.content.push(path.to_path_buf());
            } else {
                discovered.assets.push(path.to_path_buf());
            }
        }

        Ok(discovered)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.site.source_dir).unwrap_or(path);
        let Some(first) = relative
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str())
        else {
            return false;
        };

        match first {
            "_posts" => false,
            "_drafts" => !self.site.config.render_drafts,
            _ => first.starts_with('_') || first.starts_with('.'),
        }
    }

    /// Load every content file; failures are isolated per document
    pub fn load_all(&self, paths: &[PathBuf]) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();

        for path in paths {
            match self.load_document(path) {
                Ok(doc) => outcome.documents.push(doc),
                Err(e) => {
                    let source = self.relative_source(path);
                    tracing::warn!("Failed to load {}: {:#}", source, e);
                    outcome
                        .failures
                        .push(BuildError::render_failure(source, format!("{:#}", e)));
                }
            }
        }

        outcome
    }

    /// Load a single document from a file
    pub fn load_document(&self, path: &Path) -> Result<ContentDocument> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let kind = SourceKind::from_path(path)
            .with_context(|| format!("{:?} is not a content file", path))?;

        let source = self.relative_source(path);
        let (metadata, body) = Metadata::parse(&raw);
        let body = body.to_string();

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        let file_date = date_from_file_stem(stem);

        let date = match metadata.get_str("date") {
            Some(value) => match parse_date(value) {
                Some(date) => Some(date),
                None => {
                    tracing::warn!("{}: unrecognised date {:?}, ignoring", source, value);
                    file_date.map(|(date, _)| date)
                }
            },
            None => file_date.map(|(date, _)| date),
        };

        let title = match metadata.title() {
            Some(title) => title.to_string(),
            None => file_date.map(|(_, slug)| slug).unwrap_or(stem).to_string(),
        };

        let (content, excerpt) = match kind {
            SourceKind::Markdown => {
                let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(&body);
                let content = self.renderer.render(&full_md);
                let excerpt = excerpt_md.map(|md| self.renderer.render(&md));
                (content, excerpt)
            }
            SourceKind::Html => (String::new(), None),
        };

        let relative = path.strip_prefix(&self.site.source_dir).unwrap_or(path);
        let output_path = output_path_for(relative, metadata.get_str("permalink"));
        let url = url_for_output(&self.site.config, &output_path);

        Ok(ContentDocument {
            source,
            full_source: path.to_path_buf(),
            kind,
            raw,
            metadata,
            body,
            content,
            excerpt,
            title,
            date,
            output_path,
            url,
        })
    }

    fn relative_source(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.site.source_dir).unwrap_or(path);
        crate::helpers::path_to_url(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn site_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join("source").join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    #[test]
    fn test_discover_skips_underscore_dirs() {
        let (_dir, site) = site_with(&[
            ("index.html", "list"),
            ("about.md", "# About"),
            ("_posts/2025-01-01-a.md", "a"),
            ("_drafts/wip.md", "wip"),
            ("_private/notes.md", "notes"),
            (".hidden/x.md", "x"),
            ("img/logo.png", "png"),
        ]);
        let loader = ContentLoader::new(&site);
        let discovered = loader.discover().unwrap();

        let content: Vec<String> = discovered
            .content
            .iter()
            .map(|p| loader.relative_source(p))
            .collect();
        assert_eq!(content, vec!["_posts/2025-01-01-a.md", "about.md", "index.html"]);
        assert_eq!(discovered.assets.len(), 1);
    }

    #[test]
    fn test_discover_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let err = ContentLoader::new(&site).discover().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_document_with_front_matter() {
        let (_dir, site) = site_with(&[(
            "_posts/handshake.md",
            "---\ntitle: Handshake\ndate: 2025-06-01\ntags: [tcp]\n---\nIntro\n\n<!-- more -->\n\nRest",
        )]);
        let loader = ContentLoader::new(&site);
        let doc = loader
            .load_document(&site.source_dir.join("_posts/handshake.md"))
            .unwrap();

        assert_eq!(doc.title, "Handshake");
        assert_eq!(doc.source, "_posts/handshake.md");
        assert_eq!(
            doc.date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(doc.output_path, PathBuf::from("_posts/handshake.html"));
        assert_eq!(doc.url, "/_posts/handshake.html");
        assert!(doc.content.contains("<p>Rest</p>"));
        assert_eq!(doc.excerpt.as_deref(), Some("<p>Intro</p>\n"));
        assert!(doc.is_indexed());
    }

    #[test]
    fn test_load_document_defaults() {
        let (_dir, site) = site_with(&[("2025-01-01-udp-basics.md", "Just text, no metadata.")]);
        let loader = ContentLoader::new(&site);
        let doc = loader
            .load_document(&site.source_dir.join("2025-01-01-udp-basics.md"))
            .unwrap();

        assert!(doc.metadata.is_empty());
        assert_eq!(doc.title, "udp-basics");
        assert_eq!(
            doc.date,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(doc.content, "<p>Just text, no metadata.</p>\n");
    }

    #[test]
    fn test_load_all_isolates_failures() {
        let (_dir, site) = site_with(&[("good.md", "ok")]);
        let loader = ContentLoader::new(&site);
        let paths = vec![
            site.source_dir.join("good.md"),
            site.source_dir.join("vanished.md"),
        ];
        let outcome = loader.load_all(&paths);
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].to_string().contains("vanished.md"));
    }
}
