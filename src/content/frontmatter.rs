//! Front-matter parsing
//!
//! A front-matter block is delimited by `---` lines at the very top of a
//! file. Each line inside is a `key: value` pair. Values are plain strings,
//! or lists when written as `[a, b]` or as `- item` lines under an empty key.

use indexmap::IndexMap;

use crate::error::BuildError;

const DELIMITER: &str = "---";

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Scalar(String),
    List(Vec<String>),
}

impl MetaValue {
    /// The scalar string, if this is a scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Scalar(s) => Some(s),
            MetaValue::List(_) => None,
        }
    }

    /// The value as a list; a non-empty scalar becomes a one-item list
    pub fn to_list(&self) -> Vec<String> {
        match self {
            MetaValue::Scalar(s) if s.is_empty() => Vec::new(),
            MetaValue::Scalar(s) => vec![s.clone()],
            MetaValue::List(items) => items.clone(),
        }
    }
}

/// Ordered metadata mapping parsed from a front-matter block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: IndexMap<String, MetaValue>,
}

impl Metadata {
    /// Parse front-matter from content string
    /// Returns (metadata, remaining_content)
    ///
    /// Content without a complete block is returned untouched with empty
    /// metadata.
    pub fn parse(content: &str) -> (Self, &str) {
        let text = content.trim_start_matches('\u{feff}');
        let mut lines = text.split_inclusive('\n');

        let Some(first) = lines.next() else {
            return (Self::default(), content);
        };
        if !is_delimiter(first) {
            return (Self::default(), content);
        }

        let mut offset = first.len();
        let mut block = Vec::new();
        for line in lines {
            offset += line.len();
            if is_delimiter(line) {
                let body = &text[offset..];
                return match Self::parse_block(&block) {
                    Some(metadata) => (metadata, body),
                    None => (Self::default(), content),
                };
            }
            block.push(line);
        }

        // No closing delimiter
        (Self::default(), content)
    }

    /// Parse the lines between the delimiters
    ///
    /// Returns `None` when the block has content but not a single `key:`
    /// line, which means the `---` was a Markdown rule, not front-matter.
    fn parse_block(lines: &[&str]) -> Option<Self> {
        let mut metadata = Metadata::default();
        let mut list_key: Option<String> = None;
        let mut saw_content = false;

        for (i, raw) in lines.iter().enumerate() {
            let line_no = i + 2;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            saw_content = true;

            if let Some(item) = list_item(trimmed) {
                match list_key.as_ref().and_then(|k| metadata.entries.get_mut(k)) {
                    Some(value) => {
                        let item = unquote(item).to_string();
                        match value {
                            MetaValue::List(items) => items.push(item),
                            MetaValue::Scalar(_) => *value = MetaValue::List(vec![item]),
                        }
                    }
                    None => warn_malformed(line_no, trimmed, "list item without a key"),
                }
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                warn_malformed(line_no, trimmed, "missing colon");
                list_key = None;
                continue;
            };

            let key = key.trim();
            if !is_valid_key(key) {
                warn_malformed(line_no, trimmed, "invalid key");
                list_key = None;
                continue;
            }

            let value = value.trim();
            list_key = value.is_empty().then(|| key.to_string());
            metadata.insert(key, parse_value(value));
        }

        if saw_content && metadata.is_empty() {
            None
        } else {
            Some(metadata)
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// A non-empty scalar value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(MetaValue::as_str)
            .filter(|s| !s.is_empty())
    }

    /// A list value; missing keys yield an empty list
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key).map(MetaValue::to_list).unwrap_or_default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn layout(&self) -> Option<&str> {
        self.get_str("layout")
    }

    /// Documents are published unless `published: false`
    pub fn is_published(&self) -> bool {
        self.get_str("published") != Some("false")
    }

    /// Serialize back into a delimited front-matter block
    pub fn to_front_matter(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push(':');
            match value {
                MetaValue::Scalar(s) if s.is_empty() => {}
                MetaValue::Scalar(s) => {
                    out.push(' ');
                    out.push_str(&quote_scalar(s));
                }
                MetaValue::List(items) => {
                    let items: Vec<String> = items.iter().map(|i| quote_item(i)).collect();
                    out.push_str(" [");
                    out.push_str(&items.join(", "));
                    out.push(']');
                }
            }
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn list_item(line: &str) -> Option<&str> {
    if line == "-" {
        Some("")
    } else {
        line.strip_prefix("- ").map(str::trim)
    }
}

fn warn_malformed(line: usize, text: &str, reason: &'static str) {
    let err = BuildError::MalformedMetadata {
        line,
        text: text.to_string(),
        reason,
    };
    tracing::warn!("Skipping {}", err);
}

fn parse_value(value: &str) -> MetaValue {
    match value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => MetaValue::List(
            split_list(inner)
                .into_iter()
                .map(|item| unquote(item).to_string())
                .collect(),
        ),
        None => MetaValue::Scalar(unquote(value).to_string()),
    }
}

/// Split a bracketed list on commas that are not inside quotes
fn split_list(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (None, '"') | (None, '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ',') => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(inner[start..].trim());
    items.retain(|item| !item.is_empty());
    items
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn quote_with(s: &str) -> String {
    if s.contains('"') {
        format!("'{}'", s)
    } else {
        format!("\"{}\"", s)
    }
}

fn quote_scalar(s: &str) -> String {
    let needs_quotes = s.trim() != s || s.starts_with(['[', '"', '\'']);
    if needs_quotes {
        quote_with(s)
    } else {
        s.to_string()
    }
}

fn quote_item(s: &str) -> String {
    let needs_quotes =
        s.is_empty() || s.trim() != s || s.contains([',', '[', ']']) || s.starts_with(['"', '\'']);
    if needs_quotes {
        quote_with(s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter() {
        let content = r#"---
title: TCP Three-Way Handshake
layout: post
date: 2025-01-01
tags: [tcp, networking]
category: protocols
---

This is the content.
"#;

        let (meta, body) = Metadata::parse(content);
        assert_eq!(meta.title(), Some("TCP Three-Way Handshake"));
        assert_eq!(meta.layout(), Some("post"));
        assert_eq!(meta.get_str("date"), Some("2025-01-01"));
        assert_eq!(meta.get_list("tags"), vec!["tcp", "networking"]);
        assert_eq!(meta.get_list("category"), vec!["protocols"]);
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_parse_dash_list() {
        let content = "---\ntitle: Hello\ntags:\n  - rust\n  - \"ssg\"\n---\nBody";
        let (meta, body) = Metadata::parse(content);
        assert_eq!(meta.get_list("tags"), vec!["rust", "ssg"]);
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_no_front_matter() {
        let content = "# Just a heading\n\nSome text.";
        let (meta, body) = Metadata::parse(content);
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_block_is_body() {
        let content = "---\ntitle: Never closed\n\nbody";
        let (meta, body) = Metadata::parse(content);
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block() {
        let (meta, body) = Metadata::parse("---\n---\nBody");
        assert!(meta.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let content = "---\ntitle: UDP\nthis line has no colon\n: no key\nlayout: post\n---\nBody";
        let (meta, body) = Metadata::parse(content);
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.title(), Some("UDP"));
        assert_eq!(meta.layout(), Some("post"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_value_containing_colon() {
        let (meta, _) = Metadata::parse("---\ntitle: Re: sockets\ndate: 2025-01-01 10:30:00\n---\n");
        assert_eq!(meta.title(), Some("Re: sockets"));
        assert_eq!(meta.get_str("date"), Some("2025-01-01 10:30:00"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\ntags: [a, b]\r\n---\r\nBody\r\n";
        let (meta, body) = Metadata::parse(content);
        assert_eq!(meta.title(), Some("Windows"));
        assert_eq!(meta.get_list("tags"), vec!["a", "b"]);
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_markdown_separator_not_front_matter() {
        let content = "---\n\nSome random text with a list:\n- Item 1\n\n---\nMore content.\n";
        let (meta, body) = Metadata::parse(content);
        assert!(meta.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_published_flag() {
        let (meta, _) = Metadata::parse("---\npublished: false\n---\n");
        assert!(!meta.is_published());
        assert!(Metadata::default().is_published());
    }

    #[test]
    fn test_round_trip() {
        let mut meta = Metadata::default();
        meta.insert("title", MetaValue::Scalar("Sockets, streams & datagrams".into()));
        meta.insert("layout", MetaValue::Scalar("post".into()));
        meta.insert("summary", MetaValue::Scalar("  padded  ".into()));
        meta.insert("quoted", MetaValue::Scalar("\"already quoted\"".into()));
        meta.insert("empty", MetaValue::Scalar(String::new()));
        meta.insert(
            "tags",
            MetaValue::List(vec!["tcp".into(), "a, b".into(), "[x]".into()]),
        );
        meta.insert("none", MetaValue::List(Vec::new()));

        let serialized = format!("{}body", meta.to_front_matter());
        let (parsed, body) = Metadata::parse(&serialized);
        assert_eq!(parsed, meta);
        assert_eq!(body, "body");
    }
}
