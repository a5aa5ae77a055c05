//! Build error taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a site
///
/// Only `MissingInput` aborts a build. The other variants are recovered
/// where they occur and surface as warnings or as entries in the build
/// report.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Missing input: {what} not found at {path:?}")]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("Malformed front-matter line {line} ({reason}): {text:?}")]
    MalformedMetadata {
        line: usize,
        text: String,
        reason: &'static str,
    },

    #[error("Unresolved {kind} `{name}` in {location}")]
    UnresolvedTemplateReference {
        kind: &'static str,
        name: String,
        location: String,
    },

    #[error("Failed to render {path}: {reason}")]
    RenderFailure { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Whether this error aborts the whole build
    pub fn is_fatal(&self) -> bool {
        matches!(self, BuildError::MissingInput { .. })
    }

    pub(crate) fn render_failure(path: impl Into<String>, reason: impl ToString) -> Self {
        BuildError::RenderFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
