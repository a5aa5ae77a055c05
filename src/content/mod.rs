//! Content module - front-matter, Markdown rendering and document loading

mod document;
mod frontmatter;
pub mod loader;
mod markdown;

pub use document::{output_path_for, ContentDocument, SourceKind};
pub use frontmatter::{MetaValue, Metadata};
pub use markdown::MarkdownRenderer;
