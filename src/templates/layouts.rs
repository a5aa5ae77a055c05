//! Layout loading and resolution

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::Template;
use crate::content::Metadata;
use crate::error::BuildError;

/// Longest layout chain followed before giving up
const MAX_LAYOUT_DEPTH: usize = 8;

/// A named layout template
///
/// Layouts may name a parent layout in their own front-matter, which wraps
/// their output in turn.
#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    pub parent: Option<String>,
    pub template: Template,
}

/// All layouts of a site, keyed by name (file stem)
#[derive(Debug, Clone, Default)]
pub struct LayoutSet {
    layouts: HashMap<String, Layout>,
}

impl LayoutSet {
    /// Load every `*.html` file in the layout directory
    ///
    /// A missing directory is fatal. A layout that fails to parse is
    /// skipped with a warning; pages that use it render without it.
    pub fn load(dir: &Path) -> Result<Self, BuildError> {
        if !dir.is_dir() {
            return Err(BuildError::MissingInput {
                what: "layout directory",
                path: dir.to_path_buf(),
            });
        }

        let mut set = Self::default();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Skipping layout {:?}: {}", path, e);
                    continue;
                }
            };
            match Layout::parse(name, &source) {
                Ok(layout) => {
                    tracing::debug!("Loaded layout {}", name);
                    set.insert(layout);
                }
                Err(e) => tracing::warn!("Skipping layout {:?}: {}", path, e),
            }
        }

        tracing::debug!("Loaded {} layouts from {:?}", set.len(), dir);
        Ok(set)
    }

    pub fn insert(&mut self, layout: Layout) {
        self.layouts.insert(layout.name.clone(), layout);
    }

    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.layouts.get(name)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// The layouts to apply for `name`, innermost first
    ///
    /// Unknown names end the chain with a warning. Cycles and overly deep
    /// chains are cut.
    pub fn chain(&self, name: &str, location: &str) -> Vec<&Layout> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(name);

        while let Some(name) = next {
            if !seen.insert(name) || chain.len() >= MAX_LAYOUT_DEPTH {
                tracing::warn!(
                    "Layout chain for {} stops at {:?} (cycle or too deep)",
                    location,
                    name
                );
                break;
            }
            let Some(layout) = self.get(name) else {
                let err = BuildError::UnresolvedTemplateReference {
                    kind: "layout",
                    name: name.to_string(),
                    location: location.to_string(),
                };
                tracing::warn!("{}", err);
                break;
            };
            chain.push(layout);
            next = layout.parent.as_deref();
        }

        chain
    }
}

impl Layout {
    /// Parse a layout file: optional front-matter, then the template
    pub fn parse(name: &str, source: &str) -> Result<Self, super::TemplateError> {
        let (metadata, body) = Metadata::parse(source);
        let template = Template::parse(&format!("{}.html", name), body)?;
        Ok(Self {
            name: name.to_string(),
            parent: metadata.layout().map(str::to_string),
            template,
        })
    }
}
