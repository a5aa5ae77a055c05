//! Page composer - wraps rendered content in layouts

use indexmap::IndexMap;
use std::path::PathBuf;
use std::rc::Rc;

use super::SiteIndex;
use crate::config::SiteConfig;
use crate::content::{ContentDocument, SourceKind};
use crate::error::BuildError;
use crate::helpers::full_url_for;
use crate::templates::{Context, LayoutSet, Template, Value};

/// Layout names that mean "no layout"
const NO_LAYOUT: [&str; 3] = ["none", "null", "false"];

/// A fully composed output page
#[derive(Debug, Clone)]
pub struct ComposedPage {
    /// Output path relative to the public directory
    pub output_path: PathBuf,
    pub html: String,
}

/// Composes documents into pages
///
/// Site-wide data (config and the full index) is computed once and shared
/// by every page composed with this composer.
pub struct Composer<'a> {
    config: &'a SiteConfig,
    layouts: &'a LayoutSet,
    index: &'a SiteIndex<'a>,
    site: Rc<Value>,
}

impl<'a> Composer<'a> {
    pub fn new(config: &'a SiteConfig, layouts: &'a LayoutSet, index: &'a SiteIndex<'a>) -> Self {
        let site = Rc::new(build_site_value(config, index));
        Self {
            config,
            layouts,
            index,
            site,
        }
    }

    /// Compose a document into its final page
    pub fn compose(&self, doc: &ContentDocument) -> Result<ComposedPage, BuildError> {
        let mut context = Context::new();
        context.insert_shared("site", Rc::clone(&self.site));
        context.insert("page", self.page_value(doc));

        let mut content = match doc.kind {
            SourceKind::Markdown => doc.content.clone(),
            SourceKind::Html => {
                let template = Template::parse(&doc.source, &doc.body)
                    .map_err(|e| BuildError::render_failure(doc.source.as_str(), e))?;
                template.render(&context)
            }
        };

        let layout = doc
            .metadata
            .layout()
            .unwrap_or(self.config.default_layout.as_str());

        if !NO_LAYOUT.contains(&layout) {
            for layout in self.layouts.chain(layout, &doc.source) {
                context.insert("content", content);
                content = layout.template.render(&context);
            }
        }

        Ok(ComposedPage {
            output_path: doc.output_path.clone(),
            html: content,
        })
    }

    /// Document value plus its index neighbours
    fn page_value(&self, doc: &ContentDocument) -> Value {
        let mut value = doc.to_value(self.config);
        if let Value::Map(map) = &mut value {
            map.insert(
                "previous".to_string(),
                self.index
                    .previous(doc)
                    .map(neighbour_value)
                    .unwrap_or_default(),
            );
            map.insert(
                "next".to_string(),
                self.index
                    .next(doc)
                    .map(neighbour_value)
                    .unwrap_or_default(),
            );
        }
        value
    }
}

fn neighbour_value(doc: &ContentDocument) -> Value {
    let mut map = IndexMap::new();
    map.insert("title".to_string(), Value::from(doc.title.as_str()));
    map.insert("url".to_string(), Value::from(doc.url.as_str()));
    Value::Map(map)
}

/// The `site` variable: config fields, extra config keys, and the index
fn build_site_value(config: &SiteConfig, index: &SiteIndex) -> Value {
    let mut map: IndexMap<String, Value> = config
        .extra
        .iter()
        .map(|(key, value)| (key.clone(), Value::from(value)))
        .collect();

    map.insert("title".to_string(), Value::from(config.title.as_str()));
    map.insert(
        "description".to_string(),
        Value::from(config.description.as_str()),
    );
    map.insert("author".to_string(), Value::from(config.author.as_str()));
    map.insert("url".to_string(), Value::from(full_url_for(config, "")));
    map.insert("root".to_string(), Value::from(config.root.as_str()));
    map.insert("posts".to_string(), index.to_value(config));
    map.insert("post_count".to_string(), Value::from(index.len()));

    Value::Map(map)
}
