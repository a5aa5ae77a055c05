//! Template engine for layouts and listing pages
//!
//! A deliberately small Liquid-like language: variable output, loops over
//! lists and conditionals. Templates are parsed once into an AST and
//! rendered against a [`Context`].

mod layouts;
mod parser;
mod render;
mod value;

pub use layouts::{Layout, LayoutSet};
pub use parser::Node;
pub use value::{Context, Value};

use thiserror::Error;

use parser::Parser;

/// Template parsing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("{template}:{line}: malformed tag `{tag}`")]
    Syntax {
        template: String,
        line: usize,
        tag: String,
    },

    #[error("{template}:{line}: unexpected `{tag}`")]
    Unexpected {
        template: String,
        line: usize,
        tag: String,
    },

    #[error("{template}: block not closed, expected {expected}")]
    Unclosed { template: String, expected: String },
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source; `name` is used in diagnostics
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let nodes = Parser::new(name, source).parse()?;
        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render against a context
    ///
    /// Placeholders that resolve to nothing render as empty strings; each
    /// distinct one is reported once as a warning.
    pub fn render(&self, context: &Context) -> String {
        render::render(self, context)
    }
}
