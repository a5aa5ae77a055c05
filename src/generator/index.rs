//! Site index - the date-ordered collection listing pages iterate

use std::cmp::Ordering;

use crate::config::SiteConfig;
use crate::content::ContentDocument;
use crate::templates::Value;

/// Indexed documents, newest first
///
/// Undated documents sort last. Ties keep discovery order.
#[derive(Debug, Clone)]
pub struct SiteIndex<'a> {
    entries: Vec<&'a ContentDocument>,
}

impl<'a> SiteIndex<'a> {
    /// Build the index from scratch
    pub fn build(documents: &'a [ContentDocument]) -> Self {
        let mut entries: Vec<&ContentDocument> =
            documents.iter().filter(|d| d.is_indexed()).collect();

        // sort_by is stable, so ties keep discovery order
        entries.sort_by(|a, b| match (a.date, b.date) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ContentDocument> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, doc: &ContentDocument) -> Option<usize> {
        self.entries.iter().position(|d| d.source == doc.source)
    }

    /// The next older document
    pub fn previous(&self, doc: &ContentDocument) -> Option<&'a ContentDocument> {
        let pos = self.position(doc)?;
        self.entries.get(pos + 1).copied()
    }

    /// The next newer document
    pub fn next(&self, doc: &ContentDocument) -> Option<&'a ContentDocument> {
        let pos = self.position(doc)?;
        pos.checked_sub(1).and_then(|i| self.entries.get(i)).copied()
    }

    /// Template view: a list of document values
    pub fn to_value(&self, config: &SiteConfig) -> Value {
        Value::List(self.iter().map(|doc| doc.to_value(config)).collect())
    }
}
