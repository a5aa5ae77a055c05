//! Generator module - runs a full build of the site
//!
//! A build runs in phases: discover files, load and render every document,
//! build the site index, then compose and write each page. The index is
//! complete before the first page is composed, so listing pages always see
//! every document.

mod composer;
mod index;

pub use composer::{ComposedPage, Composer};
pub use index::SiteIndex;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::content::loader::ContentLoader;
use crate::content::ContentDocument;
use crate::error::BuildError;
use crate::helpers::path_to_url;
use crate::templates::LayoutSet;
use crate::Site;

/// What a build produced
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Pages written
    pub pages: usize,
    /// Static assets copied
    pub assets: usize,
    /// Documents that were skipped, with the reason
    pub failures: Vec<BuildError>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Static site generator
pub struct Generator<'a> {
    site: &'a Site,
}

impl<'a> Generator<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Generate the entire site
    ///
    /// Only missing input directories fail the build. Per-document problems
    /// are logged, recorded in the report, and skipped.
    pub fn generate(&self) -> Result<BuildReport, BuildError> {
        let loader = ContentLoader::new(self.site);
        let discovered = loader.discover()?;
        let layouts = LayoutSet::load(&self.site.layout_dir)?;

        tracing::info!(
            "Found {} content files, {} assets, {} layouts",
            discovered.content.len(),
            discovered.assets.len(),
            layouts.len()
        );

        let outcome = loader.load_all(&discovered.content);
        let (documents, collisions) = claim_output_paths(outcome.documents);
        let mut report = BuildReport {
            failures: outcome.failures,
            ..BuildReport::default()
        };
        report.failures.extend(collisions);

        let index = SiteIndex::build(&documents);
        tracing::info!("Indexed {} documents", index.len());

        fs::create_dir_all(&self.site.public_dir)?;

        let composer = Composer::new(&self.site.config, &layouts, &index);
        for doc in &documents {
            let written = composer
                .compose(doc)
                .and_then(|page| self.write_page(&page));
            match written {
                Ok(()) => report.pages += 1,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", doc.source, e);
                    report.failures.push(e);
                }
            }
        }

        report.assets = self.copy_assets(&discovered.assets);

        if report.is_clean() {
            tracing::info!(
                "Wrote {} pages and {} assets",
                report.pages,
                report.assets
            );
        } else {
            tracing::warn!(
                "Wrote {} pages and {} assets; {} documents skipped",
                report.pages,
                report.assets,
                report.failures.len()
            );
        }

        Ok(report)
    }

    fn write_page(&self, page: &ComposedPage) -> Result<(), BuildError> {
        let output_path = self.site.public_dir.join(&page.output_path);
        let failure = |e: std::io::Error| {
            BuildError::render_failure(output_path.display().to_string(), e)
        };

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(failure)?;
        }
        fs::write(&output_path, &page.html).map_err(failure)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy source assets (images, etc.) to the public directory
    fn copy_assets(&self, assets: &[PathBuf]) -> usize {
        let mut copied = 0;

        for path in assets {
            let Ok(relative) = path.strip_prefix(&self.site.source_dir) else {
                continue;
            };
            let dest = self.site.public_dir.join(relative);

            let result = dest
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|_| fs::copy(path, &dest));
            match result {
                Ok(_) => copied += 1,
                Err(e) => tracing::warn!("Failed to copy {:?}: {}", path, e),
            }
        }

        copied
    }
}

/// Give each output path to the first document that claims it
///
/// Later documents with the same output path are dropped and reported.
fn claim_output_paths(
    documents: Vec<ContentDocument>,
) -> (Vec<ContentDocument>, Vec<BuildError>) {
    let mut owners: HashMap<PathBuf, String> = HashMap::new();
    let mut kept = Vec::with_capacity(documents.len());
    let mut collisions = Vec::new();

    for doc in documents {
        match owners.get(&doc.output_path) {
            Some(owner) => {
                let err = BuildError::render_failure(
                    doc.source.as_str(),
                    format!(
                        "output path {} is already taken by {}",
                        path_to_url(&doc.output_path),
                        owner
                    ),
                );
                tracing::warn!("{}", err);
                collisions.push(err);
            }
            None => {
                owners.insert(doc.output_path.clone(), doc.source.clone());
                kept.push(doc);
            }
        }
    }

    (kept, collisions)
}
