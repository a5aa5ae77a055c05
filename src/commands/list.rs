//! List the site index

use anyhow::Result;
use serde::Serialize;

use crate::content::loader::ContentLoader;
use crate::generator::SiteIndex;
use crate::helpers::format_date;
use crate::Site;

/// One indexed document, as printed by `list`
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub title: String,
    pub date: Option<String>,
    pub url: String,
    pub source: String,
    pub tags: Vec<String>,
}

/// Load the site and return its index entries, newest first
pub fn entries(site: &Site) -> Result<Vec<ListEntry>> {
    let loader = ContentLoader::new(site);
    let discovered = loader.discover()?;
    let outcome = loader.load_all(&discovered.content);
    let index = SiteIndex::build(&outcome.documents);

    Ok(index
        .iter()
        .map(|doc| ListEntry {
            title: doc.title.clone(),
            date: doc.date.map(|d| format_date(&d, &site.config.date_format)),
            url: doc.url.clone(),
            source: doc.source.clone(),
            tags: doc.metadata.get_list("tags"),
        })
        .collect())
}

/// Print the site index as text or JSON
pub fn run(site: &Site, json: bool) -> Result<()> {
    let entries = entries(site)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Posts ({}):", entries.len());
    for entry in &entries {
        println!(
            "  {:<10} - {} [{}]",
            entry.date.as_deref().unwrap_or("undated"),
            entry.title,
            entry.source
        );
    }

    Ok(())
}
