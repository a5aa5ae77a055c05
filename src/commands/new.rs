//! Create a new post

use anyhow::Result;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

use crate::content::{MetaValue, Metadata};
use crate::Site;

/// Create a new post in `_posts`, named after `new_post_name`
pub fn create_post(site: &Site, title: &str) -> Result<PathBuf> {
    create_post_at(site, title, chrono::Local::now().naive_local())
}

fn create_post_at(site: &Site, title: &str, now: NaiveDateTime) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} has nothing to build a file name from", title);
    }

    let filename = site
        .config
        .new_post_name
        .replace(":title", &slug)
        .replace(":year", &now.format("%Y").to_string())
        .replace(":month", &now.format("%m").to_string())
        .replace(":day", &now.format("%d").to_string())
        .replace(":i_month", &now.format("%-m").to_string())
        .replace(":i_day", &now.format("%-d").to_string());

    let target_dir = site.source_dir.join("_posts");
    let file_path = target_dir.join(&filename);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let mut metadata = Metadata::default();
    metadata.insert("title", MetaValue::Scalar(title.to_string()));
    metadata.insert(
        "date",
        MetaValue::Scalar(now.format("%Y-%m-%d %H:%M:%S").to_string()),
    );
    metadata.insert("tags", MetaValue::List(Vec::new()));
    if site.layout_dir.join("post.html").is_file() {
        metadata.insert("layout", MetaValue::Scalar("post".to_string()));
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, metadata.to_front_matter())?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::parse_date;

    fn now() -> NaiveDateTime {
        parse_date("2025-03-04 05:06:07").unwrap()
    }

    #[test]
    fn test_create_post() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_post_at(&site, "TCP: The Handshake", now()).unwrap();
        assert_eq!(
            path,
            site.source_dir.join("_posts/2025-03-04-tcp-the-handshake.md")
        );

        let text = fs::read_to_string(&path).unwrap();
        let (metadata, body) = Metadata::parse(&text);
        assert_eq!(metadata.title(), Some("TCP: The Handshake"));
        assert_eq!(metadata.get_str("date"), Some("2025-03-04 05:06:07"));
        assert!(metadata.get_list("tags").is_empty());
        assert_eq!(metadata.layout(), None);
        assert_eq!(body, "");
    }

    #[test]
    fn test_existing_post_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_post_at(&site, "Ping", now()).unwrap();
        fs::write(&path, "edited").unwrap();

        assert!(create_post_at(&site, "Ping", now()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "edited");
    }

    #[test]
    fn test_layout_added_when_post_layout_exists() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::write(dir.path().join("layouts/post.html"), "{{ content }}").unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_post_at(&site, "Traceroute", now()).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(Metadata::parse(&text).0.layout(), Some("post"));
    }
}
