//! Build the site, once or on every change

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::generator::BuildReport;
use crate::Site;

/// Quiet period before a burst of file events triggers a rebuild
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Build the site
///
/// Returns an error only when the build cannot run at all. Skipped
/// documents are logged and listed in the report.
pub fn run(site: &Site) -> Result<BuildReport> {
    let start = Instant::now();
    tracing::info!("Building {:?}", site.base_dir);

    let report = site.build()?;

    let duration = start.elapsed();
    tracing::info!("Built in {:.2}s", duration.as_secs_f64());
    Ok(report)
}

/// Watch sources, layouts and `_config.yml`, rebuilding on change
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for dir in [&site.source_dir, &site.layout_dir] {
        if dir.exists() {
            watcher.watch(dir.as_path(), RecursiveMode::Recursive)?;
        }
    }

    let config_path = site.config_path();
    if config_path.exists() {
        watcher.watch(config_path.as_path(), RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut site = site.clone();
    while let Some(event) = rx.recv().await {
        if is_output(&site, &event) {
            continue;
        }
        let mut config_changed = touches(&event, &config_path);

        // Let the burst settle, then rebuild once
        tokio::time::sleep(DEBOUNCE).await;
        while let Ok(event) = rx.try_recv() {
            config_changed |= touches(&event, &config_path);
        }

        if config_changed {
            match Site::new(&site.base_dir) {
                Ok(reloaded) => {
                    tracing::info!("Reloaded {:?}", config_path);
                    site = reloaded;
                }
                Err(e) => {
                    tracing::error!("Keeping previous config: {:#}", e);
                }
            }
        }

        tracing::info!("Change detected, rebuilding...");
        let snapshot = site.clone();
        match tokio::task::spawn_blocking(move || run(&snapshot)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!("Build failed: {:#}", e),
            Err(e) => tracing::error!("Build task panicked: {}", e),
        }
    }

    Ok(())
}

fn touches(event: &notify::Event, path: &Path) -> bool {
    event.paths.iter().any(|p| p == path)
}

/// Events caused by our own writes
fn is_output(site: &Site, event: &notify::Event) -> bool {
    !event.paths.is_empty() && event.paths.iter().all(|p| p.starts_with(&site.public_dir))
}
