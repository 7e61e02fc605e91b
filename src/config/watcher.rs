//! File watcher for hot reload.
//!
//! Watches the config file and every route resource the current route table
//! was built from. Any change reloads the config file; the server rebuilds
//! its route table from it, which re-reads the route files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GateConfig;
use crate::routing::route::Resource;

/// A watcher that monitors configuration and route files for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    resources: Vec<Resource>,
    update_tx: mpsc::UnboundedSender<GateConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(
        path: &Path,
        resources: Vec<Resource>,
    ) -> (Self, mpsc::UnboundedReceiver<GateConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                resources,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread. Dropping the returned watcher
    /// stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                        tracing::info!(paths = ?event.paths, "Change detected, reloading configuration");
                        match load_config(&path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to reload config. Keeping current configuration.");
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        for resource in &self.resources {
            let mode = match resource {
                Resource::File(_) => RecursiveMode::NonRecursive,
                Resource::Directory(_) => RecursiveMode::Recursive,
            };
            if let Err(e) = watcher.watch(resource.path(), mode) {
                tracing::warn!(path = %resource.path().display(), error = %e, "Cannot watch route resource");
            }
        }

        tracing::info!(
            path = ?self.path,
            resources = self.resources.len(),
            "Config watcher started"
        );
        Ok(watcher)
    }
}
