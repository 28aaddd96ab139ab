//! Hot-reload support for long-lived hosts (§4.O). Not required for a single
//! negotiation run, which reads `EngineConfig` once at startup.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{ConfigError, ConfigLoader, EngineConfig, Result};

/// Watches a config file and reloads `EngineConfig` on modification.
pub struct ConfigWatcher {
    config: Arc<RwLock<EngineConfig>>,
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Result<Self> {
        let config = ConfigLoader::from_file(&path)?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            path,
        })
    }

    pub fn get_config(&self) -> EngineConfig {
        self.config.read().expect("config lock poisoned").clone()
    }

    /// Spawns a watcher task; the returned handle runs until dropped.
    pub fn start_watching(&self) -> Result<JoinHandle<()>> {
        let config = Arc::clone(&self.config);
        let path = self.path.clone();

        let (tx, mut rx) = mpsc::channel(100);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(e) = tx.blocking_send(event) {
                        error!("failed to send file event: {e}");
                    }
                }
                Err(e) => error!("file watch error: {e}"),
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        )
        .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        info!(path = ?path, "started watching config file");

        let handle = tokio::spawn(async move {
            let _watcher = watcher;
            while let Some(event) = rx.recv().await {
                if !matches!(event.kind, EventKind::Modify(_)) {
                    continue;
                }
                match ConfigLoader::from_file(&path) {
                    Ok(reloaded) => {
                        let mut guard = config.write().expect("config lock poisoned");
                        *guard = reloaded;
                        debug!(path = ?path, "config reloaded");
                    }
                    Err(e) => warn!(path = ?path, error = %e, "failed to reload config, keeping previous"),
                }
            }
        });

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_initial_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "run_mode = \"production\"").unwrap();
        let watcher = ConfigWatcher::new(file.path().to_path_buf()).unwrap();
        assert_eq!(watcher.get_config().run_mode, procur_types::RunMode::Production);
    }
}
