//! File watching for `compose-check --watch`
//!
//! Watches the parent directories of the given files and reports every
//! create/modify event that touches one of them.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events from the file watcher
#[derive(Debug)]
pub enum WatcherEvent {
    FileChanged(PathBuf),
    WatcherError(notify::Error),
}

/// Keeps the underlying watcher alive while events are consumed
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<WatcherEvent>,
    targets: Vec<PathBuf>,
}

impl FileWatcher {
    /// Start watching `files`
    pub fn new(files: &[PathBuf]) -> Result<Self> {
        let targets: Vec<PathBuf> = files.iter().map(|f| absolute(f)).collect();
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) = event.kind {
                        for path in event.paths {
                            let _ = tx.send(WatcherEvent::FileChanged(path));
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        let mut dirs: Vec<&Path> = targets.iter().filter_map(|t| t.parent()).collect();
        dirs.sort();
        dirs.dedup();
        for dir in dirs {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {}", dir.display()))?;
            log::debug!("Watching {}", dir.display());
        }

        Ok(Self {
            _watcher: watcher,
            rx,
            targets,
        })
    }

    /// Block until one of the watched files changes.
    ///
    /// Bursts of events for the same file are collapsed. Returns `None`
    /// once the watcher has shut down.
    pub fn next_change(&self) -> Option<PathBuf> {
        self.next_change_within(None)
    }

    /// Like [`next_change`](Self::next_change), giving up after `timeout`
    pub fn next_change_within(&self, timeout: Option<Duration>) -> Option<PathBuf> {
        loop {
            let event = match timeout {
                Some(timeout) => self.rx.recv_timeout(timeout).ok()?,
                None => self.rx.recv().ok()?,
            };
            match event {
                WatcherEvent::FileChanged(path) => {
                    let Some(target) = self.matching_target(&path) else {
                        continue;
                    };
                    // Editors often write a file in several steps
                    while self.rx.recv_timeout(Duration::from_millis(100)).is_ok() {}
                    return Some(target);
                }
                WatcherEvent::WatcherError(e) => {
                    log::error!("File watcher error: {}", e);
                }
            }
        }
    }

    fn matching_target(&self, path: &Path) -> Option<PathBuf> {
        let path = absolute(path);
        self.targets.iter().find(|t| **t == path).cloned()
    }
}

/// Canonical form when the file exists, so event paths compare equal
fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
