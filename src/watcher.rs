//! Watches resolved source files and emits debounced change events.
//!
//! Each watched file's parent directory is watched non-recursively (editors
//! replace files rather than writing in place, so watching the file inode
//! directly misses saves). Events for paths outside the watched set are
//! ignored. A per-path debounce flag collapses editor write bursts into one
//! event; the sync coordinator's own debounce then coalesces across files.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use notify::{recommended_watcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::error::{KeybeeError, Result};

const DEBOUNCE_MS: u64 = 500;

/// A watched source file changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChangeEvent {
    pub path: PathBuf,
}

/// Watches a fixed set of resolved source files for changes.
pub struct SourceWatcher {
    tx: Option<Sender<SourceChangeEvent>>,
    paths: Vec<PathBuf>,
    running: Arc<AtomicBool>,
    watcher_thread: Option<thread::JoinHandle<()>>,
}

impl SourceWatcher {
    /// Returns the watcher and the receiver its change events arrive on.
    pub fn new(paths: Vec<PathBuf>) -> (Self, Receiver<SourceChangeEvent>) {
        let (tx, rx) = channel();
        let watcher = SourceWatcher {
            tx: Some(tx),
            paths,
            running: Arc::new(AtomicBool::new(true)),
            watcher_thread: None,
        };
        (watcher, rx)
    }

    /// Spawn the background watch thread. Fails if already started.
    pub fn start(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| KeybeeError::Watch("watcher already started".to_string()))?;
        let paths = self.paths.clone();
        let running = Arc::clone(&self.running);

        let thread_handle = thread::Builder::new()
            .name("keybee-watcher".to_string())
            .spawn(move || {
                if let Err(e) = watch_loop(tx, paths, running) {
                    warn!(error = %e, "Source watcher error");
                }
            })
            .map_err(|e| KeybeeError::Watch(e.to_string()))?;

        self.watcher_thread = Some(thread_handle);
        Ok(())
    }
}

impl Drop for SourceWatcher {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.watcher_thread.take() {
            let _ = handle.join();
        }
    }
}

const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

fn watch_loop(
    tx: Sender<SourceChangeEvent>,
    paths: Vec<PathBuf>,
    running: Arc<AtomicBool>,
) -> notify::Result<()> {
    let watched: HashSet<PathBuf> = paths.iter().cloned().collect();
    let parents: HashSet<PathBuf> = paths
        .iter()
        .filter_map(|p| p.parent().map(PathBuf::from))
        .collect();

    // Paths currently inside their debounce window.
    let debouncing: Arc<Mutex<HashSet<PathBuf>>> = Arc::new(Mutex::new(HashSet::new()));

    let (watch_tx, watch_rx) = channel();
    let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = watch_tx.send(res);
    })?;

    for parent in &parents {
        if let Err(e) = watcher.watch(parent, RecursiveMode::NonRecursive) {
            warn!(error = %e, path = %parent.display(), "Failed to watch directory");
        }
    }

    info!(files = watched.len(), dirs = parents.len(), "Source watcher started");

    while running.load(Ordering::SeqCst) {
        match watch_rx.recv_timeout(SHUTDOWN_POLL) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(Ok(event)) => {
                let is_relevant = matches!(
                    event.kind,
                    notify::EventKind::Create(_) | notify::EventKind::Modify(_)
                );
                if !is_relevant {
                    continue;
                }

                for path in event.paths.iter().filter(|p| watched.contains(*p)) {
                    let mut active = debouncing.lock().unwrap();
                    if !active.insert(path.clone()) {
                        continue;
                    }
                    drop(active);

                    let tx_clone = tx.clone();
                    let flag = Arc::clone(&debouncing);
                    let path = path.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(DEBOUNCE_MS));
                        info!(path = %path.display(), "Source file changed");
                        let _ = tx_clone.send(SourceChangeEvent { path: path.clone() });
                        flag.lock().unwrap().remove(&path);
                    });
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "File watcher error");
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!("Source watcher shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;

    #[test]
    fn start_twice_is_an_error() {
        let (mut watcher, _rx) = SourceWatcher::new(Vec::new());
        watcher.start().unwrap();
        assert!(watcher.start().is_err());
    }

    #[test]
    fn emits_one_event_for_a_burst_of_writes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("skhdrc");
        fs::write(&file, "cmd - a : open -a Terminal\n").unwrap();

        let (mut watcher, rx) = SourceWatcher::new(vec![file.clone()]);
        watcher.start().unwrap();
        // Give the backend a moment to arm the directory watch.
        thread::sleep(Duration::from_millis(300));

        for i in 0..3 {
            fs::write(&file, format!("cmd - a : open -a Terminal # {i}\n")).unwrap();
            thread::sleep(Duration::from_millis(30));
        }

        let event = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("no change event received");
        assert_eq!(event.path, file);

        // The burst fell inside one debounce window; no second event
        // should follow immediately.
        let quiet_until = Instant::now() + Duration::from_millis(DEBOUNCE_MS);
        while Instant::now() < quiet_until {
            assert!(rx.try_recv().is_err());
            thread::sleep(Duration::from_millis(50));
        }
    }

    #[test]
    fn ignores_unwatched_files_in_the_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        let watched = dir.path().join("tmux.conf");
        let other = dir.path().join("notes.txt");
        fs::write(&watched, "bind c new-window\n").unwrap();

        let (mut watcher, rx) = SourceWatcher::new(vec![watched]);
        watcher.start().unwrap();
        thread::sleep(Duration::from_millis(300));

        fs::write(&other, "unrelated\n").unwrap();
        assert!(rx.recv_timeout(Duration::from_millis(800)).is_err());
    }
}
