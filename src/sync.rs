//! Sync coordination: one pass of resolve → extract → snapshot, plus the
//! coalescing logic that keeps at most one pass in flight.
//!
//! Coalescing is an explicit state machine (`SyncPlanner`) rather than
//! timers-as-hidden-state: `Idle`, `Debouncing` (a non-immediate request
//! waiting out its window), and `Running` with a single pending slot where
//! the latest superseding request wins. `SyncCoordinator` drives the
//! planner from one worker thread, so passes are strictly serialized and
//! the published snapshot is always a complete replacement.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::cache::{detect_changes, mtime_millis, save_cache_to, CacheEntry, CacheSnapshot, ChangeSet};
use crate::config::{Config, DEBOUNCE_WINDOW_MS};
use crate::error::ResultExt;
use crate::parsers::{self, Binding};
use crate::resolver::resolve_source_path;

/// What to do with a previously persisted snapshot.
#[derive(Debug)]
pub enum Refresh {
    /// Nothing changed underneath the cache; serve it as-is.
    UpToDate(CacheSnapshot),
    /// Sources changed but auto-sync is off: serve the stale snapshot and
    /// report the outstanding changes so the user can sync explicitly.
    Outstanding {
        snapshot: CacheSnapshot,
        changes: ChangeSet,
    },
    /// No usable cache, or changes exist and auto-sync is on.
    Sync,
}

/// Decide whether the cached snapshot can be served or a fresh pass is
/// needed, honoring the config's auto-sync flag.
pub fn plan_refresh(config: &Config, cached: Option<CacheSnapshot>) -> Refresh {
    let Some(cached) = cached else {
        return Refresh::Sync;
    };
    let changes = detect_changes(config, Some(&cached));
    if changes.is_empty() {
        return Refresh::UpToDate(cached);
    }
    if config.auto_sync {
        return Refresh::Sync;
    }
    Refresh::Outstanding {
        snapshot: cached,
        changes,
    }
}

/// Run one complete sync pass: resolve every enabled source, extract its
/// bindings, and assemble the replacement snapshot.
///
/// Failures local to one source (unresolvable path, unreadable file, bad
/// custom pattern) exclude that source and never abort the pass.
pub fn run_sync_pass(config: &Config) -> CacheSnapshot {
    let started = Instant::now();
    let mut bindings: Vec<Binding> = Vec::new();
    let mut entries: Vec<CacheEntry> = Vec::new();

    for source in config.enabled_sources() {
        let Some(path) = resolve_source_path(source, &config.base_paths) else {
            debug!(source = source.tool_name(), declared = source.path(), "Source not found");
            continue;
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to read source");
                continue;
            }
        };

        let mut parsed = match parsers::parse_source(source, &content) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, source = source.tool_name(), "Extraction failed");
                continue;
            }
        };

        let path_str = path.display().to_string();
        for binding in &mut parsed {
            binding.source_path = Some(path_str.clone());
        }

        // Stat can fail if the file vanished between read and here.
        let mtime = mtime_millis(&path).warn_on_err().unwrap_or(0);
        entries.push(CacheEntry {
            path: path_str,
            hash: hex::encode(Sha256::digest(content.as_bytes())),
            mtime,
            bindings_count: parsed.len(),
        });
        bindings.append(&mut parsed);
    }

    info!(
        sources = entries.len(),
        bindings = bindings.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Sync pass complete"
    );
    CacheSnapshot::new(entries, bindings)
}

// ============================================
// PLANNER
// ============================================

#[derive(Debug)]
enum PlannerState {
    Idle,
    /// A non-immediate request waiting out its debounce window. Further
    /// requests replace the config and reset the deadline.
    Debouncing { config: Config, deadline: Instant },
    /// A pass is in flight. At most one superseding request is held; the
    /// latest one wins.
    Running { pending: Option<Config> },
}

/// Pure coalescing state machine. The caller owns the clock: it feeds
/// `Instant`s in and runs whatever config the planner hands back.
#[derive(Debug)]
pub struct SyncPlanner {
    state: PlannerState,
    window: Duration,
}

impl Default for SyncPlanner {
    fn default() -> Self {
        SyncPlanner::new(Duration::from_millis(DEBOUNCE_WINDOW_MS))
    }
}

impl SyncPlanner {
    pub fn new(window: Duration) -> Self {
        SyncPlanner {
            state: PlannerState::Idle,
            window,
        }
    }

    /// Record a sync request. Returns a config only when a pass should
    /// start right now (an immediate request with no pass in flight).
    pub fn request(&mut self, config: Config, immediate: bool, now: Instant) -> Option<Config> {
        match &mut self.state {
            PlannerState::Running { pending } => {
                *pending = Some(config);
                None
            }
            PlannerState::Idle | PlannerState::Debouncing { .. } if immediate => {
                self.state = PlannerState::Running { pending: None };
                Some(config)
            }
            PlannerState::Idle | PlannerState::Debouncing { .. } => {
                self.state = PlannerState::Debouncing {
                    config,
                    deadline: now + self.window,
                };
                None
            }
        }
    }

    /// Start a debounced request whose window has elapsed, if any.
    pub fn poll(&mut self, now: Instant) -> Option<Config> {
        if let PlannerState::Debouncing { deadline, .. } = &self.state {
            if now >= *deadline {
                let PlannerState::Debouncing { config, .. } =
                    std::mem::replace(&mut self.state, PlannerState::Running { pending: None })
                else {
                    unreachable!()
                };
                return Some(config);
            }
        }
        None
    }

    /// When the next debounce deadline fires, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            PlannerState::Debouncing { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    /// The in-flight pass finished. Returns the pending config to start
    /// immediately, if one was recorded while the pass ran.
    pub fn pass_completed(&mut self) -> Option<Config> {
        match &mut self.state {
            PlannerState::Running { pending } => match pending.take() {
                Some(config) => Some(config),
                None => {
                    self.state = PlannerState::Idle;
                    None
                }
            },
            _ => None,
        }
    }
}

// ============================================
// COORDINATOR
// ============================================

enum Command {
    Request { config: Config, immediate: bool },
    Shutdown,
}

/// Owns the sync worker thread and the published snapshot slot.
///
/// Readers always see either the previous or the new complete snapshot,
/// never a mix; the slot is swapped whole at the end of each pass.
pub struct SyncCoordinator {
    tx: mpsc::Sender<Command>,
    snapshot: Arc<RwLock<Option<CacheSnapshot>>>,
    handle: Option<JoinHandle<()>>,
}

impl SyncCoordinator {
    /// Coordinator that persists each completed snapshot to the default
    /// cache location.
    pub fn new() -> Self {
        Self::with_cache_file(Some(crate::config::cache_path()))
    }

    /// `cache_file: None` keeps snapshots in memory only.
    pub fn with_cache_file(cache_file: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel::<Command>();
        let snapshot: Arc<RwLock<Option<CacheSnapshot>>> = Arc::new(RwLock::new(None));
        let slot = Arc::clone(&snapshot);

        let handle = thread::Builder::new()
            .name("keybee-sync".to_string())
            .spawn(move || worker_loop(rx, slot, cache_file))
            .ok();
        if handle.is_none() {
            warn!("Failed to spawn sync worker thread");
        }

        SyncCoordinator {
            tx,
            snapshot,
            handle,
        }
    }

    /// Request a sync pass over the given configuration. Non-immediate
    /// requests debounce; immediate ones fire (or become the pending slot)
    /// right away. Always returns without waiting for the pass.
    pub fn request_sync(&self, config: Config, immediate: bool) {
        let _ = self.tx.send(Command::Request { config, immediate });
    }

    /// Seed the snapshot slot, e.g. from a cache loaded at startup.
    pub fn publish(&self, snapshot: CacheSnapshot) {
        *self.snapshot.write() = Some(snapshot);
    }

    /// The most recently completed pass's snapshot, if any.
    pub fn latest_snapshot(&self) -> Option<CacheSnapshot> {
        self.snapshot.read().clone()
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

fn worker_loop(
    rx: mpsc::Receiver<Command>,
    slot: Arc<RwLock<Option<CacheSnapshot>>>,
    cache_file: Option<PathBuf>,
) {
    let mut planner = SyncPlanner::default();

    loop {
        let timeout = planner
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_TIMEOUT);

        let to_run = match rx.recv_timeout(timeout) {
            Ok(Command::Request { config, immediate }) => {
                planner.request(config, immediate, Instant::now())
            }
            Ok(Command::Shutdown) => return,
            Err(RecvTimeoutError::Timeout) => planner.poll(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => return,
        };

        let Some(mut config) = to_run else { continue };

        loop {
            let snapshot = run_sync_pass(&config);
            if let Some(path) = &cache_file {
                save_cache_to(&snapshot, path).log_err();
            }
            *slot.write() = Some(snapshot);

            // Requests that arrived mid-pass feed the pending slot before
            // we decide what runs next.
            loop {
                match rx.try_recv() {
                    Ok(Command::Request { config, immediate }) => {
                        planner.request(config, immediate, Instant::now());
                    }
                    Ok(Command::Shutdown) => return,
                    Err(_) => break,
                }
            }

            match planner.pass_completed() {
                Some(next) => config = next,
                None => break,
            }
        }
    }
}
