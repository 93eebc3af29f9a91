//! keybee command-line entry point.
//!
//! Thin presentation glue over the engine: every subcommand loads the
//! config, drives a sync pass or the cached snapshot, and prints the
//! result. The engine itself lives in the library crate.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use keybee::cache::{self, CacheSnapshot};
use keybee::config::{self, Config};
use keybee::conflicts::detect_conflicts;
use keybee::discovery::discover_sources;
use keybee::parsers::{group_by_tool, Binding};
use keybee::resolver::resolve_source_path;
use keybee::sync::{plan_refresh, run_sync_pass, Refresh, SyncCoordinator};
use keybee::watcher::SourceWatcher;

#[derive(Parser)]
#[command(name = "keybee", version, about = "Aggregate keybindings across tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one sync pass and persist the snapshot
    Sync,
    /// List all known bindings, grouped by tool
    List {
        /// Only show bindings from this tool
        #[arg(long)]
        tool: Option<String>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show colliding key chords
    Conflicts {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show config, source, and cache state
    Status,
    /// Scan search roots for well-known config files
    Discover {
        /// Directories to scan (defaults to the configured base paths)
        paths: Vec<String>,
        /// Merge newly discovered sources into the config
        #[arg(long)]
        save: bool,
    },
    /// Watch sources and re-sync on change
    Watch,
}

fn main() -> Result<()> {
    let _guard = keybee::logging::init();
    let cli = Cli::parse();
    let config = config::load_config();

    match cli.command {
        Command::Sync => cmd_sync(&config),
        Command::List { tool, json } => cmd_list(&config, tool.as_deref(), json),
        Command::Conflicts { json } => cmd_conflicts(&config, json),
        Command::Status => cmd_status(&config),
        Command::Discover { paths, save } => cmd_discover(config, paths, save),
        Command::Watch => cmd_watch(config),
    }
}

/// Serve bindings from the cache when nothing changed underneath it. With
/// auto-sync on, a stale cache triggers a fresh pass; with it off, the
/// stale snapshot is served and the outstanding changes are reported so
/// the user can run `keybee sync` explicitly.
fn load_snapshot(config: &Config) -> Result<CacheSnapshot> {
    match plan_refresh(config, cache::load_cache()) {
        Refresh::UpToDate(snapshot) => Ok(snapshot),
        Refresh::Outstanding { snapshot, changes } => {
            eprintln!(
                "{} file(s) changed since last sync; run `keybee sync` to refresh",
                changes.total()
            );
            Ok(snapshot)
        }
        Refresh::Sync => {
            let snapshot = run_sync_pass(config);
            cache::save_cache(&snapshot)?;
            Ok(snapshot)
        }
    }
}

fn cmd_sync(config: &Config) -> Result<()> {
    let snapshot = run_sync_pass(config);
    cache::save_cache(&snapshot)?;
    println!(
        "Synced {} bindings from {} sources",
        snapshot.bindings.len(),
        snapshot.entries.len()
    );
    Ok(())
}

fn cmd_list(config: &Config, tool: Option<&str>, json: bool) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let bindings: Vec<Binding> = match tool {
        Some(tool) => snapshot
            .bindings
            .into_iter()
            .filter(|b| b.tool == tool)
            .collect(),
        None => snapshot.bindings,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&bindings)?);
        return Ok(());
    }

    for (tool, group) in group_by_tool(&bindings) {
        println!("{tool} ({})", group.len());
        for binding in group {
            let mode = binding
                .mode
                .as_deref()
                .map(|m| format!(" [{m}]"))
                .unwrap_or_default();
            println!("  {:<24}{mode}  {}", binding.keys, binding.description);
        }
    }
    Ok(())
}

fn cmd_conflicts(config: &Config, json: bool) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let conflicts = detect_conflicts(&snapshot.bindings);

    if json {
        println!("{}", serde_json::to_string_pretty(&conflicts)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No conflicts");
        return Ok(());
    }
    for group in &conflicts {
        println!("{} ({} bindings)", group.normalized_keys, group.bindings.len());
        for binding in &group.bindings {
            let mode = binding
                .mode
                .as_deref()
                .map(|m| format!(" [{m}]"))
                .unwrap_or_default();
            println!("  {:<12}{mode}  {}", binding.tool, binding.description);
        }
    }
    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    println!("config: {}", config::config_path().display());
    println!("cache:  {}", config::cache_path().display());

    for source in &config.sources {
        let resolved = resolve_source_path(source, &config.base_paths);
        let state = if !source.enabled() {
            "disabled".to_string()
        } else {
            match &resolved {
                Some(path) => path.display().to_string(),
                None => "not found".to_string(),
            }
        };
        println!("  {:<12} {} -> {state}", source.tool_name(), source.path());
    }

    match cache::load_cache() {
        None => println!("no cache yet; run `keybee sync`"),
        Some(cached) => {
            println!(
                "last sync: {} ({} bindings)",
                cached.last_sync.to_rfc3339(),
                cached.bindings.len()
            );
            let diff = cache::detect_changes(config, Some(&cached));
            if diff.is_empty() {
                println!("up to date");
            } else {
                println!(
                    "{} added, {} changed, {} removed since last sync",
                    diff.added.len(),
                    diff.changed.len(),
                    diff.removed.len()
                );
            }
        }
    }
    Ok(())
}

fn cmd_discover(mut config: Config, paths: Vec<String>, save: bool) -> Result<()> {
    let roots = if paths.is_empty() {
        config.base_paths.clone()
    } else {
        paths
    };
    if roots.is_empty() {
        anyhow::bail!("no search paths given and no base paths configured");
    }

    let discovered = discover_sources(&roots);
    for source in &discovered {
        println!("  {:<12} {}", source.tool_name(), source.path());
    }
    println!("{} sources found", discovered.len());

    if save {
        let mut new = 0;
        for source in discovered {
            if !config.sources.iter().any(|s| s.path() == source.path()) {
                config.sources.push(source);
                new += 1;
            }
        }
        config::save_config(&config)?;
        println!("{new} new sources saved");
    }
    Ok(())
}

fn cmd_watch(config: Config) -> Result<()> {
    let paths: Vec<PathBuf> = config
        .enabled_sources()
        .filter_map(|s| resolve_source_path(s, &config.base_paths))
        .collect();
    if paths.is_empty() {
        anyhow::bail!("no resolvable sources to watch");
    }

    let coordinator = SyncCoordinator::new();
    // Seed the slot from the persisted snapshot so readers see something
    // before the first pass lands.
    if let Some(cached) = cache::load_cache() {
        coordinator.publish(cached);
    }
    coordinator.request_sync(config.clone(), true);

    let (mut watcher, rx) = SourceWatcher::new(paths);
    watcher.start()?;
    println!("Watching {} sources (ctrl-c to stop)", config.sources.len());
    if !config.auto_sync {
        println!("auto-sync is off; changes will be reported but not synced");
    }

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                if config.auto_sync {
                    info!(path = %event.path.display(), "Change detected, scheduling sync");
                    coordinator.request_sync(config.clone(), false);
                } else {
                    info!(path = %event.path.display(), "Change detected, auto-sync off");
                    println!("{} changed; run `keybee sync`", event.path.display());
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}
