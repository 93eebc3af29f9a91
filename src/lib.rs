//! keybee - keybinding aggregation and incremental sync engine.
//!
//! This library collects keyboard-shortcut definitions scattered across
//! heterogeneous tool configs (skhd, tmux, nvim, zsh, karabiner,
//! hammerspoon, plus user-defined regex formats), normalizes every key
//! expression into one canonical chord string, detects collisions across
//! and within tools, and keeps the aggregate in sync with the underlying
//! files through a fingerprint-based cache.

pub mod cache;
pub mod chord;
pub mod config;
pub mod conflicts;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod parsers;
pub mod resolver;
pub mod sync;
pub mod watcher;
