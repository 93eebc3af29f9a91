//! Configuration module - source declarations and user preferences.
//!
//! # Module Structure
//!
//! - `defaults` - default constant values
//! - `types` - configuration struct definitions (Config, SourceConfig, ...)
//! - `loader` - JSON load/save at ~/.config/keybee/config.json

mod defaults;
mod loader;
mod types;

pub use defaults::{DEBOUNCE_WINDOW_MS, DEFAULT_AUTO_SYNC, DEFAULT_COMMENT_PREFIX};

pub use types::{BuiltinKind, BuiltinSource, Config, CustomParserConfig, SourceConfig};

pub use loader::{cache_path, config_dir, config_path, is_first_run, load_config, save_config};
