//! Default configuration values.

/// Auto-sync on startup when outstanding changes are detected.
pub const DEFAULT_AUTO_SYNC: bool = true;

/// Comment prefix for custom sources that do not declare one.
pub const DEFAULT_COMMENT_PREFIX: &str = "#";

/// Debounce window for non-immediate sync requests (milliseconds).
pub const DEBOUNCE_WINDOW_MS: u64 = 250;
