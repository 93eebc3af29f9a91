//! Core binding record types.

use serde::{Deserialize, Serialize};

/// One extracted shortcut.
///
/// Bindings are created fresh on every extraction pass and never mutated
/// afterwards; the whole set is replaced atomically when a sync pass
/// completes, so `id` is only stable within one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Unique within a sync pass: tool name + sequence counter.
    pub id: String,
    /// Owning dialect or custom source name.
    pub tool: String,
    /// Key expression exactly as written in the source (display form).
    pub keys: String,
    /// Canonical chord string - the conflict-detection join key.
    pub normalized_keys: String,
    /// Raw command/function/target invoked.
    pub action: String,
    /// Human-readable label; falls back to `action` when the source has no
    /// explicit description.
    pub description: String,
    /// Sub-context the binding is scoped to (editor mode, key table,
    /// profile name). Absence means default/global scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Resolved absolute file path the binding came from; routes
    /// open-in-editor requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

impl Binding {
    /// Build a binding with the per-pass sequential id for `tool`.
    pub fn new(
        tool: &str,
        seq: usize,
        keys: impl Into<String>,
        normalized_keys: impl Into<String>,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Binding {
            id: format!("{tool}-{seq}"),
            tool: tool.to_string(),
            keys: keys.into(),
            normalized_keys: normalized_keys.into(),
            action: action.into(),
            description: description.into(),
            mode: None,
            source_path: None,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

/// Bindings sharing a canonical chord that genuinely collide.
/// Derived fresh from the current binding set, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictGroup {
    pub normalized_keys: String,
    pub bindings: Vec<Binding>,
}
