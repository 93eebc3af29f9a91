//! tmux config extractor.
//!
//! Scans the file as a single forward pass threading the current prefix key
//! through an explicit accumulator: a `set -g prefix C-b` directive updates
//! it, and later prefix-table bindings display as "<prefix> <key>" with the
//! `prefix` pseudo-modifier folded into the canonical chord. Bindings with
//! `-T <table>` use that table name as their mode instead.

use std::sync::OnceLock;

use regex::Regex;

use crate::chord;

use super::describe;
use super::types::Binding;

const DEFAULT_PREFIX: &str = "C-a";

fn prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^set\s+-g\s+prefix\s+(\S+)").expect("valid tmux prefix regex"))
}

fn bind_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^bind(?:-key)?\s+(?:-r\s+)?(?:-T\s+(\S+)\s+)?(\S+)\s+(.+)$")
            .expect("valid tmux bind regex")
    })
}

pub fn parse(content: &str) -> Vec<Binding> {
    let mut bindings = Vec::new();
    let mut seq = 0usize;
    let mut prefix = DEFAULT_PREFIX.to_string();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(caps) = prefix_re().captures(trimmed) {
            prefix = caps[1].to_string();
            continue;
        }

        let Some(caps) = bind_re().captures(trimmed) else {
            continue;
        };
        let table = caps.get(1).map(|m| m.as_str().to_string());
        let key = caps[2].to_string();
        let action = caps[3].to_string();

        let mode = table.unwrap_or_else(|| "prefix".to_string());
        let use_prefix = mode == "prefix";
        let display_keys = if use_prefix {
            format!("{prefix} {key}")
        } else {
            key.clone()
        };
        let normalized = chord::normalize_tmux(&key, use_prefix);

        let description = describe::first_match(describe::TMUX_RULES, &action)
            .map(str::to_string)
            .unwrap_or_else(|| action.clone());

        bindings.push(
            Binding::new("tmux", seq, display_keys, normalized, action, description)
                .with_mode(mode),
        );
        seq += 1;
    }

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_directive_changes_display_form() {
        let content = "\
set -g prefix C-b
bind c new-window
bind | split-window -h
";
        let bindings = parse(content);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].keys, "C-b c");
        assert_eq!(bindings[0].normalized_keys, "prefix+c");
        assert_eq!(bindings[0].mode.as_deref(), Some("prefix"));
        assert_eq!(bindings[1].description, "Split pane");
    }

    #[test]
    fn default_prefix_applies_before_directive() {
        let bindings = parse("bind x kill-pane\n");
        assert_eq!(bindings[0].keys, "C-a x");
    }

    #[test]
    fn table_scoped_binding_uses_table_as_mode() {
        let content = "bind -T copy-mode-vi y send -X copy-selection\n";
        let bindings = parse(content);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].mode.as_deref(), Some("copy-mode-vi"));
        // Not prefix-scoped: no prefix pseudo-modifier, bare key display.
        assert_eq!(bindings[0].keys, "y");
        assert_eq!(bindings[0].normalized_keys, "y");
        assert_eq!(bindings[0].description, "Copy selection");
    }

    #[test]
    fn repeatable_and_long_form_bind() {
        let content = "bind-key -r H resize-pane -L 5\n";
        let bindings = parse(content);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].normalized_keys, "prefix+shift+h");
        assert_eq!(bindings[0].description, "Resize pane");
    }

    #[test]
    fn ctrl_key_in_prefix_table() {
        let bindings = parse("bind C-o rotate-window\n");
        assert_eq!(bindings[0].normalized_keys, "ctrl+prefix+o");
    }

    #[test]
    fn comments_and_other_directives_skipped() {
        let content = "# bind x kill-pane\nset -g mouse on\nsetw -g mode-keys vi\n";
        assert!(parse(content).is_empty());
    }
}
