//! skhd hotkey-daemon config extractor.
//!
//! One binding per `keys : action` line; `#` comments and blank lines are
//! skipped. Descriptions are inferred from recognizable yabai/cliclick
//! substrings in the action, falling back to the raw action text.

use std::sync::OnceLock;

use regex::Regex;

use crate::chord;

use super::describe;
use super::types::Binding;

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^:]+?)\s*:\s*(.+)$").expect("valid skhd line regex"))
}

pub fn parse(content: &str) -> Vec<Binding> {
    let mut bindings = Vec::new();
    let mut seq = 0usize;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some(caps) = line_re().captures(trimmed) else {
            continue;
        };
        let keys = caps[1].trim().to_string();
        let action = caps[2].trim().to_string();

        let description = if action.contains("yabai") {
            describe::first_match(describe::YABAI_RULES, &action)
        } else if action.contains("cliclick") {
            describe::first_match(describe::CLICLICK_RULES, &action)
        } else {
            None
        }
        .map(str::to_string)
        .unwrap_or_else(|| action.clone());

        let normalized = chord::normalize("skhd", &keys);
        bindings.push(Binding::new("skhd", seq, keys, normalized, action, description));
        seq += 1;
    }

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_lines() {
        let content = "\
# window focus
cmd - h : yabai -m window --focus west
cmd + shift - a : open_terminal

alt - f : yabai -m window --toggle zoom-fullscreen
";
        let bindings = parse(content);
        assert_eq!(bindings.len(), 3);

        assert_eq!(bindings[0].keys, "cmd - h");
        assert_eq!(bindings[0].normalized_keys, "cmd+h");
        assert_eq!(bindings[0].description, "Focus window/display");
        assert_eq!(bindings[0].tool, "skhd");
        assert_eq!(bindings[0].id, "skhd-0");
        assert!(bindings[0].mode.is_none());

        assert_eq!(bindings[1].keys, "cmd + shift - a");
        assert_eq!(bindings[1].normalized_keys, "cmd+shift+a");
        assert_eq!(bindings[1].action, "open_terminal");
        // No heuristic match: description falls back to the action.
        assert_eq!(bindings[1].description, "open_terminal");

        assert_eq!(bindings[2].description, "Toggle window state");
    }

    #[test]
    fn cliclick_description_inference() {
        let bindings = parse("ctrl - m : cliclick m:+0,+50");
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].description, "Move cursor");
    }

    #[test]
    fn skips_malformed_lines() {
        let content = "not a binding line\ncmd - x : do_thing\n";
        let bindings = parse(content);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].action, "do_thing");
    }

    #[test]
    fn preserves_source_order() {
        let content = "cmd - a : one\ncmd - b : two\ncmd - c : three\n";
        let actions: Vec<_> = parse(content).into_iter().map(|b| b.action).collect();
        assert_eq!(actions, vec!["one", "two", "three"]);
    }
}
