//! Neovim keymap extractor.
//!
//! Matches `vim.keymap.set("n", "<leader>w", ...)` call sites across the
//! whole file text. Single-letter mode abbreviations map to their spelled
//! out names; an unrecognized mode string is kept verbatim. The optional
//! `desc = "..."` table field becomes the description.

use std::sync::OnceLock;

use regex::Regex;

use crate::chord;

use super::types::Binding;

fn keymap_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"keymap\.set\(\s*["']([^"']+)["']\s*,\s*["']([^"']+)["']\s*,\s*(?:["']([^"']+)["']|[^,]+)\s*,?\s*(?:\{[^}]*desc\s*=\s*["']([^"']+)["'][^}]*\})?"#,
        )
        .expect("valid nvim keymap regex")
    })
}

fn mode_name(abbrev: &str) -> &str {
    match abbrev {
        "n" => "normal",
        "i" => "insert",
        "v" | "x" => "visual",
        "c" => "command",
        "t" => "terminal",
        other => other,
    }
}

pub fn parse(content: &str) -> Vec<Binding> {
    let mut bindings = Vec::new();

    for (seq, caps) in keymap_re().captures_iter(content).enumerate() {
        let mode = &caps[1];
        let keys = caps[2].to_string();
        let action = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "function".to_string());
        let description = caps
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| action.clone());

        let normalized = chord::normalize_vim(&keys);
        bindings.push(
            Binding::new("nvim", seq, keys, normalized, action, description)
                .with_mode(mode_name(mode)),
        );
    }

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keymap_set_calls() {
        let content = r#"
local keymap = vim.keymap
keymap.set("n", "<leader>w", ":w<CR>", { desc = "Save file" })
keymap.set("n", "<C-h>", "<C-w>h")
keymap.set("v", "<", "<gv", { desc = "Indent left" })
"#;
        let bindings = parse(content);
        assert_eq!(bindings.len(), 3);

        assert_eq!(bindings[0].keys, "<leader>w");
        assert_eq!(bindings[0].normalized_keys, "leader+w");
        assert_eq!(bindings[0].description, "Save file");
        assert_eq!(bindings[0].mode.as_deref(), Some("normal"));

        assert_eq!(bindings[1].normalized_keys, "ctrl+h");
        // No desc table: description falls back to the action.
        assert_eq!(bindings[1].description, "<C-w>h");

        assert_eq!(bindings[2].mode.as_deref(), Some("visual"));
    }

    #[test]
    fn function_action_has_placeholder() {
        let content = r#"keymap.set("n", "<leader>f", function() print("hi") end)"#;
        let bindings = parse(content);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].action, "function");
    }

    #[test]
    fn unknown_mode_kept_verbatim() {
        let content = r#"keymap.set("o", "ib", ":<C-u>norm! vib<CR>")"#;
        let bindings = parse(content);
        assert_eq!(bindings[0].mode.as_deref(), Some("o"));
    }

    #[test]
    fn no_matches_yields_empty() {
        assert!(parse("-- just a comment\nreturn {}\n").is_empty());
    }
}
