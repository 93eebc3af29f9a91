//! Hammerspoon init.lua extractor.
//!
//! Call-based dialect: two separate regex passes over the same text, one
//! for `hs.hotkey.bind({"cmd","alt"}, "key", ...)` and one for the
//! `hs.hotkey.new(...)` + `:enable()` shape. A file may contribute
//! bindings from both passes.

use std::sync::OnceLock;

use regex::Regex;

use crate::chord;

use super::types::Binding;

fn bind_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"hs\.hotkey\.bind\s*\(\s*\{([^}]*)\}\s*,\s*["']([^"']+)["']\s*,\s*(?:["']([^"']+)["']|function|(\w+))"#,
        )
        .expect("valid hammerspoon bind regex")
    })
}

fn new_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"hs\.hotkey\.new\s*\(\s*\{([^}]*)\}\s*,\s*["']([^"']+)["']"#)
            .expect("valid hammerspoon new regex")
    })
}

/// Split a lua modifier list (`"cmd", 'alt'`) into bare tokens.
fn split_modifiers(list: &str) -> Vec<String> {
    list.split(',')
        .map(|m| m.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

fn display_keys(mods: &[String], key: &str) -> String {
    let mut parts: Vec<&str> = mods.iter().map(String::as_str).collect();
    parts.push(key);
    parts.join(" + ")
}

pub fn parse(content: &str) -> Vec<Binding> {
    let mut bindings = Vec::new();
    let mut seq = 0usize;

    for caps in bind_re().captures_iter(content) {
        let mods = split_modifiers(&caps[1]);
        let key = caps[2].to_string();
        let explicit_description = caps.get(3).map(|m| m.as_str().to_string());
        let func_name = caps.get(4).map(|m| m.as_str().to_string());

        let keys = display_keys(&mods, &key);
        let normalized = chord::canonicalize_tokens(
            mods.iter().map(String::as_str).chain(std::iter::once(key.as_str())),
        );
        let action = func_name.clone().unwrap_or_else(|| "function".to_string());
        let description = explicit_description
            .or(func_name)
            .unwrap_or_else(|| "Hotkey action".to_string());

        bindings.push(Binding::new(
            "hammerspoon",
            seq,
            keys,
            normalized,
            action,
            description,
        ));
        seq += 1;
    }

    for caps in new_re().captures_iter(content) {
        let mods = split_modifiers(&caps[1]);
        let key = caps[2].to_string();

        let keys = display_keys(&mods, &key);
        let normalized = chord::canonicalize_tokens(
            mods.iter().map(String::as_str).chain(std::iter::once(key.as_str())),
        );

        bindings.push(Binding::new(
            "hammerspoon",
            seq,
            keys,
            normalized,
            "hotkey",
            "Hammerspoon hotkey",
        ));
        seq += 1;
    }

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bind_calls() {
        let content = r#"
hs.hotkey.bind({"cmd", "alt"}, "r", "Reload config", function()
  hs.reload()
end)
hs.hotkey.bind({"shift", "cmd"}, "a", toggleTerminal)
"#;
        let bindings = parse(content);
        assert_eq!(bindings.len(), 2);

        assert_eq!(bindings[0].keys, "cmd + alt + r");
        assert_eq!(bindings[0].normalized_keys, "alt+cmd+r");
        assert_eq!(bindings[0].description, "Reload config");
        assert_eq!(bindings[0].action, "function");

        assert_eq!(bindings[1].normalized_keys, "cmd+shift+a");
        assert_eq!(bindings[1].action, "toggleTerminal");
        assert_eq!(bindings[1].description, "toggleTerminal");
    }

    #[test]
    fn anonymous_function_gets_placeholder_description() {
        let content = r#"hs.hotkey.bind({"cmd"}, "k", function() end)"#;
        let bindings = parse(content);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].action, "function");
        assert_eq!(bindings[0].description, "Hotkey action");
    }

    #[test]
    fn new_and_bind_passes_both_contribute() {
        let content = r#"
hs.hotkey.bind({"cmd"}, "j", "Jump")
local k = hs.hotkey.new({'ctrl'}, 'x', doThing)
k:enable()
"#;
        let bindings = parse(content);
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].id, "hammerspoon-0");
        assert_eq!(bindings[1].id, "hammerspoon-1");
        assert_eq!(bindings[1].normalized_keys, "ctrl+x");
        assert_eq!(bindings[1].action, "hotkey");
        assert_eq!(bindings[1].description, "Hammerspoon hotkey");
    }

    #[test]
    fn no_hotkeys_yields_empty() {
        assert!(parse("print('hello')").is_empty());
    }
}
