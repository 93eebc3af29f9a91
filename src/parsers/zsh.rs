//! zsh alias / bindkey extractor.
//!
//! Two independent line patterns, each line matching at most one:
//! `alias name="command"` and `bindkey "^X" widget`. Alias descriptions
//! are the command truncated to 50 characters.

use std::sync::OnceLock;

use regex::Regex;

use crate::chord;

use super::types::Binding;

const ALIAS_DESCRIPTION_LIMIT: usize = 50;

fn alias_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^alias\s+([^=]+)=["'](.+)["']"#).expect("valid alias regex"))
}

fn bindkey_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^bindkey\s+["']([^"']+)["']\s+(\S+)"#).expect("valid bindkey regex")
    })
}

fn alias_description(command: &str) -> String {
    if command.len() > ALIAS_DESCRIPTION_LIMIT {
        let truncated: String = command.chars().take(ALIAS_DESCRIPTION_LIMIT).collect();
        format!("Alias: {truncated}...")
    } else {
        format!("Alias: {command}")
    }
}

pub fn parse(content: &str) -> Vec<Binding> {
    let mut bindings = Vec::new();
    let mut seq = 0usize;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(caps) = alias_re().captures(trimmed) {
            let name = caps[1].trim().to_string();
            let command = caps[2].to_string();
            let normalized = name.to_lowercase();
            let description = alias_description(&command);
            bindings.push(Binding::new("zsh", seq, name, normalized, command, description));
            seq += 1;
            continue;
        }

        if let Some(caps) = bindkey_re().captures(trimmed) {
            let keys = caps[1].to_string();
            let action = caps[2].to_string();
            let normalized = chord::normalize_zsh_bindkey(&keys);
            bindings.push(Binding::new(
                "zsh",
                seq,
                keys,
                normalized,
                action.clone(),
                action,
            ));
            seq += 1;
        }
    }

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_and_bindkeys() {
        let content = r#"
# shortcuts
alias gs="git status"
alias ll='ls -la'
bindkey "^R" history-incremental-search-backward
"#;
        let bindings = parse(content);
        assert_eq!(bindings.len(), 3);

        assert_eq!(bindings[0].keys, "gs");
        assert_eq!(bindings[0].normalized_keys, "gs");
        assert_eq!(bindings[0].action, "git status");
        assert_eq!(bindings[0].description, "Alias: git status");

        assert_eq!(bindings[1].action, "ls -la");

        assert_eq!(bindings[2].keys, "^R");
        assert_eq!(bindings[2].normalized_keys, "ctrl+r");
        assert_eq!(bindings[2].action, "history-incremental-search-backward");
        assert_eq!(bindings[2].description, bindings[2].action);
    }

    #[test]
    fn long_alias_description_truncates() {
        let command = "a".repeat(80);
        let content = format!("alias big=\"{command}\"");
        let bindings = parse(&content);
        assert_eq!(bindings.len(), 1);
        assert_eq!(
            bindings[0].description,
            format!("Alias: {}...", "a".repeat(50))
        );
    }

    #[test]
    fn line_matches_at_most_one_pattern() {
        // An alias line never also counts as a bindkey line.
        let bindings = parse("alias bindkey=\"echo nope\"\n");
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].keys, "bindkey");
    }

    #[test]
    fn non_matching_lines_skipped() {
        let content = "export PATH=$PATH:/usr/local/bin\nsetopt autocd\n";
        assert!(parse(content).is_empty());
    }
}
