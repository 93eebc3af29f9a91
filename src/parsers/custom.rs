//! User-defined regex source extractor.
//!
//! The single user-supplied pattern is applied per non-comment line with
//! 1-based capture-group indices picking out key/action/description/mode.
//! A line that does not match, or whose key group is empty, is skipped.
//! A pattern that fails to compile is a configuration error surfaced to
//! the caller, not a per-file parse failure.

use regex::Regex;

use crate::chord;
use crate::config::CustomParserConfig;
use crate::error::{KeybeeError, Result};

use super::types::Binding;

pub fn parse(content: &str, config: &CustomParserConfig) -> Result<Vec<Binding>> {
    let regex = Regex::new(&config.pattern).map_err(|e| KeybeeError::InvalidPattern {
        name: config.name.clone(),
        source: e,
    })?;
    let comment_prefix = config.comment_prefix();

    let mut bindings = Vec::new();
    let mut seq = 0usize;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(comment_prefix) {
            continue;
        }

        let Some(caps) = regex.captures(trimmed) else {
            continue;
        };

        let group = |idx: usize| caps.get(idx).map(|m| m.as_str().to_string());
        let keys = group(config.key_group).unwrap_or_default();
        if keys.is_empty() {
            continue;
        }
        let action = group(config.action_group).unwrap_or_default();
        let description = config
            .description_group
            .and_then(group)
            .unwrap_or_else(|| action.clone());
        let mode = config.mode_group.and_then(group);

        let normalized = chord::normalize_separated(&keys);
        let mut binding = Binding::new(&config.name, seq, keys, normalized, action, description);
        binding.mode = mode;
        bindings.push(binding);
        seq += 1;
    }

    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pattern: &str) -> CustomParserConfig {
        CustomParserConfig {
            name: "mytool".to_string(),
            path: "~/.mytoolrc".to_string(),
            pattern: pattern.to_string(),
            key_group: 1,
            action_group: 2,
            description_group: None,
            mode_group: None,
            comment_prefix: None,
            color: None,
        }
    }

    #[test]
    fn arrow_pattern_extracts_one_binding() {
        let bindings = parse("F5 => rebuild\n", &config(r"^(\S+)\s*=>\s*(.+)$")).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].keys, "F5");
        assert_eq!(bindings[0].action, "rebuild");
        assert_eq!(bindings[0].normalized_keys, "f5");
        assert_eq!(bindings[0].tool, "mytool");
        assert_eq!(bindings[0].description, "rebuild");
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let err = parse("anything", &config("([unclosed")).unwrap_err();
        assert!(matches!(err, KeybeeError::InvalidPattern { ref name, .. } if name == "mytool"));
    }

    #[test]
    fn comment_prefix_and_empty_key_skip_lines() {
        let mut cfg = config(r"^(\S*)\s*=>\s*(.+)$");
        cfg.comment_prefix = Some(";".to_string());
        let content = "; a comment\nF5 => rebuild\n => no key here\n";
        let bindings = parse(content, &cfg).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].keys, "F5");
    }

    #[test]
    fn optional_description_and_mode_groups() {
        let mut cfg = config(r"^(\S+)\s*=>\s*(\S+)\s*#\s*(\S+)\s+(.+)$");
        cfg.description_group = Some(4);
        cfg.mode_group = Some(3);
        // comment prefix kept distinct from the in-pattern '#'
        cfg.comment_prefix = Some(";".to_string());
        let bindings = parse("ctrl+b => build # dev Build the tree\n", &cfg).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].mode.as_deref(), Some("dev"));
        assert_eq!(bindings[0].description, "Build the tree");
        assert_eq!(bindings[0].normalized_keys, "ctrl+b");
    }

    #[test]
    fn non_matching_lines_skipped() {
        let bindings = parse("nothing to see\nF1 => help\n", &config(r"^(\S+)\s*=>\s*(.+)$"))
            .unwrap();
        assert_eq!(bindings.len(), 1);
    }
}
