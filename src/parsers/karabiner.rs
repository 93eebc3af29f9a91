//! Karabiner-Elements remapper extractor.
//!
//! Structured-data dialect: the file is parsed as JSON, not scanned by
//! regex. Walks profiles -> complex-modification rules -> manipulators,
//! keeping only the "basic" mapping type. The enclosing profile name
//! becomes the binding mode. An unparseable file yields zero bindings.

use serde::Deserialize;
use tracing::debug;

use crate::chord;

use super::types::Binding;

const SHELL_ACTION_PREVIEW: usize = 30;

#[derive(Debug, Deserialize)]
struct KarabinerConfig {
    #[serde(default)]
    profiles: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    name: String,
    complex_modifications: Option<ComplexModifications>,
}

#[derive(Debug, Deserialize)]
struct ComplexModifications {
    #[serde(default)]
    rules: Vec<Rule>,
}

#[derive(Debug, Deserialize)]
struct Rule {
    #[serde(default)]
    description: String,
    #[serde(default)]
    manipulators: Vec<Manipulator>,
}

#[derive(Debug, Deserialize)]
struct Manipulator {
    #[serde(rename = "type", default)]
    kind: String,
    from: Option<FromKey>,
    to: Option<Vec<ToEvent>>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FromKey {
    key_code: Option<String>,
    modifiers: Option<FromModifiers>,
}

#[derive(Debug, Deserialize)]
struct FromModifiers {
    #[serde(default)]
    mandatory: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ToEvent {
    key_code: Option<String>,
    shell_command: Option<String>,
}

/// Display form: mandatory modifiers + key code joined with " + ".
fn format_keys(from: &FromKey) -> (String, Vec<String>) {
    let mut tokens: Vec<String> = from
        .modifiers
        .as_ref()
        .map(|m| m.mandatory.clone())
        .unwrap_or_default();
    if let Some(key) = &from.key_code {
        tokens.push(key.clone());
    }
    (tokens.join(" + "), tokens)
}

fn format_action(to: Option<&[ToEvent]>) -> String {
    let Some(events) = to.filter(|e| !e.is_empty()) else {
        return "No action".to_string();
    };
    events
        .iter()
        .map(|event| {
            if let Some(cmd) = &event.shell_command {
                let preview: String = cmd.chars().take(SHELL_ACTION_PREVIEW).collect();
                format!("Shell: {preview}...")
            } else if let Some(key) = &event.key_code {
                key.clone()
            } else {
                "Unknown".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn parse(content: &str) -> Vec<Binding> {
    let config: KarabinerConfig = match serde_json::from_str(content) {
        Ok(config) => config,
        Err(e) => {
            debug!(error = %e, "Invalid karabiner JSON, skipping file");
            return Vec::new();
        }
    };

    let mut bindings = Vec::new();
    let mut seq = 0usize;

    for profile in &config.profiles {
        let rules = profile
            .complex_modifications
            .as_ref()
            .map(|c| c.rules.as_slice())
            .unwrap_or_default();

        for rule in rules {
            for manipulator in &rule.manipulators {
                if manipulator.kind != "basic" {
                    continue;
                }
                let Some(from) = &manipulator.from else {
                    continue;
                };
                let (keys, tokens) = format_keys(from);
                if keys.is_empty() {
                    continue;
                }

                let normalized =
                    chord::canonicalize_tokens(tokens.iter().map(String::as_str));
                let action = format_action(manipulator.to.as_deref());
                let description = manipulator
                    .description
                    .clone()
                    .unwrap_or_else(|| rule.description.clone());

                bindings.push(
                    Binding::new("karabiner", seq, keys, normalized, action, description)
                        .with_mode(profile.name.clone()),
                );
                seq += 1;
            }
        }
    }

    bindings
}
