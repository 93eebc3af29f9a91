//! Best-effort human-readable description inference.
//!
//! Each dialect owns an ordered `(substring, label)` rule table evaluated
//! first-match-wins against the raw action string. These are heuristics,
//! deliberately isolated from extraction logic so new rules can be added
//! without touching the extractors. An action matching no rule falls back
//! to the raw action text at the call site.

/// yabai window-manager commands (skhd actions).
pub const YABAI_RULES: &[(&str, &str)] = &[
    ("--focus", "Focus window/display"),
    ("--resize", "Resize window"),
    ("--swap", "Swap windows"),
    ("--toggle", "Toggle window state"),
    ("--layout", "Change layout"),
    ("--balance", "Balance windows"),
    ("--move", "Move window"),
    ("--display", "Move to display"),
    ("--rotate", "Rotate layout"),
    ("--mirror", "Mirror layout"),
];

/// cliclick mouse-automation commands (skhd actions).
pub const CLICLICK_RULES: &[(&str, &str)] = &[
    ("m:", "Move cursor"),
    ("dc:", "Double click"),
    ("rc:", "Right click"),
    ("c:", "Click"),
];

/// tmux commands.
pub const TMUX_RULES: &[(&str, &str)] = &[
    ("split-window", "Split pane"),
    ("resize-pane", "Resize pane"),
    ("select-layout", "Change layout"),
    ("swap-window", "Swap windows"),
    ("swap-pane", "Swap panes"),
    ("last-window", "Go to last window"),
    ("source-file", "Reload config"),
    ("command-prompt", "Command prompt"),
    ("copy-selection", "Copy selection"),
    ("begin-selection", "Begin selection"),
];

/// First label whose substring occurs in `action`, if any.
pub fn first_match(rules: &[(&str, &'static str)], action: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|(needle, _)| action.contains(needle))
        .map(|&(_, label)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins_in_rule_order() {
        // "--toggle" appears before "--balance" in the table; an action
        // containing both gets the earlier label.
        let action = "yabai -m window --toggle float; yabai -m space --balance";
        assert_eq!(first_match(YABAI_RULES, action), Some("Toggle window state"));
    }

    #[test]
    fn unmatched_action_yields_none() {
        assert_eq!(first_match(TMUX_RULES, "display-message hello"), None);
    }
}
