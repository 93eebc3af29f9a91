//! Key-chord canonicalization.
//!
//! Every extractor reports key expressions in its own dialect (`cmd + shift - a`,
//! `<C-x>`, `C-b`, `left_command`). Conflict detection only works if all of
//! them collapse to one comparable representation, so this module maps each
//! raw expression to a canonical chord string:
//!
//! - modifiers drawn from a closed vocabulary (`alt`, `cmd`, `ctrl`, `shift`,
//!   plus the pseudo-modifiers `leader` and `prefix`)
//! - modifiers sorted lexicographically, terminal key lower-cased
//! - joined with a single `+`
//!
//! Normalization is pure, deterministic, and never fails: malformed input
//! degrades to a best-effort canonical string, and an unrecognized modifier
//! token is folded into the terminal key rather than dropped.

use std::collections::BTreeSet;

/// Closed modifier vocabulary. Variant order is the lexicographic order of
/// the canonical spellings, so a sorted `BTreeSet<Modifier>` iterates in
/// canonical output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Modifier {
    Alt,
    Cmd,
    Ctrl,
    Leader,
    Prefix,
    Shift,
}

impl Modifier {
    pub fn name(self) -> &'static str {
        match self {
            Modifier::Alt => "alt",
            Modifier::Cmd => "cmd",
            Modifier::Ctrl => "ctrl",
            Modifier::Leader => "leader",
            Modifier::Prefix => "prefix",
            Modifier::Shift => "shift",
        }
    }
}

/// Map one modifier spelling to the closed vocabulary. Case-insensitive.
/// Returns None for anything that is not a recognized modifier.
pub fn map_modifier(token: &str) -> Option<Modifier> {
    match token.to_lowercase().as_str() {
        "ctrl" | "control" | "left_control" | "right_control" => Some(Modifier::Ctrl),
        "alt" | "opt" | "option" | "left_alt" | "right_alt" | "left_option" | "right_option" => {
            Some(Modifier::Alt)
        }
        "cmd" | "command" | "meta" | "super" | "left_command" | "right_command" | "left_gui"
        | "right_gui" => Some(Modifier::Cmd),
        "shift" | "left_shift" | "right_shift" => Some(Modifier::Shift),
        "leader" => Some(Modifier::Leader),
        "prefix" => Some(Modifier::Prefix),
        _ => None,
    }
}

/// Assemble the canonical string from an already-split modifier set and
/// terminal key. Applies the implicit-shift rule: a bare single uppercase
/// letter means `shift` even when the dialect never wrote the modifier.
pub fn canonicalize_parts(mods: &BTreeSet<Modifier>, key: &str) -> String {
    let key = key.trim();
    let mut mods = mods.clone();

    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_uppercase() {
            mods.insert(Modifier::Shift);
        }
    }

    let mut parts: Vec<String> = mods.iter().map(|m| m.name().to_string()).collect();
    parts.push(key.to_lowercase());
    parts.join("+")
}

/// Canonicalize a pre-tokenized chord. All tokens but the last are modifier
/// candidates; tokens that do not match the vocabulary are kept as part of
/// the terminal key so nothing the user wrote is silently lost.
pub fn canonicalize_tokens<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens: Vec<&str> = tokens
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let Some((&terminal, leading)) = tokens.split_last() else {
        return String::new();
    };

    let mut mods = BTreeSet::new();
    let mut key_parts: Vec<&str> = Vec::new();
    for token in leading {
        match map_modifier(token) {
            Some(m) => {
                mods.insert(m);
            }
            None => key_parts.push(token),
        }
    }
    key_parts.push(terminal);

    if key_parts.len() == 1 {
        canonicalize_parts(&mods, key_parts[0])
    } else {
        // Unknown tokens folded into the terminal key; no implicit shift
        // since this is no longer a single bare letter.
        let mut parts: Vec<String> = mods.iter().map(|m| m.name().to_string()).collect();
        parts.extend(key_parts.iter().map(|p| p.to_lowercase()));
        parts.join("+")
    }
}

/// Normalize a `+`/`-`/whitespace separated chord (skhd, hammerspoon,
/// karabiner display forms, custom sources).
pub fn normalize_separated(raw: &str) -> String {
    let tokens: Vec<&str> = raw
        .split(|c: char| c == '+' || c == '-' || c.is_whitespace())
        .filter(|t| !t.trim().is_empty())
        .collect();
    if tokens.is_empty() {
        // The whole expression was separators ("-" bound as a key).
        return raw.trim().to_lowercase();
    }
    canonicalize_tokens(tokens)
}

/// Normalize vim bracket notation: `<leader>w`, `<C-x>`, `<M-j>`, `<S-Tab>`,
/// `<D-s>`, plus the named keys `<CR>`, `<Esc>`, `<Tab>`, `<Space>`.
pub fn normalize_vim(raw: &str) -> String {
    let mut mods = BTreeSet::new();
    let mut key = String::new();

    let mut rest = raw.trim();
    while !rest.is_empty() {
        if let Some(open) = rest.strip_prefix('<') {
            if let Some(end) = open.find('>') {
                let inner = &open[..end];
                rest = &open[end + 1..];
                let lowered = inner.to_lowercase();
                match lowered.as_str() {
                    "leader" => {
                        mods.insert(Modifier::Leader);
                    }
                    "cr" | "enter" | "return" => key.push_str("enter"),
                    "esc" => key.push_str("escape"),
                    "tab" => key.push_str("tab"),
                    "space" => key.push_str("space"),
                    "bs" => key.push_str("backspace"),
                    _ => {
                        // <X-key> modifier forms, possibly stacked (<C-M-k>)
                        let mut inner = lowered.as_str();
                        let mut matched = false;
                        loop {
                            let step = inner
                                .strip_prefix("c-")
                                .map(|k| (Modifier::Ctrl, k))
                                .or_else(|| inner.strip_prefix("m-").map(|k| (Modifier::Alt, k)))
                                .or_else(|| inner.strip_prefix("a-").map(|k| (Modifier::Alt, k)))
                                .or_else(|| inner.strip_prefix("s-").map(|k| (Modifier::Shift, k)))
                                .or_else(|| inner.strip_prefix("d-").map(|k| (Modifier::Cmd, k)));
                            match step {
                                Some((m, k)) if !k.is_empty() => {
                                    mods.insert(m);
                                    inner = k;
                                    matched = true;
                                }
                                _ => break,
                            }
                        }
                        if matched {
                            key.push_str(inner);
                        } else {
                            // Unknown bracket token: keep it verbatim.
                            key.push_str(&lowered);
                        }
                    }
                }
                continue;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            key.push(c);
        }
        rest = chars.as_str();
    }

    canonicalize_parts(&mods, &key)
}

/// Normalize a tmux key (`C-b`, `M-Left`, `S`), optionally folding the
/// prefix table into the chord as the `prefix` pseudo-modifier.
pub fn normalize_tmux(key: &str, with_prefix: bool) -> String {
    let mut mods = BTreeSet::new();
    if with_prefix {
        mods.insert(Modifier::Prefix);
    }

    let mut rest = key.trim();
    loop {
        let lowered = rest.to_lowercase();
        if lowered.starts_with("c-") && rest.len() > 2 {
            mods.insert(Modifier::Ctrl);
            rest = &rest[2..];
        } else if lowered.starts_with("m-") && rest.len() > 2 {
            mods.insert(Modifier::Alt);
            rest = &rest[2..];
        } else if lowered.starts_with("s-") && rest.len() > 2 {
            mods.insert(Modifier::Shift);
            rest = &rest[2..];
        } else {
            break;
        }
    }

    canonicalize_parts(&mods, rest)
}

/// Normalize a zsh `bindkey` expression: a leading caret is the ctrl
/// spelling (`^X` is ctrl+x). Anything else lower-cases verbatim.
pub fn normalize_zsh_bindkey(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('^') {
        if !rest.is_empty() {
            let mut mods = BTreeSet::new();
            mods.insert(Modifier::Ctrl);
            // Caret notation writes the letter uppercase, but ^R is
            // ctrl+r, not a shifted key.
            return canonicalize_parts(&mods, &rest.to_lowercase());
        }
    }
    trimmed.to_lowercase()
}

/// Normalize a raw key expression for the given tool. Dispatches to the
/// dialect-specific tokenizer; unknown tools use the separator convention.
pub fn normalize(tool: &str, raw: &str) -> String {
    match tool {
        "nvim" => normalize_vim(raw),
        "tmux" => {
            // Display form is "<prefix> <key>" for prefix-table bindings;
            // the parser folds the prefix in, so a bare expression here is
            // normalized without it.
            normalize_tmux(raw, false)
        }
        "zsh" => {
            if raw.trim_start().starts_with('^') {
                normalize_zsh_bindkey(raw)
            } else {
                raw.trim().to_lowercase()
            }
        }
        _ => normalize_separated(raw),
    }
}
