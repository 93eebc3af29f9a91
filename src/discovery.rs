//! Setup-time discovery of well-known config file locations.
//!
//! Discovery is an explicit operation (first-run setup or `discover`), not
//! part of a sync pass: sync resolves declared paths only and never globs.
//! Each builtin dialect has a small table of glob patterns checked under
//! every search root; matches are deduplicated across roots and turned into
//! enabled source declarations.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::{BuiltinKind, SourceConfig};
use crate::resolver::expand_path;

/// Well-known locations per builtin dialect, relative to a search root.
pub const BUILTIN_PATTERNS: &[(BuiltinKind, &str)] = &[
    (BuiltinKind::Skhd, "**/skhd/skhdrc"),
    (BuiltinKind::Skhd, "**/.skhdrc"),
    (BuiltinKind::Tmux, "**/tmux/.tmux.conf"),
    (BuiltinKind::Tmux, "**/tmux/tmux.conf"),
    (BuiltinKind::Tmux, "**/.tmux.conf"),
    (BuiltinKind::NvimKeymap, "**/nvim/lua/**/keymaps.lua"),
    (BuiltinKind::NvimKeymap, "**/nvim/lua/**/keys.lua"),
    (BuiltinKind::Karabiner, "**/.config/karabiner/karabiner.json"),
    (BuiltinKind::Karabiner, "**/karabiner/karabiner.json"),
    (BuiltinKind::ZshAlias, "**/.zshrc"),
    (BuiltinKind::ZshAlias, "**/zsh/.zshrc"),
    (BuiltinKind::Hammerspoon, "**/.hammerspoon/init.lua"),
    (BuiltinKind::Hammerspoon, "**/hammerspoon/init.lua"),
];

/// Scan the given search roots for well-known config files and return one
/// enabled source declaration per distinct file found.
pub fn discover_sources(search_paths: &[String]) -> Vec<SourceConfig> {
    let mut discovered = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for search_path in search_paths {
        let root = expand_path(search_path);
        if !root.exists() {
            debug!(path = %root.display(), "Search root does not exist, skipping");
            continue;
        }

        for &(kind, pattern) in BUILTIN_PATTERNS {
            let full_pattern = format!("{}/{}", root.display(), pattern);
            let paths = match glob::glob(&full_pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(error = %e, pattern = %full_pattern, "Bad discovery pattern");
                    continue;
                }
            };

            for entry in paths {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        debug!(error = %e, "Unreadable path during discovery");
                        continue;
                    }
                };
                if !path.is_file() {
                    continue;
                }
                let display = path.display().to_string();
                if seen.insert(display.clone()) {
                    discovered.push(kind.source(display));
                }
            }
        }
    }

    debug!(count = discovered.len(), "Discovery finished");
    discovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_well_known_files_under_a_root() {
        let dir = tempfile::tempdir().unwrap();
        let skhd_dir = dir.path().join("skhd");
        fs::create_dir_all(&skhd_dir).unwrap();
        fs::write(skhd_dir.join("skhdrc"), "cmd - a : open -a Terminal\n").unwrap();
        fs::write(dir.path().join(".tmux.conf"), "bind c new-window\n").unwrap();

        let sources = discover_sources(&[dir.path().display().to_string()]);
        let mut tools: Vec<_> = sources.iter().map(|s| s.tool_name()).collect();
        tools.sort_unstable();
        assert_eq!(tools, vec!["skhd", "tmux"]);
        assert!(sources.iter().all(|s| s.enabled()));
    }

    #[test]
    fn deduplicates_across_overlapping_roots() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".zshrc"), "alias gs='git status'\n").unwrap();

        let root = dir.path().display().to_string();
        let sources = discover_sources(&[root.clone(), root]);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].tool_name(), "zsh");
    }

    #[test]
    fn nested_nvim_keymaps_match() {
        let dir = tempfile::tempdir().unwrap();
        let lua = dir.path().join("nvim").join("lua").join("user");
        fs::create_dir_all(&lua).unwrap();
        fs::write(lua.join("keymaps.lua"), "vim.keymap.set('n', '<leader>w', ':w<CR>')\n")
            .unwrap();

        let sources = discover_sources(&[dir.path().display().to_string()]);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].tool_name(), "nvim");
    }

    #[test]
    fn missing_root_yields_nothing() {
        let sources = discover_sources(&["/nonexistent/keybee/root".to_string()]);
        assert!(sources.is_empty());
    }
}
