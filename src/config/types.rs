//! Configuration type definitions.
//!
//! A `SourceConfig` is a closed tagged variant: one variant per builtin
//! dialect plus `custom` for user-authored regex sources. Adding a dialect
//! means adding one variant here and one extractor function, never
//! subclassing.

use serde::{Deserialize, Serialize};

use super::defaults::*;

// ============================================
// SOURCE DECLARATIONS
// ============================================

/// A builtin source declaration: the variant tag selects the extractor,
/// `path` is absolute, home-relative, or relative to the base search roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltinSource {
    pub path: String,
    /// `Some(false)` skips this source entirely during sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl BuiltinSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            enabled: Some(true),
        }
    }
}

/// A user-authored regex standing in for a format extractor.
/// Capture group indices are 1-based into the supplied pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomParserConfig {
    pub name: String,
    pub path: String,
    pub pattern: String,
    pub key_group: usize,
    pub action_group: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_group: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_group: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CustomParserConfig {
    pub fn comment_prefix(&self) -> &str {
        self.comment_prefix.as_deref().unwrap_or(DEFAULT_COMMENT_PREFIX)
    }
}

/// One declared source: where to look and which extractor to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourceConfig {
    Skhd(BuiltinSource),
    Tmux(BuiltinSource),
    #[serde(rename = "nvim-keymap")]
    NvimKeymap(BuiltinSource),
    #[serde(rename = "zsh-alias")]
    ZshAlias(BuiltinSource),
    Karabiner(BuiltinSource),
    Hammerspoon(BuiltinSource),
    Custom(CustomParserConfig),
}

impl SourceConfig {
    /// The declared (unresolved) path.
    pub fn path(&self) -> &str {
        match self {
            SourceConfig::Skhd(s)
            | SourceConfig::Tmux(s)
            | SourceConfig::NvimKeymap(s)
            | SourceConfig::ZshAlias(s)
            | SourceConfig::Karabiner(s)
            | SourceConfig::Hammerspoon(s) => &s.path,
            SourceConfig::Custom(c) => &c.path,
        }
    }

    /// Disabled sources are skipped entirely during sync. Custom sources
    /// have no enabled flag and always participate.
    pub fn enabled(&self) -> bool {
        match self {
            SourceConfig::Skhd(s)
            | SourceConfig::Tmux(s)
            | SourceConfig::NvimKeymap(s)
            | SourceConfig::ZshAlias(s)
            | SourceConfig::Karabiner(s)
            | SourceConfig::Hammerspoon(s) => s.enabled.unwrap_or(true),
            SourceConfig::Custom(_) => true,
        }
    }

    /// Identifier of the owning dialect, used as the `tool` field of every
    /// binding extracted from this source.
    pub fn tool_name(&self) -> &str {
        match self {
            SourceConfig::Skhd(_) => "skhd",
            SourceConfig::Tmux(_) => "tmux",
            SourceConfig::NvimKeymap(_) => "nvim",
            SourceConfig::ZshAlias(_) => "zsh",
            SourceConfig::Karabiner(_) => "karabiner",
            SourceConfig::Hammerspoon(_) => "hammerspoon",
            SourceConfig::Custom(c) => &c.name,
        }
    }
}

/// Builtin dialect kinds, used by setup-time discovery to construct
/// enabled source declarations from glob matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Skhd,
    Tmux,
    NvimKeymap,
    ZshAlias,
    Karabiner,
    Hammerspoon,
}

impl BuiltinKind {
    pub fn source(self, path: impl Into<String>) -> SourceConfig {
        let builtin = BuiltinSource::new(path);
        match self {
            BuiltinKind::Skhd => SourceConfig::Skhd(builtin),
            BuiltinKind::Tmux => SourceConfig::Tmux(builtin),
            BuiltinKind::NvimKeymap => SourceConfig::NvimKeymap(builtin),
            BuiltinKind::ZshAlias => SourceConfig::ZshAlias(builtin),
            BuiltinKind::Karabiner => SourceConfig::Karabiner(builtin),
            BuiltinKind::Hammerspoon => SourceConfig::Hammerspoon(builtin),
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Search roots that relative source paths are resolved against.
    #[serde(default)]
    pub base_paths: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    /// Re-sync automatically when outstanding changes are detected.
    #[serde(default = "default_auto_sync")]
    pub auto_sync: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_welcome: Option<bool>,
}

fn default_auto_sync() -> bool {
    DEFAULT_AUTO_SYNC
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_paths: Vec::new(),
            sources: Vec::new(),
            auto_sync: DEFAULT_AUTO_SYNC,
            show_welcome: Some(true),
        }
    }
}

impl Config {
    /// Sources that participate in a sync pass.
    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter().filter(|s| s.enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_config_round_trips_tagged_json() {
        let json = r#"{"type":"skhd","path":"~/.skhdrc","enabled":true}"#;
        let source: SourceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(source.tool_name(), "skhd");
        assert_eq!(source.path(), "~/.skhdrc");
        assert!(source.enabled());

        let back = serde_json::to_string(&source).unwrap();
        let again: SourceConfig = serde_json::from_str(&back).unwrap();
        assert_eq!(source, again);
    }

    #[test]
    fn custom_source_parses_camel_case_groups() {
        let json = r#"{
            "type": "custom",
            "name": "mytool",
            "path": "~/.mytoolrc",
            "pattern": "^(\\S+)\\s*=>\\s*(.+)$",
            "keyGroup": 1,
            "actionGroup": 2,
            "commentPrefix": ";"
        }"#;
        let source: SourceConfig = serde_json::from_str(json).unwrap();
        let SourceConfig::Custom(custom) = &source else {
            panic!("expected custom source");
        };
        assert_eq!(custom.key_group, 1);
        assert_eq!(custom.action_group, 2);
        assert_eq!(custom.comment_prefix(), ";");
        assert_eq!(source.tool_name(), "mytool");
    }

    #[test]
    fn disabled_source_is_filtered() {
        let config = Config {
            sources: vec![
                SourceConfig::Tmux(BuiltinSource {
                    path: "~/.tmux.conf".to_string(),
                    enabled: Some(false),
                }),
                SourceConfig::Skhd(BuiltinSource::new("~/.skhdrc")),
            ],
            ..Default::default()
        };
        let enabled: Vec<_> = config.enabled_sources().collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].tool_name(), "skhd");
    }

    #[test]
    fn nvim_keymap_tag_spelling() {
        let source = BuiltinKind::NvimKeymap.source("keymaps.lua");
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains(r#""type":"nvim-keymap""#));
        assert_eq!(source.tool_name(), "nvim");
    }

    #[test]
    fn config_defaults_when_fields_missing() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.auto_sync);
        assert!(config.sources.is_empty());
        assert!(config.base_paths.is_empty());
    }
}
