//! Format extractors - one stateless parse function per supported dialect.
//!
//! Each extractor turns raw file text into an ordered sequence of
//! [`Binding`] records. Extractors never fail on file content: a malformed
//! line or entry is skipped and the rest of the file is still extracted.
//! The only error path out of [`parse_source`] is an invalid user-supplied
//! custom pattern, which is misconfiguration rather than file noise.

mod custom;
mod describe;
mod hammerspoon;
mod karabiner;
mod nvim;
mod skhd;
mod tmux;
mod types;
mod zsh;

pub use types::{Binding, ConflictGroup};

use crate::config::SourceConfig;
use crate::error::Result;

/// Dispatch the extractor selected by the source's tagged variant.
///
/// Builtin dialects never return an error; a custom source surfaces
/// `KeybeeError::InvalidPattern` when its regex does not compile.
pub fn parse_source(source: &SourceConfig, content: &str) -> Result<Vec<Binding>> {
    match source {
        SourceConfig::Skhd(_) => Ok(skhd::parse(content)),
        SourceConfig::Tmux(_) => Ok(tmux::parse(content)),
        SourceConfig::NvimKeymap(_) => Ok(nvim::parse(content)),
        SourceConfig::ZshAlias(_) => Ok(zsh::parse(content)),
        SourceConfig::Karabiner(_) => Ok(karabiner::parse(content)),
        SourceConfig::Hammerspoon(_) => Ok(hammerspoon::parse(content)),
        SourceConfig::Custom(config) => custom::parse(content, config),
    }
}

/// Group bindings by tool, preserving first-seen tool order and the
/// source-appearance order of bindings within each tool.
pub fn group_by_tool(bindings: &[Binding]) -> Vec<(String, Vec<Binding>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: std::collections::HashMap<String, Vec<Binding>> =
        std::collections::HashMap::new();

    for binding in bindings {
        if !groups.contains_key(&binding.tool) {
            order.push(binding.tool.clone());
        }
        groups
            .entry(binding.tool.clone())
            .or_default()
            .push(binding.clone());
    }

    order
        .into_iter()
        .map(|tool| {
            let bindings = groups.remove(&tool).unwrap_or_default();
            (tool, bindings)
        })
        .collect()
}
