//! Conflict detection over the aggregated binding set.
//!
//! Bindings are grouped by canonical chord. A group is a genuine collision
//! when it spans more than one tool, or when a single tool declares the
//! same chord twice in the same mode (two same-tool bindings with no mode
//! at all are compared as sharing one implicit default mode). Same-tool
//! bindings in different modes are reachable only in disjoint contexts and
//! never conflict.
//!
//! Output is derived fresh from the current binding set on every call and
//! ordered by descending group size (larger collisions are more
//! actionable); ties keep first-seen grouping order.

use std::collections::{HashMap, HashSet};

use crate::parsers::{Binding, ConflictGroup};

/// Does this chord group represent a real collision?
fn is_conflict(bindings: &[Binding]) -> bool {
    if bindings.len() < 2 {
        return false;
    }

    let tools: HashSet<&str> = bindings.iter().map(|b| b.tool.as_str()).collect();
    if tools.len() > 1 {
        return true;
    }

    // Single tool: a duplicate within one mode (or within the implicit
    // default mode) is a real override.
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    bindings.iter().any(|b| !seen.insert(b.mode.as_deref()))
}

/// Group all bindings by canonical chord and report the colliding groups,
/// sorted by descending binding count.
pub fn detect_conflicts(bindings: &[Binding]) -> Vec<ConflictGroup> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<Binding>> = HashMap::new();

    for binding in bindings {
        let key = binding.normalized_keys.as_str();
        if !groups.contains_key(key) {
            order.push(key);
        }
        groups.entry(key).or_default().push(binding.clone());
    }

    let mut conflicts: Vec<ConflictGroup> = order
        .into_iter()
        .filter_map(|key| {
            let group = groups.remove(key)?;
            is_conflict(&group).then(|| ConflictGroup {
                normalized_keys: key.to_string(),
                bindings: group,
            })
        })
        .collect();

    // Stable sort keeps first-seen order among equal-sized groups.
    conflicts.sort_by(|a, b| b.bindings.len().cmp(&a.bindings.len()));
    conflicts
}
