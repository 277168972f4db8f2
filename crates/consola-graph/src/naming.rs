//! Id generation and label numbering policy.
//!
//! New node ids must be unique within their target topology yet stable
//! across macro/micro boundaries, so generation is collision-checked rather
//! than purely counter-based: a counter proposes candidates and the topology
//! is consulted until one is free. Counters live in an explicit
//! [`NamingPolicy`] owned by the orchestrator instead of ambient globals.

use std::collections::HashMap;

use crate::topology::Topology;

/// Generates the next free id of the form `{prefix}_{n}`.
///
/// `counter` is advanced past every taken candidate, so subsequent calls
/// keep moving forward even when old ids linger in the topology.
pub fn generate_unique_id(topology: &Topology, prefix: &str, counter: &mut u64) -> String {
    loop {
        *counter += 1;
        let candidate = format!("{prefix}_{counter}");
        if !topology.contains(&candidate) {
            return candidate;
        }
    }
}

/// Builds the auto-generated label for a type base and 1-based index,
/// e.g. `"Channel 3"`.
pub fn auto_label(base: &str, index: u64) -> String {
    format!("{base} {index}")
}

/// Heuristic for "does this look like an auto-generated label for this
/// type": the bare base, or the base followed by a space and digits.
/// Anything else is treated as a user-customized label.
pub fn is_auto_label(label: &str, base: &str) -> bool {
    if label == base {
        return true;
    }
    match label.strip_prefix(base) {
        Some(rest) => {
            let rest = match rest.strip_prefix(' ') {
                Some(digits) => digits,
                None => return false,
            };
            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Renumbers auto-generated labels to stay contiguous.
///
/// `ids` is the caller-ordered list of node ids sharing the label base.
/// Nodes whose current label fails [`is_auto_label`] keep their label but
/// still consume no index, so the sequence over auto-labeled nodes stays
/// dense: 1, 2, 3, ...
pub fn renumber_labels(topology: &mut Topology, base: &str, ids: &[String]) {
    let mut index = 1u64;
    for id in ids {
        let Some(node) = topology.node(id) else {
            continue;
        };
        if !is_auto_label(node.label(), base) {
            continue;
        }
        topology.set_label(id, &auto_label(base, index));
        index += 1;
    }
}

/// Per-prefix id counters for macro and micro node creation.
///
/// Micro counters are scoped per view; uniqueness within the target
/// topology is guaranteed by the collision check, and the composer
/// deduplicates by id when views are merged.
#[derive(Debug, Default)]
pub struct NamingPolicy {
    counters: HashMap<String, u64>,
}

impl NamingPolicy {
    /// Creates a policy with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every counter (used when a project is loaded).
    pub fn reset(&mut self) {
        self.counters.clear();
    }

    /// Returns the next free macro id for a prefix, advancing its counter.
    pub fn next_macro_id(&mut self, topology: &Topology, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_default();
        generate_unique_id(topology, prefix, counter)
    }

    /// Returns the next free micro id for a prefix within a view.
    pub fn next_micro_id(&mut self, topology: &Topology, view_id: &str, prefix: &str) -> String {
        let counter = self
            .counters
            .entry(format!("{view_id}:{prefix}"))
            .or_default();
        generate_unique_id(topology, prefix, counter)
    }

    /// Returns the current counter value for a macro prefix (the index the
    /// most recent id was created with).
    pub fn macro_counter(&self, prefix: &str) -> u64 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }

    /// Returns the current counter value for a view-scoped prefix.
    pub fn micro_counter(&self, view_id: &str, prefix: &str) -> u64 {
        self.counters
            .get(&format!("{view_id}:{prefix}"))
            .copied()
            .unwrap_or(0)
    }
}
