//! Column/row layout for topology visualization.
//!
//! Columns come from a longest-path propagation over the connection DAG
//! (source-queue over in-degrees, like a Kahn sort that records depth
//! instead of order): sources sit in column 0 unless pinned, and every
//! visited node pushes `max(column, own + 1)` onto its successors. Rows
//! within a column follow a fixed priority for the well-known bus ids and
//! an alphabetical label sort otherwise, then map to evenly spaced
//! normalized y positions. Explicit position overrides win as a final pass.
//!
//! Cyclic graphs are tolerated: a node whose in-degree never drains is
//! never re-columned, so it keeps column 0 (or whatever an acyclic prefix
//! assigned), and row ordering keeps the result deterministic.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::node::{MAX_PORT_CHANNELS, NodeType, PositionInfo};
use crate::topology::Topology;

/// Well-known macro ids pinned to fixed columns so the outer I/O boundary
/// stays visually stable regardless of graph edits.
const PINNED_COLUMNS: [(&str, usize); 10] = [
    ("band_group", 0),
    ("vocal_group", 0),
    ("communication_group", 0),
    ("misc_group", 0),
    ("broadcast_bus", 1),
    ("broadcast_output", 2),
    ("monitor_trim", 3),
    ("utility_channels", 4),
    ("monitor_bus", 5),
    ("monitor_output", 6),
];

/// Fixed row priority for the group buses in column 0.
const GROUP_ROW_ORDER: [(&str, usize); 4] = [
    ("band_group", 0),
    ("vocal_group", 1),
    ("communication_group", 2),
    ("misc_group", 3),
];

/// A user-set normalized position that overrides the computed one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionOverride {
    /// Normalized x in `[0, 1]`.
    pub x: f32,
    /// Normalized y in `[0, 1]`.
    pub y: f32,
}

/// Renderable description of a node: topology content plus layout output.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
    /// Node id.
    pub id: String,
    /// Label to draw (person name for occupied positions).
    pub label: String,
    /// Node role, for glyph/color selection.
    pub node_type: NodeType,
    /// Normalized x position.
    pub x: f32,
    /// Normalized y position.
    pub y: f32,
    /// Whether the node is enabled.
    pub enabled: bool,
    /// Input port count, clamped to the supported range.
    pub input_channels: u32,
    /// Output port count, clamped to the supported range.
    pub output_channels: u32,
    /// Person metadata for Position nodes.
    pub position: PositionInfo,
}

/// Renderable description of a connection, deduplicated per node pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionVisual {
    /// Source node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// Source port index.
    pub from_port: u32,
    /// Destination port index.
    pub to_port: u32,
}

/// Layout engine state: computed visuals, overrides, and a version counter
/// so consumers can detect "layout changed" without deep comparison.
#[derive(Debug, Default)]
pub struct GraphLayout {
    nodes: Vec<NodeVisual>,
    connections: Vec<ConnectionVisual>,
    overrides: HashMap<String, PositionOverride>,
    version: u64,
}

impl GraphLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the computed node visuals from the last rebuild.
    pub fn nodes(&self) -> &[NodeVisual] {
        &self.nodes
    }

    /// Returns the computed connection visuals from the last rebuild.
    pub fn connections(&self) -> &[ConnectionVisual] {
        &self.connections
    }

    /// Returns the monotonically increasing layout version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the current position overrides.
    pub fn overrides(&self) -> &HashMap<String, PositionOverride> {
        &self.overrides
    }

    /// Sets one override (clamped to `[0, 1]`); applies on the next rebuild.
    pub fn set_override(&mut self, id: impl Into<String>, x: f32, y: f32) {
        self.overrides.insert(
            id.into(),
            PositionOverride {
                x: x.clamp(0.0, 1.0),
                y: y.clamp(0.0, 1.0),
            },
        );
    }

    /// Removes one override; applies on the next rebuild.
    pub fn clear_override(&mut self, id: &str) {
        self.overrides.remove(id);
    }

    /// Replaces all overrides (each clamped); applies on the next rebuild.
    pub fn set_overrides(&mut self, overrides: HashMap<String, PositionOverride>) {
        self.overrides = overrides
            .into_iter()
            .map(|(id, p)| {
                (
                    id,
                    PositionOverride {
                        x: p.x.clamp(0.0, 1.0),
                        y: p.y.clamp(0.0, 1.0),
                    },
                )
            })
            .collect();
    }

    /// Recomputes the layout for a topology and bumps the version.
    pub fn rebuild(&mut self, topology: &Topology) {
        self.nodes.clear();
        self.connections.clear();
        self.version += 1;

        if topology.is_empty() {
            return;
        }

        let columns = assign_columns(topology);
        let max_column = columns.values().copied().max().unwrap_or(0);

        // Bucket nodes into columns in topology order, then order rows.
        let mut buckets: Vec<Vec<&crate::node::Node>> = vec![Vec::new(); max_column + 1];
        for node in topology.nodes() {
            buckets[columns[node.id()]].push(node);
        }

        let group_order: HashMap<&str, usize> = GROUP_ROW_ORDER.into_iter().collect();
        for (column, bucket) in buckets.iter_mut().enumerate() {
            if column == 0 {
                bucket.sort_by(|lhs, rhs| {
                    let lhs_rank = group_order.get(lhs.id()).copied().unwrap_or(group_order.len());
                    let rhs_rank = group_order.get(rhs.id()).copied().unwrap_or(group_order.len());
                    lhs_rank
                        .cmp(&rhs_rank)
                        .then_with(|| lhs.id().cmp(rhs.id()))
                });
            } else {
                bucket.sort_by(|lhs, rhs| {
                    lhs.display_label()
                        .cmp(rhs.display_label())
                        .then_with(|| lhs.id().cmp(rhs.id()))
                });
            }
        }

        let column_count = buckets.len().max(2);
        let denominator = (column_count - 1).max(1) as f32;
        let mut placed: HashSet<String> = HashSet::new();

        for (column, bucket) in buckets.iter().enumerate() {
            let x = column as f32 / denominator;
            for (row, node) in bucket.iter().enumerate() {
                self.nodes.push(NodeVisual {
                    id: node.id().to_string(),
                    label: node.display_label().to_string(),
                    node_type: node.node_type(),
                    x,
                    y: normalized_coordinate(row, bucket.len()),
                    enabled: node.enabled(),
                    input_channels: node.input_channels().min(MAX_PORT_CHANNELS),
                    output_channels: node.output_channels().min(MAX_PORT_CHANNELS),
                    position: node.position().clone(),
                });
                placed.insert(node.id().to_string());
            }
        }

        for visual in &mut self.nodes {
            if let Some(over) = self.overrides.get(&visual.id) {
                visual.x = over.x;
                visual.y = over.y;
            }
        }

        let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
        for connection in topology.connections() {
            if !placed.contains(&connection.from) || !placed.contains(&connection.to) {
                continue;
            }
            if !seen_pairs.insert((connection.from.clone(), connection.to.clone())) {
                continue;
            }
            self.connections.push(ConnectionVisual {
                from: connection.from.clone(),
                to: connection.to.clone(),
                from_port: 0,
                to_port: 0,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "layout_rebuild: v{} with {} nodes / {} connection pairs",
            self.version,
            self.nodes.len(),
            self.connections.len()
        );
    }
}

/// Longest-path column assignment over the connection DAG.
fn assign_columns(topology: &Topology) -> HashMap<String, usize> {
    let mut columns: HashMap<String, usize> = HashMap::new();
    let mut pinned: HashSet<&str> = HashSet::new();
    for (id, column) in PINNED_COLUMNS {
        if topology.contains(id) {
            columns.insert(id.to_string(), column);
        }
        pinned.insert(id);
    }

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for node in topology.nodes() {
        adjacency.entry(node.id()).or_default();
        in_degree.entry(node.id()).or_insert(0);
    }
    for connection in topology.connections() {
        adjacency
            .entry(connection.from.as_str())
            .or_default()
            .push(connection.to.as_str());
        *in_degree.entry(connection.to.as_str()).or_insert(0) += 1;
    }

    // Seed with sources in topology order for determinism.
    let mut queue: VecDeque<&str> = topology
        .nodes()
        .iter()
        .map(|node| node.id())
        .filter(|id| in_degree[id] == 0)
        .collect();

    while let Some(current) = queue.pop_front() {
        let base = columns.get(current).copied().unwrap_or(0);
        if let Some(successors) = adjacency.get(current) {
            for &next in successors {
                if !pinned.contains(next) {
                    let entry = columns.entry(next.to_string()).or_insert(0);
                    *entry = (*entry).max(base + 1);
                }
                let degree = in_degree.get_mut(next).expect("successor was registered");
                if *degree > 0 {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    // Anything never reached (disconnected, or trapped in a cycle) defaults
    // to column 0.
    for node in topology.nodes() {
        columns.entry(node.id().to_string()).or_insert(0);
    }
    columns
}

fn normalized_coordinate(index: usize, count: usize) -> f32 {
    if count <= 1 {
        return 0.5;
    }
    (index + 1) as f32 / (count + 1) as f32
}
