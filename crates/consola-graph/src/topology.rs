//! The routing topology: an ordered node collection plus a connection set.
//!
//! `Topology` is the foundational structure shared by the macro graph, every
//! micro graph, and the flattened composite. Mutations silently no-op when
//! given an unknown id — callers check the returned `bool` where they care.
//! Graphs stay small (tens of nodes), so node removal compacts the node list
//! and rebuilds the id→index map rather than tombstoning slots.

use std::collections::HashMap;

use crate::node::{Connection, Node, NodeType};

/// Conventional id of the micro-graph input boundary leaf for a macro node.
pub fn boundary_input_id(node_id: &str) -> String {
    format!("{node_id}_input")
}

/// Conventional id of the micro-graph output boundary leaf for a macro node.
pub fn boundary_output_id(node_id: &str) -> String {
    format!("{node_id}_output")
}

/// A directed multigraph of nodes and channel-indexed connections.
///
/// Connections form a set, not a multiset: [`connect`](Self::connect) is a
/// no-op when an identical `(from, from_channel, to, to_channel)` edge
/// already exists. Every connection endpoint references a node in the same
/// topology; dangling edges are pruned whenever a node is removed or its
/// channel counts shrink.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    index: HashMap<String, usize>,
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns a mutable reference to the stored copy.
    ///
    /// A node with a duplicate id replaces nothing; it shadows the earlier
    /// node in the index, so callers should check [`contains`](Self::contains)
    /// first when ids may collide.
    pub fn add_node(&mut self, node: Node) -> &mut Node {
        let id = node.id().to_string();
        self.nodes.push(node);
        self.index.insert(id, self.nodes.len() - 1);
        self.nodes.last_mut().expect("node was just pushed")
    }

    /// Removes a node and every connection touching it.
    ///
    /// Remaining nodes are compacted and the id→index map rebuilt, keeping
    /// lookups dense. Returns false for an unknown id.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(idx) = self.index.remove(id) else {
            return false;
        };
        self.nodes.remove(idx);
        self.connections.retain(|connection| !connection.touches(id));
        self.reindex();
        #[cfg(feature = "tracing")]
        tracing::debug!("topology_remove: node {id}");
        true
    }

    /// Adds a connection unless an identical edge already exists.
    pub fn connect(&mut self, connection: Connection) {
        if self.connection_exists(
            &connection.from,
            &connection.to,
            connection.from_channel,
            connection.to_channel,
        ) {
            return;
        }
        self.connections.push(connection);
    }

    /// Removes every connection between `from` and `to`, across all
    /// channel pairs.
    pub fn disconnect(&mut self, from: &str, to: &str) {
        self.connections
            .retain(|connection| !(connection.from == from && connection.to == to));
    }

    /// Returns the ordered node list.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the connection list.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns a copy of the node with the given id.
    pub fn find_node(&self, id: &str) -> Option<Node> {
        self.node(id).cloned()
    }

    /// Returns a reference to the node with the given id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Returns a mutable reference to the node with the given id.
    ///
    /// Channel counts should be changed through
    /// [`set_channel_counts`](Self::set_channel_counts) instead, which prunes
    /// connections left out of range.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.index.get(id).map(|&idx| &mut self.nodes[idx])
    }

    /// Returns true when a node with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns true when the topology has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sets a node's channel counts and prunes any connection whose channel
    /// index is now out of range (channel-shrink pruning).
    ///
    /// Returns false for an unknown id.
    pub fn set_channel_counts(&mut self, id: &str, inputs: u32, outputs: u32) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        self.nodes[idx].set_input_channels(inputs);
        self.nodes[idx].set_output_channels(outputs);
        self.prune_connections_for(id, inputs, outputs);
        true
    }

    /// Sets a node's display label. No-op for an unknown id.
    pub fn set_label(&mut self, id: &str, label: &str) {
        if let Some(node) = self.node_mut(id) {
            node.set_label(label);
        }
    }

    /// Sets a node's enabled flag. No-op for an unknown id.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        if let Some(node) = self.node_mut(id) {
            node.set_enabled(enabled);
        }
    }

    /// Returns a node's enabled flag; unknown ids read as enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.node(id).is_none_or(Node::enabled)
    }

    /// Returns true when an identical edge exists.
    pub fn connection_exists(
        &self,
        from: &str,
        to: &str,
        from_channel: u32,
        to_channel: u32,
    ) -> bool {
        self.connections.iter().any(|connection| {
            connection.from == from
                && connection.to == to
                && connection.from_channel == from_channel
                && connection.to_channel == to_channel
        })
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (idx, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id().to_string(), idx);
        }
    }

    fn prune_connections_for(&mut self, id: &str, inputs: u32, outputs: u32) {
        self.connections.retain(|connection| {
            if connection.from == id && connection.from_channel >= outputs {
                return false;
            }
            if connection.to == id && connection.to_channel >= inputs {
                return false;
            }
            true
        });
    }

    // --- Factory layouts ---

    /// Builds the default broadcast macro graph: four group buses into the
    /// broadcast bus, broadcast and monitor output legs, and a utility
    /// channel strip feeding the monitor bus.
    pub fn default_broadcast_layout() -> Self {
        let mut topology = Self::new();

        for (id, label) in [
            ("band_group", "Band Group"),
            ("vocal_group", "Vocal Group"),
            ("communication_group", "Comms Group"),
            ("misc_group", "Misc Group"),
        ] {
            topology.add_node(Node::stereo(id, NodeType::GroupBus).with_label(label));
        }

        topology.add_node(Node::stereo("broadcast_bus", NodeType::BroadcastBus).with_label("Broadcast Bus"));
        topology.add_node(Node::stereo("monitor_trim", NodeType::Utility).with_label("Monitor Trim -3 dB"));
        topology.add_node(
            Node::new("broadcast_output", NodeType::Output)
                .with_label("Broadcast Output")
                .with_channels(2, 0),
        );
        topology.add_node(Node::stereo("utility_channels", NodeType::Utility).with_label("Utility Channels"));
        topology.add_node(Node::stereo("monitor_bus", NodeType::MixBus).with_label("Monitor Bus"));
        topology.add_node(
            Node::new("monitor_output", NodeType::Output)
                .with_label("Monitor Output")
                .with_channels(2, 0),
        );

        let stereo_pairs = [
            ("band_group", "broadcast_bus"),
            ("vocal_group", "broadcast_bus"),
            ("communication_group", "broadcast_bus"),
            ("misc_group", "broadcast_bus"),
            ("broadcast_bus", "broadcast_output"),
            ("broadcast_bus", "monitor_trim"),
            ("monitor_trim", "monitor_bus"),
            ("utility_channels", "monitor_bus"),
            ("monitor_bus", "monitor_output"),
        ];
        for (from, to) in stereo_pairs {
            for channel in 0..2 {
                topology.connect(Connection::new(from, channel, to, channel));
            }
        }

        topology
    }

    /// Builds the default interior of a channel-like macro node: a mono
    /// input leaf pre-wired to a mono output leaf.
    ///
    /// Also used for Position nodes, whose interior behaves like a channel.
    pub fn channel_micro_layout(channel_id: &str) -> Self {
        let mut topology = Self::new();
        let input_id = boundary_input_id(channel_id);
        let output_id = boundary_output_id(channel_id);

        topology.add_node(
            Node::new(&input_id, NodeType::Input)
                .with_label("Channel Input")
                .with_channels(0, 1),
        );
        topology.add_node(
            Node::new(&output_id, NodeType::Output)
                .with_label("Channel Output")
                .with_channels(1, 0),
        );
        topology.connect(Connection::new(input_id, 0, output_id, 0));
        topology
    }

    /// Builds the default interior of a group bus: an output leaf only, so
    /// the bus stays an opaque composite leaf until an input leaf appears.
    pub fn group_micro_layout(group_id: &str) -> Self {
        let mut topology = Self::new();
        topology.add_node(
            Node::new(boundary_output_id(group_id), NodeType::Output)
                .with_label("Group Output")
                .with_channels(2, 0),
        );
        topology
    }

    /// Builds the default interior of an output macro node: a stereo input
    /// leaf pre-wired to a stereo output leaf.
    pub fn output_micro_layout(output_id: &str) -> Self {
        let mut topology = Self::new();
        let input_id = boundary_input_id(output_id);
        let leaf_id = boundary_output_id(output_id);

        topology.add_node(
            Node::new(&input_id, NodeType::Input)
                .with_label("Output Input")
                .with_channels(0, 2),
        );
        topology.add_node(
            Node::new(&leaf_id, NodeType::Output)
                .with_label("Output")
                .with_channels(2, 0),
        );
        topology.connect(Connection::new(&input_id, 0, &leaf_id, 0));
        topology.connect(Connection::new(input_id, 1, leaf_id, 1));
        topology
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_pair() -> Topology {
        let mut topology = Topology::new();
        topology.add_node(Node::stereo("a", NodeType::Channel));
        topology.add_node(Node::stereo("b", NodeType::GroupBus));
        topology.connect(Connection::new("a", 0, "b", 0));
        topology.connect(Connection::new("a", 1, "b", 1));
        topology
    }

    #[test]
    fn connect_is_set_semantics() {
        let mut topology = stereo_pair();
        topology.connect(Connection::new("a", 0, "b", 0));
        assert_eq!(topology.connection_count(), 2);
    }

    #[test]
    fn disconnect_removes_all_channel_pairs() {
        let mut topology = stereo_pair();
        topology.disconnect("a", "b");
        assert_eq!(topology.connection_count(), 0);
        assert_eq!(topology.node_count(), 2);
    }

    #[test]
    fn remove_node_cascades_connections_and_reindexes() {
        let mut topology = stereo_pair();
        topology.add_node(Node::stereo("c", NodeType::Utility));
        topology.connect(Connection::new("b", 0, "c", 0));

        assert!(topology.remove_node("b"));
        assert_eq!(topology.node_count(), 2);
        assert_eq!(topology.connection_count(), 0);
        // The index must still resolve the compacted survivors.
        assert!(topology.find_node("a").is_some());
        assert!(topology.find_node("c").is_some());
        assert!(topology.find_node("b").is_none());
    }

    #[test]
    fn remove_unknown_node_is_a_noop() {
        let mut topology = stereo_pair();
        assert!(!topology.remove_node("ghost"));
        assert_eq!(topology.node_count(), 2);
        assert_eq!(topology.connection_count(), 2);
    }

    #[test]
    fn channel_shrink_prunes_out_of_range_connections() {
        let mut topology = stereo_pair();
        assert!(topology.set_channel_counts("b", 1, 2));
        // The (1,1) edge lands on input channel 1 >= new count 1.
        assert_eq!(topology.connection_count(), 1);
        assert!(topology.connection_exists("a", "b", 0, 0));
        assert!(!topology.connection_exists("a", "b", 1, 1));
    }

    #[test]
    fn channel_shrink_prunes_source_side_too() {
        let mut topology = stereo_pair();
        assert!(topology.set_channel_counts("a", 2, 1));
        assert_eq!(topology.connection_count(), 1);
        assert!(topology.connection_exists("a", "b", 0, 0));
    }

    #[test]
    fn channel_grow_keeps_existing_connections() {
        let mut topology = stereo_pair();
        assert!(topology.set_channel_counts("b", 2, 2));
        assert_eq!(topology.connection_count(), 2);
    }

    #[test]
    fn set_channel_counts_unknown_id_fails() {
        let mut topology = stereo_pair();
        assert!(!topology.set_channel_counts("ghost", 1, 1));
    }

    #[test]
    fn unknown_node_reads_as_enabled() {
        let topology = Topology::new();
        assert!(topology.is_enabled("ghost"));
    }

    #[test]
    fn enabled_round_trip() {
        let mut topology = stereo_pair();
        topology.set_enabled("a", false);
        assert!(!topology.is_enabled("a"));
        topology.set_enabled("a", true);
        assert!(topology.is_enabled("a"));
    }

    #[test]
    fn find_node_returns_a_copy() {
        let topology = stereo_pair();
        let mut copy = topology.find_node("a").unwrap();
        copy.set_label("scribble");
        assert_eq!(topology.node("a").unwrap().label(), "");
    }

    #[test]
    fn default_broadcast_layout_is_wired() {
        let topology = Topology::default_broadcast_layout();
        assert_eq!(topology.node_count(), 9);
        assert!(topology.connection_exists("band_group", "broadcast_bus", 0, 0));
        assert!(topology.connection_exists("broadcast_bus", "broadcast_output", 1, 1));
        assert!(topology.connection_exists("monitor_bus", "monitor_output", 0, 0));
    }

    #[test]
    fn channel_micro_layout_prewires_boundary() {
        let topology = Topology::channel_micro_layout("channel_3");
        assert!(topology.connection_exists("channel_3_input", "channel_3_output", 0, 0));
        assert_eq!(topology.node("channel_3_input").unwrap().node_type(), NodeType::Input);
        assert_eq!(topology.node("channel_3_output").unwrap().node_type(), NodeType::Output);
    }

    #[test]
    fn group_micro_layout_has_output_only() {
        let topology = Topology::group_micro_layout("band_group");
        assert_eq!(topology.node_count(), 1);
        assert!(topology.contains("band_group_output"));
    }

    #[test]
    fn output_micro_layout_is_stereo() {
        let topology = Topology::output_micro_layout("broadcast_output");
        assert!(topology.connection_exists("broadcast_output_input", "broadcast_output_output", 0, 0));
        assert!(topology.connection_exists("broadcast_output_input", "broadcast_output_output", 1, 1));
    }
}
