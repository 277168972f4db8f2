//! Hierarchical composer: flattens the macro graph and its micro graphs
//! into the single composite topology the audio backend consumes.
//!
//! The composite is derived, never edited: it is rebuilt wholesale after
//! every mutation (correctness over incremental efficiency — graphs are
//! tens of nodes). A macro node is *inlined* when its micro graph has both
//! an Input and an Output boundary leaf; the leaves then stand in for the
//! macro node, with channel counts derived from the macro node so they form
//! the composite-level boundary. Everything else stays an opaque leaf.

use std::collections::{HashMap, HashSet};

use crate::node::{Connection, MAX_PORT_CHANNELS, Node, NodeType};
use crate::topology::Topology;

/// The flattened topology plus the macro-id → composite-id metering table.
#[derive(Clone, Debug, Default)]
pub struct Composite {
    /// The flattened graph handed to the audio backend.
    pub topology: Topology,
    /// Maps a macro node id to the composite node that carries its meters.
    pub meter_aliases: HashMap<String, String>,
}

/// Flattens `macro_topology` and the given micro views into a [`Composite`].
///
/// `micro_views` associates macro node ids with their interior graphs; a
/// macro node without an entry has no interior. Views are processed in
/// descending id-length order (ties broken lexicographically) so chained
/// aliasing resolves deterministically.
pub fn compose<'a, I>(macro_topology: &Topology, micro_views: I) -> Composite
where
    I: IntoIterator<Item = (&'a str, &'a Topology)>,
{
    let mut views: Vec<(&str, &Topology)> = micro_views.into_iter().collect();
    views.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let mut composite = Topology::new();
    let mut meter_aliases: HashMap<String, String> = HashMap::new();
    let mut input_aliases: HashMap<String, String> = HashMap::new();
    let mut output_aliases: HashMap<String, String> = HashMap::new();

    let has_boundary = |micro: &Topology, node_type: NodeType| {
        micro.nodes().iter().any(|node| node.node_type() == node_type)
    };

    let mut inlined: HashSet<&str> = HashSet::new();
    for (view_id, micro) in &views {
        if macro_topology.contains(view_id)
            && has_boundary(micro, NodeType::Input)
            && has_boundary(micro, NodeType::Output)
        {
            inlined.insert(view_id);
        }
    }

    // Macro nodes: inlined ones are dropped, the rest copy through as leaves.
    for node in macro_topology.nodes() {
        if inlined.contains(node.id()) {
            continue;
        }
        composite.add_node(node.clone());
    }

    // Micro nodes. Boundary leaves become passthrough utilities whose
    // channel counts come from the *macro* node, since they form the
    // composite-level boundary of the inlined interior.
    for (view_id, micro) in &views {
        let macro_node = macro_topology.node(view_id);
        let macro_inputs = macro_node.map_or(1, Node::input_channels);
        let macro_outputs = macro_node.map_or(1, Node::output_channels);

        for node in micro.nodes() {
            let clone = match node.node_type() {
                NodeType::Input => {
                    let channels = macro_inputs.max(1);
                    input_aliases.insert((*view_id).to_string(), node.id().to_string());
                    clone_with_channels(node, NodeType::Utility, channels, channels)
                }
                NodeType::Output => {
                    let channels = macro_outputs.max(1);
                    output_aliases.insert((*view_id).to_string(), node.id().to_string());
                    meter_aliases.insert((*view_id).to_string(), node.id().to_string());
                    clone_with_channels(node, NodeType::Utility, channels, channels)
                }
                _ => clone_with_channels(
                    node,
                    node.node_type(),
                    node.input_channels(),
                    node.output_channels(),
                ),
            };

            if !composite.contains(clone.id()) {
                composite.add_node(clone);
            }
        }
    }

    // Micro connections, then macro connections, both with endpoint
    // aliasing and 1↔N fan adaptation.
    for (_, micro) in &views {
        for connection in micro.connections() {
            connect_resolved(&mut composite, connection, &input_aliases, &output_aliases);
        }
    }
    for connection in macro_topology.connections() {
        connect_resolved(&mut composite, connection, &input_aliases, &output_aliases);
    }

    // A macro node that kept its leaf form but still owns a micro Output
    // leaf (an interior without an Input boundary) gets wired into that
    // leaf so metering taps the right point.
    for (view_id, _) in &views {
        if inlined.contains(view_id) || !composite.contains(view_id) {
            continue;
        }
        let Some(output_leaf) = output_aliases.get(*view_id) else {
            continue;
        };
        let Some(macro_node) = macro_topology.node(view_id) else {
            continue;
        };
        let channels = macro_node.output_channels().min(MAX_PORT_CHANNELS).max(1);
        for channel in 0..channels {
            composite.connect(Connection::new(*view_id, channel, output_leaf, channel));
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "compose: {} macro nodes, {} views → {} composite nodes / {} connections",
        macro_topology.node_count(),
        views.len(),
        composite.node_count(),
        composite.connection_count()
    );

    Composite {
        topology: composite,
        meter_aliases,
    }
}

/// Clones a node's identity, label, and enabled flag with a new role and
/// channel counts. Person metadata stays behind; the backend has no use
/// for it.
fn clone_with_channels(source: &Node, node_type: NodeType, inputs: u32, outputs: u32) -> Node {
    let mut clone = Node::new(source.id(), node_type)
        .with_label(source.label())
        .with_channels(inputs, outputs);
    clone.set_enabled(source.enabled());
    clone
}

/// Clones a connection into the composite, re-resolving aliased endpoints
/// and fanning a mono end across a wider opposite end.
fn connect_resolved(
    composite: &mut Topology,
    connection: &Connection,
    input_aliases: &HashMap<String, String>,
    output_aliases: &HashMap<String, String>,
) {
    let from = output_aliases
        .get(&connection.from)
        .unwrap_or(&connection.from)
        .clone();
    let to = input_aliases
        .get(&connection.to)
        .unwrap_or(&connection.to)
        .clone();

    composite.connect(Connection::new(
        &from,
        connection.from_channel,
        &to,
        connection.to_channel,
    ));

    let from_channels = composite.node(&from).map_or(1, |n| n.output_channels().max(1));
    let to_channels = composite.node(&to).map_or(1, |n| n.input_channels().max(1));

    if from_channels == 1 && to_channels > 1 {
        for channel in 1..to_channels {
            composite.connect(Connection::new(&from, 0, &to, channel));
        }
    } else if from_channels > 1 && to_channels == 1 {
        for channel in 1..from_channels {
            composite.connect(Connection::new(&from, channel, &to, 0));
        }
    }
}
