//! Mutation and rewiring primitives shared by macro and micro graphs.
//!
//! Everything here operates on a plain [`Topology`], so the orchestrator can
//! apply the same operations to the macro graph and to any micro graph. The
//! primitives uphold two guarantees the topology itself does not:
//!
//! - **Delete-with-heal** bridges the gap a removed node leaves behind, so
//!   upstream sources stay connected to downstream destinations.
//! - **Insert-between** is all-or-nothing: either the new node ends up
//!   connected on both sides, or the original connection is restored and no
//!   trace of the new node's edges remains.

use crate::error::GraphError;
use crate::node::{Connection, MAX_PORT_CHANNELS, clamp_channels};
use crate::topology::Topology;

/// Removes a node and heals the gap it leaves.
///
/// For every (incoming, outgoing) connection pair whose channel indices
/// match and whose outer endpoints differ, a direct connection from the
/// incoming source to the outgoing destination is synthesized unless that
/// exact edge already exists. A node with no outgoing (or no incoming)
/// connections heals nothing.
pub fn remove_node_healed(topology: &mut Topology, id: &str) -> Result<(), GraphError> {
    if !topology.contains(id) {
        return Err(GraphError::NotFound(id.to_string()));
    }

    let mut incoming = Vec::new();
    let mut outgoing = Vec::new();
    for connection in topology.connections() {
        if connection.to == id {
            incoming.push(connection.clone());
        } else if connection.from == id {
            outgoing.push(connection.clone());
        }
    }

    topology.remove_node(id);

    for inbound in &incoming {
        for outbound in &outgoing {
            if inbound.to_channel != outbound.from_channel {
                continue;
            }
            if inbound.from == outbound.to {
                continue;
            }
            if topology.connection_exists(
                &inbound.from,
                &outbound.to,
                inbound.from_channel,
                outbound.to_channel,
            ) {
                continue;
            }
            topology.connect(Connection::new(
                &inbound.from,
                inbound.from_channel,
                &outbound.to,
                outbound.to_channel,
            ));
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("rewire_heal: removed {id}, {} in / {} out", incoming.len(), outgoing.len());
    Ok(())
}

/// Splits the connection `edge.0 → edge.1` around `node_id`.
///
/// The original connection is removed entirely, then the upstream node is
/// connected to the new node on `min(upstream outputs, inputs, 2)` channels
/// and the new node to the downstream node on `min(outputs, downstream
/// inputs, 2)` channels. If either side fails to connect at least one
/// channel, every edge touching the new node is discarded and the original
/// connection restored on `min(upstream outputs, downstream inputs, 2)`
/// channels.
pub fn insert_between(
    topology: &mut Topology,
    edge: (&str, &str),
    node_id: &str,
    inputs: u32,
    outputs: u32,
) -> Result<(), GraphError> {
    let (from_id, to_id) = edge;

    let Some(upstream) = topology.node(from_id) else {
        return Err(GraphError::NotFound(from_id.to_string()));
    };
    let Some(downstream) = topology.node(to_id) else {
        return Err(GraphError::NotFound(to_id.to_string()));
    };
    if !topology.contains(node_id) {
        return Err(GraphError::NotFound(node_id.to_string()));
    }

    let upstream_outputs = upstream.output_channels();
    let downstream_inputs = downstream.input_channels();

    // A node with no ports on one side can never be spliced in; bail before
    // touching the topology so the caller sees an untouched graph.
    if inputs == 0 || outputs == 0 || upstream_outputs == 0 || downstream_inputs == 0 {
        return Err(GraphError::InsertionRejected {
            node: node_id.to_string(),
        });
    }

    topology.disconnect(from_id, to_id);

    let upstream_channels = upstream_outputs.min(inputs).min(MAX_PORT_CHANNELS);
    let downstream_channels = outputs.min(downstream_inputs).min(MAX_PORT_CHANNELS);

    for channel in 0..upstream_channels {
        topology.connect(Connection::new(from_id, channel, node_id, channel));
    }
    for channel in 0..downstream_channels {
        topology.connect(Connection::new(node_id, channel, to_id, channel));
    }

    if upstream_channels == 0 || downstream_channels == 0 {
        topology.disconnect(from_id, node_id);
        topology.disconnect(node_id, to_id);
        let restore_channels = upstream_outputs.min(downstream_inputs).min(MAX_PORT_CHANNELS);
        for channel in 0..restore_channels {
            topology.connect(Connection::new(from_id, channel, to_id, channel));
        }
        return Err(GraphError::InsertionRejected {
            node: node_id.to_string(),
        });
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("rewire_insert: {node_id} between {from_id} → {to_id}");
    Ok(())
}

/// Moves an existing node onto the connection `edge.0 → edge.1`.
///
/// The node's current connections are detached first; if the insertion is
/// rejected they are restored verbatim, so a failed move leaves the graph
/// exactly as it was.
pub fn reinsert_between(
    topology: &mut Topology,
    node_id: &str,
    edge: (&str, &str),
) -> Result<(), GraphError> {
    let Some(node) = topology.node(node_id) else {
        return Err(GraphError::NotFound(node_id.to_string()));
    };
    let inputs = node.input_channels();
    let outputs = node.output_channels();

    let previous = detach_connections(topology, node_id);
    match insert_between(topology, edge, node_id, inputs, outputs) {
        Ok(()) => Ok(()),
        Err(err) => {
            restore_connections(topology, &previous);
            Err(err)
        }
    }
}

/// Removes and returns every connection touching `id`.
pub fn detach_connections(topology: &mut Topology, id: &str) -> Vec<Connection> {
    let removed: Vec<Connection> = topology
        .connections()
        .iter()
        .filter(|connection| connection.touches(id))
        .cloned()
        .collect();

    let mut pairs: Vec<(String, String)> = removed
        .iter()
        .map(|connection| (connection.from.clone(), connection.to.clone()))
        .collect();
    pairs.sort();
    pairs.dedup();
    for (from, to) in &pairs {
        topology.disconnect(from, to);
    }
    removed
}

/// Re-adds previously detached connections (duplicates are ignored).
pub fn restore_connections(topology: &mut Topology, connections: &[Connection]) {
    for connection in connections {
        topology.connect(connection.clone());
    }
}

/// Connects `from` and `to` on the default channel pairs (0,0) and (1,1).
///
/// Returns true when at least one new edge was added. Fails for missing
/// nodes or a self-connection.
pub fn connect_pairwise(topology: &mut Topology, from: &str, to: &str) -> bool {
    if from == to || !topology.contains(from) || !topology.contains(to) {
        return false;
    }
    let mut updated = false;
    for channel in 0..MAX_PORT_CHANNELS {
        if !topology.connection_exists(from, to, channel, channel) {
            topology.connect(Connection::new(from, channel, to, channel));
            updated = true;
        }
    }
    updated
}

/// Removes every connection between `from` and `to` if any default channel
/// pair exists. Returns true when something was removed.
pub fn disconnect_pairwise(topology: &mut Topology, from: &str, to: &str) -> bool {
    if from == to || !topology.contains(from) || !topology.contains(to) {
        return false;
    }
    for channel in 0..MAX_PORT_CHANNELS {
        if topology.connection_exists(from, to, channel, channel) {
            topology.disconnect(from, to);
            return true;
        }
    }
    false
}

/// Connects a single port pair after validating both endpoints.
pub fn connect_ports(
    topology: &mut Topology,
    from: &str,
    from_channel: u32,
    to: &str,
    to_channel: u32,
) -> Result<(), GraphError> {
    let Some(source) = topology.node(from) else {
        return Err(GraphError::NotFound(from.to_string()));
    };
    let Some(destination) = topology.node(to) else {
        return Err(GraphError::NotFound(to.to_string()));
    };

    if from_channel >= source.output_channels() {
        return Err(GraphError::InvalidChannel {
            node: from.to_string(),
            channel: from_channel,
            limit: source.output_channels(),
        });
    }
    if to_channel >= destination.input_channels() {
        return Err(GraphError::InvalidChannel {
            node: to.to_string(),
            channel: to_channel,
            limit: destination.input_channels(),
        });
    }

    topology.connect(Connection::new(from, from_channel, to, to_channel));
    Ok(())
}

/// Replaces whatever ran between `from` and `to` with a direct connection
/// spanning their clamped channel counts, fanning a narrow source out across
/// a wider destination.
///
/// Used to re-establish the Input→Output bridge inside a micro graph after
/// its boundary channel counts change.
pub fn bridge(topology: &mut Topology, from: &str, to: &str) {
    let from_channels = clamp_channels(topology.node(from).map_or(1, |n| n.output_channels()));
    let to_channels = clamp_channels(topology.node(to).map_or(1, |n| n.input_channels()));

    topology.disconnect(from, to);

    if from_channels >= to_channels {
        for channel in 0..to_channels {
            topology.connect(Connection::new(from, channel, to, channel));
        }
    } else if from_channels == 1 {
        for channel in 0..to_channels {
            topology.connect(Connection::new(from, 0, to, channel));
        }
    } else {
        for channel in 0..to_channels {
            let source_channel = channel.min(from_channels - 1);
            topology.connect(Connection::new(from, source_channel, to, channel));
        }
    }
}
