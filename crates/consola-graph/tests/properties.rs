//! Property-based tests for the topology and rewiring invariants.
//!
//! Exercises channel-shrink pruning, insert-between atomicity, id
//! generation, and layout determinism over randomized graphs.

use proptest::prelude::*;

use consola_graph::{
    Connection, GraphLayout, Node, NodeType, Topology, generate_unique_id, rewire,
};

/// Builds a topology of `n` stereo utility nodes (`n0`..) with the given
/// raw edge tuples, indices folded into range.
fn build_topology(n: usize, raw_edges: &[(usize, usize, u32, u32)]) -> Topology {
    let mut topology = Topology::new();
    for i in 0..n {
        topology.add_node(Node::stereo(format!("n{i}"), NodeType::Utility));
    }
    for &(from, to, from_channel, to_channel) in raw_edges {
        let from = format!("n{}", from % n);
        let to = format!("n{}", to % n);
        if from != to {
            topology.connect(Connection::new(from, from_channel % 2, to, to_channel % 2));
        }
    }
    topology
}

fn arb_edges() -> impl Strategy<Value = Vec<(usize, usize, u32, u32)>> {
    proptest::collection::vec((0usize..8, 0usize..8, 0u32..2, 0u32..2), 0..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Shrinking a node's channel counts removes exactly the connections
    /// whose channel index moved out of range, and nothing else.
    #[test]
    fn channel_shrink_prunes_exactly_out_of_range(
        edges in arb_edges(),
        node in 0usize..6,
        inputs in 0u32..3,
        outputs in 0u32..3,
    ) {
        let mut topology = build_topology(6, &edges);
        let id = format!("n{node}");
        let before: Vec<Connection> = topology.connections().to_vec();

        prop_assert!(topology.set_channel_counts(&id, inputs, outputs));

        for connection in topology.connections() {
            if connection.from == id {
                prop_assert!(connection.from_channel < outputs);
            }
            if connection.to == id {
                prop_assert!(connection.to_channel < inputs);
            }
        }
        // Every in-range connection survived.
        for connection in &before {
            let pruned = (connection.from == id && connection.from_channel >= outputs)
                || (connection.to == id && connection.to_channel >= inputs);
            if !pruned {
                prop_assert!(topology.connection_exists(
                    &connection.from,
                    &connection.to,
                    connection.from_channel,
                    connection.to_channel,
                ));
            }
        }
    }

    /// Insert-between either connects both sides of the new node or leaves
    /// the graph byte-for-byte as it was.
    #[test]
    fn insert_between_is_atomic(
        upstream_outputs in 0u32..4,
        downstream_inputs in 0u32..4,
        node_inputs in 0u32..4,
        node_outputs in 0u32..4,
    ) {
        let mut topology = Topology::new();
        topology.add_node(Node::new("a", NodeType::Channel).with_channels(2, upstream_outputs));
        topology.add_node(Node::new("b", NodeType::GroupBus).with_channels(downstream_inputs, 2));
        topology.add_node(Node::new("n", NodeType::Plugin).with_channels(node_inputs, node_outputs));
        let span = upstream_outputs.min(downstream_inputs).min(2);
        for channel in 0..span {
            topology.connect(Connection::new("a", channel, "b", channel));
        }
        let before = topology.clone();

        match rewire::insert_between(&mut topology, ("a", "b"), "n", node_inputs, node_outputs) {
            Ok(()) => {
                let a_to_n = topology.connections().iter().filter(|c| c.from == "a" && c.to == "n").count();
                let n_to_b = topology.connections().iter().filter(|c| c.from == "n" && c.to == "b").count();
                let a_to_b = topology.connections().iter().filter(|c| c.from == "a" && c.to == "b").count();
                prop_assert!(a_to_n >= 1);
                prop_assert!(n_to_b >= 1);
                prop_assert_eq!(a_to_b, 0);
            }
            Err(_) => {
                prop_assert_eq!(&topology, &before);
            }
        }
    }

    /// Generated ids are never present in the topology and never repeat
    /// while the counter advances.
    #[test]
    fn generated_ids_are_fresh_and_distinct(taken in proptest::collection::hash_set(1u64..32, 0..12)) {
        let mut topology = Topology::new();
        for idx in &taken {
            topology.add_node(Node::new(format!("node_{idx}"), NodeType::Utility));
        }

        let mut counter = 0;
        let mut seen = std::collections::HashSet::new();
        for _ in 0..8 {
            let id = generate_unique_id(&topology, "node", &mut counter);
            prop_assert!(!topology.contains(&id));
            prop_assert!(seen.insert(id.clone()));
            topology.add_node(Node::new(id, NodeType::Utility));
        }
    }

    /// Two rebuilds over the same topology produce identical layouts.
    #[test]
    fn layout_is_deterministic(edges in arb_edges()) {
        let topology = build_topology(8, &edges);

        let mut first = GraphLayout::new();
        first.rebuild(&topology);
        let mut second = GraphLayout::new();
        second.rebuild(&topology);

        prop_assert_eq!(first.nodes(), second.nodes());
        prop_assert_eq!(first.connections(), second.connections());
    }

    /// Delete-with-heal never leaves a connection referencing the removed
    /// node, and never invents a self-loop.
    #[test]
    fn heal_leaves_no_dangling_edges(edges in arb_edges(), victim in 0usize..6) {
        let mut topology = build_topology(6, &edges);
        let id = format!("n{victim}");

        rewire::remove_node_healed(&mut topology, &id).unwrap();

        for connection in topology.connections() {
            prop_assert!(!connection.touches(&id));
            prop_assert_ne!(&connection.from, &connection.to);
        }
    }
}
