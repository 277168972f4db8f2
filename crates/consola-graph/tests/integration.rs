//! End-to-end scenarios across topology, rewiring, composition, and layout.

use consola_graph::{
    Connection, GraphLayout, Node, NodeType, Topology, compose, rewire,
};

/// Channel and bus wired as a stereo pair, the composer's bread and butter.
fn stereo_channel_into_bus() -> Topology {
    let mut topology = Topology::new();
    topology.add_node(Node::stereo("c1", NodeType::Channel).with_label("Channel 1"));
    topology.add_node(Node::stereo("b1", NodeType::GroupBus).with_label("Bus 1"));
    topology.connect(Connection::new("c1", 0, "b1", 0));
    topology.connect(Connection::new("c1", 1, "b1", 1));
    topology
}

#[test]
fn deleting_a_bus_strands_nothing() {
    let mut topology = stereo_channel_into_bus();

    rewire::remove_node_healed(&mut topology, "b1").unwrap();

    let channel = topology.find_node("c1").expect("channel survives");
    assert_eq!(channel.label(), "Channel 1");
    assert_eq!(
        topology.connections().iter().filter(|c| c.from == "c1").count(),
        0
    );

    let composite = compose(&topology, []);
    assert!(composite.topology.contains("c1"));
    assert!(!composite.topology.connections().iter().any(|c| c.touches("b1")));
}

#[test]
fn inserting_a_plugin_splits_a_stereo_edge_completely() {
    let mut topology = stereo_channel_into_bus();
    topology.add_node(Node::stereo("p1", NodeType::Plugin).with_label("Plugin 1"));

    rewire::insert_between(&mut topology, ("c1", "b1"), "p1", 2, 2).unwrap();

    let a_to_p: Vec<_> = topology
        .connections()
        .iter()
        .filter(|c| c.from == "c1" && c.to == "p1")
        .collect();
    let p_to_b: Vec<_> = topology
        .connections()
        .iter()
        .filter(|c| c.from == "p1" && c.to == "b1")
        .collect();
    let a_to_b = topology
        .connections()
        .iter()
        .filter(|c| c.from == "c1" && c.to == "b1")
        .count();

    assert_eq!(a_to_p.len(), 2);
    assert_eq!(p_to_b.len(), 2);
    assert_eq!(a_to_b, 0);
}

#[test]
fn micro_editing_round_trip_composes_through_the_interior() {
    let macro_topology = stereo_channel_into_bus();

    // Drill into the channel and splice a plugin between its boundary leaves.
    let mut micro = Topology::channel_micro_layout("c1");
    micro.add_node(Node::stereo("effect_1", NodeType::Plugin));
    rewire::insert_between(&mut micro, ("c1_input", "c1_output"), "effect_1", 2, 2).unwrap();

    let composite = compose(&macro_topology, [("c1", &micro)]);

    // Inlined: the macro channel vanished, traffic runs through the plugin.
    assert!(!composite.topology.contains("c1"));
    assert!(composite.topology.connection_exists("c1_input", "effect_1", 0, 0));
    assert!(composite.topology.connection_exists("effect_1", "c1_output", 0, 0));
    assert!(composite.topology.connection_exists("c1_output", "b1", 0, 0));
    assert!(composite.topology.connection_exists("c1_output", "b1", 1, 1));
}

#[test]
fn shrinking_a_bus_to_mono_prunes_only_high_channels() {
    let mut topology = stereo_channel_into_bus();

    assert!(topology.set_channel_counts("b1", 1, 1));

    assert!(topology.connection_exists("c1", "b1", 0, 0));
    assert!(!topology.connection_exists("c1", "b1", 1, 1));
}

#[test]
fn layout_tracks_composite_changes() {
    let macro_topology = stereo_channel_into_bus();
    let micro = Topology::channel_micro_layout("c1");
    let composite = compose(&macro_topology, [("c1", &micro)]);

    let mut layout = GraphLayout::new();
    layout.rebuild(&composite.topology);
    let before = layout.version();

    // The input leaf feeds the output leaf feeds the bus: strictly
    // increasing columns.
    let x_of = |id: &str| {
        layout
            .nodes()
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.x)
            .unwrap()
    };
    assert!(x_of("c1_input") < x_of("c1_output"));
    assert!(x_of("c1_output") < x_of("b1"));

    layout.rebuild(&composite.topology);
    assert_eq!(layout.version(), before + 1);
}

#[test]
fn failed_insertion_is_invisible_to_the_composite() {
    let mut topology = stereo_channel_into_bus();
    // No output ports, so the downstream leg cannot connect.
    topology.add_node(Node::new("meter_tap", NodeType::Utility).with_channels(2, 0));

    let before = compose(&topology, []);
    let result = rewire::insert_between(&mut topology, ("c1", "b1"), "meter_tap", 2, 0);
    assert!(result.is_err());
    let after = compose(&topology, []);

    assert_eq!(before.topology, after.topology);
}
