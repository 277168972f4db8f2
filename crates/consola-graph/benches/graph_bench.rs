//! Benchmarks for composite rebuild and layout recomputation, the two
//! passes that run after every structural edit.

use criterion::{Criterion, criterion_group, criterion_main};

use consola_graph::{Connection, GraphLayout, Node, NodeType, Topology, compose};

/// Default broadcast macro graph plus a row of channels feeding the band
/// group, each with a populated micro interior.
fn session_fixture() -> (Topology, Vec<(String, Topology)>) {
    let mut macro_topology = Topology::default_broadcast_layout();
    let mut views = Vec::new();

    for i in 0..16 {
        let id = format!("channel_{i}");
        macro_topology.add_node(Node::stereo(&id, NodeType::Channel).with_label(format!("Channel {i}")));
        for channel in 0..2 {
            macro_topology.connect(Connection::new(&id, channel, "band_group", channel));
        }

        let mut micro = Topology::channel_micro_layout(&id);
        micro.add_node(Node::stereo("effect_1", NodeType::Plugin));
        micro.disconnect(&format!("{id}_input"), &format!("{id}_output"));
        micro.connect(Connection::new(format!("{id}_input"), 0, "effect_1", 0));
        micro.connect(Connection::new("effect_1", 0, format!("{id}_output"), 0));
        views.push((id, micro));
    }

    (macro_topology, views)
}

fn bench_compose(c: &mut Criterion) {
    let (macro_topology, views) = session_fixture();

    c.bench_function("compose_16_channels", |b| {
        b.iter(|| {
            let refs = views.iter().map(|(id, t)| (id.as_str(), t));
            std::hint::black_box(compose(&macro_topology, refs))
        })
    });
}

fn bench_layout(c: &mut Criterion) {
    let (macro_topology, views) = session_fixture();
    let refs = views.iter().map(|(id, t)| (id.as_str(), t));
    let composite = compose(&macro_topology, refs);

    c.bench_function("layout_composite", |b| {
        let mut layout = GraphLayout::new();
        b.iter(|| {
            layout.rebuild(&composite.topology);
            std::hint::black_box(layout.version())
        })
    });
}

criterion_group!(benches, bench_compose, bench_layout);
criterion_main!(benches);
