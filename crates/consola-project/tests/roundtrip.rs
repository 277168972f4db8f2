//! Disk round-trip tests over a full project directory.

use std::collections::HashMap;

use consola_graph::{Connection, Node, NodeType, Topology};
use consola_project::{LayoutPosition, MicroView, PositionPreset, Project};

fn populated_project() -> Project {
    let mut project = Project::with_default_graph("Saturday Service");

    let node = project
        .topology
        .add_node(Node::stereo("position_1", NodeType::Position).with_label("Position 1"));
    node.position_mut().person = "Priya Nair".to_string();
    node.position_mut().role = "Host".to_string();
    node.position_mut().source = "Stage Box 3".to_string();
    project
        .topology
        .connect(Connection::new("position_1", 0, "vocal_group", 0));
    project
        .topology
        .connect(Connection::new("position_1", 1, "vocal_group", 1));

    project
        .macro_layout
        .insert("position_1".to_string(), LayoutPosition::new(0.1, 0.3));

    let mut micro = Topology::channel_micro_layout("position_1");
    micro.add_node(Node::stereo("effect_1", NodeType::Plugin).with_label("Effect 1"));
    project.micro_views.insert(
        "position_1".to_string(),
        MicroView {
            topology: Some(micro),
            layout: HashMap::from([
                ("position_1_input".to_string(), LayoutPosition::new(0.05, 0.5)),
                ("position_1_output".to_string(), LayoutPosition::new(0.95, 0.5)),
            ]),
        },
    );

    project.position_presets.push(PositionPreset {
        name: "Priya / Host".to_string(),
        person: "Priya Nair".to_string(),
        role: "Host".to_string(),
        profile_image: "media/priya.png".to_string(),
        topology: Some(Topology::channel_micro_layout("position_1")),
        layout: HashMap::new(),
    });

    project
}

#[test]
fn save_then_load_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("SaturdayService.consola");

    let project = populated_project();
    project.save(&root).unwrap();
    let reloaded = Project::load(&root).unwrap();

    assert_eq!(reloaded.name, project.name);
    assert_eq!(reloaded.topology, project.topology);
    assert_eq!(reloaded.macro_layout, project.macro_layout);
    assert_eq!(reloaded.micro_views, project.micro_views);
    assert_eq!(reloaded.position_presets, project.position_presets);
    assert_eq!(reloaded.snapshot_names, vec!["Service Default".to_string()]);
}

#[test]
fn save_into_fresh_directory_then_reload_twice_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Stable");

    populated_project().save(&root).unwrap();
    let first = Project::load(&root).unwrap();
    first.save(&root).unwrap();
    let second = Project::load(&root).unwrap();

    assert_eq!(first, second);
}
