//! The on-disk JSON document schema and conversions to the graph model.
//!
//! The schema mirrors `graph.json` as the desktop app has always written
//! it: node records with a string `type`, camelCase connection endpoints,
//! a `layout` object split into `macro` and `micro` maps, and a
//! `positionPresets` array. Unknown node types are skipped on load rather
//! than failing the whole file.

use std::collections::HashMap;

use consola_graph::{Connection, Node, NodeType, Topology};
use serde::{Deserialize, Serialize};

use crate::model::{LayoutPosition, MicroView, PositionPreset, Project};

fn default_true() -> bool {
    true
}

/// One node record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeDoc {
    /// Stable node id.
    pub id: String,
    /// Node type name (e.g. `"Channel"`, `"GroupBus"`).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Input channel count.
    #[serde(default)]
    pub inputs: u32,
    /// Output channel count.
    #[serde(default)]
    pub outputs: u32,
    /// Enabled flag; absent means enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Person name for Position nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub person: String,
    /// Role for Position nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    /// Source description for Position nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// Profile image path for Position nodes.
    #[serde(default, rename = "profileImage", skip_serializing_if = "String::is_empty")]
    pub profile_image: String,
    /// Applied preset name for Position nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preset: String,
}

/// One connection record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionDoc {
    /// Source node id.
    pub from: String,
    /// Source channel index.
    #[serde(default, rename = "fromChannel")]
    pub from_channel: u32,
    /// Destination node id.
    pub to: String,
    /// Destination channel index.
    #[serde(default, rename = "toChannel")]
    pub to_channel: u32,
}

/// A serialized topology.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphDoc {
    /// Node records, in topology order.
    #[serde(default)]
    pub nodes: Vec<NodeDoc>,
    /// Connection records.
    #[serde(default)]
    pub connections: Vec<ConnectionDoc>,
}

/// One micro view: its graph plus node positions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MicroViewDoc {
    /// The interior graph; absent for nodes without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphDoc>,
    /// Normalized micro node positions.
    #[serde(default)]
    pub layout: HashMap<String, LayoutPosition>,
}

/// The `layout` object: macro positions and micro view states.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutDoc {
    /// Macro node positions.
    #[serde(default, rename = "macro")]
    pub macro_layout: HashMap<String, LayoutPosition>,
    /// Micro views keyed by macro node id.
    #[serde(default, rename = "micro")]
    pub micro_views: HashMap<String, MicroViewDoc>,
}

/// One saved position preset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PositionPresetDoc {
    /// Preset name.
    #[serde(default)]
    pub name: String,
    /// Captured person name.
    #[serde(default)]
    pub person: String,
    /// Captured role.
    #[serde(default)]
    pub role: String,
    /// Captured profile image path.
    #[serde(default, rename = "profileImage")]
    pub profile_image: String,
    /// Captured micro graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphDoc>,
    /// Captured micro layout.
    #[serde(default)]
    pub layout: HashMap<String, LayoutPosition>,
}

/// The root `graph.json` document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProjectDoc {
    /// Project name.
    #[serde(default)]
    pub name: String,
    /// The macro graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphDoc>,
    /// Layout maps, when any position has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutDoc>,
    /// Saved position presets.
    #[serde(default, rename = "positionPresets", skip_serializing_if = "Vec::is_empty")]
    pub position_presets: Vec<PositionPresetDoc>,
}

fn node_type_to_str(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Input => "Input",
        NodeType::Channel => "Channel",
        NodeType::GroupBus => "GroupBus",
        NodeType::Position => "Position",
        NodeType::BroadcastBus => "BroadcastBus",
        NodeType::MixBus => "MixBus",
        NodeType::Utility => "Utility",
        NodeType::Plugin => "Plugin",
        NodeType::SignalGenerator => "SignalGenerator",
        NodeType::Output => "Output",
    }
}

fn node_type_from_str(value: &str) -> Option<NodeType> {
    match value {
        "Input" => Some(NodeType::Input),
        "Channel" => Some(NodeType::Channel),
        "GroupBus" => Some(NodeType::GroupBus),
        "Position" => Some(NodeType::Position),
        "BroadcastBus" => Some(NodeType::BroadcastBus),
        "MixBus" => Some(NodeType::MixBus),
        "Utility" => Some(NodeType::Utility),
        "Plugin" => Some(NodeType::Plugin),
        "SignalGenerator" => Some(NodeType::SignalGenerator),
        "Output" => Some(NodeType::Output),
        _ => None,
    }
}

/// Serializes a topology into its document form.
pub fn graph_to_doc(topology: &Topology) -> GraphDoc {
    let nodes = topology
        .nodes()
        .iter()
        .map(|node| NodeDoc {
            id: node.id().to_string(),
            node_type: node_type_to_str(node.node_type()).to_string(),
            label: node.label().to_string(),
            inputs: node.input_channels(),
            outputs: node.output_channels(),
            enabled: node.enabled(),
            person: node.position().person.clone(),
            role: node.position().role.clone(),
            source: node.position().source.clone(),
            profile_image: node.position().profile_image.clone(),
            preset: node.position().preset.clone(),
        })
        .collect();

    let connections = topology
        .connections()
        .iter()
        .map(|connection| ConnectionDoc {
            from: connection.from.clone(),
            from_channel: connection.from_channel,
            to: connection.to.clone(),
            to_channel: connection.to_channel,
        })
        .collect();

    GraphDoc { nodes, connections }
}

/// Rebuilds a topology from its document form.
///
/// Nodes with unrecognized types are skipped. A signal generator that was
/// saved with zero channels is repaired to stereo on both sides, matching
/// how old project files are healed.
pub fn graph_from_doc(doc: &GraphDoc) -> Topology {
    let mut topology = Topology::new();

    for node_doc in &doc.nodes {
        let Some(node_type) = node_type_from_str(&node_doc.node_type) else {
            tracing::warn!(id = %node_doc.id, kind = %node_doc.node_type, "skipping node with unknown type");
            continue;
        };

        let mut inputs = node_doc.inputs;
        let mut outputs = node_doc.outputs;
        if node_type == NodeType::SignalGenerator {
            if inputs == 0 {
                inputs = 2;
            }
            if outputs == 0 {
                outputs = 2;
            }
        }

        let mut node = Node::new(&node_doc.id, node_type)
            .with_label(&node_doc.label)
            .with_channels(inputs, outputs);
        node.set_enabled(node_doc.enabled);
        let info = node.position_mut();
        info.person = node_doc.person.clone();
        info.role = node_doc.role.clone();
        info.source = node_doc.source.clone();
        info.profile_image = node_doc.profile_image.clone();
        info.preset = node_doc.preset.clone();
        topology.add_node(node);
    }

    for connection_doc in &doc.connections {
        topology.connect(Connection::new(
            &connection_doc.from,
            connection_doc.from_channel,
            &connection_doc.to,
            connection_doc.to_channel,
        ));
    }

    topology
}

fn micro_view_to_doc(view: &MicroView) -> MicroViewDoc {
    MicroViewDoc {
        graph: view.topology.as_ref().map(graph_to_doc),
        layout: view.layout.clone(),
    }
}

fn micro_view_from_doc(doc: &MicroViewDoc) -> MicroView {
    MicroView {
        topology: doc.graph.as_ref().map(graph_from_doc),
        layout: doc.layout.clone(),
    }
}

/// Serializes a project into the root document.
pub fn project_to_doc(project: &Project) -> ProjectDoc {
    let layout = if project.macro_layout.is_empty() && project.micro_views.is_empty() {
        None
    } else {
        Some(LayoutDoc {
            macro_layout: project.macro_layout.clone(),
            micro_views: project
                .micro_views
                .iter()
                .map(|(id, view)| (id.clone(), micro_view_to_doc(view)))
                .collect(),
        })
    };

    ProjectDoc {
        name: project.name.clone(),
        graph: Some(graph_to_doc(&project.topology)),
        layout,
        position_presets: project
            .position_presets
            .iter()
            .map(|preset| PositionPresetDoc {
                name: preset.name.clone(),
                person: preset.person.clone(),
                role: preset.role.clone(),
                profile_image: preset.profile_image.clone(),
                graph: preset.topology.as_ref().map(graph_to_doc),
                layout: preset.layout.clone(),
            })
            .collect(),
    }
}

/// Rebuilds a project from the root document. Fields the document lacks
/// come back empty; the caller fills in directory-derived state (name
/// fallback, snapshots, autosave path).
pub fn project_from_doc(doc: &ProjectDoc) -> Project {
    let mut project = Project::empty(doc.name.clone());
    if let Some(graph) = &doc.graph {
        project.topology = graph_from_doc(graph);
    }
    if let Some(layout) = &doc.layout {
        project.macro_layout = layout.macro_layout.clone();
        project.micro_views = layout
            .micro_views
            .iter()
            .map(|(id, view)| (id.clone(), micro_view_from_doc(view)))
            .collect();
    }
    project.position_presets = doc
        .position_presets
        .iter()
        .map(|preset| PositionPreset {
            name: preset.name.clone(),
            person: preset.person.clone(),
            role: preset.role.clone(),
            profile_image: preset.profile_image.clone(),
            topology: preset.graph.as_ref().map(graph_from_doc),
            layout: preset.layout.clone(),
        })
        .collect();
    project
}
