//! In-memory project state.

use std::collections::HashMap;
use std::path::PathBuf;

use consola_graph::Topology;
use serde::{Deserialize, Serialize};

/// A normalized node position inside a graph canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutPosition {
    /// Normalized x in `[0, 1]`.
    pub x: f32,
    /// Normalized y in `[0, 1]`.
    pub y: f32,
}

impl Default for LayoutPosition {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl LayoutPosition {
    /// Creates a position, clamping both coordinates to `[0, 1]`.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// The interior state of one macro node: its micro graph (if the node has
/// an interior at all) and per-node layout overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MicroView {
    /// The micro topology; `None` for nodes without an interior.
    pub topology: Option<Topology>,
    /// Normalized positions for micro nodes.
    pub layout: HashMap<String, LayoutPosition>,
}

/// A named, detachable snapshot of a Position node: person metadata plus
/// the node's micro graph and micro layout, reapplicable to other nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionPreset {
    /// Preset name.
    pub name: String,
    /// Person occupying the position when captured.
    pub person: String,
    /// Their role.
    pub role: String,
    /// Profile image path.
    pub profile_image: String,
    /// The captured micro topology.
    pub topology: Option<Topology>,
    /// The captured micro layout.
    pub layout: HashMap<String, LayoutPosition>,
}

/// Everything a consola session persists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Project {
    /// Project name (defaults to the directory name).
    pub name: String,
    /// The macro routing graph.
    pub topology: Topology,
    /// Names of stored mix snapshots.
    pub snapshot_names: Vec<String>,
    /// Path of the most recent autosaved graph, if one exists.
    pub last_autosave: Option<PathBuf>,
    /// Normalized positions of macro nodes.
    pub macro_layout: HashMap<String, LayoutPosition>,
    /// Interior state per macro node id.
    pub micro_views: HashMap<String, MicroView>,
    /// Saved position presets.
    pub position_presets: Vec<PositionPreset>,
}

impl Project {
    /// Creates an empty project with the given name.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a project seeded with the default broadcast macro graph.
    pub fn with_default_graph(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topology: Topology::default_broadcast_layout(),
            ..Self::default()
        }
    }
}
