//! The session orchestrator.
//!
//! [`Session`] owns the macro topology, the micro views, the naming
//! policy, and the layout engine, and wraps every structural edit the UI
//! can issue. Each mutating call follows the same shape: update the
//! relevant topology, rebuild the composite and publish it to the engine,
//! refresh the visual layout, and save the project if one is bound.
//! Mutators return `bool`; callers must check it before assuming state
//! changed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use consola_engine::{EngineSettings, EngineStatus, MixEngine};
use consola_graph::{
    Connection, GraphLayout, MAX_PORT_CHANNELS, NamingPolicy, Node, NodeType, PositionInfo,
    PositionOverride, Topology, auto_label, boundary_input_id, boundary_output_id, clamp_channels,
    compose, renumber_labels, rewire,
};
use consola_project::{LayoutPosition, MicroView, PositionPreset, Project, ProjectError};

use crate::template::NodeTemplate;

/// Application identity reported by the session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Application name.
    pub name: String,
    /// Application version string.
    pub version: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "consola".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Orchestrates one open project against one audio engine.
pub struct Session {
    config: SessionConfig,
    engine: MixEngine,
    project: Project,
    project_path: Option<PathBuf>,
    project_loaded: bool,
    naming: NamingPolicy,
    layout: GraphLayout,
    meter_aliases: HashMap<String, String>,
}

impl Session {
    /// Creates a session with an empty in-memory project and publishes the
    /// (empty) composite.
    pub fn new(config: SessionConfig, settings: EngineSettings) -> Self {
        tracing::info!(version = %config.version, "initializing session");
        let mut session = Self {
            project: Project::empty(config.name.clone()),
            config,
            engine: MixEngine::new(settings),
            project_path: None,
            project_loaded: false,
            naming: NamingPolicy::new(),
            layout: GraphLayout::new(),
            meter_aliases: HashMap::new(),
        };
        session.publish();
        session.refresh_layout();
        session
    }

    /// Loads a project directory and republishes everything.
    pub fn load_project(&mut self, path: &Path) -> Result<(), ProjectError> {
        let project = Project::load(path)?;
        self.naming.reset();
        self.project = project;
        self.project_path = Some(path.to_path_buf());
        self.project_loaded = true;
        self.publish();
        self.refresh_layout();
        Ok(())
    }

    // --- Accessors ---

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the open project state.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the macro topology.
    pub fn topology(&self) -> &Topology {
        &self.project.topology
    }

    /// Returns a copy of a macro node.
    pub fn node(&self, node_id: &str) -> Option<Node> {
        self.project.topology.find_node(node_id)
    }

    /// Returns a macro node's type.
    pub fn node_type_for(&self, node_id: &str) -> Option<NodeType> {
        self.project.topology.node(node_id).map(Node::node_type)
    }

    /// Returns the stored macro layout positions.
    pub fn macro_layout(&self) -> &HashMap<String, LayoutPosition> {
        &self.project.macro_layout
    }

    /// Returns the visual layout of the macro graph.
    pub fn layout(&self) -> &GraphLayout {
        &self.layout
    }

    /// Computes a visual layout for one micro view.
    pub fn micro_layout(&self, view_id: &str) -> Option<GraphLayout> {
        let view = self.project.micro_views.get(view_id)?;
        let micro = view.topology.as_ref()?;
        let mut layout = GraphLayout::new();
        layout.set_overrides(
            view.layout
                .iter()
                .map(|(id, p)| (id.clone(), PositionOverride { x: p.x, y: p.y }))
                .collect(),
        );
        layout.rebuild(micro);
        Some(layout)
    }

    /// Returns the audio engine.
    pub fn engine(&self) -> &MixEngine {
        &self.engine
    }

    /// Returns the currently published composite snapshot.
    pub fn composite(&self) -> Arc<Topology> {
        self.engine.topology()
    }

    /// Returns the macro-id → composite-id metering table from the last
    /// composition.
    pub fn meter_aliases(&self) -> &HashMap<String, String> {
        &self.meter_aliases
    }

    /// Starts the audio engine.
    pub fn start_engine(&mut self) {
        self.engine.start();
        self.refresh_layout();
    }

    /// Stops the audio engine.
    pub fn stop_engine(&mut self) {
        self.engine.stop();
    }

    /// Returns the engine status.
    pub fn engine_status(&self) -> EngineStatus {
        self.engine.status()
    }

    /// Returns meter levels for a macro node, resolved through the
    /// composer's alias table so inlined nodes read their boundary leaf.
    pub fn meter_levels(&self, node_id: &str) -> [f32; 2] {
        let resolved = self.meter_aliases.get(node_id).map_or(node_id, String::as_str);
        self.engine.meter_levels_for(resolved)
    }

    /// Returns meter levels for a micro node (micro ids pass through
    /// unaliased).
    pub fn meter_levels_micro(&self, _view_id: &str, node_id: &str) -> [f32; 2] {
        self.engine.meter_levels_for(node_id)
    }

    // --- Micro view lifecycle ---

    /// Opens a macro node's interior, synthesizing the default micro graph
    /// on first access. Returns `None` for nodes without an interior
    /// (plugins).
    pub fn open_micro_view(&mut self, view_id: &str) -> Option<&MicroView> {
        self.ensure_micro_view(view_id);
        self.project
            .micro_views
            .get(view_id)
            .filter(|view| view.topology.is_some())
    }

    /// Returns an already-open micro view without creating one.
    pub fn micro_view(&self, view_id: &str) -> Option<&MicroView> {
        self.project.micro_views.get(view_id)
    }

    fn ensure_micro_view(&mut self, view_id: &str) {
        let node_type = self
            .project
            .topology
            .node(view_id)
            .map_or(NodeType::GroupBus, Node::node_type);

        let view = self.project.micro_views.entry(view_id.to_string()).or_default();
        let mut created = false;
        if view.topology.is_none() && node_type != NodeType::Plugin {
            created = true;
            match node_type {
                NodeType::Channel | NodeType::Position => {
                    view.topology = Some(Topology::channel_micro_layout(view_id));
                    view.layout
                        .insert(boundary_input_id(view_id), LayoutPosition::new(0.05, 0.5));
                    view.layout
                        .insert(boundary_output_id(view_id), LayoutPosition::new(0.95, 0.5));
                }
                NodeType::GroupBus => {
                    view.topology = Some(Topology::group_micro_layout(view_id));
                    view.layout
                        .insert(boundary_output_id(view_id), LayoutPosition::new(0.95, 0.5));
                }
                NodeType::Output => {
                    view.topology = Some(Topology::output_micro_layout(view_id));
                    view.layout
                        .insert(boundary_input_id(view_id), LayoutPosition::new(0.05, 0.5));
                    view.layout
                        .insert(boundary_output_id(view_id), LayoutPosition::new(0.95, 0.5));
                }
                _ => view.topology = Some(Topology::new()),
            }
            tracing::debug!(view = view_id, ?node_type, "micro view created");
        }

        if self
            .project
            .micro_views
            .get(view_id)
            .is_some_and(|view| view.topology.is_some())
        {
            self.sync_micro_boundary(view_id);
            self.publish();
        }
        if created {
            self.persist();
        }
    }

    /// Re-derives a micro graph's boundary leaf channel counts from the
    /// macro node and re-establishes the direct Input→Output bridge, but
    /// only while no inline processing node sits between the leaves.
    fn sync_micro_boundary(&mut self, node_id: &str) {
        let Some(macro_node) = self.project.topology.find_node(node_id) else {
            return;
        };
        let Some(view) = self.project.micro_views.get_mut(node_id) else {
            return;
        };
        let Some(micro) = view.topology.as_mut() else {
            return;
        };

        let input_id = boundary_input_id(node_id);
        let output_id = boundary_output_id(node_id);
        let has_inline_nodes = micro
            .nodes()
            .iter()
            .any(|node| node.id() != input_id && node.id() != output_id);

        match macro_node.node_type() {
            NodeType::Channel | NodeType::Position => {
                let inputs = clamp_channels(macro_node.input_channels());
                let outputs = clamp_channels(macro_node.output_channels());
                micro.set_channel_counts(&input_id, 0, inputs);
                micro.set_channel_counts(&output_id, outputs, 0);
                if has_inline_nodes {
                    micro.disconnect(&input_id, &output_id);
                } else {
                    rewire::bridge(micro, &input_id, &output_id);
                }
            }
            NodeType::Output => {
                let inputs = clamp_channels(macro_node.input_channels());
                micro.set_channel_counts(&input_id, 0, inputs);
                micro.set_channel_counts(&output_id, inputs, 0);
                if has_inline_nodes {
                    micro.disconnect(&input_id, &output_id);
                } else {
                    rewire::bridge(micro, &input_id, &output_id);
                }
            }
            NodeType::GroupBus => {
                let outputs = clamp_channels(macro_node.output_channels());
                micro.set_channel_counts(&output_id, outputs, 0);
            }
            _ => {}
        }
    }

    // --- Macro mutations ---

    /// Creates a macro node from a template at a normalized position,
    /// optionally splicing it into an existing connection.
    pub fn create_node(
        &mut self,
        template: NodeTemplate,
        x: f32,
        y: f32,
        insert_between: Option<(&str, &str)>,
    ) -> bool {
        let id = self
            .naming
            .next_macro_id(&self.project.topology, template.prefix());
        let iteration = self.naming.macro_counter(template.prefix());
        let (inputs, outputs) = template.default_channels();

        let node = Node::new(&id, template.node_type())
            .with_channels(inputs, outputs)
            .with_label(auto_label(template.label_base(), iteration));
        self.project.topology.add_node(node);
        self.project
            .macro_layout
            .insert(id.clone(), LayoutPosition::new(x, y));
        tracing::debug!(node = %id, ?template, x, y, "macro node created");

        if let Some(edge) = insert_between
            && let Err(err) =
                rewire::insert_between(&mut self.project.topology, edge, &id, inputs, outputs)
        {
            tracing::debug!(%err, node = %id, "insertion fell back to a free node");
        }

        self.renumber(template);
        self.after_mutation();
        true
    }

    /// Deletes a macro node, healing the connections around it.
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        let Some(node) = self.project.topology.find_node(node_id) else {
            tracing::debug!(node = node_id, "delete aborted: node not found");
            return false;
        };
        let template = NodeTemplate::for_node_type(node.node_type());

        if rewire::remove_node_healed(&mut self.project.topology, node_id).is_err() {
            return false;
        }
        self.project.macro_layout.remove(node_id);
        self.project.micro_views.remove(node_id);

        if let Some(template) = template {
            self.renumber(template);
        }
        tracing::debug!(node = node_id, "macro node deleted");
        self.after_mutation();
        true
    }

    /// Flips a macro node's enabled flag.
    pub fn toggle_node_enabled(&mut self, node_id: &str) -> bool {
        if !self.project.topology.contains(node_id) {
            return false;
        }
        let enabled = self.project.topology.is_enabled(node_id);
        self.project.topology.set_enabled(node_id, !enabled);
        tracing::debug!(node = node_id, enabled = !enabled, "macro node toggled");
        self.after_mutation();
        true
    }

    /// Connects two macro nodes on the default (0,0)/(1,1) channel pairs.
    pub fn connect_nodes(&mut self, from: &str, to: &str) -> bool {
        if !rewire::connect_pairwise(&mut self.project.topology, from, to) {
            return false;
        }
        self.after_mutation();
        true
    }

    /// Removes every connection between two macro nodes.
    pub fn disconnect_nodes(&mut self, from: &str, to: &str) -> bool {
        if !rewire::disconnect_pairwise(&mut self.project.topology, from, to) {
            return false;
        }
        self.after_mutation();
        true
    }

    /// Connects one specific macro port pair.
    pub fn connect_node_ports(
        &mut self,
        from: &str,
        from_channel: u32,
        to: &str,
        to_channel: u32,
    ) -> bool {
        if from == to
            || self
                .project
                .topology
                .connection_exists(from, to, from_channel, to_channel)
        {
            return false;
        }
        match rewire::connect_ports(&mut self.project.topology, from, from_channel, to, to_channel)
        {
            Ok(()) => {
                self.after_mutation();
                true
            }
            Err(err) => {
                tracing::debug!(%err, "port connection rejected");
                false
            }
        }
    }

    /// Swaps the layout positions of two macro nodes. The topology is
    /// untouched; this backs drag-and-drop reordering.
    pub fn swap_nodes(&mut self, first: &str, second: &str) -> bool {
        if !self.project.topology.contains(first) || !self.project.topology.contains(second) {
            return false;
        }
        let first_position = self.find_macro_position(first);
        let second_position = self.find_macro_position(second);
        self.project
            .macro_layout
            .insert(first.to_string(), second_position);
        self.project
            .macro_layout
            .insert(second.to_string(), first_position);
        self.refresh_layout();
        self.persist();
        tracing::debug!(first, second, "macro nodes swapped");
        true
    }

    /// Moves an existing macro node onto an existing connection.
    pub fn insert_node_into_connection(&mut self, node_id: &str, edge: (&str, &str)) -> bool {
        if node_id == edge.0 || node_id == edge.1 {
            return false;
        }
        if !self.project.topology.contains(node_id)
            || !self.project.topology.contains(edge.0)
            || !self.project.topology.contains(edge.1)
        {
            return false;
        }
        if rewire::reinsert_between(&mut self.project.topology, node_id, edge).is_err() {
            return false;
        }
        tracing::debug!(node = node_id, from = edge.0, to = edge.1, "node spliced into connection");
        self.after_mutation();
        true
    }

    /// Reconfigures a macro node's channel counts (clamped to stereo) and
    /// re-derives its micro boundary.
    pub fn configure_node_channels(&mut self, node_id: &str, inputs: u32, outputs: u32) -> bool {
        let inputs = inputs.min(MAX_PORT_CHANNELS);
        let outputs = outputs.min(MAX_PORT_CHANNELS);

        if !self
            .project
            .topology
            .set_channel_counts(node_id, inputs, outputs)
        {
            return false;
        }
        self.sync_micro_boundary(node_id);
        self.after_mutation();
        true
    }

    /// Renames a macro node. The new label is treated as user-customized,
    /// so later renumbering passes leave it alone.
    pub fn rename_node(&mut self, node_id: &str, label: &str) -> bool {
        if !self.project.topology.contains(node_id) {
            return false;
        }
        self.project.topology.set_label(node_id, label);
        self.after_mutation();
        true
    }

    /// Stores a macro node's dragged position.
    pub fn set_node_position(&mut self, node_id: &str, x: f32, y: f32) {
        self.project
            .macro_layout
            .insert(node_id.to_string(), LayoutPosition::new(x, y));
        self.refresh_layout();
        self.persist();
    }

    // --- Micro mutations ---

    /// Creates a node inside a micro view. Signal generators infer their
    /// channel count from the insertion edge and the owning macro node.
    pub fn create_micro_node(
        &mut self,
        view_id: &str,
        template: NodeTemplate,
        x: f32,
        y: f32,
        insert_between: Option<(&str, &str)>,
    ) -> bool {
        self.ensure_micro_view(view_id);

        let macro_channels = self.project.topology.node(view_id).map(|node| {
            node.input_channels()
                .max(node.output_channels())
                .min(MAX_PORT_CHANNELS)
        });

        let Some(view) = self.project.micro_views.get_mut(view_id) else {
            return false;
        };
        let Some(micro) = view.topology.as_mut() else {
            return false;
        };

        let id = self.naming.next_micro_id(micro, view_id, template.prefix());
        let iteration = self.naming.micro_counter(view_id, template.prefix());

        let (inputs, outputs) = if template == NodeTemplate::SignalGenerator {
            let mut channels = channel_count_for_micro_insertion(micro, insert_between);
            if let Some(macro_channels) = macro_channels {
                channels = channels.max(macro_channels);
            }
            let channels = channels.max(1);
            (channels, channels)
        } else {
            template.default_channels()
        };

        let node = Node::new(&id, template.node_type())
            .with_channels(inputs, outputs)
            .with_label(auto_label(template.label_base(), iteration));
        micro.add_node(node);
        view.layout.insert(id.clone(), LayoutPosition::new(x, y));
        tracing::debug!(node = %id, view = view_id, ?template, "micro node created");

        if let Some(edge) = insert_between
            && let Err(err) = rewire::insert_between(micro, edge, &id, inputs, outputs)
        {
            tracing::debug!(%err, node = %id, view = view_id, "micro insertion fell back to a free node");
        }

        self.publish();
        self.persist();
        true
    }

    /// Deletes a micro node with connection healing.
    pub fn delete_micro_node(&mut self, view_id: &str, node_id: &str) -> bool {
        let Some(view) = self.project.micro_views.get_mut(view_id) else {
            return false;
        };
        let Some(micro) = view.topology.as_mut() else {
            return false;
        };
        if rewire::remove_node_healed(micro, node_id).is_err() {
            return false;
        }
        view.layout.remove(node_id);
        self.publish();
        self.persist();
        true
    }

    /// Flips a micro node's enabled flag.
    pub fn toggle_micro_node_enabled(&mut self, view_id: &str, node_id: &str) -> bool {
        let Some(view) = self.project.micro_views.get_mut(view_id) else {
            return false;
        };
        let Some(micro) = view.topology.as_mut() else {
            return false;
        };
        if !micro.contains(node_id) {
            return false;
        }
        let enabled = micro.is_enabled(node_id);
        micro.set_enabled(node_id, !enabled);
        self.publish();
        self.persist();
        true
    }

    /// Connects two micro nodes on the default channel pairs.
    pub fn connect_micro_nodes(&mut self, view_id: &str, from: &str, to: &str) -> bool {
        let Some(view) = self.project.micro_views.get_mut(view_id) else {
            return false;
        };
        let Some(micro) = view.topology.as_mut() else {
            return false;
        };
        if !rewire::connect_pairwise(micro, from, to) {
            return false;
        }
        self.publish();
        self.persist();
        true
    }

    /// Removes every connection between two micro nodes.
    pub fn disconnect_micro_nodes(&mut self, view_id: &str, from: &str, to: &str) -> bool {
        let Some(view) = self.project.micro_views.get_mut(view_id) else {
            return false;
        };
        let Some(micro) = view.topology.as_mut() else {
            return false;
        };
        if !rewire::disconnect_pairwise(micro, from, to) {
            return false;
        }
        self.publish();
        self.persist();
        true
    }

    /// Connects one specific micro port pair, creating the view if needed.
    pub fn connect_micro_node_ports(
        &mut self,
        view_id: &str,
        from: &str,
        from_channel: u32,
        to: &str,
        to_channel: u32,
    ) -> bool {
        self.ensure_micro_view(view_id);
        if from == to {
            return false;
        }
        let Some(view) = self.project.micro_views.get_mut(view_id) else {
            return false;
        };
        let Some(micro) = view.topology.as_mut() else {
            return false;
        };
        if micro.connection_exists(from, to, from_channel, to_channel) {
            return false;
        }
        if rewire::connect_ports(micro, from, from_channel, to, to_channel).is_err() {
            return false;
        }
        self.publish();
        self.persist();
        true
    }

    /// Swaps the stored layout positions of two micro nodes.
    pub fn swap_micro_nodes(&mut self, view_id: &str, first: &str, second: &str) -> bool {
        let Some(view) = self.project.micro_views.get_mut(view_id) else {
            return false;
        };
        if view.topology.is_none() {
            return false;
        }
        let first_position = view.layout.get(first).copied().unwrap_or_default();
        let second_position = view.layout.get(second).copied().unwrap_or_default();
        view.layout.insert(first.to_string(), second_position);
        view.layout.insert(second.to_string(), first_position);
        self.persist();
        true
    }

    /// Moves an existing micro node onto an existing micro connection.
    pub fn insert_micro_node_into_connection(
        &mut self,
        view_id: &str,
        node_id: &str,
        edge: (&str, &str),
    ) -> bool {
        self.ensure_micro_view(view_id);
        if node_id == edge.0 || node_id == edge.1 {
            return false;
        }
        let Some(view) = self.project.micro_views.get_mut(view_id) else {
            return false;
        };
        let Some(micro) = view.topology.as_mut() else {
            return false;
        };
        if !micro.contains(node_id) || !micro.contains(edge.0) || !micro.contains(edge.1) {
            return false;
        }
        if rewire::reinsert_between(micro, node_id, edge).is_err() {
            return false;
        }
        self.publish();
        self.persist();
        true
    }

    /// Stores a micro node's dragged position, creating the view if needed.
    pub fn set_micro_node_position(&mut self, view_id: &str, node_id: &str, x: f32, y: f32) {
        self.ensure_micro_view(view_id);
        if let Some(view) = self.project.micro_views.get_mut(view_id) {
            view.layout
                .insert(node_id.to_string(), LayoutPosition::new(x, y));
        }
        self.persist();
    }

    /// Updates a Position node's person metadata. The applied-preset name
    /// is kept; capturing or applying a preset manages it.
    pub fn set_position_info(&mut self, node_id: &str, info: PositionInfo) -> bool {
        let Some(node) = self.project.topology.node_mut(node_id) else {
            return false;
        };
        if node.node_type() != NodeType::Position {
            return false;
        }
        let current = node.position_mut();
        current.person = info.person;
        current.role = info.role;
        current.source = info.source;
        current.profile_image = info.profile_image;
        self.refresh_layout();
        self.persist();
        true
    }

    // --- Position presets ---

    /// Returns the saved position presets.
    pub fn position_presets(&self) -> &[PositionPreset] {
        &self.project.position_presets
    }

    /// Captures a Position node's person metadata, micro graph, and micro
    /// layout as a named preset, replacing any preset with the same name.
    pub fn save_position_preset(&mut self, node_id: &str, preset_name: &str) -> bool {
        let Some(node) = self.project.topology.find_node(node_id) else {
            return false;
        };
        if node.node_type() != NodeType::Position {
            return false;
        }

        let view = self.project.micro_views.get(node_id);
        let preset = PositionPreset {
            name: preset_name.to_string(),
            person: node.position().person.clone(),
            role: node.position().role.clone(),
            profile_image: node.position().profile_image.clone(),
            topology: view.and_then(|view| view.topology.clone()),
            layout: view.map(|view| view.layout.clone()).unwrap_or_default(),
        };

        self.project
            .position_presets
            .retain(|existing| existing.name != preset_name);
        self.project.position_presets.push(preset);
        if let Some(node) = self.project.topology.node_mut(node_id) {
            node.position_mut().preset = preset_name.to_string();
        }
        tracing::debug!(node = node_id, preset = preset_name, "position preset saved");
        self.refresh_layout();
        self.persist();
        true
    }

    /// Applies a saved preset to a Position node: person metadata plus a
    /// retargeted copy of the preset's micro graph and layout.
    pub fn apply_position_preset(&mut self, node_id: &str, preset_name: &str) -> bool {
        let Some(preset) = self
            .project
            .position_presets
            .iter()
            .find(|preset| preset.name == preset_name)
            .cloned()
        else {
            return false;
        };
        let Some(node_type) = self.node_type_for(node_id) else {
            return false;
        };
        if node_type != NodeType::Position {
            return false;
        }

        if let Some(node) = self.project.topology.node_mut(node_id) {
            let info = node.position_mut();
            info.person = preset.person.clone();
            info.role = preset.role.clone();
            info.profile_image = preset.profile_image.clone();
            info.preset = preset.name.clone();
        }

        if let Some(preset_topology) = &preset.topology {
            let (micro, id_map) = retarget_micro(preset_topology, node_id);
            let layout = preset
                .layout
                .iter()
                .filter_map(|(id, position)| {
                    id_map.get(id).map(|new_id| (new_id.clone(), *position))
                })
                .collect();
            self.project.micro_views.insert(
                node_id.to_string(),
                MicroView {
                    topology: Some(micro),
                    layout,
                },
            );
            self.sync_micro_boundary(node_id);
        }
        tracing::debug!(node = node_id, preset = preset_name, "position preset applied");
        self.after_mutation();
        true
    }

    // --- Internal plumbing ---

    /// Rebuilds the composite, refreshes the meter alias table, and
    /// publishes the new snapshot to the engine.
    fn publish(&mut self) {
        let views = self
            .project
            .micro_views
            .iter()
            .filter_map(|(id, view)| view.topology.as_ref().map(|micro| (id.as_str(), micro)));
        let composite = compose(&self.project.topology, views);
        self.meter_aliases = composite.meter_aliases;
        self.engine.set_topology(Arc::new(composite.topology));
    }

    /// Reapplies macro layout overrides and recomputes the visual layout.
    fn refresh_layout(&mut self) {
        let overrides = self
            .project
            .macro_layout
            .iter()
            .map(|(id, position)| {
                (
                    id.clone(),
                    PositionOverride {
                        x: position.x,
                        y: position.y,
                    },
                )
            })
            .collect();
        self.layout.set_overrides(overrides);
        self.layout.rebuild(&self.project.topology);
    }

    /// Saves the project when one is bound. Persistence failures are
    /// logged, not propagated; the in-memory state is already mutated.
    fn persist(&mut self) {
        if !self.project_loaded {
            return;
        }
        if let Some(path) = &self.project_path
            && let Err(err) = self.project.save(path)
        {
            tracing::warn!(%err, path = %path.display(), "project save failed");
        }
    }

    fn after_mutation(&mut self) {
        self.publish();
        self.refresh_layout();
        self.persist();
    }

    fn renumber(&mut self, template: NodeTemplate) {
        let mut ids: Vec<String> = self
            .project
            .topology
            .nodes()
            .iter()
            .filter(|node| NodeTemplate::for_node_type(node.node_type()) == Some(template))
            .map(|node| node.id().to_string())
            .collect();
        ids.sort();
        renumber_labels(&mut self.project.topology, template.label_base(), &ids);
    }

    fn find_macro_position(&self, node_id: &str) -> LayoutPosition {
        if let Some(position) = self.project.macro_layout.get(node_id) {
            return *position;
        }
        self.layout
            .nodes()
            .iter()
            .find(|visual| visual.id == node_id)
            .map_or_else(LayoutPosition::default, |visual| {
                LayoutPosition::new(visual.x, visual.y)
            })
    }
}

/// Channel count for a signal generator spliced into a micro connection:
/// wide enough for both ends of the edge, clamped to the stereo cap.
fn channel_count_for_micro_insertion(micro: &Topology, edge: Option<(&str, &str)>) -> u32 {
    let Some((from, to)) = edge else {
        return MAX_PORT_CHANNELS;
    };
    let upstream = micro.node(from).map_or(MAX_PORT_CHANNELS, Node::output_channels);
    let downstream = micro.node(to).map_or(MAX_PORT_CHANNELS, Node::input_channels);
    clamp_channels(upstream.max(downstream))
}

/// Rebuilds a preset's micro graph for a new owning node: boundary leaves
/// take the target's conventional ids, interior nodes keep theirs. Returns
/// the rebuilt topology and the old→new id map for layout retargeting.
fn retarget_micro(preset: &Topology, target_id: &str) -> (Topology, HashMap<String, String>) {
    let mut id_map: HashMap<String, String> = HashMap::new();
    for node in preset.nodes() {
        let new_id = match node.node_type() {
            NodeType::Input => boundary_input_id(target_id),
            NodeType::Output => boundary_output_id(target_id),
            _ => node.id().to_string(),
        };
        id_map.insert(node.id().to_string(), new_id);
    }

    let mut topology = Topology::new();
    for node in preset.nodes() {
        let mut clone = Node::new(&id_map[node.id()], node.node_type())
            .with_label(node.label())
            .with_channels(node.input_channels(), node.output_channels());
        clone.set_enabled(node.enabled());
        *clone.position_mut() = node.position().clone();
        topology.add_node(clone);
    }
    for connection in preset.connections() {
        let from = id_map.get(&connection.from).unwrap_or(&connection.from);
        let to = id_map.get(&connection.to).unwrap_or(&connection.to);
        topology.connect(Connection::new(
            from,
            connection.from_channel,
            to,
            connection.to_channel,
        ));
    }
    (topology, id_map)
}
