//! Node and connection types for the routing topology.
//!
//! A [`Node`] is identified by a stable string id that stays valid across
//! macro/micro boundaries; the composer relies on that stability when it
//! aliases boundary nodes. A [`Connection`] is a channel-indexed directed
//! edge between two node ids.

/// Hard cap on port channels per side of a connection.
///
/// The routing model is mono/stereo only; every channel-count computation
/// clamps to this limit.
pub const MAX_PORT_CHANNELS: u32 = 2;

/// The role of a node in a routing topology.
///
/// Every decision point in the composer, rewiring engine, and layout engine
/// matches exhaustively on this type, so adding a variant is a
/// compile-checked exercise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Boundary node feeding audio into a micro graph.
    Input,
    /// A source channel strip.
    Channel,
    /// A submix bus grouping several channels.
    GroupBus,
    /// A named on-air position (commentator, host) with person metadata.
    Position,
    /// The master bus feeding the broadcast output.
    BroadcastBus,
    /// A general-purpose mix bus (e.g. monitoring).
    MixBus,
    /// Utility processing (trim, passthrough).
    Utility,
    /// A hosted plugin.
    Plugin,
    /// A test-signal source.
    SignalGenerator,
    /// Boundary node draining audio out of a graph.
    Output,
}

/// Person metadata carried by [`NodeType::Position`] nodes.
///
/// Empty strings mean "unset"; the fields round-trip through persistence
/// and travel into presets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionInfo {
    /// Display name of the person occupying the position.
    pub person: String,
    /// Their role (e.g. "Commentary", "Analyst").
    pub role: String,
    /// Physical or logical input source description.
    pub source: String,
    /// Path to a profile image, if any.
    pub profile_image: String,
    /// Name of the preset last applied to this position.
    pub preset: String,
}

impl PositionInfo {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.person.is_empty()
            && self.role.is_empty()
            && self.source.is_empty()
            && self.profile_image.is_empty()
            && self.preset.is_empty()
    }
}

/// A node in a routing topology.
///
/// Nodes are owned exclusively by the [`Topology`](crate::Topology) that
/// contains them; channel counts are small unsigned integers practically
/// capped at [`MAX_PORT_CHANNELS`].
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: String,
    node_type: NodeType,
    label: String,
    input_channels: u32,
    output_channels: u32,
    enabled: bool,
    position: PositionInfo,
}

impl Node {
    /// Creates a node with no channels, an empty label, and enabled state.
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: String::new(),
            input_channels: 0,
            output_channels: 0,
            enabled: true,
            position: PositionInfo::default(),
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets input and output channel counts.
    pub fn with_channels(mut self, inputs: u32, outputs: u32) -> Self {
        self.input_channels = inputs;
        self.output_channels = outputs;
        self
    }

    /// Creates a node with stereo inputs and outputs.
    pub fn stereo(id: impl Into<String>, node_type: NodeType) -> Self {
        Self::new(id, node_type).with_channels(2, 2)
    }

    /// Returns the stable string id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the node's role.
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Returns the raw display label (possibly empty).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the label shown to the user: the occupying person for a
    /// Position node, otherwise the label, otherwise the id.
    pub fn display_label(&self) -> &str {
        if self.node_type == NodeType::Position && !self.position.person.is_empty() {
            return &self.position.person;
        }
        if self.label.is_empty() { &self.id } else { &self.label }
    }

    /// Sets the display label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Returns the input channel count.
    pub fn input_channels(&self) -> u32 {
        self.input_channels
    }

    /// Returns the output channel count.
    pub fn output_channels(&self) -> u32 {
        self.output_channels
    }

    /// Sets the input channel count.
    ///
    /// Prefer [`Topology::set_channel_counts`](crate::Topology::set_channel_counts)
    /// for nodes already in a topology; it prunes out-of-range connections.
    pub fn set_input_channels(&mut self, count: u32) {
        self.input_channels = count;
    }

    /// Sets the output channel count. See [`Self::set_input_channels`].
    pub fn set_output_channels(&mut self, count: u32) {
        self.output_channels = count;
    }

    /// Returns whether the node is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the enabled flag.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns the person metadata.
    pub fn position(&self) -> &PositionInfo {
        &self.position
    }

    /// Returns mutable person metadata.
    pub fn position_mut(&mut self) -> &mut PositionInfo {
        &mut self.position
    }
}

/// A directed, channel-indexed connection between two nodes.
///
/// Channel indices must be below the corresponding node's channel count;
/// the invariant is enforced at mutation time by
/// [`Topology::set_channel_counts`](crate::Topology::set_channel_counts)
/// pruning, not continuously.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Source node id.
    pub from: String,
    /// Source channel index.
    pub from_channel: u32,
    /// Destination node id.
    pub to: String,
    /// Destination channel index.
    pub to_channel: u32,
}

impl Connection {
    /// Creates a connection between two node ports.
    pub fn new(
        from: impl Into<String>,
        from_channel: u32,
        to: impl Into<String>,
        to_channel: u32,
    ) -> Self {
        Self {
            from: from.into(),
            from_channel,
            to: to.into(),
            to_channel,
        }
    }

    /// Returns true if the connection touches the given node on either end.
    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

/// Clamps a channel count into the supported 1..=2 range.
pub fn clamp_channels(count: u32) -> u32 {
    count.clamp(1, MAX_PORT_CHANNELS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_prefers_person_for_positions() {
        let mut node = Node::new("pos_1", NodeType::Position).with_label("Position 1");
        assert_eq!(node.display_label(), "Position 1");
        node.position_mut().person = "Alex Reyes".to_string();
        assert_eq!(node.display_label(), "Alex Reyes");
    }

    #[test]
    fn display_label_falls_back_to_id() {
        let node = Node::new("bus_7", NodeType::MixBus);
        assert_eq!(node.display_label(), "bus_7");
    }

    #[test]
    fn clamp_channels_caps_at_two() {
        assert_eq!(clamp_channels(0), 1);
        assert_eq!(clamp_channels(1), 1);
        assert_eq!(clamp_channels(2), 2);
        assert_eq!(clamp_channels(8), 2);
    }

    #[test]
    fn connection_touches_either_endpoint() {
        let conn = Connection::new("a", 0, "b", 1);
        assert!(conn.touches("a"));
        assert!(conn.touches("b"));
        assert!(!conn.touches("c"));
    }
}
