//! Node creation templates.
//!
//! A template bundles everything node creation needs: the graph node type,
//! the id prefix, the label base for auto-numbering, and default channel
//! counts.

use consola_graph::NodeType;

/// The kinds of node a user can create from the palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeTemplate {
    /// A source channel strip.
    Channel,
    /// A hardware output.
    Output,
    /// A group bus.
    Group,
    /// A named on-air position.
    Position,
    /// A plugin effect.
    Effect,
    /// A test-signal generator.
    SignalGenerator,
}

impl NodeTemplate {
    /// Id prefix for generated node ids (`channel_3`, `effect_1`, ...).
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Output => "output",
            Self::Group => "group",
            Self::Position => "position",
            Self::Effect => "effect",
            Self::SignalGenerator => "signal",
        }
    }

    /// Label base for auto-generated labels (`"Channel 3"`, ...).
    pub fn label_base(self) -> &'static str {
        match self {
            Self::Channel => "Channel",
            Self::Output => "Output",
            Self::Group => "Group",
            Self::Position => "Position",
            Self::Effect => "Effect",
            Self::SignalGenerator => "Signal Generator",
        }
    }

    /// The graph node type this template creates.
    pub fn node_type(self) -> NodeType {
        match self {
            Self::Channel => NodeType::Channel,
            Self::Output => NodeType::Output,
            Self::Group => NodeType::GroupBus,
            Self::Position => NodeType::Position,
            Self::Effect => NodeType::Plugin,
            Self::SignalGenerator => NodeType::SignalGenerator,
        }
    }

    /// Default (input, output) channel counts for a freshly created node.
    pub fn default_channels(self) -> (u32, u32) {
        match self {
            Self::Output => (2, 0),
            Self::Channel | Self::Group | Self::Position | Self::Effect | Self::SignalGenerator => {
                (2, 2)
            }
        }
    }

    /// The template a graph node type maps back to, used for renumbering
    /// after deletions. Types the palette cannot create return `None`.
    pub fn for_node_type(node_type: NodeType) -> Option<Self> {
        match node_type {
            NodeType::Channel => Some(Self::Channel),
            NodeType::Output => Some(Self::Output),
            NodeType::GroupBus => Some(Self::Group),
            NodeType::Position => Some(Self::Position),
            NodeType::Plugin => Some(Self::Effect),
            NodeType::SignalGenerator => Some(Self::SignalGenerator),
            NodeType::Input
            | NodeType::BroadcastBus
            | NodeType::MixBus
            | NodeType::Utility => None,
        }
    }
}
