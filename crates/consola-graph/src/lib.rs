//! Consola graph core — hierarchical routing topology for broadcast mixing.
//!
//! This crate holds the data structures and algorithms behind a consola
//! session: a macro graph of user-visible nodes (channels, buses, outputs),
//! per-node micro graphs describing each node's interior routing, and the
//! machinery to keep both consistent under structural edits.
//!
//! # Architecture
//!
//! The system uses a **two-object split**: editable [`Topology`] objects
//! owned by the orchestrator, and a derived [`Composite`] built by
//! [`compose()`] after every mutation. The composite is the immutable
//! artifact published to the audio backend; it is never edited in place.
//!
//! - [`Topology`] — ordered nodes + channel-indexed connection set with
//!   id→index lookup; prunes dangling edges on removal and channel shrink.
//! - [`rewire`] — mutation primitives shared by macro and micro graphs:
//!   delete-with-heal, all-or-nothing insert-between, port validation.
//! - [`compose()`] — flattens macro + micro graphs, inlining interiors
//!   with boundary leaves and adapting mono↔stereo channel fans.
//! - [`GraphLayout`] — longest-path column assignment and deterministic
//!   row ordering for visualization, with user position overrides.
//! - [`NamingPolicy`] — collision-checked id generation and auto-label
//!   renumbering.
//!
//! # Example
//!
//! ```rust
//! use consola_graph::{Connection, Node, NodeType, Topology, compose};
//!
//! let mut macro_graph = Topology::new();
//! macro_graph.add_node(Node::stereo("channel_1", NodeType::Channel));
//! macro_graph.add_node(Node::stereo("band_group", NodeType::GroupBus));
//! macro_graph.connect(Connection::new("channel_1", 0, "band_group", 0));
//! macro_graph.connect(Connection::new("channel_1", 1, "band_group", 1));
//!
//! let micro = Topology::channel_micro_layout("channel_1");
//! let composite = compose(&macro_graph, [("channel_1", &micro)]);
//!
//! // The channel is inlined: its boundary leaves replace it.
//! assert!(!composite.topology.contains("channel_1"));
//! assert!(composite.topology.contains("channel_1_output"));
//! ```

pub mod compose;
pub mod error;
pub mod layout;
pub mod naming;
pub mod node;
pub mod rewire;
pub mod topology;

pub use compose::{Composite, compose};
pub use error::GraphError;
pub use layout::{ConnectionVisual, GraphLayout, NodeVisual, PositionOverride};
pub use naming::{NamingPolicy, auto_label, generate_unique_id, is_auto_label, renumber_labels};
pub use node::{Connection, MAX_PORT_CHANNELS, Node, NodeType, PositionInfo, clamp_channels};
pub use topology::{Topology, boundary_input_id, boundary_output_id};
