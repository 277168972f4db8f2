//! Consola session orchestration.
//!
//! A [`Session`] ties the pieces together: it owns the macro topology and
//! the per-node micro views, applies every structural edit through the
//! graph crate's rewiring primitives, rebuilds the flattened composite
//! after each change, publishes it to the audio engine as an immutable
//! snapshot, and keeps the visual layout and the on-disk project in step.
//!
//! # Example
//!
//! ```rust
//! use consola_engine::EngineSettings;
//! use consola_session::{NodeTemplate, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default(), EngineSettings::default());
//! session.create_node(NodeTemplate::Channel, 0.2, 0.5, None);
//! assert_eq!(session.topology().node_count(), 1);
//! ```

mod session;
mod template;

pub use session::{Session, SessionConfig};
pub use template::NodeTemplate;
