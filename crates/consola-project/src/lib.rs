//! Project persistence for consola.
//!
//! A project lives in a directory with a fixed skeleton: `graph.json`
//! (macro graph, layouts, micro views, position presets), a `snapshots/`
//! index, and `autosave/`, `media/`, `captures/`, `logs/` folders. This
//! crate defines the in-memory [`Project`] model, the JSON document
//! schema, and load/save with round-trip fidelity.
//!
//! # Example
//!
//! ```rust,no_run
//! use consola_project::Project;
//!
//! let project = Project::load("shows/saturday.consola".as_ref()).unwrap();
//! println!("{} nodes", project.topology.node_count());
//! ```

mod document;
mod error;
mod model;
mod store;

/// Platform-specific project directory locations.
pub mod paths;

pub use document::{GraphDoc, ProjectDoc, graph_from_doc, graph_to_doc, project_from_doc, project_to_doc};
pub use error::ProjectError;
pub use model::{LayoutPosition, MicroView, PositionPreset, Project};
pub use paths::{ensure_user_projects_dir, user_projects_dir};
