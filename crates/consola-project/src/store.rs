//! Loading and saving project directories.
//!
//! A project path is a directory. `graph.json` at its root holds the
//! document; `snapshots/index.json` lists stored mix snapshots (seeded
//! with "Service Default" when absent); `autosave/graph.json` is written
//! alongside every save once an autosave exists. The remaining
//! subdirectories are scaffolding for media and logs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::{project_from_doc, project_to_doc};
use crate::error::ProjectError;
use crate::model::Project;

const PROJECT_SUBDIRECTORIES: [&str; 5] = ["snapshots", "media", "captures", "autosave", "logs"];
const GRAPH_FILE: &str = "graph.json";
const SNAPSHOT_INDEX_FILE: &str = "index.json";
const DEFAULT_SNAPSHOT: &str = "Service Default";

#[derive(Serialize, Deserialize)]
struct SnapshotIndexDoc {
    #[serde(default)]
    snapshots: Vec<String>,
}

fn ensure_skeleton(root: &Path) -> Result<(), ProjectError> {
    fs::create_dir_all(root).map_err(|e| ProjectError::create_dir(root, e))?;
    for subdir in PROJECT_SUBDIRECTORIES {
        let dir = root.join(subdir);
        fs::create_dir_all(&dir).map_err(|e| ProjectError::create_dir(&dir, e))?;
    }
    Ok(())
}

fn read_snapshot_index(snapshots_dir: &Path) -> Result<Vec<String>, ProjectError> {
    let index_path = snapshots_dir.join(SNAPSHOT_INDEX_FILE);
    if !index_path.exists() {
        let defaults = vec![DEFAULT_SNAPSHOT.to_string()];
        write_snapshot_index(&defaults, snapshots_dir)?;
        return Ok(defaults);
    }

    let text = fs::read_to_string(&index_path).map_err(|e| ProjectError::read_file(&index_path, e))?;
    let doc: SnapshotIndexDoc = serde_json::from_str(&text)?;
    if doc.snapshots.is_empty() {
        let defaults = vec![DEFAULT_SNAPSHOT.to_string()];
        write_snapshot_index(&defaults, snapshots_dir)?;
        return Ok(defaults);
    }
    Ok(doc.snapshots)
}

fn write_snapshot_index(names: &[String], snapshots_dir: &Path) -> Result<(), ProjectError> {
    let index_path = snapshots_dir.join(SNAPSHOT_INDEX_FILE);
    let doc = SnapshotIndexDoc {
        snapshots: names.to_vec(),
    };
    let text = serde_json::to_string_pretty(&doc)?;
    fs::write(&index_path, text).map_err(|e| ProjectError::write_file(&index_path, e))
}

fn locate_autosave(autosave_dir: &Path) -> Option<PathBuf> {
    let autosave_graph = autosave_dir.join(GRAPH_FILE);
    autosave_graph.exists().then_some(autosave_graph)
}

fn write_graph_file(project: &Project, path: &Path) -> Result<(), ProjectError> {
    let doc = project_to_doc(project);
    let text = serde_json::to_string_pretty(&doc)?;
    fs::write(path, text).map_err(|e| ProjectError::write_file(path, e))
}

impl Project {
    /// Loads a project from a directory, creating the directory skeleton
    /// and seeding a default broadcast graph when no `graph.json` exists.
    ///
    /// Unlike a missing file, a malformed `graph.json` is an error: it is
    /// reported instead of being silently replaced with the default graph.
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        tracing::info!(path = %path.display(), "loading project");
        ensure_skeleton(path)?;

        let directory_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let graph_path = path.join(GRAPH_FILE);
        let mut project = if graph_path.exists() {
            let text =
                fs::read_to_string(&graph_path).map_err(|e| ProjectError::read_file(&graph_path, e))?;
            let doc = serde_json::from_str(&text)?;
            project_from_doc(&doc)
        } else {
            let project = Project::with_default_graph(directory_name.clone());
            write_graph_file(&project, &graph_path)?;
            project
        };

        if project.name.is_empty() {
            project.name = directory_name;
        }
        project.snapshot_names = read_snapshot_index(&path.join("snapshots"))?;
        project.last_autosave = locate_autosave(&path.join("autosave"));
        Ok(project)
    }

    /// Saves the project into a directory, creating the skeleton as needed.
    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        tracing::info!(name = %self.name, path = %path.display(), "saving project");
        ensure_skeleton(path)?;

        let mut writable = self.clone();
        if writable.name.is_empty() {
            writable.name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        write_graph_file(&writable, &path.join(GRAPH_FILE))?;

        let snapshots_dir = path.join("snapshots");
        if self.snapshot_names.is_empty() {
            if !snapshots_dir.join(SNAPSHOT_INDEX_FILE).exists() {
                write_snapshot_index(&[DEFAULT_SNAPSHOT.to_string()], &snapshots_dir)?;
            }
        } else {
            write_snapshot_index(&self.snapshot_names, &snapshots_dir)?;
        }

        if self.last_autosave.is_some() {
            write_graph_file(&writable, &path.join("autosave").join(GRAPH_FILE))?;
        }
        Ok(())
    }
}
