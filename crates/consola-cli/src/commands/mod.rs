//! CLI command implementations.

pub mod compose;
pub mod init;
pub mod inspect;
pub mod layout;
pub mod validate;

use std::path::Path;

/// Fails with a readable error when `path` does not hold a project yet.
///
/// Read-only commands use this so they never create a project skeleton as
/// a side effect of a typo'd path.
pub fn ensure_project_exists(path: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(
        path.join("graph.json").is_file(),
        "no project at {} (run `consola init` first)",
        path.display()
    );
    Ok(())
}
