//! Platform-specific project directory locations.

use std::path::PathBuf;

use crate::error::ProjectError;

/// Returns the per-user projects directory
/// (e.g. `~/.local/share/consola/projects` on Linux).
///
/// Falls back to `./consola-projects` when no platform data directory is
/// available.
pub fn user_projects_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("consola").join("projects"))
        .unwrap_or_else(|| PathBuf::from("consola-projects"))
}

/// Returns the per-user projects directory, creating it if needed.
pub fn ensure_user_projects_dir() -> Result<PathBuf, ProjectError> {
    let dir = user_projects_dir();
    std::fs::create_dir_all(&dir).map_err(|e| ProjectError::create_dir(&dir, e))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_dir_ends_with_projects() {
        assert!(user_projects_dir().ends_with("projects") || user_projects_dir().ends_with("consola-projects"));
    }
}
