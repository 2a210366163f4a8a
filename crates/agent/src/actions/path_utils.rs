//! Workspace path resolution

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use actionloop_config::expand_home;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path {path} is outside workspace {workspace}")]
    OutsideWorkspace { path: String, workspace: String },

    #[error("workspace {0} does not exist")]
    MissingWorkspace(String),
}

/// Resolve `path` against the workspace and refuse anything outside it
///
/// Relative paths are taken from the workspace root, `~` expands to the
/// home directory and `..` is resolved before the check. Symlinks in the
/// existing part of the path are followed.
pub async fn resolve_workspace_path(path: &str, workspace: &Path) -> Result<PathBuf, PathError> {
    let root = tokio::fs::canonicalize(workspace)
        .await
        .map_err(|_| PathError::MissingWorkspace(workspace.display().to_string()))?;

    let expanded = expand_home(path);
    let candidate = if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    };

    let resolved = canonicalize_existing(&normalize(&candidate)).await;
    if !resolved.starts_with(&root) {
        return Err(PathError::OutsideWorkspace {
            path: path.to_string(),
            workspace: root.display().to_string(),
        });
    }

    Ok(resolved)
}

/// Lexically drop `.` and apply `..`
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Canonicalize the longest existing ancestor and re-append the rest
async fn canonicalize_existing(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut missing = Vec::new();

    loop {
        if let Ok(canonical) = tokio::fs::canonicalize(&existing).await {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }

        match (existing.file_name().map(|n| n.to_os_string()), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name);
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
}
