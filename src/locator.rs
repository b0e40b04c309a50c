//! Project discovery
//!
//! Turns a user-supplied path into the list of `tsconfig.json` projects it
//! stands for.

use std::path::Path;

use tracing::debug;

use crate::error::{TspwError, TspwResult};
use crate::fs::FileSystem;
use crate::options::{ProjectPath, CONFIG_FILE_NAME};

/// Resolve a file or directory to the projects it names.
///
/// - A directory is walked recursively and yields every project below it.
/// - A file must be a `tsconfig.json` and yields exactly that project.
pub fn resolve_path(fs: &impl FileSystem, path: &Path) -> TspwResult<Vec<ProjectPath>> {
    if !fs.exists(path) {
        return Err(TspwError::NotFound {
            path: path.to_path_buf(),
        });
    }

    if fs.is_dir(path) {
        let projects = find_projects(fs, path)?;
        debug!(root = %path.display(), count = projects.len(), "discovered projects");
        return Ok(projects);
    }

    ProjectPath::new(path)
        .map(|project| vec![project])
        .ok_or_else(|| TspwError::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("not a {} file or a directory", CONFIG_FILE_NAME),
        })
}

/// Every directory under `dir` (inclusive) that holds a `tsconfig.json`.
///
/// A project directory is still descended into, so nested projects are all
/// found. Results are depth-first: a directory comes before its children.
pub fn find_projects(fs: &impl FileSystem, dir: &Path) -> TspwResult<Vec<ProjectPath>> {
    let mut results = Vec::new();
    collect_projects(fs, dir, &mut results)?;
    Ok(results)
}

fn collect_projects(
    fs: &impl FileSystem,
    dir: &Path,
    results: &mut Vec<ProjectPath>,
) -> TspwResult<()> {
    let mut child_dirs = Vec::new();
    for entry in fs.read_dir(dir)? {
        if fs.is_dir(&entry) {
            child_dirs.push(entry);
        } else if entry.file_name().map(|n| n == CONFIG_FILE_NAME).unwrap_or(false) {
            results.push(ProjectPath::in_dir(dir));
        }
    }

    for child in child_dirs {
        collect_projects(fs, &child, results)?;
    }
    Ok(())
}
