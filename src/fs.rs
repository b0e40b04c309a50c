//! Read-only file system access
//!
//! Project discovery and compiler lookup only ever ask whether a path exists,
//! what kind of entry it is, and what a directory contains. Keeping those
//! queries behind [`FileSystem`] lets the locator run against an in-memory
//! tree in tests.

use crate::error::TspwResult;
use std::path::{Path, PathBuf};

/// Abstract read-only file system interface
pub trait FileSystem {
    /// Check if anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Check if `path` is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// List the entries of a directory as full paths, sorted by name
    fn read_dir(&self, path: &Path) -> TspwResult<Vec<PathBuf>>;
}

/// The real, local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> TspwResult<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();
        Ok(entries)
    }
}

/// Mock file system for testing
///
/// Holds a set of directories and files; parents of inserted entries are
/// created implicitly.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    dirs: std::collections::BTreeSet<PathBuf>,
    files: std::collections::BTreeSet<PathBuf>,
}

#[cfg(test)]
impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path.as_ref());
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path.to_path_buf());
        self
    }

    fn add_dir(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.dirs.contains(path) || self.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn read_dir(&self, path: &Path) -> TspwResult<Vec<PathBuf>> {
        if !self.dirs.contains(path) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("directory not found: {}", path.display()),
            )
            .into());
        }
        let mut entries: Vec<PathBuf> = self
            .dirs
            .iter()
            .chain(self.files.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        entries.sort();
        Ok(entries)
    }
}
