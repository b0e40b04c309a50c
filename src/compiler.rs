//! Locating the TypeScript compiler
//!
//! Both functions take the file system and every directory they consult as
//! arguments; nothing here reads the process environment.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{TspwError, TspwResult};
use crate::fs::FileSystem;

/// Required file name of the compiler entry script
pub const COMPILER_FILE_NAME: &str = "tsc";

/// Package manager dependency folder
const PACKAGES_DIR: &str = "node_modules";

/// Compiler entry script relative to a packages directory
fn compiler_in(packages_dir: &Path) -> PathBuf {
    packages_dir
        .join("typescript")
        .join("bin")
        .join(COMPILER_FILE_NAME)
}

/// Check an explicitly requested compiler path.
pub fn validate_compiler(fs: &impl FileSystem, path: &Path) -> TspwResult<PathBuf> {
    let named_tsc = path
        .file_name()
        .map(|n| n == COMPILER_FILE_NAME)
        .unwrap_or(false);
    if !fs.exists(path) || fs.is_dir(path) || !named_tsc {
        return Err(TspwError::InvalidCompiler {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

/// Find the compiler when none was requested.
///
/// Walks up from `install_dir` looking for an enclosing `node_modules` with
/// TypeScript installed, then falls back to the per-user global npm install
/// under `data_dir`.
pub fn locate_compiler(
    fs: &impl FileSystem,
    install_dir: &Path,
    data_dir: Option<&Path>,
) -> TspwResult<PathBuf> {
    for ancestor in install_dir.ancestors() {
        if ancestor.file_name().map(|n| n == PACKAGES_DIR).unwrap_or(false) {
            let candidate = compiler_in(ancestor);
            if fs.exists(&candidate) && !fs.is_dir(&candidate) {
                debug!(compiler = %candidate.display(), "found local compiler");
                return Ok(candidate);
            }
        }
    }

    let global = global_compiler(data_dir);
    match global {
        Some(candidate) if fs.exists(&candidate) => {
            debug!(compiler = %candidate.display(), "using global compiler");
            Ok(candidate)
        }
        Some(candidate) => Err(TspwError::NoCompilerFound {
            searched: candidate,
        }),
        None => Err(TspwError::NoCompilerFound {
            searched: install_dir.to_path_buf(),
        }),
    }
}

/// `<data dir>/npm/node_modules/typescript/bin/tsc`
pub fn global_compiler(data_dir: Option<&Path>) -> Option<PathBuf> {
    data_dir.map(|dir| compiler_in(&dir.join("npm").join(PACKAGES_DIR)))
}
