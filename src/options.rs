//! The validated description of one invocation
//!
//! Built once by [`crate::cli::parse_options`] and only read afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

/// File name that marks a directory as a TypeScript project
pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

/// Absolute path to a single `tsconfig.json`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectPath(PathBuf);

impl ProjectPath {
    /// Wrap `path` if it names a `tsconfig.json` file.
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let is_config = path
            .file_name()
            .map(|name| name == CONFIG_FILE_NAME)
            .unwrap_or(false);
        is_config.then_some(Self(path))
    }

    /// The project for a directory known to contain a `tsconfig.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self(dir.join(CONFIG_FILE_NAME))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ProjectPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// One serial stage of the compile phase; its projects build in parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationBatch {
    /// The raw `--compile` argument that produced this batch
    pub source: String,
    pub projects: Vec<ProjectPath>,
}

/// Everything one invocation will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub compilation_batches: Vec<CompilationBatch>,
    /// In command-line order; duplicates are kept
    pub watch_projects: Vec<ProjectPath>,
    /// Path to the `tsc` entry script
    pub compiler: PathBuf,
    /// Program that executes the compiler script
    pub runtime: PathBuf,
    /// Passed through verbatim, see [`split_extra_args`]
    pub extra_args: Option<String>,
    pub simulate: bool,
}

impl Options {
    pub fn has_work(&self) -> bool {
        !self.compilation_batches.is_empty() || !self.watch_projects.is_empty()
    }

    pub fn extra_args(&self) -> Vec<String> {
        split_extra_args(self.extra_args.as_deref())
    }
}

/// Split the `--tsc-args` string on every single space.
///
/// No quoting is understood, so a value containing spaces is split too and
/// consecutive spaces yield empty arguments. An empty string adds nothing.
pub fn split_extra_args(extra: Option<&str>) -> Vec<String> {
    match extra {
        Some(s) if !s.is_empty() => s.split(' ').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
