//! Error types for tspw
//!
//! Uses `thiserror` for library errors; the binary only adds `anyhow`
//! context at the edges.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias for tspw operations
pub type TspwResult<T> = Result<T, TspwError>;

/// Main error type for tspw operations
#[derive(Error, Debug)]
pub enum TspwError {
    /// A project path given on the command line does not exist
    #[error("path doesn't exist: {path}")]
    NotFound { path: PathBuf },

    /// A path exists but is not a directory or a `tsconfig.json` file
    #[error("invalid project path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// An explicitly configured compiler is missing, a directory, or misnamed
    #[error("tsc is not valid: {path}")]
    InvalidCompiler { path: PathBuf },

    /// No compiler was given and none could be discovered
    #[error("no tsc installation found (looked for {searched}). Try npm install -g typescript")]
    NoCompilerFound { searched: PathBuf },

    /// Unknown flag, or a bare path after `--compile`/`--watch`
    #[error("unhandled parameter: {token}")]
    UnhandledParameter { token: String },

    /// A flag that takes a value was the last token
    #[error("no value specified with option {flag}")]
    MissingArgument { flag: String },

    /// Any other command-line grammar error
    #[error("{message}")]
    Usage { message: String },

    /// A compile-mode compiler process exited unsuccessfully
    #[error("failed to compile {project} ({status})")]
    CompileFailure {
        project: PathBuf,
        status: String,
        output: String,
    },

    /// The runtime executing the compiler could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TspwError {
    /// Errors raised while turning command-line tokens into options.
    ///
    /// These are reported together with the usage text.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            TspwError::NotFound { .. }
                | TspwError::InvalidPath { .. }
                | TspwError::InvalidCompiler { .. }
                | TspwError::NoCompilerFound { .. }
                | TspwError::UnhandledParameter { .. }
                | TspwError::MissingArgument { .. }
                | TspwError::Usage { .. }
        )
    }

    pub(crate) fn compile_failure(
        project: impl Into<PathBuf>,
        status: ExitStatus,
        output: String,
    ) -> Self {
        TspwError::CompileFailure {
            project: project.into(),
            status: status.to_string(),
            output,
        }
    }
}
