//! tspw - run one TypeScript compiler per project
//!
//! tspw finds every `tsconfig.json` below the given directories and starts a
//! `tsc` process for each of them, either compiling once in ordered batches or
//! leaving watchers running. It never reads the config files itself.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod fs;
pub mod locator;
pub mod logging;
pub mod options;
pub mod orchestrator;
pub mod supervisor;
pub mod ui;

// Re-exports for convenience
pub use cli::{parse_options, ParseContext, ParseOutcome};
pub use config::{Config, ConfigWarning};
pub use error::{TspwError, TspwResult};
pub use fs::{FileSystem, LocalFs};
pub use locator::{find_projects, resolve_path};
pub use options::{CompilationBatch, Options, ProjectPath};
pub use orchestrator::{Orchestrator, ProjectRunner, RunState, Watchers};
pub use supervisor::TscSupervisor;
