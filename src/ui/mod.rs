//! Terminal output
//!
//! Status lines go to stdout and diagnostics to stderr. Color and unicode
//! icons are used only when the terminal supports them.

pub mod output;
pub mod terminal;
pub mod theme;

pub use output::Reporter;
pub use terminal::{detect_capabilities, TerminalCapabilities};
