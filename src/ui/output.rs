use std::ffi::OsString;
use std::fmt::Display;
use std::io::{self, Write};

use crossterm::style::{Color, Stylize};

use crate::config::ConfigWarning;
use crate::options::{CompilationBatch, ProjectPath};

use super::terminal::{detect_capabilities, TerminalCapabilities};
use super::theme::{colors, Icons};

/// Writes tspw's own status lines and diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color_out: bool,
    color_err: bool,
    icons: Icons,
}

impl Reporter {
    pub fn detect() -> Self {
        let out = detect_capabilities(false);
        let err = detect_capabilities(true);
        Self::from_capabilities(out, err)
    }

    pub fn from_capabilities(out: TerminalCapabilities, err: TerminalCapabilities) -> Self {
        Self {
            color_out: out.supports_color,
            color_err: err.supports_color,
            icons: Icons::new(out.supports_unicode && !out.is_ci),
        }
    }

    /// No color, ASCII icons.
    pub fn plain() -> Self {
        Self {
            color_out: false,
            color_err: false,
            icons: Icons::new(false),
        }
    }

    fn paint(&self, text: &str, color: Color, to_stderr: bool) -> String {
        let enabled = if to_stderr { self.color_err } else { self.color_out };
        if enabled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn batch(&self, index: usize, total: usize, batch: &CompilationBatch) {
        let count = batch.projects.len();
        println!(
            "{} Batch {}/{}: {} ({} project{})",
            self.paint(self.icons.progress, colors::INFO, false),
            index + 1,
            total,
            batch.source,
            count,
            if count == 1 { "" } else { "s" }
        );
    }

    pub fn compiling(&self, project: &ProjectPath) {
        println!("Compiling {}...", project);
    }

    pub fn compiled(&self, project: &ProjectPath) {
        println!(
            "{} Compiled {}",
            self.paint(self.icons.success, colors::SUCCESS, false),
            project
        );
    }

    pub fn watching(&self, project: &ProjectPath) {
        println!(
            "{} Watching: {}",
            self.paint(self.icons.watch, colors::INFO, false),
            project
        );
    }

    /// The argument vector a simulated run would have used.
    pub fn simulated(&self, args: &[OsString]) {
        let line = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", self.paint(&line, colors::DIM, false));
    }

    /// Compiler output echoed after a successful compile.
    pub fn compiler_output(&self, output: &str) {
        if !output.trim().is_empty() {
            println!("{}", output.trim_end());
        }
    }

    pub fn compile_failed(&self, project: &ProjectPath, output: &str) {
        eprintln!(
            "{} Failed to compile {}:",
            self.paint(self.icons.error, colors::ERROR, true),
            project
        );
        if !output.trim().is_empty() {
            eprintln!("{}", output.trim_end());
        }
    }

    /// Watcher output lines; a closed stream is reported, not a panic.
    pub fn forward_stdout(&self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", line)
    }

    pub fn forward_stderr(&self, line: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{}", line)
    }

    pub fn error(&self, message: impl Display) {
        eprintln!("{} {}", self.paint("error:", colors::ERROR, true), message);
    }

    pub fn warning(&self, message: impl Display) {
        eprintln!(
            "{} {}",
            self.paint(self.icons.warning, colors::WARNING, true),
            message
        );
    }

    pub fn config_warnings(&self, warnings: &[ConfigWarning]) {
        for w in warnings {
            self.warning(format!(
                "Unknown config key '{}' in {}",
                w.key,
                w.file.display()
            ));
            if let Some(suggestion) = &w.suggestion {
                eprintln!("   Did you mean '{}'?", suggestion);
            }
        }
    }
}
