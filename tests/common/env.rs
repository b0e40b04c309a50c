//! Test environment builder for isolated tspw testing.
//!
//! Provides `TestEnv` - a temp working directory, a temp home (so no user
//! config leaks in), a fake compiler, and helpers to run the tspw binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::fixtures::{FAKE_TSC, TSCONFIG};

/// Result of running a tspw CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment with temp directories.
pub struct TestEnv {
    /// Working directory for the run
    pub project_root: TempDir,
    /// Temporary directory for HOME
    pub home_dir: TempDir,
    /// Holds the fake compiler at `<tools>/tsc`
    pub tools_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let env = Self {
            project_root: tempfile::tempdir().unwrap(),
            home_dir: tempfile::tempdir().unwrap(),
            tools_dir: tempfile::tempdir().unwrap(),
        };
        std::fs::write(env.tsc(), FAKE_TSC).unwrap();
        env
    }

    /// Path of the fake compiler
    pub fn tsc(&self) -> PathBuf {
        self.tools_dir.path().join("tsc")
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Create `<relative>/tsconfig.json`
    pub fn add_project(&self, relative: &str) -> PathBuf {
        let dir = self.project_path(relative);
        std::fs::create_dir_all(&dir).unwrap();
        let config = dir.join("tsconfig.json");
        std::fs::write(&config, TSCONFIG).unwrap();
        config
    }

    /// Make the fake compiler fail for the project in `relative`
    pub fn mark_failing(&self, relative: &str) {
        std::fs::write(self.project_path(relative).join("FAIL"), "").unwrap();
    }

    pub fn was_compiled(&self, relative: &str) -> bool {
        self.project_path(relative).join("compiled.marker").exists()
    }

    /// Run tspw from the project root with the fake compiler executed by `sh`
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[("TSPW_NODE", "sh")])
    }

    /// Run tspw from the project root with extra env vars.
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        self.run_from_with_env(self.project_root.path(), args, env_vars)
    }

    /// Run tspw from a specific directory with extra env vars.
    pub fn run_from_with_env(
        &self,
        cwd: &Path,
        args: &[&str],
        env_vars: &[(&str, &str)],
    ) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tspw"));
        cmd.current_dir(cwd)
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("USERPROFILE", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env("XDG_DATA_HOME", self.home_dir.path().join(".local/share"))
            .env("TSPW_TSC", self.tsc())
            .env("TSPW_NO_COLOR", "1")
            .env_remove("TSPW_TSC_ARGS")
            .env_remove("TSPW_LOG")
            .env_remove("RUST_LOG");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute tspw");
        output_to_result(output)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
