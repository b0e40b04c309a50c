//! Compiler child processes
//!
//! Compile-mode children are awaited and their output captured. Watch-mode
//! children are left running; a background task forwards their output line
//! by line until they exit.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{TspwError, TspwResult};
use crate::options::{Options, ProjectPath};
use crate::orchestrator::ProjectRunner;
use crate::ui::Reporter;

/// Runs `tsc` once per project through the configured runtime.
#[derive(Debug, Clone)]
pub struct TscSupervisor {
    runtime: PathBuf,
    compiler: PathBuf,
    extra_args: Vec<String>,
    simulate: bool,
    reporter: Reporter,
}

impl TscSupervisor {
    pub fn new(options: &Options, reporter: Reporter) -> Self {
        Self {
            runtime: options.runtime.clone(),
            compiler: options.compiler.clone(),
            extra_args: options.extra_args(),
            simulate: options.simulate,
            reporter,
        }
    }

    /// `[compiler, "-p", project, ...extra]`
    pub fn compile_args(&self, project: &ProjectPath) -> Vec<OsString> {
        self.args(project, false)
    }

    /// `[compiler, "-p", project, "-w", ...extra]`
    pub fn watch_args(&self, project: &ProjectPath) -> Vec<OsString> {
        self.args(project, true)
    }

    fn args(&self, project: &ProjectPath, watch: bool) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.compiler.clone().into(),
            "-p".into(),
            project.as_path().into(),
        ];
        if watch {
            args.push("-w".into());
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    fn command(&self, args: &[OsString]) -> Command {
        let mut command = Command::new(&self.runtime);
        command.args(args).stdin(Stdio::null());
        command
    }

    /// Compile one project and wait for the compiler to exit.
    ///
    /// The compiler's stdout is echoed on success. A non-zero exit becomes a
    /// [`TspwError::CompileFailure`] carrying everything the compiler printed.
    pub async fn run_to_completion(&self, project: &ProjectPath) -> TspwResult<()> {
        self.reporter.compiling(project);
        let args = self.compile_args(project);
        if self.simulate {
            self.reporter.simulated(&args);
            return Ok(());
        }

        debug!(runtime = %self.runtime.display(), ?args, "spawning compiler");
        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|source| TspwError::Spawn {
                program: self.runtime.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(project = %project, status = %output.status, "compiler exited");

        if output.status.success() {
            self.reporter.compiler_output(&stdout);
            self.reporter.compiled(project);
            return Ok(());
        }

        let mut combined = stdout.into_owned();
        if !stderr.trim().is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }
        Err(TspwError::compile_failure(
            project.as_path(),
            output.status,
            combined,
        ))
    }

    /// Start a watcher for one project without waiting for it.
    ///
    /// Returns the output-forwarding task, which finishes once the watcher
    /// exits. Returns `None` when simulating or when the process could not be
    /// started; the spawn error is reported and nothing else is affected.
    pub fn start_watcher(&self, project: &ProjectPath) -> Option<JoinHandle<()>> {
        self.reporter.watching(project);
        let args = self.watch_args(project);
        if self.simulate {
            self.reporter.simulated(&args);
            return None;
        }

        debug!(runtime = %self.runtime.display(), ?args, "spawning watcher");
        let mut command = self.command(&args);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.reporter.error(format!(
                    "failed to start watcher for {} ({}): {}",
                    project,
                    self.runtime.display(),
                    e
                ));
                return None;
            }
        };

        let reporter = self.reporter;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let project = project.clone();
        Some(tokio::spawn(async move {
            tokio::join!(
                forward_lines(stdout, |line| reporter.forward_stdout(line)),
                forward_lines(stderr, |line| reporter.forward_stderr(line)),
            );
            match child.wait().await {
                Ok(status) => debug!(project = %project, %status, "watcher exited"),
                Err(e) => warn!(project = %project, error = %e, "failed to reap watcher"),
            }
        }))
    }
}

/// Forward a watcher stream line by line until EOF.
///
/// Lines are decoded lossily. The stream is drained to the end even after
/// `emit` fails, so the child never writes into a closed pipe.
async fn forward_lines<R>(stream: Option<R>, emit: impl Fn(&str) -> std::io::Result<()>)
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return;
    };
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut forwarding = true;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if !forwarding {
                    continue;
                }
                let line = String::from_utf8_lossy(trim_line_end(&buf));
                if let Err(e) = emit(&line) {
                    warn!(error = %e, "cannot forward watcher output, discarding the rest");
                    forwarding = false;
                }
            }
            Err(e) => {
                warn!(error = %e, "stopped reading watcher output");
                break;
            }
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl ProjectRunner for TscSupervisor {
    async fn compile(&self, project: &ProjectPath) -> TspwResult<()> {
        self.run_to_completion(project).await
    }

    fn watch(&self, project: &ProjectPath) -> Option<JoinHandle<()>> {
        self.start_watcher(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(runtime: &str, compiler: &str, extra: Option<&str>, simulate: bool) -> Options {
        Options {
            compilation_batches: Vec::new(),
            watch_projects: Vec::new(),
            compiler: PathBuf::from(compiler),
            runtime: PathBuf::from(runtime),
            extra_args: extra.map(str::to_string),
            simulate,
        }
    }

    fn project(path: &str) -> ProjectPath {
        ProjectPath::new(path).unwrap()
    }

    #[test]
    fn compile_argument_vector() {
        let supervisor = TscSupervisor::new(
            &options("node", "/ts/bin/tsc", Some("--allowJs true"), false),
            Reporter::plain(),
        );
        assert_eq!(
            supervisor.compile_args(&project("/work/app/tsconfig.json")),
            vec![
                OsString::from("/ts/bin/tsc"),
                "-p".into(),
                "/work/app/tsconfig.json".into(),
                "--allowJs".into(),
                "true".into(),
            ]
        );
    }

    #[test]
    fn watch_argument_vector_puts_w_before_extra_args() {
        let supervisor = TscSupervisor::new(
            &options("node", "/ts/bin/tsc", Some("--pretty"), false),
            Reporter::plain(),
        );
        assert_eq!(
            supervisor.watch_args(&project("/work/app/tsconfig.json")),
            vec![
                OsString::from("/ts/bin/tsc"),
                "-p".into(),
                "/work/app/tsconfig.json".into(),
                "-w".into(),
                "--pretty".into(),
            ]
        );
    }

    #[tokio::test]
    async fn simulate_never_spawns() {
        // The runtime does not exist, so any spawn attempt would fail.
        let supervisor = TscSupervisor::new(
            &options("/nonexistent/runtime", "/ts/bin/tsc", None, true),
            Reporter::plain(),
        );
        let project = project("/work/app/tsconfig.json");
        supervisor.run_to_completion(&project).await.unwrap();
        assert!(supervisor.start_watcher(&project).is_none());
    }

    #[tokio::test]
    async fn missing_runtime_is_spawn_error() {
        let supervisor = TscSupervisor::new(
            &options("/nonexistent/runtime", "/ts/bin/tsc", None, false),
            Reporter::plain(),
        );
        let project = project("/work/app/tsconfig.json");
        let err = supervisor.run_to_completion(&project).await.unwrap_err();
        assert!(matches!(err, TspwError::Spawn { .. }));
        assert!(supervisor.start_watcher(&project).is_none());
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_stop_forwarding() {
        let lines = std::sync::Mutex::new(Vec::new());
        let input: &[u8] = b"caf\xe9\r\nafter\nno newline";
        forward_lines(Some(input), |line| {
            lines.lock().unwrap().push(line.to_string());
            Ok(())
        })
        .await;
        assert_eq!(
            lines.into_inner().unwrap(),
            vec!["caf\u{FFFD}", "after", "no newline"]
        );
    }

    #[tokio::test]
    async fn failed_emit_still_drains_stream() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let input: &[u8] = b"one\ntwo\nthree\n";
        forward_lines(Some(input), |_| {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        })
        .await;
        assert_eq!(calls.into_inner(), 1);
    }

    #[cfg(unix)]
    mod with_shell {
        use super::*;
        use tempfile::TempDir;

        /// A fake `tsc` run by `sh`: `$2` is the project path.
        fn fake_tsc(body: &str) -> (TempDir, PathBuf) {
            let dir = tempfile::tempdir().unwrap();
            let tsc = dir.path().join("tsc");
            std::fs::write(&tsc, body).unwrap();
            (dir, tsc)
        }

        fn supervisor(tsc: &std::path::Path) -> TscSupervisor {
            TscSupervisor::new(
                &options("sh", tsc.to_str().unwrap(), Some("--noEmit"), false),
                Reporter::plain(),
            )
        }

        #[tokio::test]
        async fn successful_compile() {
            let (_dir, tsc) = fake_tsc("echo \"built $2 $3\"\nexit 0\n");
            let result = supervisor(&tsc)
                .run_to_completion(&project("/work/a/tsconfig.json"))
                .await;
            assert!(result.is_ok());
        }

        #[tokio::test]
        async fn failing_compile_carries_output() {
            let (_dir, tsc) =
                fake_tsc("echo \"error TS2322 in $2\"\necho \"fatal\" >&2\nexit 2\n");
            let err = supervisor(&tsc)
                .run_to_completion(&project("/work/a/tsconfig.json"))
                .await
                .unwrap_err();
            match err {
                TspwError::CompileFailure {
                    project, output, ..
                } => {
                    assert_eq!(project, PathBuf::from("/work/a/tsconfig.json"));
                    assert!(output.contains("error TS2322 in /work/a/tsconfig.json"));
                    assert!(output.contains("fatal"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn watcher_task_ends_when_child_exits() {
            let (_dir, tsc) = fake_tsc("echo \"watching $2 $3\"\necho oops >&2\nexit 0\n");
            let handle = supervisor(&tsc)
                .start_watcher(&project("/work/a/tsconfig.json"))
                .expect("watcher should start");
            tokio::time::timeout(std::time::Duration::from_secs(10), handle)
                .await
                .expect("watcher should finish")
                .unwrap();
        }

        #[tokio::test]
        async fn watcher_survives_non_utf8_output() {
            let (dir, tsc) = fake_tsc(
                "printf 'caf\\351\\n'\necho after\ntouch \"$(dirname \"$0\")/after.marker\"\n",
            );
            let handle = supervisor(&tsc)
                .start_watcher(&project("/work/a/tsconfig.json"))
                .expect("watcher should start");
            tokio::time::timeout(std::time::Duration::from_secs(10), handle)
                .await
                .expect("watcher should finish")
                .unwrap();
            assert!(dir.path().join("after.marker").exists());
        }
    }
}
