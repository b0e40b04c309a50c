//! E2E tests for watch mode
//!
//! Real watchers never exit, so these use a compiler that does.
#![cfg(unix)]

mod common;

use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use common::TestEnv;

#[test]
fn watcher_output_is_forwarded_per_stream() {
    let env = TestEnv::new();
    env.add_project("a");
    env.add_project("b");
    std::fs::write(
        env.tsc(),
        "echo \"watching $2\"\necho \"warn $2\" >&2\nexit 0\n",
    )
    .unwrap();

    let result = env.run(&["."]);

    assert!(result.success, "output:\n{}", result.combined_output());
    for project in ["a", "b"] {
        let config = env.project_path(project).join("tsconfig.json");
        let config = config.display();
        assert!(result.stdout.contains(&format!("watching {config}")));
        assert!(result.stderr.contains(&format!("warn {config}")));
    }
}

#[test]
fn watch_stays_alive_while_watchers_run() {
    let env = TestEnv::new();
    env.add_project("app");
    std::fs::write(env.tsc(), "echo started\nsleep 5\n").unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_tspw"))
        .arg("--watch")
        .arg(".")
        .current_dir(env.project_root.path())
        .env("HOME", env.home_dir.path())
        .env("XDG_CONFIG_HOME", env.home_dir.path().join(".config"))
        .env("TSPW_TSC", env.tsc())
        .env("TSPW_NODE", "sh")
        .env("TSPW_NO_COLOR", "1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start tspw");

    thread::sleep(Duration::from_millis(500));
    assert!(
        child.try_wait().unwrap().is_none(),
        "tspw should keep running while its watcher is alive"
    );

    let _ = child.kill();
    let output = child.wait_with_output().expect("Failed to get output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Watching: "), "stdout:\n{}", stdout);
}

#[test]
fn watcher_spawn_failure_is_not_fatal() {
    let env = TestEnv::new();
    env.add_project("app");

    let result = env.run_with_env(&["app"], &[("TSPW_NODE", "/nonexistent/runtime")]);

    assert_eq!(result.exit_code, 0, "output:\n{}", result.combined_output());
    assert!(
        result.stderr.contains("failed to start watcher"),
        "stderr:\n{}",
        result.stderr
    );
}
