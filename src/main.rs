//! tspw CLI - run one TypeScript compiler per tsconfig.json
//!
//! Usage: tspw [OPTIONS] [PATH]...
//!
//!   --compile <PATH>   compile a batch of projects and wait (repeatable)
//!   --watch <PATH>     start watchers (repeatable)
//!   PATH...            shorthand for watching every PATH

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};

use tspw::cli::{self, ParseContext, ParseOutcome};
use tspw::config;
use tspw::logging;
use tspw::ui::Reporter;
use tspw::{LocalFs, Orchestrator, RunState, TscSupervisor, TspwError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let reporter = Reporter::detect();
    match run(reporter).await {
        Ok(code) => code,
        Err(err) => {
            report_error(reporter, &err);
            ExitCode::FAILURE
        }
    }
}

async fn run(reporter: Reporter) -> Result<ExitCode> {
    let args: Vec<OsString> = std::env::args_os().collect();
    logging::init_tracing(cli::verbosity(&args));

    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let install_dir = install_dir()?;

    let loaded = config::load_layered(&cwd, dirs::config_dir().as_deref(), |key| {
        std::env::var(key).ok()
    })?;
    reporter.config_warnings(&loaded.warnings);

    let fs = LocalFs::new();
    let ctx = ParseContext {
        fs: &fs,
        cwd,
        install_dir,
        data_dir: dirs::data_dir(),
        config: loaded.config,
    };

    let options = match cli::parse_options(args, &ctx)? {
        ParseOutcome::Run(options) => options,
        ParseOutcome::Help(text) | ParseOutcome::Version(text) => {
            print!("{}", text);
            return Ok(ExitCode::SUCCESS);
        }
    };

    if !options.has_work() {
        reporter.warning(format!("no {} found", tspw::options::CONFIG_FILE_NAME));
    }

    let orchestrator = Orchestrator::new(TscSupervisor::new(&options, reporter), reporter);
    match orchestrator.run(&options).await? {
        RunState::Done => Ok(ExitCode::SUCCESS),
        RunState::Watching(watchers) => {
            watchers.wait().await;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Directory holding the running executable
fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("failed to locate the tspw executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    Ok(exe.parent().map(PathBuf::from).unwrap_or_default())
}

fn report_error(reporter: Reporter, err: &anyhow::Error) {
    match err.downcast_ref::<TspwError>() {
        Some(TspwError::CompileFailure {
            project, output, ..
        }) => {
            if let Some(project) = tspw::ProjectPath::new(project.clone()) {
                reporter.compile_failed(&project, output);
            }
            reporter.error(err);
        }
        Some(e) if e.is_usage_error() => {
            reporter.error(e);
            println!();
            print!("{}", cli::usage());
        }
        _ => reporter.error(format!("{:#}", err)),
    }
}
