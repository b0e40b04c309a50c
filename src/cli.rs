//! Command-line parsing
//!
//! clap handles the token grammar; [`parse_options`] then resolves every
//! path in command-line order and produces the immutable [`Options`].

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use tracing::debug;

use crate::compiler::{locate_compiler, validate_compiler};
use crate::config::Config;
use crate::error::{TspwError, TspwResult};
use crate::fs::FileSystem;
use crate::locator::resolve_path;
use crate::options::{CompilationBatch, Options};

const EXAMPLES: &str = "\
Examples:
  tspw .
  tspw ./editor/core ./plugins/log_console/tsconfig.json
  tspw --tsc ./node_modules/typescript/bin/tsc --watch .
  tspw --tsc-args \"--allowJs true --alwaysStrict true\" .
  tspw --compile ./core --compile ./plugins --watch .
  tspw --compile editor/ --tsc-args \"--listEmittedFiles --noEmitOnError\"";

/// tspw - run one TypeScript compiler per tsconfig.json
#[derive(Parser, Debug)]
#[command(name = "tspw")]
#[command(author, version, about, long_about = None)]
#[command(args_override_self = true)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Compile every project under PATH and wait for them (repeatable; each occurrence runs after the previous one)
    #[arg(long, value_name = "PATH")]
    pub compile: Vec<PathBuf>,

    /// Start a watcher for every project under PATH (repeatable)
    #[arg(long, value_name = "PATH")]
    pub watch: Vec<PathBuf>,

    /// Compiler entry script [default: enclosing node_modules, then the global npm install]
    #[arg(short = 't', long, value_name = "PATH")]
    pub tsc: Option<PathBuf>,

    /// Extra compiler arguments, split on spaces
    #[arg(short = 'a', long = "tsc-args", value_name = "ARGS", allow_hyphen_values = true)]
    pub tsc_args: Option<String>,

    /// Print the compiler command lines instead of running them
    #[arg(long)]
    pub simulate: bool,

    /// Diagnostic log level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Projects to watch; consumes every remaining argument
    #[arg(value_name = "PATH", num_args = 1.., trailing_var_arg = true)]
    pub paths: Vec<PathBuf>,
}

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Run(Options),
    Help(String),
    Version(String),
}

/// Everything the parser may consult besides the tokens themselves
pub struct ParseContext<'a, F: FileSystem> {
    pub fs: &'a F,
    /// Relative paths resolve against this directory
    pub cwd: PathBuf,
    /// Directory of the running executable, for compiler discovery
    pub install_dir: PathBuf,
    /// Per-user application data directory
    pub data_dir: Option<PathBuf>,
    /// Settings from config files and the environment
    pub config: Config,
}

/// Full help text, printed after parse errors
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// `-v` count, read ahead of [`parse_options`] so that parsing can log.
pub fn verbosity<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map(|cli| cli.verbose).unwrap_or(0)
}

/// Turn raw arguments (including the program name) into [`Options`].
///
/// The first invalid token or path aborts parsing; no partial model is
/// returned.
pub fn parse_options<I, T, F>(args: I, ctx: &ParseContext<'_, F>) -> TspwResult<ParseOutcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FileSystem,
{
    let matches = match Cli::command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => return from_clap_error(err),
    };
    let cli = Cli::from_arg_matches(&matches).map_err(|e| TspwError::Usage {
        message: first_line(&e),
    })?;

    reject_late_bare_path(&cli, &matches)?;

    let compiler = match cli.tsc.as_ref().or(ctx.config.tsc.as_ref()) {
        Some(tsc) => validate_compiler(ctx.fs, &absolutize(&ctx.cwd, tsc))?,
        None => locate_compiler(ctx.fs, &ctx.install_dir, ctx.data_dir.as_deref())?,
    };
    debug!(compiler = %compiler.display(), "using compiler");

    let mut compilation_batches = Vec::new();
    let mut watch_projects = Vec::new();

    for (stage, raw) in staged_paths(&cli, &matches) {
        let projects = resolve_path(ctx.fs, &absolutize(&ctx.cwd, raw))?;
        match stage {
            Stage::Compile => compilation_batches.push(CompilationBatch {
                source: raw.display().to_string(),
                projects,
            }),
            Stage::Watch => watch_projects.extend(projects),
        }
    }

    for raw in &cli.paths {
        watch_projects.extend(resolve_path(ctx.fs, &absolutize(&ctx.cwd, raw))?);
    }

    if cli.compile.is_empty() && cli.watch.is_empty() && cli.paths.is_empty() {
        watch_projects = resolve_path(ctx.fs, &ctx.cwd)?;
    }

    Ok(ParseOutcome::Run(Options {
        compilation_batches,
        watch_projects,
        compiler,
        runtime: ctx.config.runtime(),
        extra_args: cli.tsc_args.or_else(|| ctx.config.tsc_args.clone()),
        simulate: cli.simulate,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Compile,
    Watch,
}

/// `--compile` and `--watch` values in the order they were written.
fn staged_paths<'c>(cli: &'c Cli, matches: &ArgMatches) -> Vec<(Stage, &'c PathBuf)> {
    let mut staged: Vec<(usize, Stage, &PathBuf)> = Vec::new();
    for (stage, id, values) in [
        (Stage::Compile, "compile", &cli.compile),
        (Stage::Watch, "watch", &cli.watch),
    ] {
        if let Some(indices) = matches.indices_of(id) {
            staged.extend(indices.zip(values).map(|(i, v)| (i, stage, v)));
        }
    }
    staged.sort_by_key(|(i, _, _)| *i);
    staged.into_iter().map(|(_, s, v)| (s, v)).collect()
}

/// Bare paths only start implicit watch mode before any `--compile`/`--watch`.
fn reject_late_bare_path(cli: &Cli, matches: &ArgMatches) -> TspwResult<()> {
    let Some(first_bare) = matches.index_of("paths") else {
        return Ok(());
    };
    let first_flag = ["compile", "watch"]
        .into_iter()
        .filter_map(|id| matches.indices_of(id).and_then(|mut i| i.next()))
        .min();
    match (first_flag, cli.paths.first()) {
        (Some(flag), Some(path)) if flag < first_bare => Err(TspwError::UnhandledParameter {
            token: path.display().to_string(),
        }),
        _ => Ok(()),
    }
}

fn from_clap_error(err: clap::Error) -> TspwResult<ParseOutcome> {
    let invalid_arg = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.clone()),
        _ => None,
    };
    let empty_value = matches!(
        err.get(ContextKind::InvalidValue),
        Some(ContextValue::String(v)) if v.is_empty()
    );

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            Ok(ParseOutcome::Help(err.render().to_string()))
        }
        ErrorKind::DisplayVersion => Ok(ParseOutcome::Version(err.render().to_string())),
        ErrorKind::UnknownArgument => Err(TspwError::UnhandledParameter {
            token: invalid_arg.unwrap_or_else(|| first_line(&err)),
        }),
        ErrorKind::InvalidValue | ErrorKind::NoEquals | ErrorKind::TooFewValues
            if empty_value || err.kind() != ErrorKind::InvalidValue =>
        {
            let flag = invalid_arg
                .as_deref()
                .and_then(|arg| arg.split_whitespace().next())
                .map(str::to_string)
                .unwrap_or_else(|| first_line(&err));
            Err(TspwError::MissingArgument { flag })
        }
        _ => Err(TspwError::Usage {
            message: first_line(&err),
        }),
    }
}

fn first_line(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

/// Make `path` absolute against `cwd` and drop `.`/`..` components.
fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
