//! Configuration loading
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority, applied by the argument parser)
//! 2. Environment variables (TSPW_*)
//! 3. Project config (./tspw.toml)
//! 4. User config (<config dir>/tspw/config.toml)
//! 5. Built-in defaults (lowest priority)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{TspwError, TspwResult};

/// Project config file name, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "tspw.toml";

/// Runtime used to execute the compiler script when nothing else is set
pub const DEFAULT_RUNTIME: &str = "node";

const KNOWN_KEYS: &[&str] = &["tsc", "tsc_args", "node"];

/// Settings that can come from files or the environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Compiler entry script
    #[serde(default)]
    pub tsc: Option<PathBuf>,

    /// Extra compiler arguments, split like `--tsc-args`
    #[serde(default)]
    pub tsc_args: Option<String>,

    /// Runtime executing the compiler
    #[serde(default)]
    pub node: Option<PathBuf>,
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub suggestion: Option<String>,
}

impl Config {
    /// Load one config file, collecting unknown keys as warnings.
    ///
    /// Relative paths in the file resolve against the file's directory.
    pub fn load(path: &Path) -> TspwResult<(Config, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path)?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);
        let mut config: Config = serde_ignored::deserialize(deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| TspwError::Config {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let Some(base) = path.parent() {
            config.tsc = config.tsc.map(|p| base.join(p));
            config.node = config.node.map(|p| {
                // A bare program name is looked up on PATH, not next to the file.
                if p.components().count() > 1 {
                    base.join(p)
                } else {
                    p
                }
            });
        }

        let warnings = unknown_paths
            .into_iter()
            .map(|key| ConfigWarning {
                suggestion: suggest_key(&key),
                key,
                file: path.to_path_buf(),
            })
            .collect();

        Ok((config, warnings))
    }

    /// Values set in `self` win over `other`.
    pub fn or(self, other: Config) -> Config {
        Config {
            tsc: self.tsc.or(other.tsc),
            tsc_args: self.tsc_args.or(other.tsc_args),
            node: self.node.or(other.node),
        }
    }

    pub fn runtime(&self) -> PathBuf {
        self.node
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNTIME))
    }
}

/// Configuration merged from every layer below the command line
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
}

/// Load the project and user files, then apply TSPW_* overrides.
pub fn load_layered(
    cwd: &Path,
    user_config_dir: Option<&Path>,
    get_env: impl Fn(&str) -> Option<String>,
) -> TspwResult<LoadedConfig> {
    let mut warnings = Vec::new();
    let mut config = Config::default();

    let candidates = [
        Some(cwd.join(PROJECT_CONFIG_FILE)),
        user_config_dir.map(|d| d.join("tspw").join("config.toml")),
    ];
    for path in candidates.into_iter().flatten() {
        if path.is_file() {
            let (layer, layer_warnings) = Config::load(&path)?;
            config = config.or(layer);
            warnings.extend(layer_warnings);
        }
    }

    Ok(LoadedConfig {
        config: with_env_overrides(config, get_env),
        warnings,
    })
}

/// Apply environment variable overrides (TSPW_* prefix)
pub fn with_env_overrides(config: Config, get_env: impl Fn(&str) -> Option<String>) -> Config {
    let non_empty = |key: &str| get_env(key).filter(|v| !v.is_empty());
    let env = Config {
        tsc: non_empty("TSPW_TSC").map(PathBuf::from),
        tsc_args: get_env("TSPW_TSC_ARGS"),
        node: non_empty("TSPW_NODE").map(PathBuf::from),
    };
    env.or(config)
}

fn suggest_key(unknown: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in KNOWN_KEYS {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
