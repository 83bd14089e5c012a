//! Configuration loading.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;

use crate::cli::{Args, OutputFormat};
use crate::orchestrator::MigrateError;

/// Contents of `we-migrate.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrateConfig {
    /// Entry files.
    pub entry: Vec<Utf8PathBuf>,
    /// Output directory.
    pub output: Option<Utf8PathBuf>,
    /// Glob patterns to ignore.
    pub ignore: Vec<String>,
}

impl MigrateConfig {
    /// Loads the configuration file. A missing file yields the defaults.
    pub fn load(path: &Utf8Path) -> Result<Self, MigrateError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(MigrateError::Config {
                    path: path.to_owned(),
                    message: e.to_string(),
                })
            }
        };
        Self::parse(&content).map_err(|message| MigrateError::Config {
            path: path.to_owned(),
            message,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
}

/// The effective options of a run: flags over the configuration file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub paths: Vec<Utf8PathBuf>,
    pub output: Utf8PathBuf,
    pub entry: Vec<Utf8PathBuf>,
    pub ignore: Vec<String>,
    pub format: OutputFormat,
    pub dry_run: bool,
}

impl Settings {
    pub fn resolve(args: Args, config: MigrateConfig) -> Self {
        let entry = if args.entry.is_empty() {
            config.entry
        } else {
            args.entry
        };
        let mut ignore = config.ignore;
        ignore.extend(args.ignore);

        Self {
            paths: args.paths,
            output: args
                .output
                .or(config.output)
                .unwrap_or_else(|| Utf8PathBuf::from(".")),
            entry,
            ignore,
            format: args.format,
            dry_run: args.dry_run,
        }
    }
}
