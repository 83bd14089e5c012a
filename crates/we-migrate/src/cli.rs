//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Migrate Weex `.we` components to Vue single-file components.
#[derive(Debug, Parser)]
#[command(name = "we-migrate")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Files or directories to migrate
    pub paths: Vec<Utf8PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// Entry files, separated by commas
    #[arg(short, long, value_delimiter = ',')]
    pub entry: Vec<Utf8PathBuf>,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Path to the configuration file
    #[arg(long, default_value = "we-migrate.json")]
    pub config: Utf8PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Transform without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Log debug events
    #[arg(short, long)]
    pub verbose: bool,
}

/// Report format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Summary line on stdout (default)
    #[default]
    Human,
    /// One JSON document describing every file
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["we-migrate"]);
        assert!(args.paths.is_empty());
        assert!(args.output.is_none());
        assert!(args.entry.is_empty());
        assert_eq!(args.config.as_str(), "we-migrate.json");
        assert_eq!(args.format, OutputFormat::Human);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_entries_are_comma_separated() {
        let args = Args::parse_from(["we-migrate", "src", "-e", "src/a.we,src/b.we"]);
        let entries: Vec<&str> = args.entry.iter().map(|p| p.as_str()).collect();
        assert_eq!(entries, vec!["src/a.we", "src/b.we"]);
        assert_eq!(args.paths[0].as_str(), "src");
    }

    #[test]
    fn test_output_and_ignores() {
        let args = Args::parse_from([
            "we-migrate",
            "app",
            "lib",
            "-o",
            "out",
            "--ignore",
            "**/demo/**",
            "--ignore",
            "**/*.test.we",
            "--format",
            "json",
            "--dry-run",
            "-v",
        ]);
        assert_eq!(args.paths.len(), 2);
        assert_eq!(args.output.as_deref().map(|p| p.as_str()), Some("out"));
        assert_eq!(args.ignore, vec!["**/demo/**", "**/*.test.we"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.dry_run);
        assert!(args.verbose);
    }
}
