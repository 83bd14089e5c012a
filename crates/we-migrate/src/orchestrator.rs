//! Main orchestration logic.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use source_edit::LineIndex;
use std::fs;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;
use we_transformer::{transform, TransformError, TransformOptions, COMPONENTS_DIR};

use crate::config::Settings;
use crate::output::{position, FileReport, FileStatus, FormattedDiagnostic, MigrateSummary, Report};

const SOURCE_EXTENSION: &str = "we";
const TARGET_EXTENSION: &str = "vue";

/// Always skipped, on top of the configured patterns.
const DEFAULT_IGNORES: &[&str] = &["**/node_modules/**"];

/// Migration errors.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum MigrateError {
    /// The configuration file exists but cannot be used.
    #[error("invalid configuration file {path}: {message}")]
    #[diagnostic(code(we_migrate::config))]
    Config { path: Utf8PathBuf, message: String },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(we_migrate::glob))]
    InvalidGlob(String),

    #[error("cannot resolve the current directory: {0}")]
    CurrentDir(String),

    #[error("failed to read {path}: {source}")]
    Read { path: Utf8PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: Utf8PathBuf, source: io::Error },

    /// The transform refused the file.
    #[error("{path}:{line}:{column}: {source}")]
    Transform {
        path: Utf8PathBuf,
        line: u32,
        column: u32,
        source: TransformError,
    },
}

/// What a successful file migration produced.
struct Migrated {
    output: Utf8PathBuf,
    components: Vec<Utf8PathBuf>,
    diagnostics: Vec<FormattedDiagnostic>,
}

/// Migrates every `.we` file under the configured paths.
///
/// A file that fails is logged and reported; the others are still migrated.
pub fn run(settings: &Settings) -> Result<Report, MigrateError> {
    let start = Instant::now();
    let cwd = current_dir()?;
    let ignore_set = build_ignore_set(&settings.ignore)?;
    let entries: Vec<Utf8PathBuf> = settings
        .entry
        .iter()
        .map(|entry| absolute(&cwd, entry))
        .collect();

    if settings.paths.is_empty() {
        info!("No files to process");
    }
    let files = collect_files(&settings.paths, &ignore_set);
    debug!(count = files.len(), "collected source files");

    let migrated = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let diagnostic_count = AtomicUsize::new(0);

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|input| {
            let file_start = Instant::now();
            let is_entry = entries.contains(&absolute(&cwd, input));
            match migrate_file(input, is_entry, settings) {
                Ok(result) => {
                    migrated.fetch_add(1, Ordering::Relaxed);
                    diagnostic_count.fetch_add(result.diagnostics.len(), Ordering::Relaxed);
                    for diag in &result.diagnostics {
                        warn!("{}", diag.display(input));
                    }
                    info!(
                        "Migrate {} => {} in {}ms",
                        input,
                        result.output,
                        file_start.elapsed().as_millis()
                    );
                    FileReport {
                        input: input.clone(),
                        entry: is_entry,
                        status: FileStatus::Migrated,
                        output: Some(result.output),
                        components: result.components,
                        error: None,
                        diagnostics: result.diagnostics,
                    }
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    error!("Failed to migrate {}: {}", input, e);
                    FileReport {
                        input: input.clone(),
                        entry: is_entry,
                        status: FileStatus::Failed,
                        output: None,
                        components: Vec::new(),
                        error: Some(e.to_string()),
                        diagnostics: Vec::new(),
                    }
                }
            }
        })
        .collect();

    let summary = MigrateSummary {
        file_count: files.len(),
        migrated: migrated.into_inner(),
        failed: failed.into_inner(),
        diagnostic_count: diagnostic_count.into_inner(),
        dry_run: settings.dry_run,
    };
    info!(
        "Migration finished in {:.3}s: {}",
        start.elapsed().as_secs_f64(),
        summary.format()
    );

    Ok(Report {
        files: reports,
        summary,
    })
}

/// Reads, transforms and writes one file with its nested components.
fn migrate_file(
    input: &Utf8Path,
    is_entry: bool,
    settings: &Settings,
) -> Result<Migrated, MigrateError> {
    let text = fs::read_to_string(input).map_err(|source| MigrateError::Read {
        path: input.to_owned(),
        source,
    })?;

    let result = transform(&text, TransformOptions { is_entry }).map_err(|source| {
        let at = position(&LineIndex::new(&text), source.span().start.into());
        MigrateError::Transform {
            path: input.to_owned(),
            line: at.line,
            column: at.column,
            source,
        }
    })?;

    let dir = output_dir(&settings.output, input);
    let output = clean(&dir.join(vue_file_name(input)));
    let components: Vec<Utf8PathBuf> = result
        .components
        .iter()
        .map(|component| {
            clean(
                &dir.join(COMPONENTS_DIR)
                    .join(format!("{}.{TARGET_EXTENSION}", component.name)),
            )
        })
        .collect();

    if settings.dry_run {
        debug!(%input, "dry run, skipping writes");
    } else {
        write_file(&output, &result.content)?;
        for (path, component) in components.iter().zip(&result.components) {
            write_file(path, &component.content)?;
        }
    }

    Ok(Migrated {
        output,
        components,
        diagnostics: FormattedDiagnostic::from_diagnostics(&result.diagnostics, &text),
    })
}

fn write_file(path: &Utf8Path, content: &str) -> Result<(), MigrateError> {
    let write_error = |source| MigrateError::Write {
        path: path.to_owned(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, content).map_err(write_error)
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, MigrateError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns
        .iter()
        .map(String::as_str)
        .chain(DEFAULT_IGNORES.iter().copied())
    {
        let glob = Glob::new(pattern).map_err(|e| MigrateError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| MigrateError::InvalidGlob(e.to_string()))
}

/// Walks every path and returns the `.we` files that are not ignored.
/// Paths that cannot be walked are logged and skipped.
fn collect_files(paths: &[Utf8PathBuf], ignore_set: &GlobSet) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();
    for root in paths {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping {}: {}", root, e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(path) = Utf8PathBuf::try_from(entry.into_path()) else {
                continue;
            };
            if path.extension() != Some(SOURCE_EXTENSION) || ignore_set.is_match(path.as_str()) {
                continue;
            }
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }
    files
}

/// Returns the directory the `.vue` file of `input` goes to.
///
/// With an explicit output directory the first segment of the input
/// directory is replaced by it, so `src/a/b.we` lands in `<output>/a/`.
pub fn output_dir(output: &Utf8Path, input: &Utf8Path) -> Utf8PathBuf {
    let dir = input
        .parent()
        .map(Utf8Path::as_str)
        .filter(|dir| !dir.is_empty())
        .unwrap_or(".");
    let kept = if dir != "." && output.as_str() != "." {
        dir.split_once('/').map_or("", |(_, rest)| rest)
    } else {
        dir
    };
    clean(&output.join(kept))
}

fn vue_file_name(input: &Utf8Path) -> String {
    format!("{}.{TARGET_EXTENSION}", input.file_stem().unwrap_or_default())
}

/// Drops `.` components. An empty result is `.`.
fn clean(path: &Utf8Path) -> Utf8PathBuf {
    let cleaned: Utf8PathBuf = path
        .components()
        .filter(|component| !matches!(component, Utf8Component::CurDir))
        .collect();
    if cleaned.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        cleaned
    }
}

fn absolute(cwd: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    clean(&cwd.join(path))
}

fn current_dir() -> Result<Utf8PathBuf, MigrateError> {
    let dir = std::env::current_dir().map_err(|e| MigrateError::CurrentDir(e.to_string()))?;
    Utf8PathBuf::try_from(dir).map_err(|e| MigrateError::CurrentDir(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dir(output: &str, input: &str) -> String {
        output_dir(Utf8Path::new(output), Utf8Path::new(input)).to_string()
    }

    #[test]
    fn test_output_dir_keeps_input_dir_for_current_output() {
        assert_eq!(dir(".", "src/pages/home.we"), "src/pages");
        assert_eq!(dir(".", "home.we"), ".");
    }

    #[test]
    fn test_output_dir_replaces_first_segment() {
        assert_eq!(dir("dist", "src/pages/home.we"), "dist/pages");
        assert_eq!(dir("dist", "src/home.we"), "dist");
        assert_eq!(dir("dist", "home.we"), "dist");
        assert_eq!(dir("dist", "./src/home.we"), "dist/src");
    }

    #[test]
    fn test_vue_file_name() {
        assert_eq!(vue_file_name(Utf8Path::new("src/tab-bar.we")), "tab-bar.vue");
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Utf8Path::new("./a/./b.vue")), Utf8PathBuf::from("a/b.vue"));
        assert_eq!(clean(Utf8Path::new("./.")), Utf8PathBuf::from("."));
    }

    #[test]
    fn test_ignore_set() {
        let set = build_ignore_set(&["**/demo/**".to_string()]).unwrap();
        assert!(set.is_match("src/demo/a.we"));
        assert!(set.is_match("src/node_modules/pkg/a.we"));
        assert!(!set.is_match("src/pages/a.we"));
        assert!(matches!(
            build_ignore_set(&["a[".to_string()]),
            Err(MigrateError::InvalidGlob(_))
        ));
    }

    #[test]
    fn test_collect_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        for file in ["b.we", "a.we", "notes.md", "demo/c.we", "node_modules/x/d.we"] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        let set = build_ignore_set(&["**/demo/**".to_string()]).unwrap();
        let files = collect_files(&[root.clone(), root.join("a.we")], &set);
        let names: Vec<&str> = files
            .iter()
            .map(|file| file.strip_prefix(&root).unwrap().as_str())
            .collect();
        assert_eq!(names, vec!["a.we", "b.we"]);
    }
}
