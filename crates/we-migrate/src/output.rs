//! Report formatting.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use source_edit::LineIndex;
use we_transformer::Diagnostic;

use crate::cli::OutputFormat;

/// A transform diagnostic with resolved positions.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedDiagnostic {
    /// `error`, `warning` or `hint`.
    pub severity: String,
    pub code: String,
    pub message: String,
    pub start: Position,
    pub end: Position,
}

/// A position in the `.we` source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

impl FormattedDiagnostic {
    pub fn from_diagnostics(diagnostics: &[Diagnostic], source: &str) -> Vec<Self> {
        let line_index = LineIndex::new(source);
        diagnostics
            .iter()
            .map(|diag| FormattedDiagnostic {
                severity: diag.severity.as_str().to_string(),
                code: diag.code.to_string(),
                message: diag.message.clone(),
                start: position(&line_index, diag.span.start.into()),
                end: position(&line_index, diag.span.end.into()),
            })
            .collect()
    }

    /// Renders `path:line:col: severity[code]: message`.
    pub fn display(&self, file_path: &Utf8Path) -> String {
        format!(
            "{}:{}:{}: {}[{}]: {}",
            file_path, self.start.line, self.start.column, self.severity, self.code, self.message
        )
    }
}

pub(crate) fn position(line_index: &LineIndex, offset: u32) -> Position {
    let at = line_index.line_col(offset.into());
    Position {
        line: at.line + 1,
        column: at.col + 1,
        offset,
    }
}

/// Whether a file was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Migrated,
    Failed,
}

/// The outcome for one `.we` file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: Utf8PathBuf,
    pub entry: bool,
    pub status: FileStatus,
    /// The `.vue` file, absent when the transform failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Utf8PathBuf>,
    /// Files written for nested elements.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Utf8PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub diagnostics: Vec<FormattedDiagnostic>,
}

/// Totals of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrateSummary {
    pub file_count: usize,
    pub migrated: usize,
    pub failed: usize,
    pub diagnostic_count: usize,
    pub dry_run: bool,
}

impl MigrateSummary {
    /// Formats the summary line.
    pub fn format(&self) -> String {
        let mut line = format!(
            "Migrated {} of {} {}",
            self.migrated,
            self.file_count,
            plural(self.file_count, "file", "files")
        );
        if self.failed > 0 {
            line.push_str(&format!(", {} failed", self.failed));
        }
        if self.diagnostic_count > 0 {
            line.push_str(&format!(
                ", {} {} to review",
                self.diagnostic_count,
                plural(self.diagnostic_count, "diagnostic", "diagnostics")
            ));
        }
        if self.dry_run {
            line.push_str(" (dry run, nothing written)");
        }
        line
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub files: Vec<FileReport>,
    pub summary: MigrateSummary,
}

impl Report {
    /// Renders the report for stdout.
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => format!("{}\n", self.summary.format()),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(self).unwrap_or_default();
                json.push('\n');
                json
            }
        }
    }
}
