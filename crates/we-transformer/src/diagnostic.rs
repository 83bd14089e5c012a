//! Diagnostic types.
//!
//! The transform never refuses a component for shapes it cannot convert.
//! It leaves the text as it was and reports what a human should look at.

use source_edit::Span;

/// A note about a best-effort decision made during the transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// The location in the `.we` source.
    pub span: Span,
}

impl Diagnostic {
    /// Creates a new diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            span,
        }
    }
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational; the output is complete.
    Hint,
    /// The output was produced but may need a manual edit.
    Warning,
    /// Part of the component could not be converted.
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // === Markup ===
    /// `markup-parse-error`: recovered markup syntax error
    MarkupParseError,
    /// `duplicate-template`: a second `template` block was left untouched
    DuplicateTemplate,
    /// `missing-element-name`: nested element without a `name`, dropped
    MissingElementName,
    /// `invalid-element-name`: nested element whose name is not a file name, dropped
    InvalidElementName,
    /// `pass-through-script`: script with an unknown `type`, kept as is
    PassThroughScript,

    // === Script ===
    /// `script-parse-error`: the script could not be parsed and was kept as is
    ScriptParseError,
    /// `unsupported-export-shape`: the exported definition is not an object literal
    UnsupportedExportShape,
    /// `extra-export`: a second exported definition was ignored
    ExtraExport,
    /// `unsupported-data-shape`: `data` could not be converted to `props`
    UnsupportedDataShape,
    /// `data-statements-dropped`: statements before the data factory's `return`
    DataStatementsDropped,
    /// `data-injection-skipped`: a data-literal key already exists
    DataInjectionSkipped,
    /// `non-equivalent-event`: `$dispatch`/`$broadcast` became `$emit`
    NonEquivalentEvent,
    /// `components-not-object`: an existing `components` entry is not an object
    ComponentsNotObject,
    /// `edit-conflict`: script edits overlapped and the script was kept as is
    EditConflict,
}

impl DiagnosticCode {
    /// Returns the default severity for this diagnostic code.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::ScriptParseError | DiagnosticCode::EditConflict => Severity::Error,

            DiagnosticCode::PassThroughScript => Severity::Hint,

            DiagnosticCode::MarkupParseError
            | DiagnosticCode::DuplicateTemplate
            | DiagnosticCode::MissingElementName
            | DiagnosticCode::InvalidElementName
            | DiagnosticCode::UnsupportedExportShape
            | DiagnosticCode::ExtraExport
            | DiagnosticCode::UnsupportedDataShape
            | DiagnosticCode::DataStatementsDropped
            | DiagnosticCode::DataInjectionSkipped
            | DiagnosticCode::NonEquivalentEvent
            | DiagnosticCode::ComponentsNotObject => Severity::Warning,
        }
    }

    /// Returns the diagnostic code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::MarkupParseError => "markup-parse-error",
            DiagnosticCode::DuplicateTemplate => "duplicate-template",
            DiagnosticCode::MissingElementName => "missing-element-name",
            DiagnosticCode::InvalidElementName => "invalid-element-name",
            DiagnosticCode::PassThroughScript => "pass-through-script",
            DiagnosticCode::ScriptParseError => "script-parse-error",
            DiagnosticCode::UnsupportedExportShape => "unsupported-export-shape",
            DiagnosticCode::ExtraExport => "extra-export",
            DiagnosticCode::UnsupportedDataShape => "unsupported-data-shape",
            DiagnosticCode::DataStatementsDropped => "data-statements-dropped",
            DiagnosticCode::DataInjectionSkipped => "data-injection-skipped",
            DiagnosticCode::NonEquivalentEvent => "non-equivalent-event",
            DiagnosticCode::ComponentsNotObject => "components-not-object",
            DiagnosticCode::EditConflict => "edit-conflict",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
