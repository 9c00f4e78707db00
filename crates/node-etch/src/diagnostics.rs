//! Error types and diagnostics
//!
//! Fatal conditions (a bad target path, an unwritable destination) are
//! [`EtchError`]s and stop the run. Everything else that goes wrong while
//! reading a node repository is collected as a [`Diagnostic`] so the run can
//! still produce partial documentation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for node-etch operations
pub type EtchResult<T> = Result<T, EtchError>;

/// Main error type for node-etch
#[derive(Debug, Error)]
pub enum EtchError {
    /// Target path does not exist
    #[error("'{0}' does not exist")]
    NotFound(PathBuf),

    /// Target path exists but is not a directory
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Destination could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EtchError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        EtchError::Config(message.into())
    }

    /// Create a write error for a destination path
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EtchError::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether this error was caused by the target path or options rather
    /// than by the filesystem while writing.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EtchError::NotFound(_) | EtchError::NotADirectory(_) | EtchError::Config(_)
        )
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Warning - doc generation continues with partial information
    Warning,
    /// Info - informational message
    Info,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        }
    }

    /// Get ANSI color code
    pub fn color(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Warning => "\x1b[33m", // Yellow
            DiagnosticSeverity::Info => "\x1b[34m",    // Blue
        }
    }
}

/// What part of the pipeline raised a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A source file, node or field could only be partially read
    Introspection,
    /// Two node definitions share an id
    DuplicateNode,
    /// The supplement file could not be read or parsed
    Supplement,
    /// A supplement section has no slot in the template
    SupplementMismatch,
}

impl DiagnosticKind {
    /// Short code shown next to the severity
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::Introspection => "introspection",
            DiagnosticKind::DuplicateNode => "duplicate-node",
            DiagnosticKind::Supplement => "supplement",
            DiagnosticKind::SupplementMismatch => "supplement-mismatch",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Category
    pub kind: DiagnosticKind,
    /// Message
    pub message: String,
    /// Source file
    pub file: Option<PathBuf>,
    /// Line number (1-indexed)
    pub line: Option<usize>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        severity: DiagnosticSeverity,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, kind, message)
    }

    /// Create an info diagnostic
    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, kind, message)
    }

    /// Set the source file
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the line
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    fn location(&self) -> Option<String> {
        let file = self.file.as_ref()?;
        Some(match self.line {
            Some(line) => format!("{}:{}", file.display(), line),
            None => file.display().to_string(),
        })
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        let mut result = String::new();
        if let Some(location) = self.location() {
            result.push_str(&location);
            result.push_str(": ");
        }
        result.push_str(self.severity.display());
        result.push('[');
        result.push_str(self.kind.code());
        result.push_str("]: ");
        result.push_str(&self.message);
        result
    }

    /// Format with ANSI colors
    pub fn format_colored(&self) -> String {
        let reset = "\x1b[0m";
        let mut result = String::new();
        if let Some(location) = self.location() {
            result.push_str("\x1b[2m");
            result.push_str(&location);
            result.push_str(reset);
            result.push_str(": ");
        }
        result.push_str(self.severity.color());
        result.push_str(self.severity.display());
        result.push_str(reset);
        result.push_str("\x1b[2m[");
        result.push_str(self.kind.code());
        result.push_str("]\x1b[0m: ");
        result.push_str(&self.message);
        result
    }
}

/// Collector for diagnostics during doc generation
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn add(&mut self, diagnostic: Diagnostic) {
        // warnings reach the user through the summary
        tracing::debug!(kind = diagnostic.kind.code(), "{}", diagnostic.format());
        self.diagnostics.push(diagnostic);
    }

    /// Add a warning
    pub fn warning(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.add(Diagnostic::warning(kind, message));
    }

    /// Add an info message
    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.add(Diagnostic::info(kind, message));
    }

    /// Move every diagnostic out of `other` into this collector
    pub fn extend(&mut self, other: DiagnosticsCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over warnings only
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// Get warning count
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Count warnings of one kind
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.warnings().filter(|d| d.kind == kind).count()
    }

    /// Every warning on its own line, then the count. Empty without warnings.
    pub fn summary(&self, colored: bool) -> String {
        let mut out = String::new();
        for diagnostic in self.warnings() {
            if colored {
                out.push_str(&diagnostic.format_colored());
            } else {
                out.push_str(&diagnostic.format());
            }
            out.push('\n');
        }
        let warnings = self.warning_count();
        if warnings > 0 {
            out.push_str(&format!("\n{} warning(s)\n", warnings));
        }
        out
    }

    /// Print the summary to stderr
    pub fn print_summary(&self, colored: bool) {
        eprint!("{}", self.summary(colored));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etch_error() {
        let err = EtchError::NotFound(PathBuf::from("missing/nodes"));
        assert!(err.to_string().contains("missing/nodes"));
        assert!(err.is_configuration());

        let err = EtchError::write(
            "out.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("out.md"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_diagnostic_format() {
        let diag = Diagnostic::warning(DiagnosticKind::Introspection, "field `x` has no type")
            .in_file("nodes.py")
            .at_line(10);

        let formatted = diag.format();
        assert_eq!(
            formatted,
            "nodes.py:10: warning[introspection]: field `x` has no type"
        );
    }

    #[test]
    fn test_diagnostics_collector() {
        let mut collector = DiagnosticsCollector::new();
        collector.warning(DiagnosticKind::Introspection, "warning 1");
        collector.warning(DiagnosticKind::SupplementMismatch, "warning 2");
        collector.info(DiagnosticKind::Introspection, "info 1");

        assert_eq!(collector.warning_count(), 2);
        assert_eq!(collector.count_of(DiagnosticKind::SupplementMismatch), 1);
        assert_eq!(collector.diagnostics().len(), 3);
    }

    #[test]
    fn test_summary_lists_warnings_then_count() {
        let mut collector = DiagnosticsCollector::new();
        assert_eq!(collector.summary(false), "");

        collector.add(
            Diagnostic::warning(DiagnosticKind::Introspection, "type of field `x` could not be read")
                .in_file("nodes.py")
                .at_line(4),
        );
        collector.info(DiagnosticKind::Introspection, "not listed");
        collector.warning(DiagnosticKind::Supplement, "node-docs.yaml ignored");

        assert_eq!(
            collector.summary(false),
            "nodes.py:4: warning[introspection]: type of field `x` could not be read\n\
             warning[supplement]: node-docs.yaml ignored\n\
             \n\
             2 warning(s)\n"
        );

        let colored = collector.summary(true);
        assert!(colored.contains("\x1b["));
        assert!(colored.contains("node-docs.yaml ignored"));
        assert!(colored.ends_with("2 warning(s)\n"));
    }
}
