//! Violations and their severity.

use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};

use crate::context::FileContext;

/// Severity level of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding.
    Info,
    /// Should be addressed.
    Warning,
    /// Must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// One reported rule failure. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the check that produced this violation.
    pub check: String,
    /// Stable message key (e.g. `"block.empty"`).
    pub key: String,
    /// Formatted human-readable message.
    pub message: String,
    /// File the violation was found in.
    pub file: PathBuf,
    /// 1-based line.
    pub line: usize,
    /// 1-based column (node columns are 0-based; reporting adds one).
    pub column: usize,
    /// Severity of this violation.
    pub severity: Severity,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        check: impl Into<String>,
        key: impl Into<String>,
        severity: Severity,
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check: check.into(),
            key: key.into(),
            message: message.into(),
            file: file.into(),
            line,
            column,
            severity,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.file.display(),
            self.line,
            self.column,
            self.severity,
            self.check,
            self.message
        )
    }
}

/// Converts a [`Violation`] to a miette diagnostic for rich display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl ViolationDiagnostic {
    /// Builds a diagnostic, using the file context to locate the span.
    #[must_use]
    pub fn new(violation: &Violation, ctx: &FileContext<'_>) -> Self {
        let offset = ctx.offset_for(violation.line, violation.column);
        Self {
            message: format!("[{}] {}", violation.check, violation.message),
            span: SourceSpan::from((offset, 1)),
            label_message: violation.key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenRegistry;
    use std::path::Path;

    fn violation() -> Violation {
        Violation::new(
            "empty-block",
            "block.empty",
            Severity::Warning,
            "src/Main.java",
            3,
            5,
            "empty block",
        )
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_round_trips_from_str() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("WARNING".parse::<Severity>(), Ok(Severity::Warning));
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            violation().to_string(),
            "src/Main.java:3:5: warning [empty-block] empty block"
        );
    }

    #[test]
    fn serde_round_trip() {
        let v = violation();
        let json = serde_json::to_string(&v).unwrap();
        let back: Violation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn diagnostic_carries_message_and_span() {
        let registry = TokenRegistry::new(["program"]);
        let text = "class A {\n  void f() {\n    int x;\n  }\n}\n";
        let ctx = FileContext::new(Path::new("src/Main.java"), text, &registry);
        let diag = ViolationDiagnostic::new(&violation(), &ctx);
        assert!(diag.to_string().contains("empty block"));
    }
}
