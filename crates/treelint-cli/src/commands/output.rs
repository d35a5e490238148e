//! Report data and output formatting for check runs.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use treelint_core::{Severity, Violation};

use crate::OutputFormat;

/// Outcome of analyzing one file.
///
/// Failures are kept apart from violations on purpose: "your code has a
/// style issue" and "the tool broke on this file" must never blur.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Analyzed, nothing to report.
    Clean,
    /// Analyzed, violations survived suppression.
    Violations {
        /// Violations in deterministic per-file order.
        violations: Vec<Violation>,
    },
    /// The file did not parse.
    SyntaxError {
        /// 1-based line of the first invalid construct.
        line: usize,
        /// 0-based column of the first invalid construct.
        column: usize,
        /// Parser message.
        message: String,
    },
    /// A check module hit an internal defect on this file.
    AnalysisFailure {
        /// Name of the failing check.
        check: String,
        /// Full failure description.
        message: String,
    },
    /// The file could not be read.
    Unreadable {
        /// IO error description.
        message: String,
    },
}

/// Per-file result within a run.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// Path relative to the analyzed root.
    pub path: PathBuf,
    /// What happened to the file.
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Report from a final (post-suppression) violation list.
    #[must_use]
    pub fn from_violations(path: PathBuf, violations: Vec<Violation>) -> Self {
        let outcome = if violations.is_empty() {
            FileOutcome::Clean
        } else {
            FileOutcome::Violations { violations }
        };
        Self { path, outcome }
    }

    fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            FileOutcome::SyntaxError { .. }
                | FileOutcome::AnalysisFailure { .. }
                | FileOutcome::Unreadable { .. }
        )
    }
}

/// All per-file results of one run, sorted by path.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Per-file outcomes.
    pub files: Vec<FileReport>,
}

impl RunReport {
    /// Wraps the per-file reports.
    #[must_use]
    pub fn new(files: Vec<FileReport>) -> Self {
        Self { files }
    }

    /// Every surviving violation across all files.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.files.iter().flat_map(|f| match &f.outcome {
            FileOutcome::Violations { violations } => violations.as_slice(),
            _ => &[],
        })
    }

    /// Whether any file failed to parse or analyze.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.files.iter().any(FileReport::is_failure)
    }

    /// Whether any violation is at or above the given severity.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations().any(|v| v.severity >= severity)
    }

    /// (errors, warnings, infos) across all files.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for violation in self.violations() {
            match violation.severity {
                Severity::Error => counts.0 += 1,
                Severity::Warning => counts.1 += 1,
                Severity::Info => counts.2 += 1,
            }
        }
        counts
    }
}

/// Print a run report in the specified format.
pub fn print(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn print_text(report: &RunReport) {
    let mut failures = 0usize;
    for file in &report.files {
        match &file.outcome {
            FileOutcome::Clean => {}
            FileOutcome::Violations { violations } => {
                for violation in violations {
                    println!(
                        "{} at {}:{}:{}",
                        violation.check,
                        file.path.display(),
                        violation.line,
                        violation.column,
                    );
                    println!(
                        "  {}: {}",
                        severity_indicator(violation.severity),
                        violation.message
                    );
                    println!();
                }
            }
            FileOutcome::SyntaxError {
                line,
                column,
                message,
            } => {
                failures += 1;
                println!(
                    "{}: {} is unanalyzable at {line}:{column}: {message}\n",
                    severity_indicator(Severity::Error),
                    file.path.display(),
                );
            }
            FileOutcome::AnalysisFailure { message, .. } => {
                failures += 1;
                println!(
                    "{}: tool failure on {}: {message}\n",
                    severity_indicator(Severity::Error),
                    file.path.display(),
                );
            }
            FileOutcome::Unreadable { message } => {
                failures += 1;
                println!(
                    "{}: could not read {}: {message}\n",
                    severity_indicator(Severity::Error),
                    file.path.display(),
                );
            }
        }
    }

    let (errors, warnings, infos) = report.count_by_severity();
    let summary_color = if errors > 0 || failures > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s); {} file(s) failed\x1b[0m",
        summary_color,
        errors,
        warnings,
        infos,
        report.files.len(),
        failures
    );
}

fn print_json(report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &RunReport) {
    for violation in report.violations() {
        println!("{violation}");
    }
}
