//! The violation suppression filter chain.
//!
//! Filters run strictly after a file's full violation list exists — never
//! interleaved with dispatch — because region markers ("suppress until the
//! next `on` marker") need the whole file's picture. A violation survives
//! only if every filter accepts it; the first rejection short-circuits the
//! rest of the chain.
//!
//! In-source directives:
//!
//! ```text
//! int x = 1; // treelint: allow(empty-block)
//! // treelint: off(nested-if-depth)
//! ...
//! // treelint: on(nested-if-depth)
//! ```
//!
//! `allow` applies to its own line and the line below it; `off`/`on`
//! bracket a region. `all` in either directive matches every check.

use glob::Pattern;

use crate::config::{ConfigError, SuppressionEntry};
use crate::context::FileContext;
use crate::violation::{Severity, Violation};

/// One stage of the suppression chain.
pub trait SuppressionFilter: Send + Sync {
    /// Name for diagnostics.
    fn name(&self) -> &'static str;

    /// Returns `false` to drop the violation.
    fn accept(&self, violation: &Violation, ctx: &FileContext<'_>) -> bool;
}

/// Ordered, short-circuiting sequence of filters.
#[derive(Default)]
pub struct SuppressionChain {
    filters: Vec<Box<dyn SuppressionFilter>>,
}

impl SuppressionChain {
    /// An empty chain that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter to the chain.
    #[must_use]
    pub fn with(mut self, filter: impl SuppressionFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Appends a boxed filter to the chain.
    pub fn push(&mut self, filter: Box<dyn SuppressionFilter>) {
        self.filters.push(filter);
    }

    /// Number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if the chain has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Runs the chain over a file's violations, keeping the survivors.
    #[must_use]
    pub fn apply(&self, violations: Vec<Violation>, ctx: &FileContext<'_>) -> Vec<Violation> {
        violations
            .into_iter()
            .filter(|v| self.filters.iter().all(|f| f.accept(v, ctx)))
            .collect()
    }
}

/// Text after a `treelint:` marker, provided the marker sits in a comment.
fn directive_in(line: &str) -> Option<&str> {
    let index = line.find("treelint:")?;
    let before = &line[..index];
    if !(before.contains("//") || before.contains("/*")) {
        return None;
    }
    Some(line[index + "treelint:".len()..].trim_start())
}

/// Parses `keyword(name, name2)` and returns the names.
fn parse_name_list<'a>(directive: &'a str, keyword: &str) -> Option<Vec<&'a str>> {
    let rest = directive.strip_prefix(keyword)?.strip_prefix('(')?;
    let close = rest.find(')')?;
    let names: Vec<&str> = rest[..close]
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

fn names_match(names: &[&str], check: &str) -> bool {
    names.iter().any(|n| *n == check || *n == "all")
}

/// Drops violations allowed by a `treelint: allow(...)` comment on the
/// same line or the line above.
pub struct AllowCommentFilter;

impl SuppressionFilter for AllowCommentFilter {
    fn name(&self) -> &'static str {
        "allow-comment"
    }

    fn accept(&self, violation: &Violation, ctx: &FileContext<'_>) -> bool {
        for line_number in [violation.line.saturating_sub(1), violation.line] {
            if line_number == 0 {
                continue;
            }
            let Some(text) = ctx.line(line_number) else {
                continue;
            };
            if let Some(directive) = directive_in(text) {
                if let Some(names) = parse_name_list(directive, "allow") {
                    if names_match(&names, &violation.check) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Drops violations inside a `treelint: off(...)` … `treelint: on(...)`
/// region. An unclosed `off` suppresses through the end of the file.
pub struct RegionCommentFilter;

impl SuppressionFilter for RegionCommentFilter {
    fn name(&self) -> &'static str {
        "region-comment"
    }

    fn accept(&self, violation: &Violation, ctx: &FileContext<'_>) -> bool {
        let mut suppressed = false;
        for line_number in 1..=violation.line.min(ctx.line_count()) {
            let Some(text) = ctx.line(line_number) else {
                break;
            };
            let Some(directive) = directive_in(text) else {
                continue;
            };
            if let Some(names) = parse_name_list(directive, "off") {
                if names_match(&names, &violation.check) {
                    suppressed = true;
                }
            } else if let Some(names) = parse_name_list(directive, "on") {
                if names_match(&names, &violation.check) {
                    suppressed = false;
                }
            }
        }
        !suppressed
    }
}

struct CompiledEntry {
    files: Pattern,
    checks: Option<String>,
    lines: Option<Vec<usize>>,
}

impl CompiledEntry {
    fn matches(&self, violation: &Violation) -> bool {
        if !self.files.matches_path(&violation.file) {
            return false;
        }
        if let Some(check) = &self.checks {
            if check != "*" && *check != violation.check {
                return false;
            }
        }
        match &self.lines {
            Some(lines) => lines.contains(&violation.line),
            None => true,
        }
    }
}

/// Drops violations matching configuration-loaded path/check/line entries.
pub struct PathPatternFilter {
    entries: Vec<CompiledEntry>,
}

impl PathPatternFilter {
    /// Compiles the configured entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for an uncompilable glob;
    /// this is a pre-run fatal error like every other configuration
    /// problem.
    pub fn from_entries(entries: &[SuppressionEntry]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(entries.len());
        for entry in entries {
            let files =
                Pattern::new(&entry.files).map_err(|source| ConfigError::InvalidPattern {
                    pattern: entry.files.clone(),
                    source,
                })?;
            compiled.push(CompiledEntry {
                files,
                checks: entry.checks.clone(),
                lines: entry.lines.clone(),
            });
        }
        Ok(Self { entries: compiled })
    }
}

impl SuppressionFilter for PathPatternFilter {
    fn name(&self) -> &'static str {
        "path-pattern"
    }

    fn accept(&self, violation: &Violation, _ctx: &FileContext<'_>) -> bool {
        !self.entries.iter().any(|e| e.matches(violation))
    }
}

/// Drops violations below a minimum severity.
pub struct SeverityThresholdFilter {
    min: Severity,
}

impl SeverityThresholdFilter {
    /// Keeps only violations at or above `min`.
    #[must_use]
    pub fn new(min: Severity) -> Self {
        Self { min }
    }
}

impl SuppressionFilter for SeverityThresholdFilter {
    fn name(&self) -> &'static str {
        "severity-threshold"
    }

    fn accept(&self, violation: &Violation, _ctx: &FileContext<'_>) -> bool {
        violation.severity >= self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenRegistry;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    fn registry() -> TokenRegistry {
        TokenRegistry::new(["program"])
    }

    fn violation(check: &str, line: usize) -> Violation {
        Violation::new(
            check,
            "test.key",
            Severity::Error,
            "src/A.java",
            line,
            1,
            "message",
        )
    }

    fn ctx_with<'a>(text: &'a str, registry: &'a TokenRegistry) -> FileContext<'a> {
        FileContext::new(Path::new("src/A.java"), text, registry)
    }

    /// Rejects a fixed line and records every consultation.
    struct LineRejector {
        line: usize,
        consulted: Arc<Mutex<Vec<usize>>>,
    }

    impl LineRejector {
        fn new(line: usize) -> (Self, Arc<Mutex<Vec<usize>>>) {
            let consulted = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    line,
                    consulted: Arc::clone(&consulted),
                },
                consulted,
            )
        }
    }

    impl SuppressionFilter for LineRejector {
        fn name(&self) -> &'static str {
            "line-rejector"
        }
        fn accept(&self, violation: &Violation, _ctx: &FileContext<'_>) -> bool {
            self.consulted
                .lock()
                .map_or((), |mut c| c.push(violation.line));
            violation.line != self.line
        }
    }

    #[test]
    fn chain_drops_rejected_line_only() {
        let registry = registry();
        let ctx = ctx_with("", &registry);
        let (rejector, _log) = LineRejector::new(5);
        let chain = SuppressionChain::new().with(rejector);
        let survivors = chain.apply(
            vec![violation("c", 2), violation("c", 5), violation("c", 9)],
            &ctx,
        );
        let lines: Vec<usize> = survivors.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![2, 9]);
    }

    #[test]
    fn rejection_short_circuits_later_filters() {
        let registry = registry();
        let ctx = ctx_with("", &registry);
        let (first, _first_log) = LineRejector::new(5);
        let (second, second_log) = LineRejector::new(0);
        let chain = SuppressionChain::new().with(first).with(second);

        chain.apply(vec![violation("c", 5), violation("c", 9)], &ctx);

        // The line-5 violation was rejected by the first filter, so the
        // second filter only ever saw line 9.
        let consulted = second_log.lock().unwrap().clone();
        assert_eq!(consulted, vec![9]);
    }

    #[test]
    fn empty_chain_accepts_everything() {
        let registry = registry();
        let ctx = ctx_with("", &registry);
        let chain = SuppressionChain::new();
        assert!(chain.is_empty());
        let survivors = chain.apply(vec![violation("c", 1)], &ctx);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn allow_comment_on_same_line() {
        let registry = registry();
        let text = "class A {\nint x; // treelint: allow(magic-number)\n}\n";
        let ctx = ctx_with(text, &registry);
        let filter = AllowCommentFilter;
        assert!(!filter.accept(&violation("magic-number", 2), &ctx));
        assert!(filter.accept(&violation("other-check", 2), &ctx));
    }

    #[test]
    fn allow_comment_on_previous_line() {
        let registry = registry();
        let text = "// treelint: allow(magic-number)\nint x = 42;\n";
        let ctx = ctx_with(text, &registry);
        assert!(!AllowCommentFilter.accept(&violation("magic-number", 2), &ctx));
        // Two lines below the directive is out of reach.
        assert!(AllowCommentFilter.accept(&violation("magic-number", 3), &ctx));
    }

    #[test]
    fn allow_all_matches_every_check() {
        let registry = registry();
        let text = "int x; // treelint: allow(all)\n";
        let ctx = ctx_with(text, &registry);
        assert!(!AllowCommentFilter.accept(&violation("anything", 1), &ctx));
    }

    #[test]
    fn marker_outside_comment_is_ignored() {
        let registry = registry();
        let text = "String s = \"treelint: allow(magic-number)\";\n";
        let ctx = ctx_with(text, &registry);
        assert!(AllowCommentFilter.accept(&violation("magic-number", 1), &ctx));
    }

    #[test]
    fn region_suppresses_until_on_marker() {
        let registry = registry();
        let text = "\
line one
// treelint: off(empty-block)
suppressed here
still suppressed
// treelint: on(empty-block)
active again
";
        let ctx = ctx_with(text, &registry);
        let filter = RegionCommentFilter;
        assert!(filter.accept(&violation("empty-block", 1), &ctx));
        assert!(!filter.accept(&violation("empty-block", 3), &ctx));
        assert!(!filter.accept(&violation("empty-block", 4), &ctx));
        assert!(filter.accept(&violation("empty-block", 6), &ctx));
        // Other checks are unaffected by this region.
        assert!(filter.accept(&violation("other", 3), &ctx));
    }

    #[test]
    fn unclosed_region_runs_to_end_of_file() {
        let registry = registry();
        let text = "// treelint: off(all)\nx\ny\n";
        let ctx = ctx_with(text, &registry);
        assert!(!RegionCommentFilter.accept(&violation("whatever", 3), &ctx));
    }

    #[test]
    fn path_pattern_matches_file_check_and_lines() {
        let registry = registry();
        let ctx = ctx_with("", &registry);
        let filter = PathPatternFilter::from_entries(&[SuppressionEntry {
            files: "src/*.java".to_string(),
            checks: Some("empty-block".to_string()),
            lines: Some(vec![5]),
        }])
        .unwrap();

        assert!(!filter.accept(&violation("empty-block", 5), &ctx));
        assert!(filter.accept(&violation("empty-block", 6), &ctx));
        assert!(filter.accept(&violation("other", 5), &ctx));
    }

    #[test]
    fn path_pattern_without_lines_covers_whole_file() {
        let registry = registry();
        let ctx = ctx_with("", &registry);
        let filter = PathPatternFilter::from_entries(&[SuppressionEntry {
            files: "**/A.java".to_string(),
            checks: None,
            lines: None,
        }])
        .unwrap();
        assert!(!filter.accept(&violation("anything", 1), &ctx));
    }

    #[test]
    fn bad_glob_is_a_config_error() {
        let result = PathPatternFilter::from_entries(&[SuppressionEntry {
            files: "src/[".to_string(),
            checks: None,
            lines: None,
        }]);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn severity_threshold_drops_below_minimum() {
        let registry = registry();
        let ctx = ctx_with("", &registry);
        let filter = SeverityThresholdFilter::new(Severity::Warning);
        let mut info = violation("c", 1);
        info.severity = Severity::Info;
        let mut warning = violation("c", 2);
        warning.severity = Severity::Warning;
        assert!(!filter.accept(&info, &ctx));
        assert!(filter.accept(&warning, &ctx));
        assert!(filter.accept(&violation("c", 3), &ctx));
    }
}
