//! Check command implementation: discovery, parallel per-file analysis,
//! cache wiring, and reporting.
//!
//! Files are processed in parallel; each file's walk is strictly
//! sequential and failures stay isolated to their file. Per-file outcomes
//! are sorted by path before reporting so multi-file output is
//! reproducible regardless of scheduling.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use treelint_core::{
    content_hash, walk, AllowCommentFilter, DispatchTable, EngineConfig, FileContext,
    PathPatternFilter, RegionCommentFilter, ResultCache, Severity, SeverityThresholdFilter,
    SuppressionChain, TokenRegistry,
};
use treelint_java::ParseOptions;

use super::output::{self, FileOutcome, FileReport, RunReport};
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    exclude: Vec<String>,
    config_path: Option<&Path>,
    no_cache: bool,
) -> Result<()> {
    let source = crate::config_resolver::resolve(path, config_path);
    let config = match source.path() {
        Some(p) => EngineConfig::from_file(p)
            .with_context(|| format!("failed to load config: {}", p.display()))?,
        None => EngineConfig::default(),
    };

    let report = analyze(path, &config, &exclude, no_cache)?;
    output::print(&report, format)?;

    let fail_on = config.fail_on.unwrap_or(Severity::Error);
    if report.has_failures() || report.has_violations_at(fail_on) {
        std::process::exit(1);
    }
    Ok(())
}

/// Analyzes every discovered file under `root` with the given
/// configuration and returns the per-file outcomes sorted by path.
///
/// # Errors
///
/// Configuration-class problems (unknown checks or tokens, broken token
/// subset invariants, bad suppression patterns) abort here, before any
/// file is touched. Per-file problems never bubble up; they become that
/// file's outcome.
pub fn analyze(
    root: &Path,
    config: &EngineConfig,
    extra_exclude: &[String],
    no_cache: bool,
) -> Result<RunReport> {
    let registry = treelint_java::registry();

    let check_configs =
        treelint_checks::resolve(&config.checks).context("configuration error")?;
    let table =
        DispatchTable::build(registry, check_configs).context("configuration error")?;
    let chain = build_chain(config).context("configuration error")?;
    let config_hash = config.config_hash().context("configuration error")?;

    let parse_options = if table.comments_required() {
        ParseOptions::with_comments()
    } else {
        ParseOptions::default()
    };

    let files = discover(root, config, extra_exclude)?;
    info!(
        "analyzing {} file(s) with {} check(s)",
        files.len(),
        table.module_count()
    );

    let cache = if no_cache {
        None
    } else {
        config.cache_file.as_ref().map(|configured| {
            let path = if configured.is_absolute() {
                configured.clone()
            } else {
                root.join(configured)
            };
            let cache = ResultCache::load(&path, &config_hash);
            debug!("loaded cache with {} entries", cache.len());
            (path, Mutex::new(cache))
        })
    };

    let mut reports: Vec<FileReport> = files
        .par_iter()
        .map(|file| {
            process_file(
                file,
                root,
                registry,
                &table,
                &chain,
                cache.as_ref().map(|(_, m)| m),
                &config_hash,
                parse_options,
            )
        })
        .collect();
    reports.sort_by(|a, b| a.path.cmp(&b.path));

    if let Some((path, mutex)) = &cache {
        match mutex.lock() {
            Ok(guard) => {
                if let Err(e) = guard.save(path) {
                    warn!("failed to save cache: {e}");
                }
            }
            Err(_) => warn!("cache lock poisoned, not saving"),
        }
    }

    Ok(RunReport::new(reports))
}

/// Analyzes one file. Infallible by design: every failure mode becomes
/// this file's outcome without affecting any other file.
#[allow(clippy::too_many_arguments)]
fn process_file(
    file: &Path,
    root: &Path,
    registry: &TokenRegistry,
    table: &DispatchTable,
    chain: &SuppressionChain,
    cache: Option<&Mutex<ResultCache>>,
    config_hash: &str,
    parse_options: ParseOptions,
) -> FileReport {
    let display_path = file.strip_prefix(root).unwrap_or(file).to_path_buf();

    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            return FileReport {
                path: display_path,
                outcome: FileOutcome::Unreadable {
                    message: e.to_string(),
                },
            }
        }
    };
    let key = file_key(&display_path, &text);

    if let Some(cache) = cache {
        if let Ok(guard) = cache.lock() {
            if let Some(hit) = guard.lookup(&key, config_hash) {
                debug!("cache hit: {}", display_path.display());
                return FileReport::from_violations(display_path, hit.to_vec());
            }
        }
    }

    let tree = match treelint_java::parse(&text, &parse_options) {
        Ok(tree) => tree,
        Err(e) => {
            return FileReport {
                path: display_path,
                outcome: FileOutcome::SyntaxError {
                    line: e.line,
                    column: e.column,
                    message: e.message,
                },
            }
        }
    };

    let ctx = FileContext::new(&display_path, &text, registry);
    let violations = match walk(&tree, table, &ctx) {
        Ok(violations) => violations,
        Err(failure) => {
            return FileReport {
                path: display_path,
                outcome: FileOutcome::AnalysisFailure {
                    check: failure.check.clone(),
                    message: failure.to_string(),
                },
            }
        }
    };
    let survivors = chain.apply(violations, &ctx);

    // Only successfully analyzed files are cached; a failed file must be
    // re-attempted on every run.
    if let Some(cache) = cache {
        if let Ok(mut guard) = cache.lock() {
            guard.store(&key, config_hash, survivors.clone());
        }
    }

    FileReport::from_violations(display_path, survivors)
}

/// Cache key for one file. The path participates alongside the content:
/// violations carry positions in a named file, and path-based
/// suppressions make identical content at two paths analyze differently.
fn file_key(path: &Path, text: &str) -> String {
    content_hash(&format!("{}\n{text}", path.display()))
}

fn build_chain(config: &EngineConfig) -> Result<SuppressionChain, treelint_core::ConfigError> {
    let mut chain = SuppressionChain::new()
        .with(AllowCommentFilter)
        .with(RegionCommentFilter);
    if !config.suppressions.is_empty() {
        chain.push(Box::new(PathPatternFilter::from_entries(
            &config.suppressions,
        )?));
    }
    if let Some(min) = config.min_severity {
        chain.push(Box::new(SeverityThresholdFilter::new(min)));
    }
    Ok(chain)
}

/// Java files under `root`, honoring gitignore and exclude patterns,
/// sorted for a stable submission order.
fn discover(root: &Path, config: &EngineConfig, extra_exclude: &[String]) -> Result<Vec<PathBuf>> {
    let mut patterns = Vec::new();
    for source in config.analyzer.exclude.iter().chain(extra_exclude) {
        let pattern = glob::Pattern::new(source)
            .with_context(|| format!("invalid exclude pattern {source:?}"))?;
        patterns.push(pattern);
    }

    let mut walker = WalkBuilder::new(root);
    walker.git_ignore(config.analyzer.respect_gitignore);
    walker.git_exclude(config.analyzer.respect_gitignore);

    let mut files = Vec::new();
    for entry in walker.build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.into_path();
        if path.extension().and_then(|e| e.to_str()) != Some("java") {
            continue;
        }
        if patterns.iter().any(|p| p.matches_path(&path)) {
            debug!("excluding: {}", path.display());
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config(toml: &str) -> EngineConfig {
        EngineConfig::parse(toml).unwrap()
    }

    const EMPTY_BLOCK_CONFIG: &str = "[[checks]]\nname = \"empty-block\"\n";

    #[test]
    fn reports_violations_per_file_sorted_by_path() {
        let dir = TempDir::new().unwrap();
        write(&dir, "B.java", "class B { void f() {} }");
        write(&dir, "A.java", "class A { void f() { int x = 1; } }");

        let report = analyze(dir.path(), &config(EMPTY_BLOCK_CONFIG), &[], true).unwrap();
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].path, Path::new("A.java"));
        assert!(matches!(report.files[0].outcome, FileOutcome::Clean));
        assert!(matches!(
            report.files[1].outcome,
            FileOutcome::Violations { .. }
        ));
    }

    #[test]
    fn syntax_error_is_isolated_to_its_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "Bad.java", "class {");
        write(&dir, "Good.java", "class Good { void f() {} }");

        let report = analyze(dir.path(), &config(EMPTY_BLOCK_CONFIG), &[], true).unwrap();
        assert!(matches!(
            report.files[0].outcome,
            FileOutcome::SyntaxError { .. }
        ));
        // The broken neighbor does not keep Good.java from being analyzed.
        assert!(matches!(
            report.files[1].outcome,
            FileOutcome::Violations { .. }
        ));
        assert!(report.has_failures());
    }

    #[test]
    fn unknown_check_aborts_before_any_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.java", "class A { }");
        let result = analyze(
            dir.path(),
            &config("[[checks]]\nname = \"no-such-check\"\n"),
            &[],
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn exclude_patterns_drop_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.java", "class A { void f() {} }");
        let report = analyze(
            dir.path(),
            &config(EMPTY_BLOCK_CONFIG),
            &["**/A.java".to_string()],
            true,
        )
        .unwrap();
        assert!(report.files.is_empty());
    }

    #[test]
    fn allow_comment_suppresses_in_the_full_pipeline() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "A.java",
            "class A {\n    // treelint: allow(empty-block)\n    void f() {}\n}\n",
        );
        let report = analyze(dir.path(), &config(EMPTY_BLOCK_CONFIG), &[], true).unwrap();
        assert!(matches!(report.files[0].outcome, FileOutcome::Clean));
    }

    #[test]
    fn cache_round_trip_skips_reanalysis() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.java", "class A { void f() {} }");
        let cfg = config(&format!("cache_file = \"lint.cache\"\n{EMPTY_BLOCK_CONFIG}"));

        let first = analyze(dir.path(), &cfg, &[], false).unwrap();
        assert!(matches!(
            first.files[0].outcome,
            FileOutcome::Violations { .. }
        ));
        assert!(dir.path().join("lint.cache").exists());

        // Second run hits the cache and must report identical results.
        let second = analyze(dir.path(), &cfg, &[], false).unwrap();
        let (a, b) = (
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn config_change_invalidates_cache() {
        let dir = TempDir::new().unwrap();
        write(&dir, "A.java", "class A { void f() {} }");

        let strict = config(&format!("cache_file = \"lint.cache\"\n{EMPTY_BLOCK_CONFIG}"));
        analyze(dir.path(), &strict, &[], false).unwrap();

        // Same file, different configuration: the old entry must not serve.
        let lenient = config(
            "cache_file = \"lint.cache\"\n[[checks]]\nname = \"empty-block\"\nseverity = \"info\"\n",
        );
        let report = analyze(dir.path(), &lenient, &[], false).unwrap();
        match &report.files[0].outcome {
            FileOutcome::Violations { violations } => {
                assert_eq!(violations[0].severity, Severity::Info);
            }
            other => panic!("expected violations, got {other:?}"),
        }
    }

    #[test]
    fn min_severity_filters_output() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "A.java",
            "class A {\n    // TODO: later\n    void f() { int x = 1; }\n}\n",
        );
        // todo-comment reports at info severity; the threshold removes it.
        let cfg = config("min_severity = \"warning\"\n[[checks]]\nname = \"todo-comment\"\n");
        let report = analyze(dir.path(), &cfg, &[], true).unwrap();
        assert!(matches!(report.files[0].outcome, FileOutcome::Clean));
    }

    #[test]
    fn path_suppressions_apply() {
        let dir = TempDir::new().unwrap();
        write(&dir, "Legacy.java", "class Legacy { void f() {} }");
        let cfg = config(&format!(
            "{EMPTY_BLOCK_CONFIG}\n[[suppressions]]\nfiles = \"Legacy.java\"\nchecks = \"empty-block\"\n"
        ));
        let report = analyze(dir.path(), &cfg, &[], true).unwrap();
        assert!(matches!(report.files[0].outcome, FileOutcome::Clean));
    }
}
