//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# treelint configuration
#
# Checks run in declaration order; order is also the tie-break for
# violations reported on the same position.

# Severity that makes the run fail (default: "error")
# fail_on = "warning"

# Drop violations below this severity entirely
# min_severity = "info"

# Cache analysis results between runs
# cache_file = ".treelint-cache.json"

[analyzer]
# Glob patterns to exclude from analysis
exclude = [
    "**/build/**",
    "**/generated/**",
]

# Respect .gitignore files
respect_gitignore = true

[[checks]]
name = "empty-block"
# Inspect more block kinds than the default:
# tokens = ["block", "class_body"]

[[checks]]
name = "nested-if-depth"
max = 2

[[checks]]
name = "method-count"
max = 30

[[checks]]
name = "todo-comment"
# marker = "FIXME"

[[checks]]
name = "duplicate-type-name"

# Suppress findings by path, check, and line:
# [[suppressions]]
# files = "**/Legacy.java"
# checks = "empty-block"
# lines = [10, 11]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("treelint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created treelint.toml");
    println!("\nNext steps:");
    println!("  1. Edit treelint.toml to configure checks");
    println!("  2. Run: treelint check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use treelint_core::EngineConfig;

    #[test]
    fn default_config_parses_and_resolves() {
        let config = EngineConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.checks.len(), 5);
        // Every check in the template must resolve against the registry.
        treelint_checks::resolve(&config.checks).unwrap();
    }
}
