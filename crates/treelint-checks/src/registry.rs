//! Resolves configuration declarations into dispatchable check modules.

use std::sync::Arc;

use tracing::debug;

use treelint_core::{Check, CheckConfig, CheckFactory, CheckSettings, ConfigError};

use crate::duplicate_type_name::DuplicateTypeName;
use crate::empty_block::EmptyBlock;
use crate::method_count::MethodCount;
use crate::nested_if_depth::NestedIfDepth;
use crate::todo_comment::TodoComment;
use crate::{duplicate_type_name, empty_block, method_count, nested_if_depth, todo_comment};

/// One default-configured instance of every built-in check, for listings.
#[must_use]
pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(EmptyBlock::new()),
        Box::new(NestedIfDepth::new()),
        Box::new(MethodCount::new()),
        Box::new(TodoComment::new()),
        Box::new(DuplicateTypeName::new(DuplicateTypeName::shared())),
    ]
}

/// Turns the ordered check declarations of a configuration into the
/// [`CheckConfig`] list the dispatch table is built from. Declaration
/// order is preserved; disabled checks are skipped.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCheck`] for an unrecognized name and
/// [`ConfigError::InvalidOption`] for an unusable option value. Either is
/// fatal before any file is processed.
pub fn resolve(settings: &[CheckSettings]) -> Result<Vec<CheckConfig>, ConfigError> {
    let mut configs = Vec::with_capacity(settings.len());
    for declared in settings {
        if !declared.is_enabled() {
            debug!("skipping disabled check: {}", declared.name);
            continue;
        }
        configs.push(CheckConfig {
            factory: factory_for(declared)?,
            tokens: declared.tokens.clone(),
            severity: declared.severity,
        });
    }
    Ok(configs)
}

fn factory_for(settings: &CheckSettings) -> Result<CheckFactory, ConfigError> {
    match settings.name.as_str() {
        empty_block::NAME => Ok(Box::new(|| Box::new(EmptyBlock::new()))),
        nested_if_depth::NAME => {
            let max = non_negative(settings, "max", 1)?;
            Ok(Box::new(move || {
                Box::new(NestedIfDepth::new().max_depth(max))
            }))
        }
        method_count::NAME => {
            let max = non_negative(settings, "max", 100)?;
            Ok(Box::new(move || {
                Box::new(MethodCount::new().max_methods(max))
            }))
        }
        todo_comment::NAME => {
            let marker = settings.get_str("marker", "TODO").to_string();
            Ok(Box::new(move || {
                Box::new(TodoComment::new().marker(marker.clone()))
            }))
        }
        duplicate_type_name::NAME => {
            // One accumulator per run, cloned into every per-file instance.
            let seen = DuplicateTypeName::shared();
            Ok(Box::new(move || {
                Box::new(DuplicateTypeName::new(Arc::clone(&seen)))
            }))
        }
        other => Err(ConfigError::UnknownCheck(other.to_string())),
    }
}

fn non_negative(
    settings: &CheckSettings,
    option: &str,
    default: i64,
) -> Result<usize, ConfigError> {
    let value = settings.get_int(option, default);
    usize::try_from(value).map_err(|_| ConfigError::InvalidOption {
        check: settings.name.clone(),
        option: option.to_string(),
        message: format!("expected a non-negative integer, got {value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use treelint_core::EngineConfig;

    fn settings(toml: &str) -> Vec<CheckSettings> {
        EngineConfig::parse(toml).unwrap().checks
    }

    #[test]
    fn resolves_known_checks_in_order() {
        let configs = resolve(&settings(
            "[[checks]]\nname = \"todo-comment\"\n[[checks]]\nname = \"empty-block\"\n",
        ))
        .unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!((configs[0].factory)().name(), "todo-comment");
        assert_eq!((configs[1].factory)().name(), "empty-block");
    }

    #[test]
    fn unknown_check_is_fatal() {
        let result = resolve(&settings("[[checks]]\nname = \"no-such-check\"\n"));
        assert!(matches!(result, Err(ConfigError::UnknownCheck(_))));
    }

    #[test]
    fn disabled_checks_are_skipped() {
        let configs = resolve(&settings(
            "[[checks]]\nname = \"empty-block\"\nenabled = false\n",
        ))
        .unwrap();
        assert!(configs.is_empty());
    }

    #[test]
    fn negative_option_is_rejected() {
        let result = resolve(&settings(
            "[[checks]]\nname = \"nested-if-depth\"\nmax = -3\n",
        ));
        assert!(matches!(result, Err(ConfigError::InvalidOption { .. })));
    }

    #[test]
    fn factories_build_fresh_instances() {
        let configs = resolve(&settings("[[checks]]\nname = \"empty-block\"\n")).unwrap();
        let first = (configs[0].factory)();
        let second = (configs[0].factory)();
        assert_eq!(first.name(), second.name());
    }

    #[test]
    fn every_check_upholds_the_token_subset_invariant() {
        let registry = treelint_java::registry();
        for check in all_checks() {
            let acceptable = check.acceptable_tokens(registry).resolve(registry);
            let default = check.default_tokens(registry).resolve(registry);
            let required = check.required_tokens(registry).resolve(registry);
            assert!(
                required.is_subset(&default),
                "{}: required ⊄ default",
                check.name()
            );
            assert!(
                default.is_subset(&acceptable),
                "{}: default ⊄ acceptable",
                check.name()
            );
            assert!(!acceptable.is_empty(), "{}: no acceptable tokens", check.name());
        }
    }

    #[test]
    fn all_checks_have_distinct_names_and_descriptions() {
        let checks = all_checks();
        let mut names: Vec<&str> = checks.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), checks.len());
        assert!(checks.iter().all(|c| !c.description().is_empty()));
    }
}
