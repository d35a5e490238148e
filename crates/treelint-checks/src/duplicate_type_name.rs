//! Check that flags top-level type names reused across files.
//!
//! This is a global-stateful module: per-file instances share one
//! accumulator behind `Arc<Mutex<_>>`, handed in through the constructor
//! so the cross-file synchronization is visible at registration. With
//! files analyzed in parallel, which occurrence is reported as the
//! duplicate depends on completion order; within one file the output is
//! deterministic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use treelint_core::{
    Check, CheckContext, CheckFailure, NodeRef, Statefulness, TokenRegistry, TokenScope,
};

use crate::util::{kind_name, scope};

/// Check name for duplicate-type-name.
pub const NAME: &str = "duplicate-type-name";

const KEY: &str = "type.duplicate";

const ACCEPTABLE: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

const DEFAULT: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
];

/// Shared map from type name to the file that declared it first.
pub type SharedTypeNames = Arc<Mutex<HashMap<String, String>>>;

/// Flags a top-level type whose name already appeared in another file.
#[derive(Debug, Clone)]
pub struct DuplicateTypeName {
    seen: SharedTypeNames,
}

impl DuplicateTypeName {
    /// Creates a fresh accumulator for one run.
    #[must_use]
    pub fn shared() -> SharedTypeNames {
        Arc::new(Mutex::new(HashMap::new()))
    }

    /// Creates an instance over a run-wide accumulator.
    #[must_use]
    pub fn new(seen: SharedTypeNames) -> Self {
        Self { seen }
    }
}

impl Check for DuplicateTypeName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags top-level type names reused across files"
    }

    fn statefulness(&self) -> Statefulness {
        Statefulness::GlobalStateful
    }

    fn acceptable_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, ACCEPTABLE)
    }

    fn default_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, DEFAULT)
    }

    fn visit_token(
        &mut self,
        node: NodeRef<'_>,
        ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        let registry = ctx.file().registry();
        // Only top-level declarations participate; nested types are scoped
        // by their enclosing type.
        let top_level = node
            .parent()
            .is_some_and(|p| kind_name(registry, p.kind()) == "program");
        if !top_level {
            return Ok(());
        }
        let Ok(identifier) = registry.id_of("identifier") else {
            return Ok(());
        };
        let Some(name_node) = node.find_child(identifier) else {
            return Ok(());
        };
        let type_name = name_node.text().to_string();
        let this_file = ctx.file().path().display().to_string();

        let duplicate_of = {
            let mut seen = self
                .seen
                .lock()
                .map_err(|_| CheckFailure::new("type name accumulator poisoned"))?;
            match seen.get(&type_name) {
                Some(first_file) if *first_file != this_file => Some(first_file.clone()),
                Some(_) => None,
                None => {
                    seen.insert(type_name.clone(), this_file);
                    None
                }
            }
        };
        if let Some(first_file) = duplicate_of {
            ctx.report(
                name_node,
                KEY,
                format!("type {type_name:?} is already declared in {first_file}"),
            );
        }
        Ok(())
    }
}
