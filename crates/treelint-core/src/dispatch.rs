//! The token-kind → interested-modules dispatch table.
//!
//! Built once per configuration, before any file is processed. Build time
//! is where every configuration-class invariant is enforced, so a bad
//! module or token list aborts the run instead of surfacing mid-walk.

use tracing::debug;

use crate::check::{Check, CheckFactory};
use crate::config::ConfigError;
use crate::tokens::{TokenKind, TokenRegistry, TokenSet};
use crate::violation::Severity;

/// One check declaration ready for table construction: the module factory
/// plus its configuration-level overrides.
pub struct CheckConfig {
    /// Constructor for per-file instances of the module.
    pub factory: CheckFactory,
    /// Explicit token-name subset from configuration, if any.
    pub tokens: Option<Vec<String>>,
    /// Severity override from configuration, if any.
    pub severity: Option<Severity>,
}

impl CheckConfig {
    /// Declaration with no overrides.
    #[must_use]
    pub fn new(factory: CheckFactory) -> Self {
        Self {
            factory,
            tokens: None,
            severity: None,
        }
    }
}

pub(crate) struct ModuleSlot {
    pub(crate) name: &'static str,
    pub(crate) factory: CheckFactory,
    pub(crate) severity: Severity,
    active: TokenSet,
}

/// Precomputed mapping from token kind to the ordered list of modules
/// registered for it.
///
/// Module order is configuration declaration order, stable across runs for
/// identical configuration — a prerequisite for deterministic violation
/// ordering.
pub struct DispatchTable {
    slots: Vec<ModuleSlot>,
    by_kind: Vec<Vec<usize>>,
    comments_required: bool,
}

impl DispatchTable {
    /// Builds the table from the resolved check declarations.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a module's `required ⊆ default ⊆
    /// acceptable` invariant does not hold, or when a configured token
    /// name is unknown or outside the module's acceptable set. Any of
    /// these aborts the run before any file is processed.
    pub fn build(
        registry: &TokenRegistry,
        configs: Vec<CheckConfig>,
    ) -> Result<Self, ConfigError> {
        let mut slots = Vec::with_capacity(configs.len());
        let mut by_kind: Vec<Vec<usize>> = vec![Vec::new(); registry.len()];
        let mut comments_required = false;

        for config in configs {
            let probe = (config.factory)();
            let name = probe.name();
            let acceptable = probe.acceptable_tokens(registry).resolve(registry);
            let default = probe.default_tokens(registry).resolve(registry);
            let required = probe.required_tokens(registry).resolve(registry);

            if !default.is_subset(&acceptable) {
                return Err(ConfigError::DefaultNotAcceptable {
                    check: name.to_string(),
                    tokens: outside(registry, &default, &acceptable),
                });
            }
            if !required.is_subset(&default) {
                return Err(ConfigError::RequiredNotDefault {
                    check: name.to_string(),
                    tokens: outside(registry, &required, &default),
                });
            }

            let mut active = match &config.tokens {
                Some(names) => {
                    let mut set = TokenSet::new();
                    for token_name in names {
                        let kind = registry.id_of(token_name).map_err(|_| {
                            ConfigError::UnknownToken {
                                check: name.to_string(),
                                name: token_name.clone(),
                            }
                        })?;
                        if !acceptable.contains(kind) {
                            return Err(ConfigError::TokenNotAcceptable {
                                check: name.to_string(),
                                name: token_name.clone(),
                            });
                        }
                        set.insert(kind);
                    }
                    set
                }
                None => default,
            };
            active.union_with(&required);

            comments_required |= probe.comment_nodes_required();

            let slot_index = slots.len();
            for kind in active.iter() {
                by_kind[kind.index()].push(slot_index);
            }
            debug!(
                check = name,
                tokens = active.len(),
                state = %probe.statefulness(),
                "registered check in dispatch table"
            );

            slots.push(ModuleSlot {
                name,
                severity: config.severity.unwrap_or_else(|| probe.default_severity()),
                active,
                factory: config.factory,
            });
        }

        Ok(Self {
            slots,
            by_kind,
            comments_required,
        })
    }

    /// Whether any active module needs comment nodes in the dispatched
    /// tree. The parser consults this before eliding comments.
    #[must_use]
    pub fn comments_required(&self) -> bool {
        self.comments_required
    }

    /// Number of active modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.slots.len()
    }

    /// Names of the active modules in declaration order.
    pub fn module_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|s| s.name)
    }

    /// The token kinds a module (by declaration index) is registered for.
    #[must_use]
    pub fn active_tokens(&self, module: usize) -> Option<&TokenSet> {
        self.slots.get(module).map(|s| &s.active)
    }

    /// Ordered slot indices registered for a kind. O(1); empty for kinds
    /// nobody registered.
    pub(crate) fn modules_for(&self, kind: TokenKind) -> &[usize] {
        self.by_kind
            .get(kind.index())
            .map_or(&[], Vec::as_slice)
    }

    pub(crate) fn slot(&self, index: usize) -> &ModuleSlot {
        &self.slots[index]
    }

    /// Fresh per-file instances of every module, in declaration order.
    pub(crate) fn instantiate(&self) -> Vec<Box<dyn Check>> {
        self.slots.iter().map(|s| (s.factory)()).collect()
    }
}

/// Names of the members of `set` that are missing from `superset`.
fn outside(registry: &TokenRegistry, set: &TokenSet, superset: &TokenSet) -> String {
    let names: Vec<&str> = set
        .iter()
        .filter(|kind| !superset.contains(*kind))
        .filter_map(|kind| registry.name_of(kind).ok())
        .collect();
    names.join(", ")
}
