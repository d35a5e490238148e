//! Small shared helpers for check implementations.

use treelint_core::{TokenRegistry, TokenScope};

/// Scope over the named kinds, skipping names the grammar lacks.
///
/// Checks declare their token interest with grammar kind names; a name the
/// registry does not know simply contributes nothing, so one check module
/// can serve grammar variants with differing vocabularies.
pub(crate) fn scope(registry: &TokenRegistry, names: &[&str]) -> TokenScope {
    TokenScope::Tokens(
        names
            .iter()
            .filter_map(|name| registry.id_of(name).ok())
            .collect(),
    )
}

/// Kind name of a node, or `""` for an id outside the registry.
pub(crate) fn kind_name<'r>(
    registry: &'r TokenRegistry,
    kind: treelint_core::TokenKind,
) -> &'r str {
    registry.name_of(kind).unwrap_or("")
}
