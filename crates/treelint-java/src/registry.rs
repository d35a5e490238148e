//! The process-wide token registry for the Java grammar.

use once_cell::sync::Lazy;
use tree_sitter::Language;

use treelint_core::TokenRegistry;

static REGISTRY: Lazy<TokenRegistry> = Lazy::new(|| build_registry(&language()));

/// The tree-sitter Java language.
#[must_use]
pub fn language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

/// The registry of Java node kinds.
///
/// Built once on first use and read-only afterwards. Canonical token names
/// are the grammar's node kind names: named constructs like
/// `"if_statement"` or `"class_body"`, and literal tokens like `"{"`.
#[must_use]
pub fn registry() -> &'static TokenRegistry {
    &REGISTRY
}

/// Collects the grammar's visible node kinds in kind-id order.
///
/// Grammars may list the same kind name under several internal ids; the
/// registry keeps one entry per name.
fn build_registry(language: &Language) -> TokenRegistry {
    let count = language.node_kind_count();
    let mut names = Vec::with_capacity(count);
    for id in 0..count {
        let id = id as u16;
        if !language.node_kind_is_visible(id) {
            continue;
        }
        if let Some(kind) = language.node_kind_for_id(id) {
            names.push(kind);
        }
    }
    TokenRegistry::new(names)
}
