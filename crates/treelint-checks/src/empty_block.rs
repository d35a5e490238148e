//! Check that flags blocks containing no statements.
//!
//! # Configuration
//!
//! - `tokens`: block-like kinds to inspect (default: `block`). Acceptable
//!   kinds also cover class, interface, enum, constructor, and switch
//!   bodies.
//!
//! # Suppression
//!
//! - `// treelint: allow(empty-block)` comment on or above the line

use treelint_core::{
    Check, CheckContext, CheckFailure, NodeRef, Statefulness, TokenRegistry, TokenScope,
};

use crate::util::{kind_name, scope};

/// Check name for empty-block.
pub const NAME: &str = "empty-block";

const KEY: &str = "block.empty";

const ACCEPTABLE: &[&str] = &[
    "block",
    "class_body",
    "interface_body",
    "enum_body",
    "constructor_body",
    "switch_block",
];

/// Flags block constructs whose braces enclose nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBlock;

impl EmptyBlock {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for EmptyBlock {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags blocks that contain no statements"
    }

    fn statefulness(&self) -> Statefulness {
        Statefulness::Stateless
    }

    fn acceptable_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, ACCEPTABLE)
    }

    fn default_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, &["block"])
    }

    fn visit_token(
        &mut self,
        node: NodeRef<'_>,
        ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        let registry = ctx.file().registry();
        let has_content = node
            .children()
            .any(|child| !matches!(kind_name(registry, child.kind()), "{" | "}"));
        if !has_content {
            ctx.report(node, KEY, "block contains no statements");
        }
        Ok(())
    }
}
