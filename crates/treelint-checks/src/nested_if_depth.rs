//! Check that restricts how deeply `if` statements nest.
//!
//! An `else if` continues the chain at the same depth; only an `if` inside
//! another statement's body counts as one level deeper.
//!
//! # Configuration
//!
//! - `max`: maximum allowed nesting depth (default: 1)

use treelint_core::{
    Check, CheckContext, CheckFailure, NodeRef, Statefulness, TokenRegistry, TokenScope,
};

use crate::util::{kind_name, scope};

/// Check name for nested-if-depth.
pub const NAME: &str = "nested-if-depth";

const KEY: &str = "if.nesting";

/// Flags `if` statements nested deeper than a configured maximum.
#[derive(Debug, Clone)]
pub struct NestedIfDepth {
    max: usize,
    depth: usize,
}

impl Default for NestedIfDepth {
    fn default() -> Self {
        Self::new()
    }
}

impl NestedIfDepth {
    /// Creates the check with the default maximum of 1.
    #[must_use]
    pub fn new() -> Self {
        Self { max: 1, depth: 0 }
    }

    /// Sets the maximum allowed nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    /// An `if` directly behind an `else` keyword continues the chain.
    fn is_else_if(node: NodeRef<'_>, registry: &TokenRegistry) -> bool {
        node.prev_sibling()
            .is_some_and(|sibling| kind_name(registry, sibling.kind()) == "else")
    }
}

impl Check for NestedIfDepth {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Restricts nesting depth of if statements"
    }

    fn statefulness(&self) -> Statefulness {
        Statefulness::FileStateful
    }

    fn acceptable_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, &["if_statement"])
    }

    fn default_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, &["if_statement"])
    }

    fn required_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, &["if_statement"])
    }

    fn begin_tree(
        &mut self,
        _root: NodeRef<'_>,
        _ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        self.depth = 0;
        Ok(())
    }

    fn visit_token(
        &mut self,
        node: NodeRef<'_>,
        ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        if Self::is_else_if(node, ctx.file().registry()) {
            return Ok(());
        }
        if self.depth > self.max {
            ctx.report(
                node,
                KEY,
                format!(
                    "nested if-else depth is {} (max allowed is {})",
                    self.depth, self.max
                ),
            );
        }
        self.depth += 1;
        Ok(())
    }

    fn leave_token(
        &mut self,
        node: NodeRef<'_>,
        ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        if !Self::is_else_if(node, ctx.file().registry()) {
            self.depth = self.depth.saturating_sub(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use treelint_core::{walk, CheckConfig, DispatchTable, FileContext, Violation};
    use treelint_java::ParseOptions;

    fn run(source: &str, max: usize) -> Vec<Violation> {
        let registry = treelint_java::registry();
        let config = CheckConfig::new(Box::new(move || {
            Box::new(NestedIfDepth::new().max_depth(max))
        }));
        let table = DispatchTable::build(registry, vec![config]).unwrap();
        let tree = treelint_java::parse(source, &ParseOptions::default()).unwrap();
        let ctx = FileContext::new(Path::new("Test.java"), source, registry);
        walk(&tree, &table, &ctx).unwrap()
    }

    fn nested(levels: usize) -> String {
        let mut body = "return;".to_string();
        for _ in 0..levels {
            body = format!("if (x > 0) {{ {body} }}");
        }
        format!("class A {{ void f(int x) {{ {body} }} }}")
    }

    #[test]
    fn shallow_nesting_is_accepted() {
        assert!(run(&nested(2), 1).is_empty());
    }

    #[test]
    fn deep_nesting_is_flagged() {
        let violations = run(&nested(3), 1);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].check, NAME);
        assert!(violations[0].message.contains("depth is 2"));
    }

    #[test]
    fn every_level_past_the_maximum_is_flagged() {
        let violations = run(&nested(4), 1);
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn raising_the_maximum_accepts_deeper_chains() {
        assert!(run(&nested(3), 2).is_empty());
    }

    #[test]
    fn else_if_chains_stay_flat() {
        let source = "\
class A {
    void f(int x) {
        if (x == 1) {
            return;
        } else if (x == 2) {
            return;
        } else if (x == 3) {
            return;
        }
    }
}
";
        assert!(run(source, 1).is_empty());
    }

    #[test]
    fn if_inside_else_body_still_counts() {
        let source = "\
class A {
    void f(int x) {
        if (x == 1) {
            return;
        } else {
            if (x == 2) {
                if (x == 3) {
                    if (x == 4) {
                        return;
                    }
                }
            }
        }
    }
}
";
        let violations = run(source, 1);
        let lines: Vec<usize> = violations.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![7, 8]);
    }
}
