//! Check that caps the number of methods declared in a type body.
//!
//! The tally is kept per enclosing body, so methods of a nested or
//! anonymous class never count against the outer type.
//!
//! # Configuration
//!
//! - `max`: maximum number of methods per type body (default: 100)
//! - `tokens`: add `constructor_declaration` to count constructors too,
//!   or `interface_body`/`enum_body` to cover those types

use treelint_core::{
    Check, CheckContext, CheckFailure, NodeRef, Statefulness, TokenRegistry, TokenScope,
};

use crate::util::{kind_name, scope};

/// Check name for method-count.
pub const NAME: &str = "method-count";

const KEY: &str = "methods.count";

const ACCEPTABLE: &[&str] = &[
    "class_body",
    "interface_body",
    "enum_body",
    "method_declaration",
    "constructor_declaration",
];

/// Flags type bodies declaring more methods than a configured maximum.
#[derive(Debug, Clone)]
pub struct MethodCount {
    max: usize,
    scopes: Vec<usize>,
}

impl Default for MethodCount {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodCount {
    /// Creates the check with the default maximum of 100.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max: 100,
            scopes: Vec::new(),
        }
    }

    /// Sets the maximum number of methods per type body.
    #[must_use]
    pub fn max_methods(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    fn is_body(kind: &str) -> bool {
        matches!(kind, "class_body" | "interface_body" | "enum_body")
    }

    fn is_member(kind: &str) -> bool {
        matches!(kind, "method_declaration" | "constructor_declaration")
    }
}

impl Check for MethodCount {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Caps the number of methods declared per type"
    }

    fn statefulness(&self) -> Statefulness {
        Statefulness::FileStateful
    }

    fn acceptable_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, ACCEPTABLE)
    }

    fn default_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, &["class_body", "method_declaration"])
    }

    fn required_tokens(&self, registry: &TokenRegistry) -> TokenScope {
        scope(registry, &["class_body"])
    }

    fn begin_tree(
        &mut self,
        _root: NodeRef<'_>,
        _ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        self.scopes.clear();
        Ok(())
    }

    fn visit_token(
        &mut self,
        node: NodeRef<'_>,
        ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        let kind = kind_name(ctx.file().registry(), node.kind());
        if Self::is_body(kind) {
            self.scopes.push(0);
        } else if Self::is_member(kind) {
            if let Some(count) = self.scopes.last_mut() {
                *count += 1;
            }
        }
        Ok(())
    }

    fn leave_token(
        &mut self,
        node: NodeRef<'_>,
        ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        let kind = kind_name(ctx.file().registry(), node.kind());
        if !Self::is_body(kind) {
            return Ok(());
        }
        let Some(count) = self.scopes.pop() else {
            return Err(CheckFailure::new("left a type body that was never entered"));
        };
        if count > self.max {
            // Attribute the finding to the type declaration, not its brace.
            let target = node.parent().unwrap_or(node);
            ctx.report(
                target,
                KEY,
                format!("number of methods is {count} (max allowed is {})", self.max),
            );
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

    fn run(source: &str, config: CheckConfig) -> Vec<Violation> {
        let registry = treelint_java::registry();
        let table = DispatchTable::build(registry, vec![config]).unwrap();
        let tree = treelint_java::parse(source, &ParseOptions::default()).unwrap();
        let ctx = FileContext::new(Path::new("Test.java"), source, registry);
        walk(&tree, &table, &ctx).unwrap()
    }

    fn config(max: usize) -> CheckConfig {
        CheckConfig::new(Box::new(move || Box::new(MethodCount::new().max_methods(max))))
    }

    #[test]
    fn counts_methods_against_the_maximum() {
        let source = "class A { void a() {} void b() {} void c() {} }";
        let violations = run(source, config(2));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("number of methods is 3"));
        assert_eq!(violations[0].line, 1);
    }

    #[test]
    fn at_the_maximum_is_accepted() {
        let source = "class A { void a() {} void b() {} }";
        assert!(run(source, config(2)).is_empty());
    }

    #[test]
    fn nested_class_methods_count_separately() {
        let source = "\
class Outer {
    void a() {}
    class Inner {
        void b() {}
        void c() {}
        void d() {}
    }
}
";
        let violations = run(source, config(2));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 3);
    }

    #[test]
    fn constructors_are_not_counted_by_default() {
        let source = "class A { A() {} A(int x) {} void a() {} }";
        assert!(run(source, config(2)).is_empty());
    }

    #[test]
    fn token_override_adds_constructors() {
        let source = "class A { A() {} A(int x) {} void a() {} }";
        let mut config = config(2);
        config.tokens = Some(vec![
            "class_body".to_string(),
            "method_declaration".to_string(),
            "constructor_declaration".to_string(),
        ]);
        let violations = run(source, config);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("number of methods is 3"));
    }
}
