//! The traversal/dispatch pass over one file's tree.

use std::path::PathBuf;

use crate::check::{Check, CheckContext, CheckFailure};
use crate::context::FileContext;
use crate::dispatch::DispatchTable;
use crate::tree::{NodeRef, SyntaxTree};
use crate::violation::Violation;

/// A check module hit an internal defect while analyzing a file.
///
/// This is "the tool broke", not "your code has a style issue": it aborts
/// the walk of the offending file only and is reported separately from
/// ordinary violations.
#[derive(Debug, Clone, thiserror::Error)]
#[error("check `{check}` failed at {file}:{line}:{column}: {message}")]
pub struct AnalysisFailure {
    /// Name of the failing check.
    pub check: String,
    /// File being analyzed when the check failed.
    pub file: PathBuf,
    /// 1-based line of the node being processed.
    pub line: usize,
    /// 1-based column of the node being processed.
    pub column: usize,
    /// The check's own description of the defect.
    pub message: String,
}

impl AnalysisFailure {
    fn new(check: &str, ctx: &FileContext<'_>, node: NodeRef<'_>, failure: &CheckFailure) -> Self {
        Self {
            check: check.to_string(),
            file: ctx.path().to_path_buf(),
            line: node.line(),
            column: node.column() + 1,
            message: failure.to_string(),
        }
    }
}

/// Walks one file's tree, notifying every registered module.
///
/// Per file: fresh module instances are built from the table's factories,
/// `begin_tree` runs for all of them, the tree is traversed depth-first
/// with `visit_token` fired pre-order and `leave_token` post-order in
/// table order, then `finish_tree` runs for all modules. The returned list
/// is sorted by (line, column); the sort is stable, so violations on the
/// same position keep discovery order, which is module-declaration order.
///
/// Two walks over the same tree and table produce identical lists.
///
/// # Errors
///
/// Returns [`AnalysisFailure`] as soon as any hook of any module reports a
/// [`CheckFailure`]; the failure never corrupts results of other files.
pub fn walk(
    tree: &SyntaxTree,
    table: &DispatchTable,
    ctx: &FileContext<'_>,
) -> Result<Vec<Violation>, AnalysisFailure> {
    let mut modules = table.instantiate();
    let mut violations = Vec::new();
    let root = tree.root();

    for (index, module) in modules.iter_mut().enumerate() {
        let slot = table.slot(index);
        let mut check_ctx = CheckContext::new(ctx, slot.name, slot.severity, &mut violations);
        module
            .begin_tree(root, &mut check_ctx)
            .map_err(|e| AnalysisFailure::new(slot.name, ctx, root, &e))?;
    }

    // Iterative depth-first traversal; an explicit stack keeps deeply
    // nested input from exhausting the call stack.
    notify_visit(root, table, &mut modules, ctx, &mut violations)?;
    let mut stack: Vec<(NodeRef<'_>, usize)> = vec![(root, 0)];
    while let Some((node, next_child)) = stack.last_mut() {
        if let Some(child) = node.child(*next_child) {
            *next_child += 1;
            notify_visit(child, table, &mut modules, ctx, &mut violations)?;
            stack.push((child, 0));
        } else {
            let node = *node;
            stack.pop();
            notify_leave(node, table, &mut modules, ctx, &mut violations)?;
        }
    }

    for (index, module) in modules.iter_mut().enumerate() {
        let slot = table.slot(index);
        let mut check_ctx = CheckContext::new(ctx, slot.name, slot.severity, &mut violations);
        module
            .finish_tree(root, &mut check_ctx)
            .map_err(|e| AnalysisFailure::new(slot.name, ctx, root, &e))?;
    }

    violations.sort_by(|a, b| a.line.cmp(&b.line).then(a.column.cmp(&b.column)));
    Ok(violations)
}

fn notify_visit(
    node: NodeRef<'_>,
    table: &DispatchTable,
    modules: &mut [Box<dyn Check>],
    ctx: &FileContext<'_>,
    violations: &mut Vec<Violation>,
) -> Result<(), AnalysisFailure> {
    for &index in table.modules_for(node.kind()) {
        let slot = table.slot(index);
        let mut check_ctx = CheckContext::new(ctx, slot.name, slot.severity, violations);
        modules[index]
            .visit_token(node, &mut check_ctx)
            .map_err(|e| AnalysisFailure::new(slot.name, ctx, node, &e))?;
    }
    Ok(())
}

fn notify_leave(
    node: NodeRef<'_>,
    table: &DispatchTable,
    modules: &mut [Box<dyn Check>],
    ctx: &FileContext<'_>,
    violations: &mut Vec<Violation>,
) -> Result<(), AnalysisFailure> {
    for &index in table.modules_for(node.kind()) {
        let slot = table.slot(index);
        let mut check_ctx = CheckContext::new(ctx, slot.name, slot.severity, violations);
        modules[index]
            .leave_token(node, &mut check_ctx)
            .map_err(|e| AnalysisFailure::new(slot.name, ctx, node, &e))?;
    }
    Ok(())
}
