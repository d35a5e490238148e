//! # treelint-core
//!
//! Token-dispatch tree-walking engine for style analysis.
//!
//! The engine walks one file's syntax tree and notifies every check module
//! registered for the node's token kind, collects the emitted violations,
//! runs them through a suppression filter chain, and caches the final
//! result keyed by content and configuration hashes. It provides:
//!
//! - [`TokenRegistry`] mapping grammar construct names to stable ids
//! - [`SyntaxTree`] / [`NodeRef`] — the arena-backed immutable tree
//! - [`Check`] — the contract every rule module implements
//! - [`DispatchTable`] — token kind → interested modules, built once per
//!   configuration
//! - [`walk`] — the per-file traversal/dispatch pass
//! - [`SuppressionChain`] — post-traversal violation filtering
//! - [`ResultCache`] — skip re-analysis of unchanged files
//!
//! Parsing is a collaborator's job: any front end that produces a
//! [`SyntaxTree`] against a [`TokenRegistry`] can drive the engine.
//!
//! ## Example
//!
//! ```ignore
//! use treelint_core::{walk, DispatchTable, FileContext};
//!
//! let table = DispatchTable::build(registry, check_configs)?;
//! let ctx = FileContext::new(path, &text, registry);
//! let violations = walk(&tree, &table, &ctx)?;
//! let survivors = chain.apply(violations, &ctx);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod check;
mod config;
mod context;
mod dispatch;
mod suppress;
mod tokens;
mod tree;
mod violation;
mod walker;

pub use cache::{content_hash, CacheError, ResultCache};
pub use check::{Check, CheckContext, CheckFactory, CheckFailure, Statefulness};
pub use config::{
    AnalyzerSettings, CheckSettings, ConfigError, EngineConfig, SuppressionEntry,
};
pub use context::FileContext;
pub use dispatch::{CheckConfig, DispatchTable};
pub use suppress::{
    AllowCommentFilter, PathPatternFilter, RegionCommentFilter, SeverityThresholdFilter,
    SuppressionChain, SuppressionFilter,
};
pub use tokens::{TokenKind, TokenRegistry, TokenScope, TokenSet, UnknownToken};
pub use tree::{NodeId, NodeRef, SyntaxError, SyntaxTree, TreeBuilder};
pub use violation::{Severity, Violation, ViolationDiagnostic};
pub use walker::{walk, AnalysisFailure};
