//! The contract every check module implements.
//!
//! A check declares which token kinds it can ever process, which of those
//! it wants by default, and which must always be processed; the dispatch
//! table validates the three-way subset invariant before any file is
//! touched. During a walk the check receives lifecycle callbacks and emits
//! violations through its [`CheckContext`].
//!
//! Checks never see the same instance across two files: the walker builds
//! a fresh instance per file from the registered factory, which removes
//! the whole class of state-leakage bugs between files. Modules that
//! accumulate across files share state explicitly (see
//! [`Statefulness::GlobalStateful`]).

use thiserror::Error;

use crate::context::FileContext;
use crate::tokens::{TokenRegistry, TokenScope};
use crate::tree::NodeRef;
use crate::violation::{Severity, Violation};

/// Declared mutable-state category of a check module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statefulness {
    /// No mutable fields; an instance could serve any number of files.
    Stateless,
    /// Mutable fields scoped to one file.
    FileStateful,
    /// Mutable fields spanning the whole run, shared across per-file
    /// instances behind explicit synchronization (`Arc<Mutex<_>>`).
    GlobalStateful,
}

impl std::fmt::Display for Statefulness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stateless => write!(f, "stateless"),
            Self::FileStateful => write!(f, "file-stateful"),
            Self::GlobalStateful => write!(f, "global-stateful"),
        }
    }
}

/// Fatal internal error raised by a check during a walk.
///
/// Surfacing one aborts analysis of the current file only; it is reported
/// as a tool defect, distinct from ordinary violations.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CheckFailure(String);

impl CheckFailure {
    /// Creates a failure with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// One independent rule module.
///
/// Lifecycle per file: `begin_tree`, then `visit_token` pre-order and
/// `leave_token` post-order for every node of a kind the module is
/// registered for, then `finish_tree`. All hooks default to no-ops so a
/// check only implements what it needs.
pub trait Check: Send {
    /// Kebab-case name, also the configuration key (e.g. `"empty-block"`).
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str {
        ""
    }

    /// Mutable-state category of this module.
    fn statefulness(&self) -> Statefulness;

    /// Severity used when configuration does not override it.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether the dispatched tree must retain comment nodes for this
    /// module.
    fn comment_nodes_required(&self) -> bool {
        false
    }

    /// Every kind this module can meaningfully process.
    fn acceptable_tokens(&self, registry: &TokenRegistry) -> TokenScope;

    /// Kinds processed when configuration gives no explicit token list.
    /// Must be a subset of the acceptable kinds.
    fn default_tokens(&self, registry: &TokenRegistry) -> TokenScope;

    /// Kinds that are always processed regardless of configuration.
    /// Must be a subset of the default kinds.
    fn required_tokens(&self, _registry: &TokenRegistry) -> TokenScope {
        TokenScope::none()
    }

    /// Called once per file before any node is visited.
    ///
    /// # Errors
    ///
    /// A [`CheckFailure`] aborts analysis of the current file.
    fn begin_tree(
        &mut self,
        _root: NodeRef<'_>,
        _ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        Ok(())
    }

    /// Called for each registered node before its children are walked.
    ///
    /// # Errors
    ///
    /// A [`CheckFailure`] aborts analysis of the current file.
    fn visit_token(
        &mut self,
        _node: NodeRef<'_>,
        _ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        Ok(())
    }

    /// Called for each registered node after all its children were walked.
    ///
    /// # Errors
    ///
    /// A [`CheckFailure`] aborts analysis of the current file.
    fn leave_token(
        &mut self,
        _node: NodeRef<'_>,
        _ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        Ok(())
    }

    /// Called once per file after the whole tree was walked.
    ///
    /// # Errors
    ///
    /// A [`CheckFailure`] aborts analysis of the current file.
    fn finish_tree(
        &mut self,
        _root: NodeRef<'_>,
        _ctx: &mut CheckContext<'_, '_>,
    ) -> Result<(), CheckFailure> {
        Ok(())
    }
}

/// Constructor for per-file check instances.
///
/// A global-stateful module's factory captures the shared accumulator and
/// clones it into every instance, which keeps the synchronization visible
/// at registration.
pub type CheckFactory = Box<dyn Fn() -> Box<dyn Check> + Send + Sync>;

/// Emission handle passed to every lifecycle hook.
///
/// Carries the identity and effective severity of the module being
/// notified, so reported violations are attributed without the check
/// repeating its own name.
pub struct CheckContext<'a, 'f> {
    file: &'a FileContext<'f>,
    check_name: &'static str,
    severity: Severity,
    violations: &'a mut Vec<Violation>,
}

impl<'a, 'f> CheckContext<'a, 'f> {
    pub(crate) fn new(
        file: &'a FileContext<'f>,
        check_name: &'static str,
        severity: Severity,
        violations: &'a mut Vec<Violation>,
    ) -> Self {
        Self {
            file,
            check_name,
            severity,
            violations,
        }
    }

    /// The file being analyzed.
    #[must_use]
    pub fn file(&self) -> &'a FileContext<'f> {
        self.file
    }

    /// Reports a violation at a node's position.
    pub fn report(&mut self, node: NodeRef<'_>, key: &str, message: impl Into<String>) {
        self.report_at(node.line(), node.column(), key, message);
    }

    /// Reports a violation at an explicit position (1-based line, 0-based
    /// column as stored on nodes; the recorded column is 1-based).
    pub fn report_at(
        &mut self,
        line: usize,
        column: usize,
        key: &str,
        message: impl Into<String>,
    ) {
        self.violations.push(Violation::new(
            self.check_name,
            key,
            self.severity,
            self.file.path(),
            line,
            column + 1,
            message,
        ));
    }
}
