//! # treelint-java
//!
//! Tree-sitter based Java front end for the treelint engine.
//!
//! This crate is the parser collaborator: it owns the grammar, builds the
//! process-wide [`registry`] of token kinds from it, and converts parsed
//! files into the engine's arena [`SyntaxTree`](treelint_core::SyntaxTree).
//! The engine itself is parser-agnostic; nothing in `treelint-core` knows
//! Java exists.
//!
//! Comment nodes are elided from the dispatched tree unless the caller
//! asks for them ([`ParseOptions::include_comments`]), which the
//! orchestration layer does exactly when an active check declares
//! `comment_nodes_required`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod parser;
mod registry;

pub use parser::{parse, ParseOptions};
pub use registry::{language, registry};
