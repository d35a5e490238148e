//! Converts Java source text into the engine's arena tree.

use tree_sitter::{Node, Parser};

use treelint_core::{SyntaxError, SyntaxTree, TokenKind, TokenRegistry, TreeBuilder};

use crate::registry::{language, registry};

/// Knobs for one parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Keep comment nodes in the dispatched tree. Off by default; the
    /// orchestration layer turns it on when any active check declares
    /// `comment_nodes_required`. Comments stay reachable through the file
    /// text either way.
    pub include_comments: bool,
}

impl ParseOptions {
    /// Options with comment nodes retained.
    #[must_use]
    pub fn with_comments() -> Self {
        Self {
            include_comments: true,
        }
    }
}

/// Parses one file's text into a [`SyntaxTree`] over [`registry`].
///
/// # Errors
///
/// Returns [`SyntaxError`] positioned at the first invalid or missing
/// construct when the text does not parse as Java.
pub fn parse(source: &str, options: &ParseOptions) -> Result<SyntaxTree, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .map_err(|e| SyntaxError::new(1, 0, format!("failed to load Java grammar: {e}")))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SyntaxError::new(1, 0, "parser produced no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(first_error(root));
    }

    let registry = registry();
    let src = source.as_bytes();
    let mut builder = TreeBuilder::new(
        kind_of(registry, root)?,
        leaf_text(root, src),
        root.start_position().row + 1,
        root.start_position().column,
    );

    let mut stack = vec![(root, builder.root_id())];
    while let Some((node, arena_id)) = stack.pop() {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if !options.include_comments && is_comment(child) {
                continue;
            }
            let child_id = builder.add_child(
                arena_id,
                kind_of(registry, child)?,
                leaf_text(child, src),
                child.start_position().row + 1,
                child.start_position().column,
            );
            if child.child_count() > 0 {
                stack.push((child, child_id));
            }
        }
    }

    Ok(builder.finish())
}

fn is_comment(node: Node<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

/// Lexeme for leaf tokens; interior nodes carry no text of their own.
fn leaf_text<'a>(node: Node<'_>, src: &'a [u8]) -> &'a str {
    if node.child_count() == 0 {
        node.utf8_text(src).unwrap_or("")
    } else {
        ""
    }
}

fn kind_of(registry: &TokenRegistry, node: Node<'_>) -> Result<TokenKind, SyntaxError> {
    registry.id_of(node.kind()).map_err(|_| {
        SyntaxError::new(
            node.start_position().row + 1,
            node.start_position().column,
            format!("unrecognized node kind {:?}", node.kind()),
        )
    })
}

/// Position and description of the leftmost invalid construct.
fn first_error(root: Node<'_>) -> SyntaxError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() {
            return SyntaxError::new(
                node.start_position().row + 1,
                node.start_position().column,
                "invalid syntax",
            );
        }
        if node.is_missing() {
            return SyntaxError::new(
                node.start_position().row + 1,
                node.start_position().column,
                format!("missing {:?}", node.kind()),
            );
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        // Reverse push so the leftmost erroneous child is found first.
        for child in children.into_iter().rev() {
            if child.has_error() {
                stack.push(child);
            }
        }
    }
    SyntaxError::new(
        root.start_position().row + 1,
        root.start_position().column,
        "invalid syntax",
    )
}
