//! Arena-backed syntax tree.
//!
//! Nodes live in a flat arena and refer to each other by index: children as
//! an ordered `Vec<NodeId>`, parent and siblings as plain `Option<NodeId>`.
//! The back-references are non-owning, so the tree is trivially acyclic and
//! there is no lifetime juggling for upward traversal.
//!
//! A tree is immutable once [`TreeBuilder::finish`] has run; checks only
//! ever see read-only [`NodeRef`] handles.

use thiserror::Error;

use crate::tokens::TokenKind;

/// Index of a node within its [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct NodeData {
    kind: TokenKind,
    /// Literal lexeme for leaf tokens, empty for interior nodes.
    text: String,
    /// 1-based line of the node's first character.
    line: usize,
    /// 0-based column of the node's first character.
    column: usize,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The parse collaborator failed to produce a valid tree for a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at {line}:{column}: {message}")]
pub struct SyntaxError {
    /// 1-based line of the offending input.
    pub line: usize,
    /// 0-based column of the offending input.
    pub column: usize,
    /// Parser-provided description.
    pub message: String,
}

impl SyntaxError {
    /// Creates a syntax error at the given position.
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// One file's parsed syntax tree. Always has a root node.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: NodeId(0),
        }
    }

    /// Handle for an id previously obtained from this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        debug_assert!(id.index() < self.nodes.len());
        NodeRef { tree: self, id }
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// The only construction path for a [`SyntaxTree`].
///
/// The parser creates the root up front and appends children left to right;
/// sibling and parent links are maintained as nodes are added.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    /// Starts a tree with its root node.
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            nodes: vec![NodeData {
                kind,
                text: text.into(),
                line,
                column,
                parent: None,
                prev_sibling: None,
                next_sibling: None,
                children: Vec::new(),
            }],
        }
    }

    /// Id of the root node.
    #[must_use]
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a child to `parent`, after any existing children.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: TokenKind,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let prev = self.nodes[parent.index()].children.last().copied();
        if let Some(prev) = prev {
            self.nodes[prev.index()].next_sibling = Some(id);
        }
        self.nodes.push(NodeData {
            kind,
            text: text.into(),
            line,
            column,
            parent: Some(parent),
            prev_sibling: prev,
            next_sibling: None,
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Seals the tree.
    #[must_use]
    pub fn finish(self) -> SyntaxTree {
        SyntaxTree { nodes: self.nodes }
    }
}

/// Read-only handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// This node's arena id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Token kind of the node.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.tree.data(self.id).kind
    }

    /// Literal lexeme (empty for interior nodes).
    #[must_use]
    pub fn text(&self) -> &'a str {
        &self.tree.data(self.id).text
    }

    /// 1-based line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.tree.data(self.id).line
    }

    /// 0-based column.
    #[must_use]
    pub fn column(&self) -> usize {
        self.tree.data(self.id).column
    }

    /// Owning parent, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree.data(self.id).parent.map(|id| self.tree.node(id))
    }

    /// Previous sibling under the same parent.
    #[must_use]
    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        self.tree
            .data(self.id)
            .prev_sibling
            .map(|id| self.tree.node(id))
    }

    /// Next sibling under the same parent.
    #[must_use]
    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.tree
            .data(self.id)
            .next_sibling
            .map(|id| self.tree.node(id))
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.tree.data(self.id).children.len()
    }

    /// Child at `index`, left to right.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.tree
            .data(self.id)
            .children
            .get(index)
            .map(|id| self.tree.node(*id))
    }

    /// First child, if any.
    #[must_use]
    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.child(0)
    }

    /// Children, left to right.
    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + '_ {
        let tree = self.tree;
        self.tree
            .data(self.id)
            .children
            .iter()
            .map(move |id| tree.node(*id))
    }

    /// First child of the given kind.
    #[must_use]
    pub fn find_child(&self, kind: TokenKind) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        std::iter::successors(self.parent(), NodeRef::parent)
    }

    /// All descendants in depth-first pre-order, excluding this node.
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        let mut stack: Vec<NodeId> = self
            .tree
            .data(self.id)
            .children
            .iter()
            .rev()
            .copied()
            .collect();
        let tree = self.tree;
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(tree.data(id).children.iter().rev());
            Some(tree.node(id))
        })
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("line", &self.line())
            .field("column", &self.column())
            .finish()
    }
}
