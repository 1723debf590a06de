//! Arena-backed syntax tree with parent back-references
//!
//! Nodes are addressed by [`NodeId`]; parent and child links are indices into
//! the arena, so upward traversal is O(1) without reference cycles.

use crate::source::{SourceBuffer, Span};

/// Index of a node inside its [`SourceTree`]
pub type NodeId = usize;

/// Bracket or quote delimiters of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delimited {
    pub open: Option<Span>,
    pub close: Option<Span>,
}

/// A quoted string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrLiteral {
    /// Opening delimiter token (`'`, `"`, `%q(`, ...)
    pub open: Span,
    /// Closing delimiter token
    pub close: Span,
    /// Everything between the delimiters
    pub content: Span,
}

/// A method call, with its argument list flattened into the call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodCall {
    pub name: String,
    pub receiver: Option<NodeId>,
    pub arguments: Vec<NodeId>,
    pub block: Option<NodeId>,
    /// `.` or `&.` between receiver and method name
    pub dot: Option<Span>,
    pub selector: Option<Span>,
    pub open_paren: Option<Span>,
    pub close_paren: Option<Span>,
}

/// Closed set of node kinds the rewriter distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    Array(Delimited),
    Str(StrLiteral),
    /// A string with live `#{}` interpolation
    InterpolatedStr(StrLiteral),
    MethodCall(MethodCall),
    Block,
    Comment,
    /// Any other grammar node, tagged with its grammar name
    Other(&'static str),
}

impl NodeKind {
    pub fn is_array(&self) -> bool {
        matches!(self, NodeKind::Array(_))
    }

    pub fn as_call(&self) -> Option<&MethodCall> {
        match self {
            NodeKind::MethodCall(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_str_literal(&self) -> Option<&StrLiteral> {
        match self {
            NodeKind::Str(literal) | NodeKind::InterpolatedStr(literal) => Some(literal),
            _ => None,
        }
    }
}

/// A node in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Position among the parent's children, 0-based
    pub sibling_index: usize,
}

/// A parsed source file: the buffer plus the node arena over it
#[derive(Debug, Clone)]
pub struct SourceTree {
    source: SourceBuffer,
    nodes: Vec<SourceNode>,
    root: NodeId,
}

impl SourceTree {
    /// Create an empty tree over `source`; nodes are added with [`SourceTree::push`]
    pub fn new(source: SourceBuffer) -> Self {
        Self {
            source,
            nodes: Vec::new(),
            root: 0,
        }
    }

    /// Add a node as the last child of `parent` (or as the root) and return its id
    pub fn push(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        let sibling_index = match parent {
            Some(parent_id) => {
                let parent_node = &mut self.nodes[parent_id];
                debug_assert!(parent_node.span.contains(span), "child outside parent span");
                parent_node.children.push(id);
                parent_node.children.len() - 1
            }
            None => {
                self.root = id;
                0
            }
        };
        self.nodes.push(SourceNode {
            kind,
            span,
            parent,
            children: Vec::new(),
            sibling_index,
        });
        id
    }

    /// Replace the kind of an already pushed node (used once its children are known)
    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id].kind = kind;
    }

    pub fn source(&self) -> &SourceBuffer {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SourceNode {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn sibling_index(&self, id: NodeId) -> usize {
        self.nodes[id].sibling_index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Source text of a node
    pub fn text(&self, id: NodeId) -> &str {
        self.source.slice(self.span(id))
    }

    /// Iterator over the ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// All node ids in pre-order (parents before children, source order)
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        if self.nodes.is_empty() {
            return order;
        }
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Method call whose receiver is `id`
    pub fn receiving_call(&self, id: NodeId) -> Option<(NodeId, &MethodCall)> {
        let parent = self.parent(id)?;
        let call = self.kind(parent).as_call()?;
        (call.receiver == Some(id)).then_some((parent, call))
    }

    /// Method call that takes `id` as one of its arguments, with the argument position
    pub fn enclosing_call(&self, id: NodeId) -> Option<(NodeId, &MethodCall, usize)> {
        let parent = self.parent(id)?;
        let call = self.kind(parent).as_call()?;
        let position = call.arguments.iter().position(|&arg| arg == id)?;
        Some((parent, call, position))
    }
}
