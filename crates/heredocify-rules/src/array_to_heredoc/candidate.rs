//! Context of one array literal: its string elements and the call chain around it

use heredocify_core::{Delimited, MethodCall, NodeId, NodeKind, SourceBuffer, SourceTree, Span, StrLiteral};

use crate::options::RewriteOptions;

/// Quote style of a string element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

/// A quoted string element of the array
#[derive(Debug, Clone, Copy)]
pub struct Element {
    pub id: NodeId,
    pub span: Span,
    pub literal: StrLiteral,
    pub quote: Quote,
    /// Live `#{}` interpolation
    pub interpolated: bool,
}

impl Element {
    fn from_node(tree: &SourceTree, id: NodeId) -> Option<Self> {
        let (literal, interpolated) = match tree.kind(id) {
            NodeKind::Str(literal) => (*literal, false),
            NodeKind::InterpolatedStr(literal) => (*literal, true),
            _ => return None,
        };
        let quote = match tree.source().slice(literal.open) {
            "'" => Quote::Single,
            "\"" => Quote::Double,
            _ => return None,
        };
        Some(Self {
            id,
            span: tree.span(id),
            literal,
            quote,
            interpolated,
        })
    }

    /// Text between the quotes
    pub fn content<'s>(&self, source: &'s SourceBuffer) -> &'s str {
        source.slice(self.literal.content)
    }

    pub fn is_empty(&self) -> bool {
        self.literal.content.is_empty()
    }
}

/// The call taking the chain root as an argument
#[derive(Debug, Clone, Copy)]
pub struct Wrapper<'t> {
    pub id: NodeId,
    pub call: &'t MethodCall,
    /// Argument position of the chain root
    pub position: usize,
}

/// One array node under consideration
pub struct Candidate<'t> {
    pub tree: &'t SourceTree,
    pub options: &'t RewriteOptions,
    pub array: NodeId,
    pub delimiters: Delimited,
    /// String elements; shorter than the child list when a child is not a quoted string
    pub elements: Vec<Element>,
    child_count: usize,
    chain_root: NodeId,
    wrapper: Option<Wrapper<'t>>,
}

impl<'t> Candidate<'t> {
    /// Build the context for `array`; returns `None` when the node is not an array
    pub fn new(tree: &'t SourceTree, array: NodeId, options: &'t RewriteOptions) -> Option<Self> {
        let NodeKind::Array(delimiters) = tree.kind(array) else {
            return None;
        };

        let children = tree.children(array);
        let elements = children
            .iter()
            .filter_map(|&child| Element::from_node(tree, child))
            .collect();
        let chain_root = resolve_chain_root(tree, array);
        let wrapper = tree
            .enclosing_call(chain_root)
            .map(|(id, call, position)| Wrapper { id, call, position });

        Some(Self {
            tree,
            options,
            array,
            delimiters: *delimiters,
            elements,
            child_count: children.len(),
            chain_root,
            wrapper,
        })
    }

    pub fn source(&self) -> &'t SourceBuffer {
        self.tree.source()
    }

    pub fn span(&self) -> Span {
        self.tree.span(self.array)
    }

    /// Whether every child of the array is a quoted string
    pub fn all_children_are_strings(&self) -> bool {
        self.elements.len() == self.child_count
    }

    pub fn chain_root(&self) -> NodeId {
        self.chain_root
    }

    pub fn is_chained(&self) -> bool {
        self.chain_root != self.array
    }

    /// The chain root as a call, when the array is a receiver
    pub fn chain_call(&self) -> Option<&'t MethodCall> {
        if self.is_chained() {
            self.tree.kind(self.chain_root).as_call()
        } else {
            None
        }
    }

    /// `[...].join(sep)`: the chain collapses into the heredoc itself
    pub fn is_join_call(&self) -> bool {
        self.chain_call()
            .is_some_and(|call| call.name == "join" && !call.arguments.is_empty())
    }

    pub fn wrapper(&self) -> Option<Wrapper<'t>> {
        self.wrapper
    }

    /// The wrapper call closes on the line where the chain root ends
    pub fn emacs_wrap_style(&self) -> bool {
        self.wrapper.is_some_and(|wrapper| {
            let source = self.source();
            source.line_of(self.tree.span(wrapper.id).end)
                == source.line_of(self.tree.span(self.chain_root).end)
        })
    }

    /// Wrapper call, only when it shares its closing line with the chain root
    pub fn wrapping_on_same_line(&self) -> Option<Wrapper<'t>> {
        self.wrapper.filter(|_| self.emacs_wrap_style())
    }

    /// Argument immediately before the chain root in the wrapper call
    pub fn preceding_argument(&self) -> Option<NodeId> {
        let wrapper = self.wrapper?;
        let index = wrapper.position.checked_sub(1)?;
        wrapper.call.arguments.get(index).copied()
    }

    pub fn first_element(&self) -> Option<&Element> {
        self.elements.first()
    }

    pub fn last_element(&self) -> Option<&Element> {
        self.elements.last()
    }
}

/// Walk up while the node is a call receiver, stopping at a call that carries a block
fn resolve_chain_root(tree: &SourceTree, array: NodeId) -> NodeId {
    let mut current = array;
    loop {
        if tree.kind(current).as_call().is_some_and(|call| call.block.is_some()) {
            return current;
        }
        match tree.receiving_call(current) {
            Some((call_id, _)) => current = call_id,
            None => return current,
        }
    }
}
