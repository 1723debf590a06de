//! Tree visitor for traversing a [`SourceTree`]
//!
//! Provides a trait-based visitor pattern that rules can implement.
//! Default implementations handle traversal; rules override specific methods.

use crate::tree::{NodeId, NodeKind, SourceTree};

/// Trait for visiting source tree nodes
///
/// Default implementations traverse child nodes. Override specific methods
/// to perform actions at those nodes.
pub trait Visitor {
    /// Called for each node before its children. Return `true` to continue
    /// traversal into children.
    fn visit_node(&mut self, tree: &SourceTree, id: NodeId) -> bool {
        match tree.kind(id) {
            NodeKind::Array(_) => self.visit_array(tree, id),
            NodeKind::MethodCall(_) => self.visit_call(tree, id),
            _ => true,
        }
    }

    /// Called for each array literal. Return `true` to continue into its elements.
    fn visit_array(&mut self, _tree: &SourceTree, _id: NodeId) -> bool {
        true
    }

    /// Called for each method call. Return `true` to continue into its children.
    fn visit_call(&mut self, _tree: &SourceTree, _id: NodeId) -> bool {
        true
    }

    /// Traverse a node and its descendants top-down, in source order
    fn traverse(&mut self, tree: &SourceTree, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.visit_node(tree, current) {
                stack.extend(tree.children(current).iter().rev().copied());
            }
        }
    }
}

/// Helper function to run a visitor over a whole tree
pub fn visit<V: Visitor>(visitor: &mut V, tree: &SourceTree) {
    if !tree.is_empty() {
        visitor.traverse(tree, tree.root());
    }
}
