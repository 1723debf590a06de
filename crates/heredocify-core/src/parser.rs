//! Lowering of tree-sitter Ruby syntax trees into a [`SourceTree`] arena
//!
//! Only the shapes the rewriter reasons about get dedicated kinds: arrays,
//! quoted strings, method calls (with the argument list flattened into the
//! call), blocks and comments. Everything else keeps its grammar name.

use thiserror::Error;
use tree_sitter::{Node, Parser};

use crate::source::{SourceBuffer, Span};
use crate::tree::{Delimited, MethodCall, NodeId, NodeKind, SourceTree, StrLiteral};

/// Errors that can occur while parsing Ruby source
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to load Ruby grammar: {0}")]
    Language(String),

    #[error("Parser produced no syntax tree")]
    NoTree,

    #[error("Syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}

/// Parse Ruby source into a [`SourceTree`]
///
/// Sources with syntax errors are rejected rather than partially lowered.
pub fn parse_ruby(source: &str) -> Result<SourceTree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_ruby::LANGUAGE.into())
        .map_err(|e| ParseError::Language(e.to_string()))?;
    let syntax_tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
    let root = syntax_tree.root_node();

    if root.has_error() {
        let error = first_error(root).unwrap_or(root);
        let position = error.start_position();
        return Err(ParseError::Syntax {
            line: position.row + 1,
            column: position.column + 1,
        });
    }

    let mut lowering = Lowering {
        tree: SourceTree::new(SourceBuffer::new(source)),
    };
    lowering.lower(root, None);
    tracing::trace!(nodes = lowering.tree.len(), "lowered syntax tree");
    Ok(lowering.tree)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

fn span_of(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

struct Lowering {
    tree: SourceTree,
}

impl Lowering {
    fn lower(&mut self, node: Node<'_>, parent: Option<NodeId>) -> NodeId {
        match node.kind() {
            "program" => {
                let id = self.tree.push(NodeKind::Program, span_of(node), parent);
                self.lower_named_children(node, id);
                id
            }
            "array" => self.lower_array(node, parent),
            "string" => self.lower_string(node, parent),
            "call" => self.lower_call(node, parent),
            "element_reference" => self.lower_element_reference(node, parent),
            "block" | "do_block" => {
                let id = self.tree.push(NodeKind::Block, span_of(node), parent);
                self.lower_named_children(node, id);
                id
            }
            "comment" => self.tree.push(NodeKind::Comment, span_of(node), parent),
            kind => {
                let id = self.tree.push(NodeKind::Other(kind), span_of(node), parent);
                self.lower_named_children(node, id);
                id
            }
        }
    }

    fn lower_named_children(&mut self, node: Node<'_>, id: NodeId) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.lower(child, Some(id));
        }
    }

    fn lower_array(&mut self, node: Node<'_>, parent: Option<NodeId>) -> NodeId {
        let id = self
            .tree
            .push(NodeKind::Array(Delimited::default()), span_of(node), parent);

        let mut delimiters = Delimited::default();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.is_named() {
                self.lower(child, Some(id));
            } else if child.kind() == "[" && delimiters.open.is_none() {
                delimiters.open = Some(span_of(child));
            } else if child.kind() == "]" {
                delimiters.close = Some(span_of(child));
            }
        }

        self.tree.set_kind(id, NodeKind::Array(delimiters));
        id
    }

    fn lower_string(&mut self, node: Node<'_>, parent: Option<NodeId>) -> NodeId {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();

        let delimiters = match (children.first(), children.last()) {
            (Some(open), Some(close))
                if children.len() >= 2 && !open.is_named() && !close.is_named() =>
            {
                Some((span_of(*open), span_of(*close)))
            }
            _ => None,
        };

        let Some((open, close)) = delimiters else {
            let id = self.tree.push(NodeKind::Other("string"), span_of(node), parent);
            self.lower_named_children(node, id);
            return id;
        };

        let literal = StrLiteral {
            open,
            close,
            content: open.between(close),
        };
        let kind = if children.iter().any(|child| child.kind() == "interpolation") {
            NodeKind::InterpolatedStr(literal)
        } else {
            NodeKind::Str(literal)
        };

        let id = self.tree.push(kind, span_of(node), parent);
        for child in children.into_iter().filter(|child| child.is_named()) {
            self.lower(child, Some(id));
        }
        id
    }

    fn lower_call(&mut self, node: Node<'_>, parent: Option<NodeId>) -> NodeId {
        let id = self.tree.push(
            NodeKind::MethodCall(MethodCall::default()),
            span_of(node),
            parent,
        );

        let receiver_node = node.child_by_field_name("receiver");
        let method_node = node.child_by_field_name("method");
        let operator_node = node.child_by_field_name("operator");
        let arguments_node = node.child_by_field_name("arguments");
        let block_node = node.child_by_field_name("block");

        let mut call = MethodCall::default();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if Some(child) == receiver_node {
                call.receiver = Some(self.lower(child, Some(id)));
            } else if Some(child) == method_node {
                call.name = self.tree.source().slice(span_of(child)).to_string();
                call.selector = Some(span_of(child));
            } else if Some(child) == operator_node {
                call.dot = Some(span_of(child));
            } else if Some(child) == arguments_node {
                self.lower_arguments(child, id, &mut call);
            } else if Some(child) == block_node {
                call.block = Some(self.lower(child, Some(id)));
            } else if child.is_named() {
                self.lower(child, Some(id));
            }
        }

        self.tree.set_kind(id, NodeKind::MethodCall(call));
        id
    }

    /// `recv[index]` is a call to `[]` with `recv` as receiver
    fn lower_element_reference(&mut self, node: Node<'_>, parent: Option<NodeId>) -> NodeId {
        let id = self.tree.push(
            NodeKind::MethodCall(MethodCall::default()),
            span_of(node),
            parent,
        );

        let object_node = node.child_by_field_name("object");
        let block_node = node.child_by_field_name("block");

        let mut call = MethodCall {
            name: "[]".to_string(),
            ..Default::default()
        };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if Some(child) == object_node {
                call.receiver = Some(self.lower(child, Some(id)));
            } else if Some(child) == block_node {
                call.block = Some(self.lower(child, Some(id)));
            } else if child.kind() == "comment" {
                self.lower(child, Some(id));
            } else if child.is_named() {
                let argument = self.lower(child, Some(id));
                call.arguments.push(argument);
            } else if child.kind() == "[" && call.open_paren.is_none() {
                call.open_paren = Some(span_of(child));
            } else if child.kind() == "]" {
                call.close_paren = Some(span_of(child));
            }
        }

        self.tree.set_kind(id, NodeKind::MethodCall(call));
        id
    }

    fn lower_arguments(&mut self, list: Node<'_>, call_id: NodeId, call: &mut MethodCall) {
        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            match child.kind() {
                "(" => call.open_paren = Some(span_of(child)),
                ")" => call.close_paren = Some(span_of(child)),
                "comment" => {
                    self.lower(child, Some(call_id));
                }
                _ if child.is_named() => {
                    let argument = self.lower(child, Some(call_id));
                    call.arguments.push(argument);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_all(tree: &SourceTree, predicate: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        tree.preorder()
            .into_iter()
            .filter(|&id| predicate(tree.kind(id)))
            .collect()
    }

    #[test]
    fn test_array_of_strings() {
        let tree = parse_ruby("['foo', \"bar\"]\n").unwrap();
        let arrays = find_all(&tree, NodeKind::is_array);
        assert_eq!(arrays.len(), 1);

        let array = arrays[0];
        let NodeKind::Array(delimiters) = tree.kind(array) else {
            panic!("expected array");
        };
        assert_eq!(tree.source().slice(delimiters.open.unwrap()), "[");
        assert_eq!(tree.source().slice(delimiters.close.unwrap()), "]");

        let elements = tree.children(array);
        assert_eq!(elements.len(), 2);
        let first = tree.kind(elements[0]).as_str_literal().unwrap();
        assert_eq!(tree.source().slice(first.open), "'");
        assert_eq!(tree.source().slice(first.content), "foo");
        assert!(matches!(tree.kind(elements[1]), NodeKind::Str(_)));
    }

    #[test]
    fn test_interpolated_string() {
        let tree = parse_ruby("x = \"a#{b}c\"\n").unwrap();
        let strings = find_all(&tree, |kind| matches!(kind, NodeKind::InterpolatedStr(_)));
        assert_eq!(strings.len(), 1);
    }

    #[test]
    fn test_single_quoted_interpolation_is_plain() {
        let tree = parse_ruby("x = 'a#{b}c'\n").unwrap();
        let strings = find_all(&tree, |kind| matches!(kind, NodeKind::Str(_)));
        assert_eq!(strings.len(), 1);
    }

    #[test]
    fn test_call_with_flattened_arguments() {
        let tree = parse_ruby("do_something(some_arg, ['foo'])\n").unwrap();
        let calls = find_all(&tree, |kind| {
            kind.as_call().is_some_and(|call| call.name == "do_something")
        });
        assert_eq!(calls.len(), 1);

        let call = tree.kind(calls[0]).as_call().unwrap();
        assert!(call.receiver.is_none());
        assert_eq!(call.arguments.len(), 2);
        assert!(tree.kind(call.arguments[1]).is_array());
        assert_eq!(tree.source().slice(call.close_paren.unwrap()), ")");

        let (enclosing, _, position) = tree.enclosing_call(call.arguments[1]).unwrap();
        assert_eq!(enclosing, calls[0]);
        assert_eq!(position, 1);
    }

    #[test]
    fn test_chained_call_receiver() {
        let tree = parse_ruby("['foo', 'bar'].join('')\n").unwrap();
        let array = find_all(&tree, NodeKind::is_array)[0];
        let (_, call) = tree.receiving_call(array).unwrap();
        assert_eq!(call.name, "join");
        assert_eq!(call.arguments.len(), 1);
        assert_eq!(tree.source().slice(call.dot.unwrap()), ".");
    }

    #[test]
    fn test_command_call_without_parens() {
        let tree = parse_ruby("expect(x).to eq ['a', 'b']\n").unwrap();
        let array = find_all(&tree, NodeKind::is_array)[0];
        let (_, call, _) = tree.enclosing_call(array).unwrap();
        assert_eq!(call.name, "eq");
        assert!(call.open_paren.is_none());
    }

    #[test]
    fn test_element_reference_is_index_call() {
        let tree = parse_ruby("x = ['a', 'b'].first['k']\n").unwrap();
        let array = find_all(&tree, NodeKind::is_array)[0];
        let (first_id, first) = tree.receiving_call(array).unwrap();
        assert_eq!(first.name, "first");
        let (_, index) = tree.receiving_call(first_id).unwrap();
        assert_eq!(index.name, "[]");
        assert_eq!(index.arguments.len(), 1);
    }

    #[test]
    fn test_block_is_child_of_call() {
        let tree = parse_ruby("['a', 'b'].each do |x|\n  puts x\nend\n").unwrap();
        let array = find_all(&tree, NodeKind::is_array)[0];
        let (_, call) = tree.receiving_call(array).unwrap();
        assert_eq!(call.name, "each");
        let block = call.block.unwrap();
        assert_eq!(tree.kind(block), &NodeKind::Block);
    }

    #[test]
    fn test_comment_inside_array_is_a_child() {
        let tree = parse_ruby("[\n  'a', # first\n  'b'\n]\n").unwrap();
        let array = find_all(&tree, NodeKind::is_array)[0];
        assert!(tree
            .children(array)
            .iter()
            .any(|&child| tree.kind(child) == &NodeKind::Comment));
    }

    #[test]
    fn test_syntax_error() {
        let result = parse_ruby("foo(['a',\n");
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }
}
