//! heredocify-core: Core abstractions for Ruby source rewriting
//!
//! This crate provides:
//! - `Span` / `SourceBuffer`: byte ranges and line/column queries over one buffer
//! - `SourceTree`: an arena of syntax nodes with parent back-references
//! - `parse_ruby()`: lowers a tree-sitter Ruby tree into a `SourceTree`
//! - `Edit` / `EditSet`: span-based modifications applied in a single pass
//! - `Visitor`: Trait for traversing the tree top-down

mod edit;
mod parser;
mod source;
mod tree;
pub mod visitor;

pub use edit::{apply_edits, Edit, EditError, EditSet};
pub use parser::{parse_ruby, ParseError};
pub use source::{SourceBuffer, Span};
pub use tree::{Delimited, MethodCall, NodeId, NodeKind, SourceNode, SourceTree, StrLiteral};
pub use visitor::{visit, Visitor};
