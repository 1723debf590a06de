//! Rule: Rewrite multi-line string arrays as heredocs
//!
//! Transforms:
//! ```ruby
//! do_something(['foo',
//!               'bar'])
//! ```
//! Into:
//! ```ruby
//! do_something(<<-END.strip_indent)
//!   foo
//!   bar
//! END
//! ```
//!
//! A trailing `.join(sep)` is folded into the heredoc, indented elements
//! switch to `strip_margin('|')`, and a quoted marker keeps single-quoted
//! bodies literal. Arrays that fail any predicate in [`predicates`] are left
//! untouched.

mod candidate;
mod emit;
mod layout;
pub mod predicates;

use heredocify_core::{visit, Edit, EditSet, NodeId, SourceTree, Visitor};

use crate::options::RewriteOptions;
use crate::registry::Rule;

pub use candidate::{Candidate, Element, Quote};
pub use layout::{Layout, Marker};
pub use predicates::{classify, Ineligible};

/// Message of the edit replacing `[`; exactly one per rewritten array
pub const REWRITE_MESSAGE: &str = "Rewrite multi-line string array as heredoc";

/// Collect the edits rewriting every eligible array in `tree`
pub fn check_array_to_heredoc(tree: &SourceTree, options: &RewriteOptions) -> Vec<Edit> {
    let mut visitor = ArrayToHeredocVisitor {
        options,
        edits: EditSet::new(),
    };
    visit(&mut visitor, tree);
    visitor.edits.into_vec()
}

/// Whether every eligibility predicate holds for `candidate`
pub fn is_rewrite_candidate(candidate: &Candidate<'_>) -> bool {
    classify(candidate).is_ok()
}

struct ArrayToHeredocVisitor<'o> {
    options: &'o RewriteOptions,
    edits: EditSet,
}

impl Visitor for ArrayToHeredocVisitor<'_> {
    fn visit_array(&mut self, tree: &SourceTree, id: NodeId) -> bool {
        let Some(candidate) = Candidate::new(tree, id, self.options) else {
            return true;
        };
        let line = tree.source().line_of(tree.span(id).start);

        if let Err(reason) = classify(&candidate) {
            tracing::debug!(line, reason = %reason, "skipping array");
            return true;
        }

        match Layout::of(&candidate) {
            Some(layout) => {
                let before = self.edits.len();
                emit::emit(&candidate, &layout, &mut self.edits);
                tracing::debug!(
                    line,
                    marker = %layout.marker,
                    margin = layout.margin,
                    edits = self.edits.len() - before,
                    "rewriting array as heredoc"
                );
            }
            None => tracing::debug!(line, "skipping array without a usable layout"),
        }

        // Nested arrays are classified on their own
        true
    }
}

pub struct ArrayToHeredocRule;

impl Rule for ArrayToHeredocRule {
    fn name(&self) -> &'static str {
        "array_to_heredoc"
    }

    fn description(&self) -> &'static str {
        "Rewrite multi-line string arrays as heredocs"
    }

    fn check(&self, tree: &SourceTree, options: &RewriteOptions) -> Vec<Edit> {
        check_array_to_heredoc(tree, options)
    }
}
