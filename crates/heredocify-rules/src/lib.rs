//! heredocify-rules: Rewrite rules for Ruby sources
//!
//! Available rules:
//! - array_to_heredoc: Convert multi-line string arrays to `<<-END.strip_indent` heredocs
//!
//! [`rewrite`] runs every registered rule over one parsed file and applies
//! the resulting edits in a single pass.

pub mod array_to_heredoc;
pub mod options;
pub mod registry;

use heredocify_core::{apply_edits, parse_ruby, Edit, EditError, EditSet, ParseError, SourceTree};
use thiserror::Error;

pub use array_to_heredoc::{check_array_to_heredoc, is_rewrite_candidate, REWRITE_MESSAGE};
pub use options::{HeredocStyle, RewriteOptions};
pub use registry::{Rule, RuleRegistry};

/// Errors that abort rewriting a file
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Edits for every eligible construct in `tree`, checked for overlap
pub fn check(tree: &SourceTree, options: &RewriteOptions) -> Result<Vec<Edit>, RewriteError> {
    let edits = EditSet::from(RuleRegistry::new().check_all(tree, options));
    edits.validate(tree.source().len())?;
    Ok(edits.into_vec())
}

/// Rewritten text of `tree`; the original text when nothing is eligible
pub fn rewrite(tree: &SourceTree, options: &RewriteOptions) -> Result<String, RewriteError> {
    let edits = check(tree, options)?;
    Ok(apply_edits(tree.source().text(), &edits)?)
}

/// Parse `source` and rewrite it
pub fn rewrite_source(source: &str, options: &RewriteOptions) -> Result<String, RewriteError> {
    let tree = parse_ruby(source)?;
    rewrite(&tree, options)
}
