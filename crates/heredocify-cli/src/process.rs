//! Per-file rewrite pipeline

use anyhow::{Context, Result};
use std::path::Path;

use heredocify_core::{apply_edits, parse_ruby, SourceBuffer};
use heredocify_rules::{RewriteOptions, REWRITE_MESSAGE};

use crate::output::EditInfo;

/// Outcome of rewriting one file in memory
pub struct ProcessResult {
    /// One entry per rewritten array
    pub rewrites: Vec<EditInfo>,
    pub old_source: String,
    /// Present only when something changed
    pub new_source: Option<String>,
}

/// Rewrite one Ruby file in memory.
///
/// Returns `Ok(None)` when the file does not parse; such files are reported
/// and left alone.
pub fn process_file(path: &Path, options: &RewriteOptions) -> Result<Option<ProcessResult>> {
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    process_source(source_code, options)
        .with_context(|| format!("Failed to rewrite {}", path.display()))
}

pub fn process_source(source_code: String, options: &RewriteOptions) -> Result<Option<ProcessResult>> {
    let tree = match parse_ruby(&source_code) {
        Ok(tree) => tree,
        Err(error) => {
            tracing::debug!(%error, "skipping unparsable source");
            return Ok(None);
        }
    };

    let edits = heredocify_rules::check(&tree, options)?;
    if edits.is_empty() {
        return Ok(Some(ProcessResult {
            rewrites: vec![],
            old_source: source_code,
            new_source: None,
        }));
    }

    let rewrites = rewrite_infos(tree.source(), &edits);
    let new_source = apply_edits(&source_code, &edits)?;

    Ok(Some(ProcessResult {
        rewrites,
        old_source: source_code,
        new_source: Some(new_source),
    }))
}

/// Write the rewritten text back
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Each rewritten array contributes exactly one edit carrying `REWRITE_MESSAGE`
fn rewrite_infos(source: &SourceBuffer, edits: &[heredocify_core::Edit]) -> Vec<EditInfo> {
    edits
        .iter()
        .filter(|edit| edit.message == REWRITE_MESSAGE)
        .map(|edit| EditInfo {
            rule: "array_to_heredoc".to_string(),
            line: source.line_of(edit.start_offset()),
            column: source.column_of(edit.start_offset()) + 1,
            message: edit.message.clone(),
        })
        .collect()
}
