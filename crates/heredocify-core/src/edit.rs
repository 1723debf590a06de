//! Span-based source code editing with format preservation
//!
//! Edits are always computed against the original text. They are collected
//! in an [`EditSet`], checked for overlap, and applied in one forward pass.

use thiserror::Error;

use crate::source::Span;

/// Errors that can occur during edit application
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("Overlapping edits detected: {first} and {second}")]
    OverlappingEdits { first: Span, second: Span },

    #[error("Edit span {start}..{end} out of bounds for source length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit span {0} does not fall on character boundaries")]
    NotCharBoundary(Span),
}

/// Represents a single code edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The source span to replace; zero-width for insertions
    pub span: Span,
    /// The replacement text
    pub replacement: String,
    /// Human-readable description of the edit
    pub message: String,
}

impl Edit {
    /// Create a new edit
    pub fn new(span: Span, replacement: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            message: message.into(),
        }
    }

    /// Get the byte offset where this edit starts
    pub fn start_offset(&self) -> usize {
        self.span.start
    }

    /// Get the byte offset where this edit ends
    pub fn end_offset(&self) -> usize {
        self.span.end
    }

    pub fn is_insertion(&self) -> bool {
        self.span.is_empty()
    }
}

/// An accumulating set of edits against one buffer
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn extend(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>, message: impl Into<String>) {
        self.push(Edit::new(span, text, message));
    }

    /// Queue removal of `span`; removing an empty span is a no-op
    pub fn remove(&mut self, span: Span, message: impl Into<String>) {
        if !span.is_empty() {
            self.push(Edit::new(span, "", message));
        }
    }

    pub fn insert_before(&mut self, offset: usize, text: impl Into<String>, message: impl Into<String>) {
        self.push(Edit::new(Span::empty(offset), text, message));
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter()
    }

    pub fn into_vec(self) -> Vec<Edit> {
        self.edits
    }

    /// Check that no two edits overlap
    pub fn validate(&self, source_len: usize) -> Result<(), EditError> {
        sorted_and_validated(&self.edits, source_len).map(|_| ())
    }

    /// Apply all edits to `source`, consuming the set
    pub fn apply(self, source: &str) -> Result<String, EditError> {
        apply_edits(source, &self.edits)
    }
}

impl From<Vec<Edit>> for EditSet {
    fn from(edits: Vec<Edit>) -> Self {
        Self { edits }
    }
}

/// Sort edits by position and reject overlaps.
///
/// The sort is stable, so insertions at one offset keep their queue order and
/// come before a replacement starting at that offset.
fn sorted_and_validated(edits: &[Edit], source_len: usize) -> Result<Vec<&Edit>, EditError> {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.start_offset(), edit.end_offset()));

    let mut previous: Option<Span> = None;
    for edit in &sorted {
        let span = edit.span;
        if span.end > source_len || span.start > span.end {
            return Err(EditError::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len: source_len,
            });
        }

        if let Some(prev) = previous {
            if prev.intersects(span) {
                return Err(EditError::OverlappingEdits {
                    first: prev,
                    second: span,
                });
            }
        }

        if previous.map_or(true, |prev| span.end >= prev.end) {
            previous = Some(span);
        }
    }

    Ok(sorted)
}

/// Apply edits to source code, preserving everything outside their spans
///
/// # Arguments
/// * `source` - The original source code
/// * `edits` - Slice of edits to apply
///
/// # Returns
/// * `Ok(String)` - The modified source code
/// * `Err(EditError)` - If edits overlap or are out of bounds
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    let sorted = sorted_and_validated(edits, source.len())?;

    let mut result = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in sorted {
        let span = edit.span;
        if !source.is_char_boundary(span.start) || !source.is_char_boundary(span.end) {
            return Err(EditError::NotCharBoundary(span));
        }
        result.push_str(&source[cursor..span.start]);
        result.push_str(&edit.replacement);
        cursor = cursor.max(span.end);
    }
    result.push_str(&source[cursor..]);

    Ok(result)
}
