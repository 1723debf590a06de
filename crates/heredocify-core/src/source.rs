//! Byte spans and line-aware queries over an immutable source buffer

use std::fmt;

/// A half-open byte range `[start, end)` into a [`SourceBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Self { start, end }
    }

    /// A zero-width span at `offset`
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Span from the start of `self` to the end of `other`
    pub fn join(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Span from the end of `self` to the start of `other`
    pub fn between(&self, other: Span) -> Span {
        Span::new(self.end, other.start.max(self.end))
    }

    /// Whether the two spans share at least one position.
    ///
    /// A zero-width span only intersects a span that strictly surrounds it,
    /// so insertions at the boundary of a replacement never conflict.
    pub fn intersects(&self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Immutable source text with precomputed line starts
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Source text covered by `span`
    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }

    /// 1-based line number containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Byte offset of the first character on the line containing `offset`
    pub fn line_start(&self, offset: usize) -> usize {
        self.line_starts[self.line_of(offset) - 1]
    }

    /// Byte offset of the line break ending the line containing `offset`,
    /// or the buffer length on the last line
    pub fn line_end(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        self.line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len())
    }

    /// 0-based byte column of `offset`
    pub fn column_of(&self, offset: usize) -> usize {
        offset - self.line_start(offset)
    }

    /// Full text of the line containing `offset`, without its line break
    pub fn line_text(&self, offset: usize) -> &str {
        &self.text[self.line_start(offset)..self.line_end(offset)]
    }

    /// Leading whitespace of the line containing `offset`.
    ///
    /// A blank line has no indentation.
    pub fn indentation_of_line(&self, offset: usize) -> &str {
        let line = self.line_text(offset);
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            ""
        } else {
            &line[..line.len() - trimmed.len()]
        }
    }

    /// Text between the start of the line and `offset`
    pub fn line_prefix(&self, offset: usize) -> &str {
        &self.text[self.line_start(offset)..offset]
    }

    /// Whether only whitespace precedes `offset` on its line
    pub fn starts_line(&self, offset: usize) -> bool {
        self.line_prefix(offset).chars().all(char::is_whitespace)
    }
}
