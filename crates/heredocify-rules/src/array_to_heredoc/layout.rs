//! Layout of the heredoc that replaces an eligible array

use std::fmt;
use std::sync::OnceLock;

use heredocify_core::Span;
use regex::Regex;

use super::candidate::{Candidate, Element, Quote};
use crate::options::HeredocStyle;

/// Prefix of every body line in margin mode
pub const MARGIN_SIGIL: &str = "|";

/// Heredoc terminator name and whether the opener quotes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    /// `<<-'END'`: the body is taken verbatim
    pub quoted: bool,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "'{}'", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Source removed after the array and the part of it moved onto the opener line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trailing {
    pub removed: Span,
    pub relocated: String,
}

/// Everything emission needs to know about the shape of the output
#[derive(Debug, Clone)]
pub struct Layout {
    /// `[` shares its line with the first element
    pub inline_open: bool,
    /// `]` is the first thing on its line
    pub close_on_own_line: bool,
    pub margin: bool,
    pub marker: Marker,
    pub base_indent: String,
    pub source_indent: String,
    pub trailing: Option<Trailing>,
    pub style: HeredocStyle,
}

impl Layout {
    /// Compute the layout; `None` when no sound marker exists or the delimiters are missing
    pub fn of(candidate: &Candidate<'_>) -> Option<Self> {
        let source = candidate.source();
        let open = candidate.delimiters.open?;
        let close = candidate.delimiters.close?;
        let first = candidate.first_element()?;

        let base_indent = base_indentation(candidate).to_string();
        let source_indent = format!("{base_indent}{}", " ".repeat(candidate.options.indent_width));

        Some(Self {
            inline_open: source.line_of(open.start) == source.line_of(first.span.start),
            close_on_own_line: source.starts_line(close.start),
            margin: needs_margin(candidate),
            marker: choose_marker(candidate)?,
            base_indent,
            source_indent,
            trailing: trailing_source(candidate),
            style: candidate.options.heredoc,
        })
    }

    /// Heredoc opener including the indentation-stripping call
    pub fn opener(&self) -> String {
        match (self.margin, self.style) {
            (true, _) => format!("<<-{}.strip_margin('{MARGIN_SIGIL}')", self.marker),
            (false, HeredocStyle::StripIndent) => format!("<<-{}.strip_indent", self.marker),
            (false, HeredocStyle::Squiggly) => format!("<<~{}", self.marker),
        }
    }

    /// Text relocated onto the opener line
    pub fn relocated(&self) -> &str {
        self.trailing
            .as_ref()
            .map_or("", |trailing| trailing.relocated.as_str())
    }

    /// Indentation in front of a body line, sigil included
    pub fn body_prefix(&self) -> String {
        if self.margin {
            format!("{}{MARGIN_SIGIL}", self.source_indent)
        } else {
            self.source_indent.clone()
        }
    }
}

/// Indentation of the wrapper's line when the wrapper closes with the chain, else the array's line
pub fn base_indentation<'s>(candidate: &Candidate<'s>) -> &'s str {
    let anchor = match candidate.wrapping_on_same_line() {
        Some(wrapper) => candidate.tree.span(wrapper.id).start,
        None => candidate.span().start,
    };
    candidate.source().indentation_of_line(anchor)
}

/// Every non-empty element starts with whitespace, so indentation must survive exactly
pub fn needs_margin(candidate: &Candidate<'_>) -> bool {
    let source = candidate.source();
    let mut non_empty = candidate
        .elements
        .iter()
        .filter(|element| !element.is_empty())
        .peekable();
    non_empty.peek().is_some()
        && non_empty.all(|element| element.content(source).starts_with([' ', '\t']))
}

/// First configured marker that no element spells out on its own
pub fn choose_marker(candidate: &Candidate<'_>) -> Option<Marker> {
    let source = candidate.source();
    let name = candidate.options.markers.iter().find(|marker| {
        !marker.is_empty()
            && candidate
                .elements
                .iter()
                .all(|element| element.content(source).trim() != marker.as_str())
    })?;

    Some(Marker {
        name: name.clone(),
        quoted: wants_quoted_marker(candidate),
    })
}

fn wants_quoted_marker(candidate: &Candidate<'_>) -> bool {
    let source = candidate.source();
    if candidate.elements.iter().any(|element| element.interpolated) {
        return false;
    }
    candidate
        .elements
        .iter()
        .any(|element| needs_raw_body(element, element.content(source)))
}

/// Whether the element's text would change meaning inside an interpolating heredoc
pub fn needs_raw_body(element: &Element, content: &str) -> bool {
    match element.quote {
        Quote::Single => content.contains('\\') || has_dead_interpolation(content),
        Quote::Double => false,
    }
}

/// `#{`, `#@` or `#$` that a single-quoted string keeps literally
pub fn has_dead_interpolation(content: &str) -> bool {
    static INTERPOLATION_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = INTERPOLATION_REGEX.get_or_init(|| {
        // Constant pattern
        Regex::new(r"#[{@$]").unwrap()
    });
    regex.is_match(content)
}

/// Whether a double-quoted element relies on escape or interpolation processing
pub fn needs_processed_body(element: &Element, content: &str) -> bool {
    element.interpolated || (element.quote == Quote::Double && content.contains('\\'))
}

/// Source following the array up to the end of the line where the chain (or
/// the same-line wrapper) ends, and the part of it that moves to the opener
pub fn trailing_source(candidate: &Candidate<'_>) -> Option<Trailing> {
    let source = candidate.source();
    let tree = candidate.tree;
    let array_end = candidate.span().end;

    let anchor = match candidate.wrapping_on_same_line() {
        Some(wrapper) => tree.span(wrapper.id).end,
        None => tree.span(candidate.chain_root()).end,
    };
    let removed = Span::new(array_end, source.line_end(anchor).max(array_end));
    if removed.is_empty() {
        return None;
    }

    let kept_from = if candidate.is_join_call() {
        tree.span(candidate.chain_root()).end
    } else {
        array_end
    };
    // Leading whitespace is kept so `[0]` and ` if x` read as before
    let relocated = source
        .slice(Span::new(kept_from, removed.end))
        .trim_end()
        .to_string();

    Some(Trailing { removed, relocated })
}

/// Body text of a single-quoted element under a quoted marker
pub fn unescape_single_quoted(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('\\' | '\'')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
