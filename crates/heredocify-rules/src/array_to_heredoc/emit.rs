//! Edit emission for an eligible array
//!
//! All edits are computed against the original buffer and queued on the
//! caller's [`EditSet`]; nothing is applied here.

use heredocify_core::{EditSet, Span};

use super::candidate::{Candidate, Element, Quote};
use super::layout::{unescape_single_quoted, Layout};

/// Queue every edit that turns `candidate` into the heredoc described by `layout`
pub fn emit(candidate: &Candidate<'_>, layout: &Layout, edits: &mut EditSet) {
    let (Some(open), Some(close)) = (candidate.delimiters.open, candidate.delimiters.close) else {
        return;
    };

    emit_wrapper_gap(candidate, edits);
    emit_opener(candidate, layout, open, edits);
    emit_closer(candidate, layout, close, edits);

    if let Some(trailing) = &layout.trailing {
        edits.remove(trailing.removed, "Remove source relocated to the heredoc opener");
    }

    emit_elements(candidate, layout, close, edits);
}

/// `foo(x,\n    [` becomes `foo(x, ` so the opener follows the preceding argument
fn emit_wrapper_gap(candidate: &Candidate<'_>, edits: &mut EditSet) {
    if candidate.wrapping_on_same_line().is_none() {
        return;
    }
    let Some(preceding) = candidate.preceding_argument() else {
        return;
    };

    let tree = candidate.tree;
    let gap = tree.span(preceding).between(tree.span(candidate.chain_root()));
    let text = candidate.source().slice(gap);
    if text != ", " && text.trim() == "," {
        edits.replace(gap, ", ", "Join the heredoc opener to the preceding argument");
    }
}

fn emit_opener(candidate: &Candidate<'_>, layout: &Layout, open: Span, edits: &mut EditSet) {
    let mut opener = layout.opener();
    let relocated = layout.relocated();
    if needs_space_before(relocated) {
        opener.push(' ');
    }
    opener.push_str(relocated);

    // Inline style replaces `[` and the gap up to the first element
    let mut replaced = open;
    if layout.inline_open {
        opener.push('\n');
        let first = candidate.first_element();
        let first_is_blank = first.is_some_and(Element::is_empty);
        if layout.margin {
            opener.push_str(&layout.body_prefix());
        } else if !first_is_blank {
            opener.push_str(&layout.source_indent);
        }
        if let Some(first) = first {
            replaced = Span::new(open.start, first.span.start.max(open.end));
        }
    }

    edits.replace(replaced, opener, super::REWRITE_MESSAGE);
}

/// Relocated text that would fuse with the opener's last token gets a space;
/// anything else keeps the spacing it had after the array
fn needs_space_before(relocated: &str) -> bool {
    relocated
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '#')
}

fn emit_closer(candidate: &Candidate<'_>, layout: &Layout, close: Span, edits: &mut EditSet) {
    let terminator = &layout.marker.name;
    if layout.close_on_own_line {
        let source = candidate.source();
        let prefix = Span::new(source.line_start(close.start), close.start);
        if source.slice(prefix) != layout.base_indent {
            edits.replace(prefix, layout.base_indent.clone(), "Reindent heredoc terminator");
        }
        edits.replace(close, terminator.clone(), "Replace array closing with terminator");
    } else {
        edits.replace(
            close,
            format!("\n{}{terminator}", layout.base_indent),
            "Replace array closing with terminator",
        );
    }
}

fn emit_elements(candidate: &Candidate<'_>, layout: &Layout, close: Span, edits: &mut EditSet) {
    let source = candidate.source();
    let elements = &candidate.elements;
    let collapse_last = elements.len() > 1 && elements.last().is_some_and(Element::is_empty);
    let count = elements.len();

    for (index, element) in elements.iter().enumerate() {
        let is_last = index + 1 == count;

        if collapse_last && is_last {
            let previous = &elements[index - 1];
            edits.remove(
                Span::new(previous.span.end, element.span.end),
                "Fold trailing empty line into the heredoc's final newline",
            );
            remove_separator(candidate, element, close, edits);
            continue;
        }

        if index > 0 || !layout.inline_open {
            reflow_line(candidate, layout, element, edits);
        }

        edits.remove(element.literal.open, "Remove opening quote");
        if layout.marker.quoted && element.quote == Quote::Single {
            unescape_content(candidate, element, edits);
        }
        edits.remove(element.literal.close, "Remove closing quote");

        let folded_next = collapse_last && index + 2 == count;
        if !folded_next {
            remove_separator(candidate, element, close, edits);
        }
    }

    tracing::trace!(
        elements = count,
        line = source.line_of(candidate.span().start),
        "emitted heredoc body"
    );
}

/// Rebuild the line prefix in front of the element from the body indentation
fn reflow_line(candidate: &Candidate<'_>, layout: &Layout, element: &Element, edits: &mut EditSet) {
    let source = candidate.source();
    let start = element.span.start;
    let prefix = Span::new(source.line_start(start), start);

    if element.is_empty() {
        edits.remove(prefix, "Remove indentation of blank heredoc line");
        return;
    }

    let wanted = layout.body_prefix();
    if source.slice(prefix) != wanted {
        edits.replace(prefix, wanted, "Reindent heredoc line");
    }
}

/// Comma and whitespace after the element, up to the line break or `]`
fn remove_separator(candidate: &Candidate<'_>, element: &Element, close: Span, edits: &mut EditSet) {
    let source = candidate.source();
    let end = source.line_end(element.span.end).min(close.start.max(element.span.end));
    edits.remove(Span::new(element.span.end, end), "Remove element separator");
}

/// `\\` and `\'` lose their backslash in a quoted heredoc body
fn unescape_content(candidate: &Candidate<'_>, element: &Element, edits: &mut EditSet) {
    let content_span = element.literal.content;
    let content = candidate.source().slice(content_span);
    let unescaped = unescape_single_quoted(content);
    if unescaped != content {
        edits.replace(content_span, unescaped, "Unescape single-quoted content");
    }
}
