//! Eligibility predicates for the array rewrite
//!
//! Each predicate answers one question about a [`Candidate`]. An array is
//! rewritten only when all of them hold; the first failing one names the
//! reason it was skipped.

use std::fmt;

use heredocify_core::{NodeId, NodeKind, SourceTree, Span};

use super::candidate::Candidate;
use super::layout::{self, choose_marker, trailing_source};

/// Call names whose `expect(...)` assertions compare against arrays of messages
const ASSERTION_SUBJECTS: &[&str] = &["messages", "highlights"];

/// Why an array was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    NotAllStrings,
    SingleElement,
    NotMultiLine,
    NotBracketed,
    InconsistentWrap,
    OptionArray,
    Nested,
    BlockChained,
    AssertionContext,
    TrailingWhitespace,
    TrailingEscape,
    UncleanSeparators,
    MixedEscaping,
    UnrelocatableTrailingSource,
    NoSoundMarker,
}

impl Ineligible {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ineligible::NotAllStrings => "all-string-elements",
            Ineligible::SingleElement => "multi-element",
            Ineligible::NotMultiLine => "multi-line",
            Ineligible::NotBracketed => "bracket-style",
            Ineligible::InconsistentWrap => "wrap-consistency",
            Ineligible::OptionArray => "not-option-array",
            Ineligible::Nested => "not-nested",
            Ineligible::BlockChained => "not-block-chained",
            Ineligible::AssertionContext => "no-embedded-assertion-context",
            Ineligible::TrailingWhitespace => "no-trailing-whitespace",
            Ineligible::TrailingEscape => "no-trailing-escape",
            Ineligible::UncleanSeparators => "clean-separators",
            Ineligible::MixedEscaping => "consistent-escaping",
            Ineligible::UnrelocatableTrailingSource => "relocatable-trailing-source",
            Ineligible::NoSoundMarker => "sound-marker",
        }
    }
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Predicate = fn(&Candidate<'_>) -> bool;

/// Checked in order; later predicates may assume the earlier ones hold
const PREDICATES: &[(Ineligible, Predicate)] = &[
    (Ineligible::NotAllStrings, all_string_elements),
    (Ineligible::SingleElement, multi_element),
    (Ineligible::NotMultiLine, multi_line),
    (Ineligible::NotBracketed, bracket_style),
    (Ineligible::InconsistentWrap, wrap_consistency),
    (Ineligible::OptionArray, not_option_array),
    (Ineligible::Nested, not_nested),
    (Ineligible::BlockChained, not_block_chained),
    (Ineligible::AssertionContext, no_embedded_assertion_context),
    (Ineligible::TrailingWhitespace, no_trailing_whitespace),
    (Ineligible::TrailingEscape, no_trailing_escape),
    (Ineligible::UncleanSeparators, clean_separators),
    (Ineligible::MixedEscaping, consistent_escaping),
    (Ineligible::UnrelocatableTrailingSource, relocatable_trailing_source),
    (Ineligible::NoSoundMarker, sound_marker),
];

/// First failing predicate, if any
pub fn classify(candidate: &Candidate<'_>) -> Result<(), Ineligible> {
    match PREDICATES
        .iter()
        .find(|(_, predicate)| !predicate(candidate))
    {
        Some((reason, _)) => Err(*reason),
        None => Ok(()),
    }
}

pub fn all_string_elements(candidate: &Candidate<'_>) -> bool {
    candidate.all_children_are_strings()
}

pub fn multi_element(candidate: &Candidate<'_>) -> bool {
    candidate.elements.len() > 1
}

/// One element per line, none spanning lines
pub fn multi_line(candidate: &Candidate<'_>) -> bool {
    let source = candidate.source();
    let mut previous_line = 0;
    candidate.elements.iter().all(|element| {
        let start = source.line_of(element.span.start);
        let end = source.line_of(element.span.end);
        let ok = start == end && start > previous_line;
        previous_line = start;
        ok
    })
}

pub fn bracket_style(candidate: &Candidate<'_>) -> bool {
    match (candidate.delimiters.open, candidate.delimiters.close) {
        (Some(open), Some(close)) => {
            candidate.source().slice(open) == "[" && candidate.source().slice(close) == "]"
        }
        _ => false,
    }
}

/// A wrapped chain must be the last argument of a call without a block
pub fn wrap_consistency(candidate: &Candidate<'_>) -> bool {
    match candidate.wrapper() {
        Some(wrapper) => {
            wrapper.call.arguments.last() == Some(&candidate.chain_root())
                && wrapper.call.block.is_none()
        }
        None => true,
    }
}

pub fn not_option_array(candidate: &Candidate<'_>) -> bool {
    candidate
        .first_element()
        .is_some_and(|first| !candidate.source().slice(first.span).starts_with("'--"))
}

pub fn not_nested(candidate: &Candidate<'_>) -> bool {
    let tree = candidate.tree;
    tree.parent(candidate.chain_root())
        .map_or(true, |parent| !tree.kind(parent).is_array())
}

pub fn not_block_chained(candidate: &Candidate<'_>) -> bool {
    candidate
        .chain_call()
        .map_or(true, |call| call.block.is_none())
}

/// `expect(cop.messages).to eq([...])` style assertions stay arrays
pub fn no_embedded_assertion_context(candidate: &Candidate<'_>) -> bool {
    let tree = candidate.tree;
    !tree.ancestors(candidate.array).any(|ancestor| {
        tree.kind(ancestor)
            .as_call()
            .and_then(|call| call.receiver)
            .is_some_and(|receiver| is_assertion_subject(tree, receiver))
    })
}

fn is_assertion_subject(tree: &SourceTree, id: NodeId) -> bool {
    let Some(call) = tree.kind(id).as_call() else {
        return false;
    };
    call.name == "expect"
        && call
            .arguments
            .iter()
            .any(|&argument| calls_any(tree, argument, ASSERTION_SUBJECTS))
}

fn calls_any(tree: &SourceTree, id: NodeId, names: &[&str]) -> bool {
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if let NodeKind::MethodCall(call) = tree.kind(current) {
            if names.contains(&call.name.as_str()) {
                return true;
            }
        }
        stack.extend_from_slice(tree.children(current));
    }
    false
}

pub fn no_trailing_whitespace(candidate: &Candidate<'_>) -> bool {
    let source = candidate.source();
    candidate
        .elements
        .iter()
        .all(|element| !element.content(source).ends_with([' ', '\t']))
}

pub fn no_trailing_escape(candidate: &Candidate<'_>) -> bool {
    let source = candidate.source();
    candidate
        .elements
        .iter()
        .all(|element| !element.content(source).ends_with('\\'))
}

/// Only an optional comma and whitespace between elements and before `]`
pub fn clean_separators(candidate: &Candidate<'_>) -> bool {
    let source = candidate.source();
    let Some(close) = candidate.delimiters.close else {
        return false;
    };

    let mut gaps = candidate
        .elements
        .windows(2)
        .map(|pair| pair[0].span.between(pair[1].span))
        .collect::<Vec<Span>>();
    if let Some(last) = candidate.last_element() {
        gaps.push(last.span.between(close));
    }

    gaps.into_iter()
        .all(|gap| is_separator(source.slice(gap)))
}

fn is_separator(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed == ","
}

/// Raw-body elements and escape-processing elements cannot share one heredoc
pub fn consistent_escaping(candidate: &Candidate<'_>) -> bool {
    let source = candidate.source();
    let wants_raw = candidate
        .elements
        .iter()
        .any(|element| layout::needs_raw_body(element, element.content(source)));
    let wants_processing = candidate
        .elements
        .iter()
        .any(|element| layout::needs_processed_body(element, element.content(source)));
    !(wants_raw && wants_processing)
}

/// The relocated text fits on the opener line and the removed tail holds no
/// construct continuing past it
pub fn relocatable_trailing_source(candidate: &Candidate<'_>) -> bool {
    let Some(trailing) = trailing_source(candidate) else {
        return true;
    };
    if trailing.relocated.contains('\n') {
        return false;
    }

    let tree = candidate.tree;
    let removed = trailing.removed;
    !tree.preorder().into_iter().any(|id| {
        let span = tree.span(id);
        span.start >= removed.start && span.start < removed.end && span.end > removed.end
    })
}

pub fn sound_marker(candidate: &Candidate<'_>) -> bool {
    choose_marker(candidate).is_some()
}
