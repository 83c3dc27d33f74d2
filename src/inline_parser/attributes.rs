//! Inline attribute spans: `{...}` following a word, a verbatim span, or a
//! bracketed span. Scanning is handed off to the incremental attribute
//! parser; on success the token spans are spliced in wrapped in
//! `+attributes` / `-attributes`, on failure everything consumed so far
//! reverts to ordinary text.

use crate::attribute_parser::{AttributeParser, Status};
use crate::events::{Annot, AtomKind, Event, EventData, SpanKind};
use crate::inline_parser::InlineParser;

#[derive(Debug)]
pub(super) struct AttrSpan {
    /// Position of the opening `{`.
    pub start: usize,
    pub parser: AttributeParser,
    /// For `[text]{...}`: the already-promoted span events to un-promote
    /// if the attribute parse fails.
    span_events: Option<(usize, usize)>,
}

impl AttrSpan {
    pub fn at(start: usize) -> Self {
        Self {
            start,
            parser: AttributeParser::new(),
            span_events: None,
        }
    }

    pub fn for_span(start: usize, enter_index: usize, exit_index: usize) -> Self {
        Self {
            start,
            parser: AttributeParser::new(),
            span_events: Some((enter_index, exit_index)),
        }
    }
}

/// Feed the pending attribute sub-parse from `pos`.
pub(super) fn step_attributes(p: &mut InlineParser, pos: usize, end: usize) -> usize {
    let mut attr = p.attributes.take().expect("attribute sub-parse pending");
    match attr.parser.feed(p.subject, pos, end) {
        Status::Done { position } => {
            log::trace!("inline attributes closed at {position}");
            p.events.push(Event::new(
                attr.start,
                attr.start,
                Annot::Enter(SpanKind::Attributes),
            ));
            p.events.extend(attr.parser.take_events());
            p.events.push(Event::new(
                position,
                position,
                Annot::Exit(SpanKind::Attributes),
            ));
            position + 1
        }
        Status::Fail { position } => {
            log::trace!("inline attributes failed at {position}");
            undo_span(p, &attr);
            if attr.start < position {
                p.events.push(Event::new(
                    attr.start,
                    position - 1,
                    Annot::Atom(AtomKind::Str),
                ));
            }
            // the offending byte is re-scanned as ordinary content
            position
        }
        Status::Continue => {
            p.attributes = Some(attr);
            end + 1
        }
    }
}

/// Resolve a sub-parse still pending when the container ends: everything
/// fed becomes plain text.
pub(super) fn finish_attributes(p: &mut InlineParser, last: usize) {
    if let Some(attr) = p.attributes.take() {
        undo_span(p, &attr);
        if attr.start <= last {
            p.events
                .push(Event::new(attr.start, last, Annot::Atom(AtomKind::Str)));
        }
    }
}

fn undo_span(p: &mut InlineParser, attr: &AttrSpan) {
    if let Some((enter_index, exit_index)) = attr.span_events {
        for index in [enter_index, exit_index] {
            let event = &mut p.events[index];
            event.annot = Annot::Atom(AtomKind::Str);
            event.data = EventData::None;
        }
    }
}
