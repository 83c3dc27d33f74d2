//! Reference definitions: `[label]: destination`, with continuation lines
//! indented past the marker appended verbatim to the destination value.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Annot, AtomKind, Event, SpanKind};
use crate::patterns::{self, REF_DEFINITION};

pub(super) struct RefDefMatch {
    pub label: (usize, usize),
    pub value: Option<(usize, usize)>,
}

pub(super) fn probe(p: &BlockParser, np: usize) -> Option<RefDefMatch> {
    let m = patterns::anchored(&REF_DEFINITION, p.subject, np, p.content_end)?;
    Some(RefDefMatch {
        label: m.capture(1)?,
        value: m.capture(2),
    })
}

/// Open a definition; the whole line is consumed.
pub(super) fn open(p: &mut BlockParser, np: usize, m: RefDefMatch) {
    log::debug!("opening reference definition at {np}");
    p.events.push(Event::new(
        np,
        m.label.1 + 2,
        Annot::Enter(SpanKind::ReferenceDefinition),
    ));
    p.events.push(Event::new(
        m.label.0,
        m.label.1,
        Annot::Atom(AtomKind::ReferenceKey),
    ));
    if let Some((start, end)) = m.value {
        p.events
            .push(Event::new(start, end, Annot::Atom(AtomKind::ReferenceValue)));
    }
    p.containers
        .push(Container::new(ContainerKind::ReferenceDefinition, p.indent));
}

/// Append a continuation line to the destination value.
pub(super) fn append_value(p: &mut BlockParser, np: usize) {
    let bytes = p.subject.as_bytes();
    let mut end = p.content_end - 1;
    while end > np && matches!(bytes[end], b' ' | b'\t') {
        end -= 1;
    }
    p.events
        .push(Event::new(np, end, Annot::Atom(AtomKind::ReferenceValue)));
}
