//! Footnotes: `[^label]:` opening a block-content note whose body is
//! indented strictly past the marker. Blank lines stay inside the note.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Annot, AtomKind, Event, SpanKind};
use crate::patterns::{self, FOOTNOTE};

pub(super) struct FootnoteMatch {
    pub marker_end: usize,
    pub label: (usize, usize),
}

pub(super) fn probe(p: &BlockParser, np: usize) -> Option<FootnoteMatch> {
    let m = patterns::anchored(&FOOTNOTE, p.subject, np, p.content_end)?;
    Some(FootnoteMatch {
        marker_end: m.end,
        label: m.capture(1)?,
    })
}

pub(super) fn open(p: &mut BlockParser, np: usize, m: FootnoteMatch) -> usize {
    log::debug!("opening footnote at {np}");
    p.events
        .push(Event::new(np, m.marker_end, Annot::Enter(SpanKind::Footnote)));
    p.events.push(Event::new(
        m.label.0,
        m.label.1,
        Annot::Atom(AtomKind::NoteLabel),
    ));
    p.containers
        .push(Container::new(ContainerKind::Footnote, p.indent));
    m.marker_end + 1
}
