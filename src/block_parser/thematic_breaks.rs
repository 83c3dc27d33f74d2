//! Thematic breaks: a line of dashes/asterisks. Tried before the list
//! rules so a `- - -` line is not swallowed as a list marker; closes
//! immediately and never continues.

use crate::block_parser::BlockParser;
use crate::events::{Annot, AtomKind, Event};
use crate::patterns::{self, THEMATIC_BREAK};

pub(super) fn probe(p: &BlockParser, np: usize) -> Option<usize> {
    patterns::anchored(&THEMATIC_BREAK, p.subject, np, p.content_end).map(|m| m.end)
}

pub(super) fn emit(p: &mut BlockParser, np: usize, end: usize) {
    log::debug!("thematic break at {np}");
    p.events
        .push(Event::new(np, end, Annot::Atom(AtomKind::ThematicBreak)));
}
