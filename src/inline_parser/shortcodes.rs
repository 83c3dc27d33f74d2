//! `:shortcode:` symbol syntax. The parser only emits the span; resolving
//! a shortcode to a glyph is a renderer concern.

use crate::events::{Annot, AtomKind, Event};
use crate::inline_parser::InlineParser;
use crate::patterns::{self, SHORTCODE};

pub(super) fn colon(p: &mut InlineParser, pos: usize, end: usize) -> usize {
    if let Some(m) = patterns::anchored(&SHORTCODE, p.subject, pos, end + 1) {
        p.events
            .push(Event::new(m.start, m.end, Annot::Atom(AtomKind::Symbol)));
        return m.end + 1;
    }
    p.events
        .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
    pos + 1
}
