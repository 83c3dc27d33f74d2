//! Captions: `^` plus a space, attached to the preceding table by the tree
//! assembler. Continuation lines are indented past the marker.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Annot, Event, SpanKind};
use crate::patterns::{self, CAPTION};

pub(super) fn probe(p: &BlockParser, np: usize) -> bool {
    patterns::anchored(&CAPTION, p.subject, np, p.content_end).is_some()
}

pub(super) fn open(p: &mut BlockParser, np: usize) -> usize {
    log::debug!("opening caption at {np}");
    p.events
        .push(Event::new(np, np, Annot::Enter(SpanKind::Caption)));
    p.containers.push(Container::with_inline(
        ContainerKind::Caption,
        p.indent,
        p.subject,
    ));
    np + 2
}
