//! Block quotes: a `>` prefix consumed on every line.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Annot, Event, SpanKind};
use crate::patterns::{self, BLOCKQUOTE};

pub(super) fn probe(p: &BlockParser, np: usize) -> bool {
    patterns::anchored(&BLOCKQUOTE, p.subject, np, p.content_end).is_some()
}

/// Open a block quote at the `>` marker; returns the position after the
/// marker and its following space, ready for cascaded opens.
pub(super) fn open(p: &mut BlockParser, np: usize) -> usize {
    log::debug!("opening blockquote at {np}");
    p.events
        .push(Event::new(np, np, Annot::Enter(SpanKind::BlockQuote)));
    p.containers
        .push(Container::new(ContainerKind::BlockQuote, p.indent));
    consume_marker(p, np)
}

pub(super) fn continues(p: &BlockParser, np: usize) -> Option<usize> {
    if probe(p, np) {
        Some(consume_marker(p, np))
    } else {
        None
    }
}

fn consume_marker(p: &BlockParser, np: usize) -> usize {
    let after = np + 1;
    if after < p.content_end && matches!(p.subject.as_bytes()[after], b' ' | b'\t') {
        after + 1
    } else {
        after
    }
}
