//! Headings: a `#` run with a required following space. The run length is
//! the level; a heading continues only on a line carrying an identical-
//! level marker, which is consumed like a container prefix.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Annot, Event, SpanKind};
use crate::patterns::{self, HEADING};

pub(super) struct HeadingMatch {
    pub level: usize,
    pub marker_end: usize,
    /// Position after the marker and its space.
    pub content: usize,
}

pub(super) fn probe(p: &BlockParser, np: usize) -> Option<HeadingMatch> {
    let m = patterns::anchored(&HEADING, p.subject, np, p.content_end)?;
    let (run_start, run_end) = m.capture(1)?;
    Some(HeadingMatch {
        level: run_end - run_start + 1,
        marker_end: run_end,
        content: m.end + 1,
    })
}

pub(super) fn open(p: &mut BlockParser, np: usize, m: HeadingMatch) -> usize {
    log::debug!("opening level {} heading at {np}", m.level);
    p.events
        .push(Event::new(np, m.marker_end, Annot::Enter(SpanKind::Heading)));
    p.containers.push(Container::with_inline(
        ContainerKind::Heading { level: m.level },
        p.indent,
        p.subject,
    ));
    m.content
}

pub(super) fn continues(p: &BlockParser, np: usize, level: usize) -> Option<usize> {
    let m = probe(p, np)?;
    if m.level == level { Some(m.content) } else { None }
}
