//! Fenced divs: `:::` runs with an optional class word. The closing fence
//! must be at least as long as the opening one; a bare fence inside an
//! open div always closes the innermost div, so outer divs pass the line
//! through.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Annot, AtomKind, Event, SpanKind};
use crate::patterns::{self, DIV_FENCE_CLOSE, DIV_FENCE_OPEN};

pub(super) struct DivFence {
    pub fence_start: usize,
    pub fence_end: usize,
    pub class: Option<(usize, usize)>,
}

pub(super) fn probe(p: &BlockParser, np: usize) -> Option<DivFence> {
    let m = patterns::anchored(&DIV_FENCE_OPEN, p.subject, np, p.content_end)?;
    let (fence_start, fence_end) = m.capture(1)?;
    Some(DivFence {
        fence_start,
        fence_end,
        class: m.capture(2),
    })
}

/// Open a div; the fence line is fully consumed.
pub(super) fn open(p: &mut BlockParser, fence: DivFence) {
    log::debug!("opening div at {}", fence.fence_start);
    p.events.push(Event::new(
        fence.fence_start,
        fence.fence_end,
        Annot::Enter(SpanKind::Div),
    ));
    if let Some((start, end)) = fence.class {
        p.events
            .push(Event::new(start, end, Annot::Atom(AtomKind::Class)));
    }
    p.containers.push(Container::new(
        ContainerKind::Div {
            fence: fence.fence_end - fence.fence_start + 1,
            closed_by_fence: false,
        },
        p.indent,
    ));
}

/// A closing fence for the div at `index`, if this line is one and no
/// deeper div claims it first.
pub(super) fn closing_fence(
    p: &BlockParser,
    index: usize,
    np: usize,
    fence: usize,
) -> Option<(usize, usize)> {
    let deeper_div = p.containers[index + 1..]
        .iter()
        .any(|c| matches!(c.kind, ContainerKind::Div { .. }));
    if deeper_div {
        return None;
    }
    let m = patterns::anchored(&DIV_FENCE_CLOSE, p.subject, np, p.content_end)?;
    let (start, end) = m.capture(1)?;
    (end - start + 1 >= fence).then_some((start, end))
}
