//! Fenced code blocks: ``` ``` ``` or `~~~` runs, an optional language
//! tag (an `=`-prefixed tag marks a raw block), raw-text content, and a
//! closing fence of the same character at least as long. Fences left open
//! at end of input close synthetically with a warning.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Annot, AtomKind, Event, SpanKind};
use crate::patterns::{self, CODE_FENCE_CLOSE, CODE_FENCE_OPEN};

pub(super) struct CodeFence {
    pub fence_start: usize,
    pub fence_end: usize,
    pub tag: Option<(usize, usize)>,
}

pub(super) fn probe(p: &BlockParser, np: usize) -> Option<CodeFence> {
    let m = patterns::anchored(&CODE_FENCE_OPEN, p.subject, np, p.content_end)?;
    let (fence_start, fence_end) = m.capture(1)?;
    Some(CodeFence {
        fence_start,
        fence_end,
        tag: m.capture(2),
    })
}

/// Open a code block; the fence line is fully consumed.
pub(super) fn open(p: &mut BlockParser, fence: CodeFence) {
    log::debug!("opening code block at {}", fence.fence_start);
    p.events.push(Event::new(
        fence.fence_start,
        fence.fence_end,
        Annot::Enter(SpanKind::CodeBlock),
    ));
    if let Some((start, end)) = fence.tag {
        let kind = if p.subject.as_bytes()[start] == b'=' {
            AtomKind::RawFormat
        } else {
            AtomKind::CodeLanguage
        };
        p.events.push(Event::new(start, end, Annot::Atom(kind)));
    }
    p.containers.push(Container::new(
        ContainerKind::CodeBlock {
            fence_byte: p.subject.as_bytes()[fence.fence_start],
            fence: fence.fence_end - fence.fence_start + 1,
            closed_by_fence: false,
        },
        p.indent,
    ));
}

/// A closing fence for an open code block, if this line is one.
pub(super) fn closing_fence(
    p: &BlockParser,
    np: usize,
    fence_byte: u8,
    fence: usize,
) -> Option<(usize, usize)> {
    let m = patterns::anchored(&CODE_FENCE_CLOSE, p.subject, np, p.content_end)?;
    let (start, end) = m.capture(1)?;
    (p.subject.as_bytes()[start] == fence_byte && end - start + 1 >= fence)
        .then_some((start, end))
}
