//! Block-level attribute lines: `{#id .class key=val}` on lines of their
//! own, possibly spanning several indented lines. Scanning delegates to
//! the incremental attribute parser; a failed parse is not an error, the
//! consumed text is reinterpreted as a paragraph and re-fed to a fresh
//! inline parser.

use crate::attribute_parser::{AttributeParser, Status};
use crate::block_parser::BlockParser;
use crate::block_parser::Continuation;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Annot, Event, SpanKind};

/// Dry-run the first line: a block attribute line must either close on
/// this line (with only whitespace after the brace) or continue.
pub(super) fn probe(p: &BlockParser, np: usize) -> bool {
    if p.subject.as_bytes()[np] != b'{' {
        return false;
    }
    let mut parser = AttributeParser::new();
    match parser.feed(p.subject, np, p.content_end - 1) {
        Status::Done { position } => p.rest_is_whitespace(position + 1),
        Status::Continue => true,
        Status::Fail { .. } => false,
    }
}

/// Open at `np`; consumes the line. Emits the wrapped token spans when the
/// block closes on its first line, otherwise pushes a container that keeps
/// feeding the parser.
pub(super) fn open(p: &mut BlockParser, np: usize) {
    let mut parser = AttributeParser::new();
    match parser.feed(p.subject, np, p.content_end - 1) {
        Status::Done { position } => {
            log::debug!("block attributes closed at {position}");
            splice(p, &mut parser, np, position);
        }
        Status::Continue => {
            p.containers.push(Container::new(
                ContainerKind::AttributeBlock { parser, start: np },
                p.indent,
            ));
        }
        Status::Fail { .. } => unreachable!("probe accepted an unparsable attribute line"),
    }
}

/// Continuation feeds the parser; the line is always consumed. A parse
/// failure converts everything consumed so far into a paragraph.
pub(super) fn continues(p: &mut BlockParser, index: usize, np: usize) -> Continuation {
    if np >= p.content_end || p.indent <= p.containers[index].indent {
        return Continuation::No;
    }
    let subject = p.subject;
    let (content_end, eol) = (p.content_end, p.eol);
    let status = {
        let Container {
            kind: ContainerKind::AttributeBlock { parser, .. },
            ..
        } = &mut p.containers[index]
        else {
            unreachable!("attribute continuation on a different container");
        };
        parser.feed(subject, np, content_end - 1)
    };
    match status {
        Status::Done { position } if p.rest_is_whitespace(position + 1) => {
            let Some(container) = p.containers.pop() else {
                unreachable!("attribute container on top");
            };
            let ContainerKind::AttributeBlock { mut parser, start } = container.kind else {
                unreachable!("attribute continuation on a different container");
            };
            splice(p, &mut parser, start, position);
            Continuation::Consumed
        }
        Status::Done { .. } | Status::Fail { .. } => {
            reinterpret_as_paragraph(p, eol);
            Continuation::Consumed
        }
        Status::Continue => Continuation::Consumed,
    }
}

fn splice(p: &mut BlockParser, parser: &mut AttributeParser, start: usize, close: usize) {
    p.events.push(Event::new(
        start,
        start,
        Annot::Enter(SpanKind::BlockAttributes),
    ));
    p.events.extend(parser.take_events());
    p.events.push(Event::new(
        close,
        close,
        Annot::Exit(SpanKind::BlockAttributes),
    ));
}

/// Pop the failed attribute container and replay everything it consumed
/// (through `end`) as a paragraph.
pub(super) fn reinterpret_as_paragraph(p: &mut BlockParser, end: usize) {
    let Some(container) = p.containers.pop() else {
        unreachable!("no attribute container to reinterpret");
    };
    let ContainerKind::AttributeBlock { start, .. } = container.kind else {
        unreachable!("reinterpreting a non-attribute container");
    };
    log::debug!("attribute block failed, reinterpreting from {start} as a paragraph");
    p.note_content();
    p.events
        .push(Event::new(start, start, Annot::Enter(SpanKind::Para)));
    let mut paragraph =
        Container::with_inline(ContainerKind::Paragraph, container.indent, p.subject);
    if let Some(inline) = paragraph.inline.as_mut() {
        inline.feed(start, end);
    }
    p.containers.push(paragraph);
}
