//! Pipe tables.
//!
//! A row is recognized by its bounding pipes. The whole row is probed
//! before anything is emitted, tracking backtick verbatim nesting and
//! escaped pipes, so a row that never finds its closing pipe leaves the
//! event list untouched and simply fails table continuation. A separator
//! row of dashes and colons emits nothing itself: it fixes the column
//! alignments, re-annotating the previous row as the head row and applying
//! to every following row.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{Alignment, Annot, Event, EventData, SpanKind};
use crate::inline_parser::InlineParser;

#[derive(Debug)]
pub(super) enum RowShape {
    Separator { aligns: Vec<Alignment> },
    Cells { cells: Vec<CellSpan>, last_pipe: usize },
}

#[derive(Debug, Clone, Copy)]
pub(super) struct CellSpan {
    /// The pipe opening this cell.
    pub pipe: usize,
    /// Trimmed content; empty when `end < start`.
    pub start: usize,
    pub end: usize,
}

/// Probe a complete table row at `at` without emitting anything.
pub(super) fn probe_row(subject: &str, at: usize, content_end: usize) -> Option<RowShape> {
    let bytes = subject.as_bytes();
    if bytes[at] != b'|' {
        return None;
    }
    let mut cells = Vec::new();
    let mut pipe = at;
    loop {
        let cell_start = pipe + 1;
        let mut i = cell_start;
        let mut fence: Option<usize> = None;
        while i < content_end {
            match bytes[i] {
                b'\\' if fence.is_none() => i += 2,
                b'`' => {
                    let run = bytes[i..content_end]
                        .iter()
                        .take_while(|&&b| b == b'`')
                        .count();
                    match fence {
                        None => fence = Some(run),
                        Some(open) if open == run => fence = None,
                        Some(_) => {}
                    }
                    i += run;
                }
                b'|' if fence.is_none() => break,
                _ => i += 1,
            }
        }
        if i >= content_end {
            // no closing pipe: the row is rolled back wholesale
            return None;
        }
        cells.push(trim_cell(bytes, pipe, cell_start, i));
        // the row ends at a pipe followed by nothing but whitespace
        let mut rest = i + 1;
        while rest < content_end && matches!(bytes[rest], b' ' | b'\t') {
            rest += 1;
        }
        if rest >= content_end {
            return Some(classify(subject, cells, i));
        }
        pipe = i;
    }
}

/// Trim surrounding whitespace; `limit` is the closing pipe. An all-space
/// cell comes out empty (`end < start`).
fn trim_cell(bytes: &[u8], pipe: usize, mut start: usize, limit: usize) -> CellSpan {
    let mut end = limit;
    while start < end && matches!(bytes[start], b' ' | b'\t') {
        start += 1;
    }
    while end > start && matches!(bytes[end - 1], b' ' | b'\t') {
        end -= 1;
    }
    CellSpan {
        pipe,
        start,
        end: end - 1,
    }
}

fn classify(subject: &str, cells: Vec<CellSpan>, last_pipe: usize) -> RowShape {
    let mut aligns = Vec::with_capacity(cells.len());
    for cell in &cells {
        match separator_alignment(subject, cell) {
            Some(align) => aligns.push(align),
            None => {
                return RowShape::Cells { cells, last_pipe };
            }
        }
    }
    RowShape::Separator { aligns }
}

/// `-`, `:-`, `-:` or `:-:` between pipes.
fn separator_alignment(subject: &str, cell: &CellSpan) -> Option<Alignment> {
    if cell.end < cell.start {
        return None;
    }
    let content = subject[cell.start..=cell.end].as_bytes();
    let left = content.first() == Some(&b':');
    let right = content.len() > 1 && content.last() == Some(&b':');
    let dashes = &content[usize::from(left)..content.len() - usize::from(right)];
    if dashes.is_empty() || !dashes.iter().all(|&b| b == b'-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::Default,
    })
}

/// Emit a probed row into the event stream, or apply a separator row to
/// the table state.
pub(super) fn emit_row(p: &mut BlockParser, shape: RowShape) {
    match shape {
        RowShape::Separator { aligns } => {
            log::debug!("separator row fixes {} columns", aligns.len());
            let prev = {
                let Some(Container {
                    kind:
                        ContainerKind::Table {
                            aligns: table_aligns,
                            prev_row,
                        },
                    ..
                }) = p.containers.last_mut()
                else {
                    unreachable!("separator row outside a table");
                };
                *table_aligns = aligns.clone();
                prev_row.take()
            };
            if let Some((first, last)) = prev {
                promote_head_row(&mut p.events[first..=last], &aligns);
            }
        }
        RowShape::Cells { cells, last_pipe } => {
            let aligns = match p.containers.last().map(|c| &c.kind) {
                Some(ContainerKind::Table { aligns, .. }) => aligns.clone(),
                _ => unreachable!("row outside a table"),
            };
            let first = p.events.len();
            let row_start = cells.first().map(|c| c.pipe).unwrap_or(last_pipe);
            p.events.push(Event::with_data(
                row_start,
                row_start,
                Annot::Enter(SpanKind::Row),
                EventData::Row { head: false },
            ));
            for (index, cell) in cells.iter().enumerate() {
                let align = aligns.get(index).copied().unwrap_or_default();
                let data = EventData::Cell { head: false, align };
                p.events.push(Event::with_data(
                    cell.pipe,
                    cell.pipe,
                    Annot::Enter(SpanKind::Cell),
                    data,
                ));
                if cell.start <= cell.end {
                    let mut inline = InlineParser::new(p.subject);
                    inline.feed(cell.start, cell.end);
                    let events = inline.finish(&mut p.warnings);
                    p.events.extend(events);
                }
                let close_pipe = cells
                    .get(index + 1)
                    .map(|next| next.pipe)
                    .unwrap_or(last_pipe);
                p.events.push(Event::with_data(
                    close_pipe,
                    close_pipe,
                    Annot::Exit(SpanKind::Cell),
                    data,
                ));
            }
            p.events.push(Event::with_data(
                last_pipe,
                last_pipe,
                Annot::Exit(SpanKind::Row),
                EventData::Row { head: false },
            ));
            let last = p.events.len() - 1;
            if let Some(Container {
                kind: ContainerKind::Table { prev_row, .. },
                ..
            }) = p.containers.last_mut()
            {
                *prev_row = Some((first, last));
            }
        }
    }
}

fn promote_head_row(events: &mut [Event], aligns: &[Alignment]) {
    let mut cell_index = 0usize;
    for event in events {
        match (&event.annot, &mut event.data) {
            (Annot::Enter(SpanKind::Row) | Annot::Exit(SpanKind::Row), EventData::Row { head }) => {
                *head = true;
            }
            (Annot::Enter(SpanKind::Cell), EventData::Cell { head, align }) => {
                *head = true;
                *align = aligns.get(cell_index).copied().unwrap_or_default();
            }
            (Annot::Exit(SpanKind::Cell), EventData::Cell { head, align }) => {
                *head = true;
                *align = aligns.get(cell_index).copied().unwrap_or_default();
                cell_index += 1;
            }
            _ => {}
        }
    }
}
