//! Backslash escapes: hard breaks, non-breaking spaces, and literal
//! punctuation.

use crate::events::{Annot, AtomKind, Event};
use crate::inline_parser::InlineParser;

/// Handle a backslash at `pos`.
pub(super) fn backslash(p: &mut InlineParser, pos: usize, _end: usize) -> usize {
    match p.byte_at(pos + 1) {
        Some(b'\r') | Some(b'\n') => {
            // a hard break eats the spaces before the backslash
            trim_trailing_spaces(p);
            p.events
                .push(Event::new(pos, pos, Annot::Atom(AtomKind::Escape)));
            let break_end = if p.byte_at(pos + 1) == Some(b'\r') && p.byte_at(pos + 2) == Some(b'\n')
            {
                pos + 2
            } else {
                pos + 1
            };
            p.events
                .push(Event::new(pos + 1, break_end, Annot::Atom(AtomKind::Hardbreak)));
            break_end + 1
        }
        Some(b' ') => {
            p.events
                .push(Event::new(pos, pos, Annot::Atom(AtomKind::Escape)));
            p.events
                .push(Event::new(pos + 1, pos + 1, Annot::Atom(AtomKind::Nbsp)));
            pos + 2
        }
        Some(b) if b.is_ascii_punctuation() => {
            p.events
                .push(Event::new(pos, pos, Annot::Atom(AtomKind::Escape)));
            p.events
                .push(Event::new(pos + 1, pos + 1, Annot::Atom(AtomKind::Str)));
            pos + 2
        }
        _ => {
            p.events
                .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
            pos + 1
        }
    }
}

fn trim_trailing_spaces(p: &mut InlineParser) {
    let bytes = p.subject.as_bytes();
    let Some(last) = p.events.last() else { return };
    if last.annot != Annot::Atom(AtomKind::Str) || last.end < last.start {
        return;
    }
    let (start, orig_end) = (last.start, last.end);
    let mut end = orig_end;
    while end > start && matches!(bytes[end], b' ' | b'\t') {
        end -= 1;
    }
    if matches!(bytes[end], b' ' | b'\t') {
        p.events.pop();
    } else if end != orig_end
        && let Some(last) = p.events.last_mut()
    {
        last.end = end;
    }
}
