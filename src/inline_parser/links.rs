//! Brackets: links, images, reference links, attributed spans, footnote
//! references, and destination-literal mode for `](...)`.

use crate::events::{Annot, AtomKind, Event, EventData, SpanKind};
use crate::inline_parser::InlineParser;
use crate::inline_parser::attributes::AttrSpan;
use crate::inline_parser::openers::{DelimKey, Opener, SubBracket};
use crate::patterns::{self, FOOTNOTE_REFERENCE};

/// Handle `[`: a `[^label]` footnote reference completes immediately;
/// otherwise push a link opener with a provisional literal bracket.
pub(super) fn open_bracket(p: &mut InlineParser, pos: usize, end: usize) -> usize {
    if let Some(m) = patterns::anchored(&FOOTNOTE_REFERENCE, p.subject, pos, end + 1) {
        p.events.push(Event::new(
            m.start,
            m.end,
            Annot::Atom(AtomKind::FootnoteReference),
        ));
        return m.end + 1;
    }
    let event_index = p.events.len();
    p.events
        .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
    p.openers
        .push(DelimKey::Bracket, Opener::new(pos, pos, event_index));
    pos + 1
}

/// Handle `!`: only special directly before `[`, where it marks the
/// bracket as image text.
pub(super) fn open_image(p: &mut InlineParser, pos: usize, _end: usize) -> usize {
    if p.byte_at(pos + 1) == Some(b'[') {
        let event_index = p.events.len();
        p.events
            .push(Event::new(pos, pos + 1, Annot::Atom(AtomKind::Str)));
        let mut opener = Opener::new(pos, pos + 1, event_index);
        opener.image = true;
        p.openers.push(DelimKey::Bracket, opener);
        return pos + 2;
    }
    p.events
        .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
    pos + 1
}

/// Handle `]` against the top bracket opener.
pub(super) fn close_bracket(p: &mut InlineParser, pos: usize, _end: usize) -> usize {
    let Some(opener) = p.openers.last(DelimKey::Bracket).cloned() else {
        p.events
            .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
        return pos + 1;
    };

    let text_kind = if opener.image {
        SpanKind::ImageText
    } else {
        SpanKind::LinkText
    };

    if opener.reference
        && let Some(sub) = opener.sub
    {
        // `[text][label]`: promote the recorded pieces and downgrade the
        // label interior to literal text.
        log::trace!("resolving reference link at {pos}");
        p.events[opener.event_index] =
            Event::new(opener.start, opener.end, Annot::Enter(text_kind));
        p.events[sub.close_index] =
            Event::new(sub.close_pos, sub.close_pos, Annot::Exit(text_kind));
        p.events[sub.open_index] = Event::new(
            sub.open_pos,
            sub.open_pos,
            Annot::Enter(SpanKind::Reference),
        );
        for event in &mut p.events[sub.open_index + 1..] {
            event.annot = Annot::Atom(AtomKind::Str);
            event.data = EventData::None;
        }
        p.events
            .push(Event::new(pos, pos, Annot::Exit(SpanKind::Reference)));
        p.openers.pop(DelimKey::Bracket);
        p.openers.invalidate_enclosed(opener.start, pos);
        return pos + 1;
    }

    match p.byte_at(pos + 1) {
        Some(b'[') => {
            // candidate reference link: remember the `][` pair
            let close_index = p.events.len();
            p.events
                .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
            let open_index = p.events.len();
            p.events
                .push(Event::new(pos + 1, pos + 1, Annot::Atom(AtomKind::Str)));
            if let Some(opener) = p.openers.last_mut(DelimKey::Bracket) {
                opener.reference = true;
                opener.sub = Some(SubBracket {
                    close_index,
                    close_pos: pos,
                    open_index,
                    open_pos: pos + 1,
                });
            }
            pos + 2
        }
        Some(b'(') => {
            // explicit link: text span resolves now, destination follows
            log::trace!("entering destination mode at {pos}");
            p.events[opener.event_index] =
                Event::new(opener.start, opener.end, Annot::Enter(text_kind));
            p.events
                .push(Event::new(pos, pos, Annot::Exit(text_kind)));
            p.events.push(Event::new(
                pos + 1,
                pos + 1,
                Annot::Enter(SpanKind::Destination),
            ));
            p.openers.pop(DelimKey::Bracket);
            p.openers.invalidate_enclosed(opener.start, pos);
            p.openers.clear(DelimKey::Paren);
            p.destination = true;
            pos + 2
        }
        Some(b'{') => {
            // bare attributed span; un-promoted again if the attributes
            // turn out malformed
            p.events[opener.event_index] =
                Event::new(opener.start, opener.end, Annot::Enter(SpanKind::Span));
            let exit_index = p.events.len();
            p.events
                .push(Event::new(pos, pos, Annot::Exit(SpanKind::Span)));
            p.openers.pop(DelimKey::Bracket);
            p.openers.invalidate_enclosed(opener.start, pos);
            p.attributes = Some(AttrSpan::for_span(pos + 1, opener.event_index, exit_index));
            pos + 1
        }
        _ => {
            p.events
                .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
            pos + 1
        }
    }
}

/// Scan inside `](...)`: nested parens balance via their own opener stack,
/// backslash escapes apply, and everything else is literal.
pub(super) fn step_destination(p: &mut InlineParser, pos: usize, end: usize) -> usize {
    let bytes = p.subject.as_bytes();
    let mut i = pos;
    while i <= end {
        match bytes[i] {
            b'\\' | b'(' | b')' | b'\r' | b'\n' => break,
            _ => i += 1,
        }
    }
    if i > pos {
        p.events
            .push(Event::new(pos, i - 1, Annot::Atom(AtomKind::Str)));
    }
    if i > end {
        return end + 1;
    }
    match bytes[i] {
        b'\\' => {
            if p.byte_at(i + 1).is_some_and(|b| b.is_ascii_punctuation()) {
                p.events
                    .push(Event::new(i, i, Annot::Atom(AtomKind::Escape)));
                p.events
                    .push(Event::new(i + 1, i + 1, Annot::Atom(AtomKind::Str)));
                i + 2
            } else {
                p.events
                    .push(Event::new(i, i, Annot::Atom(AtomKind::Str)));
                i + 1
            }
        }
        b'(' => {
            let event_index = p.events.len();
            p.events
                .push(Event::new(i, i, Annot::Atom(AtomKind::Str)));
            p.openers
                .push(DelimKey::Paren, Opener::new(i, i, event_index));
            i + 1
        }
        b')' => {
            if p.openers.pop(DelimKey::Paren).is_some() {
                p.events
                    .push(Event::new(i, i, Annot::Atom(AtomKind::Str)));
            } else {
                p.events
                    .push(Event::new(i, i, Annot::Exit(SpanKind::Destination)));
                p.destination = false;
            }
            i + 1
        }
        _ => {
            // line break inside the destination
            let break_end = if bytes[i] == b'\r' && p.byte_at(i + 1) == Some(b'\n') {
                i + 1
            } else {
                i
            };
            p.events
                .push(Event::new(i, break_end, Annot::Atom(AtomKind::Softbreak)));
            break_end + 1
        }
    }
}
