//! The shared between-matched routine for generic paired delimiters
//! (`~ ^ _ * ' " + = -`), with `{`/`}` open and close markers.

use crate::events::{Annot, AtomKind, Event, SpanKind};
use crate::inline_parser::InlineParser;
use crate::inline_parser::openers::{DelimKey, Opener};

/// The literal form a delimiter falls back to when it neither opens nor
/// closes. Quote characters keep a left/right pair so typographic quoting
/// degrades to the right form (apostrophes) by default.
#[derive(Debug, Clone, Copy)]
pub(super) enum DefaultMatch {
    Str,
    Quote { left: AtomKind, right: AtomKind },
}

/// Handle one generic delimiter at `pos`. Decides can-open (next code point
/// is non-space), can-close (previous code point is non-space), applies
/// explicit `{`/`}` marker overrides, then either resolves against the top
/// opener of the delimiter's stack, pushes a new opener with a provisional
/// literal event, or emits the literal form.
pub(super) fn between_matched(
    p: &mut InlineParser,
    pos: usize,
    delim: u8,
    kind: SpanKind,
    default: DefaultMatch,
) -> usize {
    let key = DelimKey::from_delimiter(delim);
    let has_open_marker = pos > 0 && p.open_marker_at == Some(pos - 1);
    let has_close_marker = p.byte_at(pos + 1) == Some(b'}');

    let mut can_open = p.char_after(pos).is_some_and(|c| !c.is_whitespace());
    let mut can_close = p.char_before(pos).is_some_and(|c| !c.is_whitespace());

    let mut opener_start = pos;
    let mut closer_end = pos;
    if has_open_marker {
        can_open = true;
        can_close = false;
        opener_start = pos - 1;
    } else if has_close_marker {
        can_close = true;
        can_open = false;
        closer_end = pos + 1;
    }

    if can_close
        && let Some(opener) = p.openers.last(key).cloned()
        && opener.end + 1 != pos
    {
        log::trace!("closing {} span at {pos}", kind.name());
        p.events[opener.event_index] =
            Event::new(opener.start, opener.end, Annot::Enter(kind));
        p.events
            .push(Event::new(pos, closer_end, Annot::Exit(kind)));
        p.openers.pop(key);
        p.openers.invalidate_enclosed(opener.start, closer_end);
        return closer_end + 1;
    }

    if can_open {
        let annot = match default {
            DefaultMatch::Str => Annot::Atom(AtomKind::Str),
            DefaultMatch::Quote { left, right } => {
                if has_open_marker {
                    Annot::Atom(left)
                } else {
                    Annot::Atom(right)
                }
            }
        };
        let event_index = p.events.len();
        p.events.push(Event::new(opener_start, pos, annot));
        p.openers
            .push(key, Opener::new(opener_start, pos, event_index));
        return pos + 1;
    }

    // neither side matched: literal form
    let annot = match default {
        DefaultMatch::Str => Annot::Atom(AtomKind::Str),
        DefaultMatch::Quote { left, right } => {
            if has_open_marker {
                Annot::Atom(left)
            } else {
                Annot::Atom(right)
            }
        }
    };
    p.events.push(Event::new(opener_start, pos, annot));
    pos + 1
}
