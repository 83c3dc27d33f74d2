//! Angle-bracket autolinks: `<https://example.com>` and
//! `<user@example.com>`.

use crate::events::{Annot, AtomKind, Event, SpanKind};
use crate::inline_parser::InlineParser;
use crate::patterns::{self, AUTOLINK, URL_SCHEME};

/// Handle `<` at `pos`. The enclosed text is an email if it contains `@`
/// with no `:` anywhere before it, otherwise a URL if it starts with a
/// scheme; anything else leaves the `<` literal.
pub(super) fn angle(p: &mut InlineParser, pos: usize, end: usize) -> usize {
    if let Some(m) = patterns::anchored(&AUTOLINK, p.subject, pos, end + 1)
        && let Some((content_start, content_end)) = m.capture(1)
    {
        let content = &p.subject[content_start..=content_end];
        let kind = if let Some(at) = content.find('@')
            && !content[..at].contains(':')
        {
            Some(SpanKind::Email)
        } else if patterns::anchored(&URL_SCHEME, p.subject, content_start, content_end + 1)
            .is_some()
        {
            Some(SpanKind::Url)
        } else {
            None
        };
        if let Some(kind) = kind {
            p.events.push(Event::new(pos, pos, Annot::Enter(kind)));
            p.events.push(Event::new(
                content_start,
                content_end,
                Annot::Atom(AtomKind::Str),
            ));
            p.events.push(Event::new(m.end, m.end, Annot::Exit(kind)));
            return m.end + 1;
        }
    }
    p.events
        .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
    pos + 1
}
