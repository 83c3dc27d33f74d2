//! Smart punctuation: ellipses and the hyphen-run dash decomposition.

use crate::events::{Annot, AtomKind, Event, SpanKind};
use crate::inline_parser::InlineParser;
use crate::inline_parser::emphasis::{DefaultMatch, between_matched};
use crate::inline_parser::openers::DelimKey;

/// Handle `.`: three periods form an ellipsis.
pub(super) fn periods(p: &mut InlineParser, pos: usize, _end: usize) -> usize {
    if p.byte_at(pos + 1) == Some(b'.') && p.byte_at(pos + 2) == Some(b'.') {
        p.events
            .push(Event::new(pos, pos + 2, Annot::Atom(AtomKind::Ellipsis)));
        return pos + 3;
    }
    p.events
        .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
    pos + 1
}

/// Handle a hyphen run at `pos`.
///
/// Adjacent to a brace the generic delimiter routine runs first, forming
/// `{- … -}` delete spans. Otherwise the run decomposes into dashes: a run
/// followed by `}` keeps its last hyphen for the closing delete marker
/// (a run reduced to zero is the literal two-byte pair), and the rest is
/// consumed front-to-back as em-dashes (multiples of 3), en-dashes
/// (multiples of 2), then greedy em/en/literal.
pub(super) fn hyphens(p: &mut InlineParser, pos: usize, _end: usize) -> usize {
    if pos > 0 && p.open_marker_at == Some(pos - 1) {
        return between_matched(p, pos, b'-', SpanKind::Delete, DefaultMatch::Str);
    }

    let mut run = p.byte_run(pos, b'-');
    if p.byte_at(pos + run) == Some(b'}') {
        if run == 1 {
            if !p.openers.is_empty(DelimKey::BracedHyphen) {
                return between_matched(p, pos, b'-', SpanKind::Delete, DefaultMatch::Str);
            }
            p.events
                .push(Event::new(pos, pos + 1, Annot::Atom(AtomKind::Str)));
            return pos + 2;
        }
        // the final hyphen belongs to the `-}` closer, handled next step
        run -= 1;
    }

    let mut at = pos;
    let mut remaining = run;
    while remaining > 0 {
        if remaining % 3 == 0 {
            p.events
                .push(Event::new(at, at + 2, Annot::Atom(AtomKind::EmDash)));
            at += 3;
            remaining -= 3;
        } else if remaining % 2 == 0 {
            p.events
                .push(Event::new(at, at + 1, Annot::Atom(AtomKind::EnDash)));
            at += 2;
            remaining -= 2;
        } else if remaining >= 3 {
            p.events
                .push(Event::new(at, at + 2, Annot::Atom(AtomKind::EmDash)));
            at += 3;
            remaining -= 3;
        } else {
            p.events
                .push(Event::new(at, at, Annot::Atom(AtomKind::Str)));
            at += 1;
            remaining -= 1;
        }
    }
    at
}

#[cfg(test)]
mod tests {
    use crate::inline_parser::InlineParser;

    fn annots(src: &str) -> Vec<(String, usize, usize)> {
        let mut p = InlineParser::new(src);
        p.feed(0, src.len() - 1);
        let mut warnings = Vec::new();
        p.finish(&mut warnings)
            .into_iter()
            .map(|e| (e.annotation(), e.start, e.end))
            .collect()
    }

    #[test]
    fn dash_decomposition() {
        assert_eq!(
            annots("a---b--c"),
            vec![
                ("str".into(), 0, 0),
                ("em_dash".into(), 1, 3),
                ("str".into(), 4, 4),
                ("en_dash".into(), 5, 6),
                ("str".into(), 7, 7),
            ]
        );
    }

    #[test]
    fn four_hyphens_are_two_en_dashes() {
        assert_eq!(
            annots("x----y"),
            vec![
                ("str".into(), 0, 0),
                ("en_dash".into(), 1, 2),
                ("en_dash".into(), 3, 4),
                ("str".into(), 5, 5),
            ]
        );
    }

    #[test]
    fn five_hyphens_are_em_then_en() {
        assert_eq!(
            annots("-----"),
            vec![("em_dash".into(), 0, 2), ("en_dash".into(), 3, 4)]
        );
    }

    #[test]
    fn ellipsis() {
        assert_eq!(
            annots("well..."),
            vec![("str".into(), 0, 3), ("ellipsis".into(), 4, 6)]
        );
    }

    #[test]
    fn delete_span_with_inner_dashes() {
        assert_eq!(
            annots("{-a--b-}"),
            vec![
                ("+delete".into(), 0, 1),
                ("str".into(), 2, 2),
                ("en_dash".into(), 3, 4),
                ("str".into(), 5, 5),
                ("-delete".into(), 6, 7),
            ]
        );
    }
}
