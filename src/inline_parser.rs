//! The inline parser.
//!
//! Each instance owns one subject string and is fed disjoint, increasing
//! spans as the block parser discovers inline-bearing lines; state (opener
//! stacks, open verbatim spans, pending attribute sub-parses) persists
//! across feeds within one container. Output is a flat list of positioned
//! events; resolution works by appending provisional literal events and
//! promoting them in place once a matching closer arrives, so scanning
//! never backtracks.

use crate::Warning;
use crate::events::{Annot, AtomKind, Event, SpanKind};

mod attributes;
mod autolinks;
mod emphasis;
mod escapes;
mod links;
mod openers;
mod shortcodes;
mod smart;
mod verbatim;

use attributes::AttrSpan;
use emphasis::{DefaultMatch, between_matched};
use openers::OpenerStacks;
use verbatim::Verbatim;

/// Bytes that interrupt a plain-text scan. Everything else is batched into
/// `str` events.
static SPECIAL: [bool; 256] = build_special_table();

const fn build_special_table() -> [bool; 256] {
    let mut table = [false; 256];
    let specials = [
        b'\r', b'\n', b'\'', b'"', b'(', b')', b'*', b'+', b'-', b'.', b':', b'<', b'=', b'[',
        b']', b'\\', b'^', b'_', b'`', b'{', b'}', b'~', b'!', b'$',
    ];
    let mut i = 0;
    while i < specials.len() {
        table[specials[i] as usize] = true;
        i += 1;
    }
    table
}

#[derive(Debug)]
pub(crate) struct InlineParser<'s> {
    pub(crate) subject: &'s str,
    pub(crate) events: Vec<Event>,
    openers: OpenerStacks,
    verbatim: Option<Verbatim>,
    destination: bool,
    attributes: Option<AttrSpan>,
    /// Position of a `{` silently consumed as an explicit open marker.
    open_marker_at: Option<usize>,
    /// A `$` run consumed as a math prefix for the backtick run behind it.
    pending_math: Option<(usize, usize)>,
    /// Highest position fed so far.
    last: usize,
}

impl<'s> InlineParser<'s> {
    pub(crate) fn new(subject: &'s str) -> Self {
        Self {
            subject,
            events: Vec::new(),
            openers: OpenerStacks::default(),
            verbatim: None,
            destination: false,
            attributes: None,
            open_marker_at: None,
            pending_math: None,
            last: 0,
        }
    }

    /// Feed the span `start..=end`. Feeds must be disjoint and increasing.
    pub(crate) fn feed(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end < self.subject.len());
        let mut pos = start;
        while pos <= end {
            pos = self.step(pos, end);
        }
        self.last = end;
    }

    fn step(&mut self, pos: usize, end: usize) -> usize {
        if self.verbatim.is_some() {
            return verbatim::step_verbatim(self, pos, end);
        }
        if self.attributes.is_some() {
            return attributes::step_attributes(self, pos, end);
        }
        if self.destination {
            return links::step_destination(self, pos, end);
        }

        let bytes = self.subject.as_bytes();
        let mut special = pos;
        while special <= end && !SPECIAL[bytes[special] as usize] {
            special += 1;
        }
        if special > pos {
            self.events
                .push(Event::new(pos, special - 1, Annot::Atom(AtomKind::Str)));
        }
        if special > end {
            return end + 1;
        }

        let pos = special;
        match bytes[pos] {
            b'\r' | b'\n' => {
                let break_end = if bytes[pos] == b'\r' && self.byte_at(pos + 1) == Some(b'\n') {
                    pos + 1
                } else {
                    pos
                };
                self.events
                    .push(Event::new(pos, break_end, Annot::Atom(AtomKind::Softbreak)));
                break_end + 1
            }
            b'\\' => escapes::backslash(self, pos, end),
            b'`' => verbatim::open_backtick(self, pos, end),
            b'$' => verbatim::dollars(self, pos, end),
            b'<' => autolinks::angle(self, pos, end),
            b'[' => links::open_bracket(self, pos, end),
            b'!' => links::open_image(self, pos, end),
            b']' => links::close_bracket(self, pos, end),
            b'{' => self.open_brace(pos),
            b':' => shortcodes::colon(self, pos, end),
            b'.' => smart::periods(self, pos, end),
            b'-' => smart::hyphens(self, pos, end),
            b'_' => between_matched(self, pos, b'_', SpanKind::Emph, DefaultMatch::Str),
            b'*' => between_matched(self, pos, b'*', SpanKind::Strong, DefaultMatch::Str),
            b'^' => between_matched(self, pos, b'^', SpanKind::Superscript, DefaultMatch::Str),
            b'~' => between_matched(self, pos, b'~', SpanKind::Subscript, DefaultMatch::Str),
            b'+' => between_matched(self, pos, b'+', SpanKind::Insert, DefaultMatch::Str),
            b'=' => between_matched(self, pos, b'=', SpanKind::Mark, DefaultMatch::Str),
            b'\'' => between_matched(
                self,
                pos,
                b'\'',
                SpanKind::SingleQuoted,
                DefaultMatch::Quote {
                    left: AtomKind::LeftSingleQuote,
                    right: AtomKind::RightSingleQuote,
                },
            ),
            b'"' => between_matched(
                self,
                pos,
                b'"',
                SpanKind::DoubleQuoted,
                DefaultMatch::Quote {
                    left: AtomKind::LeftDoubleQuote,
                    right: AtomKind::RightDoubleQuote,
                },
            ),
            b'}' | b'(' | b')' => {
                self.events
                    .push(Event::new(pos, pos, Annot::Atom(AtomKind::Str)));
                pos + 1
            }
            b => unreachable!("byte {b:#x} marked special without a handler"),
        }
    }

    /// A `{` directly before a generic delimiter is an explicit open
    /// marker; anything else starts an attribute sub-parse.
    fn open_brace(&mut self, pos: usize) -> usize {
        if self
            .byte_at(pos + 1)
            .is_some_and(|b| matches!(b, b'_' | b'*' | b'~' | b'^' | b'+' | b'=' | b'\'' | b'"' | b'-'))
        {
            self.open_marker_at = Some(pos);
            return pos + 1;
        }
        self.attributes = Some(AttrSpan::at(pos));
        pos
    }

    /// Finalize: resolve pending sub-parses, drop the trailing soft break
    /// and trailing spaces, synthesize closers for unclosed spans, and hand
    /// back the event list.
    pub(crate) fn finish(&mut self, warnings: &mut Vec<Warning>) -> Vec<Event> {
        let last = self.last;
        attributes::finish_attributes(self, last);
        if self.destination {
            self.events.push(Event::new(
                self.last + 1,
                self.last,
                Annot::Exit(SpanKind::Destination),
            ));
            self.destination = false;
            warnings.push(Warning::new("unclosed link destination", Some(self.last)));
        }
        if let Some(verbatim) = self.verbatim.take() {
            self.events.push(Event::new(
                self.last + 1,
                self.last,
                Annot::Exit(verbatim.kind),
            ));
            warnings.push(Warning::new(
                match verbatim.kind {
                    SpanKind::Verbatim => "unclosed verbatim span",
                    _ => "unclosed math span",
                },
                Some(self.last),
            ));
        }
        if let Some(last) = self.events.last()
            && last.annot == Annot::Atom(AtomKind::Softbreak)
        {
            self.events.pop();
        }
        self.trim_trailing_text();
        std::mem::take(&mut self.events)
    }

    fn trim_trailing_text(&mut self) {
        let bytes = self.subject.as_bytes();
        loop {
            let Some(last) = self.events.last() else { return };
            if last.annot != Annot::Atom(AtomKind::Str) || last.is_zero_width() {
                return;
            }
            let (start, orig_end) = (last.start, last.end);
            let mut end = orig_end;
            while end > start && matches!(bytes[end], b' ' | b'\t') {
                end -= 1;
            }
            if matches!(bytes[end], b' ' | b'\t') {
                self.events.pop();
                continue;
            }
            if end != orig_end
                && let Some(last) = self.events.last_mut()
            {
                last.end = end;
            }
            return;
        }
    }

    pub(crate) fn byte_at(&self, pos: usize) -> Option<u8> {
        self.subject.as_bytes().get(pos).copied()
    }

    /// Length of the run of `byte` starting at `pos`.
    pub(crate) fn byte_run(&self, pos: usize, byte: u8) -> usize {
        self.subject.as_bytes()[pos..]
            .iter()
            .take_while(|&&b| b == byte)
            .count()
    }

    fn char_before(&self, pos: usize) -> Option<char> {
        self.subject[..pos].chars().next_back()
    }

    fn char_after(&self, pos: usize) -> Option<char> {
        // the delimiter at `pos` is a single byte
        self.subject[pos + 1..].chars().next()
    }
}

#[cfg(test)]
mod tests {
    use super::InlineParser;

    fn annots(src: &str) -> Vec<(String, usize, usize)> {
        let mut p = InlineParser::new(src);
        p.feed(0, src.len() - 1);
        let mut warnings = Vec::new();
        p.finish(&mut warnings)
            .into_iter()
            .map(|e| (e.annotation(), e.start, e.end))
            .collect()
    }

    fn names(src: &str) -> Vec<String> {
        annots(src).into_iter().map(|(n, _, _)| n).collect()
    }

    #[test]
    fn nested_emphasis() {
        assert_eq!(
            annots("_hello *there*_ world"),
            vec![
                ("+emph".into(), 0, 0),
                ("str".into(), 1, 6),
                ("+strong".into(), 7, 7),
                ("str".into(), 8, 12),
                ("-strong".into(), 13, 13),
                ("-emph".into(), 14, 14),
                ("str".into(), 15, 20),
            ]
        );
    }

    #[test]
    fn unmatched_delimiters_stay_literal() {
        assert_eq!(names("a _b c"), ["str", "str", "str"]);
        assert_eq!(names("_ b_"), ["str", "str", "str"]);
    }

    #[test]
    fn empty_span_does_not_resolve() {
        assert_eq!(names("a __ b"), ["str", "str", "str", "str"]);
    }

    #[test]
    fn braced_delimiters_override_flanking() {
        assert_eq!(
            annots("{_ hello _}"),
            vec![
                ("+emph".into(), 0, 1),
                ("str".into(), 2, 8),
                ("-emph".into(), 9, 10),
            ]
        );
    }

    #[test]
    fn enclosed_openers_are_invalidated() {
        // the inner `*` opener dies with the emphasis span; the later `*`
        // cannot pair with it
        assert_eq!(
            names("_a *b_ c* d"),
            ["+emph", "str", "str", "str", "-emph", "str", "str", "str"]
        );
    }

    #[test]
    fn verbatim_needs_exact_run() {
        assert_eq!(
            annots("``a ` b``"),
            vec![
                ("+verbatim".into(), 0, 1),
                ("str".into(), 2, 6),
                ("-verbatim".into(), 7, 8),
            ]
        );
    }

    #[test]
    fn unclosed_verbatim_synthesizes_closer() {
        let src = "`code";
        let mut p = InlineParser::new(src);
        p.feed(0, src.len() - 1);
        let mut warnings = Vec::new();
        let events = p.finish(&mut warnings);
        assert_eq!(events.last().map(|e| e.annotation()), Some("-verbatim".into()));
        assert!(events.last().is_some_and(|e| e.is_zero_width()));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn inline_and_display_math() {
        assert_eq!(
            annots("$`x`"),
            vec![
                ("+inline_math".into(), 0, 1),
                ("str".into(), 2, 2),
                ("-inline_math".into(), 3, 3),
            ]
        );
        assert_eq!(
            annots("$$`x+y`"),
            vec![
                ("+display_math".into(), 0, 2),
                ("str".into(), 3, 5),
                ("-display_math".into(), 6, 6),
            ]
        );
    }

    #[test]
    fn raw_format_after_verbatim() {
        assert_eq!(
            names("`<b>`{=html}"),
            ["+verbatim", "str", "-verbatim", "raw_format"]
        );
        // math spans never become raw: the `{=` reads as an open marker for
        // a mark span that never closes
        assert_eq!(
            names("$`x`{=html}"),
            ["+inline_math", "str", "-inline_math", "str", "str", "str"]
        );
    }

    #[test]
    fn explicit_link() {
        assert_eq!(
            annots("[a](b)"),
            vec![
                ("+linktext".into(), 0, 0),
                ("str".into(), 1, 1),
                ("-linktext".into(), 2, 2),
                ("+destination".into(), 3, 3),
                ("str".into(), 4, 4),
                ("-destination".into(), 5, 5),
            ]
        );
    }

    #[test]
    fn image_link() {
        assert_eq!(
            names("![alt](x)"),
            [
                "+imagetext",
                "str",
                "-imagetext",
                "+destination",
                "str",
                "-destination"
            ]
        );
    }

    #[test]
    fn destination_balances_parens() {
        assert_eq!(
            names("[a](b(c)d)"),
            [
                "+linktext",
                "str",
                "-linktext",
                "+destination",
                "str",
                "str",
                "str",
                "str",
                "str",
                "-destination"
            ]
        );
    }

    #[test]
    fn reference_link_reclassifies_label() {
        assert_eq!(
            annots("[a][b c]"),
            vec![
                ("+linktext".into(), 0, 0),
                ("str".into(), 1, 1),
                ("-linktext".into(), 2, 2),
                ("+reference".into(), 3, 3),
                ("str".into(), 4, 6),
                ("-reference".into(), 7, 7),
            ]
        );
    }

    #[test]
    fn footnote_reference() {
        assert_eq!(names("see[^note]"), ["str", "footnote_reference"]);
    }

    #[test]
    fn attributed_span() {
        assert_eq!(
            names("[x]{.cls}"),
            [
                "+span",
                "str",
                "-span",
                "+attributes",
                "class_marker",
                "class",
                "-attributes"
            ]
        );
    }

    #[test]
    fn failed_span_attributes_revert() {
        assert_eq!(names("[x]{|}"), ["str", "str", "str", "str", "str", "str"]);
    }

    #[test]
    fn autolinks() {
        assert_eq!(names("<https://x.y>"), ["+url", "str", "-url"]);
        assert_eq!(names("<a@b.c>"), ["+email", "str", "-email"]);
        assert_eq!(names("<mailto:a@b>"), ["+url", "str", "-url"]);
        assert_eq!(names("a < b"), ["str", "str", "str"]);
    }

    #[test]
    fn escapes() {
        assert_eq!(names("a\\*b"), ["str", "escape", "str", "str"]);
        assert_eq!(names("a\\ b"), ["str", "escape", "nbsp", "str"]);
    }

    #[test]
    fn hard_break_trims_spaces() {
        let src = "a  \\\nb";
        assert_eq!(
            annots(src),
            vec![
                ("str".into(), 0, 0),
                ("escape".into(), 3, 3),
                ("hardbreak".into(), 4, 4),
                ("str".into(), 5, 5),
            ]
        );
    }

    #[test]
    fn symbols() {
        assert_eq!(names("a :+1: b"), ["str", "symbol", "str"]);
        assert_eq!(names("a : b"), ["str", "str", "str"]);
    }

    #[test]
    fn quotes() {
        assert_eq!(names("'a'"), ["+single_quoted", "str", "-single_quoted"]);
        assert_eq!(names("don't"), ["str", "right_single_quote", "str"]);
        assert_eq!(names("{'tis"), ["left_single_quote", "str"]);
    }

    #[test]
    fn word_attributes() {
        assert_eq!(
            names("word{#id}"),
            ["str", "+attributes", "id_marker", "id", "-attributes"]
        );
        assert_eq!(names("a {b c}"), ["str", "str", "str", "str"]);
    }
}
