//! Backtick verbatim spans and `$`/`$$`-prefixed math spans.
//!
//! A span opened by a run of n backticks is closed only by a run of exactly
//! n backticks; runs of any other length are literal content. A closed
//! verbatim (not math) span immediately followed by `{=format}` becomes a
//! raw span.

use crate::events::{Annot, AtomKind, Event, SpanKind};
use crate::inline_parser::InlineParser;
use crate::patterns::{self, RAW_FORMAT};

#[derive(Debug, Clone, Copy)]
pub(super) struct Verbatim {
    pub kind: SpanKind,
    /// Required closing run length.
    pub fence: usize,
}

/// Handle a `$` run. A run of one or two dollars directly before a backtick
/// is remembered as a math prefix and consumed silently; anything else is
/// literal text.
pub(super) fn dollars(p: &mut InlineParser, pos: usize, _end: usize) -> usize {
    let run = p.byte_run(pos, b'$');
    if run <= 2 && p.byte_at(pos + run) == Some(b'`') {
        p.pending_math = Some((pos, run));
        return pos + run;
    }
    p.events
        .push(Event::new(pos, pos + run - 1, Annot::Atom(AtomKind::Str)));
    pos + run
}

/// Open a verbatim or math span at a backtick run.
pub(super) fn open_backtick(p: &mut InlineParser, pos: usize, _end: usize) -> usize {
    let run = p.byte_run(pos, b'`');
    let (kind, start) = match p.pending_math.take() {
        Some((dollar_pos, 1)) if dollar_pos + 1 == pos => (SpanKind::InlineMath, dollar_pos),
        Some((dollar_pos, 2)) if dollar_pos + 2 == pos => (SpanKind::DisplayMath, dollar_pos),
        _ => (SpanKind::Verbatim, pos),
    };
    log::trace!("opening {} at {start} (fence {run})", kind.name());
    p.events
        .push(Event::new(start, pos + run - 1, Annot::Enter(kind)));
    p.verbatim = Some(Verbatim { kind, fence: run });
    pos + run
}

/// Scan inside an open verbatim span: everything is literal until a backtick
/// run of exactly the opening length.
pub(super) fn step_verbatim(p: &mut InlineParser, pos: usize, end: usize) -> usize {
    let verbatim = p.verbatim.expect("inside a verbatim span");
    let bytes = p.subject.as_bytes();
    let mut i = pos;
    while i <= end {
        if bytes[i] == b'`' {
            let run = p.byte_run(i, b'`');
            if run == verbatim.fence {
                if i > pos {
                    p.events
                        .push(Event::new(pos, i - 1, Annot::Atom(AtomKind::Str)));
                }
                p.events
                    .push(Event::new(i, i + run - 1, Annot::Exit(verbatim.kind)));
                p.verbatim = None;
                let after = i + run;
                if verbatim.kind == SpanKind::Verbatim
                    && let Some(m) = patterns::anchored(&RAW_FORMAT, p.subject, after, end + 1)
                {
                    p.events
                        .push(Event::new(m.start, m.end, Annot::Atom(AtomKind::RawFormat)));
                    return m.end + 1;
                }
                return after;
            }
            i += run;
        } else {
            i += 1;
        }
    }
    if pos <= end {
        p.events
            .push(Event::new(pos, end, Annot::Atom(AtomKind::Str)));
    }
    end + 1
}
