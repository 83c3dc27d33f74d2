//! Incremental parsing for curly-brace attribute syntax:
//! `{#id .class key=val key="quoted value" %comment%}`
//!
//! The parser is a character-at-a-time state machine that can be fed one
//! slice per line, so an attribute block may span several lines and a quoted
//! value may contain a line break (the whitespace collapses to a single
//! space when the value spans are consumed, not during scanning). Token
//! spans accumulate inside the parser and are spliced into the caller's
//! event stream once the closing brace has been seen.
//!
//! Rules:
//! - Surrounded by `{ }`
//! - Identifier: `#id`
//! - Classes: `.class` (any number)
//! - Key-value pairs: `key=value` or `key="value"`; repeated `value` spans
//!   for one key concatenate
//! - Comments: `%...%`, emitting nothing
//! - `\"` inside a quoted value escapes the quote

use crate::events::{Annot, AtomKind, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Scanning,
    ScanningId,
    ScanningClass,
    ScanningKey,
    ScanningValue,
    ScanningBareValue,
    ScanningQuotedValue,
    /// Quoted value resuming after a line break.
    ScanningQuotedValueCont,
    ScanningEscaped,
    /// Backslash was the last code point of the previous slice.
    ScanningEscapedCont,
    ScanningComment,
    Done,
    Fail,
}

/// Result of one `feed` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    /// The closing `}` was consumed; `position` points at it.
    Done { position: usize },
    /// The code point at `position` cannot continue any attribute
    /// production; the caller must reinterpret everything fed so far as
    /// ordinary text.
    Fail { position: usize },
    /// The slice ended mid-construct; feed more input.
    Continue,
}

#[derive(Debug)]
pub(crate) struct AttributeParser {
    state: State,
    /// Start of the pending token (or whitespace run, in `Scanning`).
    begin: Option<usize>,
    events: Vec<Event>,
}

fn is_name(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':')
}

impl AttributeParser {
    pub(crate) fn new() -> Self {
        Self {
            state: State::Start,
            begin: None,
            events: Vec::new(),
        }
    }

    /// The token spans recognized so far, in source order.
    pub(crate) fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, kind: AtomKind, start: usize, end: usize) {
        self.events.push(Event::new(start, end, Annot::Atom(kind)));
    }

    /// Emit the pending token ending just before `pos`, if any.
    fn flush(&mut self, kind: AtomKind, pos: usize) {
        if let Some(begin) = self.begin.take()
            && begin < pos
        {
            self.emit(kind, begin, pos - 1);
        }
    }

    /// Advance over `subject[start..=end]` one code point at a time.
    pub(crate) fn feed(&mut self, subject: &str, start: usize, end: usize) -> Status {
        debug_assert!(
            !matches!(self.state, State::Done | State::Fail),
            "feed after terminal state"
        );
        for (i, c) in subject[start..=end].char_indices() {
            let pos = start + i;
            match self.state {
                State::Start => {
                    if c == '{' {
                        self.state = State::Scanning;
                    } else {
                        self.state = State::Fail;
                        return Status::Fail { position: pos };
                    }
                }
                State::Scanning => {
                    if c.is_whitespace() {
                        if self.begin.is_none() {
                            self.begin = Some(pos);
                        }
                        continue;
                    }
                    self.flush(AtomKind::AttrSpace, pos);
                    match c {
                        '}' => {
                            self.state = State::Done;
                            return Status::Done { position: pos };
                        }
                        '#' => {
                            self.emit(AtomKind::IdMarker, pos, pos);
                            self.state = State::ScanningId;
                        }
                        '.' => {
                            self.emit(AtomKind::ClassMarker, pos, pos);
                            self.state = State::ScanningClass;
                        }
                        '%' => self.state = State::ScanningComment,
                        c if is_name(c) => {
                            self.begin = Some(pos);
                            self.state = State::ScanningKey;
                        }
                        _ => {
                            self.state = State::Fail;
                            return Status::Fail { position: pos };
                        }
                    }
                }
                State::ScanningId | State::ScanningClass => {
                    let kind = if self.state == State::ScanningId {
                        AtomKind::Id
                    } else {
                        AtomKind::Class
                    };
                    if is_name(c) {
                        if self.begin.is_none() {
                            self.begin = Some(pos);
                        }
                    } else if c.is_whitespace() {
                        self.flush(kind, pos);
                        self.begin = Some(pos);
                        self.state = State::Scanning;
                    } else if c == '}' {
                        self.flush(kind, pos);
                        self.state = State::Done;
                        return Status::Done { position: pos };
                    } else {
                        self.state = State::Fail;
                        return Status::Fail { position: pos };
                    }
                }
                State::ScanningKey => {
                    if is_name(c) {
                        // begin set on entry
                    } else if c == '=' {
                        self.flush(AtomKind::Key, pos);
                        self.emit(AtomKind::Assign, pos, pos);
                        self.state = State::ScanningValue;
                    } else {
                        self.state = State::Fail;
                        return Status::Fail { position: pos };
                    }
                }
                State::ScanningValue => {
                    if c == '"' {
                        self.emit(AtomKind::ValueQuote, pos, pos);
                        self.state = State::ScanningQuotedValue;
                    } else if is_name(c) {
                        self.begin = Some(pos);
                        self.state = State::ScanningBareValue;
                    } else {
                        self.state = State::Fail;
                        return Status::Fail { position: pos };
                    }
                }
                State::ScanningBareValue => {
                    if is_name(c) {
                        // keep accumulating
                    } else if c.is_whitespace() {
                        self.flush(AtomKind::Value, pos);
                        self.begin = Some(pos);
                        self.state = State::Scanning;
                    } else if c == '}' {
                        self.flush(AtomKind::Value, pos);
                        self.state = State::Done;
                        return Status::Done { position: pos };
                    } else {
                        self.state = State::Fail;
                        return Status::Fail { position: pos };
                    }
                }
                State::ScanningQuotedValue | State::ScanningQuotedValueCont => match c {
                    '"' => {
                        self.flush(AtomKind::Value, pos);
                        self.emit(AtomKind::ValueQuote, pos, pos);
                        self.state = State::Scanning;
                    }
                    '\\' => {
                        self.flush(AtomKind::Value, pos);
                        self.state = State::ScanningEscaped;
                    }
                    '\r' | '\n' => {
                        self.flush(AtomKind::Value, pos);
                        self.state = State::ScanningQuotedValueCont;
                    }
                    _ => {
                        if self.begin.is_none() {
                            self.begin = Some(pos);
                        }
                        self.state = State::ScanningQuotedValue;
                    }
                },
                State::ScanningEscaped | State::ScanningEscapedCont => {
                    if matches!(c, '\r' | '\n') {
                        self.state = State::ScanningQuotedValueCont;
                    } else {
                        self.begin = Some(pos);
                        self.state = State::ScanningQuotedValue;
                    }
                }
                State::ScanningComment => {
                    if c == '%' {
                        self.state = State::Scanning;
                    }
                }
                State::Done | State::Fail => unreachable!("stepped past terminal state"),
            }
        }
        // The slice ended mid-construct; flush partial tokens so the next
        // slice starts a fresh segment.
        match self.state {
            State::Scanning => self.flush(AtomKind::AttrSpace, end + 1),
            State::ScanningId => self.flush(AtomKind::Id, end + 1),
            State::ScanningClass => self.flush(AtomKind::Class, end + 1),
            State::ScanningKey => self.flush(AtomKind::Key, end + 1),
            State::ScanningBareValue => self.flush(AtomKind::Value, end + 1),
            State::ScanningQuotedValue => {
                self.flush(AtomKind::Value, end + 1);
                self.state = State::ScanningQuotedValueCont;
            }
            State::ScanningEscaped => self.state = State::ScanningEscapedCont,
            _ => {}
        }
        Status::Continue
    }
}
