//! Per-delimiter opener stacks.
//!
//! An opener is a provisional match: the delimiter has already been emitted
//! as a literal event, and the record remembers that event's index so a
//! later closer can promote it in place. Stacks are LIFO per delimiter key;
//! a closer always pairs with the most recently pushed opener of its key.

/// A provisional match awaiting a closer.
#[derive(Debug, Clone)]
pub(super) struct Opener {
    /// Span of the candidate opening delimiter (inclusive; two bytes for
    /// brace-marked forms like `{_` and for image brackets `![`).
    pub start: usize,
    pub end: usize,
    /// Index of the provisional event, promoted in place on resolution.
    pub event_index: usize,
    /// Bracket openers: preceded by `!`.
    pub image: bool,
    /// Bracket openers: a `][` secondary bracket has been seen.
    pub reference: bool,
    pub sub: Option<SubBracket>,
}

impl Opener {
    pub fn new(start: usize, end: usize, event_index: usize) -> Self {
        Self {
            start,
            end,
            event_index,
            image: false,
            reference: false,
            sub: None,
        }
    }
}

/// The `][` pair recorded inside a candidate reference link.
#[derive(Debug, Clone, Copy)]
pub(super) struct SubBracket {
    /// Event index / position of the provisional `]`.
    pub close_index: usize,
    pub close_pos: usize,
    /// Event index / position of the provisional `[`.
    pub open_index: usize,
    pub open_pos: usize,
}

/// The bounded set of opener stack keys. Brace-marked variants of the
/// generic delimiters share their plain key; only the hyphen, which is
/// never a plain delimiter (plain runs are dashes), gets a dedicated
/// brace-marked key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DelimKey {
    Tilde,
    Caret,
    Underscore,
    Star,
    SingleQuote,
    DoubleQuote,
    Plus,
    Equal,
    BracedHyphen,
    Bracket,
    Paren,
}

const KEY_COUNT: usize = 11;

impl DelimKey {
    fn index(self) -> usize {
        match self {
            DelimKey::Tilde => 0,
            DelimKey::Caret => 1,
            DelimKey::Underscore => 2,
            DelimKey::Star => 3,
            DelimKey::SingleQuote => 4,
            DelimKey::DoubleQuote => 5,
            DelimKey::Plus => 6,
            DelimKey::Equal => 7,
            DelimKey::BracedHyphen => 8,
            DelimKey::Bracket => 9,
            DelimKey::Paren => 10,
        }
    }

    pub fn from_delimiter(byte: u8) -> DelimKey {
        match byte {
            b'~' => DelimKey::Tilde,
            b'^' => DelimKey::Caret,
            b'_' => DelimKey::Underscore,
            b'*' => DelimKey::Star,
            b'\'' => DelimKey::SingleQuote,
            b'"' => DelimKey::DoubleQuote,
            b'+' => DelimKey::Plus,
            b'=' => DelimKey::Equal,
            b'-' => DelimKey::BracedHyphen,
            _ => unreachable!("not a generic delimiter: {byte:#x}"),
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct OpenerStacks {
    stacks: [Vec<Opener>; KEY_COUNT],
}

impl OpenerStacks {
    pub fn last(&self, key: DelimKey) -> Option<&Opener> {
        self.stacks[key.index()].last()
    }

    pub fn last_mut(&mut self, key: DelimKey) -> Option<&mut Opener> {
        self.stacks[key.index()].last_mut()
    }

    pub fn push(&mut self, key: DelimKey, opener: Opener) {
        self.stacks[key.index()].push(opener);
    }

    pub fn pop(&mut self, key: DelimKey) -> Option<Opener> {
        self.stacks[key.index()].pop()
    }

    pub fn is_empty(&self, key: DelimKey) -> bool {
        self.stacks[key.index()].is_empty()
    }

    pub fn clear(&mut self, key: DelimKey) {
        self.stacks[key.index()].clear();
    }

    /// A span just resolved: drop every opener fully enclosed by it, and
    /// clear the recorded `][` pair of any opener whose sub-span alone is
    /// enclosed (its outer candidacy survives).
    ///
    /// Stacks are sorted by position (openers are pushed as scanning
    /// advances and nothing past the closer exists yet), so the enclosed
    /// tail is dropped by truncation rather than a full scan.
    pub fn invalidate_enclosed(&mut self, start: usize, end: usize) {
        for stack in &mut self.stacks {
            let keep = stack.partition_point(|o| o.start < start);
            stack.truncate(keep);
        }
        // only bracket openers carry sub-spans
        for opener in &mut self.stacks[DelimKey::Bracket.index()] {
            if let Some(sub) = opener.sub
                && sub.close_pos >= start
                && sub.open_pos <= end
            {
                opener.sub = None;
                opener.reference = false;
            }
        }
    }
}
