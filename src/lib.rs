//! An event-stream parser for Djot-style light markup.
//!
//! Parsing is a two-stage, single-pass pipeline: a block-structure
//! automaton identifies nested containers (paragraphs, block quotes,
//! lists, tables, code fences, footnotes, divs, attribute blocks) and an
//! inline scanner resolves emphasis, links, verbatim spans, and
//! punctuation inside them. The output is a single flat stream of
//! positioned [`Event`]s whose paired annotations nest like a well-formed
//! bracket sequence; a downstream tree assembler turns the stream into a
//! document.
//!
//! Parsing never fails: malformed constructs degrade to plain text, and
//! recoverable oddities (an unclosed code fence, say) surface as
//! [`Warning`]s. Total work is near-linear in input size, also on
//! adversarial input.
//!
//! ```
//! let output = plume::parse("_hello_ world\n");
//! let annotations: Vec<String> =
//!     output.events.iter().map(|e| e.annotation()).collect();
//! assert_eq!(
//!     annotations,
//!     ["+para", "+emph", "str", "-emph", "str", "-para"]
//! );
//! ```

use std::borrow::Cow;

pub mod events;

mod attribute_parser;
mod block_parser;
mod inline_parser;
mod patterns;

pub use events::{Alignment, Annot, AtomKind, Event, EventData, ListStyle, ListStyles, SpanKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A non-fatal diagnostic; parsing always continues.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Warning {
    pub message: String,
    /// Byte offset the warning refers to, when one applies.
    pub position: Option<usize>,
}

impl Warning {
    pub(crate) fn new(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Everything a parse produces.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseOutput {
    pub events: Vec<Event>,
    pub warnings: Vec<Warning>,
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The input is guaranteed to end with a line break before scanning;
/// event offsets index the original bytes either way.
fn ensure_trailing_newline(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        let mut owned = String::with_capacity(input.len() + 1);
        owned.push_str(input);
        owned.push('\n');
        Cow::Owned(owned)
    }
}

/// Parse a document into its event stream, collecting warnings.
pub fn parse(input: &str) -> ParseOutput {
    #[cfg(debug_assertions)]
    init_logger();

    let subject = ensure_trailing_newline(input);
    let mut parser = block_parser::BlockParser::new(&subject);
    parser.run();
    ParseOutput {
        events: parser.events,
        warnings: parser.warnings,
    }
}

/// Parse a document, delivering warnings through a caller-supplied sink.
pub fn parse_with<F: FnMut(Warning)>(input: &str, mut sink: F) -> Vec<Event> {
    let output = parse(input);
    for warning in output.warnings {
        sink(warning);
    }
    output.events
}

/// An iterator over a document's events.
///
/// Whole-document parsing is the dominant use case, so the parse runs to
/// completion up front and iteration walks the finished stream; stopping
/// early needs no cleanup.
#[derive(Debug)]
pub struct Parser {
    events: std::vec::IntoIter<Event>,
    warnings: Vec<Warning>,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let output = parse(input);
        Self {
            events: output.events.into_iter(),
            warnings: output.warnings,
        }
    }

    /// Warnings gathered during the parse.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

impl Iterator for Parser {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(input: &str) -> Vec<String> {
        parse(input).events.iter().map(|e| e.annotation()).collect()
    }

    #[test]
    fn empty_input_is_a_blank_line() {
        assert_eq!(annotations(""), ["blankline"]);
    }

    #[test]
    fn trailing_newline_is_appended_copy_on_write() {
        assert_eq!(annotations("hi"), annotations("hi\n"));
    }

    #[test]
    fn parser_iterates_and_collects_warnings() {
        let mut parser = Parser::new("```\nnever closed\n");
        assert_eq!(
            parser.next().map(|e| e.annotation()),
            Some("+code_block".into())
        );
        let rest: Vec<_> = parser.by_ref().collect();
        assert!(!rest.is_empty());
        assert_eq!(parser.warnings().len(), 1);
        assert_eq!(parser.warnings()[0].message, "unclosed code block");
    }

    #[test]
    fn warning_sink_receives_warnings() {
        let mut seen = Vec::new();
        let events = parse_with("`tick\n", |w| seen.push(w));
        assert!(!events.is_empty());
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "unclosed verbatim span");
    }
}
