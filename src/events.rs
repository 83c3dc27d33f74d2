//! Positioned, tagged spans forming the flat parse output.
//!
//! The parser emits a single ordered stream of [`Event`]s. Paired
//! annotations (`+name` / `-name`) delimit a span of children and nest like
//! a well-formed bracket sequence; bare annotations are atomic tokens.
//! Offsets are byte positions into the subject, with an inclusive `end`.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A positioned, tagged span in the flat output stream.
///
/// `start` and `end` are byte offsets into the subject; `end` is inclusive.
/// The only events with `end < start` are zero-width closers synthesized
/// for constructs left unclosed at end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    pub start: usize,
    pub end: usize,
    pub annot: Annot,
    pub data: EventData,
}

impl Event {
    pub(crate) fn new(start: usize, end: usize, annot: Annot) -> Self {
        Self {
            start,
            end,
            annot,
            data: EventData::None,
        }
    }

    pub(crate) fn with_data(start: usize, end: usize, annot: Annot, data: EventData) -> Self {
        Self {
            start,
            end,
            annot,
            data,
        }
    }

    /// Render the annotation string, e.g. `"+emph"`, `"str"` or
    /// `"+list|1.|a."` (the `|` suffix lists still-ambiguous marker style
    /// candidates on `+list` / `+list_item`).
    pub fn annotation(&self) -> String {
        let mut out = String::new();
        match self.annot {
            Annot::Enter(kind) => {
                out.push('+');
                out.push_str(kind.name());
                match self.data {
                    EventData::List { styles, .. } | EventData::Styles(styles) => {
                        for style in styles.iter() {
                            out.push('|');
                            out.push_str(&style.to_string());
                        }
                    }
                    _ => {}
                }
            }
            Annot::Exit(kind) => {
                out.push('-');
                out.push_str(kind.name());
            }
            Annot::Atom(atom) => out.push_str(atom.name()),
        }
        out
    }

    /// True for zero-width synthesized closers.
    pub fn is_zero_width(&self) -> bool {
        self.end < self.start
    }
}

/// An event tag: either one side of a paired span or an atomic token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Annot {
    Enter(SpanKind),
    Exit(SpanKind),
    Atom(AtomKind),
}

/// Paired constructs; every `Enter` has a matching later `Exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpanKind {
    // inline
    Emph,
    Strong,
    Superscript,
    Subscript,
    Insert,
    Delete,
    Mark,
    SingleQuoted,
    DoubleQuoted,
    Verbatim,
    InlineMath,
    DisplayMath,
    Url,
    Email,
    LinkText,
    ImageText,
    Destination,
    Reference,
    Span,
    Attributes,
    // block
    BlockAttributes,
    Para,
    Heading,
    BlockQuote,
    Footnote,
    ReferenceDefinition,
    List,
    ListItem,
    Table,
    Row,
    Cell,
    Caption,
    Div,
    CodeBlock,
}

impl SpanKind {
    pub fn name(self) -> &'static str {
        match self {
            SpanKind::Emph => "emph",
            SpanKind::Strong => "strong",
            SpanKind::Superscript => "superscript",
            SpanKind::Subscript => "subscript",
            SpanKind::Insert => "insert",
            SpanKind::Delete => "delete",
            SpanKind::Mark => "mark",
            SpanKind::SingleQuoted => "single_quoted",
            SpanKind::DoubleQuoted => "double_quoted",
            SpanKind::Verbatim => "verbatim",
            SpanKind::InlineMath => "inline_math",
            SpanKind::DisplayMath => "display_math",
            SpanKind::Url => "url",
            SpanKind::Email => "email",
            SpanKind::LinkText => "linktext",
            SpanKind::ImageText => "imagetext",
            SpanKind::Destination => "destination",
            SpanKind::Reference => "reference",
            SpanKind::Span => "span",
            SpanKind::Attributes => "attributes",
            SpanKind::BlockAttributes => "block_attributes",
            SpanKind::Para => "para",
            SpanKind::Heading => "heading",
            SpanKind::BlockQuote => "blockquote",
            SpanKind::Footnote => "footnote",
            SpanKind::ReferenceDefinition => "reference_definition",
            SpanKind::List => "list",
            SpanKind::ListItem => "list_item",
            SpanKind::Table => "table",
            SpanKind::Row => "row",
            SpanKind::Cell => "cell",
            SpanKind::Caption => "caption",
            SpanKind::Div => "div",
            SpanKind::CodeBlock => "code_block",
        }
    }
}

/// Atomic tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AtomKind {
    Str,
    Softbreak,
    Hardbreak,
    Escape,
    Nbsp,
    Blankline,
    ThematicBreak,
    Ellipsis,
    EmDash,
    EnDash,
    Symbol,
    FootnoteReference,
    RawFormat,
    CodeLanguage,
    Class,
    Id,
    Key,
    Value,
    AttrSpace,
    IdMarker,
    ClassMarker,
    Assign,
    ValueQuote,
    NoteLabel,
    ReferenceKey,
    ReferenceValue,
    CheckboxChecked,
    CheckboxUnchecked,
    LeftSingleQuote,
    RightSingleQuote,
    LeftDoubleQuote,
    RightDoubleQuote,
}

impl AtomKind {
    pub fn name(self) -> &'static str {
        match self {
            AtomKind::Str => "str",
            AtomKind::Softbreak => "softbreak",
            AtomKind::Hardbreak => "hardbreak",
            AtomKind::Escape => "escape",
            AtomKind::Nbsp => "nbsp",
            AtomKind::Blankline => "blankline",
            AtomKind::ThematicBreak => "thematic_break",
            AtomKind::Ellipsis => "ellipsis",
            AtomKind::EmDash => "em_dash",
            AtomKind::EnDash => "en_dash",
            AtomKind::Symbol => "symbol",
            AtomKind::FootnoteReference => "footnote_reference",
            AtomKind::RawFormat => "raw_format",
            AtomKind::CodeLanguage => "code_language",
            AtomKind::Class => "class",
            AtomKind::Id => "id",
            AtomKind::Key => "key",
            AtomKind::Value => "value",
            AtomKind::AttrSpace => "attr_space",
            AtomKind::IdMarker => "id_marker",
            AtomKind::ClassMarker => "class_marker",
            AtomKind::Assign => "assign",
            AtomKind::ValueQuote => "value_quote",
            AtomKind::NoteLabel => "note_label",
            AtomKind::ReferenceKey => "reference_key",
            AtomKind::ReferenceValue => "reference_value",
            AtomKind::CheckboxChecked => "checkbox_checked",
            AtomKind::CheckboxUnchecked => "checkbox_unchecked",
            AtomKind::LeftSingleQuote => "left_single_quote",
            AtomKind::RightSingleQuote => "right_single_quote",
            AtomKind::LeftDoubleQuote => "left_double_quote",
            AtomKind::RightDoubleQuote => "right_double_quote",
        }
    }
}

/// Typed payload for data that the annotation string cannot carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventData {
    #[default]
    None,
    /// `+list`: surviving style candidates and tightness. Patched in place
    /// while the list narrows and once more when it closes.
    List { styles: ListStyles, tight: bool },
    /// `+list_item`: the candidates admitted by this item's own marker.
    Styles(ListStyles),
    /// `+row` / `-row`: head-row flag (set by a separator row).
    Row { head: bool },
    /// `+cell` / `-cell`: head flag and column alignment.
    Cell { head: bool, align: Alignment },
}

/// Column alignment fixed by a table separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Alignment {
    #[default]
    Default,
    Left,
    Center,
    Right,
}

/// Numeral family of an ordered list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Numeral {
    Decimal,
    AlphaLower,
    AlphaUpper,
    RomanLower,
    RomanUpper,
}

/// Decoration around an ordered list marker: `1.`, `1)` or `(1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Decoration {
    Period,
    Paren,
    Parens,
}

/// A single list marker style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ListStyle {
    Dash,
    Plus,
    Star,
    Definition,
    Ordered {
        numeral: Numeral,
        decoration: Decoration,
    },
}

impl ListStyle {
    fn bit(self) -> u32 {
        match self {
            ListStyle::Dash => 0,
            ListStyle::Plus => 1,
            ListStyle::Star => 2,
            ListStyle::Definition => 3,
            ListStyle::Ordered {
                numeral,
                decoration,
            } => {
                let n = match numeral {
                    Numeral::Decimal => 0,
                    Numeral::AlphaLower => 1,
                    Numeral::AlphaUpper => 2,
                    Numeral::RomanLower => 3,
                    Numeral::RomanUpper => 4,
                };
                let d = match decoration {
                    Decoration::Period => 0,
                    Decoration::Paren => 1,
                    Decoration::Parens => 2,
                };
                4 + n * 3 + d
            }
        }
    }

    fn from_bit(bit: u32) -> ListStyle {
        match bit {
            0 => ListStyle::Dash,
            1 => ListStyle::Plus,
            2 => ListStyle::Star,
            3 => ListStyle::Definition,
            b => {
                let n = (b - 4) / 3;
                let d = (b - 4) % 3;
                ListStyle::Ordered {
                    numeral: match n {
                        0 => Numeral::Decimal,
                        1 => Numeral::AlphaLower,
                        2 => Numeral::AlphaUpper,
                        3 => Numeral::RomanLower,
                        _ => Numeral::RomanUpper,
                    },
                    decoration: match d {
                        0 => Decoration::Period,
                        1 => Decoration::Paren,
                        _ => Decoration::Parens,
                    },
                }
            }
        }
    }
}

impl fmt::Display for ListStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListStyle::Dash => f.write_str("-"),
            ListStyle::Plus => f.write_str("+"),
            ListStyle::Star => f.write_str("*"),
            ListStyle::Definition => f.write_str(":"),
            ListStyle::Ordered {
                numeral,
                decoration,
            } => {
                let c = match numeral {
                    Numeral::Decimal => '1',
                    Numeral::AlphaLower => 'a',
                    Numeral::AlphaUpper => 'A',
                    Numeral::RomanLower => 'i',
                    Numeral::RomanUpper => 'I',
                };
                match decoration {
                    Decoration::Period => write!(f, "{c}."),
                    Decoration::Paren => write!(f, "{c})"),
                    Decoration::Parens => write!(f, "({c})"),
                }
            }
        }
    }
}

const STYLE_BITS: u32 = 19;

/// A set of simultaneously-plausible list marker styles.
///
/// A lone `i.` marker, for example, admits both lower-alpha and lower-roman
/// readings; the set narrows as further items arrive and the first surviving
/// style (in canonical order) wins when the list closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListStyles(u32);

impl ListStyles {
    pub const EMPTY: ListStyles = ListStyles(0);

    pub fn single(style: ListStyle) -> ListStyles {
        ListStyles(1 << style.bit())
    }

    pub fn insert(&mut self, style: ListStyle) {
        self.0 |= 1 << style.bit();
    }

    pub fn contains(self, style: ListStyle) -> bool {
        self.0 & (1 << style.bit()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// First surviving style in canonical order (bullets, definition, then
    /// ordered styles with decimal before alpha before roman).
    pub fn first(self) -> Option<ListStyle> {
        (0..STYLE_BITS)
            .find(|bit| self.0 & (1 << bit) != 0)
            .map(ListStyle::from_bit)
    }

    pub fn iter(self) -> impl Iterator<Item = ListStyle> {
        (0..STYLE_BITS)
            .filter(move |bit| self.0 & (1 << bit) != 0)
            .map(ListStyle::from_bit)
    }
}

impl std::ops::BitAnd for ListStyles {
    type Output = ListStyles;

    fn bitand(self, rhs: ListStyles) -> ListStyles {
        ListStyles(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_strings() {
        let e = Event::new(0, 0, Annot::Enter(SpanKind::Emph));
        assert_eq!(e.annotation(), "+emph");
        let e = Event::new(3, 3, Annot::Exit(SpanKind::Strong));
        assert_eq!(e.annotation(), "-strong");
        let e = Event::new(1, 3, Annot::Atom(AtomKind::EmDash));
        assert_eq!(e.annotation(), "em_dash");
    }

    #[test]
    fn list_annotation_carries_candidates() {
        let mut styles = ListStyles::single(ListStyle::Ordered {
            numeral: Numeral::AlphaLower,
            decoration: Decoration::Period,
        });
        styles.insert(ListStyle::Ordered {
            numeral: Numeral::RomanLower,
            decoration: Decoration::Period,
        });
        let e = Event::with_data(
            0,
            1,
            Annot::Enter(SpanKind::List),
            EventData::List {
                styles,
                tight: true,
            },
        );
        assert_eq!(e.annotation(), "+list|a.|i.");
    }

    #[test]
    fn first_prefers_alpha_over_roman() {
        let mut styles = ListStyles::EMPTY;
        styles.insert(ListStyle::Ordered {
            numeral: Numeral::RomanLower,
            decoration: Decoration::Period,
        });
        styles.insert(ListStyle::Ordered {
            numeral: Numeral::AlphaLower,
            decoration: Decoration::Period,
        });
        assert_eq!(
            styles.first(),
            Some(ListStyle::Ordered {
                numeral: Numeral::AlphaLower,
                decoration: Decoration::Period,
            })
        );
    }

    #[test]
    fn style_display() {
        assert_eq!(ListStyle::Dash.to_string(), "-");
        assert_eq!(
            ListStyle::Ordered {
                numeral: Numeral::Decimal,
                decoration: Decoration::Parens,
            }
            .to_string(),
            "(1)"
        );
    }
}
