//! List markers and style narrowing.
//!
//! A marker can admit several numbering styles at once (a lone `i.` is
//! lower-alpha or lower-roman); the enclosing list's surviving set is the
//! running intersection, patched into the `+list` event as it narrows, and
//! an incompatible marker closes the list and starts a fresh one. A
//! checkbox after a bullet marker emits a checked/unchecked atom and
//! shifts the content start.

use crate::block_parser::BlockParser;
use crate::block_parser::container_stack::{Container, ContainerKind};
use crate::events::{
    Annot, AtomKind, Decoration, Event, EventData, ListStyle, ListStyles, Numeral, SpanKind,
};

#[derive(Debug, Clone, Copy)]
pub(super) struct Checkbox {
    pub checked: bool,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Marker {
    pub styles: ListStyles,
    pub start: usize,
    pub end: usize,
    /// First content position after the marker (and checkbox, if any).
    pub content: usize,
    pub checkbox: Option<Checkbox>,
}

fn ws_or_end(bytes: &[u8], pos: usize, content_end: usize) -> bool {
    pos >= content_end || matches!(bytes[pos], b' ' | b'\t')
}

fn skip_ws(bytes: &[u8], mut pos: usize, content_end: usize) -> usize {
    while pos < content_end && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    pos
}

fn is_roman_lower(b: u8) -> bool {
    matches!(b, b'i' | b'v' | b'x' | b'l' | b'c' | b'd' | b'm')
}

fn is_roman_upper(b: u8) -> bool {
    matches!(b, b'I' | b'V' | b'X' | b'L' | b'C' | b'D' | b'M')
}

/// Probe a list marker at `at`. Returns every style the marker could
/// belong to.
pub(super) fn try_parse_marker(subject: &str, at: usize, content_end: usize) -> Option<Marker> {
    let bytes = subject.as_bytes();

    // bullets and definition markers
    if matches!(bytes[at], b'-' | b'+' | b'*' | b':') && ws_or_end(bytes, at + 1, content_end) {
        let style = match bytes[at] {
            b'-' => ListStyle::Dash,
            b'+' => ListStyle::Plus,
            b'*' => ListStyle::Star,
            _ => ListStyle::Definition,
        };
        let mut marker = Marker {
            styles: ListStyles::single(style),
            start: at,
            end: at,
            content: skip_ws(bytes, at + 1, content_end),
            checkbox: None,
        };
        if style != ListStyle::Definition {
            marker.checkbox = try_parse_checkbox(bytes, marker.content, content_end);
            if let Some(checkbox) = marker.checkbox {
                marker.content = skip_ws(bytes, checkbox.end + 1, content_end);
            }
        }
        return Some(marker);
    }

    // ordered markers: optional '(' + numeral run + '.' | ')' decoration
    let parens = bytes[at] == b'(';
    let mut i = at + usize::from(parens);
    let numeral_start = i;
    let mut numerals = 0u8; // bitmask over Numeral order
    while i < content_end && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i > numeral_start {
        numerals = 1 << 0;
    } else {
        while i < content_end && bytes[i].is_ascii_lowercase() {
            i += 1;
        }
        if i > numeral_start {
            if i - numeral_start == 1 {
                numerals |= 1 << 1;
            }
            if bytes[numeral_start..i].iter().all(|&b| is_roman_lower(b)) {
                numerals |= 1 << 3;
            }
        } else {
            while i < content_end && bytes[i].is_ascii_uppercase() {
                i += 1;
            }
            if i > numeral_start {
                if i - numeral_start == 1 {
                    numerals |= 1 << 2;
                }
                if bytes[numeral_start..i].iter().all(|&b| is_roman_upper(b)) {
                    numerals |= 1 << 4;
                }
            }
        }
    }
    if numerals == 0 || i >= content_end {
        return None;
    }

    let decoration = if parens {
        if bytes[i] != b')' {
            return None;
        }
        Decoration::Parens
    } else {
        match bytes[i] {
            b'.' => Decoration::Period,
            b')' => Decoration::Paren,
            _ => return None,
        }
    };
    i += 1;
    if !ws_or_end(bytes, i, content_end) {
        return None;
    }

    let mut styles = ListStyles::EMPTY;
    for (bit, numeral) in [
        (0, Numeral::Decimal),
        (1, Numeral::AlphaLower),
        (2, Numeral::AlphaUpper),
        (3, Numeral::RomanLower),
        (4, Numeral::RomanUpper),
    ] {
        if numerals & (1 << bit) != 0 {
            styles.insert(ListStyle::Ordered {
                numeral,
                decoration,
            });
        }
    }
    Some(Marker {
        styles,
        start: at,
        end: i - 1,
        content: skip_ws(bytes, i, content_end),
        checkbox: None,
    })
}

fn try_parse_checkbox(bytes: &[u8], at: usize, content_end: usize) -> Option<Checkbox> {
    if at + 2 < content_end
        && bytes[at] == b'['
        && matches!(bytes[at + 1], b' ' | b'x' | b'X')
        && bytes[at + 2] == b']'
        && ws_or_end(bytes, at + 3, content_end)
    {
        Some(Checkbox {
            checked: bytes[at + 1] != b' ',
            start: at,
            end: at + 2,
        })
    } else {
        None
    }
}

/// Open a list item, narrowing or replacing the enclosing list first.
/// Returns the content position.
pub(super) fn open(p: &mut BlockParser, marker: Marker) -> usize {
    // narrow the enclosing list or close it on an incompatible marker
    let narrow = if let Some(container) = p.containers.last_mut()
        && let ContainerKind::List {
            styles,
            event_index,
            ..
        } = &mut container.kind
    {
        let merged = *styles & marker.styles;
        if merged.is_empty() {
            None
        } else {
            *styles = merged;
            Some((*event_index, merged))
        }
    } else {
        Some((usize::MAX, ListStyles::EMPTY))
    };
    match narrow {
        None => {
            log::debug!("marker at {} is incompatible, closing list", marker.start);
            p.close_top();
        }
        Some((event_index, merged)) if event_index != usize::MAX => {
            if let EventData::List { styles, .. } = &mut p.events[event_index].data {
                *styles = merged;
            }
        }
        _ => {}
    }

    if !matches!(
        p.containers.last().map(|c| &c.kind),
        Some(ContainerKind::List { .. })
    ) {
        log::debug!("opening list at {} ({:?})", marker.start, marker.styles);
        let event_index = p.events.len();
        p.events.push(Event::with_data(
            marker.start,
            marker.end,
            Annot::Enter(SpanKind::List),
            EventData::List {
                styles: marker.styles,
                tight: true,
            },
        ));
        p.containers.push(Container::new(
            ContainerKind::List {
                styles: marker.styles,
                event_index,
                tight: true,
                blank_seen: false,
            },
            p.indent,
        ));
    }

    p.events.push(Event::with_data(
        marker.start,
        marker.end,
        Annot::Enter(SpanKind::ListItem),
        EventData::Styles(marker.styles),
    ));
    p.containers
        .push(Container::new(ContainerKind::ListItem, p.indent));
    if let Some(checkbox) = marker.checkbox {
        p.events.push(Event::new(
            checkbox.start,
            checkbox.end,
            Annot::Atom(if checkbox.checked {
                AtomKind::CheckboxChecked
            } else {
                AtomKind::CheckboxUnchecked
            }),
        ));
    }
    marker.content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Decoration, ListStyle, Numeral};

    fn styles(src: &str) -> Vec<String> {
        try_parse_marker(src, 0, src.len())
            .map(|m| m.styles.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn bullet_markers() {
        assert_eq!(styles("- one"), ["-"]);
        assert_eq!(styles("+ one"), ["+"]);
        assert_eq!(styles("* one"), ["*"]);
        assert_eq!(styles(": term"), [":"]);
        assert!(styles("-one").is_empty());
    }

    #[test]
    fn decimal_markers() {
        assert_eq!(styles("1. x"), ["1."]);
        assert_eq!(styles("12) x"), ["1)"]);
        assert_eq!(styles("(3) x"), ["(1)"]);
        assert!(styles("(3] x").is_empty());
    }

    #[test]
    fn ambiguous_letter_markers() {
        // a lone roman letter is alpha or roman
        assert_eq!(styles("i. x"), ["a.", "i."]);
        // multi-letter roman runs are roman only
        assert_eq!(styles("(iv) x"), ["(i)"]);
        // non-roman letters are alpha only
        assert_eq!(styles("h. x"), ["a."]);
        assert_eq!(styles("B) x"), ["A)"]);
        // multi-letter non-roman runs are not markers
        assert!(styles("ab. x").is_empty());
    }

    #[test]
    fn checkbox_markers() {
        let m = try_parse_marker("- [x] done", 0, 10).unwrap();
        let cb = m.checkbox.unwrap();
        assert!(cb.checked);
        assert_eq!((cb.start, cb.end), (2, 4));
        assert_eq!(m.content, 6);

        let m = try_parse_marker("- [ ] todo", 0, 10).unwrap();
        assert!(!m.checkbox.unwrap().checked);

        // definition markers take no checkbox
        let m = try_parse_marker(": [x] term", 0, 10).unwrap();
        assert!(m.checkbox.is_none());
    }

    #[test]
    fn marker_spans() {
        let m = try_parse_marker("(iv) x", 0, 6).unwrap();
        assert_eq!((m.start, m.end, m.content), (0, 3, 5));
        assert!(m.styles.contains(ListStyle::Ordered {
            numeral: Numeral::RomanLower,
            decoration: Decoration::Parens,
        }));
    }
}
