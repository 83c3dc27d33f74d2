//! Anchored pattern matching over a bounded slice of the subject.
//!
//! Every grammar probe in the crate goes through [`anchored`]: the pattern
//! is applied to `&subject[start..limit]`, so a match is anchored exactly at
//! `start` and can never extend past the bound. Patterns are `^`-prefixed
//! and compiled once; the regex engine is linear-time, which keeps the
//! no-backtracking guarantee intact even on adversarial input.

use std::sync::LazyLock;

use regex::Regex;

/// A successful anchored match. Spans are absolute byte offsets into the
/// subject with inclusive ends.
#[derive(Debug)]
pub(crate) struct AnchoredMatch {
    pub start: usize,
    pub end: usize,
    captures: Vec<Option<(usize, usize)>>,
}

impl AnchoredMatch {
    /// Span of capture group `i` (1-based, like the pattern), if it
    /// participated in the match and is non-empty.
    pub fn capture(&self, i: usize) -> Option<(usize, usize)> {
        self.captures.get(i).copied().flatten()
    }
}

/// Attempt a match anchored at `start`, considering only
/// `subject[start..limit]` (`limit` is exclusive).
pub(crate) fn anchored(
    re: &Regex,
    subject: &str,
    start: usize,
    limit: usize,
) -> Option<AnchoredMatch> {
    debug_assert!(start <= limit && limit <= subject.len());
    if start >= limit {
        return None;
    }
    let caps = re.captures(&subject[start..limit])?;
    let m = caps.get(0).expect("group 0 always participates");
    debug_assert_eq!(m.start(), 0, "patterns must be ^-anchored");
    if m.is_empty() {
        return None;
    }
    let captures = (0..caps.len())
        .map(|i| {
            caps.get(i).and_then(|g| {
                if g.is_empty() {
                    None
                } else {
                    Some((start + g.start(), start + g.end() - 1))
                }
            })
        })
        .collect();
    Some(AnchoredMatch {
        start,
        end: start + m.end() - 1,
        captures,
    })
}

macro_rules! patterns {
    ($($name:ident => $re:literal,)*) => {
        $(
            pub(crate) static $name: LazyLock<Regex> =
                LazyLock::new(|| Regex::new($re).expect("pattern compiles"));
        )*
    };
}

patterns! {
    // block-level
    BLOCKQUOTE => r"^>(?:[ \t]|$)",
    HEADING => r"^(#+)[ \t]",
    CAPTION => r"^\^[ \t]",
    FOOTNOTE => r"^\[\^([^\]\s]+)\]:",
    REF_DEFINITION => r"^\[([^\^\]][^\]]*)\]:[ \t]*(\S*)[ \t]*$",
    THEMATIC_BREAK => r"^(?:[-*][ \t]*){3,}$",
    DIV_FENCE_OPEN => r"^(:{3,})[ \t]*([A-Za-z][\w-]*)?[ \t]*$",
    DIV_FENCE_CLOSE => r"^(:{3,})[ \t]*$",
    CODE_FENCE_OPEN => r"^(`{3,}|~{3,})[ \t]*([^\s`]*)[ \t]*$",
    CODE_FENCE_CLOSE => r"^(`{3,}|~{3,})[ \t]*$",
    // inline-level
    AUTOLINK => r"^<([^<>\s]+)>",
    SHORTCODE => r"^:([\w+-]+):",
    FOOTNOTE_REFERENCE => r"^\[\^([^\]\s]+)\]",
    RAW_FORMAT => r"^\{=([A-Za-z0-9-]+)\}",
    URL_SCHEME => r"^[A-Za-z][A-Za-z0-9+.-]*:",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_at_offset() {
        let m = anchored(&HEADING, "x ## y", 2, 6).unwrap();
        assert_eq!((m.start, m.end), (2, 4));
        assert_eq!(m.capture(1), Some((2, 3)));
    }

    #[test]
    fn bound_rejects_overlong_match() {
        // the space required by the pattern lies past the bound
        assert!(anchored(&HEADING, "## x", 0, 2).is_none());
        assert!(anchored(&HEADING, "## x", 0, 3).is_some());
    }

    #[test]
    fn never_scans_left_or_unanchored() {
        assert!(anchored(&BLOCKQUOTE, "a > b", 0, 5).is_none());
    }

    #[test]
    fn thematic_break_shapes() {
        assert!(anchored(&THEMATIC_BREAK, "---", 0, 3).is_some());
        assert!(anchored(&THEMATIC_BREAK, "* * *", 0, 5).is_some());
        assert!(anchored(&THEMATIC_BREAK, "- -", 0, 3).is_none());
        assert!(anchored(&THEMATIC_BREAK, "- one", 0, 5).is_none());
    }

    #[test]
    fn code_fence_open_with_language() {
        let m = anchored(&CODE_FENCE_OPEN, "````rust  ", 0, 10).unwrap();
        assert_eq!(m.capture(1), Some((0, 3)));
        assert_eq!(m.capture(2), Some((4, 7)));
    }
}
