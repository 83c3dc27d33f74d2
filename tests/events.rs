//! Whole-document tests over the public event stream.

use plume::events::{Alignment, Annot, Event, EventData, SpanKind};
use similar_asserts::assert_eq;

fn annots(input: &str) -> Vec<(String, usize, usize)> {
    let output = plume::parse(input);
    assert_balanced(&output.events);
    output
        .events
        .iter()
        .map(|e| (e.annotation(), e.start, e.end))
        .collect()
}

fn names(input: &str) -> Vec<String> {
    annots(input).into_iter().map(|(n, _, _)| n).collect()
}

/// Every `+X` has a matching later `-X` with proper nesting, and start
/// positions never decrease.
fn assert_balanced(events: &[Event]) {
    let mut stack: Vec<SpanKind> = Vec::new();
    let mut last_start = 0;
    for event in events {
        assert!(
            event.start >= last_start,
            "positions went backwards at {event:?}"
        );
        last_start = event.start;
        match event.annot {
            Annot::Enter(kind) => stack.push(kind),
            Annot::Exit(kind) => {
                assert_eq!(stack.pop(), Some(kind), "mismatched close for {event:?}");
            }
            Annot::Atom(_) => {}
        }
    }
    assert!(stack.is_empty(), "unclosed spans: {stack:?}");
}

#[test]
fn paragraph_with_nested_emphasis() {
    assert_eq!(
        annots("_hello *there*_ world\n"),
        vec![
            ("+para".into(), 0, 0),
            ("+emph".into(), 0, 0),
            ("str".into(), 1, 6),
            ("+strong".into(), 7, 7),
            ("str".into(), 8, 12),
            ("-strong".into(), 13, 13),
            ("-emph".into(), 14, 14),
            ("str".into(), 15, 20),
            ("-para".into(), 21, 21),
        ]
    );
}

#[test]
fn hyphen_classification() {
    assert_eq!(
        annots("a---b--c\n"),
        vec![
            ("+para".into(), 0, 0),
            ("str".into(), 0, 0),
            ("em_dash".into(), 1, 3),
            ("str".into(), 4, 4),
            ("en_dash".into(), 5, 6),
            ("str".into(), 7, 7),
            ("-para".into(), 8, 8),
        ]
    );
}

#[test]
fn list_style_narrowing() {
    assert_eq!(
        names("- one\n- two\n1. three\n(iv) four\n"),
        [
            "+list|-",
            "+list_item|-",
            "+para",
            "str",
            "-para",
            "-list_item",
            "+list_item|-",
            "+para",
            "str",
            "-para",
            "-list_item",
            "-list",
            "+list|1.",
            "+list_item|1.",
            "+para",
            "str",
            "-para",
            "-list_item",
            "-list",
            "+list|(i)",
            "+list_item|(i)",
            "+para",
            "str",
            "-para",
            "-list_item",
            "-list",
        ]
    );
}

#[test]
fn ambiguous_roman_narrows_and_finalizes() {
    // `i.` is alpha-or-roman until `ii.` forces roman
    let names = names("i. one\nii. two\n");
    assert_eq!(names[0], "+list|i.");
    assert_eq!(names[1], "+list_item|a.|i.");
    // never disambiguated: alpha wins at close
    let names = names_of("i. only\n");
    assert_eq!(names[0], "+list|a.");
}

fn names_of(input: &str) -> Vec<String> {
    names(input)
}

#[test]
fn table_row_rollback_leaves_no_trace() {
    assert_eq!(
        names("| a |\n| b\nx\n"),
        [
            "+table",
            "+row",
            "+cell",
            "str",
            "-cell",
            "-row",
            "-table",
            "+para",
            "str",
            "softbreak",
            "str",
            "-para",
        ]
    );
}

#[test]
fn separator_row_promotes_head_and_fixes_alignment() {
    let output = plume::parse("| a | b |\n|:--|--:|\n| c | d |\n");
    assert_balanced(&output.events);
    let rows: Vec<&Event> = output
        .events
        .iter()
        .filter(|e| matches!(e.annot, Annot::Enter(SpanKind::Row)))
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].data, EventData::Row { head: true });
    assert_eq!(rows[1].data, EventData::Row { head: false });
    let cells: Vec<&Event> = output
        .events
        .iter()
        .filter(|e| matches!(e.annot, Annot::Enter(SpanKind::Cell)))
        .collect();
    assert_eq!(
        cells[0].data,
        EventData::Cell {
            head: true,
            align: Alignment::Left,
        }
    );
    assert_eq!(
        cells[1].data,
        EventData::Cell {
            head: true,
            align: Alignment::Right,
        }
    );
    assert_eq!(
        cells[2].data,
        EventData::Cell {
            head: false,
            align: Alignment::Left,
        }
    );
    assert_eq!(
        cells[3].data,
        EventData::Cell {
            head: false,
            align: Alignment::Right,
        }
    );
}

#[test]
fn blockquote_with_lazy_continuation() {
    assert_eq!(
        names("> hello\nworld\n"),
        ["+blockquote", "+para", "str", "softbreak", "str", "-para", "-blockquote"]
    );
}

#[test]
fn blockquote_requires_space_or_eol() {
    assert_eq!(names(">plain\n"), ["+para", "str", "-para"]);
}

#[test]
fn heading_absorbs_same_level_markers() {
    assert_eq!(
        names("## a\n## b\n"),
        ["+heading", "str", "softbreak", "str", "-heading"]
    );
    // a different level ends the heading
    assert_eq!(
        names("## a\n# b\n"),
        ["+heading", "str", "-heading", "+heading", "str", "-heading"]
    );
}

#[test]
fn thematic_break_is_not_a_list() {
    assert_eq!(names("- - -\n"), ["thematic_break"]);
    assert_eq!(names("* * *\n"), ["thematic_break"]);
}

#[test]
fn tight_and_loose_lists() {
    let tight = plume::parse("- one\n- two\n");
    let loose = plume::parse("- one\n\n- two\n");
    let tightness = |output: &plume::ParseOutput| {
        output.events.iter().find_map(|e| match e.data {
            EventData::List { tight, .. } => Some(tight),
            _ => None,
        })
    };
    assert_eq!(tightness(&tight), Some(true));
    assert_eq!(tightness(&loose), Some(false));

    // a blank line at the very end leaves the list tight
    let trailing = plume::parse("- one\n- two\n\nafter\n");
    assert_eq!(tightness(&trailing), Some(true));
}

#[test]
fn task_list_checkboxes() {
    assert_eq!(
        names("- [x] done\n- [ ] todo\n"),
        [
            "+list|-",
            "+list_item|-",
            "checkbox_checked",
            "+para",
            "str",
            "-para",
            "-list_item",
            "+list_item|-",
            "checkbox_unchecked",
            "+para",
            "str",
            "-para",
            "-list_item",
            "-list",
        ]
    );
}

#[test]
fn definition_list_marker() {
    let names = names(": term\n");
    assert_eq!(names[0], "+list|:");
}

#[test]
fn footnote_with_indented_body() {
    assert_eq!(
        names("[^note]: first\n  second\n"),
        [
            "+footnote",
            "note_label",
            "+para",
            "str",
            "softbreak",
            "str",
            "-para",
            "-footnote",
        ]
    );
}

#[test]
fn reference_definition_with_continuation() {
    assert_eq!(
        names("[label]: https://example.com\n  tail\n"),
        [
            "+reference_definition",
            "reference_key",
            "reference_value",
            "reference_value",
            "-reference_definition",
        ]
    );
}

#[test]
fn fenced_code_block_with_language() {
    assert_eq!(
        annots("``` rust\nlet x = 1;\n```\n"),
        vec![
            ("+code_block".into(), 0, 2),
            ("code_language".into(), 4, 7),
            ("str".into(), 9, 19),
            ("-code_block".into(), 20, 22),
        ]
    );
}

#[test]
fn raw_block_tag() {
    assert_eq!(
        names("```=html\n<hr>\n```\n"),
        ["+code_block", "raw_format", "str", "-code_block"]
    );
}

#[test]
fn unclosed_fence_warns() {
    let output = plume::parse("~~~\ntext\n");
    assert_balanced(&output.events);
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].message, "unclosed code block");
}

#[test]
fn code_fence_ignores_inline_markup() {
    assert_eq!(
        names("```\n_not emph_\n```\n"),
        ["+code_block", "str", "-code_block"]
    );
}

#[test]
fn nested_divs_close_innermost_first() {
    assert_eq!(
        names("::: outer\n::: inner\nx\n:::\ny\n:::\n"),
        [
            "+div",
            "class",
            "+div",
            "class",
            "+para",
            "str",
            "-para",
            "-div",
            "+para",
            "str",
            "-para",
            "-div",
        ]
    );
}

#[test]
fn block_attributes_single_line() {
    assert_eq!(
        names("{#id .cls}\nx\n"),
        [
            "+block_attributes",
            "id_marker",
            "id",
            "attr_space",
            "class_marker",
            "class",
            "-block_attributes",
            "+para",
            "str",
            "-para",
        ]
    );
}

#[test]
fn block_attributes_across_lines() {
    let names = names("{#id\n  .cls}\nx\n");
    assert_eq!(names.first().map(String::as_str), Some("+block_attributes"));
    assert!(names.contains(&"class".to_string()));
}

#[test]
fn failed_block_attributes_become_a_paragraph() {
    let names = names("{#id\nplain text\n");
    // the consumed line replays as a paragraph; the unindented line starts
    // its own
    assert_eq!(
        names,
        ["+para", "str", "-para", "+para", "str", "-para"]
    );
}

#[test]
fn caption_after_table() {
    assert_eq!(
        names("| a |\n^ caption text\n"),
        [
            "+table",
            "+row",
            "+cell",
            "str",
            "-cell",
            "-row",
            "-table",
            "+caption",
            "str",
            "-caption",
        ]
    );
}

#[test]
fn blank_lines_inside_blockquote() {
    assert_eq!(
        names("> a\n>\n> b\n"),
        [
            "+blockquote",
            "+para",
            "str",
            "-para",
            "blankline",
            "+para",
            "str",
            "-para",
            "-blockquote",
        ]
    );
}

#[test]
fn crlf_line_endings() {
    assert_eq!(
        names("para one\r\n\r\npara two\r\n"),
        ["+para", "str", "-para", "blankline", "+para", "str", "-para"]
    );
}

#[test]
fn footnote_reference_and_links_in_paragraph() {
    assert_eq!(
        names("see [text](url) and[^1]\n"),
        [
            "+para",
            "str",
            "+linktext",
            "str",
            "-linktext",
            "+destination",
            "str",
            "-destination",
            "str",
            "footnote_reference",
            "-para",
        ]
    );
}

#[test]
fn inline_math_inside_paragraph() {
    assert_eq!(
        names("so $`e=mc^2`\n"),
        ["+para", "str", "+inline_math", "str", "-inline_math", "-para"]
    );
}

#[test]
fn stream_is_well_formed_for_a_mixed_document() {
    let doc = "\
# Title

> quoted _emph_ and `code`
> more

- one
- two

  nested para

1. ordered

| a | b |
|---|---|
| c | d |
^ the caption

::: warning
[^note]: body of note
:::

{#attrs .on-block}

```rust
fn main() {}
```

final [link][ref] and :smile:.

[ref]: https://example.com
";
    let output = plume::parse(doc);
    assert_balanced(&output.events);
    assert!(output.warnings.is_empty(), "{:?}", output.warnings);
}
