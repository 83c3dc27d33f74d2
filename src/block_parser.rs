//! The block parser: a container-stack automaton.
//!
//! The document is scanned line by line. Each line first runs the open
//! containers' continuation predicates outer to inner, then tries to open
//! new containers by the grammar rules in fixed priority order, then routes
//! whatever text remains to the innermost container according to the kind
//! of content it accepts. Inline-bearing containers own an inline parser
//! whose events are spliced into the stream when the container closes.

use crate::Warning;
use crate::events::{Annot, AtomKind, Event, EventData, ListStyles, SpanKind};
use crate::inline_parser::InlineParser;

mod attributes;
mod blockquotes;
mod captions;
mod code_blocks;
mod container_stack;
mod fenced_divs;
mod footnotes;
mod headings;
mod lists;
mod reference_definitions;
mod tables;
mod thematic_breaks;

use container_stack::{Container, ContainerKind, ContentKind};

/// Result of a container's continuation predicate.
enum Continuation {
    /// Matched; scanning resumes at the position.
    Yes(usize),
    /// Matched and consumed the rest of the line (table rows, attribute
    /// lines).
    Consumed,
    /// A closing fence consumed the line and closes this container; the
    /// span is the fence run.
    Closed((usize, usize)),
    No,
}

/// A grammar rule that matched at the current position, in priority order.
enum Rule {
    BlockQuote,
    Heading(headings::HeadingMatch),
    Caption,
    Footnote(footnotes::FootnoteMatch),
    RefDef(reference_definitions::RefDefMatch),
    ThematicBreak(usize),
    ListItem(lists::Marker),
    Table(tables::RowShape),
    AttributeBlock,
    Div(fenced_divs::DivFence),
    CodeBlock(code_blocks::CodeFence),
}

pub(crate) struct BlockParser<'s> {
    subject: &'s str,
    pub(crate) events: Vec<Event>,
    pub(crate) warnings: Vec<Warning>,
    containers: Vec<Container<'s>>,
    /// Start of the current line.
    line_start: usize,
    /// First byte of the line break terminating the current line.
    content_end: usize,
    /// The `\n` terminating the current line.
    eol: usize,
    /// End of the previous line's break, used as the position of close
    /// events.
    prev_eol: usize,
    /// Column of the first non-space byte, relative to the line start.
    indent: usize,
}

impl<'s> BlockParser<'s> {
    pub(crate) fn new(subject: &'s str) -> Self {
        debug_assert!(subject.ends_with('\n'), "subject must end with a line break");
        Self {
            subject,
            events: Vec::new(),
            warnings: Vec::new(),
            containers: Vec::new(),
            line_start: 0,
            content_end: 0,
            eol: 0,
            prev_eol: 0,
            indent: 0,
        }
    }

    /// Parse the whole subject.
    pub(crate) fn run(&mut self) {
        log::debug!("starting block parse ({} bytes)", self.subject.len());
        let mut pos = 0;
        while pos < self.subject.len() {
            self.scan_line(pos);
            self.parse_line();
            pos = self.eol + 1;
            self.prev_eol = self.eol;
        }
        self.close_to(0);
    }

    fn scan_line(&mut self, pos: usize) {
        let bytes = self.subject.as_bytes();
        self.line_start = pos;
        let mut nl = pos;
        while nl < bytes.len() && bytes[nl] != b'\n' {
            nl += 1;
        }
        debug_assert!(nl < bytes.len(), "every line ends with a line feed");
        self.eol = nl;
        self.content_end = if nl > pos && bytes[nl - 1] == b'\r' {
            nl - 1
        } else {
            nl
        };
    }

    fn parse_line(&mut self) {
        log::debug!(
            "line at {}: {:?}",
            self.line_start,
            &self.subject[self.line_start..self.content_end]
        );

        // continuation predicates, outer to inner
        let mut p = self.line_start;
        let mut matched = 0;
        for index in 0..self.containers.len() {
            let np = self.skip_ws(p);
            self.indent = np - self.line_start;
            match self.continue_container(index, np) {
                Continuation::Yes(next) => {
                    p = next;
                    matched = index + 1;
                }
                Continuation::Consumed => return,
                Continuation::Closed(span) => {
                    self.close_to(index + 1);
                    self.close_top_with(Some(span));
                    return;
                }
                Continuation::No => break,
            }
        }

        let first = self.skip_ws(p);
        if first >= self.content_end {
            // blank line: close unmatched containers, then record the blank
            self.close_to(matched);
            if matches!(
                self.containers.last().map(|c| &c.kind),
                Some(ContainerKind::CodeBlock { .. })
            ) {
                self.append_code_line();
                return;
            }
            self.events.push(Event::new(
                first,
                self.eol,
                Annot::Atom(AtomKind::Blankline),
            ));
            self.note_blank();
            return;
        }

        let mut opened = false;
        let mut committed = false;
        loop {
            // try to open new containers, cascading across the line
            loop {
                let np = self.skip_ws(p);
                if np >= self.content_end {
                    break;
                }
                self.indent = np - self.line_start;
                let tip = if committed {
                    self.tip_content()
                } else {
                    self.stack_content(matched)
                };
                let Some(rule) = self.probe_rules(tip, np) else {
                    break;
                };
                if !committed {
                    self.close_to(matched);
                    committed = true;
                }
                opened = true;
                if self.apply_rule(rule, np, &mut p) {
                    return;
                }
            }

            // laziness, or close the unmatched tail
            if !committed {
                let lazy = !opened
                    && matched < self.containers.len()
                    && self.tip_content() == ContentKind::Inline;
                if lazy {
                    log::debug!("lazy continuation of inline content");
                } else {
                    self.close_to(matched);
                }
                committed = true;
            }

            // route the remaining text
            let np = self.skip_ws(p);
            let rest_blank = np >= self.content_end;
            match self.containers.last().map(|c| c.content()) {
                Some(ContentKind::Text) => {
                    self.route_text(np, rest_blank);
                    return;
                }
                Some(ContentKind::Inline) => {
                    if !rest_blank {
                        self.note_content();
                        self.feed_tip_inline(np);
                    }
                    return;
                }
                Some(ContentKind::Cells)
                | Some(ContentKind::ListItems)
                | Some(ContentKind::Attributes) => {
                    // the tip cannot hold this content: close it and retry
                    self.close_top();
                }
                _ => {
                    // block content, or the document root
                    if rest_blank {
                        if !opened {
                            self.events.push(Event::new(
                                np,
                                self.eol,
                                Annot::Atom(AtomKind::Blankline),
                            ));
                            self.note_blank();
                        }
                        return;
                    }
                    self.note_content();
                    log::debug!("opening paragraph at {np}");
                    self.events
                        .push(Event::new(np, np, Annot::Enter(SpanKind::Para)));
                    self.containers.push(Container::with_inline(
                        ContainerKind::Paragraph,
                        self.indent,
                        self.subject,
                    ));
                    self.feed_tip_inline(np);
                    return;
                }
            }
        }
    }

    fn continue_container(&mut self, index: usize, np: usize) -> Continuation {
        enum Probe {
            BlockQuote,
            Heading(usize),
            IndentedUnlessBlank(usize),
            IndentedOrBlank(usize),
            List,
            Paragraph,
            Table,
            Attributes,
            Div(usize),
            Code(u8, usize),
        }
        let indent = self.containers[index].indent;
        let probe = match &self.containers[index].kind {
            ContainerKind::BlockQuote => Probe::BlockQuote,
            ContainerKind::Heading { level } => Probe::Heading(*level),
            ContainerKind::Caption | ContainerKind::ReferenceDefinition => {
                Probe::IndentedUnlessBlank(indent)
            }
            ContainerKind::Footnote | ContainerKind::ListItem => Probe::IndentedOrBlank(indent),
            ContainerKind::List { .. } => Probe::List,
            ContainerKind::Paragraph => Probe::Paragraph,
            ContainerKind::Table { .. } => Probe::Table,
            ContainerKind::AttributeBlock { .. } => Probe::Attributes,
            ContainerKind::Div { fence, .. } => Probe::Div(*fence),
            ContainerKind::CodeBlock {
                fence_byte, fence, ..
            } => Probe::Code(*fence_byte, *fence),
        };
        match probe {
            Probe::BlockQuote => match blockquotes::continues(self, np) {
                Some(next) => Continuation::Yes(next),
                None => Continuation::No,
            },
            Probe::Heading(level) => match headings::continues(self, np, level) {
                Some(next) => Continuation::Yes(next),
                None => Continuation::No,
            },
            Probe::IndentedUnlessBlank(indent) => {
                if np < self.content_end && self.indent > indent {
                    Continuation::Yes(np)
                } else {
                    Continuation::No
                }
            }
            Probe::IndentedOrBlank(indent) => {
                if np >= self.content_end || self.indent > indent {
                    Continuation::Yes(np)
                } else {
                    Continuation::No
                }
            }
            Probe::List => Continuation::Yes(np),
            Probe::Paragraph => {
                if np < self.content_end {
                    Continuation::Yes(np)
                } else {
                    Continuation::No
                }
            }
            Probe::Table => {
                if np < self.content_end
                    && let Some(shape) = tables::probe_row(self.subject, np, self.content_end)
                {
                    self.note_content();
                    tables::emit_row(self, shape);
                    Continuation::Consumed
                } else {
                    Continuation::No
                }
            }
            Probe::Attributes => attributes::continues(self, index, np),
            Probe::Div(fence) => {
                if let Some(span) = fenced_divs::closing_fence(self, index, np, fence) {
                    if let ContainerKind::Div {
                        closed_by_fence, ..
                    } = &mut self.containers[index].kind
                    {
                        *closed_by_fence = true;
                    }
                    Continuation::Closed(span)
                } else {
                    Continuation::Yes(np)
                }
            }
            Probe::Code(fence_byte, fence) => {
                if let Some(span) = code_blocks::closing_fence(self, np, fence_byte, fence) {
                    if let ContainerKind::CodeBlock {
                        closed_by_fence, ..
                    } = &mut self.containers[index].kind
                    {
                        *closed_by_fence = true;
                    }
                    Continuation::Closed(span)
                } else {
                    Continuation::Yes(np)
                }
            }
        }
    }

    /// Try the grammar rules admitted by the tip's content kind, in
    /// priority order.
    fn probe_rules(&self, tip: ContentKind, np: usize) -> Option<Rule> {
        match tip {
            ContentKind::ListItems => {
                lists::try_parse_marker(self.subject, np, self.content_end).map(Rule::ListItem)
            }
            ContentKind::Block => {
                if blockquotes::probe(self, np) {
                    return Some(Rule::BlockQuote);
                }
                if let Some(m) = headings::probe(self, np) {
                    return Some(Rule::Heading(m));
                }
                if captions::probe(self, np) {
                    return Some(Rule::Caption);
                }
                if let Some(m) = footnotes::probe(self, np) {
                    return Some(Rule::Footnote(m));
                }
                if let Some(m) = reference_definitions::probe(self, np) {
                    return Some(Rule::RefDef(m));
                }
                if let Some(end) = thematic_breaks::probe(self, np) {
                    return Some(Rule::ThematicBreak(end));
                }
                if let Some(m) = lists::try_parse_marker(self.subject, np, self.content_end) {
                    return Some(Rule::ListItem(m));
                }
                if let Some(shape) = tables::probe_row(self.subject, np, self.content_end) {
                    return Some(Rule::Table(shape));
                }
                if attributes::probe(self, np) {
                    return Some(Rule::AttributeBlock);
                }
                if let Some(m) = fenced_divs::probe(self, np) {
                    return Some(Rule::Div(m));
                }
                if let Some(m) = code_blocks::probe(self, np) {
                    return Some(Rule::CodeBlock(m));
                }
                None
            }
            _ => None,
        }
    }

    /// Apply a matched rule. Returns true when the rule consumed the whole
    /// line.
    fn apply_rule(&mut self, rule: Rule, np: usize, p: &mut usize) -> bool {
        match rule {
            Rule::BlockQuote => {
                self.note_content();
                *p = blockquotes::open(self, np);
                false
            }
            Rule::Heading(m) => {
                self.note_content();
                *p = headings::open(self, np, m);
                false
            }
            Rule::Caption => {
                self.note_content();
                *p = captions::open(self, np);
                false
            }
            Rule::Footnote(m) => {
                self.note_content();
                *p = footnotes::open(self, np, m);
                false
            }
            Rule::RefDef(m) => {
                self.note_content();
                reference_definitions::open(self, np, m);
                true
            }
            Rule::ThematicBreak(end) => {
                self.note_content();
                thematic_breaks::emit(self, np, end);
                true
            }
            Rule::ListItem(marker) => {
                *p = lists::open(self, marker);
                false
            }
            Rule::Table(shape) => {
                self.note_content();
                log::debug!("opening table at {np}");
                self.events
                    .push(Event::new(np, np, Annot::Enter(SpanKind::Table)));
                self.containers.push(Container::new(
                    ContainerKind::Table {
                        aligns: Vec::new(),
                        prev_row: None,
                    },
                    self.indent,
                ));
                tables::emit_row(self, shape);
                true
            }
            Rule::AttributeBlock => {
                self.note_content();
                attributes::open(self, np);
                true
            }
            Rule::Div(m) => {
                self.note_content();
                fenced_divs::open(self, m);
                true
            }
            Rule::CodeBlock(m) => {
                self.note_content();
                code_blocks::open(self, m);
                true
            }
        }
    }

    /// Raw-text routing: code-block content or reference-definition value
    /// lines.
    fn route_text(&mut self, np: usize, rest_blank: bool) {
        let is_code = matches!(
            self.containers.last().map(|c| &c.kind),
            Some(ContainerKind::CodeBlock { .. })
        );
        if is_code {
            self.append_code_line();
        } else if !rest_blank {
            self.note_content();
            reference_definitions::append_value(self, np);
        }
    }

    /// Append one line of code-block content, stripping up to the
    /// container's expected indentation.
    fn append_code_line(&mut self) {
        let indent = self.containers.last().map(|c| c.indent).unwrap_or(0);
        self.note_content();
        let lead = self.skip_ws(self.line_start) - self.line_start;
        let start = self.line_start + lead.min(indent);
        self.events
            .push(Event::new(start, self.eol, Annot::Atom(AtomKind::Str)));
    }

    fn feed_tip_inline(&mut self, np: usize) {
        let eol = self.eol;
        if let Some(container) = self.containers.last_mut()
            && let Some(inline) = container.inline.as_mut()
        {
            inline.feed(np, eol);
        } else {
            unreachable!("inline content routed to a container without an inline parser");
        }
    }

    fn close_to(&mut self, depth: usize) {
        while self.containers.len() > depth {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        self.close_top_with(None);
    }

    /// Close the innermost container, splicing its buffered inline events
    /// and emitting its exit event at the given span (default: the end of
    /// the previous line).
    fn close_top_with(&mut self, span: Option<(usize, usize)>) {
        let Some(mut container) = self.containers.pop() else {
            unreachable!("closing an empty container stack");
        };
        let (start, end) = span.unwrap_or((self.prev_eol, self.prev_eol));
        if let Some(mut inline) = container.inline.take() {
            let events = inline.finish(&mut self.warnings);
            self.events.extend(events);
        }
        let exit = |kind: SpanKind| Event::new(start, end, Annot::Exit(kind));
        match container.kind {
            ContainerKind::Paragraph => self.events.push(exit(SpanKind::Para)),
            ContainerKind::Heading { .. } => self.events.push(exit(SpanKind::Heading)),
            ContainerKind::Caption => self.events.push(exit(SpanKind::Caption)),
            ContainerKind::BlockQuote => self.events.push(exit(SpanKind::BlockQuote)),
            ContainerKind::Footnote => self.events.push(exit(SpanKind::Footnote)),
            ContainerKind::ReferenceDefinition => {
                self.events.push(exit(SpanKind::ReferenceDefinition));
            }
            ContainerKind::ListItem => self.events.push(exit(SpanKind::ListItem)),
            ContainerKind::List {
                styles,
                event_index,
                tight,
                ..
            } => {
                // first surviving style wins
                let final_styles = styles
                    .first()
                    .map(ListStyles::single)
                    .unwrap_or(styles);
                if let EventData::List {
                    styles: s,
                    tight: t,
                } = &mut self.events[event_index].data
                {
                    *s = final_styles;
                    *t = tight;
                }
                log::debug!(
                    "closing list: style {:?}, tight={tight}",
                    final_styles.first()
                );
                self.events.push(exit(SpanKind::List));
            }
            ContainerKind::Table { .. } => self.events.push(exit(SpanKind::Table)),
            ContainerKind::Div {
                closed_by_fence, ..
            } => {
                if !closed_by_fence {
                    self.warn("unclosed div", Some(self.prev_eol));
                }
                self.events.push(exit(SpanKind::Div));
            }
            ContainerKind::CodeBlock {
                closed_by_fence, ..
            } => {
                if !closed_by_fence {
                    self.warn("unclosed code block", Some(self.prev_eol));
                }
                self.events.push(exit(SpanKind::CodeBlock));
            }
            ContainerKind::AttributeBlock { start: attr_start, .. } => {
                // never finished: everything consumed becomes a paragraph
                self.events.push(Event::new(
                    attr_start,
                    attr_start,
                    Annot::Enter(SpanKind::Para),
                ));
                let mut inline = InlineParser::new(self.subject);
                inline.feed(attr_start, self.prev_eol);
                let events = inline.finish(&mut self.warnings);
                self.events.extend(events);
                self.events.push(exit(SpanKind::Para));
            }
        }
    }

    /// Record a blank line on the nearest enclosing list.
    fn note_blank(&mut self) {
        for container in self.containers.iter_mut().rev() {
            if let ContainerKind::List { blank_seen, .. } = &mut container.kind {
                *blank_seen = true;
                return;
            }
        }
    }

    /// Content arrived: every enclosing list with a recorded blank line
    /// becomes loose. List boundaries themselves never call this.
    fn note_content(&mut self) {
        for container in self.containers.iter_mut() {
            if let ContainerKind::List {
                blank_seen, tight, ..
            } = &mut container.kind
                && *blank_seen
                && *tight
            {
                log::debug!("list becomes loose");
                *tight = false;
            }
        }
    }

    fn tip_content(&self) -> ContentKind {
        self.containers
            .last()
            .map(|c| c.content())
            .unwrap_or(ContentKind::Block)
    }

    fn stack_content(&self, depth: usize) -> ContentKind {
        if depth == 0 {
            ContentKind::Block
        } else {
            self.containers[depth - 1].content()
        }
    }

    fn skip_ws(&self, mut pos: usize) -> usize {
        let bytes = self.subject.as_bytes();
        while pos < self.content_end && matches!(bytes[pos], b' ' | b'\t') {
            pos += 1;
        }
        pos
    }

    fn rest_is_whitespace(&self, from: usize) -> bool {
        self.subject.as_bytes()[from..self.content_end]
            .iter()
            .all(|b| matches!(b, b' ' | b'\t'))
    }

    fn warn(&mut self, message: &'static str, position: Option<usize>) {
        log::warn!("{message} (position {position:?})");
        self.warnings.push(Warning::new(message, position));
    }
}
