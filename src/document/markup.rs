//! Markup parsing for text blocks.
//!
//! Text blocks carry Markdown. The parser flattens it into styled
//! [`TextLine`]s the layout engine can wrap and paint:
//!
//! - Headers scale the glyph cell (H1 triple, H2 double, deeper levels
//!   render bold at normal size)
//! - `**bold**` and `*italic*` become bold / underlined spans
//! - Inline `code` spans are marked for shaded rendering
//! - Unordered and ordered lists get bullet / number prefixes
//! - Rules become a full-width line of box-drawing dashes

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

use crate::layout::{CHAR_WIDTH, CONTAINER_WIDTH, TextLine, TextSpan};

/// Parse a markup string into styled text lines.
pub fn parse_markup(value: &str) -> Vec<TextLine> {
    if value.trim().is_empty() {
        return Vec::new();
    }

    let mut state = MarkupState::default();
    for event in Parser::new(value) {
        match event {
            Event::Start(tag) => state.start_tag(tag),
            Event::End(tag_end) => state.end_tag(tag_end),
            Event::Text(text) => state.push_text(&text),
            Event::Code(code) => state.push_code(&code),
            Event::SoftBreak => state.push_text(" "),
            Event::HardBreak => state.flush_line(),
            Event::Rule => state.push_rule(),
            // HTML, task lists, footnotes: not part of the block vocabulary.
            _ => {}
        }
    }
    state.finish()
}

/// Accumulates spans into lines while tracking nested formatting.
#[derive(Default)]
struct MarkupState {
    lines: Vec<TextLine>,
    current: Vec<TextSpan>,
    scale: u32,
    bold_depth: usize,
    emphasis_depth: usize,
    /// Stack of ordered-list counters; `None` entries are bullet lists.
    list_stack: Vec<Option<u64>>,
    pending_prefix: Option<String>,
}

impl MarkupState {
    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.scale = match level {
                    HeadingLevel::H1 => 3,
                    HeadingLevel::H2 => 2,
                    _ => 1,
                };
                if level > HeadingLevel::H2 {
                    self.bold_depth += 1;
                }
            }
            Tag::Strong => self.bold_depth += 1,
            Tag::Emphasis => self.emphasis_depth += 1,
            Tag::List(start) => self.list_stack.push(start),
            Tag::Item => {
                let prefix = match self.list_stack.last_mut() {
                    Some(Some(counter)) => {
                        let prefix = format!("{counter}. ");
                        *counter += 1;
                        prefix
                    }
                    _ => "- ".to_string(),
                };
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                self.pending_prefix = Some(format!("{indent}{prefix}"));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Heading(level) => {
                self.flush_line();
                if level > HeadingLevel::H2 {
                    self.bold_depth = self.bold_depth.saturating_sub(1);
                }
                self.scale = 1;
                self.blank_line();
            }
            TagEnd::Paragraph => {
                self.flush_line();
                // Paragraph spacing only outside list items.
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Strong => self.bold_depth = self.bold_depth.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis_depth = self.emphasis_depth.saturating_sub(1),
            TagEnd::Item => self.flush_line(),
            TagEnd::List(_) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        let mut content = String::new();
        if let Some(prefix) = self.pending_prefix.take() {
            content.push_str(&prefix);
        }
        content.push_str(text);
        self.current.push(TextSpan {
            text: content,
            bold: self.bold_depth > 0,
            underline: self.emphasis_depth > 0,
            code: false,
        });
    }

    fn push_code(&mut self, code: &str) {
        let mut content = String::new();
        if let Some(prefix) = self.pending_prefix.take() {
            self.current.push(TextSpan {
                text: prefix,
                bold: self.bold_depth > 0,
                ..Default::default()
            });
        }
        content.push_str(code);
        self.current.push(TextSpan {
            text: content,
            bold: false,
            underline: false,
            code: true,
        });
    }

    fn push_rule(&mut self) {
        self.flush_line();
        let width = (CONTAINER_WIDTH / CHAR_WIDTH) as usize;
        self.lines.push(TextLine::plain("\u{2500}".repeat(width), 1));
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            let spans = std::mem::take(&mut self.current);
            self.lines.push(TextLine {
                spans,
                scale: self.scale.max(1),
            });
        }
    }

    fn blank_line(&mut self) {
        if !self.lines.is_empty() {
            self.lines.push(TextLine::blank());
        }
    }

    fn finish(mut self) -> Vec<TextLine> {
        self.flush_line();
        // Drop trailing paragraph spacing.
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}
