//! Markdown to styled lines for section bodies.
//!
//! Covers what review feedback actually contains: headings, emphasis,
//! inline code, fenced code blocks, lists and task lists, block quotes,
//! rules and GFM tables. Wrapping is left to the caller.

use pulldown_cmark::{Alignment, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme::Palette;

/// Converts markdown into ratatui lines.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    palette: Palette,
}

impl MarkdownRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn render(&self, markdown: &str) -> Vec<Line<'static>> {
        let mut state = RenderState::new(self.palette);
        let options =
            Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
        for event in Parser::new_ext(markdown, options) {
            state.handle_event(event);
        }
        state.finish()
    }
}

type CellSpans = Vec<Span<'static>>;

/// A table being collected; rendered once its end is seen.
#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    header: Option<Vec<CellSpans>>,
    rows: Vec<Vec<CellSpans>>,
    row: Vec<CellSpans>,
}

impl TableState {
    fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.alignments.len()];
        for row in self.header.iter().chain(&self.rows) {
            for (i, cell) in row.iter().enumerate() {
                if i >= widths.len() {
                    widths.push(0);
                }
                widths[i] = widths[i].max(cell_width(cell));
            }
        }
        widths
    }
}

fn cell_width(cell: &[Span<'_>]) -> usize {
    cell.iter().map(Span::width).sum()
}

struct RenderState {
    palette: Palette,
    table: Option<TableState>,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    /// Next number for ordered lists, `None` for bullet lists.
    list_stack: Vec<Option<u64>>,
    item_prefix: Option<String>,
    blockquote_depth: usize,
    in_code_block: bool,
    needs_blank: bool,
}

impl RenderState {
    fn new(palette: Palette) -> Self {
        Self {
            palette,
            table: None,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![Style::default().fg(palette.text)],
            list_stack: Vec::new(),
            item_prefix: None,
            blockquote_depth: 0,
            in_code_block: false,
            needs_blank: false,
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn code_style(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .bg(self.palette.surface)
    }

    fn add_blank_line_if_needed(&mut self) {
        if self.needs_blank && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.needs_blank = false;
    }

    fn prefix(&mut self) -> Vec<Span<'static>> {
        let mut prefix = Vec::new();
        if self.blockquote_depth > 0 {
            prefix.push(Span::styled(
                "│ ".repeat(self.blockquote_depth),
                self.palette.muted(),
            ));
        }
        if let Some(item) = self.item_prefix.take() {
            prefix.push(Span::styled(item, Style::default().fg(self.palette.accent)));
        } else if !self.list_stack.is_empty() {
            prefix.push(Span::raw("  ".repeat(self.list_stack.len())));
        }
        prefix
    }

    fn flush_line(&mut self) {
        if self.current.is_empty() && self.item_prefix.is_none() {
            return;
        }
        let mut spans = self.prefix();
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) if self.in_code_block => {
                for line in text.lines() {
                    let style = self.code_style();
                    self.current.push(Span::styled(format!("  {line}"), style));
                    self.flush_line();
                }
            }
            Event::Text(text) => {
                let style = self.style();
                self.current.push(Span::styled(text.into_string(), style));
            }
            Event::Code(code) => {
                let style = self.code_style();
                self.current.push(Span::styled(code.into_string(), style));
            }
            Event::SoftBreak => {
                let style = self.style();
                self.current.push(Span::styled(" ", style));
            }
            Event::HardBreak => self.flush_line(),
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.current
                    .push(Span::styled(marker, Style::default().fg(self.palette.accent)));
            }
            Event::Rule => {
                self.flush_line();
                self.add_blank_line_if_needed();
                self.lines
                    .push(Line::styled("─".repeat(40), self.palette.muted()));
                self.needs_blank = true;
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.list_stack.is_empty() {
                    self.add_blank_line_if_needed();
                }
            }
            Tag::Heading { .. } => {
                self.add_blank_line_if_needed();
                self.push_style(self.palette.title());
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.add_blank_line_if_needed();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.add_blank_line_if_needed();
                }
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let marker = match self.list_stack.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.item_prefix = Some(format!("{indent}{marker}"));
            }
            Tag::BlockQuote(_) => {
                if self.blockquote_depth == 0 {
                    self.add_blank_line_if_needed();
                }
                self.blockquote_depth += 1;
            }
            Tag::Table(alignments) => {
                self.flush_line();
                self.add_blank_line_if_needed();
                self.table = Some(TableState {
                    alignments,
                    ..TableState::default()
                });
            }
            Tag::TableHead => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { .. } => self.push_style(
                Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                self.needs_blank = true;
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.pop_style();
                self.needs_blank = true;
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.needs_blank = true;
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
                self.needs_blank = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style()
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.current);
                if let Some(table) = self.table.as_mut() {
                    table.row.push(cell);
                }
            }
            TagEnd::TableHead => {
                self.pop_style();
                if let Some(table) = self.table.as_mut() {
                    table.header = Some(std::mem::take(&mut table.row));
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.render_table(table);
                }
                self.needs_blank = true;
            }
            _ => {}
        }
    }

    fn render_table(&mut self, table: TableState) {
        let widths = table.column_widths();
        let border = self.palette.muted();

        if let Some(header) = &table.header {
            let line = self.table_row(header, &widths, &table.alignments);
            self.lines.push(line);
            let rule = widths
                .iter()
                .map(|w| "─".repeat(*w))
                .collect::<Vec<_>>()
                .join("─┼─");
            self.lines.push(Line::styled(rule, border));
        }
        for row in &table.rows {
            let line = self.table_row(row, &widths, &table.alignments);
            self.lines.push(line);
        }
    }

    /// Cells padded to their column width; the last column is not padded
    /// on the right.
    fn table_row(
        &self,
        cells: &[CellSpans],
        widths: &[usize],
        alignments: &[Alignment],
    ) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", self.palette.muted()));
            }
            let cell = cells.get(i).map(Vec::as_slice).unwrap_or_default();
            let gap = width.saturating_sub(cell_width(cell));
            let (before, after) = match alignments.get(i) {
                Some(Alignment::Right) => (gap, 0),
                Some(Alignment::Center) => (gap / 2, gap - gap / 2),
                _ => (0, gap),
            };
            let after = if i + 1 == widths.len() { 0 } else { after };

            if before > 0 {
                spans.push(Span::raw(" ".repeat(before)));
            }
            spans.extend(cell.iter().cloned());
            if after > 0 {
                spans.push(Span::raw(" ".repeat(after)));
            }
        }
        Line::from(spans)
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        self.lines
    }
}
