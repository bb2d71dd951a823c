//! Frame rendering.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, FeedbackViewport, Focus, LOADING_STEPS, View};
use crate::markdown::MarkdownRenderer;
use crate::theme::Palette;
use crate::toast::ToastWidget;

const ALLOWED_HINT: &str = "Allowed: .py .js .ts .jsx .java .cpp .c .cs";

pub fn render(f: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme);
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.background)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Hints
        ])
        .split(area);

    render_header(f, app, &palette, chunks[0]);
    match app.view {
        View::Upload => render_upload(f, app, &palette, chunks[1]),
        View::Feedback => render_feedback(f, app, &palette, chunks[1]),
    }
    render_hints(f, app, &palette, chunks[2]);

    if app.is_loading() {
        render_loading(f, app, &palette, area);
    }

    f.render_widget(ToastWidget::new(app.toasts(), palette), area);
}

fn render_header(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" Critic", palette.title()),
        Span::styled(" · AI code review", palette.dim()),
        Span::styled(format!("  [{}]", app.theme), palette.muted()),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn render_hints(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let hints = match app.view {
        View::Upload => match app.focus {
            Focus::Path => concat!(
                " Enter select · Ctrl+R submit · Ctrl+L clear",
                " · Tab history · Ctrl+T theme · Ctrl+C quit"
            )
            .to_string(),
            Focus::History => " ↑↓ move · Enter load · Tab back · Ctrl+R submit".to_string(),
        },
        View::Feedback => {
            let expand = if app.expanded { "collapse" } else { "expand" };
            format!(
                " ↑↓ section · j/k PgUp/PgDn scroll · v view · e {expand} · {}",
                "c copy · b back · q quit"
            )
        }
    };
    f.render_widget(Paragraph::new(hints).style(palette.muted()), area);
}

fn render_upload(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(Span::styled(" Upload Code for AI Review ", palette.title()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Path input
            Constraint::Length(1), // Selected file
            Constraint::Length(1), // Allowed types
            Constraint::Min(3),    // Preview + history
            Constraint::Length(1), // Error
        ])
        .split(inner);

    let input_style = if app.focus == Focus::Path {
        Style::default().fg(palette.text)
    } else {
        palette.dim()
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Path › ", Style::default().fg(palette.accent)),
            Span::styled(app.path_input.as_str(), input_style),
        ])),
        rows[0],
    );
    if app.focus == Focus::Path && !app.is_loading() {
        let typed = u16::try_from(app.path_input.width()).unwrap_or(u16::MAX);
        let cursor_x = rows[0].x.saturating_add(7).saturating_add(typed);
        f.set_cursor_position((
            cursor_x.min(rows[0].right().saturating_sub(1)),
            rows[0].y,
        ));
    }

    let file_line = match &app.file {
        Some(file) => Line::from(vec![
            Span::styled(
                file.name(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", file.size_label()), palette.dim()),
        ]),
        None => Line::styled(
            "Type or drop a file path here, then press Enter",
            palette.dim(),
        ),
    };
    f.render_widget(Paragraph::new(file_line), rows[1]);
    f.render_widget(Paragraph::new(ALLOWED_HINT).style(palette.muted()), rows[2]);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[3]);
    render_preview(f, app, palette, panels[0]);
    render_history(f, app, palette, panels[1]);

    if let Some(error) = &app.error {
        f.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(palette.error)),
            rows[4],
        );
    }
}

fn render_preview(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(Span::styled(" Preview (first 80 lines) ", palette.dim()));

    let paragraph = match &app.preview {
        Some(text) => Paragraph::new(text.as_str()).style(Style::default().fg(palette.text)),
        None => Paragraph::new("No file selected").style(palette.muted()),
    };
    f.render_widget(paragraph.block(block), area);
}

fn render_history(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let border = if app.focus == Focus::History {
        Style::default().fg(palette.accent)
    } else {
        palette.border()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(" History ", palette.dim()));

    if app.history.is_empty() {
        f.render_widget(
            Paragraph::new("No uploads yet").style(palette.muted()).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .iter()
        .map(|record| {
            let at = record.at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
            ListItem::new(vec![
                Line::styled(record.name.clone(), Style::default().fg(palette.text)),
                Line::styled(format!("  {at}"), palette.muted()),
            ])
        })
        .collect();

    let mut state = ListState::default();
    if app.focus == Focus::History {
        state.select(Some(app.history_selected));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(palette.selected());
    f.render_stateful_widget(list, area, &mut state);
}

fn render_feedback(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(Span::styled(" AI Code Review Report ", palette.title()));
    let inner = block.inner(area);

    let renderer = MarkdownRenderer::new(*palette);
    let mut lines: Vec<Line<'static>> = vec![
        Line::styled("Readable suggestions, issues, and score", palette.dim()),
        Line::default(),
    ];

    for (i, section) in app
        .sections
        .iter()
        .enumerate()
        .skip(app.first_visible_section)
    {
        let selected = i == app.section_selected;
        let marker = if selected { "› " } else { "  " };
        let title_style = if selected {
            palette.selected()
        } else {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(palette.accent)),
            Span::styled(section.title.clone(), title_style),
        ]));

        if app.expanded {
            lines.extend(
                renderer
                    .render(&section.body)
                    .into_iter()
                    .map(|line| indent(line, "    ")),
            );
        }
        lines.push(Line::default());
    }

    let rows = wrap_lines(lines, usize::from(inner.width));
    let viewport = FeedbackViewport {
        content_rows: rows.len(),
        height: usize::from(inner.height),
    };
    app.feedback_viewport.set(viewport);
    let offset = app.feedback_scroll.min(viewport.max_scroll());

    let block = if viewport.max_scroll() > 0 {
        block.title_bottom(
            Line::styled(
                format!(" {}/{} ", offset + viewport.height.min(rows.len()), rows.len()),
                palette.muted(),
            )
            .right_aligned(),
        )
    } else {
        block
    };
    f.render_widget(block, area);

    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(rows).scroll((offset, 0)), inner);
}

fn indent(mut line: Line<'static>, prefix: &'static str) -> Line<'static> {
    line.spans.insert(0, Span::raw(prefix));
    line
}

/// Wrap styled lines to `width` columns, breaking at whitespace where
/// possible. Continuation rows keep the line's leading indentation.
fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if line.width() <= width {
        return vec![line];
    }

    let leading: usize = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars())
        .take_while(|c| *c == ' ')
        .count();
    let mut rows = RowBuilder {
        width,
        indent: leading.min(width / 2),
        style: line.style,
        rows: Vec::new(),
        spans: Vec::new(),
        used: 0,
    };
    for span in &line.spans {
        for piece in split_words(&span.content) {
            rows.push(piece, span.style);
        }
    }
    rows.finish()
}

struct RowBuilder {
    width: usize,
    indent: usize,
    style: Style,
    rows: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    used: usize,
}

impl RowBuilder {
    fn push(&mut self, piece: &str, style: Style) {
        let piece_width = piece.width();
        if self.used + piece_width > self.width && self.used > self.indent_used() {
            self.break_row();
            if piece.trim().is_empty() {
                return;
            }
        }

        if self.used + piece_width <= self.width {
            self.spans.push(Span::styled(piece.to_string(), style));
            self.used += piece_width;
            return;
        }

        // Longer than a whole row: break inside the word.
        let mut chunk = String::new();
        for ch in piece.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if self.used + ch_width > self.width && self.used > self.indent_used() {
                if !chunk.is_empty() {
                    self.spans.push(Span::styled(std::mem::take(&mut chunk), style));
                }
                self.break_row();
            }
            chunk.push(ch);
            self.used += ch_width;
        }
        if !chunk.is_empty() {
            self.spans.push(Span::styled(chunk, style));
        }
    }

    /// Columns taken by the continuation indent on the current row.
    fn indent_used(&self) -> usize {
        if self.rows.is_empty() { 0 } else { self.indent }
    }

    fn break_row(&mut self) {
        let spans = std::mem::take(&mut self.spans);
        self.rows.push(Line::from(spans).style(self.style));
        self.spans.push(Span::raw(" ".repeat(self.indent)));
        self.used = self.indent;
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if self.used > self.indent_used() || self.rows.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            self.rows.push(Line::from(spans).style(self.style));
        }
        self.rows
    }
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let blank = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != blank)
            .map_or(rest.len(), |(i, _)| i);
        let (word, tail) = rest.split_at(end);
        rest = tail;
        Some(word)
    })
}

fn render_loading(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let width = 60.min(area.width.saturating_sub(4));
    let height = 9.min(area.height);
    let rect = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    let current = app.loading_step().unwrap_or(0);
    let mut lines = vec![
        Line::styled("Analyzing your code…", palette.title()),
        Line::styled(
            "This uses an external AI model, results may take a few seconds.",
            palette.dim(),
        ),
        Line::default(),
    ];
    lines.extend(LOADING_STEPS.iter().enumerate().map(|(i, step)| {
        let style = if i == current {
            Style::default().fg(palette.accent)
        } else {
            palette.muted()
        };
        Line::styled(*step, style)
    }));

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.border())
                    .style(Style::default().bg(palette.surface)),
            ),
        rect,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use critic_common::ThemeName;
    use critic_review::{
        BoundaryPolicy, InMemoryHistory, RawFeedback, ReviewClient, SelectedFile,
        SubmissionFlow, SubmissionOutcome, UploadRecord,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::app::{AppEvent, AppOptions};

    fn app() -> App {
        let client = ReviewClient::new("http://127.0.0.1:9/upload", None).unwrap();
        let flow = SubmissionFlow::new(client, Arc::new(InMemoryHistory::new()));
        App::new(AppOptions {
            flow,
            policy: BoundaryPolicy::default(),
            theme: ThemeName::Cyan,
            toast_duration: Duration::from_millis(3500),
            history: vec![UploadRecord::now("earlier.rs.py")],
        })
        .0
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buf = terminal.backend().buffer().clone();
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_upload_view_empty_state() {
        let screen = draw(&app());
        assert!(screen.contains("Upload Code for AI Review"));
        assert!(screen.contains("No file selected"));
        assert!(screen.contains("earlier.rs.py"));
        assert!(screen.contains(ALLOWED_HINT));
    }

    #[tokio::test]
    async fn test_upload_view_with_selection() {
        let mut app = app();
        app.file = Some(SelectedFile::from_bytes("main.py", vec![b'x'; 2048]));
        app.preview = Some("import os".into());
        app.error = Some("bad file".into());

        let screen = draw(&app);
        assert!(screen.contains("main.py  2.0 KB"));
        assert!(screen.contains("import os"));
        assert!(screen.contains("bad file"));
        assert!(!screen.contains("No file selected"));
    }

    #[tokio::test]
    async fn test_feedback_view_sections() {
        let mut app = app();
        app.handle_event(AppEvent::Submitted(Ok(SubmissionOutcome {
            feedback: RawFeedback::new("## Style\nuse `snake_case`\n## Security\nno secrets"),
            history: None,
        })));

        let screen = draw(&app);
        assert!(screen.contains("AI Code Review Report"));
        assert!(screen.contains("› Style"));
        assert!(screen.contains("use snake_case"));
        assert!(screen.contains("Security"));
        assert!(screen.contains("[+] Review generated"));

        app.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));
        let collapsed = draw(&app);
        assert!(collapsed.contains("Security"));
        assert!(!collapsed.contains("no secrets"));
        assert!(collapsed.contains("e expand"));
    }

    fn long_review() -> String {
        let items: String = (1..=60).map(|i| format!("- finding {i:02}\n")).collect();
        format!("## Issues\n{items}## Score\n7/10")
    }

    #[tokio::test]
    async fn test_long_section_scrolls_to_last_line() {
        let mut app = app();
        app.handle_event(AppEvent::Submitted(Ok(SubmissionOutcome {
            feedback: RawFeedback::new(long_review()),
            history: None,
        })));

        let first = draw(&app);
        assert!(first.contains("finding 01"));
        assert!(!first.contains("finding 60"));

        let mut pages = 0;
        loop {
            app.handle_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
            pages += 1;
            let screen = draw(&app);
            if screen.contains("finding 60") {
                assert!(screen.contains("7/10"));
                break;
            }
            assert!(pages < 10, "last finding never came into view");
        }

        app.handle_key(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));
        assert!(draw(&app).contains("finding 01"));

        app.handle_key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE));
        let bottom = draw(&app);
        assert!(bottom.contains("finding 60"));
        assert!(bottom.contains("7/10"));
    }

    #[tokio::test]
    async fn test_single_review_section_scrolls() {
        let mut app = app();
        let body: String = (1..=80).map(|i| format!("Line {i:02} of the review.\n\n")).collect();
        app.handle_event(AppEvent::Submitted(Ok(SubmissionOutcome {
            feedback: RawFeedback::new(body),
            history: None,
        })));

        assert!(!draw(&app).contains("Line 80"));
        app.handle_key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE));
        assert!(draw(&app).contains("Line 80"));
    }

    fn row_text(rows: &[Line<'_>]) -> Vec<String> {
        rows.iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        let rows = wrap_lines(vec![Line::from("hello world foo")], 11);
        assert_eq!(row_text(&rows), vec!["hello world", "foo"]);
    }

    #[test]
    fn test_wrap_keeps_indent_on_continuation() {
        let line = Line::from(vec![Span::raw("    "), Span::raw("aaa bbb")]);
        let rows = wrap_lines(vec![line], 8);
        assert_eq!(row_text(&rows), vec!["    aaa ", "    bbb"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let rows = wrap_lines(vec![Line::from("abcdefghij")], 4);
        assert_eq!(row_text(&rows), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_leaves_short_and_blank_lines() {
        let rows = wrap_lines(vec![Line::from("short"), Line::default()], 20);
        assert_eq!(row_text(&rows), vec!["short", ""]);
    }

    #[tokio::test]
    async fn test_loading_overlay() {
        let mut app = app();
        app.file = Some(SelectedFile::from_bytes("main.py", b"x".to_vec()));
        app.handle_key(KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE));

        let screen = draw(&app);
        assert!(screen.contains("Analyzing your code…"));
        for step in LOADING_STEPS {
            assert!(screen.contains(step), "missing step {step}");
        }
    }
}
