//! Toast notifications.
//!
//! Only one toast is visible at a time. Each toast schedules its own expiry
//! on the tokio runtime; showing a new toast cancels the previous timer, so
//! a stale timer never removes a newer toast.

use std::time::Duration;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::theme::Palette;

/// Kind of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastLevel {
    Success,
    #[default]
    Info,
    Error,
}

impl ToastLevel {
    /// ASCII icon shown before the message.
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Success => "[+]",
            ToastLevel::Info => "[i]",
            ToastLevel::Error => "[x]",
        }
    }

    pub fn color(&self, palette: &Palette) -> Color {
        match self {
            ToastLevel::Success => palette.success,
            ToastLevel::Info => palette.accent,
            ToastLevel::Error => palette.error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
}

/// Holds the visible toast and its expiry timer.
pub struct ToastCenter {
    current: Option<Toast>,
    timer: Option<CancellationToken>,
    next_id: u64,
    duration: Duration,
    expired_tx: mpsc::UnboundedSender<u64>,
    expired_rx: mpsc::UnboundedReceiver<u64>,
}

impl ToastCenter {
    pub fn new(duration: Duration) -> Self {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        Self {
            current: None,
            timer: None,
            next_id: 1,
            duration,
            expired_tx,
            expired_rx,
        }
    }

    /// Replace the visible toast. Must be called inside a tokio runtime.
    pub fn show(&mut self, level: ToastLevel, message: impl Into<String>) -> u64 {
        if let Some(previous) = self.timer.take() {
            previous.cancel();
        }

        let id = self.next_id;
        self.next_id += 1;
        self.current = Some(Toast {
            id,
            level,
            message: message.into(),
        });

        let token = CancellationToken::new();
        let child = token.clone();
        let tx = self.expired_tx.clone();
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    let _ = tx.send(id);
                }
            }
        });
        self.timer = Some(token);
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.show(ToastLevel::Success, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.show(ToastLevel::Info, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.show(ToastLevel::Error, message)
    }

    /// Apply expiries that have fired since the last call.
    ///
    /// Returns true when the visible toast went away.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        while let Ok(id) = self.expired_rx.try_recv() {
            if self.current.as_ref().is_some_and(|t| t.id == id) {
                self.current = None;
                self.timer = None;
                changed = true;
            }
        }
        changed
    }

    /// Wait for the next expiry and apply it.
    pub async fn expired(&mut self) -> Option<u64> {
        let id = self.expired_rx.recv().await?;
        if self.current.as_ref().is_some_and(|t| t.id == id) {
            self.current = None;
            self.timer = None;
        }
        Some(id)
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.current = None;
    }
}

impl Drop for ToastCenter {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

/// Renders the visible toast in the top-right corner of the area.
pub struct ToastWidget<'a> {
    toast: Option<&'a Toast>,
    palette: Palette,
}

impl<'a> ToastWidget<'a> {
    pub fn new(center: &'a ToastCenter, palette: Palette) -> Self {
        Self {
            toast: center.current(),
            palette,
        }
    }
}

impl Widget for ToastWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(toast) = self.toast else {
            return;
        };

        let text = format!("{} {}", toast.level.icon(), toast.message);
        let width = (text.chars().count() as u16 + 4)
            .clamp(20, 50)
            .min(area.width.saturating_sub(2));
        let inner_width = width.saturating_sub(2).max(1);
        let lines = (text.chars().count() as u16).div_ceil(inner_width).max(1);
        let height = (lines + 2).min(area.height);
        if width == 0 || height == 0 {
            return;
        }

        let x = area.x + area.width.saturating_sub(width + 1);
        let y = area.y + 1.min(area.height.saturating_sub(height));
        let rect = Rect::new(x, y, width, height);

        let color = toast.level.color(&self.palette);
        Clear.render(rect, buf);
        Paragraph::new(Line::from(vec![
            Span::styled(toast.level.icon(), Style::default().fg(color)),
            Span::raw(" "),
            Span::styled(toast.message.as_str(), Style::default().fg(self.palette.text)),
        ]))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(self.palette.surface_alt)),
        )
        .render(rect, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critic_common::ThemeName;

    const LIFETIME: Duration = Duration::from_millis(3500);

    #[tokio::test(start_paused = true)]
    async fn test_toast_expires_after_lifetime() {
        let mut center = ToastCenter::new(LIFETIME);
        center.success("Review generated");

        tokio::time::sleep(Duration::from_millis(3400)).await;
        assert!(!center.tick());
        assert_eq!(center.current().unwrap().message, "Review generated");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(center.tick());
        assert!(center.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_toast_is_not_cleared_by_old_timer() {
        let mut center = ToastCenter::new(LIFETIME);
        center.info("Theme switched");

        tokio::time::sleep(Duration::from_millis(3000)).await;
        center.error("Copy failed");

        // Past the first toast's deadline.
        tokio::time::sleep(Duration::from_millis(1000)).await;
        center.tick();
        let toast = center.current().unwrap();
        assert_eq!(toast.message, "Copy failed");
        assert_eq!(toast.level, ToastLevel::Error);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        center.tick();
        assert!(center.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_waits_for_timer() {
        let mut center = ToastCenter::new(LIFETIME);
        let id = center.info("hello");
        assert_eq!(center.expired().await, Some(id));
        assert!(center.current().is_none());
    }

    #[tokio::test]
    async fn test_widget_renders_icon_and_message() {
        let mut center = ToastCenter::new(LIFETIME);
        center.success("Copied to clipboard");

        let area = Rect::new(0, 0, 60, 6);
        let mut buf = Buffer::empty(area);
        ToastWidget::new(&center, Palette::for_theme(ThemeName::Cyan)).render(area, &mut buf);

        let row: String = (0..area.width).map(|x| buf[(x, 2)].symbol()).collect();
        assert!(row.contains("[+] Copied to clipboard"), "row was {row:?}");
    }

    #[test]
    fn test_widget_without_toast_draws_nothing() {
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        let widget = ToastWidget {
            toast: None,
            palette: Palette::for_theme(ThemeName::Purple),
        };
        widget.render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }
}
