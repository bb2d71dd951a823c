//! Terminal setup and the main event loop.

use std::io::{Stdout, stdout};
use std::panic;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info, warn};

use crate::app::{App, AppOptions};
use crate::ui;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Everything the TUI needs to start.
pub struct TuiOptions {
    pub app: AppOptions,
    /// File to select on startup.
    pub initial_file: Option<PathBuf>,
}

/// Puts the terminal into raw alternate-screen mode and restores it on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, EnableBracketedPaste, SetTitle("Critic"))?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal() {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

fn restore_terminal() -> Result<()> {
    let mut out = stdout();
    execute!(out, DisableBracketedPaste, LeaveAlternateScreen, crossterm::cursor::Show)?;
    disable_raw_mode()?;
    Ok(())
}

/// Restore the terminal before the default panic output is printed.
fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Run the interactive UI until the user quits.
pub async fn run(options: TuiOptions) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (mut app, events) = App::new(options.app);
    if let Some(path) = options.initial_file {
        app.handle_paste(&path.display().to_string());
    }

    info!("TUI started");
    let result = run_loop(&mut terminal, &mut app, events).await;
    info!("TUI stopped");
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    mut events: tokio::sync::mpsc::UnboundedReceiver<crate::app::AppEvent>,
) -> Result<()> {
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK_INTERVAL);
    let mut dirty = true;

    loop {
        if dirty {
            terminal.draw(|f| ui::render(f, app))?;
            dirty = false;
        }

        tokio::select! {
            maybe_event = input.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key);
                        dirty = true;
                    }
                    Some(Ok(Event::Paste(text))) => {
                        debug!(len = text.len(), "Paste received");
                        app.handle_paste(&text);
                        dirty = true;
                    }
                    Some(Ok(Event::Resize(_, _))) => dirty = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            Some(event) = events.recv() => {
                app.handle_event(event);
                dirty = true;
            }
            _ = tick.tick() => {
                dirty |= app.tick();
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
