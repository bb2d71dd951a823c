//! Application state and input handling.
//!
//! The state machine is synchronous. File selection and submissions run as
//! spawned tasks that report back through [`AppEvent`]s, which the runner
//! feeds into [`App::handle_event`] in arrival order.

use std::cell::Cell;
use std::path::Path;
use std::time::{Duration, Instant};

use critic_common::ThemeName;
use critic_review::{
    BoundaryPolicy, RawFeedback, Section, SelectedFile, SubmissionError, SubmissionFlow,
    SubmissionOutcome, UploadRecord, preview, validate_file_name, validate_selection,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clipboard::{self, ClipboardError};
use crate::toast::ToastCenter;

pub const LOAD_FROM_HISTORY_MESSAGE: &str = "Fetching file from repo not supported—upload again";

/// Progress steps shown while a review is pending.
pub const LOADING_STEPS: [&str; 3] = [
    "Scanning structure...",
    "Checking best practices...",
    "Assessing security patterns...",
];

const LOADING_STEP_INTERVAL: Duration = Duration::from_millis(1200);

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Upload,
    Feedback,
}

/// Input focus on the upload screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Path,
    History,
}

/// Size of the feedback pane at the last draw, in wrapped rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FeedbackViewport {
    pub(crate) content_rows: usize,
    pub(crate) height: usize,
}

impl FeedbackViewport {
    pub(crate) fn max_scroll(&self) -> usize {
        self.content_rows.saturating_sub(self.height)
    }
}

/// Results of background work.
///
/// File selection events carry the sequence number of the selection that
/// started them; only the latest selection is applied.
#[derive(Debug)]
pub enum AppEvent {
    FileSelected {
        seq: u64,
        file: SelectedFile,
        preview: Option<String>,
    },
    FileSelectFailed {
        seq: u64,
        path: String,
        message: String,
    },
    Submitted(Result<SubmissionOutcome, SubmissionError>),
}

impl AppEvent {
    fn selection_seq(&self) -> Option<u64> {
        match self {
            AppEvent::FileSelected { seq, .. } | AppEvent::FileSelectFailed { seq, .. } => {
                Some(*seq)
            }
            AppEvent::Submitted(_) => None,
        }
    }
}

/// Writes text to the clipboard.
pub type Copier = Box<dyn Fn(String) -> Result<(), ClipboardError> + Send>;

/// Startup settings for [`App`].
pub struct AppOptions {
    pub flow: SubmissionFlow,
    pub policy: BoundaryPolicy,
    pub theme: ThemeName,
    pub toast_duration: Duration,
    pub history: Vec<UploadRecord>,
}

pub struct App {
    pub(crate) view: View,
    pub(crate) focus: Focus,
    pub(crate) path_input: String,
    pub(crate) file: Option<SelectedFile>,
    pub(crate) preview: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) history: Vec<UploadRecord>,
    pub(crate) history_selected: usize,
    pub(crate) feedback: Option<RawFeedback>,
    pub(crate) sections: Vec<Section>,
    pub(crate) expanded: bool,
    pub(crate) section_selected: usize,
    pub(crate) first_visible_section: usize,
    /// Wrapped rows scrolled past, counted from `first_visible_section`.
    pub(crate) feedback_scroll: usize,
    /// Written by the renderer, read when clamping scroll keys.
    pub(crate) feedback_viewport: Cell<FeedbackViewport>,
    pub(crate) theme: ThemeName,
    pub(crate) toasts: ToastCenter,
    in_flight: usize,
    selection_seq: u64,
    loading_since: Option<Instant>,
    flow: SubmissionFlow,
    policy: BoundaryPolicy,
    events: mpsc::UnboundedSender<AppEvent>,
    copier: Copier,
    should_quit: bool,
}

impl App {
    /// Create the app and the receiver for its background events.
    pub fn new(options: AppOptions) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let app = Self {
            view: View::Upload,
            focus: Focus::Path,
            path_input: String::new(),
            file: None,
            preview: None,
            error: None,
            history: options.history,
            history_selected: 0,
            feedback: None,
            sections: Vec::new(),
            expanded: true,
            section_selected: 0,
            first_visible_section: 0,
            feedback_scroll: 0,
            feedback_viewport: Cell::new(FeedbackViewport::default()),
            theme: options.theme,
            toasts: ToastCenter::new(options.toast_duration),
            in_flight: 0,
            selection_seq: 0,
            loading_since: None,
            flow: options.flow,
            policy: options.policy,
            events,
            copier: Box::new(clipboard::copy_text_detached),
            should_quit: false,
        };
        (app, rx)
    }

    /// Replace the clipboard writer.
    pub fn with_copier(mut self, copier: Copier) -> Self {
        self.copier = copier;
        self
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn theme(&self) -> ThemeName {
        self.theme
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn history(&self) -> &[UploadRecord] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Index into [`LOADING_STEPS`] to highlight, `None` when idle.
    pub fn loading_step(&self) -> Option<usize> {
        let since = self.loading_since?;
        let step = since.elapsed().as_millis() / LOADING_STEP_INTERVAL.as_millis();
        Some(step as usize % LOADING_STEPS.len())
    }

    pub fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }

    /// Periodic housekeeping. Returns true when a redraw is needed.
    pub fn tick(&mut self) -> bool {
        self.toasts.tick() || self.is_loading()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('t') if ctrl => {
                self.toggle_theme();
                return;
            }
            _ => {}
        }

        match self.view {
            View::Upload => self.handle_upload_key(key),
            View::Feedback => self.handle_feedback_key(key),
        }
    }

    fn handle_upload_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('r') if ctrl => self.submit(),
            KeyCode::F(5) => self.submit(),
            KeyCode::Char('l') if ctrl => self.clear(),
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            _ => match self.focus {
                Focus::Path => self.handle_path_key(key),
                Focus::History => self.handle_history_key(key),
            },
        }
    }

    fn handle_path_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.path_input.push(c);
            }
            KeyCode::Backspace => {
                self.path_input.pop();
            }
            KeyCode::Esc => self.path_input.clear(),
            KeyCode::Enter => {
                let path = self.path_input.trim().to_string();
                self.select_path(path);
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.history_selected = self.history_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.history_selected + 1 < self.history.len() {
                    self.history_selected += 1;
                }
            }
            KeyCode::Enter => self.load_from_history(),
            KeyCode::Esc => self.focus = Focus::Path,
            _ => {}
        }
    }

    fn handle_feedback_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.select_section(-1),
            KeyCode::Down => self.select_section(1),
            KeyCode::Char('k') => self.scroll_feedback(-1),
            KeyCode::Char('j') => self.scroll_feedback(1),
            KeyCode::PageUp => self.scroll_feedback(-self.page_rows()),
            KeyCode::PageDown => self.scroll_feedback(self.page_rows()),
            KeyCode::Home | KeyCode::Char('g') => self.feedback_scroll = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.feedback_scroll = self.feedback_viewport.get().max_scroll();
            }
            KeyCode::Char('e') => self.expanded = !self.expanded,
            KeyCode::Char('c') | KeyCode::Char('y') => self.copy_selected_section(),
            KeyCode::Char('v') | KeyCode::Enter => self.view_selected_section(),
            KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    /// Pasted text on the upload screen is taken as a dropped file path.
    pub fn handle_paste(&mut self, text: &str) {
        if self.view != View::Upload {
            return;
        }
        let path = normalize_dropped_path(text);
        if path.is_empty() {
            return;
        }
        self.focus = Focus::Path;
        self.path_input = path.clone();
        self.select_path(path);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        if let Some(seq) = event.selection_seq()
            && seq != self.selection_seq
        {
            debug!(seq, latest = self.selection_seq, "Dropping stale file selection");
            return;
        }

        match event {
            AppEvent::FileSelected { file, preview, .. } => {
                debug!(file = %file.name(), size = file.size(), "File selected");
                self.file = Some(file);
                self.preview = preview;
            }
            AppEvent::FileSelectFailed { path, message, .. } => {
                warn!(path = %path, error = %message, "Failed to open file");
                self.error = Some(format!("Cannot open {path}: {message}"));
                self.toasts.error("Cannot open file");
            }
            AppEvent::Submitted(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if self.in_flight == 0 {
                    self.loading_since = None;
                }
                match result {
                    Ok(outcome) => self.show_feedback(outcome),
                    Err(e) => {
                        info!(error = %e, "Submission failed");
                        self.error = Some(e.to_string());
                        self.toasts.error(e.toast_message());
                    }
                }
            }
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toasts.info("Theme switched");
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Path if !self.history.is_empty() => Focus::History,
            _ => Focus::Path,
        };
    }

    /// Accept `path` as the selection if its extension is supported.
    ///
    /// A rejected path leaves the current selection in place.
    fn select_path(&mut self, path: String) {
        self.error = None;
        if path.is_empty() {
            return;
        }

        let name = Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        if let Err(e) = validate_file_name(&name) {
            self.error = Some(e.to_string());
            self.toasts.error(e.toast_message());
            return;
        }

        self.selection_seq += 1;
        let seq = self.selection_seq;
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = match SelectedFile::open(&path).await {
                Ok(file) => {
                    let preview = preview(Some(&file)).await;
                    AppEvent::FileSelected { seq, file, preview }
                }
                Err(e) => AppEvent::FileSelectFailed {
                    seq,
                    path,
                    message: e.to_string(),
                },
            };
            let _ = events.send(event);
        });
    }

    /// Drop the selection, including any still loading.
    fn clear(&mut self) {
        self.selection_seq += 1;
        self.file = None;
        self.preview = None;
        self.error = None;
        self.path_input.clear();
    }

    fn load_from_history(&mut self) {
        if let Some(record) = self.history.get(self.history_selected) {
            debug!(file = %record.name, "History entry activated");
            self.toasts.info(LOAD_FROM_HISTORY_MESSAGE);
        }
    }

    /// Start a submission of the current selection.
    ///
    /// Nothing stops a second submission while one is pending; whichever
    /// response arrives last is what stays on screen.
    fn submit(&mut self) {
        self.error = None;
        let file = match validate_selection(self.file.as_ref()) {
            Ok(file) => file.clone(),
            Err(e) => {
                self.error = Some(e.to_string());
                self.toasts.error(e.toast_message());
                return;
            }
        };

        info!(
            file = %file.name(),
            endpoint = %self.flow.client().endpoint(),
            "Submitting file for review"
        );
        self.in_flight += 1;
        self.loading_since.get_or_insert_with(Instant::now);

        let flow = self.flow.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = flow.submit(Some(&file)).await;
            let _ = events.send(AppEvent::Submitted(result));
        });
    }

    fn show_feedback(&mut self, outcome: SubmissionOutcome) {
        self.sections = outcome.feedback.sections(self.policy);
        self.feedback = Some(outcome.feedback);
        if let Some(history) = outcome.history {
            self.history = history;
            self.history_selected = 0;
        }
        self.section_selected = 0;
        self.first_visible_section = 0;
        self.feedback_scroll = 0;
        self.view = View::Feedback;
        self.toasts.success("Review generated");
    }

    fn select_section(&mut self, delta: isize) {
        if self.sections.is_empty() {
            return;
        }
        let last = self.sections.len() - 1;
        self.section_selected = self.section_selected.saturating_add_signed(delta).min(last);
        if self.section_selected < self.first_visible_section {
            self.first_visible_section = self.section_selected;
            self.feedback_scroll = 0;
        }
    }

    /// Scroll so the selected section is the first one shown.
    fn view_selected_section(&mut self) {
        self.first_visible_section = self.section_selected;
        self.feedback_scroll = 0;
    }

    /// Move the feedback pane by `delta` wrapped rows, within the content
    /// measured at the last draw.
    fn scroll_feedback(&mut self, delta: isize) {
        let max = self.feedback_viewport.get().max_scroll();
        self.feedback_scroll = self.feedback_scroll.saturating_add_signed(delta).min(max);
    }

    /// One screen of feedback, keeping a row of context.
    fn page_rows(&self) -> isize {
        let height = self.feedback_viewport.get().height.saturating_sub(1).max(1);
        isize::try_from(height).unwrap_or(isize::MAX)
    }

    fn copy_selected_section(&mut self) {
        let Some(section) = self.sections.get(self.section_selected) else {
            return;
        };
        match (self.copier)(section.body.clone()) {
            Ok(()) => {
                self.toasts.success("Copied to clipboard");
            }
            Err(e) => {
                warn!(error = %e, "Copy failed");
                self.toasts.error("Copy failed");
            }
        }
    }

    /// Return to the upload screen, dropping the current feedback.
    fn back(&mut self) {
        self.feedback = None;
        self.sections.clear();
        self.section_selected = 0;
        self.first_visible_section = 0;
        self.feedback_scroll = 0;
        self.view = View::Upload;
    }
}

/// Turn pasted text into a path: first line, surrounding quotes and a
/// `file://` prefix removed.
pub fn normalize_dropped_path(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let trimmed = line.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    unquoted
        .strip_prefix("file://")
        .unwrap_or(unquoted)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use critic_review::{InMemoryHistory, ReviewClient};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_with_endpoint(endpoint: &str) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let client = ReviewClient::new(endpoint, None).unwrap();
        let flow = SubmissionFlow::new(client, Arc::new(InMemoryHistory::new()));
        App::new(AppOptions {
            flow,
            policy: BoundaryPolicy::default(),
            theme: ThemeName::Cyan,
            toast_duration: Duration::from_millis(3500),
            history: Vec::new(),
        })
    }

    fn app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        app_with_endpoint("http://127.0.0.1:9/upload")
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn toast_message(app: &App) -> Option<String> {
        app.toasts().current().map(|t| t.message.clone())
    }

    fn feedback_app(body: &str) -> App {
        let (mut app, _rx) = app();
        app.handle_event(AppEvent::Submitted(Ok(SubmissionOutcome {
            feedback: RawFeedback::new(body),
            history: Some(vec![UploadRecord::now("main.py")]),
        })));
        app
    }

    #[tokio::test]
    async fn test_unsupported_path_is_rejected() {
        let (mut app, _rx) = app();
        type_text(&mut app, "/tmp/setup.exe");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.selected_file().is_none());
        assert_eq!(
            app.error(),
            Some("Unsupported file type. Supported: py, js, ts, java, cpp, c, cs")
        );
        assert_eq!(toast_message(&app).as_deref(), Some("Unsupported file type"));
    }

    #[tokio::test]
    async fn test_selecting_file_loads_preview() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("main.py");
        std::fs::write(&path, "print('hi')\n").unwrap();

        let (mut app, mut rx) = app();
        type_text(&mut app, &path.display().to_string());
        app.handle_key(key(KeyCode::Enter));
        let event = rx.recv().await.unwrap();
        app.handle_event(event);

        assert_eq!(app.selected_file().unwrap().name(), "main.py");
        assert_eq!(app.preview.as_deref(), Some("print('hi')\n"));
        assert!(app.error().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_reports_error() {
        let (mut app, mut rx) = app();
        app.handle_paste("/nowhere/at/all.js");
        let event = rx.recv().await.unwrap();
        app.handle_event(event);

        assert!(app.selected_file().is_none());
        assert!(app.error().unwrap().starts_with("Cannot open /nowhere/at/all.js"));
    }

    #[tokio::test]
    async fn test_submit_without_file() {
        let (mut app, _rx) = app();
        app.handle_key(ctrl('r'));

        assert_eq!(app.error(), Some("Please select a file first."));
        assert_eq!(toast_message(&app).as_deref(), Some("Pick a file to upload"));
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_theme_toggle() {
        let (mut app, _rx) = app();
        app.handle_key(ctrl('t'));
        assert_eq!(app.theme(), ThemeName::Purple);
        assert_eq!(toast_message(&app).as_deref(), Some("Theme switched"));
        app.handle_key(ctrl('t'));
        assert_eq!(app.theme(), ThemeName::Cyan);
    }

    #[tokio::test]
    async fn test_submission_shows_feedback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"feedback": "## A\nfoo\n## B\nbar"})),
            )
            .mount(&server)
            .await;

        let (mut app, mut rx) = app_with_endpoint(&format!("{}/upload", server.uri()));
        app.file = Some(SelectedFile::from_bytes("main.py", b"x = 1".to_vec()));
        app.handle_key(key(KeyCode::F(5)));
        assert!(app.is_loading());
        assert_eq!(app.loading_step(), Some(0));

        let event = rx.recv().await.unwrap();
        app.handle_event(event);

        assert!(!app.is_loading());
        assert_eq!(app.view(), View::Feedback);
        let titles: Vec<&str> = app.sections().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(app.history().len(), 1);
        assert_eq!(toast_message(&app).as_deref(), Some("Review generated"));
    }

    #[tokio::test]
    async fn test_server_error_is_shown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"detail": "bad file"})),
            )
            .mount(&server)
            .await;

        let (mut app, mut rx) = app_with_endpoint(&format!("{}/upload", server.uri()));
        app.file = Some(SelectedFile::from_bytes("main.py", Vec::new()));
        app.handle_key(ctrl('r'));
        let event = rx.recv().await.unwrap();
        app.handle_event(event);

        assert_eq!(app.view(), View::Upload);
        assert_eq!(app.error(), Some("bad file"));
        assert_eq!(toast_message(&app).as_deref(), Some("bad file"));
    }

    #[tokio::test]
    async fn test_feedback_navigation_and_back() {
        let mut app = feedback_app("## A\nfoo\n## B\nbar\n## C\nbaz");
        assert!(app.expanded);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.section_selected, 2);

        app.handle_key(key(KeyCode::Char('v')));
        assert_eq!(app.first_visible_section, 2);
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.first_visible_section, 1);

        app.handle_key(key(KeyCode::Char('e')));
        assert!(!app.expanded);

        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.view(), View::Upload);
        assert!(app.feedback.is_none());
        assert!(app.sections().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_scroll_is_clamped() {
        let mut app = feedback_app("## A\nfoo\n## B\nbar");
        app.feedback_viewport.set(FeedbackViewport {
            content_rows: 50,
            height: 10,
        });

        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.feedback_scroll, 1);
        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.feedback_scroll, 10);
        app.handle_key(key(KeyCode::End));
        assert_eq!(app.feedback_scroll, 40);
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.feedback_scroll, 40);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.feedback_scroll, 39);
        app.handle_key(key(KeyCode::PageUp));
        assert_eq!(app.feedback_scroll, 30);
        app.handle_key(key(KeyCode::Home));
        assert_eq!(app.feedback_scroll, 0);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.feedback_scroll, 0);

        // Sections still move with the arrows, and jumping resets the offset.
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.section_selected, 1);
        app.handle_key(key(KeyCode::Char('v')));
        assert_eq!(app.first_visible_section, 1);
        assert_eq!(app.feedback_scroll, 0);

        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.feedback_scroll, 0);
    }

    #[tokio::test]
    async fn test_scroll_waits_for_first_draw() {
        let mut app = feedback_app("plain review");
        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.feedback_scroll, 0);
    }

    fn selected_name(event: &AppEvent) -> &str {
        match event {
            AppEvent::FileSelected { file, .. } => file.name(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_only_latest_selection_is_applied() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first.py");
        let second = tmp.path().join("second.py");
        std::fs::write(&first, "first = 1\n").unwrap();
        std::fs::write(&second, "second = 2\n").unwrap();

        let (mut app, mut rx) = app();
        app.handle_paste(&first.display().to_string());
        app.handle_paste(&second.display().to_string());
        let a = rx.recv().await.unwrap();
        let b = rx.recv().await.unwrap();
        let (older, newer) = if selected_name(&a) == "first.py" {
            (a, b)
        } else {
            (b, a)
        };

        // The older load finishing last must not replace the newer one.
        app.handle_event(newer);
        app.handle_event(older);

        assert_eq!(app.selected_file().unwrap().name(), "second.py");
        assert_eq!(app.preview.as_deref(), Some("second = 2\n"));
        assert!(app.path_input.ends_with("second.py"));
    }

    #[tokio::test]
    async fn test_clear_drops_pending_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("late.js");
        std::fs::write(&path, "let x;").unwrap();

        let (mut app, mut rx) = app();
        app.handle_paste(&path.display().to_string());
        app.handle_key(ctrl('l'));
        let event = rx.recv().await.unwrap();
        app.handle_event(event);

        assert!(app.selected_file().is_none());
        assert!(app.preview.is_none());
    }

    #[tokio::test]
    async fn test_copy_section_body() {
        let copied = Arc::new(Mutex::new(Vec::new()));
        let sink = copied.clone();
        let mut app = feedback_app("## A\nfoo\n## B\nbar").with_copier(Box::new(move |text| {
            sink.lock().unwrap().push(text);
            Ok(())
        }));

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char('c')));

        assert_eq!(*copied.lock().unwrap(), vec!["bar".to_string()]);
        assert_eq!(toast_message(&app).as_deref(), Some("Copied to clipboard"));
    }

    #[tokio::test]
    async fn test_copy_failure() {
        let mut app = feedback_app("plain review").with_copier(Box::new(|_| {
            Err(ClipboardError::Unavailable("no display".into()))
        }));
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(toast_message(&app).as_deref(), Some("Copy failed"));
    }

    #[tokio::test]
    async fn test_history_entry_cannot_be_reloaded() {
        let (mut app, _rx) = app();
        app.history = vec![UploadRecord::now("a.py"), UploadRecord::now("b.py")];

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::History);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.history_selected, 1);
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(
            toast_message(&app).as_deref(),
            Some(LOAD_FROM_HISTORY_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_clear_resets_selection() {
        let (mut app, _rx) = app();
        app.file = Some(SelectedFile::from_bytes("a.c", Vec::new()));
        app.preview = Some(String::new());
        app.error = Some("old".into());
        app.handle_key(ctrl('l'));

        assert!(app.selected_file().is_none());
        assert!(app.preview.is_none());
        assert!(app.error().is_none());
    }

    #[test]
    fn test_normalize_dropped_path() {
        assert_eq!(normalize_dropped_path("  /tmp/a.py \n"), "/tmp/a.py");
        assert_eq!(normalize_dropped_path("'/tmp/my file.py'"), "/tmp/my file.py");
        assert_eq!(normalize_dropped_path("\"file:///tmp/b.js\""), "/tmp/b.js");
        assert_eq!(normalize_dropped_path("\n/tmp/c.ts\n/tmp/d.ts"), "/tmp/c.ts");
        assert_eq!(normalize_dropped_path("   "), "");
    }
}
