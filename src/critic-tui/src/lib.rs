//! Interactive terminal UI for Critic.
//!
//! Two screens: the upload screen (path entry, preview, history) and the
//! feedback screen (sectioned review with copy and expand/collapse).

pub mod app;
pub mod clipboard;
pub mod markdown;
pub mod runner;
pub mod theme;
pub mod toast;
pub mod ui;

pub use app::{App, AppEvent, AppOptions, View};
pub use clipboard::{ClipboardError, copy_text};
pub use runner::{TuiOptions, run};
pub use theme::Palette;
pub use toast::{Toast, ToastCenter, ToastLevel};
