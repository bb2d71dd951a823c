//! System clipboard access.
//!
//! Uses native clipboard APIs only. No OSC 52 escape sequences are written,
//! they leak as visible text on terminals that do not support them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard copy failed: {0}")]
    Copy(String),
}

fn open() -> Result<arboard::Clipboard, ClipboardError> {
    arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))
}

/// Copy `text` and block until the clipboard holds it.
///
/// On Linux the calling process owns the selection, so this waits until a
/// clipboard manager has taken the data. Use it from one-shot commands.
pub fn copy_text(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = open()?;

    #[cfg(target_os = "linux")]
    {
        use arboard::SetExtLinux;
        clipboard
            .set()
            .wait()
            .text(text.to_string())
            .map_err(|e| ClipboardError::Copy(e.to_string()))
    }

    #[cfg(not(target_os = "linux"))]
    {
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Copy(e.to_string()))
    }
}

/// Copy `text` without blocking the caller.
///
/// Failing to reach the clipboard is reported immediately. On Linux the
/// selection is then served from a background thread.
pub fn copy_text_detached(text: String) -> Result<(), ClipboardError> {
    let mut clipboard = open()?;

    #[cfg(target_os = "linux")]
    {
        std::thread::spawn(move || {
            use arboard::SetExtLinux;
            if let Err(e) = clipboard.set().wait().text(text) {
                tracing::warn!("Failed to copy to clipboard: {}", e);
            }
        });
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    {
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Copy(e.to_string()))
    }
}
