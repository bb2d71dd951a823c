//! Short text preview of a selected file.

use tracing::warn;

use crate::file::SelectedFile;

/// Number of lines shown in a preview.
pub const PREVIEW_LINES: usize = 80;

/// First [`PREVIEW_LINES`] lines of `text`.
pub fn preview_text(text: &str) -> String {
    text.split('\n')
        .take(PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Preview of the current selection, `None` when nothing is selected.
///
/// The contents are decoded lossily, so binary files still get a preview.
/// A file that can no longer be read has no preview.
pub async fn preview(file: Option<&SelectedFile>) -> Option<String> {
    let file = file?;
    match file.read_bytes().await {
        Ok(bytes) => Some(preview_text(&String::from_utf8_lossy(&bytes))),
        Err(e) => {
            warn!(file = %file.name(), error = %e, "Failed to read file for preview");
            None
        }
    }
}
