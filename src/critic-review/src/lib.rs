//! Review submission and feedback handling for Critic.
//!
//! - [`partition`] splits markdown feedback into titled sections
//! - [`flow`] validates a selected file, uploads it and records history
//! - [`history`] is the injected upload-history repository
//! - [`preview`] produces the short text preview of a selected file

pub mod client;
pub mod feedback;
pub mod file;
pub mod flow;
pub mod history;
pub mod partition;
pub mod preview;
pub mod redact;
pub mod validate;

pub use client::ReviewClient;
pub use feedback::RawFeedback;
pub use file::SelectedFile;
pub use flow::{SubmissionFlow, SubmissionOutcome};
pub use history::{
    HISTORY_KEY, HistoryError, HistoryRepository, InMemoryHistory, JsonFileHistory, MAX_HISTORY,
    UploadRecord, push_bounded,
};
pub use partition::{BoundaryPolicy, DEFAULT_SECTION_TITLE, Section, partition, partition_with};
pub use preview::{PREVIEW_LINES, preview, preview_text};
pub use redact::redact_secrets;
pub use validate::{ALLOWED_EXTENSIONS, ValidationError, validate_file_name, validate_selection};

use thiserror::Error;

/// Why a submission did not produce feedback.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Network failure or an unparseable response body.
    #[error("{0}")]
    Transport(String),

    #[error("Failed to read {name}: {source}")]
    FileRead {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl SubmissionError {
    /// Short text for a transient notification.
    pub fn toast_message(&self) -> String {
        match self {
            SubmissionError::Validation(err) => err.toast_message().to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        SubmissionError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SubmissionError>;
