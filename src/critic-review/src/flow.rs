//! Submission flow: validate, upload, record.

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::ReviewClient;
use crate::feedback::RawFeedback;
use crate::file::SelectedFile;
use crate::history::{HistoryRepository, UploadRecord};
use crate::redact::redact_secrets;
use crate::validate::validate_selection;
use crate::{Result, SubmissionError};

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub feedback: RawFeedback,
    /// Updated history, or `None` when it could not be persisted.
    pub history: Option<Vec<UploadRecord>>,
}

/// Turns a selected file into review feedback.
#[derive(Clone)]
pub struct SubmissionFlow {
    client: ReviewClient,
    history: Arc<dyn HistoryRepository>,
    redact_secrets: bool,
}

impl SubmissionFlow {
    pub fn new(client: ReviewClient, history: Arc<dyn HistoryRepository>) -> Self {
        Self {
            client,
            history,
            redact_secrets: false,
        }
    }

    /// Mask credentials in UTF-8 sources before uploading.
    pub fn redact_secrets(mut self, enabled: bool) -> Self {
        self.redact_secrets = enabled;
        self
    }

    pub fn client(&self) -> &ReviewClient {
        &self.client
    }

    pub fn history(&self) -> &Arc<dyn HistoryRepository> {
        &self.history
    }

    /// Submit `file` for review.
    ///
    /// Invalid selections fail before any request is made. A history that
    /// cannot be written is logged and does not fail the submission.
    pub async fn submit(&self, file: Option<&SelectedFile>) -> Result<SubmissionOutcome> {
        let file = validate_selection(file)?;

        let bytes = file
            .read_bytes()
            .await
            .map_err(|source| SubmissionError::FileRead {
                name: file.name().to_string(),
                source,
            })?;
        let bytes = if self.redact_secrets {
            redact_bytes(bytes)
        } else {
            bytes
        };

        let feedback = self.client.upload(file.name(), bytes).await?;
        info!(file = %file.name(), len = feedback.as_str().len(), "Review received");

        let history = match self.history.append(UploadRecord::now(file.name())) {
            Ok(records) => Some(records),
            Err(e) => {
                warn!(error = %e, "Failed to record upload history");
                None
            }
        };

        Ok(SubmissionOutcome { feedback, history })
    }
}

/// Redact text files; anything that is not UTF-8 is sent untouched.
fn redact_bytes(bytes: Vec<u8>) -> Vec<u8> {
    match String::from_utf8(bytes) {
        Ok(text) => redact_secrets(&text).into_bytes(),
        Err(e) => e.into_bytes(),
    }
}
