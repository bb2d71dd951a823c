//! HTTP client for the review service.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::feedback::RawFeedback;
use crate::{Result, SubmissionError};

/// Fields that may carry the review text, in order of preference.
const FEEDBACK_FIELDS: &[&str] = &["feedback", "review", "results"];

/// Fields that may carry a server error message, in order of preference.
const ERROR_FIELDS: &[&str] = &["detail", "error"];

const GENERIC_SERVER_ERROR: &str = "Server error";

/// Multipart form field holding the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Client for the review upload endpoint.
#[derive(Debug, Clone)]
pub struct ReviewClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ReviewClient {
    /// Create a client for `endpoint`.
    ///
    /// `timeout` bounds each request; `None` waits for the service
    /// indefinitely.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let http =
            critic_common::create_review_client(timeout).map_err(SubmissionError::Transport)?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Use an already configured HTTP client.
    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upload one file and return the review text.
    ///
    /// The body is parsed as JSON before the status is looked at, so an
    /// error response without a JSON body surfaces as a transport error.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<RawFeedback> {
        debug!(
            endpoint = %self.endpoint,
            file = %file_name,
            size = bytes.len(),
            "Uploading file for review"
        );

        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = %status, len = body.len(), "Review service responded");

        let payload: Value = serde_json::from_slice(&body)
            .map_err(|e| SubmissionError::Transport(format!("Invalid response body: {e}")))?;

        if !status.is_success() {
            let message = first_truthy(&payload, ERROR_FIELDS)
                .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string());
            return Err(SubmissionError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let text = first_truthy(&payload, FEEDBACK_FIELDS).unwrap_or_else(|| payload.to_string());
        Ok(RawFeedback::new(text))
    }
}

/// Whether `value` counts as present: not null, false, zero or empty text.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text of the first truthy field among `fields`. Non-string values are
/// rendered as compact JSON.
fn first_truthy(payload: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| payload.get(*field))
        .find(|value| is_truthy(value))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}
