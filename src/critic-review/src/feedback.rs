//! Raw markdown feedback returned by the review service.

use serde::{Deserialize, Serialize};

use crate::partition::{BoundaryPolicy, Section, partition_with};

/// Unparsed markdown text of one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFeedback(String);

impl RawFeedback {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Split into display sections. Recomputed on every call.
    pub fn sections(&self, policy: BoundaryPolicy) -> Vec<Section> {
        partition_with(&self.0, policy)
    }
}

impl From<String> for RawFeedback {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl AsRef<str> for RawFeedback {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RawFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
