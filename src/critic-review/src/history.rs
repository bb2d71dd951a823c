//! Upload history: the most recent successfully reviewed files.
//!
//! Storage is injected through [`HistoryRepository`] so the submission flow
//! does not care whether records live in a JSON file or in memory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the records are stored.
pub const HISTORY_KEY: &str = "uploadHistory";

/// Maximum number of records kept.
pub const MAX_HISTORY: usize = 10;

/// One successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub name: String,
    #[serde(with = "iso_millis")]
    pub at: DateTime<Utc>,
}

impl UploadRecord {
    pub fn new(name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            at,
        }
    }

    /// A record for `name` stamped with the current time.
    pub fn now(name: impl Into<String>) -> Self {
        Self::new(name, Utc::now())
    }

    /// Timestamp as stored, e.g. `2024-05-01T12:00:00.000Z`.
    pub fn at_iso(&self) -> String {
        self.at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Put `record` at the front and keep at most `limit` records.
pub fn push_bounded(
    mut records: Vec<UploadRecord>,
    record: UploadRecord,
    limit: usize,
) -> Vec<UploadRecord> {
    records.insert(0, record);
    records.truncate(limit);
    records
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to access history at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistent store of upload records, newest first.
pub trait HistoryRepository: Send + Sync {
    /// All stored records. An empty store yields an empty list.
    fn load(&self) -> Result<Vec<UploadRecord>, HistoryError>;

    /// Replace the stored records.
    fn store(&self, records: &[UploadRecord]) -> Result<(), HistoryError>;

    /// Prepend `record`, cap at [`MAX_HISTORY`] and persist.
    ///
    /// A corrupt store is treated as empty and overwritten. Implementations
    /// shared between tasks must make the load and store one step.
    fn append(&self, record: UploadRecord) -> Result<Vec<UploadRecord>, HistoryError> {
        load_push_store(self, record)
    }
}

/// Read, prepend, cap and write back. Not atomic on its own.
fn load_push_store<R: HistoryRepository + ?Sized>(
    repo: &R,
    record: UploadRecord,
) -> Result<Vec<UploadRecord>, HistoryError> {
    let existing = match repo.load() {
        Ok(records) => records,
        Err(err @ HistoryError::Corrupt { .. }) => {
            warn!(error = %err, "Discarding unreadable upload history");
            Vec::new()
        }
        Err(err) => return Err(err),
    };
    let records = push_bounded(existing, record, MAX_HISTORY);
    repo.store(&records)?;
    Ok(records)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(rename = "uploadHistory", default)]
    upload_history: Vec<UploadRecord>,
}

/// History kept as `{"uploadHistory": [...]}` in a JSON file.
///
/// Clones share one write lock, so appends through any clone are serialized.
#[derive(Debug, Clone)]
pub struct JsonFileHistory {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryRepository for JsonFileHistory {
    fn load(&self) -> Result<Vec<UploadRecord>, HistoryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let doc: HistoryDocument =
            serde_json::from_str(&content).map_err(|source| HistoryError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(doc.upload_history)
    }

    fn store(&self, records: &[UploadRecord]) -> Result<(), HistoryError> {
        let doc = HistoryDocument {
            upload_history: records.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&doc).map_err(|source| HistoryError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        critic_common::atomic_write(&self.path, &json).map_err(|source| HistoryError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = records.len(), "Stored upload history");
        Ok(())
    }

    fn append(&self, record: UploadRecord) -> Result<Vec<UploadRecord>, HistoryError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        load_push_store(self, record)
    }
}

/// History that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: Mutex<Vec<UploadRecord>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<UploadRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl HistoryRepository for InMemoryHistory {
    fn load(&self) -> Result<Vec<UploadRecord>, HistoryError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn store(&self, records: &[UploadRecord]) -> Result<(), HistoryError> {
        *self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = records.to_vec();
        Ok(())
    }

    fn append(&self, record: UploadRecord) -> Result<Vec<UploadRecord>, HistoryError> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *records = push_bounded(std::mem::take(&mut *records), record, MAX_HISTORY);
        Ok(records.clone())
    }
}
