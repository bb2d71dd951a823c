//! File-type validation for submissions.

use thiserror::Error;

use crate::file::SelectedFile;

/// Extensions the review service accepts (matched case-insensitively).
pub const ALLOWED_EXTENSIONS: &[&str] = &["py", "js", "ts", "jsx", "java", "cpp", "c", "cs"];

/// A selection that must not be submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a file first.")]
    NoFileSelected,
    #[error("Unsupported file type. Supported: py, js, ts, java, cpp, c, cs")]
    UnsupportedExtension { name: String },
}

impl ValidationError {
    /// Short text for a transient notification.
    pub fn toast_message(&self) -> &'static str {
        match self {
            ValidationError::NoFileSelected => "Pick a file to upload",
            ValidationError::UnsupportedExtension { .. } => "Unsupported file type",
        }
    }
}

/// Extension of `name`: everything after the final `.`. Names without a
/// dot have no extension.
fn extension(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// Check that `name` carries a supported extension.
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    let ext = extension(name).to_lowercase();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedExtension {
            name: name.to_string(),
        })
    }
}

/// Check the current selection before submitting it.
pub fn validate_selection(file: Option<&SelectedFile>) -> Result<&SelectedFile, ValidationError> {
    let file = file.ok_or(ValidationError::NoFileSelected)?;
    validate_file_name(file.name())?;
    Ok(file)
}
