//! Error types for bundle asset extraction

use std::io;
use thiserror::Error;

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Main error type for bundle asset extraction
///
/// Errors fall into two groups: session-fatal conditions that abort a
/// run before or during per-asset work (unreadable bundle, unwritable
/// output root), and per-tier decode failures that the fallback chain
/// absorbs and records.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// IO errors when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The bundle file could not be opened or parsed
    #[error("Bundle unreadable: {message}")]
    BundleUnreadable { message: String },

    /// The output root could not be created or written to
    #[error("Output unwritable: {message}")]
    OutputUnwritable { message: String },

    /// The asset's field tree could not be read (type tree absent,
    /// script class unresolved)
    #[error("Field read error: {message}")]
    FieldRead { message: String },

    /// An expected field is missing from the asset's field tree
    #[error("Missing field '{field}' on {kind}")]
    MissingField { field: String, kind: String },

    /// Field data is present but malformed
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// A decoder rejected the asset's payload
    #[error("Decode error: {message}")]
    Decode { message: String },
}

impl ExtractError {
    /// Create a bundle-unreadable error
    pub fn bundle_unreadable<S: Into<String>>(message: S) -> Self {
        Self::BundleUnreadable {
            message: message.into(),
        }
    }

    /// Create an output-unwritable error
    pub fn output_unwritable<S: Into<String>>(message: S) -> Self {
        Self::OutputUnwritable {
            message: message.into(),
        }
    }

    /// Create a field read error
    pub fn field_read<S: Into<String>>(message: S) -> Self {
        Self::FieldRead {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field<S: Into<String>>(field: S, kind: S) -> Self {
        Self::MissingField {
            field: field.into(),
            kind: kind.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Session-fatal errors abort the run; everything else is absorbed
    /// by the fallback chain and surfaced through the log.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::BundleUnreadable { .. } | Self::OutputUnwritable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::missing_field("m_Width", "Texture2D");
        let msg = format!("{}", err);
        assert!(msg.contains("m_Width"));
        assert!(msg.contains("Texture2D"));
    }

    #[test]
    fn test_fatality_split() {
        assert!(ExtractError::bundle_unreadable("bad magic").is_session_fatal());
        assert!(ExtractError::output_unwritable("read-only").is_session_fatal());
        assert!(!ExtractError::invalid_data("short buffer").is_session_fatal());
        assert!(!ExtractError::field_read("no type tree").is_session_fatal());
    }
}
