//! Error types for OPC package operations
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    /// The container file could not be opened or read.
    #[error("Cannot open container {}: {source}", .path.display())]
    ContainerOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a ZIP archive, or an entry could not be decompressed.
    #[error("Invalid ZIP container{}: {source}", entry_suffix(.entry))]
    ContainerFormat {
        entry: Option<String>,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Not an OPC package: required entry {0} is missing")]
    MissingRequiredEntry(String),

    #[error("Malformed content types in {entry}: {reason}")]
    MalformedContentTypes { entry: String, reason: String },

    #[error("Failed to parse relationships in {entry}: {reason}")]
    MalformedRelationships { entry: String, reason: String },

    #[error("Malformed XML in part {part}: {reason}")]
    MalformedPartXml { part: String, reason: String },

    /// Only raised when the package is loaded with the strict content type policy.
    #[error("Content type not found for partname: {0}")]
    UnresolvedContentType(String),

    #[error("Failed to write entry {entry}: {source}")]
    Write {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pack URI: {0}")]
    InvalidPackUri(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),
}

impl OpcError {
    /// Build a [`OpcError::Write`] from a ZIP writer failure, keeping plain I/O
    /// errors as they are.
    pub(crate) fn write(entry: impl Into<String>, err: zip::result::ZipError) -> Self {
        let source = match err {
            zip::result::ZipError::Io(io) => io,
            other => std::io::Error::other(other),
        };
        OpcError::Write {
            entry: entry.into(),
            source,
        }
    }
}

fn entry_suffix(entry: &Option<String>) -> String {
    entry
        .as_deref()
        .map(|e| format!(" (entry {})", e))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, OpcError>;
