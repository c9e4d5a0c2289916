//! Error types for the XML compatibility layer.
use thiserror::Error;

/// Result type for XML compatibility operations.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for reading and writing OOXML markup.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// XML parsing or encoding error
    #[error("XML error: {0}")]
    Xml(String),

    /// An element or attribute name uses a prefix the writer does not declare
    #[error("Undeclared namespace prefix in name: {0}")]
    UnknownPrefix(String),

    /// The writer was driven out of order (e.g., a child before the root)
    #[error("Invalid writer state: {0}")]
    InvalidState(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OoxmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}
