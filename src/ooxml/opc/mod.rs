//! Open Packaging Conventions (OPC) implementation.
//!
//! This module implements the container side of Office Open XML documents:
//!
//! - Package structure (parts, relationships)
//! - Content type management (`[Content_Types].xml`)
//! - ZIP-based physical packaging with deterministic output
//!
//! # Performance Features
//!
//! - Uses `memchr` for fast relationship reference counting in part payloads
//! - Uses `atoi_simd` for fast integer parsing of rIds and partname indices
//! - Uses `quick-xml` for streaming parsing of content types and relationships

pub mod constants;
pub mod content_types;
pub mod error;
pub mod options;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypeMap;
pub use error::{OpcError, Result};
pub use options::{Compression, ContentTypePolicy, PackageOptions};
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::Part;
pub use rel::{Relationship, Relationships, TargetMode};
