//! Office Open XML (OOXML) container and markup core.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP, parts, content types, relationships)
//! 2. **XML Layer** (`xml`): Strict/Transitional namespace normalization, fixed-prefix
//!    writing, and tri-state toggle values
//!
//! # Example: Inspecting a Word document
//!
//! ```rust,no_run
//! use ooxml_opc::ooxml::OpcPackage;
//! use ooxml_opc::ooxml::xml::XmlEvent;
//!
//! let pkg = OpcPackage::open("document.docx")?;
//! let document = pkg.main_document_part()?;
//!
//! // Element names arrive with Transitional namespaces, even for Strict documents
//! for event in document.read_xml_events()? {
//!     if let XmlEvent::Start(tag) = event {
//!         println!("{{{}}}{}", tag.name.namespace, tag.name.local);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod xml;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI, Part};

// Re-export the XML layer's value types
pub use error::OoxmlError;
pub use xml::TriState;
