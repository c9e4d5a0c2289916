//! ooxml-opc - Open Packaging Conventions core for Word documents
//!
//! This library provides the container and markup layer that a Word (.docx)
//! document model is built on.
//!
//! # Features
//!
//! - **OPC Packages**: Load and save ZIP containers with parts, content types and relationships
//! - **Deterministic output**: Saving the same package twice yields identical bytes
//! - **Strict documents**: Strict OOXML namespaces are read as their Transitional equivalents
//! - **Fixed prefixes**: Write markup with familiar `w:`, `cp:`, `dc:` prefixes
//! - **Tri-state toggles**: Model `<w:b/>`, `<w:b w:val="0"/>` and absence distinctly
//!
//! # Example - Building a package
//!
//! ```
//! use ooxml_opc::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
//! use ooxml_opc::ooxml::{OpcPackage, PackURI};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = OpcPackage::new();
//! let document = PackURI::new("/word/document.xml")?;
//! pkg.add_part(document.clone(), ct::WML_DOCUMENT_MAIN, b"<w:document/>".to_vec())?;
//! pkg.relate_to(&document, rt::OFFICE_DOCUMENT);
//!
//! let bytes = pkg.save()?;
//! let reloaded = OpcPackage::from_bytes(&bytes)?;
//! assert_eq!(reloaded.main_document_part()?.content_type(), ct::WML_DOCUMENT_MAIN);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Writing core properties
//!
//! ```
//! use ooxml_opc::ooxml::xml::{PrefixMap, PrefixedWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = PrefixedWriter::new(Vec::new(), PrefixMap::core_properties());
//! writer.start_root("cp:coreProperties")?;
//! writer.element("dc:creator", "Ada")?;
//! let xml = String::from_utf8(writer.finish()?)?;
//! assert!(xml.contains("<dc:creator>Ada</dc:creator>"));
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod ooxml;
