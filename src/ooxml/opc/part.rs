//! Package parts.
//!
//! A part is a named, typed byte payload with its own set of outgoing relationships.
//! Payloads are opaque to the package; XML-aware access goes through the
//! namespace-normalizing reader so Strict and Transitional documents look the same.
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use crate::ooxml::xml::reader::{NormalizingReader, XmlEvent};
use memchr::memmem;

/// A part in an OPC package.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    partname: PackURI,
    content_type: String,
    blob: Vec<u8>,
    /// Relationships from this part to other parts, scoped to its directory
    rels: Relationships,
}

impl Part {
    /// Create a part with no relationships.
    pub fn new(partname: PackURI, content_type: impl Into<String>, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri());
        Self {
            partname,
            content_type: content_type.into(),
            blob,
            rels,
        }
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// The content type; empty when it could not be resolved on load.
    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Replace the payload.
    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Check if the content type denotes XML (`+xml` suffix or `/xml`).
    #[inline]
    pub fn is_xml(&self) -> bool {
        self.content_type.ends_with("+xml") || self.content_type.ends_with("/xml")
    }

    /// Add or get a relationship to another part.
    ///
    /// The target is stored relative to this part's directory. If a relationship of
    /// the given type to the target already exists, its rId is returned.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(self.partname.base_uri());
        self.rels.get_or_add(reltype, &target_ref)
    }

    /// Add or get an external relationship (e.g. a hyperlink URL).
    pub fn relate_to_ext(&mut self, target_url: &str, reltype: &str) -> String {
        self.rels.get_or_add_ext_rel(reltype, target_url)
    }

    /// Get the target reference for a relationship ID.
    pub fn target_ref(&self, r_id: &str) -> Result<&str> {
        self.rels
            .get(r_id)
            .map(|rel| rel.target_ref())
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(format!("{} in part {}", r_id, self.partname))
            })
    }

    /// Count `r:id="<r_id>"` references in the payload.
    ///
    /// Binary parts simply yield 0.
    pub fn rel_ref_count(&self, r_id: &str) -> usize {
        let pattern = format!(r#"r:id="{}""#, r_id);
        memmem::Finder::new(pattern.as_bytes())
            .find_iter(&self.blob)
            .count()
    }

    /// Get a reader over the payload that reports Transitional namespaces.
    pub fn xml_reader(&self) -> NormalizingReader<&[u8]> {
        NormalizingReader::from_bytes(&self.blob)
    }

    /// Read the whole payload as normalized XML events.
    pub fn read_xml_events(&self) -> Result<Vec<XmlEvent>> {
        self.xml_reader()
            .collect_events()
            .map_err(|e| OpcError::MalformedPartXml {
                part: self.partname.to_string(),
                reason: e.to_string(),
            })
    }
}
