//! Low-level, read-only view of a serialized OPC package.
//!
//! Classifies the decompressed ZIP entries into the content types table, package
//! relationships, parts and per-part relationships. Every entry that is not
//! `[Content_Types].xml` or a `.rels` file becomes a part; nothing is discovered by
//! walking relationships, so unreferenced parts survive a round trip.

use crate::ooxml::opc::content_types::ContentTypeMap;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::options::{ContentTypePolicy, PackageOptions};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::rel::TargetMode;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Relationships of one source, as read; most sources have only a handful.
pub type SerializedRelationships = SmallVec<[SerializedRelationship; 8]>;

/// Serialized relationship as read from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedRelationship {
    pub r_id: String,
    pub reltype: String,
    /// Relative part reference or external URL
    pub target_ref: String,
    pub target_mode: TargetMode,
}

impl SerializedRelationship {
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode == TargetMode::External
    }
}

/// Serialized part with its content and relationships.
#[derive(Debug)]
pub struct SerializedPart {
    pub partname: PackURI,
    /// Resolved content type; empty when unresolved under the lenient policy
    pub content_type: String,
    pub blob: Vec<u8>,
    pub srels: SerializedRelationships,
}

/// Package contents classified and parsed, ready to be assembled into a package.
#[derive(Debug)]
pub struct PackageReader {
    content_types: ContentTypeMap,
    pkg_srels: SerializedRelationships,
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    /// Classify and parse every entry of a physical package.
    ///
    /// Fails if `[Content_Types].xml` is missing, or if it or any `.rels` entry is
    /// malformed; the error names the entry.
    pub fn from_phys_reader(phys_reader: PhysPkgReader, options: &PackageOptions) -> Result<Self> {
        let mut entries = phys_reader.into_entries();

        let ct_member = &CONTENT_TYPES_URI[1..];
        let ct_xml = entries
            .remove(ct_member)
            .ok_or_else(|| OpcError::MissingRequiredEntry(ct_member.to_string()))?;
        let content_types = ContentTypeMap::from_xml(ct_member, &ct_xml)?;

        let package_uri = PackURI::new(PACKAGE_URI)?;
        let pkg_rels_member = package_uri.rels_uri().membername().to_string();
        let pkg_srels = match entries.remove(&pkg_rels_member) {
            Some(xml) => Self::parse_rels_xml(&pkg_rels_member, &xml)?,
            None => SerializedRelationships::new(),
        };

        // Split the rest into relationship entries (keyed by source) and parts
        let mut rels_by_source: BTreeMap<String, (String, Vec<u8>)> = BTreeMap::new();
        let mut part_entries = Vec::with_capacity(entries.len());
        for (member, blob) in entries {
            match PackURI::source_of_rels(&member) {
                Some(source) => {
                    rels_by_source.insert(source.membername().to_string(), (member, blob));
                },
                None => part_entries.push((member, blob)),
            }
        }

        let mut sparts = Vec::with_capacity(part_entries.len());
        for (member, blob) in part_entries {
            let partname = PackURI::from_member_name(&member)?;
            let content_type = Self::content_type_for(&content_types, &partname, options)?;
            let srels = match rels_by_source.remove(partname.membername()) {
                Some((rels_member, xml)) => Self::parse_rels_xml(&rels_member, &xml)?,
                None => SerializedRelationships::new(),
            };
            trace!(
                part = %partname,
                content_type = %content_type,
                size = blob.len(),
                rels = srels.len(),
                "classified part"
            );
            sparts.push(SerializedPart {
                partname,
                content_type,
                blob,
                srels,
            });
        }

        for (source, (rels_member, _)) in rels_by_source {
            warn!(
                entry = %rels_member,
                source = %source,
                "relationships for a missing part ignored"
            );
        }

        Ok(Self {
            content_types,
            pkg_srels,
            sparts,
        })
    }

    fn content_type_for(
        content_types: &ContentTypeMap,
        partname: &PackURI,
        options: &PackageOptions,
    ) -> Result<String> {
        match content_types.resolve(partname) {
            Some(ct) => Ok(ct.to_string()),
            None => match options.content_type_policy {
                ContentTypePolicy::Strict => {
                    Err(OpcError::UnresolvedContentType(partname.to_string()))
                },
                ContentTypePolicy::Lenient => {
                    warn!(part = %partname, "no content type for part, storing it untyped");
                    Ok(String::new())
                },
            },
        }
    }

    /// Parse a `.rels` document.
    ///
    /// `entry` names the ZIP entry and is carried by any error. Relationship IDs must
    /// be unique within the document.
    pub fn parse_rels_xml(entry: &str, rels_xml: &[u8]) -> Result<SerializedRelationships> {
        let malformed = |reason: String| OpcError::MalformedRelationships {
            entry: entry.to_string(),
            reason,
        };

        let mut srels = SerializedRelationships::new();
        let mut reader = Reader::from_reader(rels_xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut seen_root = false;
        let mut depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    Self::rels_element(e, &mut seen_root, &mut srels).map_err(&malformed)?;
                },
                Ok(Event::Empty(ref e)) => {
                    Self::rels_element(e, &mut seen_root, &mut srels).map_err(&malformed)?;
                },
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        if !seen_root {
            return Err(malformed("document has no <Relationships> root element".to_string()));
        }
        if depth > 0 {
            return Err(malformed("unexpected end of document".to_string()));
        }

        Ok(srels)
    }

    /// Handle one element of a `.rels` document: the root, or a `Relationship` child.
    fn rels_element(
        e: &BytesStart<'_>,
        seen_root: &mut bool,
        srels: &mut SerializedRelationships,
    ) -> std::result::Result<(), String> {
        let name = e.local_name();
        if !*seen_root {
            if name.as_ref() != b"Relationships" {
                return Err(format!(
                    "root element is <{}>, expected <Relationships>",
                    String::from_utf8_lossy(name.as_ref())
                ));
            }
            *seen_root = true;
        } else if name.as_ref() == b"Relationship" {
            let srel = Self::relationship(e)?;
            if srels.iter().any(|s| s.r_id == srel.r_id) {
                return Err(format!("duplicate relationship id '{}'", srel.r_id));
            }
            srels.push(srel);
        }
        Ok(())
    }

    fn relationship(e: &BytesStart<'_>) -> std::result::Result<SerializedRelationship, String> {
        let mut r_id = None;
        let mut reltype = None;
        let mut target_ref = None;
        let mut target_mode = TargetMode::Internal;

        for attr in e.attributes() {
            let attr = attr.map_err(|err| err.to_string())?;
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            match attr.key.as_ref() {
                b"Id" => r_id = Some(value.into_owned()),
                b"Type" => reltype = Some(value.into_owned()),
                b"Target" => target_ref = Some(value.into_owned()),
                b"TargetMode" => target_mode = TargetMode::from_attr(&value),
                _ => {},
            }
        }

        match (r_id, reltype, target_ref) {
            (Some(r_id), Some(reltype), Some(target_ref)) => Ok(SerializedRelationship {
                r_id,
                reltype,
                target_ref,
                target_mode,
            }),
            (None, _, _) => Err("<Relationship> is missing the Id attribute".to_string()),
            (_, None, _) => Err("<Relationship> is missing the Type attribute".to_string()),
            (_, _, None) => Err("<Relationship> is missing the Target attribute".to_string()),
        }
    }

    /// The content types table as read.
    pub fn content_types(&self) -> &ContentTypeMap {
        &self.content_types
    }

    pub fn pkg_srels(&self) -> &[SerializedRelationship] {
        &self.pkg_srels
    }

    pub fn iter_sparts(&self) -> impl Iterator<Item = &SerializedPart> {
        self.sparts.iter()
    }

    /// Consume the reader, returning the content types, package relationships and parts.
    pub fn into_parts(self) -> (ContentTypeMap, SerializedRelationships, Vec<SerializedPart>) {
        (self.content_types, self.pkg_srels, self.sparts)
    }
}
