//! Relationship-related objects for OPC packages.
//!
//! This module provides types for managing relationships between parts in an OPC package,
//! including internal and external relationships. Relationships form a flat edge list:
//! no reachability or cycle checks are made, and external targets are never dereferenced.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{namespace, target_mode};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::xml::namespace::normalize_relationship_type;
use std::fmt;

/// Whether a relationship target lives inside the package or outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetMode {
    /// Target is a part reference resolved against the source's base URI
    #[default]
    Internal,
    /// Target is an opaque URI (e.g., a hyperlink)
    External,
}

impl TargetMode {
    /// Parse a `TargetMode` attribute value. Anything other than `External` is internal.
    pub fn from_attr(value: &str) -> Self {
        if value == target_mode::EXTERNAL {
            TargetMode::External
        } else {
            TargetMode::Internal
        }
    }

    /// The attribute spelling of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::Internal => target_mode::INTERNAL,
            TargetMode::External => target_mode::EXTERNAL,
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single relationship from a source (package or part) to a target.
///
/// Identified by an rId that is unique within its source's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part URI or external URL
    target_ref: String,

    /// Base URI of the source, for resolving relative references
    base_uri: String,

    target_mode: TargetMode,
}

impl Relationship {
    /// Create a new relationship.
    pub fn new(
        r_id: impl Into<String>,
        reltype: impl Into<String>,
        target_ref: impl Into<String>,
        base_uri: impl Into<String>,
        target_mode: TargetMode,
    ) -> Self {
        Self {
            r_id: r_id.into(),
            reltype: reltype.into(),
            target_ref: target_ref.into(),
            base_uri: base_uri.into(),
            target_mode,
        }
    }

    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference.
    ///
    /// For internal relationships, this is a relative part reference.
    /// For external relationships, this is an absolute URL.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn target_mode(&self) -> TargetMode {
        self.target_mode
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode == TargetMode::External
    }

    /// Get the absolute target partname for internal relationships.
    ///
    /// Returns an error if this is an external relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external() {
            return Err(OpcError::InvalidRelationship(format!(
                "{} is external and has no target partname",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref)
    }
}

/// Ordered collection of relationships from a single source.
///
/// Insertion order is kept so a loaded `.rels` part is written back in the same order.
/// Lookups are linear; a source rarely has more than a few dozen relationships.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,

    rels: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    ///
    /// # Arguments
    /// * `base_uri` - Base URI for resolving relative references
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            rels: Vec::new(),
        }
    }

    /// Base URI that relative targets in this scope are resolved against.
    #[inline]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Add a relationship with a freshly allocated ID.
    ///
    /// Returns the new rId.
    pub fn add(&mut self, reltype: &str, target_ref: &str, mode: TargetMode) -> String {
        let r_id = self.next_r_id();
        self.rels.push(Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            mode,
        ));
        r_id
    }

    /// Add a relationship that already carries an ID, as read from a `.rels` part.
    ///
    /// Fails if the ID is already used in this scope.
    pub fn insert_loaded(
        &mut self,
        r_id: String,
        reltype: String,
        target_ref: String,
        mode: TargetMode,
    ) -> Result<()> {
        if self.get(&r_id).is_some() {
            return Err(OpcError::InvalidRelationship(format!(
                "duplicate relationship id '{}'",
                r_id
            )));
        }
        self.rels.push(Relationship::new(
            r_id,
            reltype,
            target_ref,
            self.base_uri.clone(),
            mode,
        ));
        Ok(())
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    /// Get or add an internal relationship to a target part.
    ///
    /// If a relationship of the given type to the target already exists, its rId
    /// is returned. Otherwise a new one is created with the next available rId.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> String {
        self.find_matching(reltype, target_ref, TargetMode::Internal)
            .unwrap_or_else(|| self.add(reltype, target_ref, TargetMode::Internal))
    }

    /// Get or add an external relationship.
    ///
    /// Similar to `get_or_add` but for external relationships.
    pub fn get_or_add_ext_rel(&mut self, reltype: &str, target_ref: &str) -> String {
        self.find_matching(reltype, target_ref, TargetMode::External)
            .unwrap_or_else(|| self.add(reltype, target_ref, TargetMode::External))
    }

    fn find_matching(&self, reltype: &str, target_ref: &str, mode: TargetMode) -> Option<String> {
        self.rels
            .iter()
            .find(|rel| {
                rel.reltype == reltype && rel.target_ref == target_ref && rel.target_mode == mode
            })
            .map(|rel| rel.r_id.clone())
    }

    /// Get the next available relationship ID.
    ///
    /// Generates IDs in the format "rId1", "rId2", etc., filling in gaps
    /// if any exist, so the result is the lowest `rIdN` not currently held.
    fn next_r_id(&self) -> String {
        let mut used_numbers: Vec<u32> = self
            .rels
            .iter()
            .filter_map(|rel| {
                rel.r_id
                    .strip_prefix("rId")
                    .and_then(|digits| atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok())
            })
            .collect();

        used_numbers.sort_unstable();

        let mut next_num = 1u32;
        for &num in &used_numbers {
            match num.cmp(&next_num) {
                std::cmp::Ordering::Equal => next_num += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }

        format!("rId{}", next_num)
    }

    /// Get all relationships of a type, in stored order.
    ///
    /// With `normalize_types` set, Strict and Transitional spellings of the same
    /// office-document relationship type are treated as equal.
    pub fn by_type(&self, reltype: &str, normalize_types: bool) -> Vec<&Relationship> {
        let wanted = if normalize_types {
            normalize_relationship_type(reltype)
        } else {
            reltype.into()
        };
        self.rels
            .iter()
            .filter(|rel| {
                if normalize_types {
                    normalize_relationship_type(&rel.reltype) == wanted
                } else {
                    rel.reltype == reltype
                }
            })
            .collect()
    }

    /// Get the relationship of a specific type.
    ///
    /// Returns an error if no relationship of the type is found,
    /// or if multiple relationships of the type exist.
    pub fn part_with_reltype(&self, reltype: &str, normalize_types: bool) -> Result<&Relationship> {
        let matching = self.by_type(reltype, normalize_types);

        match matching.as_slice() {
            [] => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            [rel] => Ok(*rel),
            _ => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    /// Get an iterator over all relationships, in stored order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    /// Get the number of relationships in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Remove a relationship by its ID.
    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        let pos = self.rels.iter().position(|rel| rel.r_id == r_id)?;
        Some(self.rels.remove(pos))
    }

    /// Serialize relationships to the XML of a `.rels` part, in stored order.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + 160 * self.rels.len());

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<Relationships xmlns="{}">"#,
            namespace::OPC_RELATIONSHIPS
        ));

        for rel in &self.rels {
            let target_mode = if rel.is_external() {
                r#" TargetMode="External""#
            } else {
                ""
            };

            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(&rel.r_id),
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref),
                target_mode
            ));
        }

        xml.push_str("</Relationships>");
        xml
    }
}

impl PartialEq for Relationships {
    /// Two scopes are equal when they hold the same relationships in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.rels == other.rels
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/")
    }
}
