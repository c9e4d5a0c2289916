//! Strict ↔ Transitional namespace table.
//!
//! ISO/IEC 29500 Strict documents use `http://purl.oclc.org/ooxml/...` URIs for the
//! same vocabularies that Transitional documents (what Word writes by default)
//! spell `http://schemas.openxmlformats.org/...`. Readers normalize everything to
//! the Transitional spelling so downstream matching only deals with one dialect.
//!
//! The tables are compile-time perfect-hash maps: immutable, shared by every thread,
//! no initialization at runtime.

use crate::ooxml::opc::constants::relationship_type::{STRICT_PREFIX, TRANSITIONAL_PREFIX};
use phf::phf_map;
use std::borrow::Cow;

static STRICT_TO_TRANSITIONAL: phf::Map<&'static str, &'static str> = phf_map! {
    "http://purl.oclc.org/ooxml/wordprocessingml/main" =>
        "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    "http://purl.oclc.org/ooxml/officeDocument/relationships" =>
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    "http://purl.oclc.org/ooxml/drawingml/main" =>
        "http://schemas.openxmlformats.org/drawingml/2006/main",
    "http://purl.oclc.org/ooxml/drawingml/wordprocessingDrawing" =>
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing",
    "http://purl.oclc.org/ooxml/officeDocument/math" =>
        "http://schemas.openxmlformats.org/officeDocument/2006/math",
    "http://purl.oclc.org/ooxml/drawingml/picture" =>
        "http://schemas.openxmlformats.org/drawingml/2006/picture",
    "http://purl.oclc.org/ooxml/drawingml/chart" =>
        "http://schemas.openxmlformats.org/drawingml/2006/chart",
    "http://purl.oclc.org/ooxml/drawingml/chartDrawing" =>
        "http://schemas.openxmlformats.org/drawingml/2006/chartDrawing",
    "http://purl.oclc.org/ooxml/drawingml/diagram" =>
        "http://schemas.openxmlformats.org/drawingml/2006/diagram",
    "http://purl.oclc.org/ooxml/drawingml/lockedCanvas" =>
        "http://schemas.openxmlformats.org/drawingml/2006/lockedCanvas",
    "http://purl.oclc.org/ooxml/officeDocument/sharedTypes" =>
        "http://schemas.openxmlformats.org/officeDocument/2006/sharedTypes",
    "http://purl.oclc.org/ooxml/officeDocument/customXml" =>
        "http://schemas.openxmlformats.org/officeDocument/2006/customXml",
    "http://purl.oclc.org/ooxml/officeDocument/bibliography" =>
        "http://schemas.openxmlformats.org/officeDocument/2006/bibliography",
    "http://purl.oclc.org/ooxml/officeDocument/extendedProperties" =>
        "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
    "http://purl.oclc.org/ooxml/officeDocument/customProperties" =>
        "http://schemas.openxmlformats.org/officeDocument/2006/custom-properties",
    "http://purl.oclc.org/ooxml/officeDocument/docPropsVTypes" =>
        "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes",
    "http://purl.oclc.org/ooxml/schemaLibrary/main" =>
        "http://schemas.openxmlformats.org/schemaLibrary/2006/main",
};

static TRANSITIONAL_TO_STRICT: phf::Map<&'static str, &'static str> = phf_map! {
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main" =>
        "http://purl.oclc.org/ooxml/wordprocessingml/main",
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships" =>
        "http://purl.oclc.org/ooxml/officeDocument/relationships",
    "http://schemas.openxmlformats.org/drawingml/2006/main" =>
        "http://purl.oclc.org/ooxml/drawingml/main",
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" =>
        "http://purl.oclc.org/ooxml/drawingml/wordprocessingDrawing",
    "http://schemas.openxmlformats.org/officeDocument/2006/math" =>
        "http://purl.oclc.org/ooxml/officeDocument/math",
    "http://schemas.openxmlformats.org/drawingml/2006/picture" =>
        "http://purl.oclc.org/ooxml/drawingml/picture",
    "http://schemas.openxmlformats.org/drawingml/2006/chart" =>
        "http://purl.oclc.org/ooxml/drawingml/chart",
    "http://schemas.openxmlformats.org/drawingml/2006/chartDrawing" =>
        "http://purl.oclc.org/ooxml/drawingml/chartDrawing",
    "http://schemas.openxmlformats.org/drawingml/2006/diagram" =>
        "http://purl.oclc.org/ooxml/drawingml/diagram",
    "http://schemas.openxmlformats.org/drawingml/2006/lockedCanvas" =>
        "http://purl.oclc.org/ooxml/drawingml/lockedCanvas",
    "http://schemas.openxmlformats.org/officeDocument/2006/sharedTypes" =>
        "http://purl.oclc.org/ooxml/officeDocument/sharedTypes",
    "http://schemas.openxmlformats.org/officeDocument/2006/customXml" =>
        "http://purl.oclc.org/ooxml/officeDocument/customXml",
    "http://schemas.openxmlformats.org/officeDocument/2006/bibliography" =>
        "http://purl.oclc.org/ooxml/officeDocument/bibliography",
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" =>
        "http://purl.oclc.org/ooxml/officeDocument/extendedProperties",
    "http://schemas.openxmlformats.org/officeDocument/2006/custom-properties" =>
        "http://purl.oclc.org/ooxml/officeDocument/customProperties",
    "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes" =>
        "http://purl.oclc.org/ooxml/officeDocument/docPropsVTypes",
    "http://schemas.openxmlformats.org/schemaLibrary/2006/main" =>
        "http://purl.oclc.org/ooxml/schemaLibrary/main",
};

/// Map a namespace URI to its Transitional spelling.
///
/// Strict URIs from the table are replaced; every other URI, including the empty
/// (no-namespace) string, is returned unchanged. The function is total and
/// idempotent: `normalize(normalize(x)) == normalize(x)`.
#[inline]
pub fn normalize(uri: &str) -> &str {
    STRICT_TO_TRANSITIONAL.get(uri).copied().unwrap_or(uri)
}

/// Map a Transitional namespace URI to its Strict spelling, if it has one.
#[inline]
pub fn to_strict(uri: &str) -> Option<&'static str> {
    TRANSITIONAL_TO_STRICT.get(uri).copied()
}

/// Check whether a URI is one of the known Strict namespaces.
#[inline]
pub fn is_strict(uri: &str) -> bool {
    STRICT_TO_TRANSITIONAL.contains_key(uri)
}

/// Map a relationship type URI to its Transitional spelling.
///
/// Strict office-document relationship types share one prefix that differs from the
/// Transitional one, so the suffix (`officeDocument`, `styles`, ...) is kept as is.
/// Package-level types such as core-properties are identical in both dialects.
pub fn normalize_relationship_type(reltype: &str) -> Cow<'_, str> {
    match reltype.strip_prefix(STRICT_PREFIX) {
        Some(suffix) => Cow::Owned(format!("{}{}", TRANSITIONAL_PREFIX, suffix)),
        None => Cow::Borrowed(reltype),
    }
}
