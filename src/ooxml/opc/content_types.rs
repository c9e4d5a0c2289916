//! The `[Content_Types].xml` table.
//!
//! Implements the OPC content type discovery algorithm using Default and Override
//! elements: an Override keyed by exact partname always wins, otherwise the Default
//! for the partname's lower-cased extension applies. The same table is rebuilt from
//! the package's parts on save, emitting an Override only where a part diverges from
//! its extension's Default.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;

/// Content type map for looking up content types by part name or extension.
///
/// Both tables are ordered so that serialization is byte-reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypeMap {
    /// Maps lower-case file extensions (no dot) to default content types
    defaults: BTreeMap<String, String>,

    /// Maps exact partnames to override content types
    overrides: BTreeMap<String, String>,
}

impl ContentTypeMap {
    /// Create a new empty content type map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map holding the Defaults every Word package carries (`rels` and `xml`).
    pub fn with_standard_defaults() -> Self {
        let mut map = Self::new();
        map.add_default("rels", ct::OPC_RELATIONSHIPS);
        map.add_default("xml", ct::XML);
        map
    }

    /// Parse content types from `[Content_Types].xml`.
    ///
    /// `entry` names the ZIP entry and is carried by any error.
    pub fn from_xml(entry: &str, xml: &[u8]) -> Result<Self> {
        let malformed = |reason: String| OpcError::MalformedContentTypes {
            entry: entry.to_string(),
            reason,
        };

        let mut map = Self::new();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut seen_root = false;
        let mut depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    Self::types_element(e, &mut seen_root, &mut map).map_err(&malformed)?;
                },
                Ok(Event::Empty(ref e)) => {
                    Self::types_element(e, &mut seen_root, &mut map).map_err(&malformed)?;
                },
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Eof) => break,
                Err(e) => return Err(malformed(e.to_string())),
                _ => {},
            }
            buf.clear();
        }

        if !seen_root {
            return Err(malformed("document has no <Types> root element".to_string()));
        }
        if depth > 0 {
            return Err(malformed("unexpected end of document".to_string()));
        }

        Ok(map)
    }

    /// Handle one element of `[Content_Types].xml`: the root, a Default or an Override.
    fn types_element(
        e: &BytesStart<'_>,
        seen_root: &mut bool,
        map: &mut ContentTypeMap,
    ) -> std::result::Result<(), String> {
        let name = e.local_name();
        if !*seen_root {
            if name.as_ref() != b"Types" {
                return Err(format!(
                    "root element is <{}>, expected <Types>",
                    String::from_utf8_lossy(name.as_ref())
                ));
            }
            *seen_root = true;
            return Ok(());
        }
        match name.as_ref() {
            b"Default" => {
                let (ext, content_type) = Self::pair(e, b"Extension")?;
                map.add_default(&ext, &content_type);
            },
            b"Override" => {
                let (partname, content_type) = Self::pair(e, b"PartName")?;
                let partname =
                    PackURI::from_member_name(&partname).map_err(|err| err.to_string())?;
                map.add_override(partname.as_str(), &content_type);
            },
            _ => {},
        }
        Ok(())
    }

    /// Read the key attribute and `ContentType` of a Default or Override element.
    fn pair(e: &BytesStart<'_>, key_attr: &[u8]) -> std::result::Result<(String, String), String> {
        let mut key = None;
        let mut content_type = None;

        for attr in e.attributes() {
            let attr = attr.map_err(|err| err.to_string())?;
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            match attr.key.as_ref() {
                k if k == key_attr => key = Some(value.into_owned()),
                b"ContentType" => content_type = Some(value.into_owned()),
                _ => {},
            }
        }

        let element = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        match (key, content_type) {
            (Some(key), Some(content_type)) => Ok((key, content_type)),
            (None, _) => Err(format!(
                "<{}> is missing the {} attribute",
                element,
                String::from_utf8_lossy(key_attr)
            )),
            (_, None) => Err(format!("<{}> is missing the ContentType attribute", element)),
        }
    }

    /// Add a default content type mapping for a file extension.
    ///
    /// The extension is stored lower-case and without a leading period.
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults.insert(
            extension.trim_start_matches('.').to_lowercase(),
            content_type.to_string(),
        );
    }

    /// Add an override content type mapping for a specific partname.
    pub fn add_override(&mut self, partname: &str, content_type: &str) {
        self.overrides
            .insert(partname.to_string(), content_type.to_string());
    }

    /// Remove the override for a partname, returning it if present.
    pub fn remove_override(&mut self, partname: &str) -> Option<String> {
        self.overrides.remove(partname)
    }

    /// Get the default content type registered for an extension.
    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.defaults
            .get(&extension.to_lowercase())
            .map(String::as_str)
    }

    /// Resolve the content type for a partname.
    ///
    /// First checks for an exact override, then falls back to the default
    /// based on the lower-cased file extension. `None` means the part has no
    /// resolvable content type.
    pub fn resolve(&self, pack_uri: &PackURI) -> Option<&str> {
        if let Some(content_type) = self.overrides.get(pack_uri.as_str()) {
            return Some(content_type.as_str());
        }
        self.default_for(pack_uri.ext())
    }

    /// Iterate the Default table in extension order.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate the Override table in partname order.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build the table to emit for a set of parts.
    ///
    /// Keeps this map's Defaults (always including `rels`, which relationship parts
    /// rely on) and adds an Override for every part whose content type differs from
    /// the Default covering its extension. Parts with an empty content type get no
    /// entry, so they resolve the same way after a reload.
    pub fn for_parts<'a>(&self, parts: impl IntoIterator<Item = (&'a PackURI, &'a str)>) -> Self {
        let mut emitted = Self {
            defaults: self.defaults.clone(),
            overrides: BTreeMap::new(),
        };
        emitted
            .defaults
            .entry("rels".to_string())
            .or_insert_with(|| ct::OPC_RELATIONSHIPS.to_string());

        for (partname, content_type) in parts {
            if content_type.is_empty() {
                continue;
            }
            if emitted.default_for(partname.ext()) != Some(content_type) {
                emitted.add_override(partname.as_str(), content_type);
            }
        }

        emitted
    }

    /// Generate the XML for `[Content_Types].xml`.
    ///
    /// Defaults come first sorted by extension, then Overrides sorted by partname.
    pub fn to_xml(&self) -> String {
        let entries = self.defaults.len() + self.overrides.len();
        let mut xml = String::with_capacity(256 + 128 * entries);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES));

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }

        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> PackURI {
        PackURI::new(s).unwrap()
    }

    #[test]
    fn test_content_type_map() {
        let xml = br#"<?xml version="1.0"?>
            <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="xml" ContentType="application/xml"/>
                <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
                <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
            </Types>"#;

        let ct_map = ContentTypeMap::from_xml("[Content_Types].xml", xml).unwrap();

        assert_eq!(ct_map.resolve(&uri("/test.xml")), Some("application/xml"));
        assert_eq!(
            ct_map.resolve(&uri("/word/document.xml")),
            Some(ct::WML_DOCUMENT_MAIN)
        );
    }

    #[test]
    fn test_override_beats_default() {
        let mut map = ContentTypeMap::new();
        map.add_default("xml", "application/xml");
        map.add_override("/a.xml", "application/special");

        assert_eq!(map.resolve(&uri("/a.xml")), Some("application/special"));
        assert_eq!(map.resolve(&uri("/b.xml")), Some("application/xml"));
        assert_eq!(map.resolve(&uri("/c.dat")), None);
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        let mut map = ContentTypeMap::new();
        map.add_default("PNG", ct::PNG);
        assert_eq!(map.resolve(&uri("/word/media/image1.Png")), Some(ct::PNG));
    }

    #[test]
    fn test_override_partname_is_normalized() {
        let xml = br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
            <Override PartName="word/document.xml" ContentType="x/y"/>
        </Types>"#;
        let map = ContentTypeMap::from_xml("[Content_Types].xml", xml).unwrap();
        assert_eq!(map.resolve(&uri("/word/document.xml")), Some("x/y"));
    }

    #[test]
    fn test_malformed_content_types_name_entry() {
        let err = ContentTypeMap::from_xml("[Content_Types].xml", b"<Types><Default></Types>")
            .unwrap_err();
        match err {
            OpcError::MalformedContentTypes { entry, .. } => {
                assert_eq!(entry, "[Content_Types].xml")
            },
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ContentTypeMap::from_xml("[Content_Types].xml", b"<Other/>").unwrap_err();
        assert!(matches!(err, OpcError::MalformedContentTypes { .. }));

        let err = ContentTypeMap::from_xml(
            "[Content_Types].xml",
            br#"<Types><Default Extension="xml"/></Types>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ContentType"));
    }

    #[test]
    fn test_truncated_content_types_rejected() {
        let xml = br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
            <Default Extension="xml" ContentType="application/xml"/>"#;
        let err = ContentTypeMap::from_xml("[Content_Types].xml", xml).unwrap_err();
        match err {
            OpcError::MalformedContentTypes { entry, reason } => {
                assert_eq!(entry, "[Content_Types].xml");
                assert!(reason.contains("unexpected end"), "{reason}");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_for_parts_emits_minimal_overrides() {
        let base = ContentTypeMap::with_standard_defaults();
        let doc = uri("/word/document.xml");
        let data = uri("/customXml/item1.xml");
        let unknown = uri("/blob.bin");

        let emitted = base.for_parts([
            (&doc, ct::WML_DOCUMENT_MAIN),
            (&data, ct::XML),
            (&unknown, ""),
        ]);

        let overrides: Vec<_> = emitted.overrides().collect();
        assert_eq!(overrides, vec![("/word/document.xml", ct::WML_DOCUMENT_MAIN)]);
        assert_eq!(emitted.default_for("rels"), Some(ct::OPC_RELATIONSHIPS));
    }

    #[test]
    fn test_to_xml_is_sorted() {
        let mut map = ContentTypeMap::new();
        map.add_default("xml", ct::XML);
        map.add_default("png", ct::PNG);
        map.add_override("/word/styles.xml", ct::WML_STYLES);
        map.add_override("/word/document.xml", ct::WML_DOCUMENT_MAIN);

        let xml = map.to_xml();
        let png = xml.find(r#"Extension="png""#).unwrap();
        let xml_ext = xml.find(r#"Extension="xml""#).unwrap();
        let doc = xml.find(r#"PartName="/word/document.xml""#).unwrap();
        let styles = xml.find(r#"PartName="/word/styles.xml""#).unwrap();
        assert!(png < xml_ext && xml_ext < doc && doc < styles);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));

        let reparsed = ContentTypeMap::from_xml("[Content_Types].xml", xml.as_bytes()).unwrap();
        assert_eq!(reparsed, map);
    }
}
