//! Namespace-normalizing XML reader.
//!
//! Wraps a quick-xml [`NsReader`] and yields owned events whose element and
//! attribute names are already resolved to `(namespace URI, local name)` pairs,
//! with every Strict namespace rewritten to its Transitional equivalent. Local
//! names are never touched, and unknown namespaces pass through unchanged, so a
//! consumer matches against Transitional URIs regardless of which dialect the
//! document was authored in.
//!
//! Self-closing elements are reported as a `Start` immediately followed by an
//! `End`, giving consumers a uniform token stream.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace as ns;
use crate::ooxml::xml::namespace::normalize;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use std::io::BufRead;

/// A namespace-resolved XML name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Normalized namespace URI; empty for names in no namespace
    pub namespace: String,
    pub local: String,
    /// Prefix as written in the source document, if any
    pub prefix: Option<String>,
}

impl QName {
    /// Check the name against a namespace URI and local name.
    #[inline]
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace == namespace
    }
}

/// An attribute with a resolved name and unescaped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: QName,
    pub value: String,
}

/// An element start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: QName,
    /// Attributes in document order, namespace declarations excluded
    pub attributes: Vec<XmlAttribute>,
}

impl StartTag {
    /// Get the value of an attribute by namespace URI and local name.
    pub fn attr(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(namespace, local))
            .map(|a| a.value.as_str())
    }
}

/// A normalized XML token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Start(StartTag),
    End(QName),
    /// Character data, CDATA, or a resolved entity reference
    Text(String),
    Eof,
}

/// Reader that rewrites Strict namespaces to Transitional ones as tokens are read.
///
/// # Example
///
/// ```
/// use ooxml_opc::ooxml::xml::reader::{NormalizingReader, XmlEvent};
///
/// let xml = br#"<w:document xmlns:w="http://purl.oclc.org/ooxml/wordprocessingml/main"/>"#;
/// let mut reader = NormalizingReader::from_bytes(xml);
/// match reader.next_event().unwrap() {
///     XmlEvent::Start(tag) => assert_eq!(
///         tag.name.namespace,
///         "http://schemas.openxmlformats.org/wordprocessingml/2006/main"
///     ),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub struct NormalizingReader<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    /// End tag owed for a self-closing element
    pending_end: Option<QName>,
    depth: usize,
    done: bool,
}

impl<'a> NormalizingReader<&'a [u8]> {
    /// Create a reader over an in-memory document, such as a part's payload.
    pub fn from_bytes(xml: &'a [u8]) -> Self {
        Self::new(xml)
    }
}

impl<R: BufRead> NormalizingReader<R> {
    /// Wrap any buffered XML source.
    pub fn new(inner: R) -> Self {
        Self {
            reader: NsReader::from_reader(inner),
            buf: Vec::new(),
            pending_end: None,
            depth: 0,
            done: false,
        }
    }

    /// Drop whitespace-only text between elements.
    ///
    /// Off by default: run text in WordprocessingML can be significant whitespace.
    pub fn trim_text(mut self, trim: bool) -> Self {
        self.reader.config_mut().trim_text(trim);
        self
    }

    /// Read the next normalized event.
    ///
    /// After [`XmlEvent::Eof`] every further call returns `Eof` again. A document that
    /// ends with elements still open is an error.
    pub fn next_event(&mut self) -> Result<XmlEvent> {
        if let Some(name) = self.pending_end.take() {
            self.depth -= 1;
            return Ok(XmlEvent::End(name));
        }
        if self.done {
            return Ok(XmlEvent::Eof);
        }

        loop {
            self.buf.clear();
            let (resolved, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            // Non-element events resolve as unbound, so this is only consulted for elements
            let namespace = namespace_uri(resolved);

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let name = qname(namespace?, e.local_name().as_ref(), prefix_of(e.name()));
                    let attributes = resolve_attributes(&self.reader, e)?;
                    self.depth += 1;
                    if matches!(event, Event::Empty(_)) {
                        self.pending_end = Some(name.clone());
                    }
                    return Ok(XmlEvent::Start(StartTag { name, attributes }));
                },
                Event::End(ref e) => {
                    let name = qname(namespace?, e.local_name().as_ref(), prefix_of(e.name()));
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(XmlEvent::End(name));
                },
                Event::Text(ref e) => {
                    let text = utf8(&e[..], "text")?;
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(XmlEvent::Text(text.to_string()));
                },
                Event::CData(ref e) => {
                    return Ok(XmlEvent::Text(utf8(&e[..], "CDATA")?.to_string()));
                },
                Event::GeneralRef(ref e) => {
                    return resolve_reference(utf8(&e[..], "reference")?).map(XmlEvent::Text);
                },
                Event::Eof => {
                    self.done = true;
                    if self.depth > 0 {
                        return Err(OoxmlError::Xml(format!(
                            "unexpected end of document with {} unclosed element(s)",
                            self.depth
                        )));
                    }
                    return Ok(XmlEvent::Eof);
                },
                // Declarations, comments, processing instructions and doctypes carry no content
                _ => continue,
            }
        }
    }

    /// Read all remaining events up to (not including) `Eof`.
    pub fn collect_events(&mut self) -> Result<Vec<XmlEvent>> {
        self.collect()
    }
}

impl<R: BufRead> Iterator for NormalizingReader<R> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event() {
            Ok(XmlEvent::Eof) => None,
            other => Some(other),
        }
    }
}

fn qname(namespace: String, local: &[u8], prefix: Option<String>) -> QName {
    QName {
        namespace,
        local: String::from_utf8_lossy(local).into_owned(),
        prefix,
    }
}

fn utf8<'b>(bytes: &'b [u8], what: &str) -> Result<&'b str> {
    std::str::from_utf8(bytes)
        .map_err(|err| OoxmlError::Xml(format!("invalid UTF-8 in {}: {}", what, err)))
}

fn prefix_of(name: quick_xml::name::QName<'_>) -> Option<String> {
    name.prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
}

/// Turn a resolution result into a normalized, owned namespace URI.
fn namespace_uri(resolved: ResolveResult<'_>) -> Result<String> {
    match resolved {
        ResolveResult::Bound(uri) => {
            let uri = utf8(uri.as_ref(), "namespace")?;
            Ok(normalize(uri).to_string())
        },
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) if prefix.as_slice() == b"xml" => Ok(ns::XML.to_string()),
        ResolveResult::Unknown(prefix) => Err(OoxmlError::Xml(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn resolve_attributes<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<Vec<XmlAttribute>> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let name = qname(namespace_uri(resolved)?, local.as_ref(), prefix_of(attr.key));
        let value = attr.unescape_value()?.into_owned();
        attributes.push(XmlAttribute { name, value });
    }
    Ok(attributes)
}

/// Resolve a character or predefined entity reference (`#x41`, `#65`, `amp`, ...).
fn resolve_reference(name: &str) -> Result<String> {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        let text = match name {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            "apos" => "'",
            _ => return Err(OoxmlError::Xml(format!("unknown entity reference '&{};'", name))),
        };
        return Ok(text.to_string());
    };

    code.and_then(char::from_u32)
        .map(|c| c.to_string())
        .ok_or_else(|| OoxmlError::Xml(format!("invalid character reference '&{};'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::namespace::WML_MAIN;

    const STRICT_W: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";

    fn events(xml: &str) -> Vec<XmlEvent> {
        NormalizingReader::from_bytes(xml.as_bytes())
            .trim_text(true)
            .collect_events()
            .unwrap()
    }

    #[test]
    fn test_strict_document_reads_as_transitional() {
        let xml = format!(
            r#"<w:document xmlns:w="{STRICT_W}"><w:body><w:p><w:r><w:t>Hi</w:t></w:r></w:p></w:body></w:document>"#
        );
        let evs = events(&xml);

        for ev in &evs {
            match ev {
                XmlEvent::Start(tag) => assert_eq!(tag.name.namespace, WML_MAIN),
                XmlEvent::End(name) => assert_eq!(name.namespace, WML_MAIN),
                XmlEvent::Text(t) => assert_eq!(t, "Hi"),
                XmlEvent::Eof => unreachable!(),
            }
        }
        match &evs[0] {
            XmlEvent::Start(tag) => {
                assert_eq!(tag.name.local, "document");
                assert_eq!(tag.name.prefix.as_deref(), Some("w"));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_attributes_are_normalized_and_declarations_hidden() {
        let xml = format!(r#"<w:b xmlns:w="{STRICT_W}" w:val="0" plain="x"/>"#);
        let evs = events(&xml);
        assert_eq!(evs.len(), 2);

        let XmlEvent::Start(tag) = &evs[0] else {
            panic!("expected start, got {:?}", evs[0]);
        };
        assert_eq!(tag.attributes.len(), 2);
        assert_eq!(tag.attr(WML_MAIN, "val"), Some("0"));
        assert_eq!(tag.attr("", "plain"), Some("x"));
        assert!(matches!(&evs[1], XmlEvent::End(name) if name.is(WML_MAIN, "b")));
    }

    #[test]
    fn test_default_namespace_and_unknown_uri() {
        let evs = events(r#"<root xmlns="urn:custom"><child/></root><!-- tail -->"#);
        let names: Vec<(&str, &str)> = evs
            .iter()
            .filter_map(|e| match e {
                XmlEvent::Start(t) => Some((t.name.namespace.as_str(), t.name.local.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec![("urn:custom", "root"), ("urn:custom", "child")]);

        let evs = events("<plain/>");
        assert!(matches!(&evs[0], XmlEvent::Start(t) if t.name.namespace.is_empty()));
    }

    #[test]
    fn test_entities_and_cdata_become_text() {
        let evs = events("<t>a &amp; b &#x41;<![CDATA[<raw>]]></t>");
        let text: String = evs
            .iter()
            .filter_map(|e| match e {
                XmlEvent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text.replace(' ', ""), "a&bA<raw>");
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut reader = NormalizingReader::from_bytes(b"<a/>");
        assert!(matches!(reader.next_event().unwrap(), XmlEvent::Start(_)));
        assert!(matches!(reader.next_event().unwrap(), XmlEvent::End(_)));
        assert_eq!(reader.next_event().unwrap(), XmlEvent::Eof);
        assert_eq!(reader.next_event().unwrap(), XmlEvent::Eof);
    }

    #[test]
    fn test_malformed_documents_error() {
        let mut reader = NormalizingReader::from_bytes(b"<a><b></a>");
        assert!(reader.collect_events().is_err());

        let mut reader = NormalizingReader::from_bytes(b"<a><b></b>");
        assert!(reader.collect_events().is_err());

        let mut reader = NormalizingReader::from_bytes(b"<x:a/>");
        assert!(reader.collect_events().is_err());
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("lt").unwrap(), "<");
        assert_eq!(resolve_reference("#65").unwrap(), "A");
        assert_eq!(resolve_reference("#x263A").unwrap(), "\u{263A}");
        assert!(resolve_reference("nbsp").is_err());
        assert!(resolve_reference("#xD800").is_err());
    }
}
