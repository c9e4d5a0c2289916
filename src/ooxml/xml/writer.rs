//! Fixed-prefix XML writer.
//!
//! OOXML consumers expect familiar prefixes (`cp:`, `dc:`, `w:`, ...), which a
//! URI-driven encoder cannot guarantee. [`PrefixedWriter`] therefore writes literal
//! prefixed names and declares every namespace of its [`PrefixMap`] once, on the root
//! element, in map order.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use ooxml_opc::ooxml::xml::writer::{PrefixMap, PrefixedWriter};
//!
//! let mut writer = PrefixedWriter::new(Vec::new(), PrefixMap::core_properties());
//! writer.start_root("cp:coreProperties")?;
//! writer.element("dc:title", "Report")?;
//! writer.element("cp:keywords", "")?;
//! let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
//! writer.datetime_element("dcterms:created", &created)?;
//! let xml = String::from_utf8(writer.finish()?).unwrap();
//!
//! assert!(xml.contains("<cp:keywords/>"));
//! assert!(xml.contains(r#"<dcterms:created xsi:type="dcterms:W3CDTF">2024-01-02T03:04:05Z</dcterms:created>"#));
//! # Ok::<(), ooxml_opc::ooxml::error::OoxmlError>(())
//! ```

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace as ns;
use crate::ooxml::xml::tristate::TriState;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// Ordered prefix to namespace URI bindings.
///
/// An empty prefix binds the default namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefixMap {
    entries: Vec<(String, String)>,
}

impl PrefixMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings used by the core properties part (`docProps/core.xml`).
    pub fn core_properties() -> Self {
        Self::new()
            .with("cp", ns::OPC_CORE_PROPERTIES)
            .with("dc", ns::DC)
            .with("dcterms", ns::DC_TERMS)
            .with("dcmitype", ns::DC_MITYPE)
            .with("xsi", ns::XSI)
    }

    /// Bindings for WordprocessingML body parts.
    pub fn wordprocessing() -> Self {
        Self::new()
            .with("w", ns::WML_MAIN)
            .with("r", ns::OFC_RELATIONSHIPS)
    }

    /// Append a binding. Rebinding an existing prefix replaces its URI in place.
    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let uri = uri.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = uri,
            None => self.entries.push((prefix, uri)),
        }
        self
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.uri(prefix).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Writer that emits names with fixed, caller-chosen prefixes.
///
/// The XML declaration is written with the root element. Element and attribute names
/// must use a prefix bound in the map; the `xml:` prefix is always accepted, and an
/// unprefixed attribute is in no namespace.
pub struct PrefixedWriter<W: Write> {
    writer: Writer<W>,
    prefixes: PrefixMap,
    open: Vec<String>,
    root_written: bool,
}

impl<W: Write> PrefixedWriter<W> {
    pub fn new(sink: W, prefixes: PrefixMap) -> Self {
        Self {
            writer: Writer::new(sink),
            prefixes,
            open: Vec::new(),
            root_written: false,
        }
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    /// Write the declaration and open the root element with all namespace bindings.
    pub fn start_root(&mut self, name: &str) -> Result<()> {
        if self.root_written {
            return Err(OoxmlError::InvalidState(format!(
                "root element already written, cannot start '{}' as root",
                name
            )));
        }
        self.check_element_name(name)?;

        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(|e| OoxmlError::Xml(format!("Failed to write XML declaration: {}", e)))?;

        let mut root = BytesStart::new(name);
        for (prefix, uri) in self.prefixes.iter() {
            if prefix.is_empty() {
                root.push_attribute(("xmlns", uri));
            } else {
                root.push_attribute((format!("xmlns:{}", prefix).as_str(), uri));
            }
        }
        self.write(Event::Start(root), name)?;
        self.open.push(name.to_string());
        self.root_written = true;
        Ok(())
    }

    /// Open a child element.
    pub fn start(&mut self, name: &str) -> Result<()> {
        self.start_with(name, &[])
    }

    /// Open a child element with attributes.
    pub fn start_with(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let start = self.child_start(name, attrs)?;
        self.write(Event::Start(start), name)?;
        self.open.push(name.to_string());
        Ok(())
    }

    /// Close the most recently opened element.
    pub fn end(&mut self) -> Result<()> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| OoxmlError::InvalidState("no open element to close".to_string()))?;
        self.write(Event::End(BytesEnd::new(name.as_str())), &name)
    }

    /// Write `<name>value</name>`, or `<name/>` when the value is empty.
    pub fn element(&mut self, name: &str, value: &str) -> Result<()> {
        self.element_with_attrs(name, &[], value)
    }

    /// Write a leaf element carrying attributes; self-closing when the value is empty.
    pub fn element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        value: &str,
    ) -> Result<()> {
        let start = self.child_start(name, attrs)?;
        if value.is_empty() {
            return self.write(Event::Empty(start), name);
        }
        self.write(Event::Start(start), name)?;
        self.write(Event::Text(BytesText::new(value)), name)?;
        self.write(Event::End(BytesEnd::new(name)), name)
    }

    /// Write a timestamp element typed as `dcterms:W3CDTF`, truncated to whole seconds.
    pub fn datetime_element(&mut self, name: &str, value: &DateTime<Utc>) -> Result<()> {
        self.element_with_attrs(name, &[("xsi:type", "dcterms:W3CDTF")], &format_w3cdtf(value))
    }

    /// Write a toggle element: compact when true, `val="0"` when false, nothing when unset.
    ///
    /// The value attribute shares the element's prefix, e.g. `w:b` gets `w:val`.
    pub fn tri_state(&mut self, name: &str, state: TriState) -> Result<()> {
        if !state.is_set() {
            return Ok(());
        }
        match state.val_attr() {
            None => self.element(name, ""),
            Some(val) => {
                let attr = match name.split_once(':') {
                    Some((prefix, _)) => format!("{}:val", prefix),
                    None => "val".to_string(),
                };
                self.element_with_attrs(name, &[(attr.as_str(), val)], "")
            },
        }
    }

    /// Close every open element and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if !self.root_written {
            return Err(OoxmlError::InvalidState("no root element written".to_string()));
        }
        while !self.open.is_empty() {
            self.end()?;
        }
        Ok(self.writer.into_inner())
    }

    fn child_start<'a>(&self, name: &'a str, attrs: &[(&str, &str)]) -> Result<BytesStart<'a>> {
        if self.open.is_empty() {
            return Err(OoxmlError::InvalidState(format!(
                "element '{}' written outside the root element",
                name
            )));
        }
        self.check_element_name(name)?;

        let mut start = BytesStart::new(name);
        for &(key, value) in attrs {
            self.check_attribute_name(key)?;
            start.push_attribute((key, value));
        }
        Ok(start)
    }

    fn write(&mut self, event: Event<'_>, name: &str) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| OoxmlError::Xml(format!("Failed to write '{}': {}", name, e)))
    }

    fn check_element_name(&self, name: &str) -> Result<()> {
        match name.split_once(':') {
            Some((prefix, _)) => self.check_prefix(prefix, name),
            // Unprefixed elements belong to the default namespace, which must be bound
            None if self.prefixes.contains("") => Ok(()),
            None => Err(OoxmlError::UnknownPrefix(name.to_string())),
        }
    }

    fn check_attribute_name(&self, name: &str) -> Result<()> {
        match name.split_once(':') {
            Some((prefix, _)) => self.check_prefix(prefix, name),
            None => Ok(()),
        }
    }

    fn check_prefix(&self, prefix: &str, name: &str) -> Result<()> {
        if prefix == "xml" || (!prefix.is_empty() && self.prefixes.contains(prefix)) {
            Ok(())
        } else {
            Err(OoxmlError::UnknownPrefix(name.to_string()))
        }
    }
}

/// Format a timestamp as W3CDTF (`YYYY-MM-DDThh:mm:ssZ`), dropping sub-second digits.
pub fn format_w3cdtf(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse a W3CDTF timestamp.
///
/// Accepts full timestamps with any offset (converted to UTC) or with fractional
/// seconds, timestamps with no zone (taken as UTC), and the reduced date forms
/// `YYYY-MM-DD`, `YYYY-MM` and `YYYY`.
pub fn parse_w3cdtf(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(dt.and_utc());
    }

    let mut parts = s.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next().map_or(Some(1), |m| m.parse::<u32>().ok())?;
    let day = parts.next().map_or(Some(1), |d| d.parse::<u32>().ok())?;
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}
