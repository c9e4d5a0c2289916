//! Objects that implement reading and writing OPC packages.
//!
//! This module provides the main OpcPackage type, which represents an Open Packaging
//! Convention package in memory: a set of named parts, the package-level
//! relationships, and the Default content types used when the package is saved.
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::content_types::ContentTypeMap;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::options::PackageOptions;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI, is_rels_member};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::{Relationship, Relationships, TargetMode};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::debug;

/// Main API class for working with OPC packages.
///
/// Parts are kept sorted by partname, which is also the order they are saved in.
/// A package has no internal synchronization; mutate it from one thread at a time.
#[derive(Debug, Clone)]
pub struct OpcPackage {
    /// Package-level relationships
    rels: Relationships,

    /// All parts in the package, keyed by partname
    parts: BTreeMap<String, Part>,

    /// Default (per extension) content types; Overrides are derived from the parts on save
    defaults: ContentTypeMap,

    options: PackageOptions,
}

impl OpcPackage {
    /// Create a new empty OPC package with the standard `rels` and `xml` Defaults.
    pub fn new() -> Self {
        Self::with_options(PackageOptions::default())
    }

    /// Create a new empty OPC package with the given options.
    pub fn with_options(options: PackageOptions) -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI),
            parts: BTreeMap::new(),
            defaults: ContentTypeMap::with_standard_defaults(),
            options,
        }
    }

    /// Open an OPC package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use ooxml_opc::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("document.docx")?;
    /// println!("{} parts", pkg.part_count());
    /// # Ok::<(), ooxml_opc::ooxml::opc::OpcError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, PackageOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: PackageOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening package");
        let data = std::fs::read(path).map_err(|source| OpcError::ContainerOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes_with(&data, options)
    }

    /// Load an OPC package from a seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with(reader, PackageOptions::default())
    }

    pub fn from_reader_with<R: Read + Seek>(reader: R, options: PackageOptions) -> Result<Self> {
        let phys_reader = PhysPkgReader::from_reader(reader)?;
        Self::from_phys_reader(phys_reader, options)
    }

    /// Load an OPC package from the bytes of a ZIP container.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, PackageOptions::default())
    }

    pub fn from_bytes_with(data: &[u8], options: PackageOptions) -> Result<Self> {
        let phys_reader = PhysPkgReader::from_bytes(data)?;
        Self::from_phys_reader(phys_reader, options)
    }

    fn from_phys_reader(phys_reader: PhysPkgReader, options: PackageOptions) -> Result<Self> {
        debug!(entries = phys_reader.len(), "loading package");
        let pkg_reader = PackageReader::from_phys_reader(phys_reader, &options)?;
        let package = Self::unmarshal(pkg_reader, options)?;
        debug!(
            parts = package.part_count(),
            package_rels = package.rels.len(),
            "package loaded"
        );
        Ok(package)
    }

    /// Build the in-memory package from classified entries.
    fn unmarshal(pkg_reader: PackageReader, options: PackageOptions) -> Result<Self> {
        let (content_types, pkg_srels, sparts) = pkg_reader.into_parts();

        // Only the Defaults are kept; Overrides are regenerated from part content types
        let mut defaults = ContentTypeMap::new();
        for (ext, content_type) in content_types.defaults() {
            defaults.add_default(ext, content_type);
        }

        let mut package = Self {
            rels: Relationships::new(PACKAGE_URI),
            parts: BTreeMap::new(),
            defaults,
            options,
        };

        for srel in pkg_srels {
            package
                .rels
                .insert_loaded(srel.r_id, srel.reltype, srel.target_ref, srel.target_mode)?;
        }

        for spart in sparts {
            let mut part = Part::new(spart.partname, spart.content_type, spart.blob);
            for srel in spart.srels {
                part.rels_mut().insert_loaded(
                    srel.r_id,
                    srel.reltype,
                    srel.target_ref,
                    srel.target_mode,
                )?;
            }
            package.parts.insert(part.partname().to_string(), part);
        }

        Ok(package)
    }

    /// Serialize the package to the bytes of a ZIP container.
    ///
    /// Saving an unmodified package twice yields identical bytes.
    pub fn save(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// Save the package to a file.
    ///
    /// The container is built in memory first, so a failed save never leaves a
    /// partially serialized package behind; the file write itself is not atomic.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.save()?;
        std::fs::write(path, bytes).map_err(|source| OpcError::Write {
            entry: path.display().to_string(),
            source,
        })
    }

    /// Save the package to any writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let bytes = self.save()?;
        writer.write_all(&bytes).map_err(|source| OpcError::Write {
            entry: "package".to_string(),
            source,
        })
    }

    /// Get the options the package was created or loaded with.
    #[inline]
    pub fn options(&self) -> &PackageOptions {
        &self.options
    }

    /// Get a part by its partname, e.g. `/word/document.xml`.
    pub fn part(&self, partname: impl AsRef<str>) -> Option<&Part> {
        self.parts.get(partname.as_ref())
    }

    /// Get a mutable reference to a part by its partname.
    pub fn part_mut(&mut self, partname: impl AsRef<str>) -> Option<&mut Part> {
        self.parts.get_mut(partname.as_ref())
    }

    /// Add a part, replacing any existing part with the same name.
    ///
    /// A replaced part's relationships are discarded along with it.
    ///
    /// # Errors
    /// Returns [`OpcError::InvalidPackUri`] for names the container reserves: the
    /// package itself, `/[Content_Types].xml` and any `_rels/*.rels` entry.
    pub fn add_part(
        &mut self,
        partname: PackURI,
        content_type: impl Into<String>,
        blob: Vec<u8>,
    ) -> Result<&mut Part> {
        if partname.is_package()
            || partname.as_str() == CONTENT_TYPES_URI
            || is_rels_member(partname.as_str())
        {
            return Err(OpcError::InvalidPackUri(format!(
                "'{}' is reserved by the package and cannot name a part",
                partname
            )));
        }

        let part = Part::new(partname, content_type, blob);
        Ok(match self.parts.entry(part.partname().to_string()) {
            Entry::Occupied(mut entry) => {
                debug!(part = %part.partname(), "replacing existing part");
                entry.insert(part);
                entry.into_mut()
            },
            Entry::Vacant(entry) => entry.insert(part),
        })
    }

    /// Remove a part. Relationships pointing at it are left untouched.
    ///
    /// Returns whether the part existed.
    pub fn remove_part(&mut self, partname: impl AsRef<str>) -> bool {
        self.parts.remove(partname.as_ref()).is_some()
    }

    /// Get an iterator over all parts, sorted by partname.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    #[inline]
    pub fn contains_part(&self, partname: impl AsRef<str>) -> bool {
        self.parts.contains_key(partname.as_ref())
    }

    #[inline]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Find the next available partname for a part template.
    ///
    /// The template carries a `%d` placeholder that is replaced by the lowest
    /// positive number giving an unused partname.
    ///
    /// # Example
    /// ```
    /// use ooxml_opc::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::new();
    /// let next_image = pkg.next_partname("/word/media/image%d.png")?;
    /// assert_eq!(next_image.as_str(), "/word/media/image1.png");
    /// # Ok::<(), ooxml_opc::ooxml::opc::OpcError>(())
    /// ```
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        if !template.contains("%d") {
            return Err(OpcError::InvalidPackUri(format!(
                "partname template '{}' has no %d placeholder",
                template
            )));
        }
        // With N parts, one of the first N + 1 candidates is always free
        for n in 1..=self.parts.len() + 1 {
            let candidate = PackURI::new(template.replace("%d", &n.to_string()))?;
            if !self.parts.contains_key(candidate.as_str()) {
                return Ok(candidate);
            }
        }
        Err(OpcError::InvalidPackUri(format!(
            "no free partname for template '{}'",
            template
        )))
    }

    /// Resolve the content type for a partname.
    ///
    /// An existing part answers with its own content type; otherwise the Default for
    /// the extension applies. Returns `None` when neither resolves.
    pub fn content_type_for(&self, partname: &PackURI) -> Option<&str> {
        match self.parts.get(partname.as_str()) {
            Some(part) if !part.content_type().is_empty() => Some(part.content_type()),
            _ => self.defaults.resolve(partname),
        }
    }

    /// Add or replace a Default content type for an extension.
    pub fn add_default_content_type(&mut self, extension: &str, content_type: &str) {
        self.defaults.add_default(extension, content_type);
    }

    /// The Default content types written on save.
    pub fn default_content_types(&self) -> &ContentTypeMap {
        &self.defaults
    }

    /// Get a reference to the package-level relationships.
    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Get a copy of the package-level relationships, in stored order.
    pub fn package_relationships(&self) -> Vec<Relationship> {
        self.rels.iter().cloned().collect()
    }

    /// Add an internal package-level relationship with a fresh ID.
    ///
    /// `target` is a partname relative to the package root, e.g. `word/document.xml`.
    pub fn add_package_relationship(&mut self, reltype: &str, target: &str) -> String {
        self.rels.add(reltype, target, TargetMode::Internal)
    }

    /// Add an external package-level relationship with a fresh ID.
    pub fn add_external_package_relationship(&mut self, reltype: &str, url: &str) -> String {
        self.rels.add(reltype, url, TargetMode::External)
    }

    /// Get package-level relationships of a type, in stored order.
    pub fn package_relationships_by_type(&self, reltype: &str) -> Vec<&Relationship> {
        self.rels
            .by_type(reltype, self.options.normalize_relationship_types)
    }

    /// Remove a package-level relationship by ID.
    pub fn remove_package_relationship(&mut self, r_id: &str) -> Option<Relationship> {
        self.rels.remove(r_id)
    }

    /// Relate the package to a part, reusing an existing relationship of that type
    /// to that part.
    ///
    /// Returns the relationship ID.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(PACKAGE_URI);
        self.rels.get_or_add(reltype, &target_ref)
    }

    /// Get the part targeted by the single package-level relationship of a type.
    pub fn part_by_reltype(&self, reltype: &str) -> Result<&Part> {
        let rel = self
            .rels
            .part_with_reltype(reltype, self.options.normalize_relationship_types)?;
        let partname = rel.target_partname()?;
        self.part(&partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Get the main document part (the `officeDocument` relationship target).
    pub fn main_document_part(&self) -> Result<&Part> {
        self.part_by_reltype(relationship_type::OFFICE_DOCUMENT)
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
    use crate::ooxml::opc::options::{Compression, ContentTypePolicy};
    use std::io::Cursor;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"/>"#;

    fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            std::io::Write::write_all(&mut writer, data.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// The container from the package engine's end-to-end scenario.
    fn create_minimal_docx() -> Vec<u8> {
        zip_of(&[
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#,
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
            ),
            ("docProps/core.xml", CORE_XML),
            (
                "word/document.xml",
                r#"<?xml version="1.0"?>
<document xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <body><p><t>Test</t></p></body>
</document>"#,
            ),
        ])
    }

    fn assert_same_content(a: &OpcPackage, b: &OpcPackage) {
        let parts_a: Vec<(&str, &str, &[u8])> = a
            .parts()
            .map(|p| (p.partname().as_str(), p.content_type(), p.blob()))
            .collect();
        let parts_b: Vec<(&str, &str, &[u8])> = b
            .parts()
            .map(|p| (p.partname().as_str(), p.content_type(), p.blob()))
            .collect();
        assert_eq!(parts_a, parts_b);
        assert_eq!(a.package_relationships(), b.package_relationships());
        for part in a.parts() {
            assert_eq!(b.part(part.partname()).unwrap().rels(), part.rels());
            assert_eq!(a.content_type_for(part.partname()), b.content_type_for(part.partname()));
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let pkg = OpcPackage::from_bytes(&create_minimal_docx()).unwrap();
        let reloaded = OpcPackage::from_bytes(&pkg.save().unwrap()).unwrap();

        let rels = reloaded.package_relationships_by_type(rt::OFFICE_DOCUMENT);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].target_ref(), "word/document.xml");
        assert_eq!(reloaded.package_relationships().len(), 1);

        assert_eq!(
            reloaded.part("/docProps/core.xml").unwrap().content_type(),
            ct::OPC_CORE_PROPERTIES
        );
        assert_eq!(reloaded.part("/word/document.xml").unwrap().content_type(), ct::XML);
        assert_eq!(
            reloaded.main_document_part().unwrap().partname().as_str(),
            "/word/document.xml"
        );
    }

    #[test]
    fn test_round_trip_two_cycles() {
        let mut pkg = OpcPackage::from_bytes(&create_minimal_docx()).unwrap();
        let image = PackURI::new("/word/media/image1.png").unwrap();
        pkg.add_default_content_type("png", ct::PNG);
        pkg.add_part(image.clone(), ct::PNG, vec![0x89, b'P', b'N', b'G']).unwrap();
        let document = pkg.part_mut("/word/document.xml").unwrap();
        document.relate_to(&image, rt::IMAGE);
        document.relate_to_ext("https://example.com/a?b=1&c=2", rt::HYPERLINK);

        let first = OpcPackage::from_bytes(&pkg.save().unwrap()).unwrap();
        assert_same_content(&pkg, &first);
        let second = OpcPackage::from_bytes(&first.save().unwrap()).unwrap();
        assert_same_content(&first, &second);

        let rels = second.part("/word/document.xml").unwrap().rels();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels.get("rId1").unwrap().target_ref(), "media/image1.png");
        assert_eq!(rels.get("rId2").unwrap().target_ref(), "https://example.com/a?b=1&c=2");
        assert!(rels.get("rId2").unwrap().is_external());
    }

    #[test]
    fn test_saves_are_byte_identical() {
        let pkg = OpcPackage::from_bytes(&create_minimal_docx()).unwrap();
        assert_eq!(pkg.save().unwrap(), pkg.save().unwrap());

        let reloaded = OpcPackage::from_bytes(&pkg.save().unwrap()).unwrap();
        assert_eq!(reloaded.save().unwrap(), pkg.save().unwrap());
    }

    #[test]
    fn test_stored_compression_round_trips() {
        let options = PackageOptions::new().with_compression(Compression::Stored);
        let pkg = OpcPackage::from_bytes_with(&create_minimal_docx(), options).unwrap();
        let reloaded = OpcPackage::from_bytes(&pkg.save().unwrap()).unwrap();
        assert_same_content(&pkg, &reloaded);
    }

    #[test]
    fn test_missing_content_types_is_fatal() {
        let data = zip_of(&[("word/document.xml", "<document/>")]);
        assert!(matches!(
            OpcPackage::from_bytes(&data),
            Err(OpcError::MissingRequiredEntry(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            OpcPackage::from_bytes(b"PK but not really"),
            Err(OpcError::ContainerFormat { .. })
        ));
    }

    #[test]
    fn test_malformed_part_rels_names_entry() {
        let data = zip_of(&[
            ("[Content_Types].xml", r#"<Types><Default Extension="xml" ContentType="application/xml"/></Types>"#),
            ("word/document.xml", "<document/>"),
            ("word/_rels/document.xml.rels", "<Relationships><Relationship"),
        ]);
        let err = OpcPackage::from_bytes(&data).unwrap_err();
        assert!(err.to_string().contains("word/_rels/document.xml.rels"), "{err}");
    }

    #[test]
    fn test_truncated_content_types_is_fatal() {
        let data = zip_of(&[
            ("[Content_Types].xml", r#"<Types><Default Extension="xml" ContentType="application/xml"/>"#),
            ("word/document.xml", "<document/>"),
        ]);
        assert!(matches!(
            OpcPackage::from_bytes(&data),
            Err(OpcError::MalformedContentTypes { .. })
        ));
    }

    #[test]
    fn test_unresolved_content_type_policies() {
        let data = zip_of(&[
            ("[Content_Types].xml", r#"<Types><Default Extension="xml" ContentType="application/xml"/></Types>"#),
            ("media/blob.dat", "raw"),
        ]);

        let lenient = OpcPackage::from_bytes(&data).unwrap();
        let part = lenient.part("/media/blob.dat").unwrap();
        assert_eq!(part.content_type(), "");
        assert_eq!(part.blob(), b"raw");
        assert_eq!(lenient.content_type_for(part.partname()), None);

        let strict = PackageOptions::new().with_content_type_policy(ContentTypePolicy::Strict);
        assert!(matches!(
            OpcPackage::from_bytes_with(&data, strict),
            Err(OpcError::UnresolvedContentType(_))
        ));
    }

    #[test]
    fn test_backslash_entries_normalized() {
        let data = zip_of(&[
            ("[Content_Types].xml", r#"<Types><Default Extension="xml" ContentType="application/xml"/></Types>"#),
            ("word\\document.xml", "<document/>"),
        ]);
        let pkg = OpcPackage::from_bytes(&data).unwrap();
        assert!(pkg.contains_part("/word/document.xml"));
    }

    #[test]
    fn test_open_and_save_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minimal.docx");
        std::fs::write(&path, create_minimal_docx()).unwrap();

        let pkg = OpcPackage::open(&path).unwrap();
        assert_eq!(pkg.part_count(), 2);

        let out = dir.path().join("saved.docx");
        pkg.save_to_path(&out).unwrap();
        let reopened = OpcPackage::open(&out).unwrap();
        assert_same_content(&pkg, &reopened);

        let err = OpcPackage::open(dir.path().join("missing.docx")).unwrap_err();
        assert!(matches!(err, OpcError::ContainerOpen { .. }));
    }

    #[test]
    fn test_write_to_and_from_reader() {
        let pkg = OpcPackage::from_bytes(&create_minimal_docx()).unwrap();
        let mut sink = Vec::new();
        pkg.write_to(&mut sink).unwrap();
        let reloaded = OpcPackage::from_reader(Cursor::new(sink)).unwrap();
        assert_same_content(&pkg, &reloaded);
    }

    #[test]
    fn test_part_management() {
        let mut pkg = OpcPackage::new();
        let b = PackURI::new("/b.xml").unwrap();
        let a = PackURI::new("/a.xml").unwrap();
        pkg.add_part(b.clone(), ct::XML, b"<b/>".to_vec()).unwrap();
        pkg.add_part(a.clone(), ct::XML, b"<a/>".to_vec()).unwrap();

        let names: Vec<&str> = pkg.parts().map(|p| p.partname().as_str()).collect();
        assert_eq!(names, vec!["/a.xml", "/b.xml"]);

        pkg.add_part(a.clone(), "application/special", b"<a2/>".to_vec()).unwrap();
        assert_eq!(pkg.part_count(), 2);
        assert_eq!(pkg.part(&a).unwrap().blob(), b"<a2/>");

        assert!(pkg.remove_part(&b));
        assert!(!pkg.remove_part(&b));
        assert!(!pkg.contains_part(&b));
        assert!(pkg.part("/missing.xml").is_none());
    }

    #[test]
    fn test_remove_part_keeps_relationships() {
        let mut pkg = OpcPackage::from_bytes(&create_minimal_docx()).unwrap();
        assert!(pkg.remove_part("/word/document.xml"));
        assert_eq!(pkg.package_relationships().len(), 1);
        assert!(matches!(pkg.main_document_part(), Err(OpcError::PartNotFound(_))));
    }

    #[test]
    fn test_package_relationships() {
        let mut pkg = OpcPackage::new();
        let doc = PackURI::new("/word/document.xml").unwrap();
        pkg.add_part(doc.clone(), ct::WML_DOCUMENT_MAIN, b"<w:document/>".to_vec())
            .unwrap();

        let r1 = pkg.relate_to(&doc, rt::OFFICE_DOCUMENT);
        assert_eq!(pkg.relate_to(&doc, rt::OFFICE_DOCUMENT), r1);
        let r2 = pkg.add_package_relationship(rt::CORE_PROPERTIES, "docProps/core.xml");
        let r3 = pkg.add_external_package_relationship(rt::HYPERLINK, "https://example.com");
        assert_eq!((r1.as_str(), r2.as_str(), r3.as_str()), ("rId1", "rId2", "rId3"));

        let mut copy = pkg.package_relationships();
        copy.clear();
        assert_eq!(pkg.rels().len(), 3);

        assert!(pkg.remove_package_relationship(&r2).is_some());
        assert_eq!(pkg.add_package_relationship(rt::THUMBNAIL, "docProps/thumbnail.jpeg"), "rId2");
        assert!(pkg.remove_package_relationship("rId42").is_none());

        assert_eq!(pkg.main_document_part().unwrap().partname(), &doc);
    }

    #[test]
    fn test_strict_relationship_types_match_transitional() {
        let strict_type = "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument";
        let mut pkg = OpcPackage::new();
        let doc = PackURI::new("/word/document.xml").unwrap();
        pkg.add_part(doc, ct::WML_DOCUMENT_MAIN, Vec::new()).unwrap();
        pkg.add_package_relationship(strict_type, "word/document.xml");

        assert!(pkg.main_document_part().is_ok());
        assert_eq!(pkg.package_relationships_by_type(rt::OFFICE_DOCUMENT).len(), 1);

        let reloaded = OpcPackage::from_bytes(&pkg.save().unwrap()).unwrap();
        assert_eq!(reloaded.package_relationships()[0].reltype(), strict_type);

        let exact = PackageOptions::new().with_normalize_relationship_types(false);
        let exact_pkg = OpcPackage::from_bytes_with(&pkg.save().unwrap(), exact).unwrap();
        assert!(exact_pkg.package_relationships_by_type(rt::OFFICE_DOCUMENT).is_empty());
        assert!(exact_pkg.main_document_part().is_err());
    }

    #[test]
    fn test_next_partname() {
        let mut pkg = OpcPackage::new();
        let first = pkg.next_partname("/word/media/image%d.png").unwrap();
        assert_eq!(first.as_str(), "/word/media/image1.png");
        pkg.add_part(first, ct::PNG, Vec::new()).unwrap();
        let third = PackURI::new("/word/media/image3.png").unwrap();
        pkg.add_part(third, ct::PNG, Vec::new()).unwrap();

        assert_eq!(
            pkg.next_partname("/word/media/image%d.png").unwrap().as_str(),
            "/word/media/image2.png"
        );
        assert!(pkg.next_partname("/word/media/image.png").is_err());
        assert_eq!(
            pkg.next_partname("/word//media/image%d.png").unwrap().as_str(),
            "/word/media/image2.png"
        );
    }

    #[test]
    fn test_content_type_for() {
        let mut pkg = OpcPackage::new();
        let special = PackURI::new("/a.xml").unwrap();
        pkg.add_part(special.clone(), "application/special", Vec::new()).unwrap();

        assert_eq!(pkg.content_type_for(&special), Some("application/special"));
        assert_eq!(pkg.content_type_for(&PackURI::new("/b.xml").unwrap()), Some(ct::XML));
        assert_eq!(pkg.content_type_for(&PackURI::new("/c.dat").unwrap()), None);

        pkg.add_default_content_type(".DAT", "application/octet-stream");
        assert_eq!(
            pkg.content_type_for(&PackURI::new("/c.dat").unwrap()),
            Some("application/octet-stream")
        );
        assert!(pkg.default_content_types().defaults().any(|(ext, _)| ext == "dat"));
    }

    #[test]
    fn test_unreferenced_parts_survive() {
        let mut pkg = OpcPackage::from_bytes(&create_minimal_docx()).unwrap();
        let item = PackURI::new("/customXml/item1.xml").unwrap();
        pkg.add_part(item, ct::XML, b"<x/>".to_vec()).unwrap();
        let reloaded = OpcPackage::from_bytes(&pkg.save().unwrap()).unwrap();
        assert!(reloaded.contains_part("/customXml/item1.xml"));
    }

    #[test]
    fn test_loose_partnames_round_trip() {
        let mut pkg = OpcPackage::new();
        let doc = PackURI::new("/word//document.xml").unwrap();
        pkg.add_part(doc, ct::XML, b"<document/>".to_vec()).unwrap();
        let item = PackURI::new("/customXml/./item1.xml").unwrap();
        pkg.add_part(item, ct::XML, b"<x/>".to_vec()).unwrap();
        assert!(PackURI::new("/dir/").is_err());

        let reloaded = OpcPackage::from_bytes(&pkg.save().unwrap()).unwrap();
        let names: Vec<&str> = reloaded.parts().map(|p| p.partname().as_str()).collect();
        assert_eq!(names, vec!["/customXml/item1.xml", "/word/document.xml"]);
        assert_same_content(&pkg, &reloaded);
    }

    #[test]
    fn test_reserved_partnames_rejected() {
        let mut pkg = OpcPackage::new();
        for name in [
            "/",
            "/[Content_Types].xml",
            "/_rels/.rels",
            "/word/_rels/document.xml.rels",
            "/custom/_rels/notes.rels",
        ] {
            let partname = PackURI::new(name).unwrap();
            assert!(
                matches!(
                    pkg.add_part(partname, ct::XML, Vec::new()),
                    Err(OpcError::InvalidPackUri(_))
                ),
                "input {name}"
            );
        }
        assert_eq!(pkg.part_count(), 0);

        let notes = PackURI::new("/custom/notes.rels").unwrap();
        pkg.add_part(notes, ct::OPC_RELATIONSHIPS, b"<Relationships/>".to_vec())
            .unwrap();
        let reloaded = OpcPackage::from_bytes(&pkg.save().unwrap()).unwrap();
        assert!(reloaded.contains_part("/custom/notes.rels"));
    }
}
