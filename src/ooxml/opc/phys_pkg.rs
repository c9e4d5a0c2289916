//! Physical access to the ZIP container of an OPC package.
//!
//! Reading decompresses every entry into memory up front, keyed by its normalized
//! member name, so parts can be assembled by random access without touching the
//! archive again. Writing produces a deterministic archive: entries carry a fixed
//! timestamp and are written in exactly the order the caller supplies.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::options::Compression;
use crate::ooxml::opc::packuri::PackURI;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use tracing::{trace, warn};
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

/// All entries of a ZIP container, decompressed.
#[derive(Debug, Default)]
pub struct PhysPkgReader {
    /// Member names (no leading slash, `/` separated) to entry contents
    entries: BTreeMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    /// Read every entry of an in-memory archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Read every entry of a seekable archive.
    ///
    /// Directory entries are skipped. Entry names are normalized the same way part
    /// names are, so `word\document.xml` and `/word/document.xml` both become
    /// `word/document.xml`; when two entries collapse to one name the first wins.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|source| OpcError::ContainerFormat { entry: None, source })?;

        let mut entries = BTreeMap::new();
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|source| OpcError::ContainerFormat { entry: None, source })?;
            let raw_name = file.name().to_string();

            if file.is_dir() {
                trace!(entry = %raw_name, "skipping directory entry");
                continue;
            }

            let name = match PackURI::from_member_name(&raw_name) {
                Ok(uri) => uri.membername().to_string(),
                Err(_) => {
                    trace!(entry = %raw_name, "skipping entry without a path");
                    continue;
                },
            };

            let mut blob = Vec::new();
            file.read_to_end(&mut blob)
                .map_err(|e| OpcError::ContainerFormat {
                    entry: Some(raw_name.clone()),
                    source: zip::result::ZipError::Io(e),
                })?;

            if entries.contains_key(&name) {
                warn!(entry = %raw_name, member = %name, "duplicate ZIP entry ignored");
                continue;
            }
            trace!(entry = %name, size = blob.len(), "read entry");
            entries.insert(name, blob);
        }

        Ok(Self { entries })
    }

    /// Get an entry's contents by member name.
    #[inline]
    pub fn get(&self, membername: &str) -> Option<&[u8]> {
        self.entries.get(membername).map(Vec::as_slice)
    }

    /// Remove an entry and take ownership of its contents.
    #[inline]
    pub fn take(&mut self, membername: &str) -> Option<Vec<u8>> {
        self.entries.remove(membername)
    }

    #[inline]
    pub fn contains(&self, membername: &str) -> bool {
        self.entries.contains_key(membername)
    }

    /// Member names in sorted order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the reader and return all entries.
    pub fn into_entries(self) -> BTreeMap<String, Vec<u8>> {
        self.entries
    }
}

/// Deterministic ZIP writer.
pub struct PhysPkgWriter<W: Write + Seek> {
    archive: zip::ZipWriter<W>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter<Cursor<Vec<u8>>> {
    /// Create a writer that builds the archive in memory.
    pub fn in_memory(compression: Compression) -> Self {
        Self::new(Cursor::new(Vec::new()), compression)
    }
}

impl<W: Write + Seek> PhysPkgWriter<W> {
    pub fn new(sink: W, compression: Compression) -> Self {
        // A fixed timestamp keeps repeated saves byte-identical
        let options = SimpleFileOptions::default()
            .compression_method(compression.method())
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644);
        Self {
            archive: zip::ZipWriter::new(sink),
            options,
        }
    }

    /// Write one entry.
    pub fn write(&mut self, membername: &str, blob: &[u8]) -> Result<()> {
        self.archive
            .start_file(membername, self.options)
            .map_err(|e| OpcError::write(membername, e))?;
        self.archive
            .write_all(blob)
            .map_err(|source| OpcError::Write {
                entry: membername.to_string(),
                source,
            })?;
        trace!(entry = membername, size = blob.len(), "wrote entry");
        Ok(())
    }

    /// Write the central directory and return the sink.
    pub fn finish(self) -> Result<W> {
        self.archive
            .finish()
            .map_err(|e| OpcError::write("central directory", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(data.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_round_trip() {
        let mut writer = PhysPkgWriter::in_memory(Compression::Deflated);
        writer.write("test.txt", b"Hello, World!").unwrap();
        let zip_data = writer.finish().unwrap().into_inner();

        let reader = PhysPkgReader::from_bytes(&zip_data).unwrap();
        assert_eq!(reader.get("test.txt"), Some(&b"Hello, World!"[..]));
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn test_stored_entries() {
        let mut writer = PhysPkgWriter::in_memory(Compression::Stored);
        writer.write("word/document.xml", b"<document/>").unwrap();
        let zip_data = writer.finish().unwrap().into_inner();

        let mut archive = ZipArchive::new(Cursor::new(zip_data)).unwrap();
        let file = archive.by_index(0).unwrap();
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);
    }

    #[test]
    fn test_output_is_deterministic() {
        let build = || {
            let mut writer = PhysPkgWriter::in_memory(Compression::Deflated);
            writer.write("a.xml", b"<a/>").unwrap();
            writer.write("b/c.bin", &[0u8, 1, 2, 3]).unwrap();
            writer.finish().unwrap().into_inner()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_names_normalized_and_directories_skipped() {
        let data = archive(&[
            ("word/", ""),
            ("word\\document.xml", "<doc/>"),
            ("docProps//core.xml", "<core/>"),
            ("word/document.xml", "<dup/>"),
        ]);
        let reader = PhysPkgReader::from_bytes(&data).unwrap();

        let names: Vec<&str> = reader.member_names().collect();
        assert_eq!(names, vec!["docProps/core.xml", "word/document.xml"]);
        assert_eq!(reader.get("word/document.xml"), Some(&b"<doc/>"[..]));
    }

    #[test]
    fn test_not_a_zip() {
        let err = PhysPkgReader::from_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, OpcError::ContainerFormat { entry: None, .. }));
    }

    #[test]
    fn test_take_moves_entry_out() {
        let data = archive(&[("a.bin", "xyz")]);
        let mut reader = PhysPkgReader::from_bytes(&data).unwrap();
        assert!(reader.contains("a.bin"));
        assert_eq!(reader.take("a.bin"), Some(b"xyz".to_vec()));
        assert!(reader.is_empty());
    }
}
