//! Package writer for OPC packages.
//!
//! Serializes a package as `[Content_Types].xml`, then `_rels/.rels`, then every part
//! in sorted partname order, each immediately followed by its `.rels` entry. The
//! content types table and all relationship parts are regenerated from the
//! in-memory state; nothing from the originally loaded container is reused.

use crate::ooxml::opc::error::Result;
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgWriter;
use std::io::{Cursor, Seek, Write};
use tracing::debug;

/// Package writer that serializes an OPC package to a ZIP container.
///
/// # Example
///
/// ```
/// use ooxml_opc::ooxml::opc::{OpcPackage, PackURI};
/// use ooxml_opc::ooxml::opc::pkgwriter::PackageWriter;
///
/// let mut pkg = OpcPackage::new();
/// pkg.add_part(PackURI::new("/word/document.xml")?, "application/xml", b"<doc/>".to_vec())?;
/// let bytes = PackageWriter::to_bytes(&pkg)?;
/// assert_eq!(&bytes[..2], b"PK");
/// # Ok::<(), ooxml_opc::ooxml::opc::OpcError>(())
/// ```
pub struct PackageWriter;

impl PackageWriter {
    /// Serialize a package to bytes.
    pub fn to_bytes(package: &OpcPackage) -> Result<Vec<u8>> {
        Self::write(Cursor::new(Vec::new()), package).map(Cursor::into_inner)
    }

    /// Serialize a package into a seekable sink and return the sink.
    pub fn write<W: Write + Seek>(sink: W, package: &OpcPackage) -> Result<W> {
        debug!(
            parts = package.part_count(),
            package_rels = package.rels().len(),
            "saving package"
        );
        let mut phys_writer = PhysPkgWriter::new(sink, package.options().compression);

        Self::write_content_types(&mut phys_writer, package)?;
        Self::write_pkg_rels(&mut phys_writer, package)?;
        Self::write_parts(&mut phys_writer, package)?;

        let sink = phys_writer.finish()?;
        debug!("package saved");
        Ok(sink)
    }

    /// Write `[Content_Types].xml`, regenerated from the parts' content types.
    fn write_content_types<W: Write + Seek>(
        phys_writer: &mut PhysPkgWriter<W>,
        package: &OpcPackage,
    ) -> Result<()> {
        let table = package
            .default_content_types()
            .for_parts(package.parts().map(|part| (part.partname(), part.content_type())));
        phys_writer.write(&CONTENT_TYPES_URI[1..], table.to_xml().as_bytes())
    }

    /// Write `_rels/.rels`, only when the package has relationships.
    fn write_pkg_rels<W: Write + Seek>(
        phys_writer: &mut PhysPkgWriter<W>,
        package: &OpcPackage,
    ) -> Result<()> {
        if package.rels().is_empty() {
            return Ok(());
        }
        let rels_uri = PackURI::new(PACKAGE_URI)?.rels_uri();
        phys_writer.write(rels_uri.membername(), package.rels().to_xml().as_bytes())
    }

    /// Write all parts, sorted by partname, and their relationships.
    fn write_parts<W: Write + Seek>(
        phys_writer: &mut PhysPkgWriter<W>,
        package: &OpcPackage,
    ) -> Result<()> {
        for part in package.parts() {
            phys_writer.write(part.partname().membername(), part.blob())?;

            if !part.rels().is_empty() {
                let rels_uri = part.partname().rels_uri();
                phys_writer.write(rels_uri.membername(), part.rels().to_xml().as_bytes())?;
            }
        }
        Ok(())
    }
}
