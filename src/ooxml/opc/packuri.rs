//! Provides the PackURI value type and utilities for working with package URIs.
//!
//! A PackURI represents a part name within an OPC package, following the URI format
//! defined by the Open Packaging Conventions specification.
use crate::ooxml::opc::error::{OpcError, Result};

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// Directory segment that holds relationship parts.
const RELS_DIR: &str = "_rels/";

/// File suffix of relationship parts.
const RELS_EXT: &str = ".rels";

/// Represents a package URI, which is a partname within an OPC package.
///
/// PackURIs always begin with exactly one forward slash and use forward slashes as
/// path separators. They provide access to various components like the base URI
/// (directory), filename, extension, and index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/word/document.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a partname.
    ///
    /// Backslashes are treated as separators, and empty, `.` and `..` segments are
    /// resolved, so `/word//document.xml` and `/word/./document.xml` both become
    /// `/word/document.xml`. The package pseudo-partname `/` is accepted as is.
    ///
    /// # Errors
    /// Returns [`OpcError::InvalidPackUri`] if the URI doesn't start with a forward slash
    /// or names a directory rather than a file (e.g. `/word/`).
    pub fn new<S: Into<String>>(uri: S) -> Result<Self> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(OpcError::InvalidPackUri(format!(
                "PackURI must begin with slash, got '{}'",
                uri
            )));
        }
        if uri == PACKAGE_URI {
            return Ok(PackURI { uri });
        }

        let normalized = Self::normalize_path(&uri);
        if uri.ends_with(['/', '\\']) || normalized == PACKAGE_URI {
            return Err(OpcError::InvalidPackUri(format!(
                "partname '{}' has no filename",
                uri
            )));
        }
        Ok(PackURI { uri: normalized })
    }

    /// Create a PackURI from a ZIP entry path or a loosely written partname.
    ///
    /// The path is normalized the same way as in [`PackURI::new`] and always gets a
    /// single leading slash, so `word\\document.xml`, `word//document.xml` and
    /// `/word/document.xml` all name the same part.
    pub fn from_member_name(member: &str) -> Result<Self> {
        let uri = Self::normalize_path(member);
        if uri == PACKAGE_URI {
            return Err(OpcError::InvalidPackUri(format!(
                "member name '{}' has no path segments",
                member
            )));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a relative reference and a base URI.
    ///
    /// This translates a relative reference (like "../styles.xml") onto a base URI
    /// (like "/word") to produce an absolute PackURI (like "/styles.xml"). A reference
    /// that is already absolute ignores the base.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(Self::normalize_path(&joined))
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/word" for "/word/document.xml".
    /// For the package pseudo-partname "/", returns "/".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    ///
    /// For example, "document.xml" for "/word/document.xml".
    /// For the package pseudo-partname "/", returns an empty string.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Get the extension portion of this PackURI, without the leading period.
    ///
    /// The case is preserved; content type lookups lower-case it themselves.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[pos + 1..],
            None => "",
        }
    }

    /// Get the partname index for tuple partnames, or None for singleton partnames.
    ///
    /// For example, returns 2 for "/word/header2.xml" and None for "/word/document.xml".
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let stem = match filename.rfind('.') {
            Some(pos) => &filename[..pos],
            None => filename,
        };
        let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 || digits == stem.len() {
            return None;
        }
        atoi_simd::parse::<u32, false, false>(&stem.as_bytes()[stem.len() - digits..]).ok()
    }

    /// Get the membername (URI with leading slash stripped).
    ///
    /// This is the form used as the Zip file membername for the package item.
    /// Returns an empty string for the package pseudo-partname "/".
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Get the relative reference from a base URI to this PackURI.
    ///
    /// For example, PackURI("/word/media/image1.png") would return
    /// "media/image1.png" for base_uri "/word" and "../word/media/image1.png"
    /// for base_uri "/customXml".
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from_parts: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to_parts: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();

        // Never consume the filename itself as a shared directory
        let common = from_parts
            .iter()
            .zip(to_parts.iter().take(to_parts.len().saturating_sub(1)))
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<&str> = vec![".."; from_parts.len() - common];
        segments.extend(&to_parts[common..]);
        segments.join("/")
    }

    /// Get the PackURI of the .rels part corresponding to this PackURI.
    ///
    /// For example, "/word/_rels/document.xml.rels" for "/word/document.xml" and
    /// "/_rels/.rels" for the package itself.
    pub fn rels_uri(&self) -> PackURI {
        let base_uri = self.base_uri();
        let uri = if base_uri == "/" {
            format!("/{}{}{}", RELS_DIR, self.filename(), RELS_EXT)
        } else {
            format!("{}/{}{}{}", base_uri, RELS_DIR, self.filename(), RELS_EXT)
        };
        PackURI { uri }
    }

    /// Get the source PackURI that a relationships member describes.
    ///
    /// Inverse of [`PackURI::rels_uri`]: "word/_rels/document.xml.rels" yields
    /// "/word/document.xml", "_rels/.rels" yields the package URI "/". Returns `None`
    /// for members that are not relationship parts.
    pub fn source_of_rels(member: &str) -> Option<PackURI> {
        if !is_rels_member(member) {
            return None;
        }
        let trimmed = member.trim_start_matches('/');
        let without_ext = &trimmed[..trimmed.len() - RELS_EXT.len()];
        let split = without_ext.rfind(RELS_DIR)?;
        let dir = without_ext[..split].trim_end_matches('/');
        let file = &without_ext[split + RELS_DIR.len()..];

        let uri = match (dir.is_empty(), file.is_empty()) {
            (true, true) => PACKAGE_URI.to_string(),
            (true, false) => format!("/{}", file),
            (false, _) => format!("/{}/{}", dir, file),
        };
        Some(PackURI { uri })
    }

    /// Check if this is the package pseudo-partname.
    #[inline]
    pub fn is_package(&self) -> bool {
        self.uri == PACKAGE_URI
    }

    /// Get the full URI string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Normalize a path (resolve ".." and ".", collapse repeated separators)
    fn normalize_path(path: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();

        for part in path.split(['/', '\\']) {
            match part {
                "" | "." => {},
                ".." => {
                    parts.pop();
                },
                _ => parts.push(part),
            }
        }

        format!("/{}", parts.join("/"))
    }
}

/// Check whether a ZIP member name is a relationships part.
///
/// A relationships part has a `_rels/` directory segment anywhere in its path and a
/// `.rels` suffix, e.g. `_rels/.rels` or `word/_rels/document.xml.rels`.
pub fn is_rels_member(member: &str) -> bool {
    let member = member.trim_start_matches('/');
    member.ends_with(RELS_EXT)
        && (member.starts_with(RELS_DIR) || member.contains(&format!("/{}", RELS_DIR)))
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}
