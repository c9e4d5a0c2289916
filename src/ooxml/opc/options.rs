/// Configuration for loading and saving packages.
///
/// # Examples
///
/// ```rust
/// use ooxml_opc::ooxml::opc::{Compression, ContentTypePolicy, PackageOptions};
///
/// // Create with defaults
/// let options = PackageOptions::default();
/// assert_eq!(options.content_type_policy, ContentTypePolicy::Lenient);
///
/// // Or customize
/// let options = PackageOptions::new()
///     .with_content_type_policy(ContentTypePolicy::Strict)
///     .with_compression(Compression::Stored);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOptions {
    /// What to do with a part whose content type cannot be resolved on load
    pub content_type_policy: ContentTypePolicy,
    /// Compression method for every entry written on save
    pub compression: Compression,
    /// Whether relationship type lookups treat Strict and Transitional types as equal
    pub normalize_relationship_types: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            content_type_policy: ContentTypePolicy::Lenient,
            compression: Compression::Deflated,
            normalize_relationship_types: true,
        }
    }
}

impl PackageOptions {
    /// Create a new `PackageOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for parts without a resolvable content type.
    #[inline]
    pub fn with_content_type_policy(mut self, policy: ContentTypePolicy) -> Self {
        self.content_type_policy = policy;
        self
    }

    #[inline]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set whether `*_by_type` lookups match Strict relationship types against
    /// Transitional ones.
    ///
    /// Stored relationship types are never rewritten either way.
    #[inline]
    pub fn with_normalize_relationship_types(mut self, normalize: bool) -> Self {
        self.normalize_relationship_types = normalize;
        self
    }
}

/// Handling of parts matched by neither an Override nor a Default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTypePolicy {
    /// Keep the part with an empty content type and log a warning
    #[default]
    Lenient,
    /// Abort the load with `UnresolvedContentType`
    Strict,
}

/// Compression method for saved entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Stored => zip::CompressionMethod::Stored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PackageOptions::new();
        assert_eq!(options.content_type_policy, ContentTypePolicy::Lenient);
        assert_eq!(options.compression, Compression::Deflated);
        assert!(options.normalize_relationship_types);
    }

    #[test]
    fn test_builder() {
        let options = PackageOptions::new()
            .with_content_type_policy(ContentTypePolicy::Strict)
            .with_compression(Compression::Stored)
            .with_normalize_relationship_types(false);
        assert_eq!(options.content_type_policy, ContentTypePolicy::Strict);
        assert_eq!(options.compression.method(), zip::CompressionMethod::Stored);
        assert!(!options.normalize_relationship_types);
    }
}
