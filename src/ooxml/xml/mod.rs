//! XML compatibility layer for OOXML markup.
//!
//! - [`namespace`]: Strict to Transitional namespace table
//! - [`reader`]: token reader that normalizes namespaces while reading
//! - [`writer`]: writer with fixed, human-chosen prefixes
//! - [`tristate`]: three-state toggle values (`<w:b/>`, `<w:b w:val="0"/>`)

pub mod namespace;
pub mod reader;
pub mod tristate;
pub mod writer;

pub use namespace::{is_strict, normalize, normalize_relationship_type, to_strict};
pub use reader::{NormalizingReader, QName, StartTag, XmlAttribute, XmlEvent};
pub use tristate::TriState;
pub use writer::{PrefixMap, PrefixedWriter, format_w3cdtf, parse_w3cdtf};
