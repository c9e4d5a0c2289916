//! XML text helpers used when package XML is assembled by hand.

mod escape;

pub use escape::escape_xml;
