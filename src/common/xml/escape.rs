use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Built once on first use; the automaton is immutable and shared across threads
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

/// Escape XML special characters so the result is safe inside both attribute
/// values and character data.
///
/// Used for `[Content_Types].xml` and `.rels` documents, whose attribute values
/// (part names, relationship targets) may contain `&` in query strings of
/// external hyperlinks.
///
/// # Examples
///
/// ```
/// use ooxml_opc::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("https://x.org/?a=1&b='2'"), "https://x.org/?a=1&amp;b=&apos;2&apos;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}
