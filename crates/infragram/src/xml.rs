//! XML text helpers shared by both backends.
//!
//! [`escape`] is the one routine that turns user text into markup: the SVG
//! scene hands its escaped labels to the `svg` crate as raw blobs, and the
//! draw.io document writes escaped attribute values through [`XmlWriter`].
//! The only markup inserted after escaping is the `&#xa;` line-break
//! reference that [`attribute_value`] substitutes for newlines, where a
//! literal newline would otherwise be normalised to a space by XML readers.

use std::borrow::Cow;

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event, attributes::Attribute},
    name::QName,
};
use thiserror::Error;

const LINE_BREAK: &str = "&#xa;";

/// Text that cannot be written as XML 1.0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    #[error("character {character:?} is not allowed in XML 1.0 (in `{context}`)")]
    InvalidCharacter { character: char, context: String },

    #[error("`{0}` is not a valid XML name")]
    InvalidName(String),

    #[error("failed to write XML: {0}")]
    Write(String),
}

/// Escapes `&`, `<`, `>`, `'` and `"` for use in text or an attribute.
///
/// # Errors
///
/// Returns [`SerializationError::InvalidCharacter`] for characters outside the
/// XML 1.0 `Char` production, such as most C0 control characters.
///
/// ```
/// # use infragram::xml::escape;
/// assert_eq!(escape("a < b & \"c\"").unwrap(), "a &lt; b &amp; &quot;c&quot;");
/// assert!(escape("bell\u{7}").is_err());
/// ```
pub fn escape(text: &str) -> Result<Cow<'_, str>, SerializationError> {
    if let Some(character) = text.chars().find(|c| !is_xml_char(*c)) {
        return Err(SerializationError::InvalidCharacter {
            character,
            context: text.chars().filter(|c| is_xml_char(*c)).collect(),
        });
    }
    Ok(quick_xml::escape::escape(text))
}

/// Escapes an attribute value, writing each newline as `&#xa;`.
///
/// # Errors
///
/// See [`escape`].
pub fn attribute_value(value: &str) -> Result<String, SerializationError> {
    let normalized = value.replace("\r\n", "\n").replace('\r', "\n");
    let mut escaped = String::with_capacity(normalized.len());
    for (i, line) in normalized.split('\n').enumerate() {
        if i > 0 {
            escaped.push_str(LINE_BREAK);
        }
        escaped.push_str(&escape(line)?);
    }
    Ok(escaped)
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Returns `true` if `name` can be used as an element or attribute name.
///
/// Only the ASCII subset of the XML `Name` production is accepted.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Formats a coordinate for output: at most two decimals, no trailing zeros
/// and never `-0`. Non-finite values are written as `0`.
pub fn number(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let scaled = (value * 100.0).round() / 100.0;
    // Scaling overflows near f32::MAX; such values have no fraction to round.
    let rounded = if scaled.is_finite() { scaled } else { value };
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn check_name(name: &str) -> Result<(), SerializationError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(SerializationError::InvalidName(name.to_string()))
    }
}

/// Streams an indented XML document through `quick_xml::Writer`.
///
/// Attribute values are escaped with [`attribute_value`] and handed to the
/// writer pre-escaped, so the `&#xa;` references survive unchanged.
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Starts a document with a UTF-8 XML declaration.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::Write`] if the declaration cannot be
    /// written.
    pub fn new() -> Result<Self, SerializationError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|err| SerializationError::Write(err.to_string()))?;
        Ok(Self { writer })
    }

    /// Opens `name`; every call must be matched by [`XmlWriter::end`].
    pub fn start<K, V>(
        &mut self,
        name: &str,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), SerializationError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let start = element(name, attributes)?;
        self.write(Event::Start(start))
    }

    /// Writes a self-closing `name` element.
    pub fn empty<K, V>(
        &mut self,
        name: &str,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), SerializationError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let start = element(name, attributes)?;
        self.write(Event::Empty(start))
    }

    pub fn end(&mut self, name: &str) -> Result<(), SerializationError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// Returns the document text, terminated by a newline.
    pub fn finish(self) -> Result<String, SerializationError> {
        let mut text = String::from_utf8(self.writer.into_inner())
            .map_err(|err| SerializationError::Write(err.to_string()))?;
        text.push('\n');
        Ok(text)
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), SerializationError> {
        self.writer
            .write_event(event)
            .map_err(|err| SerializationError::Write(err.to_string()))
    }
}

fn element<'a, K, V>(
    name: &'a str,
    attributes: impl IntoIterator<Item = (K, V)>,
) -> Result<BytesStart<'a>, SerializationError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    check_name(name)?;
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        let key = key.as_ref();
        check_name(key)?;
        let value = attribute_value(value.as_ref())?;
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(value.into_bytes()),
        });
    }
    Ok(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(name: &str, attributes: &[(&str, &str)]) -> Result<String, SerializationError> {
        let mut writer = XmlWriter::new()?;
        writer.empty(name, attributes.iter().copied())?;
        writer.finish()
    }

    #[test]
    fn test_escape_borrows_clean_text() {
        assert!(matches!(escape("plain label").unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_all_specials() {
        assert_eq!(escape("<&>\"'").unwrap(), "&lt;&amp;&gt;&quot;&apos;");
    }

    #[test]
    fn test_escape_rejects_control_characters() {
        let err = escape("nul\u{0}byte").unwrap_err();
        assert_eq!(
            err,
            SerializationError::InvalidCharacter {
                character: '\u{0}',
                context: "nulbyte".to_string()
            }
        );
        assert!(escape("tab\tok").is_ok());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(120.0), "120");
        assert_eq!(number(12.3456), "12.35");
        assert_eq!(number(-0.001), "0");
        assert_eq!(number(-4.5), "-4.5");
    }

    #[test]
    fn test_number_stays_finite() {
        assert_eq!(number(1e37).parse::<f32>().unwrap(), 1e37);
        assert_eq!(number(f32::MIN).parse::<f32>().unwrap(), f32::MIN);
        assert_eq!(number(f32::INFINITY), "0");
        assert_eq!(number(f32::NAN), "0");
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("mxCell"));
        assert!(is_valid_name("data-team_1"));
        assert!(!is_valid_name("1abc"));
        assert!(!is_valid_name("has space"));
        assert!(is_valid_name("xlink:href"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_writes_nested_document() {
        let mut writer = XmlWriter::new().unwrap();
        writer.start("root", [("name", "r")]).unwrap();
        writer.empty("cell", [("id", "0")]).unwrap();
        writer.start("cell", [("id", "1")]).unwrap();
        writer.empty("geometry", [("x", number(10.0).as_str())]).unwrap();
        writer.end("cell").unwrap();
        writer.end("root").unwrap();
        let xml = writer.finish().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<cell id=\"0\"/>"));
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("name"), Some("r"));
        let cells: Vec<_> = root.children().filter(|n| n.is_element()).collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(
            cells[1].first_element_child().and_then(|g| g.attribute("x")),
            Some("10")
        );
    }

    #[test]
    fn test_attribute_line_breaks() {
        let xml = single("cell", &[("value", "first & <second>\nthird")]).unwrap();
        assert!(xml.contains("value=\"first &amp; &lt;second&gt;&#xa;third\""));
    }

    #[test]
    fn test_attribute_round_trips_through_parser() {
        let label = "a<b>&\"c\"\nd 'e'";
        let xml = single("cell", &[("value", label)]).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert_eq!(doc.root_element().attribute("value"), Some(label));
    }

    #[test]
    fn test_invalid_attribute_name_fails() {
        let err = single("object", &[("bad name", "v")]).unwrap_err();
        assert_eq!(err, SerializationError::InvalidName("bad name".to_string()));
    }

    #[test]
    fn test_control_character_in_attribute_fails() {
        let err = single("cell", &[("value", "bell\u{7}")]).unwrap_err();
        assert!(matches!(err, SerializationError::InvalidCharacter { character: '\u{7}', .. }));
    }
}
