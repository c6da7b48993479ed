//! Constructors for [`XmlValue`]s from the usual places XML comes from

use std::path::Path;

use iri_string::types::UriStr;
use serde::Serialize;
use xml_diff_engine::{Document, Error, Result};

use crate::value::XmlValue;

/// Re-render XML text with two-space indentation
pub fn pretty_xml(xml: &str) -> Result<String> {
    Document::parse(xml)?.to_pretty_string()
}

fn pretty_bytes(bytes: &[u8]) -> Result<String> {
    Document::parse_bytes(bytes)?.to_pretty_string()
}

/// XML given as text, displayed as written
pub fn xml_text(xml: impl Into<String>) -> XmlValue {
    let xml = xml.into();
    XmlValue::from_text(xml.clone(), "XML text", xml)
}

/// XML given as raw bytes
pub fn xml_bytes(bytes: impl Into<Vec<u8>>) -> Result<XmlValue> {
    let bytes = bytes.into();
    let text = pretty_bytes(&bytes)?;
    Ok(XmlValue::from_bytes(bytes, "XML bytes", text))
}

/// XML read once, in full, from a file
pub fn xml_file(path: impl AsRef<Path>) -> Result<XmlValue> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::source_read(path.display().to_string(), e))?;
    let text = pretty_bytes(&bytes)?;
    Ok(XmlValue::from_bytes(
        bytes,
        format!("XML document at path \"{}\"", path.display()),
        text,
    ))
}

/// XML behind a `file:`, `http:` or `https:` URI, read once in full.
///
/// Remote schemes need the `http` feature.
pub fn xml_at(uri: &str) -> Result<XmlValue> {
    let parsed = UriStr::new(uri).map_err(|e| {
        Error::locator(format!(
            "Unable to match XML at URI \"{}\" because it is malformed: {}",
            uri, e
        ))
    })?;

    let bytes = match parsed.scheme_str().to_ascii_lowercase().as_str() {
        "file" => {
            let path = parsed.path_str();
            std::fs::read(path).map_err(|e| Error::source_read(uri, e))?
        }
        "http" | "https" => fetch(uri)?,
        other => {
            return Err(Error::locator(format!(
                "Unable to match XML at URI \"{}\": unsupported scheme '{}'",
                uri, other
            )))
        }
    };

    let text = pretty_bytes(&bytes)?;
    Ok(XmlValue::from_bytes(
        bytes,
        format!("XML document at URL \"{}\"", uri),
        text,
    ))
}

#[cfg(feature = "http")]
fn fetch(uri: &str) -> Result<Vec<u8>> {
    let failed = |e: reqwest::Error| Error::Fetch {
        locator: uri.to_string(),
        message: e.to_string(),
    };
    tracing::debug!(uri, "fetching remote XML document");
    let response = reqwest::blocking::get(uri)
        .and_then(|r| r.error_for_status())
        .map_err(failed)?;
    Ok(response.bytes().map_err(failed)?.to_vec())
}

#[cfg(not(feature = "http"))]
fn fetch(uri: &str) -> Result<Vec<u8>> {
    Err(Error::locator(format!(
        "Unable to fetch \"{}\": remote documents require the `http` feature",
        uri
    )))
}

/// XML produced by serializing `value` with serde; the root element is
/// named after the type.
pub fn xml_serialized<T: Serialize + ?Sized>(value: &T) -> Result<XmlValue> {
    let xml = quick_xml::se::to_string(value).map_err(|e| serialization_failed::<T>(e))?;
    serialized_value::<T>(xml)
}

/// XML produced by serializing `value` under an explicit root element
pub fn xml_serialized_with_root<T: Serialize + ?Sized>(root: &str, value: &T) -> Result<XmlValue> {
    let xml = quick_xml::se::to_string_with_root(root, value)
        .map_err(|e| serialization_failed::<T>(e))?;
    serialized_value::<T>(xml)
}

fn serialization_failed<T: ?Sized>(e: impl std::fmt::Display) -> Error {
    Error::serialization(format!(
        "Error occurred while serializing {} value for matching: {}",
        std::any::type_name::<T>(),
        e
    ))
}

fn serialized_value<T: ?Sized>(xml: String) -> Result<XmlValue> {
    let text = pretty_xml(&xml)?;
    Ok(XmlValue::from_text(
        xml,
        format!("serialized value of type {}", std::any::type_name::<T>()),
        text,
    ))
}

/// Load an XML fixture relative to the calling crate's manifest directory.
///
/// ```ignore
/// let expected = xml_resource!("tests/fixtures/foo.xml")?;
/// ```
#[macro_export]
macro_rules! xml_resource {
    ($path:expr) => {
        $crate::sources::xml_file(::std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join($path))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn text_is_displayed_verbatim() {
        let value = xml_text("<foo>bar</foo>");
        assert_eq!(value.to_string(), "XML text:\n<foo>bar</foo>");
    }

    #[test]
    fn bytes_are_pretty_printed() {
        let value = xml_bytes(b"<a><b>x</b></a>".to_vec()).unwrap();
        assert_eq!(value.source_description(), Some("XML bytes"));
        assert!(value.value_text().contains("\n  <b>x</b>"));
    }

    #[test]
    fn malformed_bytes_are_an_error() {
        assert!(xml_bytes(b"<a>".to_vec()).is_err());
    }

    #[test]
    fn reads_files_and_file_uris() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<doc><item/></doc>").unwrap();

        let value = xml_file(file.path()).unwrap();
        assert!(value.source_description().unwrap().starts_with("XML document at path"));

        let uri = format!("file://{}", file.path().display());
        let value = xml_at(&uri).unwrap();
        assert_eq!(
            value.source_description().unwrap(),
            format!("XML document at URL \"{}\"", uri)
        );
        assert!(value.get().unwrap().into_document().is_ok());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = xml_file("/definitely/not/here.xml").unwrap_err();
        assert!(matches!(err, Error::SourceRead { .. }));
    }

    #[test]
    fn rejects_bad_locators() {
        assert!(matches!(xml_at("not a uri"), Err(Error::Locator(_))));
        assert!(matches!(xml_at("ftp://example.com/a.xml"), Err(Error::Locator(_))));
    }

    #[test]
    fn serializes_structs() {
        #[derive(Serialize)]
        struct Foo {
            bar: String,
        }
        let value = xml_serialized(&Foo { bar: "hello".into() }).unwrap();
        assert!(value.source_description().unwrap().ends_with("Foo"));
        let doc = value.get().unwrap().into_document().unwrap();
        assert_eq!(doc.to_xml_string().unwrap(), "<Foo><bar>hello</bar></Foo>");

        let value = xml_serialized_with_root("foo", &Foo { bar: "x".into() }).unwrap();
        assert!(value.value_text().starts_with("<foo>"));
    }
}
