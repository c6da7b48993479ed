//! Comparable XML values

use std::fmt;
use std::sync::Arc;

use xml_diff_engine::{Document, InputSource, Result};

type Supplier = dyn Fn() -> Result<InputSource> + Send + Sync;

/// A repeatable source of XML plus the text used to describe it.
///
/// Every call to [`get`](XmlValue::get) produces a fresh, independent
/// input, so one value can be compared on both sides of a diff or reused
/// across many matches.
#[derive(Clone)]
pub struct XmlValue {
    supplier: Arc<Supplier>,
    source_description: Option<String>,
    value_text: String,
}

impl XmlValue {
    pub fn new<F>(source_description: Option<String>, value_text: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> Result<InputSource> + Send + Sync + 'static,
    {
        Self {
            supplier: Arc::new(supplier),
            source_description,
            value_text: value_text.into(),
        }
    }

    /// A value backed by XML text
    pub fn from_text(
        xml: impl Into<String>,
        source_description: impl Into<String>,
        value_text: impl Into<String>,
    ) -> Self {
        let xml: Arc<str> = Arc::from(xml.into());
        Self::new(Some(source_description.into()), value_text, move || {
            Ok(InputSource::Text(xml.to_string()))
        })
    }

    /// A value backed by raw bytes
    pub fn from_bytes(
        bytes: impl Into<Vec<u8>>,
        source_description: impl Into<String>,
        value_text: impl Into<String>,
    ) -> Self {
        let bytes: Arc<[u8]> = Arc::from(bytes.into());
        Self::new(Some(source_description.into()), value_text, move || {
            Ok(InputSource::Bytes(bytes.to_vec()))
        })
    }

    /// A value backed by an already built tree; each input is a fresh copy
    pub fn from_document(
        source_description: impl Into<String>,
        value_text: impl Into<String>,
        document: Document,
    ) -> Self {
        let document = Arc::new(document);
        Self::new(Some(source_description.into()), value_text, move || {
            Ok(InputSource::Document(Document::clone(&document)))
        })
    }

    /// Produce a new engine input
    pub fn get(&self) -> Result<InputSource> {
        (self.supplier)()
    }

    pub fn source_description(&self) -> Option<&str> {
        self.source_description.as_deref()
    }

    pub fn value_text(&self) -> &str {
        &self.value_text
    }
}

impl fmt::Display for XmlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_description {
            Some(description) => write!(f, "{}:\n{}", description, self.value_text),
            None => f.write_str(&self.value_text),
        }
    }
}

impl fmt::Debug for XmlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlValue")
            .field("source_description", &self.source_description)
            .field("value_text", &self.value_text)
            .finish_non_exhaustive()
    }
}

impl From<&str> for XmlValue {
    fn from(text: &str) -> Self {
        crate::sources::xml_text(text)
    }
}

impl From<String> for XmlValue {
    fn from(text: String) -> Self {
        crate::sources::xml_text(text)
    }
}
