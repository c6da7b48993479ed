//! Comparison of a control document against a test document

use std::cell::OnceCell;
use std::fmt;

use xml_diff_traits::difference::{Difference, DifferenceListener, RejectAll, Verdict};
use xml_diff_traits::error::Result;

use crate::config;
use crate::tree::Document;
use crate::walker;

/// Something the engine can turn into a [`Document`]
#[derive(Debug, Clone)]
pub enum InputSource {
    Text(String),
    Bytes(Vec<u8>),
    Document(Document),
}

impl InputSource {
    /// Parse (or unwrap) the source into a document
    pub fn into_document(self) -> Result<Document> {
        match self {
            InputSource::Text(text) => Document::parse(&text),
            InputSource::Bytes(bytes) => Document::parse_bytes(&bytes),
            InputSource::Document(doc) => Ok(doc),
        }
    }
}

impl From<&str> for InputSource {
    fn from(text: &str) -> Self {
        InputSource::Text(text.to_string())
    }
}

impl From<String> for InputSource {
    fn from(text: String) -> Self {
        InputSource::Text(text)
    }
}

impl From<Vec<u8>> for InputSource {
    fn from(bytes: Vec<u8>) -> Self {
        InputSource::Bytes(bytes)
    }
}

impl From<Document> for InputSource {
    fn from(doc: Document) -> Self {
        InputSource::Document(doc)
    }
}

#[derive(Debug)]
struct Outcome {
    differences: Vec<(Difference, Verdict)>,
    identical: bool,
    similar: bool,
}

/// The differences between two documents, judged by a listener.
///
/// The comparison runs the first time a result is asked for, using the
/// global flags in effect at that moment, and is cached afterwards.
pub struct Diff {
    control: Document,
    test: Document,
    listener: Box<dyn DifferenceListener>,
    outcome: OnceCell<Outcome>,
}

impl Diff {
    /// Parse both sources and prepare a comparison
    pub fn new(control: impl Into<InputSource>, test: impl Into<InputSource>) -> Result<Self> {
        let control = control.into().into_document()?;
        let test = test.into().into_document()?;
        Ok(Self::from_documents(control, test))
    }

    pub fn from_documents(control: Document, test: Document) -> Self {
        Self {
            control,
            test,
            listener: Box::new(RejectAll),
            outcome: OnceCell::new(),
        }
    }

    /// Install a listener whose verdicts replace the default rejection
    pub fn override_listener(mut self, listener: impl DifferenceListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self.outcome = OnceCell::new();
        self
    }

    pub fn control(&self) -> &Document {
        &self.control
    }

    pub fn test(&self) -> &Document {
        &self.test
    }

    /// True when no difference survived the listener at all
    pub fn identical(&self) -> Result<bool> {
        Ok(self.outcome()?.identical)
    }

    /// True when every surviving difference was judged similar
    pub fn similar(&self) -> Result<bool> {
        Ok(self.outcome()?.similar)
    }

    /// Every difference found, with the verdict it was given
    pub fn differences(&self) -> Result<&[(Difference, Verdict)]> {
        Ok(&self.outcome()?.differences)
    }

    /// One line per difference that was not judged equivalent
    pub fn message(&self) -> Result<String> {
        let mut out = String::new();
        self.append_message(&mut out)?;
        Ok(out)
    }

    pub fn append_message(&self, out: &mut String) -> Result<()> {
        for (difference, verdict) in &self.outcome()?.differences {
            let tag = match verdict {
                Verdict::Equivalent => continue,
                Verdict::SimilarOnly => "[not identical]",
                Verdict::Reject => "[different]",
            };
            out.push_str(tag);
            out.push(' ');
            out.push_str(&difference.to_string());
            out.push('\n');
        }
        Ok(())
    }

    fn outcome(&self) -> Result<&Outcome> {
        if let Some(outcome) = self.outcome.get() {
            return Ok(outcome);
        }
        let outcome = self.evaluate()?;
        Ok(self.outcome.get_or_init(|| outcome))
    }

    fn evaluate(&self) -> Result<Outcome> {
        let flags = config::current()?;
        let found = walker::compare_trees(&self.control, &self.test, &flags)?;

        let mut identical = true;
        let mut similar = true;
        let mut differences = Vec::with_capacity(found.len());
        for difference in found {
            let verdict = self.listener.difference_found(&difference);
            identical &= !verdict.breaks_identity();
            similar &= !verdict.breaks_similarity();
            differences.push((difference, verdict));
        }

        tracing::debug!(
            ?flags,
            differences = differences.len(),
            identical,
            similar,
            "compared documents"
        );
        Ok(Outcome {
            differences,
            identical,
            similar,
        })
    }
}

impl fmt::Debug for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diff")
            .field("control", &self.control)
            .field("test", &self.test)
            .field("evaluated", &self.outcome.get().is_some())
            .finish_non_exhaustive()
    }
}
