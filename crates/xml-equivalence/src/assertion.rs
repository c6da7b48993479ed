//! Assertion-facing matcher surface

use serde::Serialize;
use xml_diff_engine::Result;

use crate::matcher::XmlEquivalenceMatcher;
use crate::sources::{xml_serialized, xml_serialized_with_root, xml_text};
use crate::value::XmlValue;

/// Result of matching one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    /// The value did not match; the text explains why
    Mismatched(String),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched)
    }
}

/// Something that can decide whether a `T` is acceptable
pub trait Matcher<T: ?Sized> {
    fn matches(&self, actual: &T) -> Result<MatchOutcome>;

    /// What an acceptable value looks like
    fn describe(&self) -> String;
}

impl Matcher<XmlValue> for XmlEquivalenceMatcher {
    fn matches(&self, actual: &XmlValue) -> Result<MatchOutcome> {
        XmlEquivalenceMatcher::matches(self, actual)
    }

    fn describe(&self) -> String {
        XmlEquivalenceMatcher::describe(self)
    }
}

impl Matcher<str> for XmlEquivalenceMatcher {
    fn matches(&self, actual: &str) -> Result<MatchOutcome> {
        XmlEquivalenceMatcher::matches(self, &xml_text(actual))
    }

    fn describe(&self) -> String {
        XmlEquivalenceMatcher::describe(self)
    }
}

/// Inverts another matcher
#[derive(Debug, Clone)]
pub struct Not<M>(M);

pub fn not<M>(matcher: M) -> Not<M> {
    Not(matcher)
}

impl<T: ?Sized, M: Matcher<T>> Matcher<T> for Not<M> {
    fn matches(&self, actual: &T) -> Result<MatchOutcome> {
        Ok(match self.0.matches(actual)? {
            MatchOutcome::Matched => MatchOutcome::Mismatched(format!("was {}", self.0.describe())),
            MatchOutcome::Mismatched(_) => MatchOutcome::Matched,
        })
    }

    fn describe(&self) -> String {
        format!("not {}", self.0.describe())
    }
}

/// Matches strings as XML text
#[derive(Debug, Clone)]
pub struct XmlTextMatcher(XmlEquivalenceMatcher);

pub fn is_xml_text(matcher: XmlEquivalenceMatcher) -> XmlTextMatcher {
    XmlTextMatcher(matcher)
}

impl<S: AsRef<str> + ?Sized> Matcher<S> for XmlTextMatcher {
    fn matches(&self, actual: &S) -> Result<MatchOutcome> {
        self.0.matches(&xml_text(actual.as_ref()))
    }

    fn describe(&self) -> String {
        self.0.describe()
    }
}

/// Matches any serde-serializable value by its XML form
#[derive(Debug, Clone)]
pub struct SerializedMatcher {
    matcher: XmlEquivalenceMatcher,
    root: Option<String>,
}

/// Serialize values with their type name as the root element
pub fn is_serialized(matcher: XmlEquivalenceMatcher) -> SerializedMatcher {
    SerializedMatcher {
        matcher,
        root: None,
    }
}

/// Serialize values under the `root` element
pub fn is_serialized_as(root: impl Into<String>, matcher: XmlEquivalenceMatcher) -> SerializedMatcher {
    SerializedMatcher {
        matcher,
        root: Some(root.into()),
    }
}

impl<T: Serialize + ?Sized> Matcher<T> for SerializedMatcher {
    fn matches(&self, actual: &T) -> Result<MatchOutcome> {
        let value = match &self.root {
            Some(root) => xml_serialized_with_root(root, actual)?,
            None => xml_serialized(actual)?,
        };
        self.matcher.matches(&value)
    }

    fn describe(&self) -> String {
        self.matcher.describe()
    }
}

/// Panic unless `actual` satisfies `matcher`.
///
/// # Panics
///
/// On a mismatch, with the expectation and the mismatch explanation, and
/// when the comparison itself fails.
#[track_caller]
pub fn assert_that<T: ?Sized, M: Matcher<T>>(actual: &T, matcher: &M) {
    match matcher.matches(actual) {
        Ok(MatchOutcome::Matched) => {}
        Ok(MatchOutcome::Mismatched(why)) => {
            panic!("\nExpected: {}\n     but: {}", matcher.describe(), why)
        }
        Err(e) => panic!("unable to evaluate {}: {}", matcher.describe(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::equivalent_to;

    #[test]
    fn not_inverts() {
        let matcher = not(equivalent_to("<a>1</a>"));
        assert!(matcher.matches("<a>2</a>").unwrap().is_match());
        assert!(!matcher.matches("<a>1</a>").unwrap().is_match());
        let description = Matcher::<str>::describe(&matcher);
        assert!(description.starts_with("not XML content identical"));
    }

    #[test]
    fn xml_text_accepts_any_string_type() {
        let matcher = is_xml_text(equivalent_to("<a/>"));
        assert!(matcher.matches("<a/>").unwrap().is_match());
        assert!(matcher.matches(&String::from("<a></a>")).unwrap().is_match());
    }

    #[test]
    #[should_panic(expected = "Expected: XML content identical to")]
    fn assert_that_panics_on_mismatch() {
        assert_that("<a>2</a>", &equivalent_to("<a>1</a>"));
    }
}
