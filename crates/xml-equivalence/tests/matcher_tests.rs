//! Matcher orchestration: custom strategies, full mismatch reports, and
//! the relationships between settings.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use xml_diff_engine::{DifferenceKind, DifferenceListener, MutableXmlTree, XmlTree};
use xml_equivalence::classifier::SettingsListener;
use xml_equivalence::{
    equivalent_to, xml_bytes, xml_text, Diff, DiffStrategy, Document, Error, MatchOutcome, Result, Setting,
    Settings, Verdict, XmlEquivalenceMatcher, XmlValue,
};

fn element_with_attributes(pairs: &[(&str, &str)]) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let test = doc.create_element("test", None).unwrap();
    doc.append_child(root, test).unwrap();
    for (name, value) in pairs {
        doc.set_attribute(test, name, value, None).unwrap();
    }
    doc
}

fn unnormalized(parts: &[&str]) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let test = doc.create_element("test", None).unwrap();
    doc.append_child(root, test).unwrap();
    for part in parts {
        let text = doc.create_text(part).unwrap();
        doc.append_child(test, text).unwrap();
    }
    doc
}

/// Compares two fixed trees regardless of the values handed in
struct Prebuilt {
    control: Document,
    test: Document,
}

impl DiffStrategy for Prebuilt {
    fn initialize(&self, control: &XmlValue, test: &XmlValue) -> Result<Diff> {
        assert_eq!(control.value_text(), "[manually constructed value 1]");
        assert_eq!(test.value_text(), "[manually constructed value 2]");
        Ok(Diff::from_documents(self.control.clone(), self.test.clone()))
    }
}

fn unsupported(text: &str) -> XmlValue {
    XmlValue::new(Some("DOM document".into()), text, || {
        Err(Error::Other("no input available".into()))
    })
}

fn prebuilt_matcher(settings: Settings, control: Document, test: Document) -> (XmlEquivalenceMatcher, XmlValue) {
    let matcher = XmlEquivalenceMatcher::new(unsupported("[manually constructed value 1]"), settings)
        .with_strategy(Prebuilt { control, test });
    (matcher, unsupported("[manually constructed value 2]"))
}

#[test]
fn test_identical_when_attribute_order_is_ignored() {
    let (matcher, actual) = prebuilt_matcher(
        Settings::empty().with(&[Setting::IgnoreAttributeOrder]),
        element_with_attributes(&[("attrA", "value A"), ("attrB", "value B")]),
        element_with_attributes(&[("attrB", "value B"), ("attrA", "value A")]),
    );
    assert_eq!(matcher.matches(&actual).unwrap(), MatchOutcome::Matched);
}

#[test]
fn test_not_identical_when_attribute_order_is_enforced() {
    let (matcher, actual) = prebuilt_matcher(
        Settings::empty(),
        element_with_attributes(&[("attrA", "value A"), ("attrB", "value B")]),
        element_with_attributes(&[("attrB", "value B"), ("attrA", "value A")]),
    );
    let MatchOutcome::Mismatched(message) = matcher.matches(&actual).unwrap() else {
        panic!("attribute order should be enforced");
    };
    assert!(message.starts_with("[not identical] Expected sequence of attributes"));
    assert!(message.ends_with("DOM document:\n[manually constructed value 2]"));
}

#[test]
fn test_normalized_document() {
    for (settings, should_match) in [
        (Settings::empty().with(&[Setting::NormalizeDocument]), true),
        (Settings::empty(), false),
    ] {
        let (matcher, actual) = prebuilt_matcher(
            settings,
            unnormalized(&["a", "bcd", "ef"]),
            unnormalized(&["abc", "de", "f"]),
        );
        assert_eq!(matcher.matches(&actual).unwrap().is_match(), should_match);
    }
}

#[test]
fn test_value_errors_propagate() {
    let matcher = equivalent_to("<test/>");
    let err = matcher.matches(&unsupported("nothing")).unwrap_err();
    assert!(matches!(err, Error::Other(_)));
}

/// Records every difference kind routed through the classifier
#[derive(Clone, Default)]
struct Recording {
    seen: Arc<Mutex<Vec<DifferenceKind>>>,
}

struct RecordingListener {
    inner: SettingsListener,
    seen: Arc<Mutex<Vec<DifferenceKind>>>,
}

impl DifferenceListener for RecordingListener {
    fn difference_found(&self, difference: &xml_diff_engine::Difference) -> Verdict {
        self.seen.lock().unwrap().push(difference.kind);
        self.inner.difference_found(difference)
    }
}

impl DiffStrategy for Recording {
    fn configure(&self, diff: Diff, settings: &Settings) -> Result<Diff> {
        Ok(diff.override_listener(RecordingListener {
            inner: SettingsListener::new(settings.clone()),
            seen: Arc::clone(&self.seen),
        }))
    }
}

#[test]
fn test_detects_multiple_differences() {
    let first = xml_text(
        "<test type='first'><a testNumber='1'>first</a><b>value:</b><c>ONE</c></test>",
    );
    let second = xml_text("<test><a testNumber='2'>second</a><b>value:</b><c>TWO</c></test>");

    let recording = Recording::default();
    let matcher = XmlEquivalenceMatcher::new(first, Settings::empty()).with_strategy(recording.clone());

    let MatchOutcome::Mismatched(message) = matcher.matches(&second).unwrap() else {
        panic!("documents differ");
    };

    let seen = recording.seen.lock().unwrap().clone();
    for kind in [
        DifferenceKind::AttrNameNotFound,
        DifferenceKind::AttrValue,
        DifferenceKind::TextValue,
    ] {
        assert!(seen.contains(&kind), "{:?} was not reported", kind);
    }

    assert!(message.contains("Expected attribute name 'type' but was 'null'"));
    assert!(message.contains("Expected attribute value '1' but was '2'"));
    assert!(message.contains("Expected text value 'first' but was 'second'"));
    assert!(message.contains("Expected text value 'ONE' but was 'TWO'"));
}

#[test]
fn test_built_trees_can_be_reused() {
    let tree = Document::parse("<a><b>1</b></a>").unwrap();
    let value = XmlValue::from_document("DOM document", "<a><b>1</b></a>", tree);
    let matcher = equivalent_to(value.clone());
    assert!(matcher.matches(&value).unwrap().is_match());
    assert!(matcher.matches(&value).unwrap().is_match());
}

fn nested(depth: usize, leaf: &str) -> String {
    let mut xml = "<n>".repeat(depth);
    xml.push_str(leaf);
    xml.push_str(&"</n>".repeat(depth));
    xml
}

#[test]
fn test_deeply_nested_documents() {
    let matcher = equivalent_to(nested(10_000, "a"));
    assert!(matcher.matches(&xml_text(nested(10_000, "a"))).unwrap().is_match());

    let outcome = matcher.matches(&xml_text(nested(10_000, "b"))).unwrap();
    let MatchOutcome::Mismatched(message) = outcome else {
        panic!("expected a mismatch");
    };
    assert!(message.starts_with("[different] Expected text value 'a' but was 'b'"));

    // bytes are pretty-printed for display
    let bytes = xml_bytes(nested(2_000, "a").into_bytes()).unwrap();
    assert!(equivalent_to(nested(2_000, "a")).matches(&bytes).unwrap().is_match());
}

const DOCUMENTS: &[&str] = &[
    "<test attrA='value A' attrB='value B'/>",
    "<test attrB='value B' attrA='value A'/>",
    "<test><!-- first -->xyz</test>",
    "<test><!-- second -->xyz</test>",
    "<test>abc def</test>",
    "<test>   abc    def   </test>",
    "<test><![CDATA[abc]]> def</test>",
    r#"<test xmlns:abc="http://example.com/ns"><abc:elem>123</abc:elem></test>"#,
    r#"<test xmlns:def="http://example.com/ns"><def:elem>123</def:elem></test>"#,
    "<test><other/></test>",
];

fn any_settings() -> impl Strategy<Value = Settings> {
    use strum::IntoEnumIterator;
    proptest::sample::subsequence(Setting::iter().collect::<Vec<_>>(), 0..=8)
        .prop_map(Settings::from_iter)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn identity_implies_similarity(
        settings in any_settings(),
        expected in proptest::sample::select(DOCUMENTS),
        actual in proptest::sample::select(DOCUMENTS),
    ) {
        let identity = XmlEquivalenceMatcher::new(xml_text(expected), settings.without(&[Setting::OnlyCompareSimilarity]));
        let similarity = identity.enabling(&[Setting::OnlyCompareSimilarity]);
        let actual = xml_text(actual);
        if identity.matches(&actual).unwrap().is_match() {
            prop_assert!(similarity.matches(&actual).unwrap().is_match());
        }
    }

    #[test]
    fn enabling_then_disabling_round_trips(
        settings in any_settings(),
        toggle in proptest::sample::select(vec![
            Setting::IgnoreAttributeOrder,
            Setting::IgnoreComments,
            Setting::IgnoreCdataTextDistinction,
            Setting::IgnoreLeadingTrailingWhitespace,
            Setting::TolerateDifferentNamespacePrefixes,
            Setting::NormalizeDocument,
            Setting::NormalizeWhitespace,
        ]),
        expected in proptest::sample::select(DOCUMENTS),
        actual in proptest::sample::select(DOCUMENTS),
    ) {
        let base = XmlEquivalenceMatcher::new(xml_text(expected), settings.without(&[toggle]));
        let round_trip = base.enabling(&[toggle]).disabling(&[toggle]);
        prop_assert_eq!(round_trip.settings(), base.settings());

        let actual = xml_text(actual);
        prop_assert_eq!(
            base.matches(&actual).unwrap(),
            round_trip.matches(&actual).unwrap()
        );
    }
}
