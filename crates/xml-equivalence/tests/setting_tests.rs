//! Each setting's effect on equivalence, enabled alone versus disabled

use xml_equivalence::{assert_that, not, xml_text, Setting, Settings, XmlEquivalenceMatcher};

struct Case {
    description: &'static str,
    actual: &'static str,
    expected: &'static str,
    setting: Setting,
    matches_when_enabled: bool,
    matches_when_disabled: bool,
}

const CASES: &[Case] = &[
    Case {
        description: "simple elements with different comments",
        actual: "<test><!-- first comment -->xyz</test>",
        expected: "<test><!-- second comment -->xyz</test>",
        setting: Setting::IgnoreComments,
        matches_when_enabled: true,
        matches_when_disabled: false,
    },
    Case {
        description: "elements with different leading and trailing whitespace",
        actual: "<test>abc def</test>",
        expected: "<test>    abc def    </test>",
        setting: Setting::IgnoreLeadingTrailingWhitespace,
        matches_when_enabled: true,
        matches_when_disabled: false,
    },
    Case {
        description: "semantically equivalent elements, one with a CDATA section",
        actual: "<test>abc def</test>",
        expected: "<test><![CDATA[abc]]> def</test>",
        setting: Setting::IgnoreCdataTextDistinction,
        matches_when_enabled: true,
        matches_when_disabled: false,
    },
    Case {
        description: "elements with different leading, trailing, and interior whitespace",
        actual: "<test>abc def</test>",
        expected: "<test>   abc    def   </test>",
        setting: Setting::NormalizeWhitespace,
        matches_when_enabled: true,
        matches_when_disabled: false,
    },
    Case {
        description: "different prefixes, but the same namespace URI",
        actual: r#"<test xmlns:abc="http://example.com/ns"><abc:elem>123</abc:elem></test>"#,
        expected: r#"<test xmlns:def="http://example.com/ns"><def:elem>123</def:elem></test>"#,
        setting: Setting::TolerateDifferentNamespacePrefixes,
        matches_when_enabled: true,
        matches_when_disabled: false,
    },
    Case {
        description: "different prefixes and different namespace URIs",
        actual: r#"<test xmlns:abc="http://example.com/ns/abc"><abc:elem>123</abc:elem></test>"#,
        expected: r#"<test xmlns:def="http://example.com/ns/def"><def:elem>123</def:elem></test>"#,
        setting: Setting::TolerateDifferentNamespacePrefixes,
        matches_when_enabled: false,
        matches_when_disabled: false,
    },
    Case {
        description: "the same prefix, but different namespace URIs",
        actual: r#"<test xmlns:abc="http://example.com/ns/abc1"><abc:elem>123</abc:elem></test>"#,
        expected: r#"<test xmlns:abc="http://example.com/ns/abc2"><abc:elem>123</abc:elem></test>"#,
        setting: Setting::TolerateDifferentNamespacePrefixes,
        matches_when_enabled: false,
        matches_when_disabled: false,
    },
];

fn check(case: &Case, enabled: bool) {
    let settings = if enabled {
        Settings::empty().with(&[case.setting])
    } else {
        Settings::empty()
    };
    let matcher = XmlEquivalenceMatcher::new(xml_text(case.expected), settings);
    let should_match = if enabled {
        case.matches_when_enabled
    } else {
        case.matches_when_disabled
    };

    let actual = xml_text(case.actual);
    let outcome = matcher.matches(&actual).unwrap();
    assert_eq!(
        outcome.is_match(),
        should_match,
        "{}: when {} is {} the content {} be equivalent",
        case.description,
        case.setting,
        if enabled { "enabled" } else { "disabled" },
        if should_match { "should" } else { "should not" },
    );

    if should_match {
        assert_that(&actual, &matcher);
    } else {
        assert_that(&actual, &not(matcher));
    }
}

#[test]
fn test_setting_behavior_enabled() {
    for case in CASES {
        check(case, true);
    }
}

#[test]
fn test_setting_behavior_disabled() {
    for case in CASES {
        check(case, false);
    }
}

#[test]
fn test_attribute_order() {
    let expected = xml_text("<test attrA='value A' attrB='value B'/>");
    let actual = xml_text("<test attrB='value B' attrA='value A'/>");

    let enforcing = XmlEquivalenceMatcher::new(expected.clone(), Settings::empty());
    assert!(!enforcing.matches(&actual).unwrap().is_match());

    let ignoring = enforcing.enabling(&[Setting::IgnoreAttributeOrder]);
    assert!(ignoring.matches(&actual).unwrap().is_match());

    // attribute order only breaks identity
    let similar = enforcing.enabling(&[Setting::OnlyCompareSimilarity]);
    assert!(similar.matches(&actual).unwrap().is_match());
}
