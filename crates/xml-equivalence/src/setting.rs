//! Comparison settings
//!
//! A [`Settings`] value is an immutable set of [`Setting`] toggles, each of
//! which makes a comparison more lax in one respect.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One independently toggleable laxity option
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Setting {
    /// Succeed when documents are similar, not only when identical
    OnlyCompareSimilarity,
    IgnoreAttributeOrder,
    IgnoreComments,
    /// Treat CDATA sections and plain text alike
    IgnoreCdataTextDistinction,
    IgnoreLeadingTrailingWhitespace,
    /// Accept the same namespace URI bound to different prefixes
    TolerateDifferentNamespacePrefixes,
    /// Merge adjacent text before comparing
    NormalizeDocument,
    /// Collapse runs of whitespace in text and attribute values
    NormalizeWhitespace,
}

/// An immutable set of enabled settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeSet<Setting>);

impl Settings {
    /// The lax, content-only comparison: everything except
    /// [`Setting::OnlyCompareSimilarity`]
    pub fn defaults() -> Self {
        Setting::iter()
            .filter(|s| *s != Setting::OnlyCompareSimilarity)
            .collect()
    }

    pub fn empty() -> Self {
        Settings(BTreeSet::new())
    }

    pub fn all() -> Self {
        Setting::iter().collect()
    }

    pub fn contains(&self, setting: Setting) -> bool {
        self.0.contains(&setting)
    }

    /// A new set with `settings` added
    pub fn with(&self, settings: &[Setting]) -> Self {
        let mut next = self.0.clone();
        next.extend(settings.iter().copied());
        Settings(next)
    }

    /// A new set with `settings` removed
    pub fn without(&self, settings: &[Setting]) -> Self {
        let mut next = self.0.clone();
        for setting in settings {
            next.remove(setting);
        }
        Settings(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = Setting> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl FromIterator<Setting> for Settings {
    fn from_iter<I: IntoIterator<Item = Setting>>(iter: I) -> Self {
        Settings(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Settings {
    type Item = &'a Setting;
    type IntoIter = std::collections::btree_set::Iter<'a, Setting>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn defaults_exclude_only_similarity() {
        let defaults = Settings::defaults();
        assert_eq!(defaults.len(), 7);
        assert!(!defaults.contains(Setting::OnlyCompareSimilarity));
        assert_eq!(defaults.with(&[Setting::OnlyCompareSimilarity]), Settings::all());
    }

    #[test]
    fn with_and_without_leave_the_original_untouched() {
        let base = Settings::empty();
        let more = base.with(&[Setting::IgnoreComments]);
        assert!(base.is_empty());
        assert!(more.contains(Setting::IgnoreComments));
        assert_eq!(more.without(&[Setting::IgnoreComments]), base);
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(Setting::IgnoreComments.to_string(), "IGNORE_COMMENTS");
        assert_eq!(
            Setting::from_str("ignore_cdata_text_distinction").unwrap(),
            Setting::IgnoreCdataTextDistinction
        );
        assert!(Setting::from_str("IGNORE_EVERYTHING").is_err());
    }

    #[test]
    fn serializes_as_a_list_of_names() {
        let settings = Settings::from_iter([Setting::NormalizeWhitespace, Setting::IgnoreComments]);
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"["IGNORE_COMMENTS","NORMALIZE_WHITESPACE"]"#);
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
