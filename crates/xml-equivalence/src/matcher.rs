//! The XML equivalence matcher
//!
//! A match runs entirely inside an [`EngineContext`]: both values are
//! turned into engine input, diffed with the classifier installed as the
//! difference listener, and evaluated for identity or similarity before
//! the engine's flags are released again.

use std::fmt;
use std::sync::Arc;

use xml_diff_engine::{Diff, Result};

use crate::assertion::MatchOutcome;
use crate::classifier::SettingsListener;
use crate::context::EngineContext;
use crate::setting::{Setting, Settings};
use crate::value::XmlValue;

/// How the matcher builds the [`Diff`] for a pair of values.
///
/// Override `initialize` to control how engine input is produced (for
/// example from pre-built trees). An overridden `configure` must still
/// install a listener that consults the classifier for every difference.
pub trait DiffStrategy: Send + Sync {
    /// Build the initial diff of expected (`control`) against actual (`test`)
    fn initialize(&self, control: &XmlValue, test: &XmlValue) -> Result<Diff> {
        Diff::new(control.get()?, test.get()?)
    }

    /// Install the classifier for `settings` on the diff
    fn configure(&self, diff: Diff, settings: &Settings) -> Result<Diff> {
        Ok(diff.override_listener(SettingsListener::new(settings.clone())))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDiffStrategy;

impl DiffStrategy for DefaultDiffStrategy {}

/// Matches XML values against an expected value under a fixed [`Settings`]
/// set. Immutable: `enabling` and `disabling` return new matchers.
#[derive(Clone)]
pub struct XmlEquivalenceMatcher {
    expected: XmlValue,
    settings: Settings,
    strategy: Arc<dyn DiffStrategy>,
}

impl XmlEquivalenceMatcher {
    pub fn new(expected: XmlValue, settings: Settings) -> Self {
        Self {
            expected,
            settings,
            strategy: Arc::new(DefaultDiffStrategy),
        }
    }

    /// Matcher with [`Settings::defaults`]
    pub fn default_for(expected: XmlValue) -> Self {
        Self::new(expected, Settings::defaults())
    }

    pub fn with_strategy(mut self, strategy: impl DiffStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    /// A copy of this matcher with `settings` additionally enabled
    pub fn enabling(&self, settings: &[Setting]) -> Self {
        if settings.is_empty() {
            return self.clone();
        }
        Self {
            settings: self.settings.with(settings),
            ..self.clone()
        }
    }

    /// A copy of this matcher with `settings` disabled
    pub fn disabling(&self, settings: &[Setting]) -> Self {
        if settings.is_empty() {
            return self.clone();
        }
        Self {
            settings: self.settings.without(settings),
            ..self.clone()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn expected(&self) -> &XmlValue {
        &self.expected
    }

    pub fn is_similarity_only(&self) -> bool {
        self.settings.contains(Setting::OnlyCompareSimilarity)
    }

    /// Compare `actual` against the expected value.
    ///
    /// A mismatch is not an error; errors come from reading or parsing
    /// either value, or from the engine configuration.
    pub fn matches(&self, actual: &XmlValue) -> Result<MatchOutcome> {
        EngineContext::scoped(&self.settings, || {
            let diff = self.strategy.initialize(&self.expected, actual)?;
            let diff = self.strategy.configure(diff, &self.settings)?;

            let success = if self.is_similarity_only() {
                diff.similar()?
            } else {
                diff.identical()?
            };
            tracing::debug!(success, similarity_only = self.is_similarity_only(), "xml match evaluated");
            if success {
                return Ok(MatchOutcome::Matched);
            }

            let mut message = String::new();
            diff.append_message(&mut message)?;
            message.push_str(&actual.to_string());
            Ok(MatchOutcome::Mismatched(message))
        })
    }

    pub fn describe(&self) -> String {
        let comparison = if self.is_similarity_only() {
            "similar"
        } else {
            "identical"
        };
        format!("XML content {} to {}", comparison, self.expected)
    }
}

impl fmt::Debug for XmlEquivalenceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlEquivalenceMatcher")
            .field("expected", &self.expected)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Identity under the default settings
pub fn equivalent_to(expected: impl Into<XmlValue>) -> XmlEquivalenceMatcher {
    XmlEquivalenceMatcher::default_for(expected.into())
}

/// Similarity under the default settings
pub fn similar_to(expected: impl Into<XmlValue>) -> XmlEquivalenceMatcher {
    equivalent_to(expected).enabling(&[Setting::OnlyCompareSimilarity])
}
