//! Configurable XML equivalence matching for tests
//!
//! Build a matcher from an expected value, adjust how lax it is with
//! [`Setting`]s, and check actual values against it:
//!
//! ```ignore
//! use xml_equivalence::{assert_that, equivalent_to, is_xml_text, Setting};
//!
//! let matcher = equivalent_to("<foo><bar>baz</bar></foo>")
//!     .disabling(&[Setting::IgnoreLeadingTrailingWhitespace]);
//! assert_that("<foo><bar>baz</bar></foo>", &is_xml_text(matcher));
//! ```
//!
//! The underlying diff engine keeps its comparison flags in process-wide
//! state. Every match therefore runs inside an [`EngineContext`], which
//! serializes comparisons across threads and restores the flags afterwards.

pub mod assertion;
pub mod classifier;
pub mod context;
pub mod matcher;
pub mod setting;
pub mod sources;
pub mod value;

pub use assertion::{
    assert_that, is_serialized, is_serialized_as, is_xml_text, not, MatchOutcome, Matcher,
};
pub use classifier::{classify, SettingsListener};
pub use context::EngineContext;
pub use matcher::{equivalent_to, similar_to, DefaultDiffStrategy, DiffStrategy, XmlEquivalenceMatcher};
pub use setting::{Setting, Settings};
pub use sources::{
    pretty_xml, xml_at, xml_bytes, xml_file, xml_serialized, xml_serialized_with_root, xml_text,
};
pub use value::XmlValue;

// Re-export the engine types strategies and values are built from
pub use xml_diff_engine::{Diff, Document, Error, InputSource, Result, Verdict};
