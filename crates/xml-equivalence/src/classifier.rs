//! Judgement of engine differences under a set of settings

use xml_diff_engine::{Difference, DifferenceKind, DifferenceListener, Verdict};

use crate::setting::{Setting, Settings};

/// The verdict for one kind of difference.
///
/// Only attribute order, namespace prefixes and comment values can be
/// softened; every other kind is always a real difference.
pub fn classify(kind: DifferenceKind, settings: &Settings) -> Verdict {
    let toggle = match kind {
        DifferenceKind::AttrSequence => Setting::IgnoreAttributeOrder,
        DifferenceKind::NamespacePrefix => Setting::TolerateDifferentNamespacePrefixes,
        DifferenceKind::CommentValue => Setting::IgnoreComments,
        DifferenceKind::ElementTagName
        | DifferenceKind::ElementNumAttributes
        | DifferenceKind::NamespaceUri
        | DifferenceKind::AttrNameNotFound
        | DifferenceKind::AttrValue
        | DifferenceKind::TextValue
        | DifferenceKind::CdataValue
        | DifferenceKind::ProcessingInstructionTarget
        | DifferenceKind::ProcessingInstructionData
        | DifferenceKind::NodeType
        | DifferenceKind::HasChildNodes
        | DifferenceKind::ChildNodelistLength
        | DifferenceKind::ChildNodelistSequence
        | DifferenceKind::ChildNodeNotFound => return Verdict::Reject,
    };
    if settings.contains(toggle) {
        Verdict::Equivalent
    } else {
        Verdict::SimilarOnly
    }
}

/// Difference listener that applies [`classify`] with fixed settings
#[derive(Debug, Clone)]
pub struct SettingsListener {
    settings: Settings,
}

impl SettingsListener {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl DifferenceListener for SettingsListener {
    fn difference_found(&self, difference: &Difference) -> Verdict {
        classify(difference.kind, &self.settings)
    }
}
