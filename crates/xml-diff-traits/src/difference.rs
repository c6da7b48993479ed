//! Structural differences between two XML trees and the hook that judges them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a structural discrepancy between a control and a test tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifferenceKind {
    /// Elements with different local names
    ElementTagName,
    /// Elements carrying a different number of attributes
    ElementNumAttributes,
    /// Same local name bound to different namespace URIs
    NamespaceUri,
    /// Same namespace URI written with different prefixes
    NamespacePrefix,
    /// An attribute present on one side only
    AttrNameNotFound,
    /// Attributes with different values
    AttrValue,
    /// Attributes declared in a different order
    AttrSequence,
    /// Comments with different content
    CommentValue,
    /// Text nodes with different content
    TextValue,
    /// CDATA sections with different content
    CdataValue,
    /// Processing instructions with different targets
    ProcessingInstructionTarget,
    /// Processing instructions with different data
    ProcessingInstructionData,
    /// Nodes of a different type at the same position
    NodeType,
    /// One node has children, the other has none
    HasChildNodes,
    /// Different number of child nodes
    ChildNodelistLength,
    /// Matching children appear at different positions
    ChildNodelistSequence,
    /// A child with no counterpart on the other side
    ChildNodeNotFound,
}

impl DifferenceKind {
    /// Every difference kind, in id order
    pub const ALL: [DifferenceKind; 17] = [
        DifferenceKind::ElementTagName,
        DifferenceKind::ElementNumAttributes,
        DifferenceKind::NamespaceUri,
        DifferenceKind::NamespacePrefix,
        DifferenceKind::AttrNameNotFound,
        DifferenceKind::AttrValue,
        DifferenceKind::AttrSequence,
        DifferenceKind::CommentValue,
        DifferenceKind::TextValue,
        DifferenceKind::CdataValue,
        DifferenceKind::ProcessingInstructionTarget,
        DifferenceKind::ProcessingInstructionData,
        DifferenceKind::NodeType,
        DifferenceKind::HasChildNodes,
        DifferenceKind::ChildNodelistLength,
        DifferenceKind::ChildNodelistSequence,
        DifferenceKind::ChildNodeNotFound,
    ];

    /// Stable numeric identifier
    pub fn id(self) -> u32 {
        match self {
            DifferenceKind::ElementTagName => 1,
            DifferenceKind::ElementNumAttributes => 2,
            DifferenceKind::NamespaceUri => 3,
            DifferenceKind::NamespacePrefix => 4,
            DifferenceKind::AttrNameNotFound => 5,
            DifferenceKind::AttrValue => 6,
            DifferenceKind::AttrSequence => 7,
            DifferenceKind::CommentValue => 8,
            DifferenceKind::TextValue => 9,
            DifferenceKind::CdataValue => 10,
            DifferenceKind::ProcessingInstructionTarget => 11,
            DifferenceKind::ProcessingInstructionData => 12,
            DifferenceKind::NodeType => 13,
            DifferenceKind::HasChildNodes => 14,
            DifferenceKind::ChildNodelistLength => 15,
            DifferenceKind::ChildNodelistSequence => 16,
            DifferenceKind::ChildNodeNotFound => 17,
        }
    }

    /// Human readable description, as used in difference messages
    pub fn description(self) -> &'static str {
        match self {
            DifferenceKind::ElementTagName => "element tag name",
            DifferenceKind::ElementNumAttributes => "number of element attributes",
            DifferenceKind::NamespaceUri => "namespace URI",
            DifferenceKind::NamespacePrefix => "namespace prefix",
            DifferenceKind::AttrNameNotFound => "attribute name",
            DifferenceKind::AttrValue => "attribute value",
            DifferenceKind::AttrSequence => "sequence of attributes",
            DifferenceKind::CommentValue => "comment value",
            DifferenceKind::TextValue => "text value",
            DifferenceKind::CdataValue => "CDATA section value",
            DifferenceKind::ProcessingInstructionTarget => "processing instruction target",
            DifferenceKind::ProcessingInstructionData => "processing instruction data",
            DifferenceKind::NodeType => "node type",
            DifferenceKind::HasChildNodes => "presence of child nodes to be",
            DifferenceKind::ChildNodelistLength => "number of child nodes",
            DifferenceKind::ChildNodelistSequence => "sequence of child nodes",
            DifferenceKind::ChildNodeNotFound => "presence of child node",
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One side of a difference: what was found, where, and on which node.
///
/// `node` and `xpath` are `None` when the side has no counterpart node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDetail {
    pub value: String,
    pub node: Option<String>,
    pub xpath: Option<String>,
}

impl NodeDetail {
    /// Detail for a node that exists
    pub fn new(value: impl Into<String>, node: impl Into<String>, xpath: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            node: Some(node.into()),
            xpath: Some(xpath.into()),
        }
    }

    /// Detail for a side with no corresponding node
    pub fn absent() -> Self {
        Self {
            value: "null".to_string(),
            node: None,
            xpath: None,
        }
    }
}

/// A single structural discrepancy reported by the diff engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    pub kind: DifferenceKind,
    pub control: NodeDetail,
    pub test: NodeDetail,
}

impl Difference {
    pub fn new(kind: DifferenceKind, control: NodeDetail, test: NodeDetail) -> Self {
        Self {
            kind,
            control,
            test,
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected {} '{}' but was '{}' - comparing {} at {} to {} at {}",
            self.kind.description(),
            self.control.value,
            self.test.value,
            self.control.node.as_deref().unwrap_or("null"),
            self.control.xpath.as_deref().unwrap_or("null"),
            self.test.node.as_deref().unwrap_or("null"),
            self.test.xpath.as_deref().unwrap_or("null"),
        )
    }
}

/// Judgement passed on a single difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Treat the compared nodes as identical
    Equivalent,
    /// The nodes are not identical, but still similar
    SimilarOnly,
    /// A real difference
    Reject,
}

impl Verdict {
    /// Whether a difference with this verdict breaks identity
    pub fn breaks_identity(self) -> bool {
        !matches!(self, Verdict::Equivalent)
    }

    /// Whether a difference with this verdict breaks similarity
    pub fn breaks_similarity(self) -> bool {
        matches!(self, Verdict::Reject)
    }
}

/// Interception hook consulted for every difference the engine finds.
pub trait DifferenceListener {
    /// Decide how a difference counts towards the comparison outcome
    fn difference_found(&self, difference: &Difference) -> Verdict;
}

/// Listener that treats every difference as a real one
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl DifferenceListener for RejectAll {
    fn difference_found(&self, _difference: &Difference) -> Verdict {
        Verdict::Reject
    }
}

impl<L: DifferenceListener + ?Sized> DifferenceListener for Box<L> {
    fn difference_found(&self, difference: &Difference) -> Verdict {
        (**self).difference_found(difference)
    }
}

impl<L: DifferenceListener + ?Sized> DifferenceListener for std::sync::Arc<L> {
    fn difference_found(&self, difference: &Difference) -> Verdict {
        (**self).difference_found(difference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_ordered() {
        let ids: Vec<u32> = DifferenceKind::ALL.iter().map(|k| k.id()).collect();
        let unique: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn display_renders_both_sides() {
        let difference = Difference::new(
            DifferenceKind::AttrValue,
            NodeDetail::new("1", "<a testNumber=\"1\"...>", "/test[1]/a[1]/@testNumber"),
            NodeDetail::new("2", "<a testNumber=\"2\"...>", "/test[1]/a[1]/@testNumber"),
        );
        assert_eq!(
            difference.to_string(),
            "Expected attribute value '1' but was '2' - comparing <a testNumber=\"1\"...> \
             at /test[1]/a[1]/@testNumber to <a testNumber=\"2\"...> at /test[1]/a[1]/@testNumber"
        );
    }

    #[test]
    fn absent_side_renders_as_null() {
        let difference = Difference::new(
            DifferenceKind::ChildNodeNotFound,
            NodeDetail::new("b", "<b...>", "/test[1]/b[1]"),
            NodeDetail::absent(),
        );
        assert!(difference.to_string().ends_with("to null at null"));
    }

    #[test]
    fn verdict_strength() {
        assert!(!Verdict::Equivalent.breaks_identity());
        assert!(Verdict::SimilarOnly.breaks_identity());
        assert!(!Verdict::SimilarOnly.breaks_similarity());
        assert!(Verdict::Reject.breaks_similarity());
    }
}
