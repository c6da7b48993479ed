//! XML tree abstraction trait

use crate::error::Result;
use std::fmt::Debug;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Document node
    Document,
    /// Element node
    Element,
    /// Attribute node
    Attribute,
    /// Text node
    Text,
    /// CDATA section node
    CData,
    /// Comment node
    Comment,
    /// Processing instruction node
    ProcessingInstruction,
}

impl NodeType {
    /// Returns `true` for text and CDATA nodes.
    pub fn is_character_data(self) -> bool {
        matches!(self, NodeType::Text | NodeType::CData)
    }

    /// Name used for this node type in location paths and messages
    pub fn label(self) -> &'static str {
        match self {
            NodeType::Document => "document",
            NodeType::Element => "element",
            NodeType::Attribute => "attribute",
            NodeType::Text => "text",
            NodeType::CData => "cdata-section",
            NodeType::Comment => "comment",
            NodeType::ProcessingInstruction => "processing-instruction",
        }
    }
}

/// Trait for XML tree implementations.
///
/// A tree holds exactly one document. Attributes are nodes in their own
/// right so that names, namespaces and values are read the same way for
/// elements and attributes. Namespace declarations are not attributes.
pub trait XmlTree {
    /// Type representing a node handle in this tree
    type Node: Copy + Eq + Debug;

    /// The document node
    fn root(&self) -> Self::Node;

    /// Get the document element (root element) of the document
    fn document_element(&self) -> Result<Self::Node>;

    /// Get the parent of a node, if it has one
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Get all children of a node, in document order
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Get the attribute nodes of an element, in document order
    fn attributes(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Get the namespace declarations made on an element as (prefix, uri) pairs
    fn namespace_declarations(&self, node: Self::Node) -> Vec<(Option<String>, String)>;

    /// Get the qualified name of a node (if applicable)
    fn node_name(&self, node: Self::Node) -> Option<String>;

    /// Get the local name of a node (without namespace prefix)
    fn node_local_name(&self, node: Self::Node) -> Option<String>;

    /// Get the namespace prefix of a node
    fn node_prefix(&self, node: Self::Node) -> Option<String>;

    /// Get the namespace URI of a node
    fn node_namespace_uri(&self, node: Self::Node) -> Option<String>;

    /// Get the text content/value of a node
    fn node_value(&self, node: Self::Node) -> Option<String>;

    /// Get the type of a node
    fn node_type(&self, node: Self::Node) -> NodeType;

    /// Serialize a node to an XML string
    fn serialize(&self, node: Self::Node) -> Result<String>;
}

/// Helper trait for trees that need mutable access
pub trait MutableXmlTree: XmlTree {
    /// Create a new element node; `name` may carry a prefix
    fn create_element(&mut self, name: &str, namespace: Option<&str>) -> Result<Self::Node>;

    /// Create a new text node
    fn create_text(&mut self, text: &str) -> Result<Self::Node>;

    /// Create a new CDATA section node
    fn create_cdata(&mut self, text: &str) -> Result<Self::Node>;

    /// Create a new comment node
    fn create_comment(&mut self, text: &str) -> Result<Self::Node>;

    /// Append a child to a node
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<()>;

    /// Set an attribute on an element, replacing any attribute with the same name
    fn set_attribute(
        &mut self,
        element: Self::Node,
        name: &str,
        value: &str,
        namespace: Option<&str>,
    ) -> Result<()>;
}
