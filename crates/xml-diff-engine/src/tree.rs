//! Arena DOM implementing the XmlTree traits
//!
//! Unlike most parsers' trees this one keeps everything a comparison may
//! care about: comments, CDATA sections as distinct nodes, attribute order,
//! and the prefix each name was written with.

use xml_diff_traits::{
    error::{Error, Result},
    tree::{MutableXmlTree, NodeType, XmlTree},
};

use crate::writer;

/// Namespace URI bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Handle to a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A possibly prefixed name with its resolved namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl QName {
    /// Split `name` at the first colon; the namespace is left unresolved.
    pub fn parse(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
                namespace: None,
            },
            None => Self {
                prefix: None,
                local: name.to_string(),
                namespace: None,
            },
        }
    }

    /// The name as written, `prefix:local` or `local`
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Document,
    Element {
        name: QName,
        namespaces: Vec<(Option<String>, String)>,
    },
    Attribute {
        name: QName,
        value: String,
    },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

#[derive(Debug, Clone)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<NodeId>,
}

/// A single XML document stored as an arena of nodes
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeEntry>,
}

impl Document {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeEntry {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
                attributes: Vec::new(),
            }],
        }
    }

    /// Parse a document from XML text
    pub fn parse(xml: &str) -> Result<Self> {
        crate::parser::parse_str(xml)
    }

    /// Parse a document from UTF-8 encoded bytes
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        crate::parser::parse_bytes(bytes)
    }

    /// Serialize the whole document without added whitespace
    pub fn to_xml_string(&self) -> Result<String> {
        writer::to_string(self, self.root())
    }

    /// Serialize the whole document with two-space indentation
    pub fn to_pretty_string(&self) -> Result<String> {
        writer::to_pretty_string(self, self.root())
    }

    pub(crate) fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    pub(crate) fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            data,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
        });
        id
    }

    pub(crate) fn attach_attribute(&mut self, element: NodeId, attribute: NodeId) {
        self.nodes[attribute.0].parent = Some(element);
        self.nodes[element.0].attributes.push(attribute);
    }

    pub(crate) fn declare_namespace(&mut self, element: NodeId, prefix: Option<String>, uri: String) {
        if let NodeData::Element { namespaces, .. } = &mut self.nodes[element.0].data {
            namespaces.retain(|(p, _)| *p != prefix);
            namespaces.push((prefix, uri));
        }
    }

    pub(crate) fn set_namespace(&mut self, node: NodeId, uri: Option<String>) {
        if let NodeData::Element { name, .. } | NodeData::Attribute { name, .. } =
            &mut self.nodes[node.0].data
        {
            name.namespace = uri;
        }
    }

    pub(crate) fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].children.last().copied()
    }

    pub(crate) fn append_to_text(&mut self, node: NodeId, text: &str) {
        if let NodeData::Text(existing) = &mut self.nodes[node.0].data {
            existing.push_str(text);
        }
    }

    fn check(&self, node: NodeId) -> Result<()> {
        if node.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::node_access(format!("{:?} does not belong to this document", node)))
        }
    }

    fn name(&self, node: NodeId) -> Option<&QName> {
        match self.data(node) {
            NodeData::Element { name, .. } | NodeData::Attribute { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Resolve a prefix against the declarations in scope at `node`
    pub fn lookup_namespace(&self, node: NodeId, prefix: Option<&str>) -> Option<String> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE.to_string());
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if let NodeData::Element { namespaces, .. } = self.data(id) {
                if let Some((_, uri)) = namespaces.iter().find(|(p, _)| p.as_deref() == prefix) {
                    return (!uri.is_empty()).then(|| uri.clone());
                }
            }
            current = self.nodes[id.0].parent;
        }
        None
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTree for Document {
    type Node = NodeId;

    fn root(&self) -> Self::Node {
        NodeId(0)
    }

    fn document_element(&self) -> Result<Self::Node> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .find(|child| matches!(self.data(*child), NodeData::Element { .. }))
            .ok_or_else(|| Error::node_access("Document has no root element"))
    }

    fn parent(&self, node: Self::Node) -> Option<Self::Node> {
        self.nodes.get(node.0).and_then(|entry| entry.parent)
    }

    fn children(&self, node: Self::Node) -> Vec<Self::Node> {
        self.nodes
            .get(node.0)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    fn attributes(&self, node: Self::Node) -> Vec<Self::Node> {
        self.nodes
            .get(node.0)
            .map(|entry| entry.attributes.clone())
            .unwrap_or_default()
    }

    fn namespace_declarations(&self, node: Self::Node) -> Vec<(Option<String>, String)> {
        match self.data(node) {
            NodeData::Element { namespaces, .. } => namespaces.clone(),
            _ => Vec::new(),
        }
    }

    fn node_name(&self, node: Self::Node) -> Option<String> {
        match self.data(node) {
            NodeData::ProcessingInstruction { target, .. } => Some(target.clone()),
            _ => self.name(node).map(QName::qualified),
        }
    }

    fn node_local_name(&self, node: Self::Node) -> Option<String> {
        self.name(node).map(|name| name.local.clone())
    }

    fn node_prefix(&self, node: Self::Node) -> Option<String> {
        self.name(node).and_then(|name| name.prefix.clone())
    }

    fn node_namespace_uri(&self, node: Self::Node) -> Option<String> {
        self.name(node).and_then(|name| name.namespace.clone())
    }

    fn node_value(&self, node: Self::Node) -> Option<String> {
        match self.data(node) {
            NodeData::Text(text) | NodeData::CData(text) | NodeData::Comment(text) => {
                Some(text.clone())
            }
            NodeData::Attribute { value, .. } => Some(value.clone()),
            NodeData::ProcessingInstruction { data, .. } => Some(data.clone()),
            NodeData::Document | NodeData::Element { .. } => None,
        }
    }

    fn node_type(&self, node: Self::Node) -> NodeType {
        match self.data(node) {
            NodeData::Document => NodeType::Document,
            NodeData::Element { .. } => NodeType::Element,
            NodeData::Attribute { .. } => NodeType::Attribute,
            NodeData::Text(_) => NodeType::Text,
            NodeData::CData(_) => NodeType::CData,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
        }
    }

    fn serialize(&self, node: Self::Node) -> Result<String> {
        self.check(node)?;
        writer::to_string(self, node)
    }
}

impl MutableXmlTree for Document {
    fn create_element(&mut self, name: &str, namespace: Option<&str>) -> Result<Self::Node> {
        if name.is_empty() {
            return Err(Error::node_access("Element name must not be empty"));
        }
        let mut qname = QName::parse(name);
        qname.namespace = namespace.map(str::to_string);
        let element = self.push(NodeData::Element {
            name: qname.clone(),
            namespaces: Vec::new(),
        });
        if let Some(uri) = namespace {
            self.declare_namespace(element, qname.prefix, uri.to_string());
        }
        Ok(element)
    }

    fn create_text(&mut self, text: &str) -> Result<Self::Node> {
        Ok(self.push(NodeData::Text(text.to_string())))
    }

    fn create_cdata(&mut self, text: &str) -> Result<Self::Node> {
        Ok(self.push(NodeData::CData(text.to_string())))
    }

    fn create_comment(&mut self, text: &str) -> Result<Self::Node> {
        Ok(self.push(NodeData::Comment(text.to_string())))
    }

    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;
        match self.data(parent) {
            NodeData::Document | NodeData::Element { .. } => {}
            _ => return Err(Error::node_access("Only documents and elements have children")),
        }
        if matches!(self.data(child), NodeData::Document | NodeData::Attribute { .. }) {
            return Err(Error::node_access("Documents and attributes cannot be appended as children"));
        }
        if self.nodes[child.0].parent.is_some() {
            return Err(Error::node_access("Node is already attached to a parent"));
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    fn set_attribute(
        &mut self,
        element: Self::Node,
        name: &str,
        value: &str,
        namespace: Option<&str>,
    ) -> Result<()> {
        self.check(element)?;
        if !matches!(self.data(element), NodeData::Element { .. }) {
            return Err(Error::node_access("Attributes can only be set on elements"));
        }
        let mut qname = QName::parse(name);
        qname.namespace = namespace.map(str::to_string);

        let existing = self.nodes[element.0].attributes.iter().copied().find(|attr| {
            self.name(*attr)
                .map(|n| n.local == qname.local && n.namespace == qname.namespace)
                .unwrap_or(false)
        });
        match existing {
            Some(attr) => {
                self.nodes[attr.0].data = NodeData::Attribute {
                    name: qname,
                    value: value.to_string(),
                };
            }
            None => {
                let attr = self.push(NodeData::Attribute {
                    name: qname,
                    value: value.to_string(),
                });
                self.attach_attribute(element, attr);
            }
        }
        Ok(())
    }
}
