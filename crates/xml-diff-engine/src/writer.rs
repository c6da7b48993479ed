//! Serialization of documents and nodes back to XML text

use quick_xml::escape::escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use xml_diff_traits::error::{Error, Result};
use xml_diff_traits::tree::XmlTree;

use crate::tree::{Document, NodeData, NodeId};

/// Serialize `node` and its descendants without added whitespace
pub fn to_string(doc: &Document, node: NodeId) -> Result<String> {
    render(doc, node, Writer::new(Vec::new()))
}

/// Serialize `node` and its descendants with two-space indentation
pub fn to_pretty_string(doc: &Document, node: NodeId) -> Result<String> {
    render(doc, node, Writer::new_with_indent(Vec::new(), b' ', 2))
}

fn render(doc: &Document, node: NodeId, mut writer: Writer<Vec<u8>>) -> Result<String> {
    if let NodeData::Attribute { name, value } = doc.data(node) {
        return Ok(format!("{}=\"{}\"", name.qualified(), escape(value.as_str())));
    }
    write_node(doc, node, &mut writer)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::serialization(format!("serialized XML is not UTF-8: {}", e)))
}

enum Step {
    Open(NodeId),
    Close(String),
}

fn write_node(doc: &Document, node: NodeId, writer: &mut Writer<Vec<u8>>) -> Result<()> {
    let mut steps = vec![Step::Open(node)];
    while let Some(step) = steps.pop() {
        let node = match step {
            Step::Open(node) => node,
            Step::Close(qualified) => {
                emit(writer, Event::End(BytesEnd::new(qualified.as_str())))?;
                continue;
            }
        };
        match doc.data(node) {
            NodeData::Document => {
                steps.extend(doc.children(node).into_iter().rev().map(Step::Open));
            }
            NodeData::Element { name, namespaces } => {
                let qualified = name.qualified();
                let mut start = BytesStart::new(qualified.as_str());
                for (prefix, uri) in namespaces {
                    let key = match prefix {
                        Some(prefix) => format!("xmlns:{}", prefix),
                        None => "xmlns".to_string(),
                    };
                    start.push_attribute((key.as_str(), uri.as_str()));
                }
                for attr in doc.attributes(node) {
                    if let NodeData::Attribute { name, value } = doc.data(attr) {
                        start.push_attribute((name.qualified().as_str(), value.as_str()));
                    }
                }

                let children = doc.children(node);
                if children.is_empty() {
                    emit(writer, Event::Empty(start))?;
                    continue;
                }
                emit(writer, Event::Start(start))?;
                steps.push(Step::Close(qualified));
                steps.extend(children.into_iter().rev().map(Step::Open));
            }
            NodeData::Text(text) => emit(writer, Event::Text(BytesText::new(text)))?,
            NodeData::CData(text) => emit(writer, Event::CData(BytesCData::new(text.as_str())))?,
            NodeData::Comment(text) => {
                emit(writer, Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
            NodeData::ProcessingInstruction { target, data } => {
                let content = if data.is_empty() {
                    target.clone()
                } else {
                    format!("{} {}", target, data)
                };
                emit(writer, Event::PI(BytesPI::new(content)))?
            }
            NodeData::Attribute { .. } => {
                return Err(Error::node_access(
                    "attributes cannot be written as standalone nodes",
                ))
            }
        }
    }
    Ok(())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mixed_content() {
        let xml = r#"<test a="1" xmlns:p="urn:p"><!--c--><p:x>1 &amp; 2</p:x><![CDATA[raw]]></test>"#;
        let doc = Document::parse(xml).unwrap();
        let out = doc.to_xml_string().unwrap();
        assert!(out.contains("<!--c-->"));
        assert!(out.contains("<p:x>1 &amp; 2</p:x>"));
        assert!(out.contains("<![CDATA[raw]]>"));
        assert!(out.contains(r#"xmlns:p="urn:p""#));
    }

    #[test]
    fn pretty_output_is_indented() {
        let doc = Document::parse("<a><b><c>x</c></b></a>").unwrap();
        let pretty = doc.to_pretty_string().unwrap();
        assert!(pretty.contains("\n  <b>"));
        assert!(pretty.contains("\n    <c>x</c>"));
    }

    #[test]
    fn attributes_render_as_name_value_pairs() {
        let doc = Document::parse("<a k='v&amp;w'/>").unwrap();
        let root = doc.document_element().unwrap();
        let attr = doc.attributes(root)[0];
        assert_eq!(doc.serialize(attr).unwrap(), "k=\"v&amp;w\"");
    }
}
