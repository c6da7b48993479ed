//! Event-driven construction of a [`Document`] with quick-xml

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use xml_diff_traits::error::{Error, Result};
use xml_diff_traits::tree::{MutableXmlTree, XmlTree};

use crate::tree::{Document, NodeData, NodeId, QName};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse UTF-8 bytes, tolerating a leading byte order mark
pub fn parse_bytes(bytes: &[u8]) -> Result<Document> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::xml_parse(format!("document is not valid UTF-8: {}", e)))?;
    parse_str(text)
}

/// Parse XML text into a document
pub fn parse_str(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut doc = Document::new();
    let mut open: Vec<NodeId> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::xml_parse(format!("{} (at byte {})", e, reader.buffer_position()))
        })?;
        let parent = open.last().copied().unwrap_or_else(|| doc.root());

        match event {
            Event::Start(start) => {
                let element = start_element(&mut doc, parent, &start)?;
                open.push(element);
            }
            Event::Empty(start) => {
                start_element(&mut doc, parent, &start)?;
            }
            Event::End(_) => {
                if open.pop().is_none() {
                    return Err(Error::xml_parse("closing tag without matching opening tag"));
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| Error::xml_parse(e.to_string()))?;
                if open.is_empty() {
                    if !text.trim().is_empty() {
                        return Err(Error::xml_parse("text content outside of the root element"));
                    }
                    continue;
                }
                append_text(&mut doc, parent, &text)?;
            }
            Event::CData(cdata) => {
                if open.is_empty() {
                    return Err(Error::xml_parse("CDATA section outside of the root element"));
                }
                let text = utf8(&cdata)?;
                let node = doc.create_cdata(text)?;
                doc.append_child(parent, node)?;
            }
            Event::Comment(comment) => {
                let text = utf8(&comment)?;
                let node = doc.create_comment(text)?;
                doc.append_child(parent, node)?;
            }
            Event::PI(pi) => {
                let target = utf8(pi.target())?.to_string();
                let data = utf8(pi.content())?.trim_start().to_string();
                let node = doc.push(NodeData::ProcessingInstruction { target, data });
                doc.append_child(parent, node)?;
            }
            Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(Error::xml_parse(format!(
            "unexpected end of document, element <{}> is not closed",
            doc.node_name(*unclosed).unwrap_or_default()
        )));
    }
    doc.document_element()
        .map_err(|_| Error::xml_parse("document has no root element"))?;
    Ok(doc)
}

fn start_element(doc: &mut Document, parent: NodeId, start: &BytesStart<'_>) -> Result<NodeId> {
    if parent == doc.root() && doc.document_element().is_ok() {
        return Err(Error::xml_parse("document has more than one root element"));
    }

    let name = QName::parse(utf8(start.name().as_ref())?);
    let element = doc.push(NodeData::Element {
        name: name.clone(),
        namespaces: Vec::new(),
    });

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::xml_parse(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::xml_parse(e.to_string()))?
            .into_owned();
        if key == "xmlns" {
            doc.declare_namespace(element, None, value);
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            doc.declare_namespace(element, Some(prefix.to_string()), value);
        } else {
            attributes.push((QName::parse(&key), value));
        }
    }

    doc.append_child(parent, element)?;
    let namespace = resolve(doc, element, name.prefix.as_deref(), true)?;
    doc.set_namespace(element, namespace);

    for (mut attr_name, value) in attributes {
        // unprefixed attributes are never in the default namespace
        attr_name.namespace = match attr_name.prefix.as_deref() {
            Some(prefix) => resolve(doc, element, Some(prefix), false)?,
            None => None,
        };
        let attr = doc.push(NodeData::Attribute {
            name: attr_name,
            value,
        });
        doc.attach_attribute(element, attr);
    }

    Ok(element)
}

fn resolve(doc: &Document, element: NodeId, prefix: Option<&str>, is_element: bool) -> Result<Option<String>> {
    let uri = doc.lookup_namespace(element, prefix);
    match (prefix, uri) {
        (Some(prefix), None) => Err(Error::xml_parse(format!(
            "unbound namespace prefix '{}' on {}",
            prefix,
            if is_element { "element" } else { "attribute" }
        ))),
        (_, uri) => Ok(uri),
    }
}

fn append_text(doc: &mut Document, parent: NodeId, text: &str) -> Result<()> {
    if let Some(last) = doc.last_child(parent) {
        if matches!(doc.data(last), NodeData::Text(_)) {
            doc.append_to_text(last, text);
            return Ok(());
        }
    }
    let node = doc.create_text(text)?;
    doc.append_child(parent, node)
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::xml_parse(format!("invalid UTF-8: {}", e)))
}
