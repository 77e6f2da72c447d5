//! XML document reading
//!
//! This module turns raw XML into an arena of elements and exposes each
//! element through [`SourceElement`], the read handle the schema parser
//! and the object graph builder work against. Names are kept as local
//! names; namespace prefixes are dropped while reading.

use std::cell::Cell;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::local_name;
use crate::schema::NodeId;

/// Element stored in the document arena
#[derive(Debug, Clone)]
struct ElementData {
    /// Local element name
    name: String,
    /// Attributes by local name, in document order
    attributes: IndexMap<String, String>,
    /// Text content (if any)
    text: Option<String>,
    /// Child element indices, in document order
    children: Vec<usize>,
    /// Parent element index
    parent: Option<usize>,
}

/// Parsed XML document
#[derive(Debug, Default)]
pub struct Document {
    elements: Vec<ElementData>,
    /// Schema node built from each element, indexed like `elements`
    related: Vec<Cell<Option<NodeId>>>,
    root: Option<usize>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read '{}': {}", path.display(), e),
            ))
        })?;
        Self::parse(&bytes)
    }

    /// Parse an XML document from bytes with default limits
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    limits.check_xml_depth(stack.len() + 1)?;
                    let index = doc.push_element(&e, stack.last().copied(), limits)?;
                    stack.push(index);
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Empty(e)) => {
                    limits.check_xml_depth(stack.len() + 1)?;
                    doc.push_element(&e, stack.last().copied(), limits)?;
                }
                Ok(Event::Text(e)) => {
                    if let Some(&current) = stack.last() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        doc.append_text(current, &text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(&current) = stack.last() {
                        let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                        doc.append_text(current, &text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Comments, processing instructions, declarations
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::Xml("Unexpected end of document".to_string()));
        }

        Ok(doc)
    }

    fn push_element(
        &mut self,
        start: &BytesStart,
        parent: Option<usize>,
        limits: &Limits,
    ) -> Result<usize> {
        let raw_name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut attributes = IndexMap::new();
        for attr_result in start.attributes() {
            let attr =
                attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?;

            // Namespace declarations are not attributes of the element
            if attr_name == "xmlns" || attr_name.starts_with("xmlns:") {
                continue;
            }

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();
            attributes.insert(local_name(attr_name).to_string(), attr_value);
        }
        limits.check_attributes(attributes.len())?;

        let index = self.elements.len();
        self.elements.push(ElementData {
            name: local_name(&raw_name).to_string(),
            attributes,
            text: None,
            children: Vec::new(),
            parent,
        });
        self.related.push(Cell::new(None));

        match parent {
            Some(parent) => self.elements[parent].children.push(index),
            None if self.root.is_none() => self.root = Some(index),
            None => return Err(Error::Xml("Multiple root elements".to_string())),
        }

        Ok(index)
    }

    fn append_text(&mut self, index: usize, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let element = &mut self.elements[index];
        match element.text {
            Some(ref mut existing) => existing.push_str(text),
            None => element.text = Some(text.to_string()),
        }
    }

    /// Get the root element
    pub fn root(&self) -> Option<SourceElement<'_>> {
        self.root.map(|index| SourceElement { doc: self, index })
    }

    /// Number of elements in the document
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the document has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Read handle on one element of a [`Document`]
#[derive(Debug, Clone, Copy)]
pub struct SourceElement<'a> {
    doc: &'a Document,
    index: usize,
}

impl<'a> SourceElement<'a> {
    fn data(&self) -> &'a ElementData {
        &self.doc.elements[self.index]
    }

    /// Local name of the element
    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    /// Attribute value by local name
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data().attributes.get(name).map(|s| s.as_str())
    }

    /// All attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.data()
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text content
    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }

    /// Parent element
    pub fn parent(&self) -> Option<SourceElement<'a>> {
        self.data().parent.map(|index| SourceElement {
            doc: self.doc,
            index,
        })
    }

    /// All child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = SourceElement<'a>> + 'a {
        let doc = self.doc;
        self.data()
            .children
            .iter()
            .map(move |&index| SourceElement { doc, index })
    }

    /// Check whether the element has child elements
    pub fn has_elements(&self) -> bool {
        !self.data().children.is_empty()
    }

    /// First child element with the given local name
    pub fn child(&self, tag: &str) -> Option<SourceElement<'a>> {
        self.elements().find(|e| e.name() == tag)
    }

    /// Child elements with the given local name
    pub fn children(&self, tag: &str) -> Vec<SourceElement<'a>> {
        self.elements().filter(|e| e.name() == tag).collect()
    }

    /// Value of the first child with the given name
    ///
    /// Facet-style children carry their value in a `value` attribute;
    /// anything else falls back to the child's text.
    pub fn child_text(&self, tag: &str) -> Option<&'a str> {
        self.child(tag).and_then(|c| c.value())
    }

    /// Values of all children with the given name
    pub fn child_texts(&self, tag: &str) -> Vec<&'a str> {
        self.elements()
            .filter(|e| e.name() == tag)
            .filter_map(|e| e.value())
            .collect()
    }

    fn value(&self) -> Option<&'a str> {
        self.attribute("value").or_else(|| self.text())
    }

    /// Schema node built from this element, if any
    pub fn related(&self) -> Option<NodeId> {
        self.doc.related[self.index].get()
    }

    /// Associate the schema node built from this element
    pub fn set_related(&self, node: NodeId) {
        self.doc.related[self.index].set(Some(node));
    }
}
