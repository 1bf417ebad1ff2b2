//! XML element tree and serialization.
//!
//! The response pipeline builds each document as a mutable [`Element`]
//! tree owned by a single request, then serializes it in one pass
//! through a `quick_xml` writer. Elements with neither text nor
//! children serialize in self-closing form (`<error code="..."/>`),
//! matching the wire shape harvesters expect for empty protocol
//! elements. Text and attribute values are escaped by the writer.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;

/// A mutable XML element under construction.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an element with the given tag name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// The element's tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set an attribute, appending in call order.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push((name.into(), value.into()));
    }

    /// Set the element's text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Append a new empty child and return a mutable reference to it.
    pub fn child(&mut self, name: impl Into<String>) -> &mut Element {
        self.append(Element::new(name))
    }

    /// Append a fully built child and return a mutable reference to it.
    pub fn append(&mut self, element: Element) -> &mut Element {
        self.children.push(element);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// First direct child with the given tag name.
    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// Direct children, in document order.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Serialize the tree to a UTF-8 XML document with declaration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OaiError::Xml`] if an event cannot be written.
    pub fn to_document(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_into(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Serialize the tree without an XML declaration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::OaiError::Xml`] if an event cannot be written.
    pub fn to_fragment(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attrs {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for element in &self.children {
            element.write_into(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}
