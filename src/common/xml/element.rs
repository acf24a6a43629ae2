//! Owned XML tree used at the serialization boundary of package parts.
//!
//! Parts are parsed whole into an [`XmlDocument`], edited through the typed
//! views built on top of [`XmlElement`], and written back with
//! [`XmlDocument::to_xml`]. Qualified names are kept verbatim (`w:drawing`,
//! `pic:cNvPr`) so untouched markup round-trips with its prefixes intact.
//!
//! Text nodes keep their escaped source form. Attribute values are stored
//! unescaped and escaped again on output, so character references may change
//! spelling (`&#9;` is written as `&#x9;`) but never meaning.

use super::escape::{escape_text, escape_xml};
use crate::common::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::borrow::Cow;

/// A node inside an element or in the document prolog/epilog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Character data, stored escaped exactly as read
    Text(String),
    /// `<![CDATA[...]]>` section content
    CData(String),
    /// `<!--...-->` comment content
    Comment(String),
    /// `<?...?>` processing instruction content
    ProcessingInstruction(String),
    /// `<!DOCTYPE ...>` content
    DocType(String),
}

impl XmlNode {
    fn write_xml(&self, output: &mut String) {
        match self {
            XmlNode::Element(element) => element.write_xml(output),
            XmlNode::Text(raw) => output.push_str(raw),
            XmlNode::CData(content) => {
                output.push_str("<![CDATA[");
                output.push_str(content);
                output.push_str("]]>");
            },
            XmlNode::Comment(content) => {
                output.push_str("<!--");
                output.push_str(content);
                output.push_str("-->");
            },
            XmlNode::ProcessingInstruction(content) => {
                output.push_str("<?");
                output.push_str(content);
                output.push_str("?>");
            },
            XmlNode::DocType(content) => {
                output.push_str("<!DOCTYPE ");
                output.push_str(content);
                output.push('>');
            },
        }
    }
}

/// An XML element with ordered attributes and mixed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create a new element with no attributes and no children.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Qualified tag name, e.g. `wp:anchor`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local part of the tag name, e.g. `anchor` for `wp:anchor`.
    #[inline]
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Get an attribute value by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Iterate over `(name, value)` attribute pairs in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All child nodes in document order.
    #[inline]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Mutable access to the child nodes.
    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.children
    }

    /// Append a child element.
    pub fn push_element(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Iterate over child elements, skipping text and other nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Mutable variant of [`XmlElement::child`].
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Follow a chain of first-matching child names.
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        names
            .iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Mutable variant of [`XmlElement::path`].
    pub fn path_mut(&mut self, names: &[&str]) -> Option<&mut XmlElement> {
        let mut current = self;
        for name in names {
            current = current.child_mut(name)?;
        }
        Some(current)
    }

    /// Remove every child element with the given name. Returns how many were removed.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, XmlNode::Element(e) if e.name == name));
        before - self.children.len()
    }

    /// Whether the element has neither attributes nor children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Drop all attributes and children, keeping only the tag.
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.children.clear();
    }

    /// Concatenated, unescaped text of the direct text and CDATA children.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(raw) => {
                    let unescaped = quick_xml::escape::unescape(raw)
                        .unwrap_or(Cow::Borrowed(raw.as_str()));
                    text.push_str(&unescaped);
                },
                XmlNode::CData(content) => text.push_str(content),
                _ => {},
            }
        }
        text
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(escape_text(text)));
        }
    }

    /// Visit every element named `name` in document order (pre-order).
    ///
    /// The visitor sees the element before its descendants, so edits made
    /// to a matched element are visible when its subtree is walked.
    pub fn visit_mut<F>(&mut self, name: &str, visitor: &mut F)
    where
        F: FnMut(&mut XmlElement),
    {
        if self.name == name {
            visitor(self);
        }
        for node in &mut self.children {
            if let XmlNode::Element(child) = node {
                child.visit_mut(name, visitor);
            }
        }
    }

    /// Count the elements named `name` in this subtree.
    pub fn count(&self, name: &str) -> usize {
        let own = usize::from(self.name == name);
        own + self.child_elements().map(|c| c.count(name)).sum::<usize>()
    }

    /// Serialize element to an XML string.
    pub fn to_xml_string(&self) -> String {
        let mut xml = String::new();
        self.write_xml(&mut xml);
        xml
    }

    fn write_xml(&self, output: &mut String) {
        output.push('<');
        output.push_str(&self.name);

        for (key, value) in &self.attributes {
            output.push(' ');
            output.push_str(key);
            output.push_str("=\"");
            output.push_str(&escape_xml(value));
            output.push('"');
        }

        if self.children.is_empty() {
            output.push_str("/>");
            return;
        }

        output.push('>');
        for child in &self.children {
            child.write_xml(output);
        }
        output.push_str("</");
        output.push_str(&self.name);
        output.push('>');
    }
}

/// A whole XML part: declaration, prolog, root element and epilog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    declaration: Option<String>,
    prolog: Vec<XmlNode>,
    root: XmlElement,
    epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Wrap a root element into a document with a standard declaration.
    pub fn new(root: XmlElement) -> Self {
        Self {
            declaration: Some(r#"xml version="1.0" encoding="UTF-8" standalone="yes""#.to_string()),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a part's text. `part_name` is only used in error messages.
    pub fn parse(part_name: &str, xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::parse(part_name, e))?;

            let node = match event {
                Event::Decl(ref d) => {
                    declaration = Some(Self::declaration(part_name, d)?);
                    continue;
                },
                Event::Start(ref e) => {
                    stack.push(Self::open_element(part_name, e)?);
                    continue;
                },
                Event::Empty(ref e) => XmlNode::Element(Self::open_element(part_name, e)?),
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::parse(part_name, "unbalanced end tag"))?;
                    XmlNode::Element(element)
                },
                Event::Text(ref t) => XmlNode::Text(Self::decoded(part_name, t.decode())?),
                Event::GeneralRef(ref r) => {
                    XmlNode::Text(format!("&{};", Self::decoded(part_name, r.decode())?))
                },
                Event::CData(ref c) => XmlNode::CData(Self::decoded(part_name, c.decode())?),
                Event::Comment(ref c) => XmlNode::Comment(Self::decoded(part_name, c.decode())?),
                Event::PI(ref p) => XmlNode::ProcessingInstruction(
                    std::str::from_utf8(p)
                        .map_err(|e| Error::parse(part_name, e))?
                        .to_string(),
                ),
                Event::DocType(ref d) => XmlNode::DocType(Self::decoded(part_name, d.decode())?),
                Event::Eof => break,
            };

            // Attach the finished node to its parent, or to the document level.
            if let Some(parent) = stack.last_mut() {
                Self::append(&mut parent.children, node);
            } else if let XmlNode::Element(element) = node {
                if root.is_some() {
                    return Err(Error::parse(part_name, "multiple root elements"));
                }
                root = Some(element);
            } else if root.is_none() {
                Self::append(&mut prolog, node);
            } else {
                Self::append(&mut epilog, node);
            }
        }

        if !stack.is_empty() {
            return Err(Error::parse(part_name, "unexpected end of document"));
        }

        let root = root.ok_or_else(|| Error::parse(part_name, "no root element found"))?;
        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    fn declaration(part_name: &str, d: &quick_xml::events::BytesDecl<'_>) -> Result<String> {
        let version = d.version().map_err(|e| Error::parse(part_name, e))?;
        let mut decl = format!(r#"xml version="{}""#, String::from_utf8_lossy(&version));
        if let Some(encoding) = d.encoding().transpose().map_err(|e| Error::parse(part_name, e))? {
            decl.push_str(&format!(r#" encoding="{}""#, String::from_utf8_lossy(&encoding)));
        }
        let standalone = d.standalone().transpose().map_err(|e| Error::parse(part_name, e))?;
        if let Some(standalone) = standalone {
            decl.push_str(&format!(r#" standalone="{}""#, String::from_utf8_lossy(&standalone)));
        }
        Ok(decl)
    }

    fn open_element(part_name: &str, e: &quick_xml::events::BytesStart<'_>) -> Result<XmlElement> {
        let qname = e.name();
        let name = std::str::from_utf8(qname.as_ref()).map_err(|err| Error::parse(part_name, err))?;
        let mut element = XmlElement::new(name);

        for attr in e.attributes() {
            let attr = attr.map_err(|err| Error::parse(part_name, err))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| Error::parse(part_name, err))?;
            let value = attr
                .unescape_value()
                .map_err(|err| Error::parse(part_name, err))?;
            element.attributes.push((key.to_string(), value.into_owned()));
        }

        Ok(element)
    }

    fn decoded<E: ToString>(
        part_name: &str,
        decoded: std::result::Result<Cow<'_, str>, E>,
    ) -> Result<String> {
        decoded
            .map(Cow::into_owned)
            .map_err(|e| Error::parse(part_name, e))
    }

    /// Append a node, merging adjacent text so entity references stay inline.
    fn append(nodes: &mut Vec<XmlNode>, node: XmlNode) {
        if let (Some(XmlNode::Text(previous)), XmlNode::Text(next)) = (nodes.last_mut(), &node) {
            previous.push_str(next);
            return;
        }
        nodes.push(node);
    }

    /// The root element.
    #[inline]
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Mutable access to the root element.
    #[inline]
    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// Serialize the document back to text.
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        if let Some(declaration) = &self.declaration {
            xml.push_str("<?");
            xml.push_str(declaration);
            xml.push_str("?>");
        }
        for node in &self.prolog {
            node.write_xml(&mut xml);
        }
        self.root.write_xml(&mut xml);
        for node in &self.epilog {
            node.write_xml(&mut xml);
        }
        xml
    }
}
