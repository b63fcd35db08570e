//! A small owned XML tree for the efetch wire format.
//!
//! The source schema is irregular: any repeatable element may show up as
//! a singleton or an ordered sequence, and inline markup can appear
//! inside text. Building a tree at the parse boundary normalizes both —
//! [`XmlNode::children`] always yields a sequence, and
//! [`XmlNode::deep_text`] concatenates nested text in document order —
//! so every field-extraction rule downstream operates on one shape.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use neuronews_common::{NewsError, Result};

#[derive(Debug, Clone, Default)]
pub struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlContent>,
}

/// Element content in document order. Text nodes are kept verbatim
/// (including whitespace) so markup inside a sentence concatenates back
/// with its original spacing.
#[derive(Debug, Clone)]
pub enum XmlContent {
    Element(XmlNode),
    Text(String),
}

impl XmlNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All child elements with the given name, singleton or sequence.
    pub fn children<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a XmlNode> + use<'a, 'n> {
        self.children.iter().filter_map(move |c| match c {
            XmlContent::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children(name).next()
    }

    /// Descend a path of element names, first match at each step.
    pub fn find(&self, path: &[&str]) -> Option<&XmlNode> {
        let mut node = self;
        for name in path {
            node = node.child(name)?;
        }
        Some(node)
    }

    /// First element with the given name anywhere below this node.
    pub fn descendant(&self, name: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if let XmlContent::Element(el) = child {
                if el.name == name {
                    return Some(el);
                }
                if let Some(found) = el.descendant(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All nested text, recursively, in document order. Markup elements
    /// contribute their text rather than being dropped.
    pub fn deep_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlContent::Text(t) => out.push_str(t),
                XmlContent::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Trimmed deep text of the first child with the given name; `None`
    /// when the child is absent.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|n| n.deep_text().trim().to_string())
    }
}

/// Parse a whole document into a synthetic root node whose children are
/// the top-level elements.
pub fn parse_document(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlNode> = vec![XmlNode::default()];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                stack.push(node_from_start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let node = node_from_start(e)?;
                push_content(&mut stack, XmlContent::Element(node))?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| NewsError::Xml(err.to_string()))?;
                if !text.is_empty() {
                    push_content(&mut stack, XmlContent::Text(text.into_owned()))?;
                }
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                push_content(&mut stack, XmlContent::Text(text))?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| NewsError::Xml("unbalanced end tag".to_string()))?;
                push_content(&mut stack, XmlContent::Element(node))?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(NewsError::Xml(e.to_string())),
            _ => {} // declaration, comments, processing instructions
        }
        buf.clear();
    }

    if stack.len() != 1 {
        return Err(NewsError::Xml("truncated document".to_string()));
    }
    stack
        .pop()
        .ok_or_else(|| NewsError::Xml("empty document".to_string()))
}

fn node_from_start(e: &BytesStart) -> Result<XmlNode> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| NewsError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| NewsError::Xml(err.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(XmlNode {
        name,
        attrs,
        children: Vec::new(),
    })
}

fn push_content(stack: &mut [XmlNode], content: XmlContent) -> Result<()> {
    let top = stack
        .last_mut()
        .ok_or_else(|| NewsError::Xml("unbalanced end tag".to_string()))?;
    top.children.push(content);
    Ok(())
}
