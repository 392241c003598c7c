//! A small owned XML tree for rewriting WordprocessingML parts
//!
//! Names stay qualified (`w:p`, `w:r`), attribute and text values are
//! held unescaped. Declarations, comments and processing instructions
//! are carried through verbatim.

use crate::error::{DocxError, DocxResult};
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
    /// Markup passed through untouched (`<?xml ...?>`, comments, CDATA)
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(el) if el.is(name) => Some(el),
            _ => None,
        })
    }

    /// Concatenated text of the direct text children
    pub fn own_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Build a `w:t` that keeps leading and trailing spaces
    pub fn text_run_part(text: &str) -> Self {
        let mut t = Element::new("w:t");
        t.set_attr("xml:space", "preserve");
        t.children.push(Node::Text(text.to_string()));
        t
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Parse a part into its top-level nodes
pub(crate) fn parse(bytes: &[u8], part: &str) -> DocxResult<Vec<Node>> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(false);

    let mut top: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut buf = Vec::new();

    let push = |node: Node, stack: &mut Vec<Element>, top: &mut Vec<Node>| match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top.push(node),
    };

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                stack.push(start_element(e)?);
            }
            Event::Empty(ref e) => {
                let el = start_element(e)?;
                push(Node::Element(el), &mut stack, &mut top);
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| DocxError::Malformed(part.to_string()))?;
                push(Node::Element(el), &mut stack, &mut top);
            }
            Event::Text(ref e) => {
                let text = e.unescape()?.into_owned();
                push(Node::Text(text), &mut stack, &mut top);
            }
            Event::CData(ref e) => {
                let raw = format!("<![CDATA[{}]]>", String::from_utf8_lossy(e));
                push(Node::Raw(raw), &mut stack, &mut top);
            }
            Event::Decl(ref e) => {
                let raw = format!("<?{}?>", String::from_utf8_lossy(e));
                push(Node::Raw(raw), &mut stack, &mut top);
            }
            Event::PI(ref e) => {
                let raw = format!("<?{}?>", String::from_utf8_lossy(e));
                push(Node::Raw(raw), &mut stack, &mut top);
            }
            Event::Comment(ref e) => {
                let raw = format!("<!--{}-->", String::from_utf8_lossy(e));
                push(Node::Raw(raw), &mut stack, &mut top);
            }
            Event::DocType(ref e) => {
                let raw = format!("<!DOCTYPE {}>", String::from_utf8_lossy(e));
                push(Node::Raw(raw), &mut stack, &mut top);
            }
            Event::Eof => break,
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DocxError::Malformed(part.to_string()));
    }
    Ok(top)
}

fn start_element(e: &quick_xml::events::BytesStart<'_>) -> DocxResult<Element> {
    let mut el = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        el.attrs.push((key, value));
    }
    Ok(el)
}

/// Serialize nodes back to XML
pub(crate) fn to_xml(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => escape_into(text, false, out),
        Node::Raw(raw) => out.push_str(raw),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (key, value) in &el.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            if el.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
