//! Minimal XML element tree used both to build request bodies and to navigate
//! multistatus responses.
//!
//! Request bodies are assembled from [`XmlElement`] values instead of string
//! concatenation so that every text and attribute value goes through
//! [`escape_xml`]. Responses are parsed with `quick-xml` into the same type and
//! searched by local name, ignoring prefixes.

use std::borrow::Cow;
use std::fmt;

use quick_xml::NsReader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::{DavError, Result};

/// Declaration prepended to every request body. Responses that do not start
/// with it are treated as opaque.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// True when `body` starts with an XML declaration (leading whitespace and a
/// UTF-8 BOM are tolerated).
pub fn has_xml_declaration(body: &[u8]) -> bool {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    body.trim_ascii_start().starts_with(b"<?xml")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with its qualified name, resolved namespace (parsed trees only),
/// attributes in document order and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// New element with a qualified name such as `d:prop`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = XmlElement>,
    {
        self.children
            .extend(children.into_iter().map(XmlNode::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text.into());
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(XmlNode::Text(existing)) = self.children.last_mut() {
            existing.push_str(&text);
        } else {
            self.children.push(XmlNode::Text(text));
        }
    }

    // ----------- Navigation -----------

    /// Qualified name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name().eq_ignore_ascii_case(local)
    }

    /// Attribute value by exact or local name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .or_else(|| {
                self.attributes
                    .iter()
                    .find(|(k, _)| !k.starts_with("xmlns") && local_part(k) == key)
            })
            .map(|(_, v)| v.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    pub fn first_child_element(&self) -> Option<&XmlElement> {
        self.child_elements().next()
    }

    /// All descendants (not self) with the given local name, in document order.
    pub fn descendants(&self, local: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(local, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local: &str, found: &mut Vec<&'a XmlElement>) {
        for child in self.child_elements() {
            if child.is(local) {
                found.push(child);
            }
            child.collect_descendants(local, found);
        }
    }

    /// First descendant with the given local name (depth-first, document order).
    pub fn first_descendant(&self, local: &str) -> Option<&XmlElement> {
        for child in self.child_elements() {
            if child.is(local) {
                return Some(child);
            }
            if let Some(found) = child.first_descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of the element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }

    // ----------- Rendering -----------

    /// Render as a complete document: declaration followed by the element.
    pub fn to_document(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        self.write_compact(&mut out);
        out
    }

    /// Indented rendering for diagnostics.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        out.push('\n');
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
    }

    fn write_compact(&self, out: &mut String) {
        self.write_open_tag(out);
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                XmlNode::Element(el) => el.write_compact(out),
                XmlNode::Text(text) => out.push_str(&escape_xml(text)),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        self.write_open_tag(out);

        let significant: Vec<&XmlNode> = self
            .children
            .iter()
            .filter(|node| !matches!(node, XmlNode::Text(t) if t.trim().is_empty()))
            .collect();

        if significant.is_empty() {
            out.push_str("/>\n");
            return;
        }

        if significant.iter().all(|node| matches!(node, XmlNode::Text(_))) {
            out.push('>');
            out.push_str(&escape_xml(&self.text_content()));
        } else {
            out.push_str(">\n");
            for node in significant {
                match node {
                    XmlNode::Element(el) => el.write_pretty(out, depth + 1),
                    XmlNode::Text(text) => {
                        out.push_str(&indent);
                        out.push_str("  ");
                        out.push_str(&escape_xml(text.trim()));
                        out.push('\n');
                    }
                }
            }
            out.push_str(&indent);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push_str(">\n");
    }

    // ----------- Parsing -----------

    /// Parse a document and return its root element.
    pub fn parse(body: &[u8]) -> Result<XmlElement> {
        let mut reader = NsReader::from_reader(body);
        let mut buf = Vec::with_capacity(8 * 1024);
        let mut stack: Vec<XmlElement> = Vec::with_capacity(16);
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_resolved_event_into(&mut buf) {
                Ok((ns, Event::Start(e))) => stack.push(element_from_start(ns, &e)?),
                Ok((ns, Event::Empty(e))) => {
                    let element = element_from_start(ns, &e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok((_, Event::End(_))) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DavError::Parse("unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok((_, Event::Text(e))) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(decode_text(&e));
                    }
                }
                Ok((_, Event::GeneralRef(e))) => {
                    if let Some(parent) = stack.last_mut() {
                        let reference = format!("&{};", String::from_utf8_lossy(&e));
                        parent.push_text(decode_text(reference.as_bytes()));
                    }
                }
                Ok((_, Event::CData(e))) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(String::from_utf8_lossy(&e).into_owned());
                    }
                }
                Ok((_, Event::Eof)) => break,
                Err(e) => return Err(DavError::Parse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(DavError::Parse("unexpected end of document".into()));
        }
        root.ok_or_else(|| DavError::Parse("document has no root element".into()))
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_compact(&mut out);
        f.write_str(&out)
    }
}

fn local_part(name: &str) -> &str {
    match name.rfind(':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

fn element_from_start(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    if let ResolveResult::Bound(uri) = ns {
        element.namespace = Some(String::from_utf8_lossy(uri.as_ref()).into_owned());
    }
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| DavError::Parse(format!("invalid attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DavError::Parse(format!("invalid attribute value: {e}")))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(DavError::Parse("multiple root elements".into()));
    }
    Ok(())
}

/// Decode raw text, resolving entity references. Unknown entities are kept verbatim.
fn decode_text(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    unescape(&text)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| text.to_string())
}
