//! XML document reading and writing
//!
//! Documents are read with quick-xml into a small element tree whose names are
//! fully resolved [`QName`]s, and written back with quick-xml's [`Writer`].

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::validate_id;
use crate::namespaces::{
    NamespaceContext, NamespaceScope, QName, GML_311_NAMESPACE, GML_NAMESPACE, XML_NAMESPACE,
};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Cursor;
use tracing::trace;

/// XML Element in the document tree
///
/// Equality ignores where namespaces were declared, only resolved names count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes, in document order
    #[serde(with = "attribute_pairs")]
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace declarations made on this element
    #[serde(skip)]
    pub namespaces: NamespaceContext,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Create an element in the GML 3.2 namespace
    pub fn gml(local_name: &str) -> Self {
        Self::new(QName::gml(local_name))
    }

    /// Create an element in the OGC Filter namespace
    pub fn ogc(local_name: &str) -> Self {
        Self::new(QName::ogc(local_name))
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an unqualified attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&QName::local(name))
            .map(|s| s.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// The `gml:id` attribute, in either GML namespace
    pub fn gml_id(&self) -> Option<&str> {
        self.get_attribute_qname(&QName::gml("id")).or_else(|| {
            self.get_attribute_qname(&QName::namespaced(GML_311_NAMESPACE, "id"))
        })
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, qname: QName, value: impl Into<String>) {
        self.attributes.insert(qname, value.into());
    }

    /// Set an attribute when a value is present
    pub fn set_optional_attribute(&mut self, qname: QName, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.attributes.insert(qname, value.to_string());
        }
    }

    /// Builder form of [`Element::set_attribute`]
    pub fn with_attribute(mut self, qname: QName, value: impl Into<String>) -> Self {
        self.set_attribute(qname, value);
        self
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Builder form of [`Element::add_child`]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set text content
    pub fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }

    /// Builder form of [`Element::set_text`]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Move this element and its descendants from GML 3.1 into GML 3.2,
    /// names and attributes alike
    pub fn upgrade_gml(&mut self) {
        upgrade_namespace(&mut self.qname);
        let stale = self
            .attributes
            .keys()
            .any(|k| k.namespace.as_deref() == Some(GML_311_NAMESPACE));
        if stale {
            self.attributes = std::mem::take(&mut self.attributes)
                .into_iter()
                .map(|(mut qname, value)| {
                    upgrade_namespace(&mut qname);
                    (qname, value)
                })
                .collect();
        }
        for child in &mut self.children {
            child.upgrade_gml();
        }
    }

    /// Builder form of [`Element::upgrade_gml`]
    pub fn upgraded(mut self) -> Self {
        self.upgrade_gml();
        self
    }

    /// Text content, empty when absent
    pub fn text_content(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }

    /// First child element, if any
    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }

    /// First GML child with the given local name
    pub fn gml_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.qname.is_gml(local_name))
    }

    /// All GML children with the given local name
    pub fn gml_children<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |e| e.qname.is_gml(local_name))
    }

    /// First OGC Filter child with the given local name
    pub fn ogc_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.qname.is_ogc(local_name))
    }

    /// Depth-first iteration over this element and its descendants
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            out.push(element);
            stack.extend(element.children.iter().rev());
        }
        out
    }
}

/// Attributes serialize as a list of pairs, since JSON keys must be strings
mod attribute_pairs {
    use super::QName;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        attributes: &IndexMap<QName, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(attributes.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<QName, String>, D::Error> {
        let pairs: Vec<(QName, String)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname
            && self.attributes == other.attributes
            && self.text == other.text
            && self.children == other.children
    }
}

/// Configuration for the document writer
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Indentation width (0 disables pretty printing)
    indent: usize,
    /// Whether to emit an XML declaration
    declaration: bool,
    /// Preferred prefixes for namespaces
    prefixes: NamespaceContext,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
            prefixes: NamespaceContext::ogc_defaults(),
        }
    }
}

impl WriterConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get indentation width
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Whether an XML declaration is written
    pub fn declaration(&self) -> bool {
        self.declaration
    }

    /// Set indentation
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set whether to write an XML declaration
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    /// Bind a preferred prefix to a namespace
    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.add_prefix(prefix, namespace);
        self
    }
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Wrap an element as a document root
    pub fn with_root(root: Element) -> Self {
        Self { root: Some(root) }
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml, &Limits::default())
    }

    /// Parse an XML document, enforcing limits
    pub fn parse(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_str(xml);

        let mut doc = Document::new();
        let mut scope = NamespaceScope::new();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&e, &mut scope, limits)?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    scope.pop();
                    if let Some(mut current) = element_stack.pop() {
                        settle_text(&mut current);
                        doc.attach(&mut element_stack, current)?;
                    }
                }
                Ok(Event::Empty(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&e, &mut scope, limits)?;
                    scope.pop();
                    doc.attach(&mut element_stack, element)?;
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                    match element_stack.last_mut() {
                        Some(current) => append_text(current, &text),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(Error::Xml(format!(
                                "text outside the root element at position {}",
                                reader.buffer_position()
                            )))
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        append_text(current, &text);
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
                _ => {} // Comments, processing instructions, doctype
            }
            buf.clear();
        }

        if !element_stack.is_empty() {
            return Err(Error::Xml("Unexpected end of document".to_string()));
        }

        Ok(doc)
    }

    /// Hand a closed element to its parent, or make it the root
    fn attach(&mut self, stack: &mut [Element], element: Element) -> Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.add_child(element);
            return Ok(());
        }
        if self.root.is_some() {
            return Err(Error::Xml(format!(
                "second root element {} after the document element",
                element.qname
            )));
        }
        self.root = Some(element);
        Ok(())
    }

    /// Parse element from a BytesStart event, pushing its namespace frame
    fn parse_element(
        start: &BytesStart,
        scope: &mut NamespaceScope,
        limits: &Limits,
    ) -> Result<Element> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut declared = NamespaceContext::new();
        let mut raw_attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr =
                attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if attr_name == "xmlns" {
                declared.set_default_namespace(&attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                declared.add_prefix(prefix, &attr_value);
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }

        limits.check_attributes(raw_attributes.len())?;
        limits.check_namespaces(declared.len())?;

        scope.push(declared.clone());
        let qname = scope.resolve_element(&name)?;
        trace!("parsed element {}", qname);

        let mut element = Element::new(qname);
        element.namespaces = declared;
        for (attr_name, attr_value) in raw_attributes {
            let attr_qname = scope.resolve_attribute(&attr_name)?;
            element.attributes.insert(attr_qname, attr_value);
        }

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Take the root element, failing on an empty document
    pub fn into_root(self) -> Result<Element> {
        self.root
            .ok_or_else(|| Error::Xml("Document has no root element".to_string()))
    }

    /// Check that every `gml:id` is an NCName and unique in the document
    pub fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        if let Some(root) = &self.root {
            for element in root.descendants() {
                if let Some(id) = element.gml_id() {
                    validate_id(id)?;
                    if !seen.insert(id) {
                        return Err(Error::DuplicateId(id.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Serialize the document
    pub fn write(&self, config: &WriterConfig) -> Result<String> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| Error::Encode("Document has no root element".to_string()))?;

        let prefixes = assign_prefixes(root, config);

        let mut writer = if config.indent() > 0 {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', config.indent())
        } else {
            Writer::new(Cursor::new(Vec::new()))
        };

        if config.declaration() {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(|e| Error::Encode(e.to_string()))?;
        }

        write_element(&mut writer, root, &prefixes, true)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| Error::Encode(e.to_string()))
    }
}

fn append_text(element: &mut Element, text: &str) {
    match &mut element.text {
        Some(existing) => existing.push_str(text),
        None => element.text = Some(text.to_string()),
    }
}

fn upgrade_namespace(qname: &mut QName) {
    if qname.namespace.as_deref() == Some(GML_311_NAMESPACE) {
        qname.namespace = Some(GML_NAMESPACE.to_string());
    }
}

/// Text of a leaf element is kept verbatim; around child elements it is
/// layout and gets trimmed
fn settle_text(element: &mut Element) {
    if element.children.is_empty() {
        return;
    }
    if let Some(text) = element.text.take() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            element.text = Some(trimmed.to_string());
        }
    }
}

/// Pick a prefix for every namespace used in the tree
fn assign_prefixes(root: &Element, config: &WriterConfig) -> NamespaceContext {
    let mut used = Vec::new();
    for element in root.descendants() {
        let names = std::iter::once(&element.qname).chain(element.attributes.keys());
        for qname in names {
            if let Some(ns) = qname.namespace.as_deref() {
                if ns != XML_NAMESPACE && !used.iter().any(|u: &String| u == ns) {
                    used.push(ns.to_string());
                }
            }
        }
    }

    let mut assigned = NamespaceContext::new();
    let mut counter = 0;
    for ns in used {
        let preferred = config
            .prefixes
            .get_prefix(&ns)
            .or_else(|| root_declared_prefix(root, &ns))
            .map(str::to_string);
        let prefix = match preferred {
            Some(p) if assigned.get_namespace(&p).is_none() => p,
            _ => loop {
                counter += 1;
                let candidate = format!("ns{}", counter);
                if assigned.get_namespace(&candidate).is_none() {
                    break candidate;
                }
            },
        };
        assigned.add_prefix(prefix, ns);
    }
    assigned
}

fn root_declared_prefix<'a>(root: &'a Element, namespace: &str) -> Option<&'a str> {
    root.descendants()
        .into_iter()
        .find_map(|e| e.namespaces.get_prefix(namespace))
        .filter(|p| *p != "xml")
}

fn prefixed(qname: &QName, prefixes: &NamespaceContext) -> String {
    match qname.namespace.as_deref() {
        Some(XML_NAMESPACE) => format!("xml:{}", qname.local_name),
        Some(ns) => match prefixes.get_prefix(ns) {
            Some(prefix) => format!("{}:{}", prefix, qname.local_name),
            None => qname.local_name.clone(),
        },
        None => qname.local_name.clone(),
    }
}

fn write_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    element: &Element,
    prefixes: &NamespaceContext,
    is_root: bool,
) -> Result<()> {
    let name = prefixed(&element.qname, prefixes);
    let mut start = BytesStart::new(name.as_str());

    if is_root {
        for (prefix, ns) in prefixes.prefixes() {
            let key = format!("xmlns:{}", prefix);
            start.push_attribute((key.as_str(), ns));
        }
    }
    for (qname, value) in &element.attributes {
        let key = prefixed(qname, prefixes);
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let encode_err = |e: quick_xml::Error| Error::Encode(e.to_string());

    if element.children.is_empty() && element.text.is_none() {
        writer.write_event(Event::Empty(start)).map_err(encode_err)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(encode_err)?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(encode_err)?;
    }
    for child in &element.children {
        write_element(writer, child, prefixes, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name.as_str())))
        .map_err(encode_err)?;
    Ok(())
}
