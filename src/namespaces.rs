//! XML namespace handling
//!
//! This module provides the well-known OGC namespaces, qualified names
//! (QNames) and namespace prefix mappings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// GML 3.2 namespace, used for all output
pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";

/// GML 3.1 namespace, accepted on input (Filter 1.1.0 documents embed it)
pub const GML_311_NAMESPACE: &str = "http://www.opengis.net/gml";

/// OGC Filter Encoding 1.1.0 namespace
pub const OGC_NAMESPACE: &str = "http://www.opengis.net/ogc";

/// XLink namespace
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML namespace (bound to the `xml` prefix)
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Check whether a namespace URI is one of the GML namespaces
pub fn is_gml_namespace(namespace: Option<&str>) -> bool {
    matches!(namespace, Some(GML_NAMESPACE) | Some(GML_311_NAMESPACE))
}

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a name in the GML 3.2 namespace
    pub fn gml(local_name: impl Into<String>) -> Self {
        Self::namespaced(GML_NAMESPACE, local_name)
    }

    /// Create a name in the OGC Filter namespace
    pub fn ogc(local_name: impl Into<String>) -> Self {
        Self::namespaced(OGC_NAMESPACE, local_name)
    }

    /// Create a name in the XLink namespace
    pub fn xlink(local_name: impl Into<String>) -> Self {
        Self::namespaced(XLINK_NAMESPACE, local_name)
    }

    /// Whether this is `local_name` in either GML namespace
    pub fn is_gml(&self, local_name: &str) -> bool {
        self.local_name == local_name && is_gml_namespace(self.namespace.as_deref())
    }

    /// Whether this is `local_name` in the OGC Filter namespace
    pub fn is_ogc(&self, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(OGC_NAMESPACE)
    }

    /// Whether the name lives in either GML namespace
    pub fn in_gml(&self) -> bool {
        is_gml_namespace(self.namespace.as_deref())
    }

    /// Whether the name lives in the OGC Filter namespace
    pub fn in_ogc(&self) -> bool {
        self.namespace.as_deref() == Some(OGC_NAMESPACE)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: BTreeMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with the conventional OGC prefixes bound
    pub fn ogc_defaults() -> Self {
        let mut ctx = Self::new();
        ctx.add_prefix("gml", GML_NAMESPACE);
        ctx.add_prefix("ogc", OGC_NAMESPACE);
        ctx.add_prefix("xlink", XLINK_NAMESPACE);
        ctx.add_prefix("xsi", XSI_NAMESPACE);
        ctx
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the first prefix bound to a namespace
    pub fn get_prefix(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, uri)| uri.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Number of declarations (prefixes plus default namespace)
    pub fn len(&self) -> usize {
        self.prefixes.len() + usize::from(self.default_namespace.is_some())
    }

    /// Whether nothing is declared
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over prefix bindings
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Resolve a prefixed name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }
}

/// Stack of in-scope namespace declarations while walking a document
#[derive(Debug, Default)]
pub struct NamespaceScope {
    frames: Vec<NamespaceContext>,
}

impl NamespaceScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an element with its own declarations
    pub fn push(&mut self, ctx: NamespaceContext) {
        self.frames.push(ctx);
    }

    /// Leave the innermost element
    pub fn pop(&mut self) -> Option<NamespaceContext> {
        self.frames.pop()
    }

    fn lookup_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get_namespace(prefix))
    }

    fn default_namespace(&self) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get_default_namespace())
            .filter(|ns| !ns.is_empty())
    }

    /// Resolve an element name; unprefixed names take the default namespace
    pub fn resolve_element(&self, raw: &str) -> Result<QName> {
        match raw.split_once(':') {
            Some((prefix, local)) => self
                .lookup_prefix(prefix)
                .map(|ns| QName::namespaced(ns, local))
                .ok_or_else(|| Error::Namespace(format!("Undeclared prefix '{}' in <{}>", prefix, raw))),
            None => Ok(QName::new(self.default_namespace(), raw)),
        }
    }

    /// Resolve an attribute name; unprefixed attributes have no namespace
    pub fn resolve_attribute(&self, raw: &str) -> Result<QName> {
        match raw.split_once(':') {
            Some((prefix, local)) => self
                .lookup_prefix(prefix)
                .map(|ns| QName::namespaced(ns, local))
                .ok_or_else(|| {
                    Error::Namespace(format!("Undeclared prefix '{}' on attribute {}", prefix, raw))
                }),
            None => Ok(QName::local(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_display() {
        let qname = QName::gml("Point");
        assert_eq!(qname.to_string(), "{http://www.opengis.net/gml/3.2}Point");
        assert_eq!(QName::local("fid").to_string(), "fid");
    }

    #[test]
    fn test_both_gml_namespaces_match() {
        assert!(QName::gml("Point").is_gml("Point"));
        assert!(QName::namespaced(GML_311_NAMESPACE, "Point").is_gml("Point"));
        assert!(!QName::ogc("Point").is_gml("Point"));
        assert!(QName::ogc("And").is_ogc("And"));
    }

    #[test]
    fn test_resolve_prefixed_name() {
        let ctx = NamespaceContext::ogc_defaults();
        let qname = ctx.resolve("gml:Envelope").unwrap();
        assert_eq!(qname, QName::gml("Envelope"));
        assert!(ctx.resolve("foo:bar").is_err());
        assert_eq!(ctx.get_prefix(OGC_NAMESPACE), Some("ogc"));
    }

    #[test]
    fn test_scope_shadowing() {
        let mut scope = NamespaceScope::new();
        let mut outer = NamespaceContext::new();
        outer.add_prefix("a", "urn:outer");
        outer.set_default_namespace("urn:default");
        scope.push(outer);

        let mut inner = NamespaceContext::new();
        inner.add_prefix("a", "urn:inner");
        scope.push(inner);

        assert_eq!(scope.resolve_element("a:x").unwrap(), QName::namespaced("urn:inner", "x"));
        assert_eq!(scope.resolve_element("y").unwrap(), QName::namespaced("urn:default", "y"));
        assert_eq!(scope.resolve_attribute("y").unwrap(), QName::local("y"));

        scope.pop();
        assert_eq!(scope.resolve_element("a:x").unwrap(), QName::namespaced("urn:outer", "x"));
        assert!(scope.resolve_element("b:x").is_err());
    }
}
