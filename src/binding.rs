//! Element binding traits
//!
//! Every schema type maps to and from one XML element. [`FromElement`] and
//! [`ToElement`] are the two halves of that mapping; [`Tagged`] names the
//! element a value of a variant group serializes as.

use crate::documents::{Document, Element, WriterConfig};
use crate::error::{DecodeError, Error, Result};
use crate::limits::Limits;
use crate::namespaces::QName;
use std::str::FromStr;

/// Decode a value from an element
pub trait FromElement: Sized {
    /// Build the value from `element`
    fn from_element(element: &Element) -> Result<Self>;
}

/// Encode a value as an element
pub trait ToElement {
    /// Build the element for this value
    fn to_element(&self) -> Element;
}

/// A value that knows the qualified element name it is written as
pub trait Tagged {
    /// The element name selecting this variant
    fn element_name(&self) -> QName;
}

/// Decode a document root into `T`
pub fn decode_str<T: FromElement>(xml: &str) -> Result<T> {
    decode_str_with_limits(xml, &Limits::default())
}

/// Decode a document root into `T`, enforcing limits
pub fn decode_str_with_limits<T: FromElement>(xml: &str, limits: &Limits) -> Result<T> {
    let root = Document::parse(xml, limits)?.into_root()?;
    T::from_element(&root)
}

/// Encode a value as a standalone document
pub fn encode_string<T: ToElement>(value: &T, config: &WriterConfig) -> Result<String> {
    Document::with_root(value.to_element()).write(config)
}

// =============================================================================
// Decoding helpers
// =============================================================================

/// Fail unless `element` is the GML element `local_name`
pub(crate) fn expect_gml(element: &Element, local_name: &str) -> Result<()> {
    if element.qname.is_gml(local_name) {
        Ok(())
    } else {
        Err(DecodeError::new(format!("expected gml:{}", local_name))
            .with_element(element.qname.to_string())
            .into())
    }
}

/// Fail unless `element` is the OGC element `local_name`
pub(crate) fn expect_ogc(element: &Element, local_name: &str) -> Result<()> {
    if element.qname.is_ogc(local_name) {
        Ok(())
    } else {
        Err(DecodeError::new(format!("expected ogc:{}", local_name))
            .with_element(element.qname.to_string())
            .into())
    }
}

/// Required GML child
pub(crate) fn required_gml_child<'a>(element: &'a Element, local_name: &str) -> Result<&'a Element> {
    element.gml_child(local_name).ok_or_else(|| {
        DecodeError::new(format!("missing child gml:{}", local_name))
            .with_element(element.qname.to_string())
            .into()
    })
}

/// Required OGC child
pub(crate) fn required_ogc_child<'a>(element: &'a Element, local_name: &str) -> Result<&'a Element> {
    element.ogc_child(local_name).ok_or_else(|| {
        DecodeError::new(format!("missing child ogc:{}", local_name))
            .with_element(element.qname.to_string())
            .into()
    })
}

/// Required first child element
pub(crate) fn required_first_child(element: &Element) -> Result<&Element> {
    element.first_child().ok_or_else(|| {
        DecodeError::new("missing content element")
            .with_element(element.qname.to_string())
            .into()
    })
}

/// Required unqualified attribute
pub(crate) fn required_attribute<'a>(element: &'a Element, name: &str) -> Result<&'a str> {
    element.get_attribute(name).ok_or_else(|| {
        DecodeError::new(format!("missing attribute {}", name))
            .with_element(element.qname.to_string())
            .into()
    })
}

/// Parse a lexical value, reporting the element it came from
pub(crate) fn parse_value<T: FromStr>(text: &str, element: &Element) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    text.trim().parse::<T>().map_err(|e| {
        DecodeError::new(format!("invalid value '{}'", text.trim()))
            .with_element(element.qname.to_string())
            .with_reason(e.to_string())
            .into()
    })
}

/// Parse an optional attribute
pub(crate) fn optional_parsed_attribute<T: FromStr>(element: &Element, name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    element
        .get_attribute(name)
        .map(|v| parse_value(v, element))
        .transpose()
}

/// Parse a whitespace separated list of doubles
pub fn parse_f64_list(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|e| Error::Value(format!("'{}' is not a double: {}", token, e)))
        })
        .collect()
}

/// Format a list of doubles the way GML writes them
pub fn format_f64_list(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an `xs:boolean`
pub fn parse_bool(text: &str) -> Result<bool> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::Value(format!("'{}' is not a valid xs:boolean", other))),
    }
}

/// Decode every child accepted by `select`
pub(crate) fn decode_children<T, F>(element: &Element, select: F) -> Result<Vec<T>>
where
    T: FromElement,
    F: Fn(&Element) -> bool,
{
    element
        .children
        .iter()
        .filter(|child| select(child))
        .map(T::from_element)
        .collect()
}
