//! XLink attributes and property wrappers
//!
//! A GML property either embeds its value or points at it with the XLink
//! attribute group. [`Property`] carries both; which one a document uses is
//! up to the document.

use crate::binding::{FromElement, ToElement};
use crate::documents::Element;
use crate::error::Result;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};
use url::Url;

/// XLink simple-link attribute group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XLink {
    /// `xlink:type`, absent means `simple`
    pub link_type: Option<String>,
    /// `xlink:href`
    pub href: Option<String>,
    /// `xlink:role`
    pub role: Option<String>,
    /// `xlink:arcrole`
    pub arcrole: Option<String>,
    /// `xlink:title`
    pub title: Option<String>,
    /// `xlink:show`
    pub show: Option<String>,
    /// `xlink:actuate`
    pub actuate: Option<String>,
}

impl XLink {
    /// Link to `href`
    pub fn href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }

    /// The link type, defaulting to `simple`
    pub fn link_type(&self) -> &str {
        self.link_type.as_deref().unwrap_or("simple")
    }

    /// Parse the `href` as an absolute URL
    pub fn href_url(&self) -> Result<Option<Url>> {
        Ok(self.href.as_deref().map(Url::parse).transpose()?)
    }

    /// Whether the `href` points inside the same document (`#id`)
    pub fn local_target(&self) -> Option<&str> {
        self.href.as_deref().and_then(|h| h.strip_prefix('#'))
    }

    /// Whether no attribute is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Read the attribute group from an element
    pub fn from_attributes(element: &Element) -> Self {
        let get = |name: &str| element.get_attribute_qname(&QName::xlink(name)).map(str::to_string);
        Self {
            link_type: get("type"),
            href: get("href"),
            role: get("role"),
            arcrole: get("arcrole"),
            title: get("title"),
            show: get("show"),
            actuate: get("actuate"),
        }
    }

    /// Write the attribute group onto an element
    pub fn write_attributes(&self, element: &mut Element) {
        element.set_optional_attribute(QName::xlink("type"), self.link_type.as_ref());
        element.set_optional_attribute(QName::xlink("href"), self.href.as_ref());
        element.set_optional_attribute(QName::xlink("role"), self.role.as_ref());
        element.set_optional_attribute(QName::xlink("arcrole"), self.arcrole.as_ref());
        element.set_optional_attribute(QName::xlink("title"), self.title.as_ref());
        element.set_optional_attribute(QName::xlink("show"), self.show.as_ref());
        element.set_optional_attribute(QName::xlink("actuate"), self.actuate.as_ref());
    }
}

/// Attributes shared by every property wrapper
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    /// XLink attribute group
    pub xlink: XLink,
    /// `nilReason`
    pub nil_reason: Option<String>,
    /// `gml:remoteSchema`
    pub remote_schema: Option<String>,
    /// `owns`
    pub owns: Option<bool>,
}

impl PropertyAttributes {
    /// Read the attributes from an element
    pub fn from_attributes(element: &Element) -> Result<Self> {
        let owns = element
            .get_attribute("owns")
            .map(crate::binding::parse_bool)
            .transpose()?;
        Ok(Self {
            xlink: XLink::from_attributes(element),
            nil_reason: element.get_attribute("nilReason").map(str::to_string),
            remote_schema: element
                .get_attribute_qname(&QName::gml("remoteSchema"))
                .map(str::to_string),
            owns,
        })
    }

    /// Write the attributes onto an element
    pub fn write_attributes(&self, element: &mut Element) {
        self.xlink.write_attributes(element);
        element.set_optional_attribute(QName::local("nilReason"), self.nil_reason.as_ref());
        element.set_optional_attribute(QName::gml("remoteSchema"), self.remote_schema.as_ref());
        element.set_optional_attribute(QName::local("owns"), self.owns);
    }

    /// `owns`, defaulting to false
    pub fn owns(&self) -> bool {
        self.owns.unwrap_or(false)
    }
}

/// A property holding at most one inline value, or a reference to it
///
/// Holding an inline value and an `xlink:href` at the same time is accepted;
/// [`Property::has_conflict`] reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property<T> {
    /// The inline value
    pub value: Option<T>,
    /// Reference and nil attributes
    pub attributes: PropertyAttributes,
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Self {
            value: None,
            attributes: PropertyAttributes::default(),
        }
    }
}

impl<T> Property<T> {
    /// A property embedding `value`
    pub fn inline(value: T) -> Self {
        Self {
            value: Some(value),
            attributes: PropertyAttributes::default(),
        }
    }

    /// A property pointing at `href`
    pub fn by_reference(href: impl Into<String>) -> Self {
        Self {
            value: None,
            attributes: PropertyAttributes {
                xlink: XLink::href(href),
                ..PropertyAttributes::default()
            },
        }
    }

    /// The held value
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Replace the held value, returning the previous one
    pub fn set(&mut self, value: Option<T>) -> Option<T> {
        std::mem::replace(&mut self.value, value)
    }

    /// Whether the property refers to its value by `xlink:href`
    pub fn is_by_reference(&self) -> bool {
        self.attributes.xlink.href.is_some()
    }

    /// Whether both an inline value and a reference are present
    pub fn has_conflict(&self) -> bool {
        self.value.is_some() && self.is_by_reference()
    }

    /// Map the held value into another type
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Property<U> {
        Property {
            value: self.value.map(f),
            attributes: self.attributes,
        }
    }
}

impl<T: FromElement> FromElement for Property<T> {
    fn from_element(element: &Element) -> Result<Self> {
        let value = element.first_child().map(T::from_element).transpose()?;
        Ok(Self {
            value,
            attributes: PropertyAttributes::from_attributes(element)?,
        })
    }
}

impl<T: ToElement> Property<T> {
    /// Encode the property as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name);
        self.attributes.write_attributes(&mut element);
        if let Some(value) = &self.value {
            element.add_child(value.to_element());
        }
        element
    }
}
