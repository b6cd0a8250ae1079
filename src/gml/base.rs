//! Identified objects
//!
//! Every GML object carries the same identity block: an optional `gml:id`,
//! metadata properties, a description, an identifier and a list of names.
//! Types embed a [`GmlObject`] and expose it through [`GmlObjectType`]; the
//! capability traits come for free from the blanket impls below.

use crate::binding::{decode_children, FromElement, ToElement};
use crate::documents::Element;
use crate::error::Result;
use crate::gml::values::{Code, CodeWithAuthority, MetaDataProperty, Reference, StringOrRef};
use crate::names::validate_id;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};

/// `gml:AbstractGMLType` content
///
/// Collections are always present, possibly empty; `names_mut().push(..)`
/// needs no prior check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GmlObject {
    /// `gml:id`
    pub id: Option<String>,
    /// `gml:metaDataProperty`
    pub meta_data_property: Vec<MetaDataProperty>,
    /// `gml:description`
    pub description: Option<StringOrRef>,
    /// `gml:descriptionReference`
    pub description_reference: Option<Reference>,
    /// `gml:identifier`
    pub identifier: Option<CodeWithAuthority>,
    /// `gml:name`, the first one being the name
    pub names: Vec<Code>,
}

impl GmlObject {
    /// An object with no identity set
    pub fn new() -> Self {
        Self::default()
    }

    /// An object with the given `gml:id`
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Add a name
    pub fn with_name(mut self, name: Code) -> Self {
        self.names.push(name);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(StringOrRef::new(description));
        self
    }

    /// Copy the identity of any identified object
    ///
    /// The result owns its collections; later changes to either side are not
    /// seen by the other.
    pub fn copy_from<T: IdentifiedObject + ?Sized>(source: &T) -> Self {
        Self {
            id: source.id().map(str::to_string),
            meta_data_property: source.meta_data_property().to_vec(),
            description: source.description().cloned(),
            description_reference: source.description_reference().cloned(),
            identifier: source.identifier().cloned(),
            names: source.names().to_vec(),
        }
    }

    /// Read the identity block of `element`
    ///
    /// `gml:id` may be absent; when present it must be an NCName.
    pub fn decode(element: &Element) -> Result<Self> {
        let id = element.gml_id().map(str::to_string);
        if let Some(id) = &id {
            validate_id(id)?;
        }
        Ok(Self {
            id,
            meta_data_property: decode_children(element, |c| c.qname.is_gml("metaDataProperty"))?,
            description: element.gml_child("description").map(StringOrRef::from_content),
            description_reference: element
                .gml_child("descriptionReference")
                .map(Reference::from_content)
                .transpose()?,
            identifier: element
                .gml_child("identifier")
                .map(CodeWithAuthority::from_content)
                .transpose()?,
            names: element.gml_children("name").map(Code::from_content).collect(),
        })
    }

    /// Write the identity block onto `element`, ahead of its own content
    pub fn encode_into(&self, element: &mut Element) {
        element.set_optional_attribute(QName::gml("id"), self.id.as_ref());
        for property in &self.meta_data_property {
            element.add_child(property.to_element());
        }
        if let Some(description) = &self.description {
            element.add_child(description.to_element_named(QName::gml("description")));
        }
        if let Some(reference) = &self.description_reference {
            element.add_child(reference.to_element_named(QName::gml("descriptionReference")));
        }
        if let Some(identifier) = &self.identifier {
            element.add_child(identifier.to_element_named(QName::gml("identifier")));
        }
        for name in &self.names {
            element.add_child(name.to_element_named(QName::gml("name")));
        }
    }
}

impl FromElement for GmlObject {
    fn from_element(element: &Element) -> Result<Self> {
        Self::decode(element)
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// Carries a `gml:id` and an authority identifier
pub trait HasIdentifier {
    /// The `gml:id`
    fn id(&self) -> Option<&str>;
    /// Replace the `gml:id`
    fn set_id(&mut self, id: Option<String>);
    /// The `gml:identifier`
    fn identifier(&self) -> Option<&CodeWithAuthority>;
}

/// Carries `gml:name`s
pub trait HasName {
    /// All names, in document order
    fn names(&self) -> &[Code];
    /// The live list of names
    fn names_mut(&mut self) -> &mut Vec<Code>;
    /// The first name
    fn name(&self) -> Option<&Code> {
        self.names().first()
    }
}

/// Carries a description
pub trait HasDescription {
    /// `gml:description`
    fn description(&self) -> Option<&StringOrRef>;
    /// `gml:descriptionReference`
    fn description_reference(&self) -> Option<&Reference>;
    /// Replace the description
    fn set_description(&mut self, description: Option<StringOrRef>);
}

/// Carries metadata properties
pub trait HasMetadata {
    /// `gml:metaDataProperty` entries
    fn meta_data_property(&self) -> &[MetaDataProperty];
    /// The live list of metadata properties
    fn meta_data_property_mut(&mut self) -> &mut Vec<MetaDataProperty>;
}

/// Everything a GML identified object can tell about itself
pub trait IdentifiedObject: HasIdentifier + HasName + HasDescription + HasMetadata {}

impl<T: HasIdentifier + HasName + HasDescription + HasMetadata + ?Sized> IdentifiedObject for T {}

/// A type embedding a [`GmlObject`]
pub trait GmlObjectType {
    /// The identity block
    fn gml_object(&self) -> &GmlObject;
    /// The identity block, mutably
    fn gml_object_mut(&mut self) -> &mut GmlObject;
}

impl GmlObjectType for GmlObject {
    fn gml_object(&self) -> &GmlObject {
        self
    }

    fn gml_object_mut(&mut self) -> &mut GmlObject {
        self
    }
}

impl<T: GmlObjectType + ?Sized> HasIdentifier for T {
    fn id(&self) -> Option<&str> {
        self.gml_object().id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.gml_object_mut().id = id;
    }

    fn identifier(&self) -> Option<&CodeWithAuthority> {
        self.gml_object().identifier.as_ref()
    }
}

impl<T: GmlObjectType + ?Sized> HasName for T {
    fn names(&self) -> &[Code] {
        &self.gml_object().names
    }

    fn names_mut(&mut self) -> &mut Vec<Code> {
        &mut self.gml_object_mut().names
    }
}

impl<T: GmlObjectType + ?Sized> HasDescription for T {
    fn description(&self) -> Option<&StringOrRef> {
        self.gml_object().description.as_ref()
    }

    fn description_reference(&self) -> Option<&Reference> {
        self.gml_object().description_reference.as_ref()
    }

    fn set_description(&mut self, description: Option<StringOrRef>) {
        self.gml_object_mut().description = description;
    }
}

impl<T: GmlObjectType + ?Sized> HasMetadata for T {
    fn meta_data_property(&self) -> &[MetaDataProperty] {
        &self.gml_object().meta_data_property
    }

    fn meta_data_property_mut(&mut self) -> &mut Vec<MetaDataProperty> {
        &mut self.gml_object_mut().meta_data_property
    }
}

/// Implement [`GmlObjectType`] for structs with an `object: GmlObject` field
macro_rules! impl_gml_object_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::gml::base::GmlObjectType for $ty {
                fn gml_object(&self) -> &$crate::gml::base::GmlObject {
                    &self.object
                }

                fn gml_object_mut(&mut self) -> &mut $crate::gml::base::GmlObject {
                    &mut self.object
                }
            }
        )+
    };
}

pub(crate) use impl_gml_object_type;
