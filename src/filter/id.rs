//! Identifier operators

use crate::binding::{required_attribute, FromElement, Tagged, ToElement};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::filter::evaluate::{FeatureView, Predicate};
use crate::filter::OperatorFamily;
use crate::names::validate_id;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};

/// `ogc:FeatureId`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureId {
    /// `fid`
    pub fid: String,
}

/// `ogc:GmlObjectId`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmlObjectId {
    /// `gml:id`
    pub id: String,
}

/// The `ogc:_Id` substitution group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectId {
    /// `ogc:FeatureId`
    Feature(FeatureId),
    /// `ogc:GmlObjectId`
    GmlObject(GmlObjectId),
}

impl ObjectId {
    /// `ogc:FeatureId` naming `fid`
    pub fn feature(fid: impl Into<String>) -> Self {
        Self::Feature(FeatureId { fid: fid.into() })
    }

    /// `ogc:GmlObjectId` naming `id`
    pub fn gml_object(id: impl Into<String>) -> Self {
        Self::GmlObject(GmlObjectId { id: id.into() })
    }

    /// The identifier value
    pub fn id(&self) -> &str {
        match self {
            Self::Feature(id) => &id.fid,
            Self::GmlObject(id) => &id.id,
        }
    }
}

impl OperatorFamily for ObjectId {
    fn is_member(name: &QName) -> bool {
        name.is_ogc("FeatureId") || name.is_ogc("GmlObjectId")
    }
}

impl Tagged for ObjectId {
    fn element_name(&self) -> QName {
        QName::ogc(match self {
            Self::Feature(_) => "FeatureId",
            Self::GmlObject(_) => "GmlObjectId",
        })
    }
}

impl FromElement for ObjectId {
    fn from_element(element: &Element) -> Result<Self> {
        let qname = &element.qname;
        if qname.is_ogc("FeatureId") {
            Ok(Self::feature(required_attribute(element, "fid")?))
        } else if qname.is_ogc("GmlObjectId") {
            let id = element.gml_id().ok_or_else(|| {
                Error::from(
                    DecodeError::new("missing attribute gml:id")
                        .with_element(qname.to_string()),
                )
            })?;
            validate_id(id)?;
            Ok(Self::gml_object(id))
        } else {
            Err(Error::unsupported_variant("_Id", qname.to_string()))
        }
    }
}

impl ToElement for ObjectId {
    fn to_element(&self) -> Element {
        match self {
            Self::Feature(id) => {
                Element::ogc("FeatureId").with_attribute(QName::local("fid"), &id.fid)
            }
            Self::GmlObject(id) => {
                Element::ogc("GmlObjectId").with_attribute(QName::gml("id"), &id.id)
            }
        }
    }
}

impl Predicate for ObjectId {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        Ok(feature.feature_id() == Some(self.id()))
    }
}
