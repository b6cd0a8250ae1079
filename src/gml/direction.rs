//! Directions
//!
//! `gml:DirectionPropertyType` holds one of five direction forms.

use crate::binding::{expect_gml, FromElement, Tagged, ToElement};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::gml::values::{Code, Measure, Reference, StringOrRef, Vector};
use crate::gml::xlink::PropertyAttributes;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `gml:CompassPointEnumeration`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassPoint {
    const ALL: [CompassPoint; 16] = [
        Self::N,
        Self::NNE,
        Self::NE,
        Self::ENE,
        Self::E,
        Self::ESE,
        Self::SE,
        Self::SSE,
        Self::S,
        Self::SSW,
        Self::SW,
        Self::WSW,
        Self::W,
        Self::WNW,
        Self::NW,
        Self::NNW,
    ];

    /// Parse the enumeration value
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.to_string() == text)
            .ok_or_else(|| Error::Value(format!("'{}' is not a compass point", text)))
    }

    /// Bearing in degrees clockwise from north
    pub fn bearing(&self) -> f64 {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0) as f64 * 22.5
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// `gml:DirectionVectorType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DirectionVector {
    /// `gml:vector`
    Vector(Vector),
    /// `gml:horizontalAngle` and `gml:verticalAngle`
    Angles {
        /// Horizontal angle
        horizontal: Measure,
        /// Vertical angle
        vertical: Measure,
    },
}

impl FromElement for DirectionVector {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "DirectionVector")?;
        if let Some(vector) = element.gml_child("vector") {
            return Ok(Self::Vector(Vector::from_content(vector)?));
        }
        match (
            element.gml_child("horizontalAngle"),
            element.gml_child("verticalAngle"),
        ) {
            (Some(h), Some(v)) => Ok(Self::Angles {
                horizontal: Measure::from_content(h)?,
                vertical: Measure::from_content(v)?,
            }),
            _ => Err(DecodeError::new("missing gml:vector or angle pair")
                .with_element(element.qname.to_string())
                .into()),
        }
    }
}

impl ToElement for DirectionVector {
    fn to_element(&self) -> Element {
        let element = Element::gml("DirectionVector");
        match self {
            Self::Vector(vector) => element.with_child(vector.to_element_named(QName::gml("vector"))),
            Self::Angles {
                horizontal,
                vertical,
            } => element
                .with_child(horizontal.to_element_named(QName::gml("horizontalAngle")))
                .with_child(vertical.to_element_named(QName::gml("verticalAngle"))),
        }
    }
}

/// `gml:DirectionDescriptionType`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionDescription {
    /// `gml:compassPoint`
    pub compass_point: Option<CompassPoint>,
    /// `gml:keyword`
    pub keyword: Option<Code>,
    /// `gml:description`
    pub description: Option<String>,
    /// `gml:reference`
    pub reference: Option<Reference>,
}

impl FromElement for DirectionDescription {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "DirectionDescription")?;
        Ok(Self {
            compass_point: element
                .gml_child("compassPoint")
                .map(|c| CompassPoint::parse(c.text_content()))
                .transpose()?,
            keyword: element.gml_child("keyword").map(Code::from_content),
            description: element
                .gml_child("description")
                .map(|d| d.text_content().to_string()),
            reference: element
                .gml_child("reference")
                .map(Reference::from_content)
                .transpose()?,
        })
    }
}

impl ToElement for DirectionDescription {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("DirectionDescription");
        if let Some(point) = self.compass_point {
            element.add_child(Element::gml("compassPoint").with_text(point.to_string()));
        }
        if let Some(keyword) = &self.keyword {
            element.add_child(keyword.to_element_named(QName::gml("keyword")));
        }
        if let Some(description) = &self.description {
            element.add_child(Element::gml("description").with_text(description.clone()));
        }
        if let Some(reference) = &self.reference {
            element.add_child(reference.to_element_named(QName::gml("reference")));
        }
        element
    }
}

/// The direction forms a direction property may hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    /// `gml:DirectionVector`
    Vector(DirectionVector),
    /// `gml:DirectionDescription`
    Description(DirectionDescription),
    /// `gml:CompassPoint`
    CompassPoint(CompassPoint),
    /// `gml:DirectionKeyword`
    Keyword(Code),
    /// `gml:DirectionString`
    String(StringOrRef),
}

impl Tagged for Direction {
    fn element_name(&self) -> QName {
        QName::gml(match self {
            Self::Vector(_) => "DirectionVector",
            Self::Description(_) => "DirectionDescription",
            Self::CompassPoint(_) => "CompassPoint",
            Self::Keyword(_) => "DirectionKeyword",
            Self::String(_) => "DirectionString",
        })
    }
}

impl FromElement for Direction {
    fn from_element(element: &Element) -> Result<Self> {
        let qname = &element.qname;
        if qname.is_gml("DirectionVector") {
            Ok(Self::Vector(DirectionVector::from_element(element)?))
        } else if qname.is_gml("DirectionDescription") {
            Ok(Self::Description(DirectionDescription::from_element(element)?))
        } else if qname.is_gml("CompassPoint") {
            Ok(Self::CompassPoint(CompassPoint::parse(element.text_content())?))
        } else if qname.is_gml("DirectionKeyword") {
            Ok(Self::Keyword(Code::from_content(element)))
        } else if qname.is_gml("DirectionString") {
            Ok(Self::String(StringOrRef::from_content(element)))
        } else {
            Err(Error::unsupported_variant("Direction", qname.to_string()))
        }
    }
}

impl ToElement for Direction {
    fn to_element(&self) -> Element {
        let name = self.element_name();
        match self {
            Self::Vector(vector) => vector.to_element(),
            Self::Description(description) => description.to_element(),
            Self::CompassPoint(point) => Element::new(name).with_text(point.to_string()),
            Self::Keyword(code) => code.to_element_named(name),
            Self::String(text) => text.to_element_named(name),
        }
    }
}

/// `gml:DirectionPropertyType`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionProperty {
    /// The held direction
    pub direction: Option<Direction>,
    /// Reference and nil attributes
    pub attributes: PropertyAttributes,
}

impl DirectionProperty {
    /// A property holding `direction`
    pub fn new(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            attributes: PropertyAttributes::default(),
        }
    }

    /// `xlink:type`, `simple` when unset
    pub fn link_type(&self) -> &str {
        self.attributes.xlink.link_type()
    }

    /// Decode the content of `gml:direction`
    pub fn from_content(element: &Element) -> Result<Self> {
        Ok(Self {
            direction: element.first_child().map(Direction::from_element).transpose()?,
            attributes: PropertyAttributes::from_attributes(element)?,
        })
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name);
        self.attributes.write_attributes(&mut element);
        if let Some(direction) = &self.direction {
            element.add_child(direction.to_element());
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    fn parse(xml: &str) -> Element {
        Document::from_string(xml).unwrap().into_root().unwrap()
    }

    #[test]
    fn test_link_type_default() {
        assert_eq!(DirectionProperty::default().link_type(), "simple");
    }

    #[test]
    fn test_compass_point() {
        assert_eq!(CompassPoint::parse("ENE").unwrap(), CompassPoint::ENE);
        assert_eq!(CompassPoint::E.bearing(), 90.0);
        assert_eq!(CompassPoint::NNW.bearing(), 337.5);
        assert!(CompassPoint::parse("north").is_err());
    }

    #[test]
    fn test_each_form() {
        let forms = [
            r#"<gml:direction xmlns:gml="http://www.opengis.net/gml/3.2"><gml:CompassPoint>SW</gml:CompassPoint></gml:direction>"#,
            r#"<gml:direction xmlns:gml="http://www.opengis.net/gml/3.2"><gml:DirectionKeyword codeSpace="urn:k">uphill</gml:DirectionKeyword></gml:direction>"#,
            r#"<gml:direction xmlns:gml="http://www.opengis.net/gml/3.2"><gml:DirectionString>towards the river</gml:DirectionString></gml:direction>"#,
            r#"<gml:direction xmlns:gml="http://www.opengis.net/gml/3.2"><gml:DirectionVector><gml:vector>1 0 0</gml:vector></gml:DirectionVector></gml:direction>"#,
            r#"<gml:direction xmlns:gml="http://www.opengis.net/gml/3.2"><gml:DirectionVector><gml:horizontalAngle uom="deg">45</gml:horizontalAngle><gml:verticalAngle uom="deg">0</gml:verticalAngle></gml:DirectionVector></gml:direction>"#,
            r#"<gml:direction xmlns:gml="http://www.opengis.net/gml/3.2"><gml:DirectionDescription><gml:compassPoint>N</gml:compassPoint><gml:description>due north</gml:description></gml:DirectionDescription></gml:direction>"#,
        ];
        for xml in forms {
            let element = parse(xml);
            let property = DirectionProperty::from_content(&element).unwrap();
            let direction = property.direction.as_ref().unwrap();
            assert_eq!(direction.element_name(), element.first_child().unwrap().qname);

            let written = property.to_element_named(QName::gml("direction"));
            assert_eq!(DirectionProperty::from_content(&written).unwrap(), property);
        }
    }

    #[test]
    fn test_unknown_form() {
        let element = parse(
            r#"<gml:direction xmlns:gml="http://www.opengis.net/gml/3.2"><gml:Bearing/></gml:direction>"#,
        );
        assert!(matches!(
            DirectionProperty::from_content(&element),
            Err(Error::UnsupportedVariant { group: "Direction", .. })
        ));
    }
}
