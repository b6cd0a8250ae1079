//! GML value types
//!
//! Leaf types carrying a textual or numeric payload plus a few optional
//! attributes. Optional attributes with a documented default keep their
//! backing `Option` so an explicit value survives a round-trip; the accessor
//! applies the default.

use crate::binding::{
    format_f64_list, optional_parsed_attribute, parse_f64_list, parse_value, required_attribute,
    FromElement, ToElement,
};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::gml::xlink::XLink;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};

/// `gml:CodeType`: a term, optionally qualified by a code space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    /// The term
    pub value: String,
    /// Dictionary the term comes from
    pub code_space: Option<String>,
}

impl Code {
    /// A code without a code space
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            code_space: None,
        }
    }

    /// Decode the content of any element typed `gml:CodeType`
    pub fn from_content(element: &Element) -> Self {
        Self {
            value: element.text_content().to_string(),
            code_space: element.get_attribute("codeSpace").map(str::to_string),
        }
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name).with_text(self.value.clone());
        element.set_optional_attribute(QName::local("codeSpace"), self.code_space.as_ref());
        element
    }
}

/// `gml:CodeWithAuthorityType`: a code whose code space is mandatory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeWithAuthority {
    /// The term
    pub value: String,
    /// Authority the code is registered with
    pub code_space: String,
}

impl CodeWithAuthority {
    /// Decode the content of `gml:identifier` and similar elements
    pub fn from_content(element: &Element) -> Result<Self> {
        Ok(Self {
            value: element.text_content().to_string(),
            code_space: required_attribute(element, "codeSpace")?.to_string(),
        })
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        Element::new(name)
            .with_attribute(QName::local("codeSpace"), self.code_space.clone())
            .with_text(self.value.clone())
    }
}

/// `gml:CodeListType`: whitespace separated terms sharing a code space
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeList {
    /// The terms
    pub values: Vec<String>,
    /// Dictionary the terms come from
    pub code_space: Option<String>,
}

impl CodeList {
    /// Decode the content of any element typed `gml:CodeListType`
    pub fn from_content(element: &Element) -> Self {
        Self {
            values: element
                .text_content()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            code_space: element.get_attribute("codeSpace").map(str::to_string),
        }
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name).with_text(self.values.join(" "));
        element.set_optional_attribute(QName::local("codeSpace"), self.code_space.as_ref());
        element
    }
}

/// `gml:MeasureType`: a quantity with its unit of measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// The amount
    pub value: f64,
    /// Unit of measure reference
    pub uom: String,
}

impl Measure {
    /// A measure of `value` in `uom`
    pub fn new(value: f64, uom: impl Into<String>) -> Self {
        Self {
            value,
            uom: uom.into(),
        }
    }

    /// Decode the content of any element typed `gml:MeasureType`
    pub fn from_content(element: &Element) -> Result<Self> {
        Ok(Self {
            value: parse_value(element.text_content(), element)?,
            uom: required_attribute(element, "uom")?.to_string(),
        })
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        Element::new(name)
            .with_attribute(QName::local("uom"), self.uom.clone())
            .with_text(self.value.to_string())
    }
}

/// `gml:StringOrRefType`: text or a link to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringOrRef {
    /// The text
    pub value: String,
    /// Optional link to the text
    pub xlink: XLink,
}

impl StringOrRef {
    /// Plain text
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            xlink: XLink::default(),
        }
    }

    /// Decode the content of `gml:description` and similar elements
    pub fn from_content(element: &Element) -> Self {
        Self {
            value: element.text_content().to_string(),
            xlink: XLink::from_attributes(element),
        }
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name);
        self.xlink.write_attributes(&mut element);
        if !self.value.is_empty() {
            element.set_text(self.value.clone());
        }
        element
    }
}

/// `gml:ReferenceType`: a by-reference-only property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Link attributes
    pub attributes: crate::gml::xlink::PropertyAttributes,
}

impl Reference {
    /// A reference to `href`
    pub fn to(href: impl Into<String>) -> Self {
        Self {
            attributes: crate::gml::xlink::PropertyAttributes {
                xlink: XLink::href(href),
                ..Default::default()
            },
        }
    }

    /// Decode the attributes of a reference element
    pub fn from_content(element: &Element) -> Result<Self> {
        Ok(Self {
            attributes: crate::gml::xlink::PropertyAttributes::from_attributes(element)?,
        })
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name);
        self.attributes.write_attributes(&mut element);
        element
    }
}

/// `gml:metaDataProperty`; the metadata content itself is kept opaque
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaDataProperty {
    /// `about` attribute
    pub about: Option<String>,
    /// Link attributes
    pub xlink: XLink,
    /// Inline metadata element
    pub content: Option<Element>,
}

impl FromElement for MetaDataProperty {
    fn from_element(element: &Element) -> Result<Self> {
        Ok(Self {
            about: element.get_attribute("about").map(str::to_string),
            xlink: XLink::from_attributes(element),
            content: element.first_child().cloned(),
        })
    }
}

impl ToElement for MetaDataProperty {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("metaDataProperty");
        element.set_optional_attribute(QName::local("about"), self.about.as_ref());
        self.xlink.write_attributes(&mut element);
        if let Some(content) = &self.content {
            element.add_child(content.clone());
        }
        element
    }
}

/// `gml:SRSReferenceGroup` plus `gml:SRSInformationGroup`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrsReference {
    /// CRS name, usually a URN; passed through unresolved
    pub srs_name: Option<String>,
    /// Coordinate dimension
    pub srs_dimension: Option<usize>,
    /// Axis labels, in axis order
    pub axis_labels: Vec<String>,
    /// Units of measure, in axis order
    pub uom_labels: Vec<String>,
}

impl SrsReference {
    /// A reference to the CRS `srs_name`
    pub fn named(srs_name: impl Into<String>) -> Self {
        Self {
            srs_name: Some(srs_name.into()),
            ..Self::default()
        }
    }

    /// Whether no attribute is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Read the attribute group from an element
    pub fn from_attributes(element: &Element) -> Result<Self> {
        let labels = |name: &str| -> Vec<String> {
            element
                .get_attribute(name)
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default()
        };
        Ok(Self {
            srs_name: element.get_attribute("srsName").map(str::to_string),
            srs_dimension: optional_parsed_attribute(element, "srsDimension")?,
            axis_labels: labels("axisLabels"),
            uom_labels: labels("uomLabels"),
        })
    }

    /// Write the attribute group onto an element
    pub fn write_attributes(&self, element: &mut Element) {
        element.set_optional_attribute(QName::local("srsName"), self.srs_name.as_ref());
        element.set_optional_attribute(QName::local("srsDimension"), self.srs_dimension);
        if !self.axis_labels.is_empty() {
            element.set_attribute(QName::local("axisLabels"), self.axis_labels.join(" "));
        }
        if !self.uom_labels.is_empty() {
            element.set_attribute(QName::local("uomLabels"), self.uom_labels.join(" "));
        }
    }
}

/// `gml:DirectPositionType`: one coordinate tuple
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectPosition {
    /// Ordinates, in axis order
    pub values: Vec<f64>,
    /// Optional per-position CRS
    pub srs: SrsReference,
}

impl DirectPosition {
    /// A position with the given ordinates
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            srs: SrsReference::default(),
        }
    }

    /// Number of ordinates
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Decode the content of `gml:pos`, `gml:lowerCorner` and similar
    pub fn from_content(element: &Element) -> Result<Self> {
        Ok(Self {
            values: parse_f64_list(element.text_content())?,
            srs: SrsReference::from_attributes(element)?,
        })
    }

    /// Encode as the element `name`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name).with_text(format_f64_list(&self.values));
        self.srs.write_attributes(&mut element);
        element
    }
}

impl FromElement for DirectPosition {
    fn from_element(element: &Element) -> Result<Self> {
        Self::from_content(element)
    }
}

impl ToElement for DirectPosition {
    fn to_element(&self) -> Element {
        self.to_element_named(QName::gml("pos"))
    }
}

/// `gml:DirectPositionListType`: a flat list of ordinates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectPositionList {
    /// All ordinates, position after position
    pub values: Vec<f64>,
    /// Number of positions, when stated
    pub count: Option<usize>,
    /// Optional CRS of the list
    pub srs: SrsReference,
}

impl DirectPositionList {
    /// A list with the given ordinates
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            count: None,
            srs: SrsReference::default(),
        }
    }

    /// Split into positions of `dimension` ordinates
    pub fn positions(&self, dimension: usize) -> Result<Vec<Vec<f64>>> {
        let dimension = self.srs.srs_dimension.unwrap_or(dimension).max(1);
        if self.values.len() % dimension != 0 {
            return Err(Error::Value(format!(
                "{} ordinates do not divide into positions of dimension {}",
                self.values.len(),
                dimension
            )));
        }
        Ok(self.values.chunks(dimension).map(<[f64]>::to_vec).collect())
    }

    /// Decode the content of `gml:posList`
    pub fn from_content(element: &Element) -> Result<Self> {
        Ok(Self {
            values: parse_f64_list(element.text_content())?,
            count: optional_parsed_attribute(element, "count")?,
            srs: SrsReference::from_attributes(element)?,
        })
    }
}

impl ToElement for DirectPositionList {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("posList").with_text(format_f64_list(&self.values));
        self.srs.write_attributes(&mut element);
        element.set_optional_attribute(QName::local("count"), self.count);
        element
    }
}

/// `gml:CoordinatesType`: tuples written as delimited text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    /// The raw text
    pub value: String,
    /// Decimal separator
    pub decimal: Option<String>,
    /// Coordinate separator
    pub cs: Option<String>,
    /// Tuple separator
    pub ts: Option<String>,
}

impl Coordinates {
    /// Coordinates with default separators
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Decimal separator, `.` when unset
    pub fn decimal(&self) -> &str {
        self.decimal.as_deref().unwrap_or(".")
    }

    /// Coordinate separator, `,` when unset
    pub fn cs(&self) -> &str {
        self.cs.as_deref().unwrap_or(",")
    }

    /// Tuple separator, a space when unset
    pub fn ts(&self) -> &str {
        self.ts.as_deref().unwrap_or(" ")
    }

    /// Tokenize into tuples of doubles using the separators
    ///
    /// An empty `decimal` or `cs` is rejected. An empty `ts` splits on
    /// whitespace.
    pub fn to_positions(&self) -> Result<Vec<Vec<f64>>> {
        if self.decimal().is_empty() || self.cs().is_empty() {
            return Err(Error::Value(
                "gml:coordinates separators must not be empty".to_string(),
            ));
        }
        let ts = self.ts();
        let tuples: Vec<&str> = if ts.trim().is_empty() {
            self.value.split_whitespace().collect()
        } else {
            self.value
                .split(ts)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect()
        };

        tuples
            .into_iter()
            .map(|tuple| {
                tuple
                    .split(self.cs())
                    .map(|ordinate| {
                        let normalized = if self.decimal() == "." {
                            ordinate.trim().to_string()
                        } else {
                            ordinate.trim().replace(self.decimal(), ".")
                        };
                        normalized.parse::<f64>().map_err(|e| {
                            Error::Value(format!("'{}' is not a coordinate: {}", ordinate, e))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect()
    }

    /// Decode the content of `gml:coordinates`
    pub fn from_content(element: &Element) -> Self {
        Self {
            value: element.text_content().to_string(),
            decimal: element.get_attribute("decimal").map(str::to_string),
            cs: element.get_attribute("cs").map(str::to_string),
            ts: element.get_attribute("ts").map(str::to_string),
        }
    }
}

impl ToElement for Coordinates {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("coordinates").with_text(self.value.clone());
        element.set_optional_attribute(QName::local("decimal"), self.decimal.as_ref());
        element.set_optional_attribute(QName::local("cs"), self.cs.as_ref());
        element.set_optional_attribute(QName::local("ts"), self.ts.as_ref());
        element
    }
}

/// `gml:VectorType`: a direction with magnitude, written like a position
pub type Vector = DirectPosition;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_defaults() {
        let coords = Coordinates::default();
        assert_eq!(coords.cs(), ",");
        assert_eq!(coords.ts(), " ");
        assert_eq!(coords.decimal(), ".");
    }

    #[test]
    fn test_coordinates_reject_empty_separators() {
        let no_cs = Coordinates {
            cs: Some(String::new()),
            ..Coordinates::new("1,2 3,4")
        };
        assert!(matches!(no_cs.to_positions(), Err(Error::Value(_))));
        let no_decimal = Coordinates {
            decimal: Some(String::new()),
            ..Coordinates::new("1,2 3,4")
        };
        assert!(matches!(no_decimal.to_positions(), Err(Error::Value(_))));
        let no_ts = Coordinates {
            ts: Some(String::new()),
            ..Coordinates::new("1,2  3,4")
        };
        assert_eq!(no_ts.to_positions().unwrap(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_explicit_default_is_observably_equal() {
        let explicit = Coordinates {
            cs: Some(",".into()),
            ..Coordinates::new("1,2")
        };
        let implicit = Coordinates::new("1,2");
        assert_eq!(explicit.cs(), implicit.cs());
        // presence is still visible to the writer
        assert_ne!(explicit, implicit);
        assert!(explicit.to_element().get_attribute("cs").is_some());
        assert!(implicit.to_element().get_attribute("cs").is_none());
    }

    #[test]
    fn test_coordinates_to_positions() {
        let coords = Coordinates::new("1,2 3.5,4");
        assert_eq!(
            coords.to_positions().unwrap(),
            vec![vec![1.0, 2.0], vec![3.5, 4.0]]
        );

        let custom = Coordinates {
            value: "1;2,5|3;4".into(),
            decimal: Some(",".into()),
            cs: Some(";".into()),
            ts: Some("|".into()),
        };
        assert_eq!(
            custom.to_positions().unwrap(),
            vec![vec![1.0, 2.5], vec![3.0, 4.0]]
        );
        assert!(Coordinates::new("1,x").to_positions().is_err());
    }

    #[test]
    fn test_pos_list_positions() {
        let list = DirectPositionList::new(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(list.positions(2).unwrap().len(), 3);
        assert!(list.positions(4).is_err());

        let mut three_d = list.clone();
        three_d.srs.srs_dimension = Some(3);
        assert_eq!(three_d.positions(2).unwrap().len(), 2);
    }

    #[test]
    fn test_code_element() {
        let code = Code {
            value: "Main Street".into(),
            code_space: Some("urn:names".into()),
        };
        let element = code.to_element_named(QName::gml("name"));
        assert_eq!(Code::from_content(&element), code);
    }

    #[test]
    fn test_measure_requires_uom() {
        let element = Element::gml("distance").with_text("12.5");
        assert!(Measure::from_content(&element).is_err());
        let element = element.with_attribute(QName::local("uom"), "m");
        assert_eq!(Measure::from_content(&element).unwrap(), Measure::new(12.5, "m"));
    }

    #[test]
    fn test_srs_reference_labels() {
        let element = Element::gml("Envelope")
            .with_attribute(QName::local("srsName"), "EPSG:4326")
            .with_attribute(QName::local("axisLabels"), "Y X")
            .with_attribute(QName::local("srsDimension"), "2");
        let srs = SrsReference::from_attributes(&element).unwrap();
        assert_eq!(srs.axis_labels, vec!["Y", "X"]);
        assert_eq!(srs.srs_dimension, Some(2));

        let mut out = Element::gml("Envelope");
        srs.write_attributes(&mut out);
        assert_eq!(out.get_attribute("axisLabels"), Some("Y X"));
    }
}
