//! Spatial operators
//!
//! Each operator accepts a fixed set of geometry operands. `BBOX` takes an
//! envelope only and `DWithin`/`Beyond` a geometry only; handing them
//! anything else is an [`Error::MalformedGeometry`].

use crate::binding::{parse_value, required_attribute, required_ogc_child, FromElement, Tagged, ToElement};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::filter::evaluate::{FeatureView, Predicate};
use crate::filter::expression::PropertyName;
use crate::filter::OperatorFamily;
use crate::gml::envelope::Envelope;
use crate::gml::geometry::Geometry;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};

/// A geometry or an envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpatialOperand {
    /// A member of `gml:AbstractGeometry`
    Geometry(Geometry),
    /// `gml:Envelope`
    Envelope(Envelope),
}

impl Tagged for SpatialOperand {
    fn element_name(&self) -> QName {
        match self {
            Self::Geometry(geometry) => geometry.element_name(),
            Self::Envelope(_) => QName::gml("Envelope"),
        }
    }
}

impl FromElement for SpatialOperand {
    fn from_element(element: &Element) -> Result<Self> {
        if element.qname.is_gml("Envelope") {
            Ok(Self::Envelope(Envelope::from_element(element)?))
        } else {
            Ok(Self::Geometry(Geometry::from_element(element)?))
        }
    }
}

impl ToElement for SpatialOperand {
    fn to_element(&self) -> Element {
        match self {
            Self::Geometry(geometry) => geometry.to_element(),
            Self::Envelope(envelope) => envelope.to_element(),
        }
    }
}

impl From<Geometry> for SpatialOperand {
    fn from(value: Geometry) -> Self {
        Self::Geometry(value)
    }
}

impl From<Envelope> for SpatialOperand {
    fn from(value: Envelope) -> Self {
        Self::Envelope(value)
    }
}

/// The GML operand of a spatial operator element
fn operand_element(element: &Element) -> Result<&Element> {
    element
        .children
        .iter()
        .find(|c| c.qname.in_gml())
        .ok_or_else(|| {
            DecodeError::new("missing geometry operand")
                .with_element(element.qname.to_string())
                .into()
        })
}

fn malformed(operator: &str, found: QName) -> Error {
    Error::MalformedGeometry {
        operator: format!("ogc:{}", operator),
        found: found.to_string(),
    }
}

/// Which topological relation a [`BinarySpatialOp`] tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BinarySpatialKind {
    Equals,
    Disjoint,
    Touches,
    Within,
    Overlaps,
    Crosses,
    Intersects,
    Contains,
}

impl BinarySpatialKind {
    const ALL: [BinarySpatialKind; 8] = [
        Self::Equals,
        Self::Disjoint,
        Self::Touches,
        Self::Within,
        Self::Overlaps,
        Self::Crosses,
        Self::Intersects,
        Self::Contains,
    ];

    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::Disjoint => "Disjoint",
            Self::Touches => "Touches",
            Self::Within => "Within",
            Self::Overlaps => "Overlaps",
            Self::Crosses => "Crosses",
            Self::Intersects => "Intersects",
            Self::Contains => "Contains",
        }
    }

    fn from_name(name: &QName) -> Option<Self> {
        Self::ALL.into_iter().find(|k| name.is_ogc(k.local_name()))
    }
}

/// `ogc:BinarySpatialOpType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinarySpatialOp {
    /// The relation tested
    pub kind: BinarySpatialKind,
    /// The geometry property of the feature
    pub property: PropertyName,
    /// The geometry or envelope compared with
    pub operand: SpatialOperand,
}

impl BinarySpatialOp {
    fn decode(kind: BinarySpatialKind, element: &Element) -> Result<Self> {
        Ok(Self {
            kind,
            property: PropertyName::from_element(required_ogc_child(element, "PropertyName")?)?,
            operand: SpatialOperand::from_element(operand_element(element)?)?,
        })
    }
}

impl ToElement for BinarySpatialOp {
    fn to_element(&self) -> Element {
        Element::ogc(self.kind.local_name())
            .with_child(self.property.to_element())
            .with_child(self.operand.to_element())
    }
}

/// `DWithin` or `Beyond`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum DistanceBufferKind {
    DWithin,
    Beyond,
}

impl DistanceBufferKind {
    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::DWithin => "DWithin",
            Self::Beyond => "Beyond",
        }
    }
}

/// `ogc:Distance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    /// The distance
    pub value: f64,
    /// `units`
    pub units: String,
}

/// `ogc:DistanceBufferType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceBufferOp {
    /// `DWithin` or `Beyond`
    pub kind: DistanceBufferKind,
    /// The geometry property of the feature
    pub property: PropertyName,
    /// The geometry measured from
    pub geometry: Geometry,
    /// The buffer distance
    pub distance: Distance,
}

impl DistanceBufferOp {
    /// Build the operator; an envelope operand is refused
    pub fn new(
        kind: DistanceBufferKind,
        property: PropertyName,
        operand: impl Into<SpatialOperand>,
        distance: Distance,
    ) -> Result<Self> {
        match operand.into() {
            SpatialOperand::Geometry(geometry) => Ok(Self {
                kind,
                property,
                geometry,
                distance,
            }),
            other => Err(malformed(kind.local_name(), other.element_name())),
        }
    }

    fn decode(kind: DistanceBufferKind, element: &Element) -> Result<Self> {
        let distance = required_ogc_child(element, "Distance")?;
        Self::new(
            kind,
            PropertyName::from_element(required_ogc_child(element, "PropertyName")?)?,
            SpatialOperand::from_element(operand_element(element)?)?,
            Distance {
                value: parse_value(distance.text_content(), distance)?,
                units: required_attribute(distance, "units")?.to_string(),
            },
        )
    }
}

impl ToElement for DistanceBufferOp {
    fn to_element(&self) -> Element {
        Element::ogc(self.kind.local_name())
            .with_child(self.property.to_element())
            .with_child(self.geometry.to_element())
            .with_child(
                Element::ogc("Distance")
                    .with_attribute(QName::local("units"), &self.distance.units)
                    .with_text(self.distance.value.to_string()),
            )
    }
}

/// `ogc:BBOX`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// The geometry property, the default geometry when absent
    pub property: Option<PropertyName>,
    /// The box
    pub envelope: Envelope,
}

impl BBox {
    /// Build the operator; a geometry operand is refused
    pub fn new(property: Option<PropertyName>, operand: impl Into<SpatialOperand>) -> Result<Self> {
        match operand.into() {
            SpatialOperand::Envelope(envelope) => Ok(Self { property, envelope }),
            other => Err(malformed("BBOX", other.element_name())),
        }
    }
}

impl FromElement for BBox {
    fn from_element(element: &Element) -> Result<Self> {
        let operand = operand_element(element)?;
        if !operand.qname.is_gml("Envelope") {
            return Err(malformed("BBOX", operand.qname.clone()));
        }
        Ok(Self {
            property: element
                .ogc_child("PropertyName")
                .map(PropertyName::from_element)
                .transpose()?,
            envelope: Envelope::from_element(operand)?,
        })
    }
}

impl ToElement for BBox {
    fn to_element(&self) -> Element {
        let mut element = Element::ogc("BBOX");
        if let Some(property) = &self.property {
            element.add_child(property.to_element());
        }
        element.with_child(self.envelope.to_element())
    }
}

impl Predicate for BBox {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        let Some(query) = self.envelope.bounds()? else {
            return Err(Error::Value("BBOX envelope has no corners".into()));
        };
        let bounds = match &self.property {
            Some(property) => match property.evaluate(feature)? {
                Some(value) => value.bounds()?,
                None => None,
            },
            None => feature.bounds()?,
        };
        Ok(bounds.is_some_and(|b| b.intersects(&query)))
    }
}

/// The `ogc:spatialOps` substitution group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpatialOp {
    /// One of the eight topological relations
    Binary(BinarySpatialOp),
    /// `DWithin` or `Beyond`
    DistanceBuffer(DistanceBufferOp),
    /// `BBOX`
    BBox(BBox),
}

impl OperatorFamily for SpatialOp {
    fn is_member(name: &QName) -> bool {
        BinarySpatialKind::from_name(name).is_some()
            || name.is_ogc("DWithin")
            || name.is_ogc("Beyond")
            || name.is_ogc("BBOX")
    }
}

impl Tagged for SpatialOp {
    fn element_name(&self) -> QName {
        QName::ogc(match self {
            Self::Binary(op) => op.kind.local_name(),
            Self::DistanceBuffer(op) => op.kind.local_name(),
            Self::BBox(_) => "BBOX",
        })
    }
}

impl FromElement for SpatialOp {
    fn from_element(element: &Element) -> Result<Self> {
        let qname = &element.qname;
        if let Some(kind) = BinarySpatialKind::from_name(qname) {
            Ok(Self::Binary(BinarySpatialOp::decode(kind, element)?))
        } else if qname.is_ogc("DWithin") {
            Ok(Self::DistanceBuffer(DistanceBufferOp::decode(
                DistanceBufferKind::DWithin,
                element,
            )?))
        } else if qname.is_ogc("Beyond") {
            Ok(Self::DistanceBuffer(DistanceBufferOp::decode(
                DistanceBufferKind::Beyond,
                element,
            )?))
        } else if qname.is_ogc("BBOX") {
            Ok(Self::BBox(BBox::from_element(element)?))
        } else {
            Err(Error::unsupported_variant("spatialOps", qname.to_string()))
        }
    }
}

impl ToElement for SpatialOp {
    fn to_element(&self) -> Element {
        match self {
            Self::Binary(op) => op.to_element(),
            Self::DistanceBuffer(op) => op.to_element(),
            Self::BBox(op) => op.to_element(),
        }
    }
}

impl Predicate for SpatialOp {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        match self {
            Self::BBox(op) => op.evaluate(feature),
            other => Err(Error::Unsupported(format!(
                "evaluating {}",
                other.element_name()
            ))),
        }
    }
}

impl From<BinarySpatialOp> for SpatialOp {
    fn from(value: BinarySpatialOp) -> Self {
        Self::Binary(value)
    }
}

impl From<DistanceBufferOp> for SpatialOp {
    fn from(value: DistanceBufferOp) -> Self {
        Self::DistanceBuffer(value)
    }
}

impl From<BBox> for SpatialOp {
    fn from(value: BBox) -> Self {
        Self::BBox(value)
    }
}
