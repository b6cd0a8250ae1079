//! Temporal operators
//!
//! The fourteen operators test Allen's interval relations between a time
//! valued property and a `gml:TimeInstant` or `gml:TimePeriod`. An instant is
//! an interval whose ends coincide.

use crate::binding::{required_ogc_child, FromElement, Tagged, ToElement};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::filter::evaluate::{FeatureView, Predicate};
use crate::filter::expression::PropertyName;
use crate::filter::OperatorFamily;
use crate::gml::temporal::TemporalPrimitive;
use crate::namespaces::QName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which interval relation a [`BinaryTemporalOp`] tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum TemporalKind {
    After,
    Before,
    Begins,
    BegunBy,
    TContains,
    During,
    EndedBy,
    Ends,
    TEquals,
    Meets,
    MetBy,
    TOverlaps,
    OverlappedBy,
    AnyInteracts,
}

impl TemporalKind {
    const ALL: [TemporalKind; 14] = [
        Self::After,
        Self::Before,
        Self::Begins,
        Self::BegunBy,
        Self::TContains,
        Self::During,
        Self::EndedBy,
        Self::Ends,
        Self::TEquals,
        Self::Meets,
        Self::MetBy,
        Self::TOverlaps,
        Self::OverlappedBy,
        Self::AnyInteracts,
    ];

    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::After => "After",
            Self::Before => "Before",
            Self::Begins => "Begins",
            Self::BegunBy => "BegunBy",
            Self::TContains => "TContains",
            Self::During => "During",
            Self::EndedBy => "EndedBy",
            Self::Ends => "Ends",
            Self::TEquals => "TEquals",
            Self::Meets => "Meets",
            Self::MetBy => "MetBy",
            Self::TOverlaps => "TOverlaps",
            Self::OverlappedBy => "OverlappedBy",
            Self::AnyInteracts => "AnyInteracts",
        }
    }

    fn from_name(name: &QName) -> Option<Self> {
        Self::ALL.into_iter().find(|k| name.is_ogc(k.local_name()))
    }

    /// Whether interval `x` stands in this relation to interval `y`
    pub fn holds(
        &self,
        (x1, x2): (DateTime<Utc>, DateTime<Utc>),
        (y1, y2): (DateTime<Utc>, DateTime<Utc>),
    ) -> bool {
        match self {
            Self::After => x1 > y2,
            Self::Before => x2 < y1,
            Self::Begins => x1 == y1 && x2 < y2,
            Self::BegunBy => x1 == y1 && x2 > y2,
            Self::TContains => x1 < y1 && x2 > y2,
            Self::During => x1 > y1 && x2 < y2,
            Self::EndedBy => x2 == y2 && x1 < y1,
            Self::Ends => x2 == y2 && x1 > y1,
            Self::TEquals => x1 == y1 && x2 == y2,
            Self::Meets => x2 == y1,
            Self::MetBy => x1 == y2,
            Self::TOverlaps => x1 < y1 && y1 < x2 && x2 < y2,
            Self::OverlappedBy => y1 < x1 && x1 < y2 && y2 < x2,
            Self::AnyInteracts => x1 <= y2 && x2 >= y1,
        }
    }
}

/// A temporal operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryTemporalOp {
    /// The relation tested
    pub kind: TemporalKind,
    /// The time valued property of the feature
    pub property: PropertyName,
    /// The instant or period compared with
    pub operand: TemporalPrimitive,
}

impl BinaryTemporalOp {
    /// Test `property` against `operand`
    pub fn new(kind: TemporalKind, property: PropertyName, operand: impl Into<TemporalPrimitive>) -> Self {
        Self {
            kind,
            property,
            operand: operand.into(),
        }
    }
}

impl OperatorFamily for BinaryTemporalOp {
    fn is_member(name: &QName) -> bool {
        TemporalKind::from_name(name).is_some()
    }
}

impl Tagged for BinaryTemporalOp {
    fn element_name(&self) -> QName {
        QName::ogc(self.kind.local_name())
    }
}

impl FromElement for BinaryTemporalOp {
    fn from_element(element: &Element) -> Result<Self> {
        let kind = TemporalKind::from_name(&element.qname).ok_or_else(|| {
            Error::unsupported_variant("temporalOps", element.qname.to_string())
        })?;
        let operand = element
            .children
            .iter()
            .find(|c| c.qname.in_gml())
            .ok_or_else(|| {
                Error::from(
                    DecodeError::new("missing time primitive")
                        .with_element(element.qname.to_string()),
                )
            })?;
        Ok(Self {
            kind,
            property: PropertyName::from_element(required_ogc_child(element, "PropertyName")?)?,
            operand: TemporalPrimitive::from_element(operand)?,
        })
    }
}

impl ToElement for BinaryTemporalOp {
    fn to_element(&self) -> Element {
        Element::new(self.element_name())
            .with_child(self.property.to_element())
            .with_child(self.operand.to_element())
    }
}

impl Predicate for BinaryTemporalOp {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        let Some(value) = self.property.evaluate(feature)? else {
            return Ok(false);
        };
        match value.interval()? {
            Some(interval) => Ok(self.kind.holds(interval, self.operand.interval()?)),
            None => Ok(false),
        }
    }
}
