//! Filter evaluation
//!
//! Filters are evaluated against anything implementing [`FeatureView`].
//! Comparison, identifier, logical, temporal and `BBOX` operators are
//! evaluated; the remaining spatial operators and `ogc:Function` need a
//! geometry engine and fail with [`Error::Unsupported`].

use crate::binding::FromElement;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::gml::envelope::{Bounds, Envelope};
use crate::gml::geometry::Geometry;
use crate::gml::temporal::{TemporalPrimitive, TimePosition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A value taken from a feature or a literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Text content
    Text(String),
    /// Result of arithmetic
    Number(f64),
    /// A GML geometry
    Geometry(Box<Geometry>),
    /// A `gml:Envelope`
    Envelope(Envelope),
    /// A `gml:TimeInstant` or `gml:TimePeriod`
    Temporal(TemporalPrimitive),
}

impl Value {
    /// Interpret the content of `element`
    ///
    /// A GML child decodes as an envelope, time primitive or geometry. Any
    /// other child is looked into; an element without children is text.
    pub fn from_content(element: &Element) -> Result<Self> {
        let Some(child) = element.first_child() else {
            return Ok(Self::Text(element.text_content().to_string()));
        };
        let qname = &child.qname;
        if qname.is_gml("Envelope") {
            Ok(Self::Envelope(Envelope::from_element(child)?))
        } else if qname.is_gml("TimeInstant") || qname.is_gml("TimePeriod") {
            Ok(Self::Temporal(TemporalPrimitive::from_element(child)?))
        } else if qname.in_gml() {
            Ok(Self::Geometry(Box::new(Geometry::from_element(child)?)))
        } else {
            Self::from_content(child)
        }
    }

    /// The text of a scalar value
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// The value as a number
    pub fn to_number(&self) -> Result<f64> {
        match self {
            Self::Number(number) => Ok(*number),
            Self::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| Error::Value(format!("'{}' is not a number", text.trim()))),
            other => Err(Error::Value(format!("{} is not a number", other.kind()))),
        }
    }

    /// The 2D box of a geometry or envelope
    pub fn bounds(&self) -> Result<Option<Bounds>> {
        match self {
            Self::Geometry(geometry) => geometry.bounds(),
            Self::Envelope(envelope) => envelope.bounds(),
            _ => Ok(None),
        }
    }

    /// The time interval of a time primitive or an ISO 8601 text
    pub fn interval(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        match self {
            Self::Temporal(primitive) => primitive.interval().map(Some),
            Self::Text(text) if !text.trim().is_empty() => {
                let instant = TimePosition::new(text.trim()).to_datetime()?;
                Ok(Some((instant, instant)))
            }
            _ => Ok(None),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "a number",
            Self::Geometry(_) => "a geometry",
            Self::Envelope(_) => "an envelope",
            Self::Temporal(_) => "a time primitive",
        }
    }
}

/// Order two scalar values
///
/// Both are compared as numbers when both parse as finite numbers, else as
/// text, case-insensitively unless `match_case` is set.
pub(crate) fn compare_values(left: &Value, right: &Value, match_case: bool) -> Result<Ordering> {
    if let (Ok(l), Ok(r)) = (left.to_number(), right.to_number()) {
        if l.is_finite() && r.is_finite() {
            return l
                .partial_cmp(&r)
                .ok_or_else(|| Error::Value(format!("cannot order {} and {}", l, r)));
        }
    }
    match (left.as_text(), right.as_text()) {
        (Some(l), Some(r)) if match_case => Ok(l.cmp(&r)),
        (Some(l), Some(r)) => Ok(l.to_lowercase().cmp(&r.to_lowercase())),
        _ => Err(Error::Value(format!(
            "cannot compare {} with {}",
            left.kind(),
            right.kind()
        ))),
    }
}

/// Read access to a feature for filter evaluation
pub trait FeatureView {
    /// The feature identifier, matched by `ogc:FeatureId` and `ogc:GmlObjectId`
    fn feature_id(&self) -> Option<&str>;

    /// The value at a property path, `None` when absent
    fn property(&self, path: &str) -> Result<Option<Value>>;

    /// Bounds of the default geometry, used by `BBOX` without a property name
    fn bounds(&self) -> Result<Option<Bounds>> {
        Ok(None)
    }
}

/// Something that holds or not for a feature
pub trait Predicate {
    /// Whether `feature` satisfies the predicate
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool>;
}
