//! The `ogc:Filter` node

use crate::binding::{expect_ogc, FromElement, ToElement};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::filter::comparison::ComparisonOp;
use crate::filter::evaluate::{FeatureView, Predicate};
use crate::filter::id::ObjectId;
use crate::filter::logic::LogicOp;
use crate::filter::spatial::SpatialOp;
use crate::filter::temporal::BinaryTemporalOp;
use crate::filter::OperatorFamily;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `ogc:FilterType`
///
/// A filter holds one operator. The four operator families and the identifier
/// list sit in independent slots, so a filter may hold none or several;
/// [`populated_slots`](Filter::populated_slots) tells, and evaluation refuses
/// anything but exactly one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// `ogc:comparisonOps`
    pub comparison: Option<ComparisonOp>,
    /// `ogc:spatialOps`
    pub spatial: Option<SpatialOp>,
    /// `ogc:logicOps`
    pub logic: Option<LogicOp>,
    /// Temporal operator
    pub temporal: Option<BinaryTemporalOp>,
    /// `ogc:_Id` list
    pub ids: Vec<ObjectId>,
}

/// The operator a filter holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOperator<'a> {
    /// A comparison
    Comparison(&'a ComparisonOp),
    /// A spatial operator
    Spatial(&'a SpatialOp),
    /// A logical operator
    Logic(&'a LogicOp),
    /// A temporal operator
    Temporal(&'a BinaryTemporalOp),
    /// Identifiers
    Ids(&'a [ObjectId]),
}

impl Filter {
    /// Number of populated slots, the identifier list counting once
    pub fn populated_slots(&self) -> usize {
        [
            self.comparison.is_some(),
            self.spatial.is_some(),
            self.logic.is_some(),
            self.temporal.is_some(),
            !self.ids.is_empty(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    /// The operator, when exactly one slot is populated
    pub fn operator(&self) -> Option<FilterOperator<'_>> {
        if self.populated_slots() != 1 {
            return None;
        }
        if let Some(op) = &self.comparison {
            Some(FilterOperator::Comparison(op))
        } else if let Some(op) = &self.spatial {
            Some(FilterOperator::Spatial(op))
        } else if let Some(op) = &self.logic {
            Some(FilterOperator::Logic(op))
        } else if let Some(op) = &self.temporal {
            Some(FilterOperator::Temporal(op))
        } else {
            Some(FilterOperator::Ids(&self.ids))
        }
    }

    fn place<T>(slot: &mut Option<T>, value: T, element: &Element) -> Result<()> {
        if slot.is_some() {
            return Err(DecodeError::new("operator family given twice")
                .with_element(element.qname.to_string())
                .into());
        }
        *slot = Some(value);
        Ok(())
    }
}

impl From<ComparisonOp> for Filter {
    fn from(value: ComparisonOp) -> Self {
        Self {
            comparison: Some(value),
            ..Self::default()
        }
    }
}

impl From<SpatialOp> for Filter {
    fn from(value: SpatialOp) -> Self {
        Self {
            spatial: Some(value),
            ..Self::default()
        }
    }
}

impl From<LogicOp> for Filter {
    fn from(value: LogicOp) -> Self {
        Self {
            logic: Some(value),
            ..Self::default()
        }
    }
}

impl From<BinaryTemporalOp> for Filter {
    fn from(value: BinaryTemporalOp) -> Self {
        Self {
            temporal: Some(value),
            ..Self::default()
        }
    }
}

impl From<Vec<ObjectId>> for Filter {
    fn from(ids: Vec<ObjectId>) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }
}

impl FromElement for Filter {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "Filter")?;
        let mut filter = Filter::default();
        for child in &element.children {
            let qname = &child.qname;
            if ComparisonOp::is_member(qname) {
                Self::place(&mut filter.comparison, ComparisonOp::from_element(child)?, child)?;
            } else if SpatialOp::is_member(qname) {
                Self::place(&mut filter.spatial, SpatialOp::from_element(child)?, child)?;
            } else if LogicOp::is_member(qname) {
                Self::place(&mut filter.logic, LogicOp::from_element(child)?, child)?;
            } else if BinaryTemporalOp::is_member(qname) {
                Self::place(&mut filter.temporal, BinaryTemporalOp::from_element(child)?, child)?;
            } else if ObjectId::is_member(qname) {
                filter.ids.push(ObjectId::from_element(child)?);
            } else {
                return Err(Error::unsupported_variant("Filter", qname.to_string()));
            }
        }
        debug!("decoded ogc:Filter with {} populated slots", filter.populated_slots());
        Ok(filter)
    }
}

impl ToElement for Filter {
    fn to_element(&self) -> Element {
        let mut element = Element::ogc("Filter");
        if let Some(op) = &self.comparison {
            element.add_child(op.to_element());
        }
        if let Some(op) = &self.spatial {
            element.add_child(op.to_element());
        }
        if let Some(op) = &self.logic {
            element.add_child(op.to_element());
        }
        if let Some(op) = &self.temporal {
            element.add_child(op.to_element());
        }
        for id in &self.ids {
            element.add_child(id.to_element());
        }
        element
    }
}

impl Predicate for Filter {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        match self.operator() {
            Some(FilterOperator::Comparison(op)) => op.evaluate(feature),
            Some(FilterOperator::Spatial(op)) => op.evaluate(feature),
            Some(FilterOperator::Logic(op)) => op.evaluate(feature),
            Some(FilterOperator::Temporal(op)) => op.evaluate(feature),
            Some(FilterOperator::Ids(ids)) => {
                for id in ids {
                    if id.evaluate(feature)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            None => Err(Error::Value(format!(
                "a filter needs exactly one operator, found {}",
                self.populated_slots()
            ))),
        }
    }
}
