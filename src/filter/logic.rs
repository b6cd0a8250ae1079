//! Logical operators

use crate::binding::{expect_ogc, required_first_child, FromElement, Tagged, ToElement};
use crate::documents::Element;
use crate::error::{DecodeError, Error, Result};
use crate::filter::comparison::ComparisonOp;
use crate::filter::evaluate::{FeatureView, Predicate};
use crate::filter::spatial::SpatialOp;
use crate::filter::temporal::BinaryTemporalOp;
use crate::filter::OperatorFamily;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};

/// An operand of a logical operator
///
/// Temporal operators are accepted here as well as the three families
/// `ogc:BinaryLogicOpType` names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicOperand {
    /// A comparison
    Comparison(ComparisonOp),
    /// A spatial operator
    Spatial(SpatialOp),
    /// A nested logical operator
    Logic(LogicOp),
    /// A temporal operator
    Temporal(BinaryTemporalOp),
}

impl Tagged for LogicOperand {
    fn element_name(&self) -> QName {
        match self {
            Self::Comparison(op) => op.element_name(),
            Self::Spatial(op) => op.element_name(),
            Self::Logic(op) => op.element_name(),
            Self::Temporal(op) => op.element_name(),
        }
    }
}

impl FromElement for LogicOperand {
    fn from_element(element: &Element) -> Result<Self> {
        let qname = &element.qname;
        if ComparisonOp::is_member(qname) {
            Ok(Self::Comparison(ComparisonOp::from_element(element)?))
        } else if SpatialOp::is_member(qname) {
            Ok(Self::Spatial(SpatialOp::from_element(element)?))
        } else if LogicOp::is_member(qname) {
            Ok(Self::Logic(LogicOp::from_element(element)?))
        } else if BinaryTemporalOp::is_member(qname) {
            Ok(Self::Temporal(BinaryTemporalOp::from_element(element)?))
        } else {
            Err(Error::unsupported_variant("logicOps operand", qname.to_string()))
        }
    }
}

impl ToElement for LogicOperand {
    fn to_element(&self) -> Element {
        match self {
            Self::Comparison(op) => op.to_element(),
            Self::Spatial(op) => op.to_element(),
            Self::Logic(op) => op.to_element(),
            Self::Temporal(op) => op.to_element(),
        }
    }
}

impl Predicate for LogicOperand {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        match self {
            Self::Comparison(op) => op.evaluate(feature),
            Self::Spatial(op) => op.evaluate(feature),
            Self::Logic(op) => op.evaluate(feature),
            Self::Temporal(op) => op.evaluate(feature),
        }
    }
}

impl From<ComparisonOp> for LogicOperand {
    fn from(value: ComparisonOp) -> Self {
        Self::Comparison(value)
    }
}

impl From<SpatialOp> for LogicOperand {
    fn from(value: SpatialOp) -> Self {
        Self::Spatial(value)
    }
}

impl From<LogicOp> for LogicOperand {
    fn from(value: LogicOp) -> Self {
        Self::Logic(value)
    }
}

impl From<BinaryTemporalOp> for LogicOperand {
    fn from(value: BinaryTemporalOp) -> Self {
        Self::Temporal(value)
    }
}

/// `ogc:BinaryLogicOpType`, the operands of `And` and `Or`
///
/// The schema asks for at least two operands; fewer are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryLogicOp {
    /// Operands, in document order
    pub operands: Vec<LogicOperand>,
}

impl BinaryLogicOp {
    /// Combine `operands`
    pub fn new(operands: impl IntoIterator<Item = impl Into<LogicOperand>>) -> Self {
        Self {
            operands: operands.into_iter().map(Into::into).collect(),
        }
    }

    fn decode(element: &Element) -> Result<Self> {
        Ok(Self {
            operands: element
                .children
                .iter()
                .map(LogicOperand::from_element)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn encode(&self, local_name: &str) -> Element {
        let mut element = Element::ogc(local_name);
        for operand in &self.operands {
            element.add_child(operand.to_element());
        }
        element
    }
}

/// `ogc:UnaryLogicOpType`, the operand of `Not`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryLogicOp {
    /// The negated operand
    pub operand: Box<LogicOperand>,
}

impl UnaryLogicOp {
    /// Negate `operand`
    pub fn new(operand: impl Into<LogicOperand>) -> Self {
        Self {
            operand: Box::new(operand.into()),
        }
    }
}

impl FromElement for UnaryLogicOp {
    fn from_element(element: &Element) -> Result<Self> {
        expect_ogc(element, "Not")?;
        if element.children.len() > 1 {
            return Err(DecodeError::new("ogc:Not takes one operand")
                .with_element(element.qname.to_string())
                .with_reason(format!("found {}", element.children.len()))
                .into());
        }
        Ok(Self::new(LogicOperand::from_element(required_first_child(element)?)?))
    }
}

impl ToElement for UnaryLogicOp {
    fn to_element(&self) -> Element {
        Element::ogc("Not").with_child(self.operand.to_element())
    }
}

/// The `ogc:logicOps` substitution group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicOp {
    /// `ogc:And`
    And(BinaryLogicOp),
    /// `ogc:Or`
    Or(BinaryLogicOp),
    /// `ogc:Not`
    Not(UnaryLogicOp),
}

impl LogicOp {
    /// `ogc:And` over `operands`
    pub fn and(operands: impl IntoIterator<Item = impl Into<LogicOperand>>) -> Self {
        Self::And(BinaryLogicOp::new(operands))
    }

    /// `ogc:Or` over `operands`
    pub fn or(operands: impl IntoIterator<Item = impl Into<LogicOperand>>) -> Self {
        Self::Or(BinaryLogicOp::new(operands))
    }

    /// `ogc:Not` of `operand`
    pub fn not(operand: impl Into<LogicOperand>) -> Self {
        Self::Not(UnaryLogicOp::new(operand))
    }
}

impl OperatorFamily for LogicOp {
    fn is_member(name: &QName) -> bool {
        name.is_ogc("And") || name.is_ogc("Or") || name.is_ogc("Not")
    }
}

impl Tagged for LogicOp {
    fn element_name(&self) -> QName {
        QName::ogc(match self {
            Self::And(_) => "And",
            Self::Or(_) => "Or",
            Self::Not(_) => "Not",
        })
    }
}

impl FromElement for LogicOp {
    fn from_element(element: &Element) -> Result<Self> {
        let qname = &element.qname;
        if qname.is_ogc("And") {
            Ok(Self::And(BinaryLogicOp::decode(element)?))
        } else if qname.is_ogc("Or") {
            Ok(Self::Or(BinaryLogicOp::decode(element)?))
        } else if qname.is_ogc("Not") {
            Ok(Self::Not(UnaryLogicOp::from_element(element)?))
        } else {
            Err(Error::unsupported_variant("logicOps", qname.to_string()))
        }
    }
}

impl ToElement for LogicOp {
    fn to_element(&self) -> Element {
        match self {
            Self::And(op) => op.encode("And"),
            Self::Or(op) => op.encode("Or"),
            Self::Not(op) => op.to_element(),
        }
    }
}

impl Predicate for LogicOp {
    fn evaluate<F: FeatureView + ?Sized>(&self, feature: &F) -> Result<bool> {
        match self {
            Self::And(op) => {
                for operand in &op.operands {
                    if !operand.evaluate(feature)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(op) => {
                for operand in &op.operands {
                    if operand.evaluate(feature)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not(op) => Ok(!op.operand.evaluate(feature)?),
        }
    }
}
