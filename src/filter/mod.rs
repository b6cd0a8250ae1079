//! OGC Filter Encoding 1.1.0
//!
//! A [`Filter`] holds one operator from the comparison, spatial, logical or
//! temporal family, or a list of identifiers. Each family is a closed enum
//! decoded by element name in the `ogc` namespace; geometry operands are GML
//! and may use either GML namespace.
//!
//! Filters can be evaluated against any [`FeatureView`], see [`evaluate`].

pub mod comparison;
pub mod evaluate;
pub mod expression;
pub mod id;
pub mod logic;
pub mod node;
pub mod sort;
pub mod spatial;
pub mod temporal;

use crate::binding::FromElement;
use crate::namespaces::QName;

pub use comparison::{
    BinaryComparisonKind, BinaryComparisonOp, ComparisonOp, PropertyIsBetween, PropertyIsLike,
    PropertyIsNull,
};
pub use evaluate::{FeatureView, Predicate, Value};
pub use expression::{Arithmetic, Expression, Function, Literal, PropertyName};
pub use id::{FeatureId, GmlObjectId, ObjectId};
pub use logic::{BinaryLogicOp, LogicOp, LogicOperand, UnaryLogicOp};
pub use node::{Filter, FilterOperator};
pub use sort::{SortBy, SortOrder, SortProperty};
pub use spatial::{
    BBox, BinarySpatialKind, BinarySpatialOp, Distance, DistanceBufferKind, DistanceBufferOp,
    SpatialOp, SpatialOperand,
};
pub use temporal::{BinaryTemporalOp, TemporalKind};

/// A closed family of filter operators
pub(crate) trait OperatorFamily: FromElement {
    /// Whether `name` is one of the family's elements
    fn is_member(name: &QName) -> bool;
}
