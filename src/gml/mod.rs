//! GML 3.2.1 bindings
//!
//! Types mirror the schema types of the same name. Every type decodes from
//! and encodes to one element through [`FromElement`](crate::binding::FromElement)
//! and [`ToElement`](crate::binding::ToElement); GML 3.1 input is accepted,
//! output is always GML 3.2.

pub mod base;
pub mod direction;
pub mod envelope;
pub mod feature;
pub mod geometry;
pub mod grid;
pub mod temporal;
pub mod values;
pub mod xlink;

pub use base::{
    GmlObject, GmlObjectType, HasDescription, HasIdentifier, HasMetadata, HasName,
    IdentifiedObject,
};
pub use direction::{CompassPoint, Direction, DirectionProperty};
pub use envelope::{BoundingShape, Bounds, Envelope};
pub use feature::{Feature, FeatureCollection, FeatureProperty};
pub use geometry::{Geometry, GeometryProperty};
pub use grid::{Grid, GridEnvelope, RectifiedGrid};
pub use temporal::{TemporalPrimitive, TimeBound, TimeInstant, TimePeriod, TimePosition};
pub use values::{Code, Coordinates, DirectPosition, DirectPositionList, Measure, SrsReference};
pub use xlink::{Property, PropertyAttributes, XLink};
