//! GML geometry model
//!
//! Each substitution group of the geometry schema is a closed Rust enum
//! whose variants are named after the elements they bind. Decoding picks the
//! variant from the element name; an element outside the group is an
//! [`Error::UnsupportedVariant`](crate::error::Error::UnsupportedVariant).
//! Widening a sub-group into [`Geometry`] is `From`; narrowing is `TryFrom`
//! and fails the same way decoding does.

use crate::binding::Tagged;
use crate::documents::Element;
use crate::error::Result;
use crate::gml::base::{GmlObject, GmlObjectType};
use crate::gml::envelope::Bounds;
use crate::gml::values::SrsReference;
use crate::gml::xlink::Property;

/// Declare a variant group enum and its element bindings
macro_rules! variant_group {
    ($(#[$meta:meta])* $vis:vis enum $name:ident : $group:literal { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                #[doc = concat!("`gml:", stringify!($variant), "`")]
                $variant($variant),
            )+
        }

        impl $crate::binding::Tagged for $name {
            fn element_name(&self) -> $crate::namespaces::QName {
                match self {
                    $( Self::$variant(_) => $crate::namespaces::QName::gml(stringify!($variant)), )+
                }
            }
        }

        impl $crate::binding::FromElement for $name {
            fn from_element(element: &$crate::documents::Element) -> $crate::error::Result<Self> {
                $(
                    if element.qname.is_gml(stringify!($variant)) {
                        return Ok(Self::$variant(
                            <$variant as $crate::binding::FromElement>::from_element(element)?,
                        ));
                    }
                )+
                Err($crate::error::Error::unsupported_variant(
                    $group,
                    element.qname.to_string(),
                ))
            }
        }

        impl $crate::binding::ToElement for $name {
            fn to_element(&self) -> $crate::documents::Element {
                match self {
                    $( Self::$variant(value) => $crate::binding::ToElement::to_element(value), )+
                }
            }
        }

        impl CollectPositions for $name {
            fn collect_positions(
                &self,
                dimension: usize,
                out: &mut Vec<Vec<f64>>,
            ) -> $crate::error::Result<()> {
                match self {
                    $( Self::$variant(value) => value.collect_positions(dimension, out), )+
                }
            }
        }

        $(
            impl From<$variant> for $name {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

/// Widen a sub-group into a larger group, and narrow back
macro_rules! narrow_group {
    ($sub:ident : $group:literal within $wide:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$sub> for $wide {
            fn from(value: $sub) -> Self {
                match value {
                    $( $sub::$variant(v) => $wide::$variant(v), )+
                }
            }
        }

        impl TryFrom<$wide> for $sub {
            type Error = $crate::error::Error;

            fn try_from(value: $wide) -> $crate::error::Result<Self> {
                match value {
                    $( $wide::$variant(v) => Ok($sub::$variant(v)), )+
                    other => Err($crate::error::Error::unsupported_variant(
                        $group,
                        other.element_name().to_string(),
                    )),
                }
            }
        }
    };
}

mod aggregates;
mod primitives;

pub use aggregates::{MultiCurve, MultiGeometry, MultiPoint, MultiSolid, MultiSurface};
pub use primitives::{
    ArcString, Curve, LineString, LineStringSegment, LinearRing, OrientableCurve,
    OrientableSurface, Orientation, Point, Polygon, PolygonPatch, PolyhedralSurface, Positions,
    Ring, Shell, Solid, Surface, Triangle,
};

/// Gather every position of a geometry, depth first
pub(crate) trait CollectPositions {
    /// Append positions to `out`; `dimension` splits flat lists lacking their
    /// own `srsDimension`
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()>;
}

impl<T: CollectPositions> CollectPositions for Property<T> {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        match &self.value {
            Some(value) => value.collect_positions(dimension, out),
            None => Ok(()),
        }
    }
}

variant_group! {
    /// The `gml:AbstractGeometry` substitution group
    pub enum Geometry : "AbstractGeometry" {
        Point,
        LineString,
        Curve,
        OrientableCurve,
        LinearRing,
        Ring,
        Polygon,
        Surface,
        OrientableSurface,
        PolyhedralSurface,
        Solid,
        MultiPoint,
        MultiCurve,
        MultiSurface,
        MultiSolid,
        MultiGeometry,
    }
}

variant_group! {
    /// The `gml:AbstractCurve` substitution group
    pub enum CurveKind : "AbstractCurve" {
        LineString,
        Curve,
        OrientableCurve,
    }
}

variant_group! {
    /// The `gml:AbstractSurface` substitution group
    pub enum SurfaceKind : "AbstractSurface" {
        Polygon,
        Surface,
        OrientableSurface,
        PolyhedralSurface,
    }
}

variant_group! {
    /// The `gml:AbstractRing` substitution group
    pub enum RingKind : "AbstractRing" {
        LinearRing,
        Ring,
    }
}

variant_group! {
    /// The `gml:AbstractCurveSegment` substitution group
    pub enum CurveSegment : "AbstractCurveSegment" {
        LineStringSegment,
        ArcString,
    }
}

variant_group! {
    /// The `gml:AbstractSurfacePatch` substitution group
    pub enum SurfacePatch : "AbstractSurfacePatch" {
        PolygonPatch,
        Triangle,
    }
}

narrow_group!(CurveKind : "AbstractCurve" within Geometry { LineString, Curve, OrientableCurve });
narrow_group!(SurfaceKind : "AbstractSurface" within Geometry {
    Polygon,
    Surface,
    OrientableSurface,
    PolyhedralSurface,
});
narrow_group!(RingKind : "AbstractRing" within Geometry { LinearRing, Ring });

/// `gml:GeometryPropertyType`
pub type GeometryProperty = Property<Geometry>;
/// `gml:PointPropertyType`
pub type PointProperty = Property<Point>;
/// `gml:CurvePropertyType`
pub type CurveProperty = Property<CurveKind>;
/// `gml:SurfacePropertyType`
pub type SurfaceProperty = Property<SurfaceKind>;
/// `gml:SolidPropertyType`
pub type SolidProperty = Property<Solid>;

/// Apply `$body` to the struct held by any [`Geometry`] variant
macro_rules! each_geometry {
    ($value:expr, $g:ident => $body:expr) => {
        match $value {
            Geometry::Point($g) => $body,
            Geometry::LineString($g) => $body,
            Geometry::Curve($g) => $body,
            Geometry::OrientableCurve($g) => $body,
            Geometry::LinearRing($g) => $body,
            Geometry::Ring($g) => $body,
            Geometry::Polygon($g) => $body,
            Geometry::Surface($g) => $body,
            Geometry::OrientableSurface($g) => $body,
            Geometry::PolyhedralSurface($g) => $body,
            Geometry::Solid($g) => $body,
            Geometry::MultiPoint($g) => $body,
            Geometry::MultiCurve($g) => $body,
            Geometry::MultiSurface($g) => $body,
            Geometry::MultiSolid($g) => $body,
            Geometry::MultiGeometry($g) => $body,
        }
    };
}

impl Geometry {
    /// The CRS reference of the top-level geometry
    pub fn srs(&self) -> &SrsReference {
        each_geometry!(self, g => &g.srs)
    }

    /// All positions, depth first
    pub fn positions(&self) -> Result<Vec<Vec<f64>>> {
        let mut out = Vec::new();
        self.collect_positions(self.srs().srs_dimension.unwrap_or(2), &mut out)?;
        Ok(out)
    }

    /// The 2D bounding box of every position, `None` when there is none
    ///
    /// By-reference members are not followed.
    pub fn bounds(&self) -> Result<Option<Bounds>> {
        Ok(Bounds::from_positions(&self.positions()?))
    }
}

impl GmlObjectType for Geometry {
    fn gml_object(&self) -> &GmlObject {
        each_geometry!(self, g => &g.object)
    }

    fn gml_object_mut(&mut self) -> &mut GmlObject {
        each_geometry!(self, g => &mut g.object)
    }
}

/// Read the identity block and CRS attributes shared by all geometries
pub(crate) fn decode_header(element: &Element) -> Result<(GmlObject, SrsReference)> {
    Ok((
        GmlObject::decode(element)?,
        SrsReference::from_attributes(element)?,
    ))
}

/// Start a geometry element with its identity block and CRS attributes
pub(crate) fn encode_header(local_name: &str, object: &GmlObject, srs: &SrsReference) -> Element {
    let mut element = Element::gml(local_name);
    object.encode_into(&mut element);
    srs.write_attributes(&mut element);
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{decode_str, FromElement, ToElement};
    use crate::error::Error;
    use crate::gml::base::HasIdentifier;

    fn square() -> Polygon {
        Polygon::new(&[
            vec![0.0, 0.0],
            vec![2.0, 0.0],
            vec![2.0, 3.0],
            vec![0.0, 0.0],
        ])
    }

    fn every_variant() -> Vec<Geometry> {
        vec![
            Point::new(vec![1.0, 2.0]).into(),
            LineString::new(&[vec![0.0, 0.0], vec![1.0, 1.0]]).into(),
            Curve {
                segments: vec![LineStringSegment::default().into()],
                ..Curve::default()
            }
            .into(),
            OrientableCurve {
                orientation: Some(Orientation::Negative),
                base_curve: Box::new(Property::by_reference("#c1")),
                ..OrientableCurve::default()
            }
            .into(),
            LinearRing::new(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 0.0]]).into(),
            Ring::default().into(),
            square().into(),
            Surface {
                patches: vec![Triangle::default().into()],
                ..Surface::default()
            }
            .into(),
            OrientableSurface {
                base_surface: Box::new(Property::inline(square().into())),
                ..OrientableSurface::default()
            }
            .into(),
            PolyhedralSurface::default().into(),
            Solid::default().into(),
            MultiPoint::default().into(),
            MultiCurve::default().into(),
            MultiSurface::default().into(),
            MultiSolid::default().into(),
            MultiGeometry::default().into(),
        ]
    }

    #[test]
    fn test_every_variant_survives_element_roundtrip() {
        for geometry in every_variant() {
            let element = geometry.to_element();
            assert_eq!(element.qname, geometry.element_name());
            let back = Geometry::from_element(&element).unwrap();
            assert_eq!(back, geometry, "{}", geometry.element_name());
        }
    }

    #[test]
    fn test_outside_group_is_rejected() {
        let xml = r#"<gml:Envelope xmlns:gml="http://www.opengis.net/gml/3.2"/>"#;
        match decode_str::<Geometry>(xml).unwrap_err() {
            Error::UnsupportedVariant { group, found } => {
                assert_eq!(group, "AbstractGeometry");
                assert!(found.ends_with("Envelope"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_narrowing() {
        let geometry: Geometry = square().into();
        let surface = SurfaceKind::try_from(geometry.clone()).unwrap();
        assert_eq!(Geometry::from(surface), geometry);

        let err = CurveKind::try_from(geometry).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVariant { group: "AbstractCurve", .. }));
    }

    #[test]
    fn test_assignment_replaces_variant() {
        let mut property: GeometryProperty = Property::inline(Point::new(vec![0.0, 0.0]).into());
        property.set(Some(square().into()));
        assert!(matches!(property.get(), Some(Geometry::Polygon(_))));
    }

    #[test]
    fn test_geometry_bounds() {
        let geometry: Geometry = square().into();
        let bounds = geometry.bounds().unwrap().unwrap();
        assert_eq!((bounds.min_x, bounds.min_y), (0.0, 0.0));
        assert_eq!((bounds.max_x, bounds.max_y), (2.0, 3.0));

        assert!(Geometry::from(Ring::default()).bounds().unwrap().is_none());
    }

    #[test]
    fn test_identity_through_enum() {
        let mut geometry: Geometry = Point::new(vec![0.0, 0.0]).into();
        geometry.set_id(Some("pt".into()));
        assert_eq!(geometry.id(), Some("pt"));
        assert_eq!(geometry.to_element().gml_id(), Some("pt"));
    }
}
