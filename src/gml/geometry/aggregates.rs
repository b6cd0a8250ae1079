//! Geometric aggregates
//!
//! Every aggregate lists its members either one per `gml:xxxMember` property
//! or all together inside a single `gml:xxxMembers` array. Both forms are
//! kept apart so a document writes back the way it was read.

use super::{
    decode_header, encode_header, CollectPositions, CurveKind, Geometry, Point, Solid,
    SurfaceKind,
};
use crate::binding::{expect_gml, FromElement, ToElement};
use crate::documents::Element;
use crate::error::Result;
use crate::gml::base::{impl_gml_object_type, GmlObject};
use crate::gml::values::SrsReference;
use crate::gml::xlink::Property;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};

fn decode_members<T: FromElement>(
    element: &Element,
    member: &str,
    members: &str,
) -> Result<(Vec<Property<T>>, Vec<T>)> {
    let single = element
        .gml_children(member)
        .map(Property::from_element)
        .collect::<Result<Vec<_>>>()?;
    let array = match element.gml_child(members) {
        Some(array) => array
            .children
            .iter()
            .map(T::from_element)
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };
    Ok((single, array))
}

fn encode_members<T: ToElement>(
    element: &mut Element,
    member: &str,
    members: &str,
    single: &[Property<T>],
    array: &[T],
) {
    for property in single {
        element.add_child(property.to_element_named(QName::gml(member)));
    }
    if !array.is_empty() {
        let mut wrapper = Element::gml(members);
        for value in array {
            wrapper.add_child(value.to_element());
        }
        element.add_child(wrapper);
    }
}

fn collect_members<T: CollectPositions>(
    single: &[Property<T>],
    array: &[T],
    dimension: usize,
    out: &mut Vec<Vec<f64>>,
) -> Result<()> {
    for property in single {
        property.collect_positions(dimension, out)?;
    }
    for value in array {
        value.collect_positions(dimension, out)?;
    }
    Ok(())
}

/// Declare one aggregate type over a member type
macro_rules! aggregate {
    ($(#[$meta:meta])* $name:ident, $member_ty:ty, $member:literal, $members:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Identity
            pub object: GmlObject,
            /// CRS reference
            pub srs: SrsReference,
            #[doc = concat!("`gml:", $member, "` properties")]
            pub members: Vec<Property<$member_ty>>,
            #[doc = concat!("`gml:", $members, "` content")]
            pub members_array: Vec<$member_ty>,
        }

        impl $name {
            #[doc = concat!("An aggregate with one `gml:", $member, "` per value")]
            pub fn new(values: impl IntoIterator<Item = $member_ty>) -> Self {
                Self {
                    members: values.into_iter().map(Property::inline).collect(),
                    ..Self::default()
                }
            }

            /// Inline members of both forms, in document order
            pub fn iter(&self) -> impl Iterator<Item = &$member_ty> {
                self.members
                    .iter()
                    .filter_map(Property::get)
                    .chain(self.members_array.iter())
            }
        }

        impl FromElement for $name {
            fn from_element(element: &Element) -> Result<Self> {
                expect_gml(element, stringify!($name))?;
                let (object, srs) = decode_header(element)?;
                let (members, members_array) = decode_members(element, $member, $members)?;
                Ok(Self {
                    object,
                    srs,
                    members,
                    members_array,
                })
            }
        }

        impl ToElement for $name {
            fn to_element(&self) -> Element {
                let mut element = encode_header(stringify!($name), &self.object, &self.srs);
                encode_members(
                    &mut element,
                    $member,
                    $members,
                    &self.members,
                    &self.members_array,
                );
                element
            }
        }

        impl CollectPositions for $name {
            fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
                collect_members(
                    &self.members,
                    &self.members_array,
                    self.srs.srs_dimension.unwrap_or(dimension),
                    out,
                )
            }
        }

        impl_gml_object_type!($name);
    };
}

aggregate!(
    /// `gml:MultiPoint`
    MultiPoint, Point, "pointMember", "pointMembers"
);
aggregate!(
    /// `gml:MultiCurve`
    MultiCurve, CurveKind, "curveMember", "curveMembers"
);
aggregate!(
    /// `gml:MultiSurface`
    MultiSurface, SurfaceKind, "surfaceMember", "surfaceMembers"
);
aggregate!(
    /// `gml:MultiSolid`
    MultiSolid, Solid, "solidMember", "solidMembers"
);
aggregate!(
    /// `gml:MultiGeometry`
    MultiGeometry, Geometry, "geometryMember", "geometryMembers"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::decode_str;
    use crate::gml::geometry::{LineString, Polygon};

    #[test]
    fn test_both_member_forms() {
        let xml = r#"<gml:MultiPoint xmlns:gml="http://www.opengis.net/gml/3.2" srsName="EPSG:4326">
            <gml:pointMember><gml:Point><gml:pos>0 0</gml:pos></gml:Point></gml:pointMember>
            <gml:pointMembers>
                <gml:Point><gml:pos>1 1</gml:pos></gml:Point>
                <gml:Point><gml:pos>2 2</gml:pos></gml:Point>
            </gml:pointMembers>
        </gml:MultiPoint>"#;
        let multi: MultiPoint = decode_str(xml).unwrap();
        assert_eq!(multi.members.len(), 1);
        assert_eq!(multi.members_array.len(), 2);
        assert_eq!(multi.iter().count(), 3);

        let written = multi.to_element();
        assert_eq!(written.gml_children("pointMember").count(), 1);
        assert_eq!(written.gml_child("pointMembers").unwrap().children.len(), 2);
        assert_eq!(MultiPoint::from_element(&written).unwrap(), multi);
    }

    #[test]
    fn test_member_outside_group() {
        let xml = r#"<gml:MultiCurve xmlns:gml="http://www.opengis.net/gml/3.2">
            <gml:curveMember><gml:Point><gml:pos>0 0</gml:pos></gml:Point></gml:curveMember>
        </gml:MultiCurve>"#;
        assert!(decode_str::<MultiCurve>(xml).is_err());
    }

    #[test]
    fn test_nested_multi_geometry_bounds() {
        let inner = MultiCurve::new(vec![CurveKind::from(LineString::new(&[
            vec![-1.0, 5.0],
            vec![3.0, 6.0],
        ]))]);
        let outer = MultiGeometry::new(vec![
            Geometry::from(inner),
            Geometry::from(Polygon::new(&[
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ])),
        ]);
        let bounds = Geometry::from(outer).bounds().unwrap().unwrap();
        assert_eq!((bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y), (-1.0, 0.0, 3.0, 6.0));
    }
}
