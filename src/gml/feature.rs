//! Features and feature collections
//!
//! Features belong to application schemas this crate knows nothing about, so
//! a [`Feature`] keeps its own element name and its property elements as
//! read. Geometry, envelope and time values are decoded on demand when a
//! filter asks for them.

use crate::binding::{FromElement, ToElement};
use crate::documents::Element;
use crate::error::Result;
use crate::filter::{FeatureView, Value};
use crate::gml::base::{impl_gml_object_type, GmlObject};
use crate::gml::envelope::{BoundingShape, Bounds, Envelope};
use crate::gml::geometry::Geometry;
use crate::gml::values::SrsReference;
use crate::gml::xlink::Property;
use crate::names::split_qname;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identity elements read into [`GmlObject`] rather than kept as properties
const IDENTITY_ELEMENTS: [&str; 6] = [
    "metaDataProperty",
    "description",
    "descriptionReference",
    "identifier",
    "name",
    "boundedBy",
];

/// An application-schema feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Element name of the feature type
    pub qname: QName,
    /// Identity
    pub object: GmlObject,
    /// `gml:boundedBy`
    pub bounded_by: Option<BoundingShape>,
    /// Remaining property elements, in document order
    pub properties: Vec<Element>,
}

impl Feature {
    /// An empty feature of type `qname`
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            object: GmlObject::default(),
            bounded_by: None,
            properties: Vec::new(),
        }
    }

    /// Add a property element
    pub fn with_property(mut self, property: Element) -> Self {
        self.properties.push(property);
        self
    }

    /// First property element with the given local name
    pub fn property_element(&self, local_name: &str) -> Option<&Element> {
        self.properties.iter().find(|p| p.local_name() == local_name)
    }

    /// Every inline geometry held by a property
    pub fn geometries(&self) -> Result<Vec<Geometry>> {
        self.properties
            .iter()
            .filter_map(|p| p.first_child())
            .filter(|c| c.qname.in_gml())
            .filter_map(|c| match Geometry::from_element(c) {
                Ok(geometry) => Some(Ok(geometry)),
                Err(crate::error::Error::UnsupportedVariant { .. }) => None,
                Err(e) => Some(Err(e)),
            })
            .collect()
    }

    /// The stated `gml:boundedBy`, else the box of all geometries
    pub fn bounds(&self) -> Result<Option<Bounds>> {
        if let Some(envelope) = self.bounded_by.as_ref().and_then(|b| b.envelope.as_ref()) {
            if let Some(bounds) = envelope.bounds()? {
                return Ok(Some(bounds));
            }
        }
        let mut bounds: Option<Bounds> = None;
        for geometry in self.geometries()? {
            if let Some(b) = geometry.bounds()? {
                bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
            }
        }
        Ok(bounds)
    }

    fn identity_value(&self, local_name: &str) -> Option<Value> {
        match local_name {
            "name" => self.object.names.first().map(|n| Value::Text(n.value.clone())),
            "description" => self
                .object
                .description
                .as_ref()
                .map(|d| Value::Text(d.value.clone())),
            "boundedBy" => self
                .bounded_by
                .as_ref()
                .and_then(|b| b.envelope.clone())
                .map(Value::Envelope),
            _ => None,
        }
    }
}

impl FeatureView for Feature {
    fn feature_id(&self) -> Option<&str> {
        self.object.id.as_deref()
    }

    /// Resolve a `/`-separated path of element names; prefixes are ignored
    fn property(&self, path: &str) -> Result<Option<Value>> {
        let mut steps = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| split_qname(s).1);

        let Some(first) = steps.next() else {
            return Ok(None);
        };
        // a leading step naming the feature type itself is skipped
        let first = if first == self.qname.local_name {
            match steps.next() {
                Some(step) => step,
                None => return Ok(None),
            }
        } else {
            first
        };

        let mut current = match self.property_element(first) {
            Some(element) => element,
            None => return Ok(self.identity_value(first)),
        };
        for step in steps {
            current = match current.children.iter().find(|c| c.local_name() == step) {
                Some(child) => child,
                None => {
                    debug!("property path {} has no step {}", path, step);
                    return Ok(None);
                }
            };
        }
        Value::from_content(current).map(Some)
    }

    fn bounds(&self) -> Result<Option<Bounds>> {
        Feature::bounds(self)
    }
}

impl FromElement for Feature {
    fn from_element(element: &Element) -> Result<Self> {
        Ok(Self {
            qname: element.qname.clone(),
            object: GmlObject::decode(element)?,
            bounded_by: element
                .gml_child("boundedBy")
                .map(BoundingShape::from_content)
                .transpose()?,
            properties: element
                .children
                .iter()
                .filter(|c| {
                    !(c.qname.in_gml() && IDENTITY_ELEMENTS.contains(&c.local_name()))
                })
                .cloned()
                .collect(),
        })
    }
}

impl ToElement for Feature {
    fn to_element(&self) -> Element {
        let mut element = Element::new(self.qname.clone());
        self.object.encode_into(&mut element);
        if let Some(bounded_by) = &self.bounded_by {
            element.add_child(bounded_by.to_element_named(QName::gml("boundedBy")));
        }
        for property in &self.properties {
            element.add_child(property.clone());
        }
        element.upgraded()
    }
}

/// `gml:FeaturePropertyType`
pub type FeatureProperty = Property<Feature>;

/// A feature collection and its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Element name of the collection
    pub qname: QName,
    /// Identity
    pub object: GmlObject,
    /// `gml:boundedBy`
    pub bounded_by: Option<BoundingShape>,
    /// `gml:featureMember` properties
    pub feature_members: Vec<FeatureProperty>,
    /// `gml:featureMembers` content
    pub feature_members_array: Vec<Feature>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            qname: QName::gml("FeatureCollection"),
            object: GmlObject::default(),
            bounded_by: None,
            feature_members: Vec::new(),
            feature_members_array: Vec::new(),
        }
    }
}

impl FeatureCollection {
    /// A `gml:FeatureCollection` with one `gml:featureMember` per feature
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            feature_members: features.into_iter().map(Property::inline).collect(),
            ..Self::default()
        }
    }

    /// Inline members of both forms, in document order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.feature_members
            .iter()
            .filter_map(Property::get)
            .chain(self.feature_members_array.iter())
    }

    /// Aggregate the bounds of every member
    ///
    /// The result is stated in `EPSG:4326` with axis labels `Y X`. A
    /// collection without any bounded member covers the whole world.
    pub fn compute_bounds(&self) -> Result<Envelope> {
        let mut bounds: Option<Bounds> = None;
        for feature in self.features() {
            if let Some(b) = feature.bounds()? {
                bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
            }
        }
        let bounds = bounds.unwrap_or_else(|| Bounds::new(-180.0, -90.0, 180.0, 90.0));
        let srs = SrsReference {
            srs_name: Some("EPSG:4326".to_string()),
            srs_dimension: Some(2),
            axis_labels: vec!["Y".to_string(), "X".to_string()],
            uom_labels: Vec::new(),
        };
        Ok(Envelope::from_bounds(&bounds, srs))
    }
}

/// Member properties are matched by local name, so `wfs:member` works too
fn is_member(element: &Element, local_name: &str) -> bool {
    element.local_name() == local_name
}

impl FromElement for FeatureCollection {
    fn from_element(element: &Element) -> Result<Self> {
        let feature_members = element
            .children
            .iter()
            .filter(|c| is_member(c, "featureMember") || is_member(c, "member"))
            .map(FeatureProperty::from_element)
            .collect::<Result<Vec<_>>>()?;
        let feature_members_array = match element
            .children
            .iter()
            .find(|c| is_member(c, "featureMembers") || is_member(c, "members"))
        {
            Some(array) => array
                .children
                .iter()
                .map(Feature::from_element)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        debug!(
            "decoded {} with {} members",
            element.qname,
            feature_members.len() + feature_members_array.len()
        );
        Ok(Self {
            qname: element.qname.clone(),
            object: GmlObject::decode(element)?,
            bounded_by: element
                .gml_child("boundedBy")
                .map(BoundingShape::from_content)
                .transpose()?,
            feature_members,
            feature_members_array,
        })
    }
}

impl ToElement for FeatureCollection {
    fn to_element(&self) -> Element {
        let mut element = Element::new(self.qname.clone());
        self.object.encode_into(&mut element);
        if let Some(bounded_by) = &self.bounded_by {
            element.add_child(bounded_by.to_element_named(QName::gml("boundedBy")));
        }
        for member in &self.feature_members {
            element.add_child(member.to_element_named(QName::gml("featureMember")));
        }
        if !self.feature_members_array.is_empty() {
            let mut array = Element::gml("featureMembers");
            for feature in &self.feature_members_array {
                array.add_child(feature.to_element());
            }
            element.add_child(array);
        }
        element.upgraded()
    }
}

impl_gml_object_type!(Feature, FeatureCollection);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::decode_str;

    fn feature_with_envelope(id: &str, lower: [f64; 2], upper: [f64; 2]) -> Feature {
        let mut feature = Feature::new(QName::namespaced("urn:app", "Parcel"));
        feature.object.id = Some(id.to_string());
        feature.bounded_by = Some(BoundingShape::envelope(Envelope::new(
            lower.to_vec(),
            upper.to_vec(),
        )));
        feature
    }

    #[test]
    fn test_compute_bounds() {
        let collection = FeatureCollection::new(vec![
            feature_with_envelope("a", [0.0, 0.0], [1.0, 1.0]),
            feature_with_envelope("b", [2.0, 2.0], [3.0, 3.0]),
        ]);
        let envelope = collection.compute_bounds().unwrap();
        assert_eq!(envelope.corners().unwrap(), Some((vec![0.0, 0.0], vec![3.0, 3.0])));
        assert_eq!(envelope.srs.srs_name.as_deref(), Some("EPSG:4326"));
        assert_eq!(envelope.srs.axis_labels, vec!["Y", "X"]);
        assert_eq!(envelope.srs.srs_dimension, Some(2));
    }

    #[test]
    fn test_compute_bounds_of_empty_collection() {
        let envelope = FeatureCollection::default().compute_bounds().unwrap();
        assert_eq!(
            envelope.corners().unwrap(),
            Some((vec![-180.0, -90.0], vec![180.0, 90.0]))
        );
    }

    #[test]
    fn test_feature_properties_and_values() {
        let xml = r#"<app:Road xmlns:app="urn:app" xmlns:gml="http://www.opengis.net/gml/3.2" gml:id="r1">
            <gml:name>Main Street</gml:name>
            <app:lanes>4</app:lanes>
            <app:owner><app:Agency><app:code>DOT</app:code></app:Agency></app:owner>
            <app:centerline>
                <gml:LineString><gml:posList>0 0 10 5</gml:posList></gml:LineString>
            </app:centerline>
        </app:Road>"#;
        let feature: Feature = decode_str(xml).unwrap();
        assert_eq!(feature.properties.len(), 3);
        assert_eq!(feature.feature_id(), Some("r1"));

        assert_eq!(feature.property("app:lanes").unwrap(), Some(Value::Text("4".into())));
        assert_eq!(
            feature.property("owner/Agency/code").unwrap(),
            Some(Value::Text("DOT".into()))
        );
        assert_eq!(
            feature.property("Road/name").unwrap(),
            Some(Value::Text("Main Street".into()))
        );
        assert!(matches!(
            feature.property("centerline").unwrap(),
            Some(Value::Geometry(_))
        ));
        assert_eq!(feature.property("missing").unwrap(), None);

        let bounds = feature.bounds().unwrap().unwrap();
        assert_eq!((bounds.max_x, bounds.max_y), (10.0, 5.0));
    }

    #[test]
    fn test_collection_roundtrip() {
        let xml = r#"<gml:FeatureCollection xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:app="urn:app">
            <gml:featureMember><app:Parcel gml:id="p1"><app:area>12</app:area></app:Parcel></gml:featureMember>
            <gml:featureMembers><app:Parcel gml:id="p2"/><app:Parcel gml:id="p3"/></gml:featureMembers>
        </gml:FeatureCollection>"#;
        let collection: FeatureCollection = decode_str(xml).unwrap();
        let ids: Vec<_> = collection.features().filter_map(|f| f.feature_id()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);

        let back = FeatureCollection::from_element(&collection.to_element()).unwrap();
        assert_eq!(back, collection);
    }

    #[test]
    fn test_gml_311_collection_is_written_as_32() {
        let xml = r#"<gml:FeatureCollection xmlns:gml="http://www.opengis.net/gml" xmlns:app="urn:app">
            <gml:featureMember>
                <app:P gml:id="a"><app:shape><gml:Point><gml:pos>1 2</gml:pos></gml:Point></app:shape></app:P>
            </gml:featureMember>
        </gml:FeatureCollection>"#;
        let collection: FeatureCollection = decode_str(xml).unwrap();
        let element = collection.to_element();
        assert_eq!(element.qname, QName::gml("FeatureCollection"));

        let config = crate::documents::WriterConfig::new();
        let written = crate::binding::encode_string(&collection, &config).unwrap();
        assert!(!written.contains("\"http://www.opengis.net/gml\""), "{written}");
        assert!(written.contains("http://www.opengis.net/gml/3.2"));

        let back: FeatureCollection = decode_str(&written).unwrap();
        let feature = back.features().next().unwrap();
        assert_eq!(feature.feature_id(), Some("a"));
        assert!(matches!(feature.property("shape").unwrap(), Some(Value::Geometry(_))));
    }
}
