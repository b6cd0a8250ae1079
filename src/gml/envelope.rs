//! Envelopes and bounding shapes
//!
//! `gml:Envelope` can state its extent three ways: `lowerCorner` and
//! `upperCorner`, a pair of `gml:pos`, or a `gml:coordinates` string. All
//! three may be present at once. Decoding accepts that and logs a warning
//! when they disagree; [`Envelope::check_consistency`] turns it into an
//! error for callers that want one.

use crate::binding::{expect_gml, FromElement, ToElement};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::gml::values::{Coordinates, DirectPosition, SrsReference};
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A 2D axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum of the first axis
    pub min_x: f64,
    /// Minimum of the second axis
    pub min_y: f64,
    /// Maximum of the first axis
    pub max_x: f64,
    /// Maximum of the second axis
    pub max_y: f64,
}

impl Bounds {
    /// A box from its extremes
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The box covering every position with at least two ordinates
    pub fn from_positions(positions: &[Vec<f64>]) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for position in positions.iter().filter(|p| p.len() >= 2) {
            let (x, y) = (position[0], position[1]);
            bounds = Some(match bounds {
                Some(b) => b.union(&Self::new(x, y, x, y)),
                None => Self::new(x, y, x, y),
            });
        }
        bounds
    }

    /// The smallest box covering both
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Whether the boxes share at least one point
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Extent along the first axis
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along the second axis
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// `gml:Envelope`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// CRS reference
    pub srs: SrsReference,
    /// `gml:lowerCorner`
    pub lower_corner: Option<DirectPosition>,
    /// `gml:upperCorner`
    pub upper_corner: Option<DirectPosition>,
    /// `gml:pos`, lower then upper
    pub pos: Vec<DirectPosition>,
    /// `gml:coordinates`, lower then upper
    pub coordinates: Option<Coordinates>,
}

impl Envelope {
    /// An envelope from its corners
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            lower_corner: Some(DirectPosition::new(lower)),
            upper_corner: Some(DirectPosition::new(upper)),
            ..Self::default()
        }
    }

    /// An envelope covering `bounds`
    pub fn from_bounds(bounds: &Bounds, srs: SrsReference) -> Self {
        Self {
            srs,
            ..Self::new(vec![bounds.min_x, bounds.min_y], vec![bounds.max_x, bounds.max_y])
        }
    }

    /// Set the CRS reference
    pub fn with_srs(mut self, srs: SrsReference) -> Self {
        self.srs = srs;
        self
    }

    fn corner_forms(&self) -> Result<Vec<(Vec<f64>, Vec<f64>)>> {
        let mut forms = Vec::new();
        if let (Some(lower), Some(upper)) = (&self.lower_corner, &self.upper_corner) {
            forms.push((lower.values.clone(), upper.values.clone()));
        }
        if let [lower, upper] = self.pos.as_slice() {
            forms.push((lower.values.clone(), upper.values.clone()));
        }
        if let Some(coordinates) = &self.coordinates {
            if let [lower, upper] = coordinates.to_positions()?.as_slice() {
                forms.push((lower.clone(), upper.clone()));
            }
        }
        Ok(forms)
    }

    /// The lower and upper corners
    ///
    /// Taken from `lowerCorner`/`upperCorner` when both are present, then from
    /// a pair of `gml:pos`, then from `gml:coordinates`.
    pub fn corners(&self) -> Result<Option<(Vec<f64>, Vec<f64>)>> {
        Ok(self.corner_forms()?.into_iter().next())
    }

    /// Fail when the populated representations disagree
    pub fn check_consistency(&self) -> Result<()> {
        let forms = self.corner_forms()?;
        if let Some(first) = forms.first() {
            if let Some(other) = forms.iter().skip(1).find(|f| *f != first) {
                return Err(Error::Value(format!(
                    "envelope corners {:?} disagree with {:?}",
                    first, other
                )));
            }
        }
        Ok(())
    }

    /// The 2D box, when the envelope has corners
    pub fn bounds(&self) -> Result<Option<Bounds>> {
        Ok(self
            .corners()?
            .and_then(|(lower, upper)| Bounds::from_positions(&[lower, upper])))
    }
}

impl FromElement for Envelope {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Envelope")?;
        let envelope = Self {
            srs: SrsReference::from_attributes(element)?,
            lower_corner: element
                .gml_child("lowerCorner")
                .map(DirectPosition::from_content)
                .transpose()?,
            upper_corner: element
                .gml_child("upperCorner")
                .map(DirectPosition::from_content)
                .transpose()?,
            pos: element
                .gml_children("pos")
                .map(DirectPosition::from_content)
                .collect::<Result<Vec<_>>>()?,
            coordinates: element.gml_child("coordinates").map(Coordinates::from_content),
        };
        if let Err(e) = envelope.check_consistency() {
            warn!("inconsistent gml:Envelope kept as read: {}", e);
        }
        Ok(envelope)
    }
}

impl ToElement for Envelope {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("Envelope");
        self.srs.write_attributes(&mut element);
        if let Some(lower) = &self.lower_corner {
            element.add_child(lower.to_element_named(QName::gml("lowerCorner")));
        }
        if let Some(upper) = &self.upper_corner {
            element.add_child(upper.to_element_named(QName::gml("upperCorner")));
        }
        for pos in &self.pos {
            element.add_child(pos.to_element());
        }
        if let Some(coordinates) = &self.coordinates {
            element.add_child(coordinates.to_element());
        }
        element
    }
}

/// `gml:BoundingShapeType`, the content of `gml:boundedBy`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingShape {
    /// The envelope
    pub envelope: Option<Envelope>,
    /// Why no envelope is given
    pub nil_reason: Option<String>,
}

impl BoundingShape {
    /// A shape holding `envelope`
    pub fn envelope(envelope: Envelope) -> Self {
        Self {
            envelope: Some(envelope),
            nil_reason: None,
        }
    }

    /// Decode `gml:boundedBy`; GML 3.1 writes a missing envelope as `gml:Null`
    pub fn from_content(element: &Element) -> Result<Self> {
        let nil_reason = element
            .get_attribute("nilReason")
            .map(str::to_string)
            .or_else(|| {
                element
                    .gml_child("Null")
                    .map(|null| null.text_content().trim().to_string())
            });
        Ok(Self {
            envelope: element
                .gml_child("Envelope")
                .map(Envelope::from_element)
                .transpose()?,
            nil_reason,
        })
    }

    /// Encode as `gml:boundedBy`
    pub fn to_element_named(&self, name: QName) -> Element {
        let mut element = Element::new(name);
        element.set_optional_attribute(QName::local("nilReason"), self.nil_reason.as_ref());
        if let Some(envelope) = &self.envelope {
            element.add_child(envelope.to_element());
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::decode_str;

    const GML: &str = r#"xmlns:gml="http://www.opengis.net/gml/3.2""#;

    #[test]
    fn test_corner_priority() {
        let xml = format!(
            r#"<gml:Envelope {}><gml:pos>0 0</gml:pos><gml:pos>5 5</gml:pos></gml:Envelope>"#,
            GML
        );
        let envelope: Envelope = decode_str(&xml).unwrap();
        assert_eq!(envelope.corners().unwrap(), Some((vec![0.0, 0.0], vec![5.0, 5.0])));

        let xml = format!(
            r#"<gml:Envelope {}><gml:coordinates>1,2 3,4</gml:coordinates></gml:Envelope>"#,
            GML
        );
        let envelope: Envelope = decode_str(&xml).unwrap();
        assert_eq!(envelope.corners().unwrap(), Some((vec![1.0, 2.0], vec![3.0, 4.0])));
    }

    #[test]
    fn test_inconsistent_forms_are_kept() {
        let xml = format!(
            r#"<gml:Envelope {}>
                <gml:lowerCorner>0 0</gml:lowerCorner><gml:upperCorner>1 1</gml:upperCorner>
                <gml:coordinates>0,0 9,9</gml:coordinates>
            </gml:Envelope>"#,
            GML
        );
        let envelope: Envelope = decode_str(&xml).unwrap();
        assert_eq!(envelope.corners().unwrap(), Some((vec![0.0, 0.0], vec![1.0, 1.0])));
        assert!(envelope.check_consistency().is_err());

        let consistent = Envelope {
            pos: vec![DirectPosition::new(vec![0.0, 0.0]), DirectPosition::new(vec![1.0, 1.0])],
            ..Envelope::new(vec![0.0, 0.0], vec![1.0, 1.0])
        };
        assert!(consistent.check_consistency().is_ok());
    }

    #[test]
    fn test_bounds_union_and_intersection() {
        let a = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let b = Bounds::new(2.0, 2.0, 3.0, 3.0);
        assert_eq!(a.union(&b), Bounds::new(0.0, 0.0, 3.0, 3.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Bounds::new(1.0, 1.0, 2.0, 2.0)));
        assert!(Bounds::from_positions(&[vec![1.0]]).is_none());
    }

    #[test]
    fn test_bounded_by_null() {
        let xml = format!(
            r#"<gml:boundedBy {}><gml:Null>unknown</gml:Null></gml:boundedBy>"#,
            GML
        );
        let element = crate::documents::Document::from_string(&xml)
            .unwrap()
            .into_root()
            .unwrap();
        let shape = BoundingShape::from_content(&element).unwrap();
        assert_eq!(shape.nil_reason.as_deref(), Some("unknown"));
        assert!(shape.envelope.is_none());

        let written = shape.to_element_named(QName::gml("boundedBy"));
        assert_eq!(written.get_attribute("nilReason"), Some("unknown"));
        assert_eq!(BoundingShape::from_content(&written).unwrap(), shape);
    }
}
