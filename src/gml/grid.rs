//! Grid geometries
//!
//! `gml:Grid` and `gml:RectifiedGrid` describe the raster lattice a coverage
//! is sampled on. A rectified grid also places the lattice in its CRS, which
//! [`RectifiedGrid::grid_to_crs`] turns into an affine transform.

use crate::binding::{
    decode_children, expect_gml, parse_value, required_attribute, required_gml_child, FromElement,
    ToElement,
};
use crate::coverage::AffineTransform;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::gml::base::{impl_gml_object_type, GmlObject, GmlObjectType};
use crate::gml::geometry::Point;
use crate::gml::values::{SrsReference, Vector};
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};

fn parse_i64_list(element: &Element) -> Result<Vec<i64>> {
    element
        .text_content()
        .split_whitespace()
        .map(|token| parse_value(token, element))
        .collect()
}

fn format_i64_list(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `gml:GridEnvelope`, inclusive integer limits of a grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridEnvelope {
    /// `gml:low`
    pub low: Vec<i64>,
    /// `gml:high`
    pub high: Vec<i64>,
}

impl GridEnvelope {
    /// Limits from `low` to `high`, both inclusive
    pub fn new(low: Vec<i64>, high: Vec<i64>) -> Self {
        Self { low, high }
    }

    /// Number of cells along `axis`
    pub fn span(&self, axis: usize) -> Option<u64> {
        let low = *self.low.get(axis)?;
        let high = *self.high.get(axis)?;
        Some((high - low + 1).max(0) as u64)
    }
}

impl FromElement for GridEnvelope {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "GridEnvelope")?;
        Ok(Self {
            low: parse_i64_list(required_gml_child(element, "low")?)?,
            high: parse_i64_list(required_gml_child(element, "high")?)?,
        })
    }
}

impl ToElement for GridEnvelope {
    fn to_element(&self) -> Element {
        Element::gml("GridEnvelope")
            .with_child(Element::gml("low").with_text(format_i64_list(&self.low)))
            .with_child(Element::gml("high").with_text(format_i64_list(&self.high)))
    }
}

/// `gml:Grid`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `dimension`
    pub dimension: usize,
    /// `gml:limits`
    pub limits: GridEnvelope,
    /// `gml:axisLabels`, or the older `gml:axisName` list
    pub axis_labels: Vec<String>,
}

impl Grid {
    fn decode_content(element: &Element) -> Result<Self> {
        let dimension = parse_value(required_attribute(element, "dimension")?, element)?;
        let limits = required_gml_child(element, "limits")?;
        let axis_labels = match element.gml_child("axisLabels") {
            Some(labels) => labels
                .text_content()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            None => element
                .gml_children("axisName")
                .map(|a| a.text_content().trim().to_string())
                .collect(),
        };
        Ok(Self {
            object: GmlObject::decode(element)?,
            srs: SrsReference::from_attributes(element)?,
            dimension,
            limits: GridEnvelope::from_element(required_gml_child(limits, "GridEnvelope")?)?,
            axis_labels,
        })
    }

    fn encode_content(&self, name: &str) -> Element {
        let mut element = Element::gml(name);
        self.object.encode_into(&mut element);
        self.srs.write_attributes(&mut element);
        element.set_attribute(QName::local("dimension"), self.dimension.to_string());
        element.add_child(Element::gml("limits").with_child(self.limits.to_element()));
        if !self.axis_labels.is_empty() {
            element.add_child(Element::gml("axisLabels").with_text(self.axis_labels.join(" ")));
        }
        element
    }
}

impl FromElement for Grid {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Grid")?;
        Self::decode_content(element)
    }
}

impl ToElement for Grid {
    fn to_element(&self) -> Element {
        self.encode_content("Grid")
    }
}

/// `gml:RectifiedGrid`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RectifiedGrid {
    /// The lattice
    pub grid: Grid,
    /// `gml:origin`
    pub origin: Point,
    /// `gml:offsetVector`, one per axis
    pub offset_vectors: Vec<Vector>,
}

impl RectifiedGrid {
    /// The transform from grid coordinates to CRS coordinates
    ///
    /// Grid coordinate `(i, j)` maps to `origin + i * v0 + j * v1`. Only
    /// two-dimensional grids are supported.
    pub fn grid_to_crs(&self) -> Result<AffineTransform> {
        if self.grid.dimension != 2 || self.offset_vectors.len() != 2 {
            return Err(Error::Unsupported(format!(
                "grid-to-CRS transform of a {}-dimensional grid with {} offset vectors",
                self.grid.dimension,
                self.offset_vectors.len()
            )));
        }
        let origin = self
            .origin
            .position()?
            .filter(|p| p.len() >= 2)
            .ok_or_else(|| Error::Value("rectified grid origin has no 2D position".into()))?;
        let v0 = &self.offset_vectors[0].values;
        let v1 = &self.offset_vectors[1].values;
        if v0.len() < 2 || v1.len() < 2 {
            return Err(Error::Value("offset vectors need two components".into()));
        }
        Ok(AffineTransform::from_gdal([
            origin[0], v0[0], v1[0], origin[1], v0[1], v1[1],
        ]))
    }
}

impl FromElement for RectifiedGrid {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "RectifiedGrid")?;
        let origin = required_gml_child(element, "origin")?;
        Ok(Self {
            grid: Grid::decode_content(element)?,
            origin: Point::from_element(required_gml_child(origin, "Point")?)?,
            offset_vectors: decode_children(element, |c| c.qname.is_gml("offsetVector"))?,
        })
    }
}

impl ToElement for RectifiedGrid {
    fn to_element(&self) -> Element {
        let mut element = self.grid.encode_content("RectifiedGrid");
        element.add_child(Element::gml("origin").with_child(self.origin.to_element()));
        for vector in &self.offset_vectors {
            element.add_child(vector.to_element_named(QName::gml("offsetVector")));
        }
        element
    }
}

impl_gml_object_type!(Grid);

impl GmlObjectType for RectifiedGrid {
    fn gml_object(&self) -> &GmlObject {
        &self.grid.object
    }

    fn gml_object_mut(&mut self) -> &mut GmlObject {
        &mut self.grid.object
    }
}
