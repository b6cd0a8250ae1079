//! Geometric primitives: points, curves, surfaces and solids

use super::{
    decode_header, encode_header, CollectPositions, CurveProperty, RingKind, SurfaceKind,
    SurfaceProperty,
};
use crate::binding::{
    expect_gml, optional_parsed_attribute, required_first_child, required_gml_child, FromElement,
    ToElement,
};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::gml::base::{impl_gml_object_type, GmlObject};
use crate::gml::values::{Coordinates, DirectPosition, DirectPositionList, SrsReference};
use crate::gml::xlink::Property;
use crate::namespaces::QName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ordinates of a curve or ring, in whichever form the document used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Positions {
    /// A sequence of `gml:pos`
    Pos(Vec<DirectPosition>),
    /// One `gml:posList`
    PosList(DirectPositionList),
    /// One `gml:coordinates`
    Coordinates(Coordinates),
}

impl Default for Positions {
    fn default() -> Self {
        Positions::Pos(Vec::new())
    }
}

impl Positions {
    /// A `gml:posList` holding the given points
    ///
    /// Points of other than two ordinates carry their `srsDimension`.
    pub fn from_points(points: &[Vec<f64>]) -> Self {
        let mut list = DirectPositionList::new(points.concat());
        if let Some(first) = points.first() {
            if first.len() != 2 {
                list.srs.srs_dimension = Some(first.len());
            }
        }
        Positions::PosList(list)
    }

    /// The points, split by `dimension` where the form needs it
    pub fn points(&self, dimension: usize) -> Result<Vec<Vec<f64>>> {
        match self {
            Positions::Pos(list) => Ok(list.iter().map(|p| p.values.clone()).collect()),
            Positions::PosList(list) => list.positions(dimension),
            Positions::Coordinates(coordinates) => coordinates.to_positions(),
        }
    }

    pub(crate) fn decode(element: &Element) -> Result<Self> {
        if let Some(list) = element.gml_child("posList") {
            return Ok(Positions::PosList(DirectPositionList::from_content(list)?));
        }
        if let Some(coordinates) = element.gml_child("coordinates") {
            return Ok(Positions::Coordinates(Coordinates::from_content(coordinates)));
        }
        element
            .gml_children("pos")
            .map(DirectPosition::from_content)
            .collect::<Result<Vec<_>>>()
            .map(Positions::Pos)
    }

    pub(crate) fn encode_into(&self, element: &mut Element) {
        match self {
            Positions::Pos(list) => {
                for pos in list {
                    element.add_child(pos.to_element());
                }
            }
            Positions::PosList(list) => element.add_child(list.to_element()),
            Positions::Coordinates(coordinates) => element.add_child(coordinates.to_element()),
        }
    }

    fn collect_into(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        out.extend(self.points(dimension)?);
        Ok(())
    }
}

/// `gml:SignType`, the orientation of an orientable primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// `+`
    Positive,
    /// `-`
    Negative,
}

impl Orientation {
    fn parse(text: &str) -> Result<Self> {
        match text.trim() {
            "+" => Ok(Orientation::Positive),
            "-" => Ok(Orientation::Negative),
            other => Err(Error::Value(format!("'{}' is not a gml:SignType", other))),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::Positive => "+",
            Orientation::Negative => "-",
        })
    }
}

fn decode_orientation(element: &Element) -> Result<Option<Orientation>> {
    element
        .get_attribute("orientation")
        .map(Orientation::parse)
        .transpose()
}

// =============================================================================
// Points and curves
// =============================================================================

/// `gml:Point`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `gml:pos`
    pub pos: Option<DirectPosition>,
    /// `gml:coordinates`, the older form
    pub coordinates: Option<Coordinates>,
}

impl Point {
    /// A point at `values`
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            pos: Some(DirectPosition::new(values)),
            ..Self::default()
        }
    }

    /// The position, whichever form carries it
    pub fn position(&self) -> Result<Option<Vec<f64>>> {
        if let Some(pos) = &self.pos {
            return Ok(Some(pos.values.clone()));
        }
        match &self.coordinates {
            Some(coordinates) => Ok(coordinates.to_positions()?.into_iter().next()),
            None => Ok(None),
        }
    }
}

impl FromElement for Point {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Point")?;
        let (object, srs) = decode_header(element)?;
        Ok(Self {
            object,
            srs,
            pos: element
                .gml_child("pos")
                .map(DirectPosition::from_content)
                .transpose()?,
            coordinates: element.gml_child("coordinates").map(Coordinates::from_content),
        })
    }
}

impl ToElement for Point {
    fn to_element(&self) -> Element {
        let mut element = encode_header("Point", &self.object, &self.srs);
        if let Some(pos) = &self.pos {
            element.add_child(pos.to_element());
        }
        if let Some(coordinates) = &self.coordinates {
            element.add_child(coordinates.to_element());
        }
        element
    }
}

impl CollectPositions for Point {
    fn collect_positions(&self, _dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        out.extend(self.position()?);
        Ok(())
    }
}

/// `gml:LineString`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// Control points
    pub positions: Positions,
}

impl LineString {
    /// A line string through `points`
    pub fn new(points: &[Vec<f64>]) -> Self {
        Self {
            positions: Positions::from_points(points),
            ..Self::default()
        }
    }
}

impl FromElement for LineString {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "LineString")?;
        let (object, srs) = decode_header(element)?;
        Ok(Self {
            object,
            srs,
            positions: Positions::decode(element)?,
        })
    }
}

impl ToElement for LineString {
    fn to_element(&self) -> Element {
        let mut element = encode_header("LineString", &self.object, &self.srs);
        self.positions.encode_into(&mut element);
        element
    }
}

impl CollectPositions for LineString {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        self.positions
            .collect_into(self.srs.srs_dimension.unwrap_or(dimension), out)
    }
}

/// `gml:LineStringSegment`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineStringSegment {
    /// `interpolation`, `linear` when unset
    pub interpolation: Option<String>,
    /// Control points
    pub positions: Positions,
}

impl LineStringSegment {
    /// Interpolation method
    pub fn interpolation(&self) -> &str {
        self.interpolation.as_deref().unwrap_or("linear")
    }
}

impl FromElement for LineStringSegment {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "LineStringSegment")?;
        Ok(Self {
            interpolation: element.get_attribute("interpolation").map(str::to_string),
            positions: Positions::decode(element)?,
        })
    }
}

impl ToElement for LineStringSegment {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("LineStringSegment");
        element.set_optional_attribute(QName::local("interpolation"), self.interpolation.as_ref());
        self.positions.encode_into(&mut element);
        element
    }
}

impl CollectPositions for LineStringSegment {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        self.positions.collect_into(dimension, out)
    }
}

/// `gml:ArcString`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArcString {
    /// `interpolation`, `circularArc3Points` when unset
    pub interpolation: Option<String>,
    /// `numArc`
    pub num_arc: Option<usize>,
    /// Control points
    pub positions: Positions,
}

impl ArcString {
    /// Interpolation method
    pub fn interpolation(&self) -> &str {
        self.interpolation
            .as_deref()
            .unwrap_or("circularArc3Points")
    }
}

impl FromElement for ArcString {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "ArcString")?;
        Ok(Self {
            interpolation: element.get_attribute("interpolation").map(str::to_string),
            num_arc: optional_parsed_attribute(element, "numArc")?,
            positions: Positions::decode(element)?,
        })
    }
}

impl ToElement for ArcString {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("ArcString");
        element.set_optional_attribute(QName::local("interpolation"), self.interpolation.as_ref());
        element.set_optional_attribute(QName::local("numArc"), self.num_arc);
        self.positions.encode_into(&mut element);
        element
    }
}

impl CollectPositions for ArcString {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        self.positions.collect_into(dimension, out)
    }
}

/// `gml:Curve`, a sequence of segments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `gml:segments` content
    pub segments: Vec<super::CurveSegment>,
}

impl FromElement for Curve {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Curve")?;
        let (object, srs) = decode_header(element)?;
        let segments = required_gml_child(element, "segments")?
            .children
            .iter()
            .map(super::CurveSegment::from_element)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            object,
            srs,
            segments,
        })
    }
}

impl ToElement for Curve {
    fn to_element(&self) -> Element {
        let mut element = encode_header("Curve", &self.object, &self.srs);
        let mut segments = Element::gml("segments");
        for segment in &self.segments {
            segments.add_child(segment.to_element());
        }
        element.add_child(segments);
        element
    }
}

impl CollectPositions for Curve {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        let dimension = self.srs.srs_dimension.unwrap_or(dimension);
        for segment in &self.segments {
            segment.collect_positions(dimension, out)?;
        }
        Ok(())
    }
}

/// `gml:OrientableCurve`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientableCurve {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `orientation`, positive when unset
    pub orientation: Option<Orientation>,
    /// `gml:baseCurve`
    pub base_curve: Box<CurveProperty>,
}

impl OrientableCurve {
    /// The orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation.unwrap_or(Orientation::Positive)
    }
}

impl FromElement for OrientableCurve {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "OrientableCurve")?;
        let (object, srs) = decode_header(element)?;
        Ok(Self {
            object,
            srs,
            orientation: decode_orientation(element)?,
            base_curve: Box::new(Property::from_element(required_gml_child(
                element,
                "baseCurve",
            )?)?),
        })
    }
}

impl ToElement for OrientableCurve {
    fn to_element(&self) -> Element {
        let mut element = encode_header("OrientableCurve", &self.object, &self.srs);
        element.set_optional_attribute(QName::local("orientation"), self.orientation);
        element.add_child(self.base_curve.to_element_named(QName::gml("baseCurve")));
        element
    }
}

impl CollectPositions for OrientableCurve {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        self.base_curve
            .collect_positions(self.srs.srs_dimension.unwrap_or(dimension), out)
    }
}

// =============================================================================
// Rings
// =============================================================================

/// `gml:LinearRing`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRing {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// Control points, first equal to last
    pub positions: Positions,
}

impl LinearRing {
    /// A ring through `points`
    pub fn new(points: &[Vec<f64>]) -> Self {
        Self {
            positions: Positions::from_points(points),
            ..Self::default()
        }
    }
}

impl FromElement for LinearRing {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "LinearRing")?;
        let (object, srs) = decode_header(element)?;
        Ok(Self {
            object,
            srs,
            positions: Positions::decode(element)?,
        })
    }
}

impl ToElement for LinearRing {
    fn to_element(&self) -> Element {
        let mut element = encode_header("LinearRing", &self.object, &self.srs);
        self.positions.encode_into(&mut element);
        element
    }
}

impl CollectPositions for LinearRing {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        self.positions
            .collect_into(self.srs.srs_dimension.unwrap_or(dimension), out)
    }
}

/// `gml:Ring`, a closed sequence of curves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `gml:curveMember`
    pub curve_members: Vec<CurveProperty>,
}

impl FromElement for Ring {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Ring")?;
        let (object, srs) = decode_header(element)?;
        Ok(Self {
            object,
            srs,
            curve_members: element
                .gml_children("curveMember")
                .map(Property::from_element)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl ToElement for Ring {
    fn to_element(&self) -> Element {
        let mut element = encode_header("Ring", &self.object, &self.srs);
        for member in &self.curve_members {
            element.add_child(member.to_element_named(QName::gml("curveMember")));
        }
        element
    }
}

impl CollectPositions for Ring {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        let dimension = self.srs.srs_dimension.unwrap_or(dimension);
        for member in &self.curve_members {
            member.collect_positions(dimension, out)?;
        }
        Ok(())
    }
}

fn decode_ring(property: &Element) -> Result<RingKind> {
    RingKind::from_element(required_first_child(property)?)
}

fn ring_property(name: &str, ring: &RingKind) -> Element {
    Element::gml(name).with_child(ring.to_element())
}

fn decode_boundaries(element: &Element) -> Result<(Option<RingKind>, Vec<RingKind>)> {
    let exterior = element.gml_child("exterior").map(decode_ring).transpose()?;
    let interior = element
        .gml_children("interior")
        .map(decode_ring)
        .collect::<Result<Vec<_>>>()?;
    Ok((exterior, interior))
}

fn encode_boundaries(element: &mut Element, exterior: Option<&RingKind>, interior: &[RingKind]) {
    if let Some(ring) = exterior {
        element.add_child(ring_property("exterior", ring));
    }
    for ring in interior {
        element.add_child(ring_property("interior", ring));
    }
}

fn collect_boundaries(
    exterior: Option<&RingKind>,
    interior: &[RingKind],
    dimension: usize,
    out: &mut Vec<Vec<f64>>,
) -> Result<()> {
    for ring in exterior.into_iter().chain(interior) {
        ring.collect_positions(dimension, out)?;
    }
    Ok(())
}

// =============================================================================
// Surfaces
// =============================================================================

/// `gml:Polygon`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `gml:exterior`
    pub exterior: Option<RingKind>,
    /// `gml:interior`
    pub interior: Vec<RingKind>,
}

impl Polygon {
    /// A polygon bounded by one linear ring through `points`
    pub fn new(points: &[Vec<f64>]) -> Self {
        Self {
            exterior: Some(RingKind::LinearRing(LinearRing::new(points))),
            ..Self::default()
        }
    }
}

impl FromElement for Polygon {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Polygon")?;
        let (object, srs) = decode_header(element)?;
        let (exterior, interior) = decode_boundaries(element)?;
        Ok(Self {
            object,
            srs,
            exterior,
            interior,
        })
    }
}

impl ToElement for Polygon {
    fn to_element(&self) -> Element {
        let mut element = encode_header("Polygon", &self.object, &self.srs);
        encode_boundaries(&mut element, self.exterior.as_ref(), &self.interior);
        element
    }
}

impl CollectPositions for Polygon {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        collect_boundaries(
            self.exterior.as_ref(),
            &self.interior,
            self.srs.srs_dimension.unwrap_or(dimension),
            out,
        )
    }
}

/// `gml:PolygonPatch`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonPatch {
    /// `interpolation`, `planar` when unset
    pub interpolation: Option<String>,
    /// `gml:exterior`
    pub exterior: Option<RingKind>,
    /// `gml:interior`
    pub interior: Vec<RingKind>,
}

impl PolygonPatch {
    /// Interpolation method
    pub fn interpolation(&self) -> &str {
        self.interpolation.as_deref().unwrap_or("planar")
    }
}

impl FromElement for PolygonPatch {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "PolygonPatch")?;
        let (exterior, interior) = decode_boundaries(element)?;
        Ok(Self {
            interpolation: element.get_attribute("interpolation").map(str::to_string),
            exterior,
            interior,
        })
    }
}

impl ToElement for PolygonPatch {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("PolygonPatch");
        element.set_optional_attribute(QName::local("interpolation"), self.interpolation.as_ref());
        encode_boundaries(&mut element, self.exterior.as_ref(), &self.interior);
        element
    }
}

impl CollectPositions for PolygonPatch {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        collect_boundaries(self.exterior.as_ref(), &self.interior, dimension, out)
    }
}

/// `gml:Triangle`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// `interpolation`, `planar` when unset
    pub interpolation: Option<String>,
    /// `gml:exterior`
    pub exterior: Option<RingKind>,
}

impl Triangle {
    /// Interpolation method
    pub fn interpolation(&self) -> &str {
        self.interpolation.as_deref().unwrap_or("planar")
    }
}

impl FromElement for Triangle {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Triangle")?;
        Ok(Self {
            interpolation: element.get_attribute("interpolation").map(str::to_string),
            exterior: element.gml_child("exterior").map(decode_ring).transpose()?,
        })
    }
}

impl ToElement for Triangle {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("Triangle");
        element.set_optional_attribute(QName::local("interpolation"), self.interpolation.as_ref());
        encode_boundaries(&mut element, self.exterior.as_ref(), &[]);
        element
    }
}

impl CollectPositions for Triangle {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        collect_boundaries(self.exterior.as_ref(), &[], dimension, out)
    }
}

/// `gml:Surface`, a set of patches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `gml:patches` content
    pub patches: Vec<super::SurfacePatch>,
}

impl FromElement for Surface {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Surface")?;
        let (object, srs) = decode_header(element)?;
        let patches = required_gml_child(element, "patches")?
            .children
            .iter()
            .map(super::SurfacePatch::from_element)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            object,
            srs,
            patches,
        })
    }
}

impl ToElement for Surface {
    fn to_element(&self) -> Element {
        let mut element = encode_header("Surface", &self.object, &self.srs);
        let mut patches = Element::gml("patches");
        for patch in &self.patches {
            patches.add_child(patch.to_element());
        }
        element.add_child(patches);
        element
    }
}

impl CollectPositions for Surface {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        let dimension = self.srs.srs_dimension.unwrap_or(dimension);
        for patch in &self.patches {
            patch.collect_positions(dimension, out)?;
        }
        Ok(())
    }
}

/// `gml:OrientableSurface`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientableSurface {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `orientation`, positive when unset
    pub orientation: Option<Orientation>,
    /// `gml:baseSurface`
    pub base_surface: Box<SurfaceProperty>,
}

impl OrientableSurface {
    /// The orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation.unwrap_or(Orientation::Positive)
    }
}

impl FromElement for OrientableSurface {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "OrientableSurface")?;
        let (object, srs) = decode_header(element)?;
        Ok(Self {
            object,
            srs,
            orientation: decode_orientation(element)?,
            base_surface: Box::new(Property::from_element(required_gml_child(
                element,
                "baseSurface",
            )?)?),
        })
    }
}

impl ToElement for OrientableSurface {
    fn to_element(&self) -> Element {
        let mut element = encode_header("OrientableSurface", &self.object, &self.srs);
        element.set_optional_attribute(QName::local("orientation"), self.orientation);
        element.add_child(self.base_surface.to_element_named(QName::gml("baseSurface")));
        element
    }
}

impl CollectPositions for OrientableSurface {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        self.base_surface
            .collect_positions(self.srs.srs_dimension.unwrap_or(dimension), out)
    }
}

/// `gml:PolyhedralSurface`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyhedralSurface {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `gml:polygonPatches` content
    pub patches: Vec<PolygonPatch>,
}

impl FromElement for PolyhedralSurface {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "PolyhedralSurface")?;
        let (object, srs) = decode_header(element)?;
        let patches = required_gml_child(element, "polygonPatches")?
            .children
            .iter()
            .map(PolygonPatch::from_element)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            object,
            srs,
            patches,
        })
    }
}

impl ToElement for PolyhedralSurface {
    fn to_element(&self) -> Element {
        let mut element = encode_header("PolyhedralSurface", &self.object, &self.srs);
        let mut patches = Element::gml("polygonPatches");
        for patch in &self.patches {
            patches.add_child(patch.to_element());
        }
        element.add_child(patches);
        element
    }
}

impl CollectPositions for PolyhedralSurface {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        let dimension = self.srs.srs_dimension.unwrap_or(dimension);
        for patch in &self.patches {
            patch.collect_positions(dimension, out)?;
        }
        Ok(())
    }
}

// =============================================================================
// Solids
// =============================================================================

/// `gml:Shell`, a closed set of surfaces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    /// Identity
    pub object: GmlObject,
    /// `gml:surfaceMember`
    pub surface_members: Vec<SurfaceProperty>,
}

impl Shell {
    /// Read a solid boundary, accepting a bare surface as a one-member shell
    fn decode_boundary(property: &Element) -> Result<Self> {
        let content = required_first_child(property)?;
        if content.qname.is_gml("Shell") {
            return Self::from_element(content);
        }
        Ok(Self {
            object: GmlObject::default(),
            surface_members: vec![Property::inline(SurfaceKind::from_element(content)?)],
        })
    }
}

impl FromElement for Shell {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Shell")?;
        Ok(Self {
            object: GmlObject::decode(element)?,
            surface_members: element
                .gml_children("surfaceMember")
                .map(Property::from_element)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl ToElement for Shell {
    fn to_element(&self) -> Element {
        let mut element = Element::gml("Shell");
        self.object.encode_into(&mut element);
        for member in &self.surface_members {
            element.add_child(member.to_element_named(QName::gml("surfaceMember")));
        }
        element
    }
}

impl CollectPositions for Shell {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        for member in &self.surface_members {
            member.collect_positions(dimension, out)?;
        }
        Ok(())
    }
}

/// `gml:Solid`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    /// Identity
    pub object: GmlObject,
    /// CRS reference
    pub srs: SrsReference,
    /// `gml:exterior`
    pub exterior: Option<Shell>,
    /// `gml:interior`
    pub interior: Vec<Shell>,
}

impl FromElement for Solid {
    fn from_element(element: &Element) -> Result<Self> {
        expect_gml(element, "Solid")?;
        let (object, srs) = decode_header(element)?;
        Ok(Self {
            object,
            srs,
            exterior: element
                .gml_child("exterior")
                .map(Shell::decode_boundary)
                .transpose()?,
            interior: element
                .gml_children("interior")
                .map(Shell::decode_boundary)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl ToElement for Solid {
    fn to_element(&self) -> Element {
        let mut element = encode_header("Solid", &self.object, &self.srs);
        if let Some(shell) = &self.exterior {
            element.add_child(Element::gml("exterior").with_child(shell.to_element()));
        }
        for shell in &self.interior {
            element.add_child(Element::gml("interior").with_child(shell.to_element()));
        }
        element
    }
}

impl CollectPositions for Solid {
    fn collect_positions(&self, dimension: usize, out: &mut Vec<Vec<f64>>) -> Result<()> {
        let dimension = self.srs.srs_dimension.unwrap_or(dimension);
        for shell in self.exterior.iter().chain(&self.interior) {
            shell.collect_positions(dimension, out)?;
        }
        Ok(())
    }
}

impl_gml_object_type!(
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
    Shell,
    Solid,
);
