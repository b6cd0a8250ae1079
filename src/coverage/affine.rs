//! Two-dimensional affine transforms

use crate::error::{Error, Result};
use crate::gml::envelope::Bounds;
use serde::{Deserialize, Serialize};

/// A 2D affine transform
///
/// Maps `(x, y)` to `(x0 + a*x + b*y, y0 + d*x + e*y)`. The six coefficients
/// are stored in GDAL geotransform order `[x0, a, b, y0, d, e]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    coefficients: [f64; 6],
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// The transform from a GDAL geotransform
    pub fn from_gdal(coefficients: [f64; 6]) -> Self {
        Self { coefficients }
    }

    /// The GDAL geotransform coefficients
    pub fn to_gdal(&self) -> [f64; 6] {
        self.coefficients
    }

    /// The transform mapping every point to itself
    pub fn identity() -> Self {
        Self::from_gdal([0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    /// Shift by `(tx, ty)`
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::from_gdal([tx, 1.0, 0.0, ty, 0.0, 1.0])
    }

    /// Scale each axis independently
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::from_gdal([0.0, sx, 0.0, 0.0, 0.0, sy])
    }

    /// Transform one point
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [x0, a, b, y0, d, e] = self.coefficients;
        (x0 + a * x + b * y, y0 + d * x + e * y)
    }

    fn determinant(&self) -> f64 {
        let [_, a, b, _, d, e] = self.coefficients;
        a * e - b * d
    }

    /// The inverse transform
    pub fn inverse(&self) -> Result<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(Error::Value(format!(
                "affine transform {:?} is not invertible",
                self.coefficients
            )));
        }
        let [x0, a, b, y0, d, e] = self.coefficients;
        let (ia, ib, id, ie) = (e / det, -b / det, -d / det, a / det);
        Ok(Self::from_gdal([
            -(ia * x0 + ib * y0),
            ia,
            ib,
            -(id * x0 + ie * y0),
            id,
            ie,
        ]))
    }

    /// `self ∘ other`: apply `other` first, then `self`
    pub fn compose(&self, other: &Self) -> Self {
        let [x1, a1, b1, y1, d1, e1] = self.coefficients;
        let [x2, a2, b2, y2, d2, e2] = other.coefficients;
        Self::from_gdal([
            a1 * x2 + b1 * y2 + x1,
            a1 * a2 + b1 * d2,
            a1 * b2 + b1 * e2,
            d1 * x2 + e1 * y2 + y1,
            d1 * a2 + e1 * d2,
            d1 * b2 + e1 * e2,
        ])
    }

    /// The box covering the transformed corners of `bounds`
    pub fn transform_bounds(&self, bounds: &Bounds) -> Bounds {
        let corners = [
            self.apply(bounds.min_x, bounds.min_y),
            self.apply(bounds.min_x, bounds.max_y),
            self.apply(bounds.max_x, bounds.min_y),
            self.apply(bounds.max_x, bounds.max_y),
        ];
        corners.iter().skip(1).fold(
            Bounds::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1),
            |acc, &(x, y)| acc.union(&Bounds::new(x, y, x, y)),
        )
    }

    /// Size of one grid step along each axis, in target units
    pub fn resolution(&self) -> (f64, f64) {
        let [_, a, b, _, d, e] = self.coefficients;
        (a.hypot(d), b.hypot(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn north_up() -> AffineTransform {
        AffineTransform::from_gdal([100.0, 0.5, 0.0, 50.0, 0.0, -0.5])
    }

    #[test]
    fn test_apply() {
        assert_eq!(north_up().apply(0.0, 0.0), (100.0, 50.0));
        assert_eq!(north_up().apply(20.0, 10.0), (110.0, 45.0));
        assert_eq!(AffineTransform::identity().apply(3.0, 4.0), (3.0, 4.0));
    }

    #[test]
    fn test_inverse() {
        let inverse = north_up().inverse().unwrap();
        assert_eq!(inverse.apply(110.0, 45.0), (20.0, 10.0));
        assert!(AffineTransform::scale(0.0, 1.0).inverse().is_err());
    }

    #[test]
    fn test_compose_order() {
        let t = AffineTransform::translation(10.0, 0.0);
        let s = AffineTransform::scale(2.0, 2.0);
        // scale first, then translate
        assert_eq!(t.compose(&s).apply(1.0, 1.0), (12.0, 2.0));
        // translate first, then scale
        assert_eq!(s.compose(&t).apply(1.0, 1.0), (22.0, 2.0));
    }

    #[test]
    fn test_transform_bounds_flips_y() {
        let bounds = north_up().transform_bounds(&Bounds::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(bounds, Bounds::new(100.0, 25.0, 150.0, 50.0));
    }

    #[test]
    fn test_resolution() {
        assert_eq!(north_up().resolution(), (0.5, 0.5));
        assert_eq!(north_up().to_gdal()[3], 50.0);
    }
}
