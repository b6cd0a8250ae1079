//! Reading georeferenced windows out of a raster

use crate::binding::parse_f64_list;
use crate::coverage::affine::AffineTransform;
use crate::coverage::image::{ImageReader, Raster, Region};
use crate::coverage::metadata::CoverageMetadata;
use crate::error::{Error, Result};
use crate::gml::envelope::{Bounds, Envelope};
use crate::gml::grid::RectifiedGrid;
use crate::gml::values::SrsReference;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A raster placed in a CRS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCoverage {
    /// Pixel values
    pub raster: Raster,
    /// Pixel to CRS transform; pixel `(0, 0)` is the outer corner of the first cell
    pub grid_to_crs: AffineTransform,
    /// CRS the transform targets
    pub srs: SrsReference,
}

impl GridCoverage {
    /// The area covered by the raster
    pub fn envelope(&self) -> Envelope {
        pixel_envelope(
            &self.grid_to_crs,
            self.raster.width,
            self.raster.height,
            &self.srs,
        )
    }
}

fn pixel_envelope(
    grid_to_crs: &AffineTransform,
    width: usize,
    height: usize,
    srs: &SrsReference,
) -> Envelope {
    let pixels = Bounds::new(0.0, 0.0, width as f64, height as f64);
    Envelope::from_bounds(&grid_to_crs.transform_bounds(&pixels), srs.clone())
}

/// Access to a coverage by area of interest
pub trait CoverageReader {
    /// The area the whole coverage covers
    fn coverage_bounds(&self) -> Envelope;

    /// Read the part of the coverage inside `request`
    ///
    /// `resolution` is the wanted size of a result pixel along each CRS axis;
    /// `None` reads at native resolution. Returns `None` when `request` lies
    /// entirely outside the coverage.
    fn read(
        &self,
        request: &Envelope,
        resolution: Option<(f64, f64)>,
    ) -> Result<Option<GridCoverage>>;
}

/// Integer subsampling factor for one axis, never below 1
pub fn subsampling(requested: f64, native: f64) -> usize {
    if native <= 0.0 || native.is_nan() || !requested.is_finite() {
        return 1;
    }
    ((requested / native).floor() as usize).max(1)
}

/// [`CoverageReader`] over an [`ImageReader`] and an affine georeference
#[derive(Debug)]
pub struct DefaultCoverageReader<R> {
    image: R,
    grid_to_crs: AffineTransform,
    crs_to_grid: AffineTransform,
    srs: SrsReference,
}

impl<R: ImageReader> DefaultCoverageReader<R> {
    /// Georeference `image` with `grid_to_crs`, which maps pixel corners to
    /// CRS coordinates
    pub fn new(image: R, grid_to_crs: AffineTransform, srs: SrsReference) -> Result<Self> {
        Ok(Self {
            crs_to_grid: grid_to_crs.inverse()?,
            image,
            grid_to_crs,
            srs,
        })
    }

    /// Georeference `image` with a `gml:RectifiedGrid`
    ///
    /// The grid limits must match the image size. Grid point `low` maps to
    /// pixel `(0, 0)`.
    pub fn from_rectified_grid(image: R, grid: &RectifiedGrid) -> Result<Self> {
        let limits = &grid.grid.limits;
        let spans = (limits.span(0), limits.span(1));
        let size = (Some(image.width() as u64), Some(image.height() as u64));
        if spans != size {
            return Err(Error::Value(format!(
                "grid limits {:?} do not match a {}x{} image",
                limits,
                image.width(),
                image.height()
            )));
        }
        let low = (
            limits.low.first().copied().unwrap_or(0) as f64,
            limits.low.get(1).copied().unwrap_or(0) as f64,
        );
        let grid_to_crs = grid
            .grid_to_crs()?
            .compose(&AffineTransform::translation(low.0, low.1));
        Self::new(image, grid_to_crs, grid.grid.srs.clone())
    }

    /// Georeference `image` from metadata
    ///
    /// Reads a six-number GDAL geotransform from `geotransform` (alias
    /// `GeoTransform`) and an optional CRS name from `srsName` (alias `crs`).
    pub fn from_metadata(image: R, metadata: &CoverageMetadata) -> Result<Self> {
        let text = metadata.get("geotransform", "GeoTransform")?;
        let values = parse_f64_list(&text.replace(',', " "))?;
        let coefficients: [f64; 6] = values.as_slice().try_into().map_err(|_| {
            Error::Value(format!(
                "geotransform needs 6 coefficients, got {}",
                values.len()
            ))
        })?;
        let srs = match metadata.get_optional("srsName", "crs")? {
            Some(name) => SrsReference::named(name),
            None => SrsReference::default(),
        };
        Self::new(image, AffineTransform::from_gdal(coefficients), srs)
    }

    /// The underlying image
    pub fn image(&self) -> &R {
        &self.image
    }

    /// Pixel to CRS transform of the whole image
    pub fn grid_to_crs(&self) -> &AffineTransform {
        &self.grid_to_crs
    }
}

impl<R: ImageReader> CoverageReader for DefaultCoverageReader<R> {
    fn coverage_bounds(&self) -> Envelope {
        pixel_envelope(
            &self.grid_to_crs,
            self.image.width(),
            self.image.height(),
            &self.srs,
        )
    }

    fn read(
        &self,
        request: &Envelope,
        resolution: Option<(f64, f64)>,
    ) -> Result<Option<GridCoverage>> {
        if let (Some(requested), Some(native)) = (&request.srs.srs_name, &self.srs.srs_name) {
            if requested != native {
                return Err(Error::Unsupported(format!(
                    "reprojecting a request from {} to {}",
                    requested, native
                )));
            }
        }
        let bounds = request
            .bounds()?
            .ok_or_else(|| Error::Value("request envelope has no corners".into()))?;

        let pixels = self.crs_to_grid.transform_bounds(&bounds);
        let (width, height) = (self.image.width() as f64, self.image.height() as f64);
        let (x0, y0) = (pixels.min_x.floor(), pixels.min_y.floor());
        let (x1, y1) = (pixels.max_x.ceil(), pixels.max_y.ceil());
        if x0 >= width || y0 >= height || x1 <= 0.0 || y1 <= 0.0 {
            debug!("request {:?} lies outside the coverage", bounds);
            return Ok(None);
        }

        let (x0, y0) = (x0.max(0.0) as usize, y0.max(0.0) as usize);
        let x1 = (x1.min(width) as usize).max(x0 + 1);
        let y1 = (y1.min(height) as usize).max(y0 + 1);

        let (sx, sy) = match resolution {
            Some((rx, ry)) => {
                let (nx, ny) = self.grid_to_crs.resolution();
                (subsampling(rx, nx), subsampling(ry, ny))
            }
            None => (1, 1),
        };

        let region = Region::new(x0, y0, x1 - x0, y1 - y0);
        debug!("reading {:?} with subsampling {}x{}", region, sx, sy);
        let raster = self.image.read(region, (sx, sy))?;
        let grid_to_crs = self
            .grid_to_crs
            .compose(&AffineTransform::translation(x0 as f64, y0 as f64))
            .compose(&AffineTransform::scale(sx as f64, sy as f64));

        Ok(Some(GridCoverage {
            raster,
            grid_to_crs,
            srs: self.srs.clone(),
        }))
    }
}
