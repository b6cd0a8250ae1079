//! Grid coverage reading
//!
//! A [`DefaultCoverageReader`] pairs a raster source with the affine transform
//! that places its pixels in a CRS, and cuts georeferenced windows out of it.
//! CRS names are carried along but never resolved.

pub mod affine;
pub mod image;
pub mod metadata;
pub mod reader;

pub use affine::AffineTransform;
pub use image::{ImageReader, MemoryImage, Raster, Region};
pub use metadata::CoverageMetadata;
pub use reader::{subsampling, CoverageReader, DefaultCoverageReader, GridCoverage};
