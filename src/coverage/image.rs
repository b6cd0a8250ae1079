//! Raster sources
//!
//! Decoding image formats is left to implementations of [`ImageReader`].
//! [`MemoryImage`] serves pixels already held in memory.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A pixel window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// First column
    pub x: usize,
    /// First row
    pub y: usize,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl Region {
    /// A window of `width` by `height` pixels starting at `(x, y)`
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Pixel values, band-interleaved by pixel and stored row by row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raster {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Number of bands
    pub bands: usize,
    /// `width * height * bands` samples
    pub data: Vec<f64>,
}

impl Raster {
    /// Wrap samples, checking their count
    pub fn new(width: usize, height: usize, bands: usize, data: Vec<f64>) -> Result<Self> {
        let expected = width * height * bands;
        if data.len() != expected {
            return Err(Error::Value(format!(
                "raster of {}x{}x{} needs {} samples, got {}",
                width,
                height,
                bands,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bands,
            data,
        })
    }

    /// The sample of `band` at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize, band: usize) -> Option<f64> {
        if x >= self.width || y >= self.height || band >= self.bands {
            return None;
        }
        self.data.get((y * self.width + x) * self.bands + band).copied()
    }
}

/// Source of raster pixels
pub trait ImageReader {
    /// Number of columns
    fn width(&self) -> usize;

    /// Number of rows
    fn height(&self) -> usize;

    /// Number of bands
    fn bands(&self) -> usize;

    /// Read `region`, keeping every `sx`-th column and `sy`-th row
    ///
    /// The result has `ceil(width / sx)` columns and `ceil(height / sy)` rows.
    fn read(&self, region: Region, subsampling: (usize, usize)) -> Result<Raster>;
}

/// An [`ImageReader`] over an in-memory raster
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryImage {
    raster: Raster,
}

impl MemoryImage {
    /// Serve the pixels of `raster`
    pub fn new(raster: Raster) -> Self {
        Self { raster }
    }

    /// The whole raster
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

impl ImageReader for MemoryImage {
    fn width(&self) -> usize {
        self.raster.width
    }

    fn height(&self) -> usize {
        self.raster.height
    }

    fn bands(&self) -> usize {
        self.raster.bands
    }

    fn read(&self, region: Region, (sx, sy): (usize, usize)) -> Result<Raster> {
        if sx == 0 || sy == 0 {
            return Err(Error::Value("subsampling factors must be at least 1".into()));
        }
        if region.x + region.width > self.raster.width
            || region.y + region.height > self.raster.height
        {
            return Err(Error::Value(format!(
                "{:?} lies outside a {}x{} raster",
                region, self.raster.width, self.raster.height
            )));
        }

        let width = region.width.div_ceil(sx);
        let height = region.height.div_ceil(sy);
        let bands = self.raster.bands;
        let mut data = Vec::with_capacity(width * height * bands);
        for row in (region.y..region.y + region.height).step_by(sy) {
            for column in (region.x..region.x + region.width).step_by(sx) {
                let start = (row * self.raster.width + column) * bands;
                data.extend_from_slice(&self.raster.data[start..start + bands]);
            }
        }
        Raster::new(width, height, bands, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> MemoryImage {
        let data = (0..width * height).map(|v| v as f64).collect();
        MemoryImage::new(Raster::new(width, height, 1, data).unwrap())
    }

    #[test]
    fn test_sample_count_checked() {
        assert!(Raster::new(2, 2, 1, vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_read_window() {
        let image = ramp(4, 3);
        let raster = image.read(Region::new(1, 1, 2, 2), (1, 1)).unwrap();
        assert_eq!((raster.width, raster.height), (2, 2));
        assert_eq!(raster.data, vec![5.0, 6.0, 9.0, 10.0]);
        assert_eq!(raster.get(1, 1, 0), Some(10.0));
        assert_eq!(raster.get(2, 0, 0), None);
    }

    #[test]
    fn test_read_subsampled() {
        let image = ramp(5, 4);
        let raster = image.read(Region::new(0, 0, 5, 4), (2, 3)).unwrap();
        assert_eq!((raster.width, raster.height), (3, 2));
        assert_eq!(raster.data, vec![0.0, 2.0, 4.0, 15.0, 17.0, 19.0]);
    }

    #[test]
    fn test_read_outside() {
        let image = ramp(4, 3);
        assert!(image.read(Region::new(3, 0, 2, 1), (1, 1)).is_err());
        assert!(image.read(Region::new(0, 0, 1, 1), (0, 1)).is_err());
    }
}
