//! In-memory band stack

use super::{BandInfo, Georeference, RasterSource};
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{BandBuffer, DataType, GeoTransform, PixelWindow};
use ndarray::{s, Array3, ArrayView2, ArrayViewMut2, Axis};

/// A georeferenced stack of bands held in memory.
///
/// All bands share one data type and no-data value. Samples are stored as
/// `f32` with shape `(bands, rows, cols)`.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    data: Array3<f32>,
    transform: GeoTransform,
    crs: Option<CRS>,
    data_type: DataType,
    nodata: Option<f64>,
}

impl MemoryRaster {
    /// Create a zero-filled stack of `bands` bands of `rows` x `cols`
    pub fn new(bands: usize, rows: usize, cols: usize) -> Self {
        Self::from_array(Array3::zeros((bands, rows, cols)))
    }

    /// Create a stack from concatenated row-major band samples
    pub fn from_vec(bands: usize, rows: usize, cols: usize, samples: Vec<f32>) -> Result<Self> {
        let data = Array3::from_shape_vec((bands, rows, cols), samples).map_err(|_| {
            Error::InvalidDimensions {
                width: cols,
                height: rows,
            }
        })?;
        Ok(Self::from_array(data))
    }

    pub fn from_array(data: Array3<f32>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
            data_type: DataType::Float32,
            nodata: None,
        }
    }

    pub fn with_transform(mut self, transform: GeoTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_crs(mut self, crs: Option<CRS>) -> Self {
        self.crs = crs;
        self
    }

    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// View of band `band` (1-based)
    pub fn band(&self, band: usize) -> Result<ArrayView2<'_, f32>> {
        self.check_band(band)?;
        Ok(self.data.index_axis(Axis(0), band - 1))
    }

    /// Mutable view of band `band` (1-based)
    pub fn band_mut(&mut self, band: usize) -> Result<ArrayViewMut2<'_, f32>> {
        self.check_band(band)?;
        Ok(self.data.index_axis_mut(Axis(0), band - 1))
    }

    fn check_band(&self, band: usize) -> Result<()> {
        let count = self.band_count();
        if band == 0 || band > count {
            return Err(Error::BandOutOfRange { band, count });
        }
        Ok(())
    }
}

impl RasterSource for MemoryRaster {
    fn georeference(&self) -> Georeference {
        Georeference {
            transform: self.transform,
            crs: self.crs.clone(),
            width: self.cols(),
            height: self.rows(),
        }
    }

    fn band_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    fn band_info(&self, band: usize) -> Result<BandInfo> {
        self.check_band(band)?;
        Ok(BandInfo {
            data_type: self.data_type,
            nodata: self.nodata,
        })
    }

    fn read_window(&self, window: &PixelWindow, bands: &[usize]) -> Result<BandBuffer> {
        if !window.fits_within(self.cols(), self.rows()) {
            return Err(Error::InvalidParameter {
                name: "window",
                value: format!("{:?}", window),
                reason: format!("outside raster of {}x{}", self.cols(), self.rows()),
            });
        }

        let (x0, y0) = (window.offset_x, window.offset_y);
        let (x1, y1) = (x0 + window.count_x, y0 + window.count_y);

        let mut out = Array3::zeros((bands.len(), window.count_y, window.count_x));
        for (i, &band) in bands.iter().enumerate() {
            self.check_band(band)?;
            out.index_axis_mut(Axis(0), i)
                .assign(&self.data.slice(s![band - 1, y0..y1, x0..x1]));
        }

        Ok(BandBuffer::from_array(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> MemoryRaster {
        // 3 bands of 3x4, value = band * 100 + row * 10 + col
        let mut samples = Vec::new();
        for b in 1..=3 {
            for r in 0..3 {
                for c in 0..4 {
                    samples.push((b * 100 + r * 10 + c) as f32);
                }
            }
        }
        MemoryRaster::from_vec(3, 3, 4, samples).unwrap()
    }

    #[test]
    fn test_read_window_band_order() {
        let raster = stack();
        let window = PixelWindow::new(1, 1, 2, 2);
        let buf = raster.read_window(&window, &[3, 1]).unwrap();

        assert_eq!(buf.band_count(), 2);
        let first: Vec<f32> = buf.band(0).iter().copied().collect();
        assert_eq!(first, vec![311.0, 312.0, 321.0, 322.0]);
        let second: Vec<f32> = buf.band(1).iter().copied().collect();
        assert_eq!(second, vec![111.0, 112.0, 121.0, 122.0]);
    }

    #[test]
    fn test_read_window_out_of_bounds() {
        let raster = stack();
        assert!(raster.read_window(&PixelWindow::new(3, 0, 2, 1), &[1]).is_err());
    }

    #[test]
    fn test_band_out_of_range() {
        let raster = stack();
        let err = raster.read_window(&PixelWindow::new(0, 0, 1, 1), &[4]).unwrap_err();
        assert!(matches!(err, Error::BandOutOfRange { band: 4, count: 3 }));
        assert!(raster.band_info(0).is_err());
    }

    #[test]
    fn test_georeference() {
        let raster = stack()
            .with_transform(GeoTransform::new(10.0, 20.0, 0.5, -0.5))
            .with_crs(Some(CRS::from_epsg(32755)))
            .with_nodata(Some(-999.0));
        let geo = raster.georeference();
        assert_eq!((geo.width, geo.height), (4, 3));
        assert_eq!(geo.bounds(), (10.0, 18.5, 12.0, 20.0));
        assert_eq!(raster.band_info(2).unwrap().nodata, Some(-999.0));
    }
}
