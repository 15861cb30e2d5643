//! The drill pipeline: statistics of a band stack over one zone
//!
//! A drill resolves the zone's window and mask once, then walks the
//! requested bands stride group by stride group: read the group's endpoint
//! bands, aggregate them, estimate deciles and interpolate the rows in
//! between. Only one group's buffer is alive at a time.

mod batch;
mod request;

pub use batch::drill_zones;
pub use request::{run_request, DrillRequest};

use crate::metrics::{MetricsRecorder, RunMetrics};
use crate::sampler::{stride_groups, BandSampler};
use crate::statistics::{
    aggregate_band, compute_deciles, ClipRange, ResultTable, StatPoint, Statistic,
    StrideInterpolator,
};
use crate::zone::{resolve_window, ZoneOptions};
use drillstat_core::{Error, MembershipMask, RasterSource, Result, Zone};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to compute for a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillParams {
    /// Band indices (1-based) in output order
    pub bands: Vec<usize>,
    /// 1 reads every band; `k > 1` reads the endpoints of each run of `k`
    /// bands and interpolates the rest
    pub band_strides: usize,
    /// Number of decile columns after the central statistic
    pub decile_count: usize,
    pub statistic: Statistic,
    pub clip: ClipRange,
    pub zone: ZoneOptions,
}

impl Default for DrillParams {
    fn default() -> Self {
        Self {
            bands: vec![1],
            band_strides: 1,
            decile_count: 0,
            statistic: Statistic::Mean,
            clip: ClipRange::default(),
            zone: ZoneOptions::default(),
        }
    }
}

impl DrillParams {
    pub fn new(bands: Vec<usize>) -> Self {
        Self {
            bands,
            ..Default::default()
        }
    }

    /// Set the stride; values below 1 mean 1
    pub fn with_band_strides(mut self, band_strides: i64) -> Self {
        self.band_strides = band_strides.max(1) as usize;
        self
    }

    pub fn with_decile_count(mut self, decile_count: usize) -> Self {
        self.decile_count = decile_count;
        self
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    pub fn with_clip(mut self, clip: ClipRange) -> Self {
        self.clip = clip;
        self
    }

    pub fn with_zone_options(mut self, zone: ZoneOptions) -> Self {
        self.zone = zone;
        self
    }

    /// Width of every result row
    pub fn columns(&self) -> usize {
        1 + self.decile_count
    }

    /// Check the request against a raster with `band_count` bands
    pub fn validate(&self, band_count: usize) -> Result<()> {
        if self.bands.is_empty() {
            return Err(Error::Input("no bands requested".into()));
        }
        if let Some(&band) = self.bands.iter().find(|&&b| b == 0 || b > band_count) {
            return Err(Error::BandOutOfRange {
                band,
                count: band_count,
            });
        }
        if self.clip.lower.is_nan() || self.clip.upper.is_nan() {
            return Err(Error::InvalidParameter {
                name: "clip",
                value: format!("[{}, {}]", self.clip.lower, self.clip.upper),
                reason: "bounds must be numbers".into(),
            });
        }
        Ok(())
    }
}

/// Outcome of one drill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillResult {
    /// One row per requested band
    pub table: ResultTable,
    /// No-data value of the raster, echoed for rendering
    pub nodata: Option<f64>,
    pub metrics: RunMetrics,
}

impl DrillResult {
    /// `[rows, columns]` of the table
    pub fn shape(&self) -> [usize; 2] {
        self.table.shape()
    }
}

/// Compute the statistics of `zone` over `source`.
///
/// Any failure aborts the whole drill; there are no partial tables.
pub fn drill<S: RasterSource + ?Sized>(
    source: &S,
    zone: &Zone,
    params: &DrillParams,
) -> Result<DrillResult> {
    params.validate(source.band_count())?;

    // All bands share the data type and no-data value of band 1
    let info = source.band_info(1)?;
    let nodata = info.nodata.map(|v| v as f32);

    let resolved = resolve_window(&source.georeference(), zone, &params.zone)?;
    let sampler = BandSampler::new(source, &resolved.window, info.data_type)?;

    let mut table = ResultTable::new(params.decile_count);
    let mut recorder = MetricsRecorder::start();

    for group in stride_groups(&params.bands, params.band_strides) {
        let buffer = sampler.read(&group, &mut recorder)?;
        let rows: Vec<Vec<StatPoint>> = (0..buffer.band_count())
            .map(|i| band_row(buffer.band(i), &resolved.mask, nodata, params))
            .collect();

        match rows.as_slice() {
            [only] => table.push_row(only)?,
            [start, end] => {
                table.push_row(start)?;
                if group.interpolates() {
                    let interpolator = StrideInterpolator::new(start, end, group.len());
                    for row in interpolator.interior() {
                        table.push_row(&row)?;
                    }
                }
                table.push_row(end)?;
            }
            _ => {
                return Err(Error::Raster(format!(
                    "expected 1 or 2 bands from the source, got {}",
                    rows.len()
                )));
            }
        }
        debug!("Stride group {:?} done, {} rows so far", group.bands(), table.rows());
    }

    Ok(DrillResult {
        table,
        nodata: info.nodata,
        metrics: recorder.finish(),
    })
}

/// Central statistic followed by the deciles of one sampled band
fn band_row(
    values: ArrayView2<'_, f32>,
    mask: &MembershipMask,
    nodata: Option<f32>,
    params: &DrillParams,
) -> Vec<StatPoint> {
    let central = aggregate_band(values, mask, nodata, &params.clip, params.statistic);

    let mut row = Vec::with_capacity(params.columns());
    row.push(central);
    if params.decile_count > 0 {
        if central.count > 0 {
            row.extend(compute_deciles(values, mask, nodata, params.decile_count));
        } else {
            row.resize(params.columns(), StatPoint::empty());
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use drillstat_core::{DataType, ErrorKind, GeoTransform, MemoryRaster};
    use geo::{Geometry, LineString, Polygon};

    /// `bands` bands of 4x4 pixels over x 0..4, y 0..4; band `b` holds `b * 10 + pixel`
    fn raster(bands: usize) -> MemoryRaster {
        let samples: Vec<f32> = (1..=bands)
            .flat_map(|b| (0..16).map(move |i| (b * 10) as f32 + i as f32))
            .collect();
        MemoryRaster::from_vec(bands, 4, 4, samples)
            .unwrap()
            .with_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0))
            .with_nodata(Some(-999.0))
    }

    /// Window of the top-left 2x2 pixels (pixel indices 0, 1, 4, 5)
    fn top_left() -> Zone {
        Zone::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![(0.2, 1.8), (2.2, 1.8), (2.2, 3.8), (0.2, 3.8), (0.2, 1.8)]),
            vec![],
        )))
    }

    #[test]
    fn test_exact_per_band_means() {
        let result = drill(&raster(3), &top_left(), &DrillParams::new(vec![1, 2, 3])).unwrap();
        assert_eq!(result.shape(), [3, 1]);
        for (i, row) in result.table.iter_rows().enumerate() {
            let base = (i + 1) as f64 * 10.0;
            assert_relative_eq!(row[0].value, base + 2.5);
            assert_eq!(row[0].count, 4);
        }
        assert_eq!(result.nodata, Some(-999.0));
        // 3 bands x 4 pixels x 4 bytes
        assert_eq!(result.metrics.bytes_read, 48);
    }

    #[test]
    fn test_strides_interpolate_interior() {
        let params = DrillParams::new((1..=7).collect()).with_band_strides(3);
        let result = drill(&raster(7), &top_left(), &params).unwrap();
        assert_eq!(result.shape(), [7, 1]);
        // Bands vary linearly, so interpolation is exact
        for (i, row) in result.table.iter_rows().enumerate() {
            assert_relative_eq!(row[0].value, (i + 1) as f64 * 10.0 + 2.5, epsilon = 1e-9);
            assert_eq!(row[0].count, 4);
        }
        // groups [1,2,3] [4,5,6] [7]: 5 bands read
        assert_eq!(result.metrics.bytes_read, 5 * 16);
    }

    #[test]
    fn test_short_trailing_group_spans_its_own_length() {
        let params = DrillParams::new((1..=8).collect()).with_band_strides(5);
        let result = drill(&raster(8), &top_left(), &params).unwrap();
        assert_eq!(result.shape(), [8, 1]);
        let row = result.table.row(6).unwrap();
        assert_relative_eq!(row[0].value, 72.5, epsilon = 1e-9);
    }

    #[test]
    fn test_row_width_with_deciles_and_empty_bands() {
        let mut source = raster(2);
        source.band_mut(2).unwrap().fill(-999.0);
        let params = DrillParams::new(vec![1, 2]).with_decile_count(3);
        let result = drill(&source, &top_left(), &params).unwrap();

        assert_eq!(result.shape(), [2, 4]);
        assert!(result.table.iter_rows().all(|r| r.len() == 4));
        assert!(result.table.row(1).unwrap().iter().all(|p| *p == StatPoint::empty()));
        // population 10, 11, 14, 15: k = 4, step = 1, exact
        let deciles: Vec<f64> = result.table.row(0).unwrap()[1..].iter().map(|p| p.value).collect();
        assert_eq!(deciles, vec![12.5, 14.5, 15.0]);
    }

    #[test]
    fn test_coverage_fraction_request() {
        let params = DrillParams::new(vec![1])
            .with_statistic(Statistic::CoverageFraction)
            .with_clip(ClipRange::new(10.5, 14.5));
        let result = drill(&raster(1), &top_left(), &params).unwrap();
        let point = result.table.row(0).unwrap()[0];
        // 11 and 14 of 10, 11, 14, 15
        assert_relative_eq!(point.value, 0.5);
        assert_eq!(point.count, 4);
    }

    #[test]
    fn test_zone_outside_raster_yields_empty_rows() {
        let far = Zone::new(geo::Point::new(100.0, 100.0));
        let params = DrillParams::new(vec![1, 2]).with_decile_count(2);
        let result = drill(&raster(2), &far, &params).unwrap();
        assert_eq!(result.shape(), [2, 3]);
        assert!(result.table.points().iter().all(|p| *p == StatPoint::empty()));
    }

    #[test]
    fn test_band_out_of_range_is_input_error() {
        let err = drill(&raster(2), &top_left(), &DrillParams::new(vec![1, 3])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        let err = drill(&raster(2), &top_left(), &DrillParams::new(vec![])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_unknown_data_type_is_unsupported() {
        let source = raster(1).with_data_type(DataType::Unknown);
        let err = drill(&source, &top_left(), &DrillParams::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_non_positive_strides_clamp_to_one() {
        assert_eq!(DrillParams::default().with_band_strides(0).band_strides, 1);
        assert_eq!(DrillParams::default().with_band_strides(-4).band_strides, 1);
        assert_eq!(DrillParams::default().with_band_strides(6).band_strides, 6);
    }
}
