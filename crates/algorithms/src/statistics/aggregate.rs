//! Central statistic of one band over a zone

use super::table::StatPoint;
use drillstat_core::MembershipMask;
use drillstat_core::raster::MASK_INSIDE;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Which central statistic a drill computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// Average of the valid values inside the clip range
    #[default]
    Mean,
    /// Share of valid pixels whose value lies inside the clip range
    CoverageFraction,
}

/// Inclusive value range `[lower, upper]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub lower: f32,
    pub upper: f32,
}

impl ClipRange {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl Default for ClipRange {
    /// No clipping
    fn default() -> Self {
        Self::new(f32::MIN, f32::MAX)
    }
}

/// Whether a sample counts as a measurement
#[inline]
pub(crate) fn is_valid(value: f32, nodata: Option<f32>) -> bool {
    !value.is_nan() && nodata.is_none_or(|nd| value != nd)
}

/// Aggregate one band's window over the zone.
///
/// Only pixels inside the mask whose value is not no-data (nor NaN) are
/// valid. With [`Statistic::Mean`] the valid values inside `clip` are
/// averaged and counted. With [`Statistic::CoverageFraction`] every valid
/// pixel is counted and the value is the fraction of them inside `clip`.
pub fn aggregate_band(
    values: ArrayView2<'_, f32>,
    mask: &MembershipMask,
    nodata: Option<f32>,
    clip: &ClipRange,
    statistic: Statistic,
) -> StatPoint {
    let mut sum = 0.0_f64;
    let mut total = 0_u64;

    let valid = values
        .iter()
        .zip(mask.iter())
        .filter(|&(&v, &m)| m == MASK_INSIDE && is_valid(v, nodata))
        .map(|(&v, _)| v);

    for v in valid {
        match statistic {
            Statistic::Mean => {
                if clip.contains(v) {
                    sum += f64::from(v);
                    total += 1;
                }
            }
            Statistic::CoverageFraction => {
                total += 1;
                if clip.contains(v) {
                    sum += 1.0;
                }
            }
        }
    }

    if total == 0 {
        return StatPoint::empty();
    }
    StatPoint::new(sum / total as f64, i32::try_from(total).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use drillstat_core::PixelWindow;
    use ndarray::Array2;

    fn full_mask(rows: usize, cols: usize) -> MembershipMask {
        let window = PixelWindow::new(0, 0, cols, rows);
        MembershipMask::from_vec(&window, vec![MASK_INSIDE; rows * cols]).unwrap()
    }

    fn values(v: &[f32], rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_vec((rows, cols), v.to_vec()).unwrap()
    }

    #[test]
    fn test_mean_of_four_pixels() {
        let data = values(&[1.0, 2.0, 3.0, 4.0], 2, 2);
        let point = aggregate_band(
            data.view(),
            &full_mask(2, 2),
            Some(-999.0),
            &ClipRange::new(0.0, 10.0),
            Statistic::Mean,
        );
        assert_relative_eq!(point.value, 2.5);
        assert_eq!(point.count, 4);
    }

    #[test]
    fn test_coverage_fraction() {
        let data = values(&[1.0, 2.0, 3.0, 4.0], 2, 2);
        let point = aggregate_band(
            data.view(),
            &full_mask(2, 2),
            Some(-999.0),
            &ClipRange::new(2.0, 3.0),
            Statistic::CoverageFraction,
        );
        assert_relative_eq!(point.value, 0.5);
        assert_eq!(point.count, 4);
    }

    #[test]
    fn test_coverage_is_one_when_all_in_range() {
        let data = values(&[5.0, 6.5, 7.0, 9.0, 9.5, 10.0], 2, 3);
        let clip = ClipRange::new(5.0, 10.0);
        let mask = full_mask(2, 3);
        let mean = aggregate_band(data.view(), &mask, None, &clip, Statistic::Mean);
        let coverage = aggregate_band(data.view(), &mask, None, &clip, Statistic::CoverageFraction);
        assert_relative_eq!(coverage.value, 1.0);
        assert_eq!(coverage.count, mean.count);
    }

    #[test]
    fn test_mask_nodata_and_nan_are_excluded() {
        let data = values(&[1.0, -999.0, f32::NAN, 4.0, 100.0, 6.0], 2, 3);
        let window = PixelWindow::new(0, 0, 3, 2);
        let mask = MembershipMask::from_vec(&window, vec![255, 255, 255, 255, 0, 255]).unwrap();
        let point = aggregate_band(
            data.view(),
            &mask,
            Some(-999.0),
            &ClipRange::default(),
            Statistic::Mean,
        );
        // 1, 4 and 6 remain
        assert_relative_eq!(point.value, 11.0 / 3.0);
        assert_eq!(point.count, 3);
    }

    #[test]
    fn test_mean_excludes_values_outside_clip() {
        let data = values(&[1.0, 2.0, 3.0, 40.0], 1, 4);
        let point = aggregate_band(
            data.view(),
            &full_mask(1, 4),
            None,
            &ClipRange::new(2.0, 10.0),
            Statistic::Mean,
        );
        assert_relative_eq!(point.value, 2.5);
        assert_eq!(point.count, 2);
    }

    #[test]
    fn test_no_valid_pixels_is_zero() {
        let data = values(&[-999.0, -999.0], 1, 2);
        for statistic in [Statistic::Mean, Statistic::CoverageFraction] {
            let point = aggregate_band(
                data.view(),
                &full_mask(1, 2),
                Some(-999.0),
                &ClipRange::default(),
                statistic,
            );
            assert_eq!(point, StatPoint::empty());
        }
    }

    #[test]
    fn test_statistic_serde_names() {
        let s: Statistic = serde_json::from_str("\"coverage_fraction\"").unwrap();
        assert_eq!(s, Statistic::CoverageFraction);
        assert_eq!(serde_json::to_string(&Statistic::Mean).unwrap(), "\"mean\"");
    }
}
