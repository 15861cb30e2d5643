//! Nearest-rank decile estimation

use super::aggregate::is_valid;
use super::table::StatPoint;
use drillstat_core::MembershipMask;
use drillstat_core::raster::MASK_INSIDE;
use ndarray::ArrayView2;

/// Estimate `decile_count` quantiles of one band over the zone.
///
/// The population is every masked, valid pixel; the clip range does not
/// apply here. Each estimate carries `count = 1`. An empty population gives
/// `decile_count` empty points.
pub fn compute_deciles(
    values: ArrayView2<'_, f32>,
    mask: &MembershipMask,
    nodata: Option<f32>,
    decile_count: usize,
) -> Vec<StatPoint> {
    let mut population: Vec<f32> = values
        .iter()
        .zip(mask.iter())
        .filter(|&(&v, &m)| m == MASK_INSIDE && is_valid(v, nodata))
        .map(|(&v, _)| v)
        .collect();

    if population.is_empty() {
        return vec![StatPoint::empty(); decile_count];
    }

    population.sort_unstable_by(f32::total_cmp);
    deciles_of_sorted(&population, decile_count)
        .into_iter()
        .map(|v| StatPoint::new(v, 1))
        .collect()
}

/// Deciles of an ascending, non-empty population.
///
/// With `k = decile_count + 1` and `step = N / k`, decile `i` sits at rank
/// `(i + 1) * step`. When `N` splits exactly into `k` parts the value is the
/// average of that rank and the next one. A population smaller than `k`
/// is padded instead: the slots are dealt out cyclically over the values and
/// each value is repeated for its slots, keeping the output ascending.
pub fn deciles_of_sorted(sorted: &[f32], decile_count: usize) -> Vec<f64> {
    let n = sorted.len();
    let k = decile_count + 1;
    let step = n / k;

    if step == 0 {
        let mut slots = vec![0_usize; n];
        for i in 0..decile_count {
            slots[i % n] += 1;
        }
        return sorted
            .iter()
            .zip(slots)
            .flat_map(|(&v, times)| std::iter::repeat_n(f64::from(v), times))
            .collect();
    }

    let exact = n % k == 0;
    (1..=decile_count)
        .map(|i| {
            let rank = i * step;
            if exact {
                let next = (rank + 1).min(n - 1);
                (f64::from(sorted[rank]) + f64::from(sorted[next])) / 2.0
            } else {
                f64::from(sorted[rank])
            }
        })
        .collect()
}
