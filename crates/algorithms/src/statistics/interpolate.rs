//! Linear interpolation of bands skipped by stride sampling

use super::table::StatPoint;

/// Fills in the rows between the two sampled endpoints of a stride group.
///
/// For each column, values move linearly from `start` to `end` over `span`
/// bands and every interior row carries the rounded mean of the endpoint
/// counts.
#[derive(Debug, Clone)]
pub struct StrideInterpolator<'a> {
    start: &'a [StatPoint],
    end: &'a [StatPoint],
    span: usize,
    beta: Vec<f64>,
    counts: Vec<i32>,
}

impl<'a> StrideInterpolator<'a> {
    /// `start` and `end` are the rows of the first and last band of a group
    /// that spans `span` bands; both rows must have the same width.
    pub fn new(start: &'a [StatPoint], end: &'a [StatPoint], span: usize) -> Self {
        debug_assert_eq!(start.len(), end.len());
        let steps = span.saturating_sub(1).max(1) as f64;
        let beta = start
            .iter()
            .zip(end)
            .map(|(s, e)| (e.value - s.value) / steps)
            .collect();
        let counts = start
            .iter()
            .zip(end)
            .map(|(s, e)| ((f64::from(s.count) + f64::from(e.count)) / 2.0).round() as i32)
            .collect();

        Self { start, end, span, beta, counts }
    }

    /// Row of band position `ip` within the group.
    ///
    /// Position 0 is the start row and `span - 1` the end row, reproduced
    /// exactly.
    pub fn row(&self, ip: usize) -> Vec<StatPoint> {
        if ip == 0 {
            return self.start.to_vec();
        }
        if ip + 1 >= self.span {
            return self.end.to_vec();
        }
        self.start
            .iter()
            .zip(&self.beta)
            .zip(&self.counts)
            .map(|((s, beta), &count)| StatPoint::new(s.value + ip as f64 * beta, count))
            .collect()
    }

    /// Rows strictly between the endpoints, in band order
    pub fn interior(&self) -> impl Iterator<Item = Vec<StatPoint>> + '_ {
        (1..self.span.saturating_sub(1)).map(|ip| self.row(ip))
    }
}
