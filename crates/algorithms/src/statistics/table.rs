//! Per-band statistic rows

use drillstat_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// One aggregate for one band: a mean, a coverage fraction or a decile.
///
/// `count == 0` means no valid pixels, and then `value` is 0 rather than NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatPoint {
    pub value: f64,
    pub count: i32,
}

impl StatPoint {
    pub fn new(value: f64, count: i32) -> Self {
        Self { value, count }
    }

    /// The "no valid pixels" point
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Row-major table of [`StatPoint`]s, one row per requested band.
///
/// Column 0 holds the central statistic, columns `1..` the deciles in
/// ascending order. Every row has exactly [`columns`](Self::columns) entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: usize,
    points: Vec<StatPoint>,
}

impl ResultTable {
    /// An empty table for `decile_count` deciles per band
    pub fn new(decile_count: usize) -> Self {
        Self {
            columns: 1 + decile_count,
            points: Vec::new(),
        }
    }

    /// Append one band's row
    pub fn push_row(&mut self, row: &[StatPoint]) -> Result<()> {
        if row.len() != self.columns {
            return Err(Error::InvalidParameter {
                name: "row",
                value: row.len().to_string(),
                reason: format!("table rows have {} columns", self.columns),
            });
        }
        self.points.extend_from_slice(row);
        Ok(())
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.points.len() / self.columns
    }

    /// `[rows, columns]`
    pub fn shape(&self) -> [usize; 2] {
        [self.rows(), self.columns]
    }

    pub fn row(&self, index: usize) -> Option<&[StatPoint]> {
        let start = index * self.columns;
        self.points.get(start..start + self.columns)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[StatPoint]> {
        self.points.chunks_exact(self.columns)
    }

    /// All points, row-major
    pub fn points(&self) -> &[StatPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<StatPoint> {
        self.points
    }
}
