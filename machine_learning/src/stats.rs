use std::fmt;

use ndarray::ArrayView1;

use crate::dataset::{COLUMN_NAMES, Dataset};

/// Summary statistics of a single numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: &'static str,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, `NaN` for a single row.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn new(name: &'static str, column: ArrayView1<f64>) -> Self {
        let mut sorted = column.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = column.mean().unwrap_or(f64::NAN);
        let std = if count > 1 {
            column.std(1.0)
        } else {
            f64::NAN
        };

        Self {
            name,
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<16} count={} mean={:.6} std={:.6} min={:.6} 25%={:.6} 50%={:.6} 75%={:.6} max={:.6}",
            self.name,
            self.count,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max
        )
    }
}

/// Summarizes every numeric column of the dataset, features first, target last.
pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    COLUMN_NAMES
        .into_iter()
        .enumerate()
        .map(|(idx, name)| ColumnSummary::new(name, dataset.column(idx)))
        .collect()
}

/// Counts the rows holding each distinct value of a column.
///
/// # Arguments
/// * `column` - The column index, as in `COLUMN_NAMES`.
///
/// # Returns
/// `(value, rows)` pairs sorted by value.
///
/// # Panics
/// If `column` is out of bounds.
pub fn group_counts(dataset: &Dataset, column: usize) -> Vec<(f64, usize)> {
    let mut values = dataset.column(column).to_vec();
    values.sort_by(f64::total_cmp);

    let mut groups: Vec<(f64, usize)> = Vec::new();
    for value in values {
        match groups.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => groups.push((value, 1)),
        }
    }

    groups
}

/// Linearly interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };

    let pos = q * last as f64;
    let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
