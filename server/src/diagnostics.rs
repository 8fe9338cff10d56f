//! Textual reports about the dataset and the candidate algorithms, printed by the
//! binary's `describe` and `compare` modes.

use std::fmt::Write;

use machine_learning::{
    COLUMN_NAMES, Dataset, FEATURE_NAMES, Result,
    comparison::{self, DEFAULT_FOLDS},
    split::train_test_split,
    stats,
};

use crate::trainer::TrainerConfig;

/// The amount of leading rows shown by `describe`.
pub const HEAD_ROWS: usize = 20;

/// Shape, leading rows, per column statistics and the rows per time of day.
pub fn describe(dataset: &Dataset) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "shape: ({}, {})", dataset.len(), COLUMN_NAMES.len());
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", COLUMN_NAMES.join(","));
    for row in dataset.head(HEAD_ROWS) {
        let cells: Vec<String> = row.iter().map(f64::to_string).collect();
        let _ = writeln!(out, "{}", cells.join(","));
    }
    let _ = writeln!(out);

    for summary in stats::describe(dataset) {
        let _ = writeln!(out, "{summary}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "rows per {}:", FEATURE_NAMES[0]);
    for (value, rows) in stats::group_counts(dataset, 0) {
        let _ = writeln!(out, "{value:>8} {rows}");
    }

    out
}

/// Cross validates the candidate algorithms on the same training partition a
/// train uses.
///
/// # Errors
/// Fails if the dataset can't be split or any candidate can't be fitted.
pub fn compare(dataset: &Dataset, config: &TrainerConfig) -> Result<String> {
    let split = train_test_split(dataset.len(), config.test_fraction, config.seed)?;
    let (x, y) = dataset.select(&split.train);

    let results = comparison::compare(
        &comparison::default_candidates(),
        x.view(),
        y.view(),
        DEFAULT_FOLDS,
    )?;

    let mut out = String::new();
    for result in results {
        let _ = writeln!(out, "{result}");
    }
    Ok(out)
}
