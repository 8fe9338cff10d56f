use std::{borrow::Cow, fs::File, io, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{MlErr, Result};

/// The amount of feature columns of every observation.
pub const N_FEATURES: usize = 4;

/// Feature columns, in the order the models are fitted with.
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["pf_time_of_day", "bg_value", "food_value", "exercise_value"];

/// The column the models learn to predict.
pub const TARGET_NAME: &str = "ins_value";

/// Every numeric column: the features followed by the target.
pub const COLUMN_NAMES: [&str; N_FEATURES + 1] = [
    FEATURE_NAMES[0],
    FEATURE_NAMES[1],
    FEATURE_NAMES[2],
    FEATURE_NAMES[3],
    TARGET_NAME,
];

/// Optional column that assigns every observation to a user.
pub const USER_COLUMN: &str = "userid";

/// An immutable table of historical observations.
///
/// Every row holds the `N_FEATURES` feature values and one target value, all finite.
/// When the source carries a `userid` column, every row is also tagged with its owner.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    targets: Array1<f64>,
    users: Option<Vec<String>>,
}

impl Dataset {
    /// Creates a new `Dataset` from a feature matrix and its targets.
    ///
    /// # Arguments
    /// * `features` - A `(rows, N_FEATURES)` matrix.
    /// * `targets` - One target per row.
    ///
    /// # Errors
    /// Fails if the shapes don't line up, there are no rows or any value is not finite.
    pub fn new(features: Array2<f64>, targets: Array1<f64>) -> Result<Self> {
        if features.ncols() != N_FEATURES {
            return Err(MlErr::SizeMismatch {
                a: "features",
                b: "feature names",
                got: features.ncols(),
                expected: N_FEATURES,
            });
        }

        if features.nrows() != targets.len() {
            return Err(MlErr::SizeMismatch {
                a: "features",
                b: "targets",
                got: targets.len(),
                expected: features.nrows(),
            });
        }

        if targets.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        for (row, (x, y)) in features.outer_iter().zip(&targets).enumerate() {
            let cells = x.iter().chain(std::iter::once(y));
            if let Some((column, value)) = COLUMN_NAMES
                .into_iter()
                .zip(cells)
                .find(|(_, v)| !v.is_finite())
            {
                return Err(MlErr::InvalidValue {
                    row: row + 1,
                    column,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            features,
            targets,
            users: None,
        })
    }

    /// Tags every row with the user it belongs to.
    ///
    /// # Errors
    /// Fails if there isn't exactly one user per row.
    pub fn with_users(mut self, users: Vec<String>) -> Result<Self> {
        if users.len() != self.len() {
            return Err(MlErr::SizeMismatch {
                a: "users",
                b: "rows",
                got: users.len(),
                expected: self.len(),
            });
        }

        self.users = Some(users);
        Ok(self)
    }

    /// Loads a dataset from a CSV file with a header row.
    ///
    /// # Arguments
    /// * `path` - The location of the CSV file.
    ///
    /// # Errors
    /// Fails if the file can't be read or its content is malformed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(csv::Error::from)?;
        let dataset = Self::from_reader(file)?;
        debug!("loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Loads a dataset from any CSV source with a header row.
    ///
    /// Columns are located by name, so their order in the source doesn't matter. The
    /// only column allowed besides the numeric ones is `userid`.
    ///
    /// # Errors
    /// Fails on I/O errors, missing or unknown columns, ragged rows and non finite cells.
    pub fn from_reader<R: io::Read>(rdr: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(rdr);

        let layout = ColumnLayout::from_headers(reader.headers()?)?;

        let mut values = Vec::new();
        let mut targets = Vec::new();
        let mut users = layout.user.map(|_| Vec::new());

        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let row = idx + 1;

            for (&column, name) in layout.features.iter().zip(FEATURE_NAMES) {
                values.push(parse_cell(&record, column, row, name)?);
            }
            targets.push(parse_cell(&record, layout.target, row, TARGET_NAME)?);

            if let (Some(column), Some(users)) = (layout.user, users.as_mut()) {
                let user = record.get(column).unwrap_or_default();
                if user.is_empty() {
                    return Err(MlErr::InvalidValue {
                        row,
                        column: USER_COLUMN,
                        value: user.to_string(),
                    });
                }
                users.push(user.to_string());
            }
        }

        let rows = targets.len();
        let features =
            Array2::from_shape_vec((rows, N_FEATURES), values).map_err(|_| MlErr::SizeMismatch {
                a: "feature values",
                b: "rows",
                got: rows,
                expected: rows * N_FEATURES,
            })?;

        let dataset = Self::new(features, Array1::from(targets))?;
        match users {
            Some(users) => dataset.with_users(users),
            None => Ok(dataset),
        }
    }

    /// Returns the amount of rows.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Returns the `(rows, N_FEATURES)` feature matrix.
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn targets(&self) -> ArrayView1<'_, f64> {
        self.targets.view()
    }

    /// Returns one of the numeric columns, indexed as in `COLUMN_NAMES`.
    ///
    /// # Panics
    /// If `idx` is not smaller than `COLUMN_NAMES.len()`.
    pub fn column(&self, idx: usize) -> ArrayView1<'_, f64> {
        match idx {
            N_FEATURES => self.targets.view(),
            idx => self.features.column(idx),
        }
    }

    /// Returns up to `n` leading rows, features followed by the target.
    pub fn head(&self, n: usize) -> Vec<[f64; N_FEATURES + 1]> {
        self.features
            .outer_iter()
            .zip(&self.targets)
            .take(n)
            .map(|(x, &y)| [x[0], x[1], x[2], x[3], y])
            .collect()
    }

    /// Whether every row is tagged with a user.
    pub fn is_partitioned(&self) -> bool {
        self.users.is_some()
    }

    /// Returns the observations a user's model should be trained on.
    ///
    /// A dataset without a `userid` column is shared by everyone, so it is returned
    /// untouched.
    ///
    /// # Returns
    /// `None` if the dataset is partitioned and the user has no rows.
    pub fn for_user(&self, user: &str) -> Option<Cow<'_, Self>> {
        let Some(users) = &self.users else {
            return Some(Cow::Borrowed(self));
        };

        let rows: Vec<usize> = users
            .iter()
            .enumerate()
            .filter_map(|(idx, owner)| (owner == user).then_some(idx))
            .collect();

        if rows.is_empty() {
            return None;
        }

        let (features, targets) = self.select(&rows);
        Some(Cow::Owned(Self {
            features,
            targets,
            users: Some(vec![user.to_string(); rows.len()]),
        }))
    }

    /// Copies out the given rows.
    ///
    /// # Panics
    /// If any index is out of bounds.
    pub fn select(&self, rows: &[usize]) -> (Array2<f64>, Array1<f64>) {
        (
            self.features.select(Axis(0), rows),
            self.targets.select(Axis(0), rows),
        )
    }
}

/// Where each known column lives inside a CSV record.
struct ColumnLayout {
    features: [usize; N_FEATURES],
    target: usize,
    user: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut numeric = [None; N_FEATURES + 1];
        let mut user = None;

        for (idx, header) in headers.iter().enumerate() {
            let slot = match COLUMN_NAMES.iter().position(|name| *name == header) {
                Some(pos) => &mut numeric[pos],
                None if header == USER_COLUMN => &mut user,
                None => return Err(MlErr::UnexpectedColumn(header.to_string())),
            };

            if slot.replace(idx).is_some() {
                return Err(MlErr::UnexpectedColumn(header.to_string()));
            }
        }

        let mut columns = [0; N_FEATURES + 1];
        for ((column, found), name) in columns.iter_mut().zip(numeric).zip(COLUMN_NAMES) {
            *column = found.ok_or(MlErr::MissingColumn(name))?;
        }

        let [f0, f1, f2, f3, target] = columns;
        Ok(Self {
            features: [f0, f1, f2, f3],
            target,
            user,
        })
    }
}

fn parse_cell(record: &StringRecord, column: usize, row: usize, name: &'static str) -> Result<f64> {
    let raw = record.get(column).unwrap_or_default();
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MlErr::InvalidValue {
            row,
            column: name,
            value: raw.to_string(),
        }),
    }
}
