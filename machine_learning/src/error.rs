use std::{
    error::Error,
    fmt::{self, Display},
};

use smartcore::error::Failed;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// The dataset source could not be read or is not valid CSV.
    Csv(csv::Error),
    MissingColumn(&'static str),
    UnexpectedColumn(String),
    /// A cell is not a finite number.
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    EmptyDataset,
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    NotEnoughSamples {
        got: usize,
        expected: usize,
    },
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    /// The system of normal equations has no unique solution.
    SingularMatrix,
    /// smartcore refused the samples or failed to fit them.
    Solver(Failed),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::Csv(e) => write!(f, "failed to read dataset: {e}"),
            MlErr::MissingColumn(name) => write!(f, "dataset is missing the `{name}` column"),
            MlErr::UnexpectedColumn(name) => {
                write!(f, "dataset has an unexpected column `{name}`")
            }
            MlErr::InvalidValue { row, column, value } => write!(
                f,
                "row {row}: `{column}` must be a finite number, got {value:?}"
            ),
            MlErr::EmptyDataset => write!(f, "dataset has no rows"),
            MlErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            MlErr::NotEnoughSamples { got, expected } => write!(
                f,
                "not enough samples, got {got} and at least {expected} are required"
            ),
            MlErr::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter `{name}`: {reason}")
            }
            MlErr::SingularMatrix => write!(f, "the training data is degenerate (singular matrix)"),
            MlErr::Solver(e) => write!(f, "failed to fit the model: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for MlErr {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<Failed> for MlErr {
    fn from(value: Failed) -> Self {
        Self::Solver(value)
    }
}
