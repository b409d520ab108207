//! Error types for the credit-risk pipeline
//!

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("expected {expected} columns in the header, found {found}")]
    HeaderMismatch { expected: usize, found: usize },
    #[error("column {0:?} missing from the input")]
    MissingColumn(String),
    #[error("unrecognized label {0:?}, expected \"good\" or \"bad\"")]
    UnknownLabel(String),
    #[error("column {column:?} contains a non-numeric value {value:?}")]
    InvalidNumericField { column: String, value: String },
    #[error("mismatched shapes: {0} records against {1} targets")]
    MismatchedShapes(usize, usize),
    #[error("not enough samples")]
    EmptySet,
    #[error("input contains non-finite values")]
    InvalidValues,
    #[error("column {0:?} is constant over the training set and cannot be scaled")]
    DegenerateColumn(String),
    #[error("test fraction must lie in (0, 1), got {0}")]
    InvalidTestFraction(f64),
    #[error("fold count must be at least 2 and at most the number of samples, got {0}")]
    InvalidFoldCount(usize),
    #[error("hidden layers must be non-empty with non-zero sizes")]
    InvalidHiddenLayers,
    #[error("learning rate must be positive and finite, got {0}")]
    InvalidLearningRate(f64),
    #[error("iteration cap must be non-zero")]
    InvalidIterationCap,
    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
    #[error("patience must be non-zero")]
    InvalidPatience,
    #[error("loss diverged at iteration {0}")]
    DivergedLoss(usize),
    #[error("the parameter grid is empty")]
    EmptyGrid,
    #[error("every grid candidate failed to train")]
    NoViableCandidate,
}
