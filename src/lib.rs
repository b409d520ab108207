//! Credit-risk screening on the German credit dataset.
//!
//! The crate implements the full batch pipeline as explicit stages with
//! data handed from one to the next, with no shared state between them:
//!
//! 1. [`dataset`]: load the delimited input into an immutable columnar
//!    table, checked against the fixed 20-attribute schema.
//! 2. [`analysis`]: descriptive statistics for the textual report.
//! 3. [`split`]: seeded, stratified train/test partition.
//! 4. [`preprocessing`]: min-max scaling of the numeric columns and
//!    one-hot expansion of the categorical columns, fit on training data
//!    only.
//! 5. [`model_selection`]: exhaustive grid search over the multilayer
//!    perceptron's activation, solver and learning-rate schedule, scored
//!    by k-fold cross-validated accuracy.
//! 6. [`evaluation`]: holdout scoring of the winning configuration with a
//!    per-class classification report.
//!
//! The accompanying `credit-risk` binary wires the stages together for a
//! single run over one input file.

pub mod analysis;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod mlp;
pub mod model_selection;
pub mod preprocessing;
pub mod schema;
pub mod split;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use schema::Label;
