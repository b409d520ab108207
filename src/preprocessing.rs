//! Column-wise feature preprocessing
//!
//! Two independent transforms compose into the [`Preprocessor`]: numeric
//! columns are rescaled into `[0, 1]` from bounds learned on the training
//! set, categorical columns are expanded into indicator blocks over a
//! vocabulary learned on the training set. Both are fit once and applied
//! read-only afterwards, so no information from test or inference records
//! leaks into the learned state.
//!
//! Apply-time policy, by design rather than accident: numeric values beyond
//! the fitted bounds are clamped into `[0, 1]`, and a categorical value
//! never seen during fitting encodes as an all-zero indicator block.

use std::collections::HashMap;

use approx::abs_diff_eq;
use ndarray::{concatenate, Array1, Array2, Axis, Zip};

use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// Min-max scaler: learns per-column bounds from a training block,
/// producing a [`FittedMinMaxScaler`] that rescales any block with the same
/// columns.
pub struct MinMaxScaler;

impl MinMaxScaler {
    /// Learn per-column minima and maxima.
    ///
    /// A column that is constant over the training block has no usable
    /// range; that is a configuration error here, not something to paper
    /// over at transform time.
    pub fn fit(records: &Array2<f64>, names: &[String]) -> Result<FittedMinMaxScaler> {
        if records.nrows() == 0 {
            return Err(Error::EmptySet);
        }
        let mins = records.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
        let maxes = records.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));

        let mut ranges = maxes;
        for (j, range) in ranges.iter_mut().enumerate() {
            if abs_diff_eq!(*range, mins[j]) {
                return Err(Error::DegenerateColumn(names[j].clone()));
            }
            *range -= mins[j];
        }

        Ok(FittedMinMaxScaler { mins, ranges })
    }
}

/// The result of fitting a [`MinMaxScaler`].
#[derive(Debug, Clone)]
pub struct FittedMinMaxScaler {
    mins: Array1<f64>,
    ranges: Array1<f64>,
}

impl FittedMinMaxScaler {
    /// Per-column minima learned during fitting.
    pub fn mins(&self) -> &Array1<f64> {
        &self.mins
    }

    /// Per-column ranges (max - min) learned during fitting.
    pub fn ranges(&self) -> &Array1<f64> {
        &self.ranges
    }

    /// Scale a block of numeric columns with the fitted bounds.
    ///
    /// Values outside the fitted range map outside `[0, 1]` and are clamped
    /// back in. Panics if the block does not have the fitted column count.
    pub fn transform(&self, records: &Array2<f64>) -> Array2<f64> {
        assert_eq!(
            records.ncols(),
            self.mins.len(),
            "Number of columns must match the number of fitted columns."
        );
        let mut scaled = records.to_owned();
        Zip::from(scaled.columns_mut())
            .and(&self.mins)
            .and(&self.ranges)
            .for_each(|mut column, &min, &range| {
                column.mapv_inplace(|v| ((v - min) / range).clamp(0.0, 1.0));
            });
        scaled
    }
}

/// One-hot encoder: learns a fixed, ordered vocabulary per categorical
/// column, producing a [`FittedOneHotEncoder`].
pub struct OneHotEncoder;

impl OneHotEncoder {
    /// Enumerate the distinct values of every column in first-seen order.
    pub fn fit(columns: &[Vec<String>]) -> FittedOneHotEncoder {
        let mut vocabularies = Vec::with_capacity(columns.len());
        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            let mut vocabulary: Vec<String> = Vec::new();
            let mut index: HashMap<String, usize> = HashMap::new();
            for value in column {
                if !index.contains_key(value) {
                    index.insert(value.clone(), vocabulary.len());
                    vocabulary.push(value.clone());
                }
            }
            vocabularies.push(vocabulary);
            indices.push(index);
        }
        FittedOneHotEncoder {
            vocabularies,
            indices,
        }
    }
}

/// The result of fitting a [`OneHotEncoder`].
#[derive(Debug, Clone)]
pub struct FittedOneHotEncoder {
    vocabularies: Vec<Vec<String>>,
    indices: Vec<HashMap<String, usize>>,
}

impl FittedOneHotEncoder {
    /// Expand every column into its indicator block.
    ///
    /// Each known value sets exactly one entry of its column's block; a
    /// value absent from the fitted vocabulary leaves the block all zero.
    /// Panics if the column count differs from the fitted one.
    pub fn transform(&self, columns: &[Vec<String>]) -> Array2<f64> {
        assert_eq!(
            columns.len(),
            self.indices.len(),
            "Number of columns must match the number of fitted columns."
        );
        let nsamples = columns.first().map_or(0, |column| column.len());
        let mut encoded = Array2::zeros((nsamples, self.encoded_len()));

        let mut offset = 0;
        for (column, index) in columns.iter().zip(&self.indices) {
            for (row, value) in column.iter().enumerate() {
                if let Some(&position) = index.get(value) {
                    encoded[(row, offset + position)] = 1.0;
                }
            }
            offset += index.len();
        }
        encoded
    }

    /// Width of the indicator expansion over all columns.
    pub fn encoded_len(&self) -> usize {
        self.vocabularies.iter().map(|v| v.len()).sum()
    }

    /// The fitted vocabulary of one column, in indicator order.
    pub fn vocabulary(&self, column: usize) -> &[String] {
        &self.vocabularies[column]
    }
}

/// The composed column pipeline: scaled numerics first, then one indicator
/// block per categorical column, in schema order.
pub struct Preprocessor;

impl Preprocessor {
    /// Fit both transforms on a training dataset.
    pub fn fit(dataset: &Dataset) -> Result<FittedPreprocessor> {
        let scaler = MinMaxScaler::fit(dataset.numeric(), dataset.numeric_names())?;
        let encoder = OneHotEncoder::fit(dataset.categorical());
        Ok(FittedPreprocessor {
            numeric_names: dataset.numeric_names().to_vec(),
            categorical_names: dataset.categorical_names().to_vec(),
            scaler,
            encoder,
        })
    }
}

/// Fitted transform state: the numeric bounds table plus the categorical
/// vocabularies, and the record → feature-vector map they induce.
pub struct FittedPreprocessor {
    numeric_names: Vec<String>,
    categorical_names: Vec<String>,
    scaler: FittedMinMaxScaler,
    encoder: FittedOneHotEncoder,
}

impl FittedPreprocessor {
    /// The fitted numeric bounds table.
    pub fn scaler(&self) -> &FittedMinMaxScaler {
        &self.scaler
    }

    /// The fitted categorical vocabularies.
    pub fn encoder(&self) -> &FittedOneHotEncoder {
        &self.encoder
    }

    /// Map every record of `dataset` to its feature vector.
    pub fn transform(&self, dataset: &Dataset) -> Array2<f64> {
        let scaled = self.scaler.transform(dataset.numeric());
        let encoded = self.encoder.transform(dataset.categorical());
        concatenate![Axis(1), scaled, encoded]
    }

    /// Width of the produced feature vectors.
    pub fn n_features(&self) -> usize {
        self.numeric_names.len() + self.encoder.encoded_len()
    }

    /// Output column names, in feature-vector order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_names.clone();
        for (column, name) in self.categorical_names.iter().enumerate() {
            for value in self.encoder.vocabulary(column) {
                names.push(format!("{}={}", name, value));
            }
        }
        names
    }
}
