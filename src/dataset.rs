//! In-memory dataset and CSV loading
//!
//! A [`Dataset`] is a columnar, immutable table: one `ndarray` block for
//! the numeric columns, one string vector per categorical column and one
//! label per record. [`Dataset::from_reader`] parses a delimited file with
//! a header row against the fixed credit schema; [`Dataset::new`] builds a
//! dataset with an arbitrary column set, which the splitter and the fold
//! rotation use to derive row subsets.

use std::collections::HashMap;
use std::io::Read;

use csv::ReaderBuilder;
use ndarray::{Array2, Axis};

use crate::error::{Error, Result};
use crate::schema::{self, Label};

/// An ordered collection of records sharing a fixed column set.
///
/// Immutable once constructed; every derivation (splits, folds) produces a
/// new dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    numeric_names: Vec<String>,
    numeric: Array2<f64>,
    categorical_names: Vec<String>,
    categorical: Vec<Vec<String>>,
    labels: Vec<Label>,
}

impl Dataset {
    /// Build a dataset from its columnar parts.
    ///
    /// All blocks must agree on the number of records and there must be at
    /// least one record.
    pub fn new(
        numeric_names: Vec<String>,
        numeric: Array2<f64>,
        categorical_names: Vec<String>,
        categorical: Vec<Vec<String>>,
        labels: Vec<Label>,
    ) -> Result<Dataset> {
        if labels.is_empty() {
            return Err(Error::EmptySet);
        }
        if numeric.nrows() != labels.len() {
            return Err(Error::MismatchedShapes(numeric.nrows(), labels.len()));
        }
        if numeric_names.len() != numeric.ncols() {
            return Err(Error::MismatchedShapes(numeric_names.len(), numeric.ncols()));
        }
        if categorical_names.len() != categorical.len() {
            return Err(Error::MismatchedShapes(
                categorical_names.len(),
                categorical.len(),
            ));
        }
        for column in &categorical {
            if column.len() != labels.len() {
                return Err(Error::MismatchedShapes(column.len(), labels.len()));
            }
        }
        Ok(Dataset {
            numeric_names,
            numeric,
            categorical_names,
            categorical,
            labels,
        })
    }

    /// Parse a delimited file with a header row against the credit schema.
    ///
    /// The header must contain exactly the 20 schema attributes plus the
    /// `class` label column, in any order. Numeric fields must parse as
    /// floating point and every label must be one of the two recognized
    /// literals; anything else aborts the load.
    pub fn from_reader<R: Read>(reader: R) -> Result<Dataset> {
        let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let header = csv_reader.headers()?.clone();
        if header.len() != schema::HEADER_WIDTH {
            return Err(Error::HeaderMismatch {
                expected: schema::HEADER_WIDTH,
                found: header.len(),
            });
        }
        let positions: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(index, name)| (name, index))
            .collect();
        let column_position = |name: &str| -> Result<usize> {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };

        let numeric_positions = schema::NUMERIC_COLUMNS
            .iter()
            .map(|name| column_position(name))
            .collect::<Result<Vec<_>>>()?;
        let categorical_positions = schema::CATEGORICAL_COLUMNS
            .iter()
            .map(|name| column_position(name))
            .collect::<Result<Vec<_>>>()?;
        let label_position = column_position(schema::LABEL_COLUMN)?;

        let mut numeric_values = Vec::new();
        let mut categorical: Vec<Vec<String>> =
            vec![Vec::new(); schema::CATEGORICAL_COLUMNS.len()];
        let mut labels = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            for (&position, &name) in numeric_positions.iter().zip(schema::NUMERIC_COLUMNS.iter())
            {
                let field = &record[position];
                let value = field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidNumericField {
                        column: name.to_string(),
                        value: field.to_string(),
                    })?;
                numeric_values.push(value);
            }
            for (&position, column) in categorical_positions.iter().zip(categorical.iter_mut()) {
                column.push(record[position].to_string());
            }
            labels.push(record[label_position].parse::<Label>()?);
        }

        let numeric = Array2::from_shape_vec(
            (labels.len(), schema::NUMERIC_COLUMNS.len()),
            numeric_values,
        )
        .map_err(|_| Error::EmptySet)?;

        Dataset::new(
            schema::NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
            numeric,
            schema::CATEGORICAL_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            categorical,
            labels,
        )
    }

    /// Number of records.
    pub fn nsamples(&self) -> usize {
        self.labels.len()
    }

    /// The numeric feature block, one row per record.
    pub fn numeric(&self) -> &Array2<f64> {
        &self.numeric
    }

    pub fn numeric_names(&self) -> &[String] {
        &self.numeric_names
    }

    /// The categorical columns, column-major.
    pub fn categorical(&self) -> &[Vec<String>] {
        &self.categorical
    }

    pub fn categorical_names(&self) -> &[String] {
        &self.categorical_names
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Count the records carrying `label`.
    pub fn label_count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// Derive a new dataset from a subset of rows, in the given order.
    ///
    /// Panics if an index is out of bounds.
    pub fn take_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            numeric_names: self.numeric_names.clone(),
            numeric: self.numeric.select(Axis(0), indices),
            categorical_names: self.categorical_names.clone(),
            categorical: self
                .categorical
                .iter()
                .map(|column| indices.iter().map(|&i| column[i].clone()).collect())
                .collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const HEADER: &str = "checking_status,duration,credit_history,purpose,credit_amount,\
savings_status,employment,installment_commitment,personal_status,other_parties,\
residence_since,property_magnitude,age,other_payment_plans,housing,existing_credits,\
job,num_dependents,own_telephone,foreign_worker,class";

    const ROW_GOOD: &str = "<0,6,critical/other existing credit,radio/tv,1169,\
no known savings,>=7,4,male single,none,4,real estate,67,none,own,2,skilled,1,yes,yes,good";

    const ROW_BAD: &str = "0<=X<200,48,existing paid,radio/tv,5951,<100,1<=X<4,2,\
female div/dep/mar,none,2,real estate,22,none,own,1,skilled,1,none,yes,bad";

    fn csv_input(rows: &[&str]) -> String {
        let mut input = String::from(HEADER);
        for row in rows {
            input.push('\n');
            input.push_str(row);
        }
        input
    }

    #[test]
    fn loads_records_against_the_schema() {
        let input = csv_input(&[ROW_GOOD, ROW_BAD]);
        let dataset = Dataset::from_reader(input.as_bytes()).unwrap();

        assert_eq!(dataset.nsamples(), 2);
        assert_eq!(dataset.numeric().ncols(), 7);
        assert_eq!(dataset.categorical().len(), 13);
        assert_eq!(dataset.labels(), &[Label::Good, Label::Bad]);
        // duration and age land in their schema positions
        assert_eq!(dataset.numeric()[(0, 0)], 6.0);
        assert_eq!(dataset.numeric()[(1, 0)], 48.0);
        assert_eq!(dataset.numeric()[(0, 4)], 67.0);
        assert_eq!(dataset.categorical()[0], vec!["<0", "0<=X<200"]);
    }

    #[test]
    fn rejects_wrong_header_width() {
        let input = format!("{},extra\n{},x", HEADER, ROW_GOOD);
        let err = Dataset::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::HeaderMismatch {
                expected: 21,
                found: 22
            }
        ));
    }

    #[test]
    fn rejects_missing_label_column() {
        let header = HEADER.replace(",class", ",klass");
        let input = format!("{}\n{}", header, ROW_GOOD);
        let err = Dataset::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref name) if name == "class"));
    }

    #[test]
    fn rejects_unknown_label_value() {
        let row = ROW_GOOD.replace(",good", ",excellent");
        let input = csv_input(&[&row]);
        let err = Dataset::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::UnknownLabel(ref v) if v == "excellent"));
    }

    #[test]
    fn rejects_non_numeric_field() {
        let row = ROW_GOOD.replace("<0,6,", "<0,six,");
        let input = csv_input(&[&row]);
        let err = Dataset::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidNumericField { ref column, .. } if column == "duration"));
    }

    #[test]
    fn rejects_empty_input() {
        let input = csv_input(&[]);
        let err = Dataset::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::EmptySet));
    }

    #[test]
    fn take_rows_reorders_all_blocks() {
        let dataset = Dataset::new(
            vec!["x".to_string()],
            array![[1.0], [2.0], [3.0]],
            vec!["c".to_string()],
            vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]],
            vec![Label::Good, Label::Bad, Label::Good],
        )
        .unwrap();

        let subset = dataset.take_rows(&[2, 0]);
        assert_eq!(subset.numeric(), &array![[3.0], [1.0]]);
        assert_eq!(subset.categorical()[0], vec!["c", "a"]);
        assert_eq!(subset.labels(), &[Label::Good, Label::Good]);
    }

    #[test]
    fn new_rejects_mismatched_blocks() {
        let err = Dataset::new(
            vec!["x".to_string()],
            array![[1.0], [2.0]],
            vec![],
            vec![],
            vec![Label::Good],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MismatchedShapes(2, 1)));
    }
}
