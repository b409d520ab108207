//! Descriptive statistics over a loaded dataset
//!
//! Everything in this module is read-only and feeds the textual report the
//! binary prints before modeling starts: class balance, per-column numeric
//! summaries, a Pearson correlation matrix over the numeric block and
//! categorical-value counts cross-tabulated with the label. Nothing here is
//! required for the downstream pipeline stages.

use std::fmt;

use ndarray::{Array1, Array2, Axis};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::schema::Label;

/// Number of records per label value.
#[derive(Debug, Clone)]
pub struct ClassBalance {
    counts: Vec<(Label, usize)>,
}

impl ClassBalance {
    pub fn counts(&self) -> &[(Label, usize)] {
        &self.counts
    }
}

pub fn class_balance(dataset: &Dataset) -> ClassBalance {
    ClassBalance {
        counts: Label::ALL
            .iter()
            .map(|&label| (label, dataset.label_count(label)))
            .collect(),
    }
}

impl fmt::Display for ClassBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "class balance")?;
        for (label, count) in &self.counts {
            writeln!(f, "  {:<6} {}", label.to_string(), count)?;
        }
        Ok(())
    }
}

/// Min/mean/max and standard deviation for one numeric column.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub name: String,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub std_dev: f64,
}

/// Per-column summary of the numeric block.
#[derive(Debug, Clone)]
pub struct NumericSummary {
    columns: Vec<ColumnSummary>,
}

impl NumericSummary {
    pub fn columns(&self) -> &[ColumnSummary] {
        &self.columns
    }
}

pub fn numeric_summary(dataset: &Dataset) -> NumericSummary {
    let records = dataset.numeric();
    let mins = records.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
    let maxes = records.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));
    // a dataset always holds at least one record
    let means = records.mean_axis(Axis(0)).unwrap();
    let std_devs = records.std_axis(Axis(0), 0.0);

    let columns = dataset
        .numeric_names()
        .iter()
        .enumerate()
        .map(|(j, name)| ColumnSummary {
            name: name.clone(),
            min: mins[j],
            mean: means[j],
            max: maxes[j],
            std_dev: std_devs[j],
        })
        .collect();
    NumericSummary { columns }
}

impl fmt::Display for NumericSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "numeric columns")?;
        writeln!(
            f,
            "  {:<24} {:>10} {:>10} {:>10} {:>10}",
            "column", "min", "mean", "max", "std"
        )?;
        for column in &self.columns {
            writeln!(
                f,
                "  {:<24} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                column.name, column.min, column.mean, column.max, column.std_dev
            )?;
        }
        Ok(())
    }
}

/// Pearson correlation coefficients between the numeric columns.
#[derive(Debug, Clone)]
pub struct Correlation {
    names: Vec<String>,
    coefficients: Array2<f64>,
}

impl Correlation {
    /// The full symmetric coefficient matrix, unit diagonal.
    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.coefficients[(i, j)]
    }
}

/// Compute the pairwise Pearson correlation of the numeric block.
pub fn correlation(dataset: &Dataset) -> Correlation {
    let records = dataset.numeric();
    let nfeatures = records.ncols();
    let nsamples = records.nrows();

    let mean = records.mean_axis(Axis(0)).unwrap();
    let centered = records - &mean;
    let covariance = centered.t().dot(&centered) / (nsamples.max(2) - 1) as f64;

    let variances: Array1<f64> = covariance.diag().to_owned();
    let mut coefficients = Array2::zeros((nfeatures, nfeatures));
    for i in 0..nfeatures {
        for j in 0..nfeatures {
            coefficients[(i, j)] = if i == j {
                1.0
            } else {
                covariance[(i, j)] / (variances[i] * variances[j]).sqrt()
            };
        }
    }

    Correlation {
        names: dataset.numeric_names().to_vec(),
        coefficients,
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "correlation (pearson)")?;
        write!(f, "  {:<24}", "")?;
        for name in &self.names {
            write!(f, " {:>6.6}", name)?;
        }
        writeln!(f)?;
        for (i, name) in self.names.iter().enumerate() {
            write!(f, "  {:<24}", name)?;
            for j in 0..self.names.len() {
                write!(f, " {:>6.2}", self.coefficients[(i, j)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Value counts of one categorical column, split by label.
#[derive(Debug, Clone)]
pub struct CrossTab {
    column: String,
    rows: Vec<(String, [usize; 2])>,
}

impl CrossTab {
    /// Counts per value in first-seen order; one counter per label, in
    /// [`Label::ALL`] order.
    pub fn rows(&self) -> &[(String, [usize; 2])] {
        &self.rows
    }
}

/// Cross-tabulate a categorical column with the label.
pub fn crosstab(dataset: &Dataset, column: &str) -> Result<CrossTab> {
    let index = dataset
        .categorical_names()
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| Error::MissingColumn(column.to_string()))?;

    let mut rows: Vec<(String, [usize; 2])> = Vec::new();
    for (value, &label) in dataset.categorical()[index].iter().zip(dataset.labels()) {
        match rows.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, counts)) => counts[label.index()] += 1,
            None => {
                let mut counts = [0; 2];
                counts[label.index()] += 1;
                rows.push((value.clone(), counts));
            }
        }
    }

    Ok(CrossTab {
        column: column.to_string(),
        rows,
    })
}

impl fmt::Display for CrossTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} by class", self.column)?;
        writeln!(f, "  {:<32} {:>6} {:>6}", "value", Label::Good, Label::Bad)?;
        for (value, counts) in &self.rows {
            writeln!(f, "  {:<32} {:>6} {:>6}", value, counts[0], counts[1])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]],
            vec!["c".to_string()],
            vec![vec![
                "x".to_string(),
                "y".to_string(),
                "x".to_string(),
                "x".to_string(),
            ]],
            vec![Label::Good, Label::Bad, Label::Good, Label::Bad],
        )
        .unwrap()
    }

    #[test]
    fn class_balance_counts_labels() {
        let balance = class_balance(&dataset());
        assert_eq!(balance.counts(), &[(Label::Good, 2), (Label::Bad, 2)]);
    }

    #[test]
    fn summary_reports_min_mean_max() {
        let summary = numeric_summary(&dataset());
        let a = &summary.columns()[0];
        assert_abs_diff_eq!(a.min, 1.0);
        assert_abs_diff_eq!(a.mean, 2.5);
        assert_abs_diff_eq!(a.max, 4.0);
    }

    #[test]
    fn perfectly_linear_columns_correlate_to_one() {
        let correlation = correlation(&dataset());
        assert_abs_diff_eq!(correlation.get(0, 1), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(correlation.get(0, 0), 1.0);
        assert_abs_diff_eq!(
            correlation.get(0, 1),
            correlation.get(1, 0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn crosstab_counts_values_per_label() {
        let table = crosstab(&dataset(), "c").unwrap();
        assert_eq!(
            table.rows(),
            &[("x".to_string(), [2, 1]), ("y".to_string(), [0, 1])]
        );
    }

    #[test]
    fn crosstab_rejects_unknown_column() {
        assert!(matches!(
            crosstab(&dataset(), "missing"),
            Err(Error::MissingColumn(_))
        ));
    }
}
