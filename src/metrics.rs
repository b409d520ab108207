//! Performance metrics for the binary classifier
//!
//! All scores derive from the entries of a two-class [`ConfusionMatrix`]:
//! accuracy, per-class precision and recall, and the F1 score combining
//! them.

use ndarray::Array2;

use crate::schema::Label;

/// Confusion matrix over the two credit labels.
///
/// Rows correspond to the true label, columns to the predicted label, both
/// in [`Label::ALL`] order. The diagonal entries are correct predictions.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    matrix: Array2<usize>,
}

impl ConfusionMatrix {
    /// Count prediction outcomes against the ground truth.
    ///
    /// Panics if the two slices differ in length.
    pub fn new(ground_truth: &[Label], prediction: &[Label]) -> ConfusionMatrix {
        assert_eq!(
            ground_truth.len(),
            prediction.len(),
            "The number of predictions must match the number of ground truth labels."
        );
        let mut matrix = Array2::zeros((2, 2));
        for (&truth, &predicted) in ground_truth.iter().zip(prediction) {
            matrix[(truth.index(), predicted.index())] += 1;
        }
        ConfusionMatrix { matrix }
    }

    /// Fraction of exact label matches.
    pub fn accuracy(&self) -> f64 {
        self.matrix.diag().sum() as f64 / self.matrix.sum() as f64
    }

    /// Fraction of predictions of `label` that were correct.
    pub fn precision(&self, label: Label) -> f64 {
        let i = label.index();
        let predicted = self.matrix.column(i).sum();
        ratio(self.matrix[(i, i)], predicted)
    }

    /// Fraction of true `label` records that were identified.
    pub fn recall(&self, label: Label) -> f64 {
        let i = label.index();
        let actual = self.matrix.row(i).sum();
        ratio(self.matrix[(i, i)], actual)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self, label: Label) -> f64 {
        let precision = self.precision(label);
        let recall = self.recall(label);
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    /// Number of ground-truth records carrying `label`.
    pub fn support(&self, label: Label) -> usize {
        self.matrix.row(label.index()).sum()
    }

    /// Total number of scored records.
    pub fn total(&self) -> usize {
        self.matrix.sum()
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
