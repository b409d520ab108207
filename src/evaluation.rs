//! Holdout evaluation of the full pipeline
//!
//! Fits the preprocessor and the classifier on the training set only, then
//! scores predictions on the held-out test set. The resulting
//! [`Evaluation`] renders as a classification report: per-class precision,
//! recall, F1 and support, plus overall accuracy.

use std::fmt;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::metrics::ConfusionMatrix;
use crate::mlp::MlpParams;
use crate::preprocessing::Preprocessor;
use crate::schema::Label;

/// Derived holdout scores; never mutated after computation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    matrix: ConfusionMatrix,
}

/// Fit the full pipeline on `train` and score it on `test`.
///
/// The preprocessor state is derived from the training set alone and
/// applied unchanged to the test set.
pub fn evaluate(train: &Dataset, test: &Dataset, params: &MlpParams) -> Result<Evaluation> {
    let preprocessor = Preprocessor::fit(train)?;
    let model = params.fit(&preprocessor.transform(train), train.labels())?;
    let predictions = model.predict(&preprocessor.transform(test));
    Ok(Evaluation {
        matrix: ConfusionMatrix::new(test.labels(), &predictions),
    })
}

impl Evaluation {
    /// Fraction of exact label matches on the test set.
    pub fn accuracy(&self) -> f64 {
        self.matrix.accuracy()
    }

    /// Recall of the positive (`good`) class.
    pub fn positive_recall(&self) -> f64 {
        self.matrix.recall(Label::Good)
    }

    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.matrix
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for label in Label::ALL {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                label.to_string(),
                self.matrix.precision(label),
                self.matrix.recall(label),
                self.matrix.f1(label),
                self.matrix.support(label)
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy",
            "",
            "",
            self.matrix.accuracy(),
            self.matrix.total()
        )
    }
}
