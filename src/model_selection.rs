//! Grid search with k-fold cross-validation
//!
//! The hyperparameter search is an explicit enumerate-and-score loop over
//! the cartesian product `{activation} × {solver} × {learning-rate
//! schedule}`. Every candidate is scored by its mean classification
//! accuracy over k rotated train/validation fold partitions of the
//! training set, all candidates sharing the same iteration cap, tolerance
//! and seed. Two policies are pinned down here on purpose:
//!
//! * ties are broken by enumeration order: the first candidate reaching
//!   the best mean accuracy wins;
//! * a candidate whose training fails on any fold scores negative
//!   infinity and the search continues; it never aborts the run.

use std::fmt;

use ndarray::{Array2, Axis};

use crate::error::{Error, Result};
use crate::mlp::{Activation, LearningRate, MlpParams, Solver};
use crate::schema::Label;

/// The finite hyperparameter space to enumerate.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub activations: Vec<Activation>,
    pub solvers: Vec<Solver>,
    pub learning_rates: Vec<LearningRate>,
}

impl ParamGrid {
    /// Every combination, activation-major: the activation varies slowest,
    /// the learning-rate schedule fastest.
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut candidates =
            Vec::with_capacity(self.activations.len() * self.solvers.len() * self.learning_rates.len());
        for &activation in &self.activations {
            for &solver in &self.solvers {
                for &learning_rate in &self.learning_rates {
                    candidates.push(Candidate {
                        activation,
                        solver,
                        learning_rate,
                    });
                }
            }
        }
        candidates
    }
}

/// One point of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub activation: Activation,
    pub solver: Solver,
    pub learning_rate: LearningRate,
}

impl Candidate {
    /// Overlay this candidate's choices onto a base parameter set.
    pub fn apply(&self, base: MlpParams) -> MlpParams {
        base.activation(self.activation)
            .solver(self.solver)
            .learning_rate(self.learning_rate)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "activation={}, solver={}, learning_rate={}",
            self.activation, self.solver, self.learning_rate
        )
    }
}

/// A candidate together with its mean cross-validated accuracy.
///
/// Failed candidates carry `f64::NEG_INFINITY`.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub candidate: Candidate,
    pub mean_accuracy: f64,
}

/// The result of a completed grid search.
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    pub best: Candidate,
    pub best_score: f64,
    pub scores: Vec<CandidateScore>,
}

/// Exhaustive search over a [`ParamGrid`].
pub struct GridSearch {
    grid: ParamGrid,
    folds: usize,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, folds: usize) -> GridSearch {
        GridSearch { grid, folds }
    }

    /// Score every candidate on `records`/`labels` and pick the best.
    ///
    /// The base parameter set supplies everything the grid does not vary;
    /// it is validated once up front so a configuration mistake surfaces
    /// before any training starts.
    pub fn run(
        &self,
        records: &Array2<f64>,
        labels: &[Label],
        base: &MlpParams,
    ) -> Result<GridSearchOutcome> {
        let nsamples = records.nrows();
        if labels.len() != nsamples {
            return Err(Error::MismatchedShapes(nsamples, labels.len()));
        }
        if self.folds < 2 || self.folds > nsamples {
            return Err(Error::InvalidFoldCount(self.folds));
        }
        base.check_ref()?;

        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(Error::EmptyGrid);
        }
        let folds = contiguous_folds(nsamples, self.folds);

        let mut scores: Vec<CandidateScore> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let params = candidate.apply(base.clone());
            let mut accuracy_sum = 0.0;
            let mut failed = false;

            for (train_indices, validation_indices) in &folds {
                let train_records = records.select(Axis(0), train_indices);
                let train_labels: Vec<Label> =
                    train_indices.iter().map(|&i| labels[i]).collect();

                let model = match params.fit(&train_records, &train_labels) {
                    Ok(model) => model,
                    Err(_) => {
                        failed = true;
                        break;
                    }
                };

                let validation_records = records.select(Axis(0), validation_indices);
                let predictions = model.predict(&validation_records);
                let correct = predictions
                    .iter()
                    .zip(validation_indices.iter().map(|&i| labels[i]))
                    .filter(|&(&predicted, truth)| predicted == truth)
                    .count();
                accuracy_sum += correct as f64 / validation_indices.len() as f64;
            }

            let mean_accuracy = if failed {
                f64::NEG_INFINITY
            } else {
                accuracy_sum / folds.len() as f64
            };
            scores.push(CandidateScore {
                candidate,
                mean_accuracy,
            });
        }

        // strict comparison: the first candidate reaching the maximum wins
        let mut best = 0;
        for (index, score) in scores.iter().enumerate().skip(1) {
            if score.mean_accuracy > scores[best].mean_accuracy {
                best = index;
            }
        }
        if scores[best].mean_accuracy == f64::NEG_INFINITY {
            return Err(Error::NoViableCandidate);
        }

        Ok(GridSearchOutcome {
            best: scores[best].candidate,
            best_score: scores[best].mean_accuracy,
            scores,
        })
    }
}

/// Partition `0..nsamples` into k contiguous validation ranges with their
/// complementary training indices. Fold sizes differ by at most one.
fn contiguous_folds(nsamples: usize, k: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let base = nsamples / k;
    let remainder = nsamples % k;

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < remainder);
        let end = start + size;
        let validation: Vec<usize> = (start..end).collect();
        let train: Vec<usize> = (0..start).chain(end..nsamples).collect();
        folds.push((train, validation));
        start = end;
    }
    folds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::MultilayerPerceptron;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn folds_are_disjoint_and_exhaustive() {
        let folds = contiguous_folds(10, 3);
        assert_eq!(folds.len(), 3);

        let sizes: Vec<usize> = folds.iter().map(|(_, v)| v.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        let mut all: Vec<usize> = folds.iter().flat_map(|(_, v)| v.clone()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        for (train, validation) in &folds {
            assert_eq!(train.len() + validation.len(), 10);
            assert!(train.iter().all(|i| !validation.contains(i)));
        }
    }

    /// Labels perfectly determined by the sign of the single feature; the
    /// search must come back with a configuration that actually separates
    /// them.
    #[test]
    fn search_finds_a_strong_configuration_on_separable_data() {
        let records = Array2::from_shape_fn((100, 1), |(i, _)| {
            if i % 2 == 0 { 1.0 + i as f64 / 100.0 } else { -1.0 - i as f64 / 100.0 }
        });
        let labels: Vec<Label> = (0..100)
            .map(|i| if i % 2 == 0 { Label::Good } else { Label::Bad })
            .collect();

        let grid = ParamGrid {
            activations: vec![Activation::Logistic, Activation::Tanh],
            solvers: vec![Solver::Adam],
            learning_rates: vec![LearningRate::Constant],
        };
        let base = MultilayerPerceptron::params()
            .hidden_layer_sizes(vec![4])
            .learning_rate_init(0.05)
            .max_iter(300)
            .tol(1e-6)
            .seed(0);

        let outcome = GridSearch::new(grid, 5).run(&records, &labels, &base).unwrap();
        assert!(outcome.best_score >= 0.95);
    }

    /// Two candidates scoring identically by construction: with a constant
    /// zero feature the network can only learn the majority class, whatever
    /// the activation, so both accuracies coincide and the first-enumerated
    /// candidate must win.
    #[test]
    fn ties_are_broken_by_enumeration_order() {
        let records = Array2::zeros((40, 1));
        let labels: Vec<Label> = (0..40)
            .map(|i| if i % 4 == 0 { Label::Bad } else { Label::Good })
            .collect();

        let grid = ParamGrid {
            activations: vec![Activation::Identity, Activation::Tanh],
            solvers: vec![Solver::Sgd],
            learning_rates: vec![LearningRate::Constant],
        };
        let base = MultilayerPerceptron::params()
            .hidden_layer_sizes(vec![4])
            .learning_rate_init(0.01)
            .max_iter(50)
            .seed(1);

        let outcome = GridSearch::new(grid.clone(), 4).run(&records, &labels, &base).unwrap();

        assert_abs_diff_eq!(
            outcome.scores[0].mean_accuracy,
            outcome.scores[1].mean_accuracy
        );
        assert_eq!(outcome.best, grid.candidates()[0]);
        assert_eq!(outcome.best.activation, Activation::Identity);
    }

    /// An exploding candidate is scored as the worst possible and the
    /// search carries on to the remaining candidates.
    #[test]
    fn failed_candidate_scores_worst_and_search_continues() {
        let records = Array2::from_shape_fn((6, 1), |(i, _)| match i {
            0 | 4 => 1.0,
            1 | 5 => -1.0,
            2 => 0.5,
            _ => -0.5,
        });
        let labels = vec![
            Label::Good,
            Label::Bad,
            Label::Good,
            Label::Bad,
            // contradicts rows 0 and 1: no infinitely confident model can
            // be right about every record
            Label::Bad,
            Label::Good,
        ];

        let grid = ParamGrid {
            activations: vec![Activation::Relu, Activation::Logistic],
            solvers: vec![Solver::Sgd],
            learning_rates: vec![LearningRate::Constant],
        };
        let base = MultilayerPerceptron::params()
            .hidden_layer_sizes(vec![4])
            .learning_rate_init(1e155)
            .max_iter(30)
            .seed(3);

        let outcome = GridSearch::new(grid, 2).run(&records, &labels, &base).unwrap();

        // the relu candidate overflows into a non-finite loss
        assert_eq!(outcome.scores[0].mean_accuracy, f64::NEG_INFINITY);
        assert_eq!(outcome.best.activation, Activation::Logistic);
    }

    #[test]
    fn rejects_invalid_fold_counts() {
        let records = Array2::zeros((4, 1));
        let labels = vec![Label::Good; 4];
        let grid = ParamGrid {
            activations: vec![Activation::Tanh],
            solvers: vec![Solver::Sgd],
            learning_rates: vec![LearningRate::Constant],
        };
        let base = MultilayerPerceptron::params();

        let search = GridSearch::new(grid.clone(), 1);
        assert!(matches!(
            search.run(&records, &labels, &base),
            Err(Error::InvalidFoldCount(1))
        ));

        let search = GridSearch::new(grid, 5);
        assert!(matches!(
            search.run(&records, &labels, &base),
            Err(Error::InvalidFoldCount(5))
        ));
    }

    #[test]
    fn rejects_an_empty_grid() {
        let records = Array2::zeros((4, 1));
        let labels = vec![Label::Good; 4];
        let grid = ParamGrid {
            activations: vec![],
            solvers: vec![Solver::Sgd],
            learning_rates: vec![LearningRate::Constant],
        };

        let search = GridSearch::new(grid, 2);
        assert!(matches!(
            search.run(&records, &labels, &MultilayerPerceptron::params()),
            Err(Error::EmptyGrid)
        ));
    }
}
