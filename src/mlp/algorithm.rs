use ndarray::{Array1, Array2, Axis, Zip};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::error::{Error, Result};
use crate::mlp::hyperparams::{Activation, LearningRate, MlpParams, MlpValidParams, Solver};
use crate::schema::Label;

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-8;

/// Smallest step size the adaptive schedule is allowed to reach.
const MIN_ADAPTIVE_RATE: f64 = 1e-6;

/// The logistic function
fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// A numerically stable version of the log of the logistic function.
fn log_logistic(x: f64) -> f64 {
    if x > 0.0 {
        -(1.0 + (-x).exp()).ln()
    } else {
        x - (1.0 + x.exp()).ln()
    }
}

impl Activation {
    fn apply(self, z: &mut Array2<f64>) {
        match self {
            Activation::Identity => {}
            Activation::Logistic => z.mapv_inplace(logistic),
            Activation::Tanh => z.mapv_inplace(f64::tanh),
            Activation::Relu => z.mapv_inplace(|v| v.max(0.0)),
        }
    }

    /// Derivative expressed in terms of the activated output.
    fn derivative(self, activated: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Identity => Array2::ones(activated.raw_dim()),
            Activation::Logistic => activated.mapv(|a| a * (1.0 - a)),
            Activation::Tanh => activated.mapv(|a| 1.0 - a * a),
            Activation::Relu => activated.mapv(|a| if a > 0.0 { 1.0 } else { 0.0 }),
        }
    }
}

/// Per-layer gradients of one backward pass.
type Gradients = Vec<(Array2<f64>, Array1<f64>)>;

enum SolverState {
    Sgd,
    Adam {
        first_moments: Gradients,
        second_moments: Gradients,
        step_count: i32,
    },
}

impl SolverState {
    fn new(solver: Solver, weights: &[Array2<f64>], biases: &[Array1<f64>]) -> SolverState {
        match solver {
            Solver::Sgd => SolverState::Sgd,
            Solver::Adam => {
                let zeros: Gradients = weights
                    .iter()
                    .zip(biases)
                    .map(|(w, b)| (Array2::zeros(w.raw_dim()), Array1::zeros(b.raw_dim())))
                    .collect();
                SolverState::Adam {
                    first_moments: zeros.clone(),
                    second_moments: zeros,
                    step_count: 0,
                }
            }
        }
    }

    fn update(
        &mut self,
        weights: &mut [Array2<f64>],
        biases: &mut [Array1<f64>],
        gradients: &Gradients,
        step: f64,
    ) {
        match self {
            SolverState::Sgd => {
                for ((w, b), (grad_w, grad_b)) in weights.iter_mut().zip(biases).zip(gradients) {
                    w.scaled_add(-step, grad_w);
                    b.scaled_add(-step, grad_b);
                }
            }
            SolverState::Adam {
                first_moments,
                second_moments,
                step_count,
            } => {
                *step_count += 1;
                let correction1 = 1.0 - ADAM_BETA1.powi(*step_count);
                let correction2 = 1.0 - ADAM_BETA2.powi(*step_count);
                for (layer, (grad_w, grad_b)) in gradients.iter().enumerate() {
                    let (m_w, m_b) = &mut first_moments[layer];
                    let (v_w, v_b) = &mut second_moments[layer];
                    m_w.zip_mut_with(grad_w, |m, &g| *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g);
                    m_b.zip_mut_with(grad_b, |m, &g| *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g);
                    v_w.zip_mut_with(grad_w, |v, &g| {
                        *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g
                    });
                    v_b.zip_mut_with(grad_b, |v, &g| {
                        *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g
                    });
                    Zip::from(&mut weights[layer])
                        .and(&*m_w)
                        .and(&*v_w)
                        .for_each(|w, &m, &v| {
                            *w -= step * (m / correction1)
                                / ((v / correction2).sqrt() + ADAM_EPSILON);
                        });
                    Zip::from(&mut biases[layer])
                        .and(&*m_b)
                        .and(&*v_b)
                        .for_each(|b, &m, &v| {
                            *b -= step * (m / correction1)
                                / ((v / correction2).sqrt() + ADAM_EPSILON);
                        });
                }
            }
        }
    }
}

impl MlpParams {
    /// Validate the hyper-parameters and fit the classifier.
    ///
    /// The feature matrix must have shape `(n_samples, n_features)` with one
    /// label per row. See [`MlpValidParams::fit`].
    pub fn fit(
        &self,
        records: &Array2<f64>,
        labels: &[Label],
    ) -> Result<FittedMultilayerPerceptron> {
        self.check_ref()?.fit(records, labels)
    }
}

impl MlpValidParams {
    /// Fit the classifier with full-batch backpropagation.
    ///
    /// Weights start from a seeded Glorot-uniform draw and are updated by
    /// the configured solver with the step size the configured schedule
    /// produces for each epoch. Training runs until the iteration cap or
    /// until the loss has failed to improve by at least `tol` for the
    /// patience window. A non-finite loss aborts with
    /// [`Error::DivergedLoss`].
    pub fn fit(
        &self,
        records: &Array2<f64>,
        labels: &[Label],
    ) -> Result<FittedMultilayerPerceptron> {
        if records.nrows() == 0 {
            return Err(Error::EmptySet);
        }
        if records.nrows() != labels.len() {
            return Err(Error::MismatchedShapes(records.nrows(), labels.len()));
        }
        if records.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidValues);
        }

        let nsamples = records.nrows() as f64;
        let targets: Array1<f64> = labels
            .iter()
            .map(|&label| if label == Label::Good { 1.0 } else { 0.0 })
            .collect();

        let mut sizes = vec![records.ncols()];
        sizes.extend_from_slice(&self.hidden_layer_sizes);
        sizes.push(1);

        let mut rng = Xoshiro256Plus::seed_from_u64(self.seed);
        let mut weights: Vec<Array2<f64>> = Vec::with_capacity(sizes.len() - 1);
        let mut biases: Vec<Array1<f64>> = Vec::with_capacity(sizes.len() - 1);
        for window in sizes.windows(2) {
            let (fan_in, fan_out) = (window[0], window[1]);
            let bound = (6.0 / (fan_in + fan_out) as f64).sqrt();
            weights.push(Array2::random_using(
                (fan_in, fan_out),
                Uniform::new(-bound, bound),
                &mut rng,
            ));
            biases.push(Array1::zeros(fan_out));
        }

        let mut solver = SolverState::new(self.solver, &weights, &biases);
        let mut adaptive_rate = self.learning_rate_init;
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut n_iter = 0;
        let mut loss = f64::INFINITY;

        for epoch in 1..=self.max_iter {
            n_iter = epoch;

            // forward pass, keeping every layer's output for backpropagation
            let mut outputs: Vec<Array2<f64>> = vec![records.to_owned()];
            for (layer, (w, b)) in weights.iter().zip(biases.iter()).enumerate() {
                let mut z = outputs[layer].dot(w) + b;
                if layer + 1 < weights.len() {
                    self.activation.apply(&mut z);
                }
                outputs.push(z);
            }
            let logits = outputs[weights.len()].column(0).to_owned();

            loss = -logits
                .iter()
                .zip(targets.iter())
                .map(|(&z, &y)| y * log_logistic(z) + (1.0 - y) * log_logistic(-z))
                .sum::<f64>()
                / nsamples;
            if !loss.is_finite() {
                return Err(Error::DivergedLoss(epoch));
            }

            // backward pass
            let mut delta: Array2<f64> = Zip::from(&logits)
                .and(&targets)
                .map_collect(|&z, &y| (logistic(z) - y) / nsamples)
                .insert_axis(Axis(1));
            let mut gradients: Gradients = Vec::with_capacity(weights.len());
            for layer in (0..weights.len()).rev() {
                let grad_w = outputs[layer].t().dot(&delta);
                let grad_b = delta.sum_axis(Axis(0));
                if layer > 0 {
                    delta = delta.dot(&weights[layer].t())
                        * self.activation.derivative(&outputs[layer]);
                }
                gradients.push((grad_w, grad_b));
            }
            gradients.reverse();

            let step = match self.learning_rate {
                LearningRate::Constant => self.learning_rate_init,
                LearningRate::InvScaling => self.learning_rate_init / (epoch as f64).sqrt(),
                LearningRate::Adaptive => adaptive_rate,
            };
            solver.update(&mut weights, &mut biases, &gradients, step);

            if loss > best_loss - self.tol {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            if loss < best_loss {
                best_loss = loss;
            }
            if no_improvement >= self.n_iter_no_change {
                if self.learning_rate == LearningRate::Adaptive {
                    adaptive_rate /= 5.0;
                    no_improvement = 0;
                    if adaptive_rate < MIN_ADAPTIVE_RATE {
                        break;
                    }
                } else {
                    break;
                }
            }
        }

        Ok(FittedMultilayerPerceptron {
            weights,
            biases,
            activation: self.activation,
            n_iter,
            loss,
        })
    }
}

/// A fitted multilayer perceptron which can make predictions.
#[derive(Debug, Clone)]
pub struct FittedMultilayerPerceptron {
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    activation: Activation,
    n_iter: usize,
    loss: f64,
}

impl FittedMultilayerPerceptron {
    /// Probability of the positive (`good`) class for every record.
    ///
    /// Panics if the feature count differs from the one the model was
    /// trained with.
    pub fn predict_probabilities(&self, records: &Array2<f64>) -> Array1<f64> {
        assert_eq!(
            records.ncols(),
            self.weights[0].nrows(),
            "Number of data features must match the number of features the model was trained with."
        );
        let mut current = records.to_owned();
        let nlayers = self.weights.len();
        for (layer, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            current = current.dot(w) + b;
            if layer + 1 < nlayers {
                self.activation.apply(&mut current);
            }
        }
        current.column(0).mapv(logistic)
    }

    /// Predicted label for every record, thresholding the positive-class
    /// probability at `0.5`.
    pub fn predict(&self, records: &Array2<f64>) -> Vec<Label> {
        self.predict_probabilities(records)
            .iter()
            .map(|&p| if p >= 0.5 { Label::Good } else { Label::Bad })
            .collect()
    }

    /// Number of epochs the training loop actually ran.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Training loss after the final epoch.
    pub fn loss(&self) -> f64 {
        self.loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::MultilayerPerceptron;
    use ndarray::Array2;

    fn separable(n: usize) -> (Array2<f64>, Vec<Label>) {
        let records = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                if i % 2 == 0 {
                    1.0 + i as f64 / 100.0
                } else {
                    -1.0 - i as f64 / 100.0
                }
            } else {
                (i % 5) as f64 / 10.0
            }
        });
        let labels = (0..n)
            .map(|i| if i % 2 == 0 { Label::Good } else { Label::Bad })
            .collect();
        (records, labels)
    }

    #[test]
    fn learns_a_linearly_separable_pattern() {
        let (records, labels) = separable(60);
        let model = MultilayerPerceptron::params()
            .hidden_layer_sizes(vec![8])
            .activation(Activation::Tanh)
            .solver(Solver::Adam)
            .learning_rate_init(0.05)
            .max_iter(500)
            .tol(1e-6)
            .seed(0)
            .fit(&records, &labels)
            .unwrap();

        let predictions = model.predict(&records);
        let correct = predictions
            .iter()
            .zip(&labels)
            .filter(|(p, t)| p == t)
            .count();
        assert!(correct as f64 / labels.len() as f64 >= 0.97);
    }

    #[test]
    fn same_seed_reproduces_the_same_model() {
        let (records, labels) = separable(30);
        let params = MultilayerPerceptron::params()
            .hidden_layer_sizes(vec![4])
            .max_iter(50)
            .seed(7);

        let first = params.fit(&records, &labels).unwrap();
        let second = params.fit(&records, &labels).unwrap();

        assert_eq!(
            first.predict_probabilities(&records),
            second.predict_probabilities(&records)
        );
        assert_eq!(first.n_iter(), second.n_iter());
    }

    #[test]
    fn probabilities_lie_in_the_unit_interval() {
        let (records, labels) = separable(20);
        let model = MultilayerPerceptron::params()
            .hidden_layer_sizes(vec![4])
            .max_iter(20)
            .fit(&records, &labels)
            .unwrap();

        let probabilities = model.predict_probabilities(&records);
        assert!(probabilities.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let (records, _) = separable(10);
        let err = MultilayerPerceptron::params()
            .fit(&records, &[Label::Good; 4])
            .unwrap_err();
        assert!(matches!(err, Error::MismatchedShapes(10, 4)));
    }

    #[test]
    fn rejects_non_finite_features() {
        let mut records = Array2::zeros((4, 2));
        records[(1, 1)] = f64::NAN;
        let labels = vec![Label::Good, Label::Bad, Label::Good, Label::Bad];
        let err = MultilayerPerceptron::params()
            .fit(&records, &labels)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValues));
    }
}
