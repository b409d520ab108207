use std::fmt;

use crate::error::{Error, Result};

/// Activation function applied by the hidden layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Identity,
    Logistic,
    Tanh,
    Relu,
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Identity => write!(f, "identity"),
            Activation::Logistic => write!(f, "logistic"),
            Activation::Tanh => write!(f, "tanh"),
            Activation::Relu => write!(f, "relu"),
        }
    }
}

/// Gradient-based weight update rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    Sgd,
    Adam,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solver::Sgd => write!(f, "sgd"),
            Solver::Adam => write!(f, "adam"),
        }
    }
}

/// Schedule producing the step size for each training epoch.
///
/// * `Constant`: the initial rate throughout.
/// * `InvScaling`: the initial rate divided by the square root of the epoch
///   number.
/// * `Adaptive`: the initial rate for as long as the loss keeps improving;
///   each time it stalls for the patience window the rate is divided by 5,
///   and training stops once the rate underflows `1e-6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningRate {
    Constant,
    InvScaling,
    Adaptive,
}

impl fmt::Display for LearningRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearningRate::Constant => write!(f, "constant"),
            LearningRate::InvScaling => write!(f, "invscaling"),
            LearningRate::Adaptive => write!(f, "adaptive"),
        }
    }
}

/// An unchecked set of hyper-parameters for the multilayer perceptron.
///
/// Validated into an [`MlpValidParams`] by [`check`](MlpParams::check);
/// [`fit`](MlpParams::fit) performs the checking step automatically.
#[derive(Debug, Clone, PartialEq)]
pub struct MlpParams(pub(crate) MlpValidParams);

/// A verified hyper-parameter set ready for training.
///
/// See [`MlpParams`] for the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct MlpValidParams {
    pub(crate) hidden_layer_sizes: Vec<usize>,
    pub(crate) activation: Activation,
    pub(crate) solver: Solver,
    pub(crate) learning_rate: LearningRate,
    pub(crate) learning_rate_init: f64,
    pub(crate) max_iter: usize,
    pub(crate) tol: f64,
    pub(crate) n_iter_no_change: usize,
    pub(crate) seed: u64,
}

impl Default for MlpParams {
    fn default() -> Self {
        MlpParams(MlpValidParams {
            hidden_layer_sizes: vec![100],
            activation: Activation::Relu,
            solver: Solver::Adam,
            learning_rate: LearningRate::Constant,
            learning_rate_init: 1e-3,
            max_iter: 200,
            tol: 1e-4,
            n_iter_no_change: 10,
            seed: 42,
        })
    }
}

impl MlpParams {
    /// Set the hidden layer topology.
    ///
    /// Defaults to a single hidden layer of 100 units. Must be non-empty
    /// with non-zero sizes.
    pub fn hidden_layer_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.0.hidden_layer_sizes = sizes;
        self
    }

    /// Set the hidden-layer activation function.
    ///
    /// Defaults to `Relu`.
    pub fn activation(mut self, activation: Activation) -> Self {
        self.0.activation = activation;
        self
    }

    /// Set the weight update rule.
    ///
    /// Defaults to `Adam`.
    pub fn solver(mut self, solver: Solver) -> Self {
        self.0.solver = solver;
        self
    }

    /// Set the learning-rate schedule.
    ///
    /// Defaults to `Constant`.
    pub fn learning_rate(mut self, learning_rate: LearningRate) -> Self {
        self.0.learning_rate = learning_rate;
        self
    }

    /// Set the initial step size.
    ///
    /// Defaults to `1e-3`. Must be positive and finite.
    pub fn learning_rate_init(mut self, learning_rate_init: f64) -> Self {
        self.0.learning_rate_init = learning_rate_init;
        self
    }

    /// Set the training iteration cap.
    ///
    /// Defaults to `200`. Must be non-zero.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.0.max_iter = max_iter;
        self
    }

    /// Set the minimum loss improvement counted as progress.
    ///
    /// Defaults to `1e-4`. Must be positive and finite.
    pub fn tol(mut self, tol: f64) -> Self {
        self.0.tol = tol;
        self
    }

    /// Set the patience window: the number of consecutive epochs without a
    /// loss improvement of at least `tol` after which training stops (or,
    /// under the adaptive schedule, the step size is reduced).
    ///
    /// Defaults to `10`. Must be non-zero.
    pub fn n_iter_no_change(mut self, n_iter_no_change: usize) -> Self {
        self.0.n_iter_no_change = n_iter_no_change;
        self
    }

    /// Set the seed for weight initialization.
    ///
    /// Defaults to `42`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    /// Validate the hyper-parameters.
    pub fn check_ref(&self) -> Result<&MlpValidParams> {
        let params = &self.0;
        if params.hidden_layer_sizes.is_empty() || params.hidden_layer_sizes.contains(&0) {
            Err(Error::InvalidHiddenLayers)
        } else if !params.learning_rate_init.is_finite() || params.learning_rate_init <= 0.0 {
            Err(Error::InvalidLearningRate(params.learning_rate_init))
        } else if params.max_iter == 0 {
            Err(Error::InvalidIterationCap)
        } else if !params.tol.is_finite() || params.tol <= 0.0 {
            Err(Error::InvalidTolerance(params.tol))
        } else if params.n_iter_no_change == 0 {
            Err(Error::InvalidPatience)
        } else {
            Ok(params)
        }
    }

    /// Validate the hyper-parameters, consuming the builder.
    pub fn check(self) -> Result<MlpValidParams> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl MlpValidParams {
    pub fn hidden_layer_sizes(&self) -> &[usize] {
        &self.hidden_layer_sizes
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn solver(&self) -> Solver {
        self.solver
    }

    pub fn learning_rate(&self) -> LearningRate {
        self.learning_rate
    }

    pub fn learning_rate_init(&self) -> f64 {
        self.learning_rate_init
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    pub fn tol(&self) -> f64 {
        self.tol
    }

    pub fn n_iter_no_change(&self) -> usize {
        self.n_iter_no_change
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
