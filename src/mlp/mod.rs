//! Multilayer perceptron for binary credit-risk classification
//!
//! A feed-forward network with one or more hidden layers and a single
//! logistic output unit, trained by full-batch backpropagation. The three
//! dimensions the model selector searches over (activation function,
//! solver and learning-rate schedule) are plain enums here; everything
//! else (topology, iteration cap, tolerance, seed) is shared by all grid
//! candidates.
//!
//! ```
//! use credit_risk::mlp::{Activation, MultilayerPerceptron, Solver};
//! use credit_risk::schema::Label;
//! use ndarray::array;
//!
//! let records = array![[0.0, 1.0], [2.0, 3.0], [1.0, 5.0], [3.0, 1.0]];
//! let labels = vec![Label::Bad, Label::Good, Label::Good, Label::Bad];
//!
//! let model = MultilayerPerceptron::params()
//!     .hidden_layer_sizes(vec![4])
//!     .activation(Activation::Tanh)
//!     .solver(Solver::Adam)
//!     .max_iter(100)
//!     .fit(&records, &labels)
//!     .unwrap();
//! let prediction = model.predict(&records);
//! ```

mod algorithm;
mod hyperparams;

pub use algorithm::FittedMultilayerPerceptron;
pub use hyperparams::{Activation, LearningRate, MlpParams, MlpValidParams, Solver};

/// Entry point for configuring a multilayer perceptron.
pub struct MultilayerPerceptron;

impl MultilayerPerceptron {
    /// Create a default hyper-parameter set.
    pub fn params() -> MlpParams {
        MlpParams::default()
    }
}
