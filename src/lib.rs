//! Gradient descent and a feed-forward network built from scratch for
//! learning purposes.
//!
//! - Linear regression by full-batch, stochastic, and mini-batch gradient descent
//! - Fully-connected sigmoid network with forward propagation, evaluation,
//!   and full-batch backpropagation
//! - Synthetic datasets, metrics, and text summaries
//!
//! Every routine that needs randomness takes the generator as an argument, so
//! a seeded `StdRng` makes runs reproducible.

pub mod activations;
pub mod config;
pub mod datasets;
pub mod error;
pub mod gradient_descent;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod utils;

pub use activations::{Activation, Sigmoid};
pub use config::{DescentConfig, DescentMethod, TrainingConfig};
pub use datasets::{linear_data, one_hot, two_class_blobs};
pub use error::{MlError, Result};
pub use gradient_descent::{
    full_batch_descent, minibatch_descent, stochastic_descent, DescentRun,
};
pub use layers::DenseLayer;
pub use loss::{half_squared_error, half_squared_error_deriv};
pub use metrics::{accuracy, argmax_columns, count_correct};
pub use network::{FeedForwardNetwork, Gradients, NetworkState};
pub use utils::{descent_summary, model_summary, summary_table};
