use ndarray::Array2;
use std::fmt;

/// Trait for activation functions.
///
/// `activation` is the nonlinearity, `gradient` its derivative with respect to
/// the pre-activation input.
pub trait Activation: fmt::Debug + Send + Sync {
    fn activation(&self, x: f64) -> f64;
    fn gradient(&self, x: f64) -> f64;

    /// Elementwise `activation` over a layer's pre-activations.
    fn activation_matrix(&self, z: &Array2<f64>) -> Array2<f64> {
        z.mapv(|v| self.activation(v))
    }

    /// Elementwise `gradient` over a layer's pre-activations.
    fn gradient_matrix(&self, z: &Array2<f64>) -> Array2<f64> {
        z.mapv(|v| self.gradient(v))
    }
}

/// Sigmoid: 1 / (1 + exp(-x))
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn activation(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }
    fn gradient(&self, x: f64) -> f64 {
        let s = self.activation(x);
        s * (1.0 - s)
    }
}
