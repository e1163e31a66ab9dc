//! One fully-connected layer transition: weights, bias, and the activation
//! applied to its output.
use crate::activations::Activation;
use ndarray::{Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use std::sync::Arc;

/// A dense layer mapping `input_size` units to `output_size` units.
///
/// Examples are stored column-wise, so a batch input has shape
/// `(input_size, examples)`.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// Shape `(output_size, input_size)`.
    pub weights: Array2<f64>,
    /// Shape `(output_size, 1)`, broadcast across examples.
    pub bias: Array2<f64>,
    pub activation: Arc<dyn Activation>,
}

impl DenseLayer {
    /// Create a layer with weights and bias drawn independently from U[0, 1).
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Arc<dyn Activation>,
        rng: &mut R,
    ) -> Self {
        let mut layer = Self {
            weights: Array2::zeros((output_size, input_size)),
            bias: Array2::zeros((output_size, 1)),
            activation,
        };
        layer.reinitialize(rng);
        layer
    }

    /// Redraw every weight and bias, discarding learned values.
    pub fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let unit = Uniform::new(0.0, 1.0);
        self.weights = Array2::random_using(self.weights.dim(), unit, rng);
        self.bias = Array2::random_using(self.bias.dim(), unit, rng);
    }

    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Forward pass: pre-activations `z = W·x + b` and activations `a = act(z)`.
    pub fn forward(&self, input: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let z = self.weights.dot(input) + &self.bias;
        let a = self.activation.activation_matrix(&z);
        (z, a)
    }

    /// Given `dL/da` for this layer's output and its cached `z`, return
    /// `dz = dL/da ⊙ act'(z)`.
    pub fn delta(&self, da: &Array2<f64>, z: &Array2<f64>) -> Array2<f64> {
        da * &self.activation.gradient_matrix(z)
    }

    /// Gradients for this layer from `dz` and the input it saw:
    /// `dW = dz·inputᵀ`, `db = Σ_examples dz`.
    pub fn parameter_gradients(
        &self,
        dz: &Array2<f64>,
        input: &Array2<f64>,
    ) -> (Array2<f64>, Array2<f64>) {
        let d_w = dz.dot(&input.t());
        let db = dz.sum_axis(Axis(1)).insert_axis(Axis(1));
        (d_w, db)
    }

    /// `dL/d(input) = Wᵀ·dz`, the error handed to the previous layer.
    pub fn backward(&self, dz: &Array2<f64>) -> Array2<f64> {
        self.weights.t().dot(dz)
    }

    /// Parameter update: `W -= lr * dW`, `b -= lr * db`.
    pub fn update(&mut self, d_w: &Array2<f64>, db: &Array2<f64>, lr: f64) {
        self.weights.scaled_add(-lr, d_w);
        self.bias.scaled_add(-lr, db);
    }
}
