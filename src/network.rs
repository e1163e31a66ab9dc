//! Fully-connected feed-forward network trained with full-batch backpropagation.
//!
//! Inputs are laid out one example per column: `x` has shape
//! `(layer_sizes[0], examples)` and training targets have shape
//! `(layer_sizes[last], examples)`.
use crate::activations::{Activation, Sigmoid};
use crate::config::{validate_learning_rate, TrainingConfig};
use crate::error::{MlError, Result};
use crate::layers::DenseLayer;
use crate::loss::{half_squared_error, half_squared_error_deriv};
use crate::metrics::{argmax_columns, count_correct};
use ndarray::Array2;
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle of a network's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    /// Freshly drawn weights, from construction or [`FeedForwardNetwork::reset`].
    Initialized,
    /// A [`FeedForwardNetwork::train`] call ran to completion.
    Trained,
}

/// Gradients for all layer transitions, in layer order.
#[derive(Debug)]
pub struct Gradients {
    pub d_w: Vec<Array2<f64>>,
    pub db: Vec<Array2<f64>>,
}

/// Cached pre-activations and activations from one forward pass.
struct ForwardCache {
    /// `activations[0]` is the input; `activations[i + 1]` is layer i's output.
    activations: Vec<Array2<f64>>,
    zs: Vec<Array2<f64>>,
}

#[derive(Debug)]
pub struct FeedForwardNetwork {
    layer_sizes: Vec<usize>,
    /// One layer per transition between consecutive sizes.
    layers: Vec<DenseLayer>,
    activation: Arc<dyn Activation>,
    state: NetworkState,
}

impl FeedForwardNetwork {
    /// Create a sigmoid network with the given layer sizes, input layer first.
    pub fn new<R: Rng + ?Sized>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        Self::with_activation(layer_sizes, Arc::new(Sigmoid), rng)
    }

    /// Create a network using `activation` on every layer.
    ///
    /// Needs at least an input and an output layer, all of non-zero size.
    pub fn with_activation<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activation: Arc<dyn Activation>,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(MlError::invalid(format!(
                "network needs at least 2 layers, got {}",
                layer_sizes.len()
            )));
        }
        if let Some(i) = layer_sizes.iter().position(|&s| s == 0) {
            return Err(MlError::invalid(format!("layer {} has zero units", i)));
        }
        let mut layers = Vec::with_capacity(layer_sizes.len() - 1);
        for pair in layer_sizes.windows(2) {
            layers.push(DenseLayer::new(pair[0], pair[1], activation.clone(), rng));
        }
        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            layers,
            activation,
            state: NetworkState::Initialized,
        })
    }

    /// Redraw all weights and biases, discarding anything learned.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for layer in &mut self.layers {
            layer.reinitialize(rng);
        }
        self.state = NetworkState::Initialized;
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Mutable access for loading fixed parameters; shapes are not re-checked.
    pub fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    pub fn activation(&self) -> &Arc<dyn Activation> {
        &self.activation
    }

    pub fn state(&self) -> NetworkState {
        self.state
    }

    fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<()> {
        if x.nrows() != self.input_size() {
            return Err(MlError::mismatch("input features", self.input_size(), x.nrows()));
        }
        Ok(())
    }

    /// Check that `x` and `y` fit the input and output layers and hold the
    /// same number of examples.
    pub fn assert_input_output(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<()> {
        self.check_input(x)?;
        if y.nrows() != self.output_size() {
            return Err(MlError::mismatch("output units", self.output_size(), y.nrows()));
        }
        if x.ncols() != y.ncols() {
            return Err(MlError::mismatch("example count", x.ncols(), y.ncols()));
        }
        Ok(())
    }

    fn forward_cached(&self, x: &Array2<f64>) -> ForwardCache {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut zs = Vec::with_capacity(self.layers.len());
        activations.push(x.clone());
        for layer in &self.layers {
            let (z, a) = layer.forward(&activations[activations.len() - 1]);
            zs.push(z);
            activations.push(a);
        }
        ForwardCache { activations, zs }
    }

    /// Final-layer activations, shape `(output units, examples)`.
    pub fn output_activations(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;
        let mut current = x.clone();
        for layer in &self.layers {
            let (_, a) = layer.forward(&current);
            current = a;
        }
        Ok(current)
    }

    /// Predicted class per example: the index of the strongest output unit.
    pub fn forward_propagation(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let outputs = self.output_activations(x)?;
        Ok(argmax_columns(&outputs))
    }

    /// Count of test examples whose predicted class equals the label.
    ///
    /// Not normalized; divide by the example count for accuracy.
    pub fn evaluate(&self, x_test: &Array2<f64>, y_test: &[usize]) -> Result<usize> {
        let predicted = self.forward_propagation(x_test)?;
        count_correct(&predicted, y_test)
    }

    /// Backpropagate the half squared error over the whole batch.
    pub fn compute_gradients(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Gradients> {
        self.assert_input_output(x, y)?;
        let cache = self.forward_cached(x);
        let (d_w, db, _) = self.backpropagate(&cache, y)?;
        Ok(Gradients { d_w, db })
    }

    /// Returns per-layer `(dW, db)` in layer order plus the loss of the pass.
    #[allow(clippy::type_complexity)]
    fn backpropagate(
        &self,
        cache: &ForwardCache,
        y: &Array2<f64>,
    ) -> Result<(Vec<Array2<f64>>, Vec<Array2<f64>>, f64)> {
        let output = &cache.activations[cache.activations.len() - 1];
        let loss = half_squared_error(output, y)?;
        let mut delta = half_squared_error_deriv(output, y)?;

        let mut d_w = Vec::with_capacity(self.layers.len());
        let mut db = Vec::with_capacity(self.layers.len());
        for (idx, layer) in self.layers.iter().enumerate().rev() {
            let dz = layer.delta(&delta, &cache.zs[idx]);
            let (d_w_layer, db_layer) = layer.parameter_gradients(&dz, &cache.activations[idx]);
            d_w.push(d_w_layer);
            db.push(db_layer);
            delta = layer.backward(&dz);
        }
        d_w.reverse();
        db.reverse();
        Ok((d_w, db, loss))
    }

    /// Apply one gradient step to every layer.
    pub fn apply_gradients(&mut self, grads: &Gradients, lr: f64) -> Result<()> {
        if grads.d_w.len() != self.layers.len() || grads.db.len() != self.layers.len() {
            return Err(MlError::mismatch(
                "gradient layers",
                self.layers.len(),
                grads.d_w.len().min(grads.db.len()),
            ));
        }
        for (layer, (d_w, db)) in self
            .layers
            .iter_mut()
            .zip(grads.d_w.iter().zip(grads.db.iter()))
        {
            if d_w.dim() != layer.weights.dim() {
                return Err(MlError::mismatch(
                    "weight gradient",
                    layer.weights.len(),
                    d_w.len(),
                ));
            }
            if db.dim() != layer.bias.dim() {
                return Err(MlError::mismatch("bias gradient", layer.bias.len(), db.len()));
            }
            layer.update(d_w, db, lr);
        }
        Ok(())
    }

    /// Reset the network, then run `epochs` full-batch gradient steps on
    /// `(x_train, y_train)`. `y_train` holds one target column per example,
    /// typically one-hot (see [`crate::datasets::one_hot`]).
    ///
    /// Returns the loss measured on each epoch's forward pass.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        x_train: &Array2<f64>,
        y_train: &Array2<f64>,
        epochs: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        if epochs == 0 {
            return Err(MlError::invalid("epochs must be at least 1"));
        }
        validate_learning_rate(learning_rate)?;
        self.reset(rng);
        self.assert_input_output(x_train, y_train)?;

        let mut losses = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let cache = self.forward_cached(x_train);
            let (d_w, db, loss) = self.backpropagate(&cache, y_train)?;
            self.apply_gradients(&Gradients { d_w, db }, learning_rate)?;
            debug!(epoch = epoch + 1, loss, "training epoch");
            losses.push(loss);
        }
        self.state = NetworkState::Trained;
        info!(
            epochs,
            examples = x_train.ncols(),
            final_loss = losses[losses.len() - 1],
            "network training finished"
        );
        Ok(losses)
    }

    /// [`train`](Self::train) with hyperparameters from a [`TrainingConfig`].
    pub fn train_with_config<R: Rng + ?Sized>(
        &mut self,
        x_train: &Array2<f64>,
        y_train: &Array2<f64>,
        config: &TrainingConfig,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        config.validate()?;
        self.train(x_train, y_train, config.epochs, config.learning_rate, rng)
    }
}

impl fmt::Display for FeedForwardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedForwardNetwork: {:?} ({:?})", self.layer_sizes, self.activation)
    }
}
