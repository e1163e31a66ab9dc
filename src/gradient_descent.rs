//! Linear regression fitted by gradient descent.
//!
//! Three variants share the same cost and gradient primitives:
//!
//! - full batch: one update per iteration over the whole dataset
//! - stochastic: `m` single-example updates per iteration, examples drawn with replacement
//! - mini-batch: one update per shuffled chunk of `batch_size` examples
//!
//! Every variant scales its step by `learning_rate / m` where `m` is the total
//! example count, not the size of the subset the gradient was taken on.

use crate::config::{
    validate_batch_size, validate_iterations, validate_learning_rate, DescentConfig,
    DescentMethod,
};
use crate::error::{MlError, Result};
use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

/// Result of one descent run.
#[derive(Debug, Clone)]
pub struct DescentRun {
    /// Fitted parameters, shape `(features + 1, 1)`; row 0 is the bias weight.
    pub theta: Array2<f64>,
    /// Cost recorded after each iteration.
    pub cost_history: Array1<f64>,
    /// Theta snapshot after each iteration, shape `(iterations, features + 1)`.
    pub theta_history: Array2<f64>,
}

impl DescentRun {
    pub fn final_cost(&self) -> Option<f64> {
        self.cost_history.last().copied()
    }
}

/// Working state prepared by [`initialize`].
#[derive(Debug, Clone)]
pub struct DescentState {
    /// Design matrix with the bias column prepended.
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    /// Number of examples.
    pub m: usize,
    /// Number of columns of `x`, bias included.
    pub n: usize,
    pub theta: Array2<f64>,
    pub cost_history: Array1<f64>,
    pub theta_history: Array2<f64>,
}

impl DescentState {
    fn record(&mut self, iteration: usize, cost: f64) {
        self.theta_history
            .row_mut(iteration)
            .assign(&self.theta.column(0));
        self.cost_history[iteration] = cost;
        if cost.is_finite() {
            debug!(iteration, cost, "descent iteration");
        } else {
            warn!(iteration, "cost is no longer finite; learning rate is likely too large");
        }
    }

    fn finish(self) -> DescentRun {
        DescentRun {
            theta: self.theta,
            cost_history: self.cost_history,
            theta_history: self.theta_history,
        }
    }
}

/// Squared-error cost `(1/2) * m * Σ(Xθ − y)²`.
///
/// The scale factor multiplies by the example count instead of dividing by
/// `2m`. Absolute magnitudes differ from the textbook cost; the minimizer and
/// the descent direction do not.
pub fn cost(theta: &Array2<f64>, x: &ArrayView2<f64>, y: &ArrayView2<f64>) -> f64 {
    let m = y.nrows() as f64;
    let residual = x.dot(theta) - y;
    (0.5 * m) * residual.mapv(|r| r * r).sum()
}

/// Unregularized least-squares gradient `Xᵀ(Xθ − y)`.
pub fn gradient(x: &ArrayView2<f64>, y: &ArrayView2<f64>, theta: &Array2<f64>) -> Array2<f64> {
    let residual = x.dot(theta) - y;
    x.t().dot(&residual)
}

/// Prepend a column of ones to `x`.
pub fn add_bias(x: &Array2<f64>) -> Array2<f64> {
    let mut x_b = Array2::ones((x.nrows(), x.ncols() + 1));
    x_b.slice_mut(s![.., 1..]).assign(x);
    x_b
}

/// Build the design matrix and draw a fresh theta from a standard normal.
///
/// `y` must be a column of shape `(m, 1)` with one row per row of `x`.
pub fn initialize<R: Rng + ?Sized>(
    x: &Array2<f64>,
    y: &Array2<f64>,
    iterations: usize,
    rng: &mut R,
) -> Result<DescentState> {
    validate_iterations(iterations)?;
    if y.ncols() != 1 {
        return Err(MlError::mismatch("target columns", 1, y.ncols()));
    }
    if x.nrows() != y.nrows() {
        return Err(MlError::mismatch("example count", x.nrows(), y.nrows()));
    }
    let m = y.nrows();
    if m == 0 {
        return Err(MlError::invalid("dataset has no examples"));
    }

    let x_b = add_bias(x);
    let n = x_b.ncols();
    let theta = Array2::random_using((n, 1), StandardNormal, rng);

    Ok(DescentState {
        x: x_b,
        y: y.clone(),
        m,
        n,
        theta,
        cost_history: Array1::zeros(iterations),
        theta_history: Array2::zeros((iterations, n)),
    })
}

/// Predictions `[1 | x]·θ` for the rows of `x`.
pub fn predict(x: &Array2<f64>, theta: &Array2<f64>) -> Result<Array2<f64>> {
    if theta.ncols() != 1 {
        return Err(MlError::mismatch("theta columns", 1, theta.ncols()));
    }
    if theta.nrows() != x.ncols() + 1 {
        return Err(MlError::mismatch("theta length", x.ncols() + 1, theta.nrows()));
    }
    Ok(add_bias(x).dot(theta))
}

/// Batch gradient descent over the entire dataset.
pub fn full_batch_descent<R: Rng + ?Sized>(
    x: &Array2<f64>,
    y: &Array2<f64>,
    learning_rate: f64,
    iterations: usize,
    rng: &mut R,
) -> Result<DescentRun> {
    validate_learning_rate(learning_rate)?;
    let mut state = initialize(x, y, iterations, rng)?;
    let step = learning_rate / state.m as f64;

    for it in 0..iterations {
        let grad = gradient(&state.x.view(), &state.y.view(), &state.theta);
        state.theta = &state.theta - &(grad * step);
        let c = cost(&state.theta, &state.x.view(), &state.y.view());
        state.record(it, c);
    }

    info!(iterations, m = state.m, "full batch descent finished");
    Ok(state.finish())
}

/// Stochastic gradient descent.
///
/// Each iteration performs `m` updates, each on a single example drawn
/// uniformly with replacement. The recorded cost is the sum of the
/// per-example costs seen during the iteration.
pub fn stochastic_descent<R: Rng + ?Sized>(
    x: &Array2<f64>,
    y: &Array2<f64>,
    learning_rate: f64,
    iterations: usize,
    rng: &mut R,
) -> Result<DescentRun> {
    validate_learning_rate(learning_rate)?;
    let mut state = initialize(x, y, iterations, rng)?;
    let m = state.m;
    let step = learning_rate / m as f64;

    for it in 0..iterations {
        let mut total = 0.0;
        for _ in 0..m {
            let idx = rng.gen_range(0..m);
            let x_i = state.x.slice(s![idx..idx + 1, ..]);
            let y_i = state.y.slice(s![idx..idx + 1, ..]);
            let grad = gradient(&x_i, &y_i, &state.theta);
            state.theta = &state.theta - &(grad * step);
            total += cost(&state.theta, &x_i, &y_i);
        }
        state.record(it, total);
    }

    info!(iterations, m, "stochastic descent finished");
    Ok(state.finish())
}

/// Mini-batch gradient descent.
///
/// Each iteration draws a fresh permutation of the examples and walks it in
/// contiguous chunks of `batch_size`. When `m` is not a multiple of
/// `batch_size` the last chunk is shorter.
pub fn minibatch_descent<R: Rng + ?Sized>(
    x: &Array2<f64>,
    y: &Array2<f64>,
    learning_rate: f64,
    iterations: usize,
    batch_size: usize,
    rng: &mut R,
) -> Result<DescentRun> {
    validate_learning_rate(learning_rate)?;
    validate_batch_size(batch_size)?;
    let mut state = initialize(x, y, iterations, rng)?;
    let m = state.m;
    let step = learning_rate / m as f64;
    let mut indices: Vec<usize> = (0..m).collect();

    for it in 0..iterations {
        indices.shuffle(rng);
        let mut total = 0.0;
        for batch in indices.chunks(batch_size) {
            let x_i = state.x.select(Axis(0), batch);
            let y_i = state.y.select(Axis(0), batch);
            let grad = gradient(&x_i.view(), &y_i.view(), &state.theta);
            state.theta = &state.theta - &(grad * step);
            total += cost(&state.theta, &x_i.view(), &y_i.view());
        }
        state.record(it, total);
    }

    info!(iterations, m, batch_size, "mini-batch descent finished");
    Ok(state.finish())
}

/// Run the variant named by `config.method`.
pub fn run<R: Rng + ?Sized>(
    config: &DescentConfig,
    x: &Array2<f64>,
    y: &Array2<f64>,
    rng: &mut R,
) -> Result<DescentRun> {
    config.validate()?;
    match config.method {
        DescentMethod::FullBatch => {
            full_batch_descent(x, y, config.learning_rate, config.iterations, rng)
        }
        DescentMethod::Stochastic => {
            stochastic_descent(x, y, config.learning_rate, config.iterations, rng)
        }
        DescentMethod::MiniBatch => minibatch_descent(
            x,
            y,
            config.learning_rate,
            config.iterations,
            config.batch_size,
            rng,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // y = 2 + 3*x
    fn line() -> (Array2<f64>, Array2<f64>) {
        let x = Array2::from_shape_vec((5, 1), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let y = Array2::from_shape_vec((5, 1), vec![5.0, 8.0, 11.0, 14.0, 17.0]).unwrap();
        (x, y)
    }

    #[test]
    fn test_add_bias() {
        let x = array![[2.0, 3.0], [4.0, 5.0]];
        let x_b = add_bias(&x);
        assert_eq!(x_b, array![[1.0, 2.0, 3.0], [1.0, 4.0, 5.0]]);
    }

    #[test]
    fn test_cost_uses_m_over_two_scaling() {
        let x = array![[1.0, 1.0], [1.0, 2.0]];
        let y = array![[0.0], [0.0]];
        let theta = array![[1.0], [1.0]];
        // residuals 2 and 3, squared sum 13, scale 0.5 * 2
        let c = cost(&theta, &x.view(), &y.view());
        assert!((c - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_matches_hand_computation() {
        let x = array![[1.0, 1.0], [1.0, 2.0]];
        let y = array![[1.0], [1.0]];
        let theta = array![[0.0], [1.0]];
        // residuals 0 and 1
        let g = gradient(&x.view(), &y.view(), &theta);
        assert_eq!(g, array![[1.0], [2.0]]);
    }

    #[test]
    fn test_gradient_zero_at_exact_fit() {
        let (x, y) = line();
        let theta = array![[2.0], [3.0]];
        let g = gradient(&add_bias(&x).view(), &y.view(), &theta);
        assert!(g.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_initialize_shapes() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(7);
        let state = initialize(&x, &y, 12, &mut rng).unwrap();
        assert_eq!(state.m, 5);
        assert_eq!(state.n, 2);
        assert_eq!(state.x.dim(), (5, 2));
        assert_eq!(state.theta.dim(), (2, 1));
        assert_eq!(state.cost_history.len(), 12);
        assert_eq!(state.theta_history.dim(), (12, 2));
    }

    #[test]
    fn test_initialize_reseeds_each_call() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(7);
        let a = initialize(&x, &y, 1, &mut rng).unwrap();
        let b = initialize(&x, &y, 1, &mut rng).unwrap();
        assert_ne!(a.theta, b.theta);
    }

    #[test]
    fn test_initialize_rejects_row_vector_targets() {
        let (x, _) = line();
        let y = Array2::zeros((1, 5));
        let mut rng = StdRng::seed_from_u64(0);
        let err = initialize(&x, &y, 1, &mut rng).unwrap_err();
        assert!(matches!(err, MlError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_initialize_rejects_example_count_mismatch() {
        let (x, _) = line();
        let y = Array2::zeros((4, 1));
        let mut rng = StdRng::seed_from_u64(0);
        let err = initialize(&x, &y, 1, &mut rng).unwrap_err();
        assert_eq!(err, MlError::mismatch("example count", 5, 4));
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let (x, _) = line();
        let theta = Array2::zeros((3, 1));
        assert!(matches!(
            predict(&x, &theta),
            Err(MlError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_full_batch_fits_line() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(42);
        let run = full_batch_descent(&x, &y, 0.1, 5000, &mut rng).unwrap();
        let pred = predict(&x, &run.theta).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-3);
        }
        assert!((run.theta[[0, 0]] - 2.0).abs() < 1e-2);
        assert!((run.theta[[1, 0]] - 3.0).abs() < 1e-2);
    }

    #[test]
    fn test_theta_history_tracks_theta() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(3);
        let run = full_batch_descent(&x, &y, 0.1, 20, &mut rng).unwrap();
        let last = run.theta_history.row(19);
        assert_eq!(last.to_vec(), run.theta.column(0).to_vec());
    }

    #[test]
    fn test_stochastic_reduces_cost() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(11);
        let run = stochastic_descent(&x, &y, 0.05, 400, &mut rng).unwrap();
        let first = run.cost_history[0];
        let last = run.final_cost().unwrap();
        assert!(last < first);
    }

    #[test]
    fn test_minibatch_short_last_chunk() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(5);
        let run = minibatch_descent(&x, &y, 0.1, 3, 2, &mut rng).unwrap();
        assert_eq!(run.theta.dim(), (2, 1));
        assert!(run.cost_history.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_minibatch_batch_larger_than_dataset() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(5);
        let run = minibatch_descent(&x, &y, 0.1, 2, 50, &mut rng).unwrap();
        assert_eq!(run.cost_history.len(), 2);
    }

    #[test]
    fn test_minibatch_zero_batch_size() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(5);
        let err = minibatch_descent(&x, &y, 0.1, 2, 0, &mut rng).unwrap_err();
        assert!(matches!(err, MlError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_iterations() {
        let (x, y) = line();
        let mut rng = StdRng::seed_from_u64(5);
        let err = full_batch_descent(&x, &y, 0.1, 0, &mut rng).unwrap_err();
        assert!(matches!(err, MlError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_run_dispatches_on_method() {
        let (x, y) = line();
        let config = DescentConfig::for_method(DescentMethod::MiniBatch)
            .with_batch_size(2)
            .with_iterations(4);
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let via_run = run(&config, &x, &y, &mut a).unwrap();
        let direct = minibatch_descent(&x, &y, 0.01, 4, 2, &mut b).unwrap();
        assert_eq!(via_run.theta, direct.theta);
        assert_eq!(via_run.cost_history, direct.cost_history);
    }
}
