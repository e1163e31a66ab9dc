//! Loss used to train the feed-forward network.
use crate::error::{MlError, Result};
use ndarray::Array2;

fn check_shapes(pred: &Array2<f64>, target: &Array2<f64>) -> Result<()> {
    if pred.nrows() != target.nrows() {
        return Err(MlError::mismatch("target rows", pred.nrows(), target.nrows()));
    }
    if pred.ncols() != target.ncols() {
        return Err(MlError::mismatch("target columns", pred.ncols(), target.ncols()));
    }
    Ok(())
}

/// Half squared error averaged over examples: `½·Σ(pred − target)² / examples`.
pub fn half_squared_error(pred: &Array2<f64>, target: &Array2<f64>) -> Result<f64> {
    check_shapes(pred, target)?;
    let examples = pred.ncols().max(1) as f64;
    let sum: f64 = pred
        .iter()
        .zip(target.iter())
        .map(|(&p, &t)| (p - t).powi(2))
        .sum();
    Ok(0.5 * sum / examples)
}

/// Output error `pred − target`, the derivative of the summed half squared error.
pub fn half_squared_error_deriv(pred: &Array2<f64>, target: &Array2<f64>) -> Result<Array2<f64>> {
    check_shapes(pred, target)?;
    Ok(pred - target)
}
