//! Classification metrics for the network's outputs.
use crate::error::{MlError, Result};
use ndarray::Array2;

/// Index of the largest value in each column; ties go to the lowest index.
pub fn argmax_columns(outputs: &Array2<f64>) -> Vec<usize> {
    outputs
        .columns()
        .into_iter()
        .map(|col| {
            col.iter()
                .enumerate()
                .fold(0usize, |max_i, (i, &v)| if v > col[max_i] { i } else { max_i })
        })
        .collect()
}

/// Number of positions where `predicted` and `labels` agree.
pub fn count_correct(predicted: &[usize], labels: &[usize]) -> Result<usize> {
    if predicted.len() != labels.len() {
        return Err(MlError::mismatch("label count", predicted.len(), labels.len()));
    }
    Ok(predicted
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count())
}

/// Fraction of `total` that was correct.
pub fn accuracy(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64
}
