//! In-memory datasets for exercising the optimizers and the network.
use crate::error::{MlError, Result};
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// One-hot encode class labels column-wise: shape `(num_classes, labels.len())`.
pub fn one_hot(labels: &[usize], num_classes: usize) -> Result<Array2<f64>> {
    let mut encoded = Array2::zeros((num_classes, labels.len()));
    for (col, &label) in labels.iter().enumerate() {
        if label >= num_classes {
            return Err(MlError::invalid(format!(
                "label {} out of range for {} classes",
                label, num_classes
            )));
        }
        encoded[[label, col]] = 1.0;
    }
    Ok(encoded)
}

/// Noiseless linear data `y = intercept + x·coefficients`.
///
/// Features are drawn from U[-1, 1). Returns `x` of shape
/// `(n_samples, coefficients.len())` and `y` of shape `(n_samples, 1)`.
pub fn linear_data<R: Rng + ?Sized>(
    n_samples: usize,
    coefficients: &Array1<f64>,
    intercept: f64,
    rng: &mut R,
) -> (Array2<f64>, Array2<f64>) {
    let x = Array2::random_using(
        (n_samples, coefficients.len()),
        Uniform::new(-1.0, 1.0),
        rng,
    );
    let y = (x.dot(coefficients) + intercept).insert_axis(ndarray::Axis(1));
    (x, y)
}

/// Two classes separated by the sign of the first feature.
///
/// Returns inputs of shape `(n_features, n_samples)` and labels in {0, 1};
/// label 1 when the first feature is positive.
pub fn two_class_blobs<R: Rng + ?Sized>(
    n_samples: usize,
    n_features: usize,
    rng: &mut R,
) -> Result<(Array2<f64>, Vec<usize>)> {
    if n_features == 0 {
        return Err(MlError::invalid("at least one feature is required"));
    }
    let x = Array2::random_using((n_features, n_samples), Uniform::new(-1.0, 1.0), rng);
    let labels = x.row(0).iter().map(|&v| usize::from(v > 0.0)).collect();
    Ok((x, labels))
}
