//! Dimensionality reduction.
//!
//! The reconstruction-error detector and the PCA + Gaussian pipeline only
//! need an encoder/decoder pair, captured by [`DimensionReducer`]. [`Pca`] is
//! the bundled implementation.

mod pca;

pub use pca::Pca;

use crate::error::{AnomalyError, Result};
use statrs::statistics::Statistics;

/// Fit an encoding on training rows, then map rows into and out of it.
pub trait DimensionReducer {
    /// Learn the encoding from training rows.
    fn fit(&mut self, data: &[Vec<f64>], n_components: usize) -> Result<()>;

    /// Project rows into the reduced space.
    fn encode(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    /// Map reduced coordinates back to the original space.
    fn decode(&self, encoded: &[Vec<f64>]) -> Result<Vec<Vec<f64>>>;

    /// Number of retained components.
    fn n_components(&self) -> usize;

    /// Encode then decode.
    fn reconstruct(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.decode(&self.encode(data)?)
    }

    fn fit_encode(&mut self, data: &[Vec<f64>], n_components: usize) -> Result<Vec<Vec<f64>>> {
        self.fit(data, n_components)?;
        self.encode(data)
    }

    fn fit_reconstruct(
        &mut self,
        data: &[Vec<f64>],
        n_components: usize,
    ) -> Result<Vec<Vec<f64>>> {
        self.fit(data, n_components)?;
        self.reconstruct(data)
    }
}

/// Ratio of element variance after reconstruction to the original variance.
///
/// Both matrices are flattened; variance is the population variance over
/// all elements.
pub fn variance_retained(original: &[Vec<f64>], reconstructed: &[Vec<f64>]) -> Result<f64> {
    let flat_original: Vec<f64> = original.iter().flatten().copied().collect();
    let flat_rebuilt: Vec<f64> = reconstructed.iter().flatten().copied().collect();
    if flat_original.is_empty() {
        return Err(AnomalyError::EmptyData);
    }
    if flat_original.len() != flat_rebuilt.len() {
        return Err(AnomalyError::DimensionMismatch {
            expected: flat_original.len(),
            got: flat_rebuilt.len(),
        });
    }

    let base = flat_original.iter().population_variance();
    if base == 0.0 {
        return Err(AnomalyError::ComputationError(
            "original data has zero variance".to_string(),
        ));
    }
    Ok(flat_rebuilt.iter().population_variance() / base)
}

/// Variance retained by PCA for component counts `0, step, 2 * step, ...`
/// up to the feature dimension, with at most `max_points` steps.
pub fn variance_curve(data: &[Vec<f64>], max_points: usize) -> Result<Vec<(usize, f64)>> {
    let dim = crate::utils::linalg::check_matrix(data)?;
    let step = (dim / max_points.max(1)).max(1);

    (0..=dim)
        .step_by(step)
        .map(|n_components| {
            let mut pca = Pca::new();
            let rebuilt = pca.fit_reconstruct(data, n_components)?;
            Ok((n_components, variance_retained(data, &rebuilt)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identical_data_retains_everything() {
        let data = vec![vec![1.0, 2.0], vec![3.0, 5.0]];
        assert_relative_eq!(variance_retained(&data, &data).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_reconstruction_retains_nothing() {
        let data = vec![vec![1.0, 2.0], vec![3.0, 5.0]];
        let flat = vec![vec![2.75, 2.75], vec![2.75, 2.75]];
        assert_relative_eq!(variance_retained(&data, &flat).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn pca_retains_more_with_more_components() {
        let data: Vec<Vec<f64>> = (0..10)
            .map(|i| {
                let t = i as f64;
                vec![t, 0.5 * t + (t * 1.3).sin(), (t * 0.7).cos()]
            })
            .collect();

        let mut one = Pca::new();
        let r1 = one.fit_reconstruct(&data, 1).unwrap();
        let mut two = Pca::new();
        let r2 = two.fit_reconstruct(&data, 2).unwrap();

        let v1 = variance_retained(&data, &r1).unwrap();
        let v2 = variance_retained(&data, &r2).unwrap();
        assert!(v2 >= v1 - 1e-12);
    }

    #[test]
    fn partial_reconstruction_ratio() {
        // Element variances 5.0 and 1.25.
        let data = vec![vec![0.0, 2.0], vec![4.0, 6.0]];
        let rebuilt = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_relative_eq!(variance_retained(&data, &rebuilt).unwrap(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn curve_ends_at_full_variance() {
        let data: Vec<Vec<f64>> = (0..12)
            .map(|i| {
                let t = i as f64;
                vec![t, (t * 0.9).sin(), (t * 0.3).cos(), 0.2 * t]
            })
            .collect();

        let curve = variance_curve(&data, 50).unwrap();
        assert_eq!(curve.len(), 5);
        assert_eq!(curve[0].0, 0);
        let (n, last) = curve[4];
        assert_eq!(n, 4);
        assert_relative_eq!(last, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn shape_mismatch() {
        let a = vec![vec![1.0, 2.0]];
        let b = vec![vec![1.0]];
        assert!(variance_retained(&a, &b).is_err());
    }
}
