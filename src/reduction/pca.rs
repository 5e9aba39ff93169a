//! Principal component analysis.

use crate::error::{AnomalyError, Result};
use crate::reduction::DimensionReducer;
use crate::utils::linalg::{check_matrix, column_means, covariance, symmetric_eigen};

/// PCA fitted from the eigen-decomposition of the sample covariance.
///
/// Components are ordered by decreasing explained variance.
#[derive(Debug, Clone, Default)]
pub struct Pca {
    mean: Vec<f64>,
    /// One unit vector per retained component.
    components: Vec<Vec<f64>>,
    explained_variance: Vec<f64>,
    total_variance: f64,
    fitted: bool,
}

impl Pca {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-feature mean removed before projection.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Retained principal axes (the basis).
    pub fn components(&self) -> &[Vec<f64>] {
        &self.components
    }

    /// Variance along each retained axis.
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Share of the total variance captured by the retained axes.
    pub fn explained_variance_ratio(&self) -> f64 {
        if self.total_variance <= 0.0 {
            return 0.0;
        }
        self.explained_variance.iter().sum::<f64>() / self.total_variance
    }

    fn check_fitted(&self, data: &[Vec<f64>]) -> Result<()> {
        if !self.fitted {
            return Err(AnomalyError::FitRequired);
        }
        if data.is_empty() {
            return Ok(());
        }
        let dim = check_matrix(data)?;
        if dim != self.mean.len() {
            return Err(AnomalyError::DimensionMismatch {
                expected: self.mean.len(),
                got: dim,
            });
        }
        Ok(())
    }
}

impl DimensionReducer for Pca {
    fn fit(&mut self, data: &[Vec<f64>], n_components: usize) -> Result<()> {
        let dim = check_matrix(data)?;
        if n_components > dim {
            return Err(AnomalyError::InvalidParameter(format!(
                "n_components ({}) exceeds feature dimension ({})",
                n_components, dim
            )));
        }

        let mean = column_means(data)?;
        let cov = covariance(data, &mean)?;
        let (values, vectors) = symmetric_eigen(&cov)?;

        self.total_variance = values.iter().map(|v| v.max(0.0)).sum();
        self.explained_variance = values.into_iter().take(n_components).collect();
        self.components = vectors.into_iter().take(n_components).collect();
        self.mean = mean;
        self.fitted = true;
        Ok(())
    }

    fn encode(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.check_fitted(data)?;
        Ok(data
            .iter()
            .map(|row| {
                self.components
                    .iter()
                    .map(|axis| {
                        row.iter()
                            .zip(&self.mean)
                            .zip(axis)
                            .map(|((x, m), a)| (x - m) * a)
                            .sum()
                    })
                    .collect()
            })
            .collect())
    }

    fn decode(&self, encoded: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        if !self.fitted {
            return Err(AnomalyError::FitRequired);
        }
        let k = self.components.len();
        if let Some(row) = encoded.iter().find(|row| row.len() != k) {
            return Err(AnomalyError::DimensionMismatch {
                expected: k,
                got: row.len(),
            });
        }

        Ok(encoded
            .iter()
            .map(|coords| {
                let mut row = self.mean.clone();
                for (c, axis) in coords.iter().zip(&self.components) {
                    for (x, a) in row.iter_mut().zip(axis) {
                        *x += c * a;
                    }
                }
                row
            })
            .collect())
    }

    fn n_components(&self) -> usize {
        self.components.len()
    }
}
