//! Multivariate Gaussian density model.
//!
//! Scores are probability densities, so lower values are more anomalous.
//! The covariance can optionally be whitened towards the identity:
//!
//! ```text
//! cov' = lam * cov + (1 - lam) * I
//! ```
//!
//! `lam = 1` keeps the sample covariance, `lam = 0` ignores feature
//! correlations entirely.

use crate::core::ScoreDirection;
use crate::error::{AnomalyError, Result};
use crate::models::ScoreProducer;
use crate::utils::linalg::{check_matrix, cholesky, column_means, covariance, forward_substitution};
use std::f64::consts::PI;

/// Mean and sample covariance (n - 1 denominator) of the rows of `data`.
pub fn estimate_gaussian(data: &[Vec<f64>]) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    let means = column_means(data)?;
    let cov = covariance(data, &means)?;
    Ok((means, cov))
}

/// Blend a covariance matrix with the identity: `lam * cov + (1 - lam) * I`.
pub fn whiten_covariance(cov: &[Vec<f64>], lam: f64) -> Vec<Vec<f64>> {
    cov.iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, &c)| lam * c + if i == j { 1.0 - lam } else { 0.0 })
                .collect()
        })
        .collect()
}

/// Multivariate normal density estimator.
#[derive(Debug, Clone, Default)]
pub struct GaussianDensity {
    lam: Option<f64>,
    mean: Option<Vec<f64>>,
    covariance: Option<Vec<Vec<f64>>>,
    chol: Option<Vec<Vec<f64>>>,
    log_norm: f64,
}

impl GaussianDensity {
    /// Gaussian with the plain sample covariance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gaussian with a whitened covariance.
    ///
    /// `lam` must lie in `[0, 1]`; this is checked at fit time.
    pub fn whitened(lam: f64) -> Self {
        Self {
            lam: Some(lam),
            ..Self::default()
        }
    }

    /// Whitening coefficient, if any.
    pub fn lam(&self) -> Option<f64> {
        self.lam
    }

    pub fn mean(&self) -> Option<&[f64]> {
        self.mean.as_deref()
    }

    /// Covariance used for the density (after whitening).
    pub fn covariance(&self) -> Option<&[Vec<f64>]> {
        self.covariance.as_deref()
    }

    /// Log density of each row.
    pub fn log_density(&self, data: &[Vec<f64>]) -> Result<Vec<f64>> {
        let (mean, chol) = match (&self.mean, &self.chol) {
            (Some(m), Some(l)) => (m, l),
            _ => return Err(AnomalyError::FitRequired),
        };
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let dim = check_matrix(data)?;
        if dim != mean.len() {
            return Err(AnomalyError::DimensionMismatch {
                expected: mean.len(),
                got: dim,
            });
        }

        Ok(data
            .iter()
            .map(|row| {
                let centered: Vec<f64> = row.iter().zip(mean).map(|(x, m)| x - m).collect();
                let z = forward_substitution(chol, &centered);
                let mahalanobis: f64 = z.iter().map(|v| v * v).sum();
                self.log_norm - 0.5 * mahalanobis
            })
            .collect())
    }
}

impl ScoreProducer for GaussianDensity {
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<()> {
        if let Some(lam) = self.lam {
            if !(0.0..=1.0).contains(&lam) {
                return Err(AnomalyError::InvalidParameter(format!(
                    "whitening coefficient must be in [0, 1], got {}",
                    lam
                )));
            }
        }

        let (mean, cov) = estimate_gaussian(data)?;
        let cov = match self.lam {
            Some(lam) => whiten_covariance(&cov, lam),
            None => cov,
        };
        let chol = cholesky(&cov).ok_or(AnomalyError::SingularCovariance)?;

        let k = mean.len() as f64;
        let log_det_half: f64 = chol.iter().enumerate().map(|(i, row)| row[i].ln()).sum();
        self.log_norm = -0.5 * k * (2.0 * PI).ln() - log_det_half;
        self.mean = Some(mean);
        self.covariance = Some(cov);
        self.chol = Some(chol);
        Ok(())
    }

    fn score(&self, data: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(self
            .log_density(data)?
            .into_iter()
            .map(f64::exp)
            .collect())
    }

    fn direction(&self) -> ScoreDirection {
        ScoreDirection::LowerIsAnomalous
    }

    fn name(&self) -> &str {
        "GaussianDensity"
    }

    fn is_fitted(&self) -> bool {
        self.chol.is_some()
    }
}
