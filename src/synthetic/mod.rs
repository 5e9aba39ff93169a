//! Synthetic binary anomaly datasets.
//!
//! Rows are correlated Gaussian draws thresholded into 0/1 features. A row is
//! an anomaly when it has fewer ones than `anomaly_threshold`. When anomalies
//! make up too large a share, each one is dropped at random until the class
//! is rare again (in expectation).

use crate::core::Dataset;
use crate::error::{AnomalyError, Result};
use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::Normal;
use tracing::{debug, info};

/// Generator settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntheticConfig {
    pub n_samples: usize,
    pub n_dimensions: usize,
    /// Rows with fewer ones than this are anomalies.
    pub anomaly_threshold: usize,
    /// Gaussian values at or above this become 1.
    pub binarize_at: f64,
    /// Anomaly share above which anomalies are thinned out.
    pub max_anomaly_fraction: f64,
    /// Probability of dropping each anomaly when thinning.
    pub removal_probability: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_samples: 100_000,
            n_dimensions: 16,
            anomaly_threshold: 4,
            binarize_at: 0.5,
            max_anomaly_fraction: 0.2,
            removal_probability: 0.6,
        }
    }
}

impl SyntheticConfig {
    pub fn new(n_samples: usize, n_dimensions: usize) -> Self {
        Self {
            n_samples,
            n_dimensions,
            ..Default::default()
        }
    }

    pub fn with_anomaly_threshold(mut self, threshold: usize) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    pub fn with_binarize_at(mut self, level: f64) -> Self {
        self.binarize_at = level;
        self
    }

    pub fn with_max_anomaly_fraction(mut self, fraction: f64) -> Self {
        self.max_anomaly_fraction = fraction;
        self
    }

    pub fn with_removal_probability(mut self, probability: f64) -> Self {
        self.removal_probability = probability;
        self
    }

    /// Shorthand for [`generate_binary_dataset`].
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Dataset> {
        generate_binary_dataset(self, rng)
    }

    fn validate(&self) -> Result<()> {
        if self.n_samples == 0 || self.n_dimensions == 0 {
            return Err(AnomalyError::InvalidParameter(
                "n_samples and n_dimensions must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.max_anomaly_fraction) {
            return Err(AnomalyError::InvalidParameter(format!(
                "max_anomaly_fraction must be in [0, 1], got {}",
                self.max_anomaly_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.removal_probability) {
            return Err(AnomalyError::InvalidParameter(format!(
                "removal_probability must be in [0, 1], got {}",
                self.removal_probability
            )));
        }
        Ok(())
    }
}

/// Draw a labeled binary dataset.
///
/// The latent Gaussian has mean `mu ~ U(0, 1)^d` and covariance `A Aᵀ` with
/// `A ~ U(0, 1)^(d x d)`, sampled as `mu + A z` for standard-normal `z`.
pub fn generate_binary_dataset<R: Rng + ?Sized>(
    config: &SyntheticConfig,
    rng: &mut R,
) -> Result<Dataset> {
    config.validate()?;
    let d = config.n_dimensions;
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| AnomalyError::ComputationError(e.to_string()))?;

    let mu: Vec<f64> = (0..d).map(|_| rng.gen::<f64>()).collect();
    let mixing: Vec<Vec<f64>> = (0..d)
        .map(|_| (0..d).map(|_| rng.gen::<f64>()).collect())
        .collect();

    let mut features = Vec::with_capacity(config.n_samples);
    let mut labels = Vec::with_capacity(config.n_samples);
    for _ in 0..config.n_samples {
        let z: Vec<f64> = (0..d).map(|_| standard.sample(rng)).collect();
        let row: Vec<f64> = mu
            .iter()
            .zip(&mixing)
            .map(|(m, a)| {
                let x = m + a.iter().zip(&z).map(|(a, z)| a * z).sum::<f64>();
                if x >= config.binarize_at {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        let ones = row.iter().filter(|&&v| v == 1.0).count();
        labels.push(u8::from(ones < config.anomaly_threshold));
        features.push(row);
    }

    let anomalies = labels.iter().filter(|&&l| l == 1).count();
    let fraction = anomalies as f64 / config.n_samples as f64;
    debug!(anomalies, fraction, "synthetic rows drawn");

    if fraction > config.max_anomaly_fraction {
        let (kept_features, kept_labels): (Vec<_>, Vec<_>) = features
            .into_iter()
            .zip(labels)
            .filter(|&(_, label)| label == 0 || !rng.gen_bool(config.removal_probability))
            .unzip();
        features = kept_features;
        labels = kept_labels;
        info!(
            removed = config.n_samples - labels.len(),
            remaining = labels.len(),
            "thinned out anomalies"
        );
    }

    Dataset::new(features, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rows_are_binary_and_labels_follow_the_rule() {
        let config = SyntheticConfig::new(500, 8).with_max_anomaly_fraction(1.0);
        let data = config.generate(&mut StdRng::seed_from_u64(9001)).unwrap();

        assert_eq!(data.len(), 500);
        assert_eq!(data.n_features(), 8);
        for (row, &label) in data.features().iter().zip(data.labels()) {
            assert!(row.iter().all(|&v| v == 0.0 || v == 1.0));
            let ones = row.iter().filter(|&&v| v == 1.0).count();
            assert_eq!(label, u8::from(ones < 4));
        }
    }

    #[test]
    fn same_seed_same_dataset() {
        let config = SyntheticConfig::new(200, 6);
        let a = config.generate(&mut StdRng::seed_from_u64(1)).unwrap();
        let b = config.generate(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_anomaly_removed_at_probability_one() {
        // More ones than dimensions is impossible, so every row is an anomaly.
        let config = SyntheticConfig::new(50, 4)
            .with_anomaly_threshold(5)
            .with_removal_probability(1.0);
        let data = config.generate(&mut StdRng::seed_from_u64(2)).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn no_removal_below_the_limit() {
        let config = SyntheticConfig::new(100, 4)
            .with_anomaly_threshold(0)
            .with_removal_probability(1.0);
        let data = config.generate(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(data.len(), 100);
        assert_eq!(data.n_anomalies(), 0);
    }

    #[test]
    fn invalid_settings() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(SyntheticConfig::new(0, 4).generate(&mut rng).is_err());
        assert!(SyntheticConfig::new(10, 4)
            .with_removal_probability(1.5)
            .generate(&mut rng)
            .is_err());
    }
}
