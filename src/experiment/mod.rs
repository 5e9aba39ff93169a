//! Train/test orchestration.
//!
//! A [`Detector`] fits a [`ScoreProducer`](crate::models::ScoreProducer) on
//! training data and fixes a decision threshold; the resulting
//! [`TrainedDetector`] evaluates held-out data with that threshold.
//!
//! # Example
//!
//! ```
//! use anofox_anomaly::core::Dataset;
//! use anofox_anomaly::experiment::{train_test, DetectorConfig};
//! use anofox_anomaly::models::GaussianDensity;
//!
//! let mut features: Vec<Vec<f64>> = (0..12)
//!     .map(|i| vec![(i as f64 * 0.7).sin(), (i as f64 * 0.4).cos()])
//!     .collect();
//! features.push(vec![8.0, -8.0]);
//! let mut labels = vec![0u8; 12];
//! labels.push(1);
//!
//! let data = Dataset::new(features, labels).unwrap();
//! let outcome = train_test(GaussianDensity::new(), &data, &data, &DetectorConfig::new(1)).unwrap();
//! assert_eq!(outcome.testing.r, 1);
//! ```

mod detector;
mod pca;
mod whitening;

pub use detector::{
    train_test, train_test_with_reconstruction_error, Detector, TrainTestOutcome, TrainedDetector,
};
pub use pca::{detection_with_pca_gaussian, detection_with_pca_reconstruction_error};
pub use whitening::{
    fit_gaussian_with_whitening_cv, train_test_with_gaussian, LambdaScore, WhiteningSearchConfig,
    WhiteningSearchResult,
};

use crate::threshold::ThresholdConfig;

/// Settings shared by training and testing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectorConfig {
    /// K for Precision@K.
    pub k: usize,
    /// Number of threshold candidates swept during training.
    pub threshold_steps: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            k: 10,
            threshold_steps: 100,
        }
    }
}

impl DetectorConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_threshold_steps(mut self, steps: usize) -> Self {
        self.threshold_steps = steps;
        self
    }

    /// Threshold sweep settings derived from this config.
    pub fn threshold_config(&self) -> ThresholdConfig {
        ThresholdConfig::new(self.k).with_steps(self.threshold_steps)
    }
}
