//! # anofox-anomaly
//!
//! Evaluation and thresholding toolkit for score-based anomaly detection.
//!
//! Detectors turn feature rows into scores (distances where larger is more
//! anomalous, densities where smaller is), a threshold is chosen on labeled
//! training data by maximizing F1, and held-out data is judged with
//! precision, recall, F1, R-Precision and Precision@K over the ranked scores.
//! Gaussian density and PCA reconstruction-error detectors are included,
//! along with splitters, whitening cross-validation and a synthetic data
//! generator.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod models;
pub mod reduction;
pub mod split;
pub mod synthetic;
pub mod threshold;
pub mod utils;

pub use error::{AnomalyError, Result};

pub mod prelude {
    pub use crate::core::{Dataset, Ranking, ScoreDirection};
    pub use crate::error::{AnomalyError, Result};
    pub use crate::experiment::{train_test, Detector, DetectorConfig, TrainTestOutcome};
    pub use crate::metrics::{evaluate, MetricReport};
    pub use crate::models::{GaussianDensity, ReconstructionError, ScoreProducer};
    pub use crate::reduction::{DimensionReducer, Pca};
    pub use crate::threshold::{select_threshold, ThresholdConfig, ThresholdSelection};
}
