//! Decision threshold selection.
//!
//! Sweeps a uniform grid between the minimum and maximum score and keeps the
//! candidate with the highest F1 over the whole ranked set. Distances flag a
//! sample when `score > epsilon`, densities when `score < epsilon`.
//!
//! # Example
//!
//! ```
//! use anofox_anomaly::threshold::{select_threshold_distance, ThresholdConfig};
//!
//! let distances = vec![0.1, 0.2, 0.15, 3.0, 2.5];
//! let labels = vec![0, 0, 0, 1, 1];
//!
//! let selection = select_threshold_distance(&distances, &labels, &ThresholdConfig::default()).unwrap();
//! assert!(selection.found);
//! assert!(selection.epsilon >= 0.2 && selection.epsilon < 2.5);
//! ```

use crate::core::{Ranking, ScoreDirection};
use crate::error::{AnomalyError, Result};
use crate::metrics::{evaluate, evaluate_capped, MetricReport};
use tracing::{debug, info, warn};

/// Configuration for the threshold sweep.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdConfig {
    /// Number of uniformly spaced candidates between min and max score.
    pub steps: usize,
    /// K used for Precision@K in the diagnostic report.
    pub k: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { steps: 100, k: 10 }
    }
}

impl ThresholdConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the number of sweep candidates.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

/// Outcome of a threshold sweep.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdSelection {
    /// Selected threshold, 0 when nothing discriminative was found.
    pub epsilon: f64,
    /// F1 at the selected threshold.
    pub f1: f64,
    /// False if the sweep was skipped or no candidate beat F1 = 0.
    pub found: bool,
    pub direction: ScoreDirection,
    /// Metrics of the selected threshold on the ranked input.
    pub report: MetricReport,
}

/// Select the F1-maximizing threshold for scores of the given direction.
///
/// When every score is identical the sweep is skipped and the sentinel
/// `epsilon = 0` is returned. The sentinel is also returned when no candidate
/// reaches an F1 above 0; callers must tolerate the all-normal or
/// all-anomaly predictions it can produce.
///
/// # Errors
/// * `EmptyData` for empty input.
/// * `DimensionMismatch` if scores and labels differ in length.
/// * `InvalidParameter` for a zero step count or non-finite scores.
pub fn select_threshold(
    scores: &[f64],
    labels: &[u8],
    direction: ScoreDirection,
    config: &ThresholdConfig,
) -> Result<ThresholdSelection> {
    if scores.is_empty() {
        return Err(AnomalyError::EmptyData);
    }
    if scores.len() != labels.len() {
        return Err(AnomalyError::DimensionMismatch {
            expected: labels.len(),
            got: scores.len(),
        });
    }
    if config.steps == 0 {
        return Err(AnomalyError::InvalidParameter(
            "threshold sweep needs at least one step".to_string(),
        ));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(AnomalyError::InvalidParameter(
            "scores must be finite".to_string(),
        ));
    }

    let ranking = Ranking::by_score(scores, direction);
    let ranked_scores = ranking.apply(scores);
    let ranked_labels = ranking.apply(labels);

    let min = ranked_scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ranked_scores
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let mut best_epsilon = 0.0;
    let mut best_f1 = 0.0;
    let mut found = false;

    if max == min {
        warn!(
            score = min,
            n = scores.len(),
            "constant scores, skipping threshold sweep"
        );
    } else {
        let step = (max - min) / config.steps as f64;
        for i in 0..config.steps {
            let epsilon = min + i as f64 * step;
            let preds = apply_threshold(&ranked_scores, epsilon, direction);
            let report = evaluate_capped(&preds, &ranked_labels, config.k)?;

            if report.f1 > best_f1 {
                best_f1 = report.f1;
                best_epsilon = epsilon;
                found = true;
                debug!(epsilon, f1 = report.f1, "improved threshold");
            }
        }
        if !found {
            warn!(
                ?direction,
                "no threshold improves F1 above 0, falling back to sentinel"
            );
        }
    }

    let best_preds = apply_threshold(&ranked_scores, best_epsilon, direction);
    let report = evaluate(&best_preds, &ranked_labels, config.k)?;
    info!(
        epsilon = best_epsilon,
        f1 = best_f1,
        found,
        ?direction,
        "threshold selected"
    );

    Ok(ThresholdSelection {
        epsilon: best_epsilon,
        f1: best_f1,
        found,
        direction,
        report,
    })
}

/// Threshold for distance-like scores (larger = more anomalous).
pub fn select_threshold_distance(
    distances: &[f64],
    labels: &[u8],
    config: &ThresholdConfig,
) -> Result<ThresholdSelection> {
    select_threshold(distances, labels, ScoreDirection::HigherIsAnomalous, config)
}

/// Threshold for density scores (smaller = more anomalous).
pub fn select_threshold_probability(
    densities: &[f64],
    labels: &[u8],
    config: &ThresholdConfig,
) -> Result<ThresholdSelection> {
    select_threshold(densities, labels, ScoreDirection::LowerIsAnomalous, config)
}

/// Binary predictions (1 = anomaly) for a fixed threshold.
pub fn apply_threshold(scores: &[f64], epsilon: f64, direction: ScoreDirection) -> Vec<u8> {
    scores
        .iter()
        .map(|&s| u8::from(direction.is_anomalous(s, epsilon)))
        .collect()
}
