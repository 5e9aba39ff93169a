//! Metric reports and their textual summary.

use crate::error::Result;
use crate::metrics::confusion::{ConfusionCounts, RateMetrics};
use crate::metrics::ranked::{precision_at_k, r_precision};

/// Detection quality for one (predictions, labels) pair at a fixed K.
///
/// Inputs are expected in rank order (most anomalous first); R-Precision and
/// Precision@K depend on it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricReport {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Precision over the top-R entries.
    pub r_precision: f64,
    /// Number of true anomalies.
    pub r: usize,
    pub precision_at_k: f64,
    /// K actually used for Precision@K.
    pub k: usize,
    pub counts: ConfusionCounts,
}

impl MetricReport {
    /// TPR/TNR/FPR/FNR over the full vector.
    pub fn rates(&self) -> RateMetrics {
        self.counts.rates()
    }
}

/// Evaluate rank-ordered predictions, computing Precision@K at `k`.
pub fn evaluate(predictions: &[u8], labels: &[u8], k: usize) -> Result<MetricReport> {
    let counts = ConfusionCounts::from_predictions(predictions, labels)?;
    let (r_prec, r) = r_precision(predictions, labels)?;
    let prec_k = precision_at_k(predictions, labels, k)?;

    Ok(MetricReport {
        precision: counts.precision(),
        recall: counts.recall(),
        f1: counts.f1(),
        r_precision: r_prec,
        r,
        precision_at_k: prec_k,
        k,
        counts,
    })
}

/// Like [`evaluate`], but Precision@K uses `min(k, R)`.
///
/// Used while selecting thresholds and during cross-validation, where a K
/// larger than the number of anomalies would dilute the score.
pub fn evaluate_capped(predictions: &[u8], labels: &[u8], k: usize) -> Result<MetricReport> {
    let r = crate::core::count_anomalies(labels);
    evaluate(predictions, labels, k.min(r))
}

impl std::fmt::Display for MetricReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Precision: {:.1}%", self.precision * 100.0)?;
        writeln!(f, "Recall: {:.1}%", self.recall * 100.0)?;
        writeln!(f, "F-score: {:.1}%", self.f1 * 100.0)?;
        writeln!(
            f,
            "R-Precision (# R = {}): {:.1}%",
            self.r,
            self.r_precision * 100.0
        )?;
        write!(f, "Precision@{}: {:.1}%", self.k, self.precision_at_k * 100.0)
    }
}
