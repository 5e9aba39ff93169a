//! Confusion counts and the ratios derived from them.

use crate::core::validate_labels;
use crate::error::{AnomalyError, Result};

/// True/false positive/negative counts for binary predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

/// Confusion rates normalized by the class totals.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RateMetrics {
    /// True positive rate (sensitivity).
    pub tpr: f64,
    /// True negative rate (specificity).
    pub tnr: f64,
    /// False positive rate.
    pub fpr: f64,
    /// False negative rate.
    pub fnr: f64,
}

/// Ratio with the denominator floored at 1, so 0/0 evaluates to 0.
#[inline]
pub(crate) fn floored_ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

impl ConfusionCounts {
    /// Count outcomes elementwise over co-indexed predictions and labels.
    ///
    /// # Errors
    /// * `DimensionMismatch` if the slices differ in length.
    /// * `InvalidLabel` if either slice contains a value other than 0 or 1.
    pub fn from_predictions(predictions: &[u8], labels: &[u8]) -> Result<Self> {
        check_pair(predictions, labels)?;

        let mut counts = Self::default();
        for (&p, &l) in predictions.iter().zip(labels.iter()) {
            match (p, l) {
                (1, 1) => counts.true_positives += 1,
                (1, _) => counts.false_positives += 1,
                (_, 1) => counts.false_negatives += 1,
                _ => counts.true_negatives += 1,
            }
        }
        Ok(counts)
    }

    /// Number of actual anomalies.
    pub fn positives(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    /// Number of actual normal samples.
    pub fn negatives(&self) -> usize {
        self.true_negatives + self.false_positives
    }

    pub fn total(&self) -> usize {
        self.positives() + self.negatives()
    }

    /// TP / max(1, TP + FP)
    pub fn precision(&self) -> f64 {
        floored_ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// TP / max(1, TP + FN)
    pub fn recall(&self) -> f64 {
        floored_ratio(self.true_positives, self.positives())
    }

    /// 2PR / max(1, P + R)
    ///
    /// The floor keeps the value defined when both precision and recall are
    /// zero. When `P + R < 1` the result is `2PR` rather than the harmonic
    /// mean; scores stay comparable with earlier experiment runs.
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        2.0 * p * r / (p + r).max(1.0)
    }

    /// Rates over the full vector, class totals floored at 1.
    pub fn rates(&self) -> RateMetrics {
        let n_p = self.positives();
        let n_n = self.negatives();
        RateMetrics {
            tpr: floored_ratio(self.true_positives, n_p),
            tnr: floored_ratio(self.true_negatives, n_n),
            fpr: floored_ratio(self.false_positives, n_n),
            fnr: floored_ratio(self.false_negatives, n_p),
        }
    }
}

/// Precision, recall and F1 for a pair of prediction/label vectors.
///
/// Returns `(precision, recall, f1)`.
pub fn evaluate_predictions(predictions: &[u8], labels: &[u8]) -> Result<(f64, f64, f64)> {
    let counts = ConfusionCounts::from_predictions(predictions, labels)?;
    Ok((counts.precision(), counts.recall(), counts.f1()))
}

pub(crate) fn check_pair(predictions: &[u8], labels: &[u8]) -> Result<()> {
    if predictions.len() != labels.len() {
        return Err(AnomalyError::DimensionMismatch {
            expected: labels.len(),
            got: predictions.len(),
        });
    }
    validate_labels(predictions)?;
    validate_labels(labels)
}

impl std::fmt::Display for RateMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "TPR: {:.1}%", self.tpr * 100.0)?;
        writeln!(f, "TNR: {:.1}%", self.tnr * 100.0)?;
        writeln!(f, "FPR: {:.1}%", self.fpr * 100.0)?;
        write!(f, "FNR: {:.1}%", self.fnr * 100.0)
    }
}
