//! Rank-aware precision metrics.
//!
//! Both functions read the inputs in the order given: callers must present
//! predictions and labels already ranked by score, most anomalous first.

use crate::core::count_anomalies;
use crate::error::Result;
use crate::metrics::confusion::{check_pair, floored_ratio};

/// Precision over the first `min(k, len)` entries.
///
/// Counts true anomalies among the predicted anomalies in the prefix and
/// divides by the number of predicted anomalies there (floored at 1), so an
/// empty prefix (`k == 0`) yields 0.
pub fn precision_at_k(predictions: &[u8], labels: &[u8], k: usize) -> Result<f64> {
    check_pair(predictions, labels)?;

    let end = k.min(predictions.len());
    let (hits, predicted) = predictions[..end]
        .iter()
        .zip(&labels[..end])
        .filter(|(&p, _)| p == 1)
        .fold((0usize, 0usize), |(hits, predicted), (_, &l)| {
            (hits + usize::from(l == 1), predicted + 1)
        });

    Ok(floored_ratio(hits, predicted))
}

/// Precision@R where R is the total number of true anomalies.
///
/// Returns `(r_precision, r)`.
pub fn r_precision(predictions: &[u8], labels: &[u8]) -> Result<(f64, usize)> {
    let r = count_anomalies(labels);
    let value = precision_at_k(predictions, labels, r)?;
    Ok((value, r))
}
