//! Detection quality metrics.
//!
//! Confusion-derived ratios (precision, recall, F1, TPR/TNR/FPR/FNR) and
//! rank-aware precision (R-Precision, Precision@K). Every denominator is
//! floored at 1, so absent classes give 0 rather than NaN.

mod confusion;
mod ranked;
mod report;

pub use confusion::{evaluate_predictions, ConfusionCounts, RateMetrics};
pub use ranked::{precision_at_k, r_precision};
pub use report::{evaluate, evaluate_capped, MetricReport};
