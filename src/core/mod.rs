//! Core data structures: labeled datasets and score rankings.

mod dataset;
mod ranking;

pub use dataset::{convert_predictions, count_anomalies, label_anomaly, validate_labels, Dataset};
pub use ranking::{Ranking, ScoreDirection};
