//! Labeled feature matrix used throughout the detectors.

use crate::error::{AnomalyError, Result};

/// A labeled dataset: one feature row per sample plus a binary label.
///
/// Features and labels are always co-indexed. Label `1` marks an anomaly,
/// label `0` a normal sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<u8>,
}

impl Dataset {
    /// Create a dataset, validating shape and labels.
    ///
    /// # Errors
    /// * `DimensionMismatch` if the row count differs from the label count or
    ///   rows have different lengths.
    /// * `InvalidLabel` if any label is not 0 or 1.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<u8>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(AnomalyError::DimensionMismatch {
                expected: features.len(),
                got: labels.len(),
            });
        }
        validate_labels(&labels)?;
        if let Some(first) = features.first() {
            let dim = first.len();
            if let Some(row) = features.iter().find(|row| row.len() != dim) {
                return Err(AnomalyError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
        }

        Ok(Self { features, labels })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature dimension (0 for an empty dataset).
    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Number of samples labeled as anomaly.
    pub fn n_anomalies(&self) -> usize {
        count_anomalies(&self.labels)
    }

    /// Fraction of anomalies, 0 for an empty dataset.
    pub fn anomaly_fraction(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.n_anomalies() as f64 / self.len() as f64
        }
    }

    /// Build a new dataset from the given sample indices, in that order.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        let size = self.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= size) {
            return Err(AnomalyError::IndexOutOfBounds { index, size });
        }

        Ok(Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        })
    }

    /// Consume the dataset, returning its features and labels.
    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<u8>) {
        (self.features, self.labels)
    }
}

/// Count the anomalies (label 1) in a label vector.
pub fn count_anomalies(labels: &[u8]) -> usize {
    labels.iter().filter(|&&l| l == 1).count()
}

/// Check that every label is 0 or 1.
pub fn validate_labels(labels: &[u8]) -> Result<()> {
    match labels.iter().position(|&l| l > 1) {
        Some(index) => Err(AnomalyError::InvalidLabel {
            index,
            label: labels[index],
        }),
        None => Ok(()),
    }
}

/// Mark every occurrence of `target` as anomaly (1) and everything else as
/// normal (0).
///
/// Useful for multi-class sources where one class plays the anomaly, e.g.
/// a single digit in a digit dataset.
pub fn label_anomaly<T: PartialEq>(raw_labels: &[T], target: &T) -> Vec<u8> {
    raw_labels
        .iter()
        .map(|label| u8::from(label == target))
        .collect()
}

/// Remap predictions using arbitrary anomaly/normal markers onto 1/0.
///
/// The input is left untouched.
///
/// # Errors
/// `InvalidParameter` if a prediction matches neither marker.
pub fn convert_predictions<T: PartialEq + std::fmt::Debug>(
    predictions: &[T],
    anomaly: &T,
    normal: &T,
) -> Result<Vec<u8>> {
    predictions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if p == anomaly {
                Ok(1)
            } else if p == normal {
                Ok(0)
            } else {
                Err(AnomalyError::InvalidParameter(format!(
                    "prediction {:?} at index {} matches neither the anomaly nor the normal marker",
                    p, i
                )))
            }
        })
        .collect()
}
