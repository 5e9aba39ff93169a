//! Error types for the anofox-anomaly library.

use thiserror::Error;

/// Result type alias for anomaly detection operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;

/// Errors that can occur while splitting, fitting, scoring or evaluating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnomalyError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A label outside {0, 1}.
    #[error("invalid label {label} at index {index}: expected 0 or 1")]
    InvalidLabel { index: usize, label: u8 },

    /// The split constraint "at least one anomaly on each side" cannot be met.
    #[error("insufficient anomalies to split: {anomalies} anomalies, gave up after {attempts} attempts")]
    InsufficientAnomalies { anomalies: usize, attempts: usize },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Covariance matrix is not positive definite.
    #[error("covariance matrix is singular or not positive definite")]
    SingularCovariance,

    /// Model has not been fitted yet.
    #[error("model must be fitted before scoring")]
    FitRequired,

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = AnomalyError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = AnomalyError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(err.to_string(), "insufficient data: need at least 2, got 1");

        let err = AnomalyError::InsufficientAnomalies {
            anomalies: 1,
            attempts: 0,
        };
        assert_eq!(
            err.to_string(),
            "insufficient anomalies to split: 1 anomalies, gave up after 0 attempts"
        );

        let err = AnomalyError::InvalidLabel { index: 3, label: 7 };
        assert_eq!(err.to_string(), "invalid label 7 at index 3: expected 0 or 1");

        let err = AnomalyError::FitRequired;
        assert_eq!(err.to_string(), "model must be fitted before scoring");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = AnomalyError::SingularCovariance;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
