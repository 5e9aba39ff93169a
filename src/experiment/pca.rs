//! PCA front-ends for the two detectors.

use crate::core::Dataset;
use crate::error::Result;
use crate::experiment::detector::{train_test, train_test_with_reconstruction_error, TrainTestOutcome};
use crate::experiment::DetectorConfig;
use crate::models::GaussianDensity;
use crate::reduction::{variance_retained, DimensionReducer, Pca};
use tracing::{info, warn};

/// Fit PCA on the training rows, reconstruct both splits and detect with
/// the reconstruction error.
pub fn detection_with_pca_reconstruction_error(
    train: &Dataset,
    test: &Dataset,
    n_components: usize,
    config: &DetectorConfig,
) -> Result<TrainTestOutcome> {
    let mut pca = Pca::new();
    let train_rebuilt = pca.fit_reconstruct(train.features(), n_components)?;
    let test_rebuilt = pca.reconstruct(test.features())?;
    log_retained(train.features(), &train_rebuilt, n_components);

    train_test_with_reconstruction_error(
        train.features(),
        &train_rebuilt,
        test.features(),
        &test_rebuilt,
        train.labels(),
        test.labels(),
        config,
    )
}

/// Fit PCA on the training rows, encode both splits and detect with an
/// unwhitened Gaussian density on the encoded features.
pub fn detection_with_pca_gaussian(
    train: &Dataset,
    test: &Dataset,
    n_components: usize,
    config: &DetectorConfig,
) -> Result<TrainTestOutcome> {
    let mut pca = Pca::new();
    let train_encoded = pca.fit_encode(train.features(), n_components)?;
    let test_encoded = pca.encode(test.features())?;
    log_retained(train.features(), &pca.decode(&train_encoded)?, n_components);

    let train_encoded = Dataset::new(train_encoded, train.labels().to_vec())?;
    let test_encoded = Dataset::new(test_encoded, test.labels().to_vec())?;
    train_test(GaussianDensity::new(), &train_encoded, &test_encoded, config)
}

fn log_retained(original: &[Vec<f64>], rebuilt: &[Vec<f64>], n_components: usize) -> Option<f64> {
    match variance_retained(original, rebuilt) {
        Ok(ratio) => {
            info!(
                n_components,
                dimensions = original.first().map_or(0, Vec::len),
                retained = ratio,
                "pca reconstruction"
            );
            Some(ratio)
        }
        Err(err) => {
            warn!(n_components, error = %err, "retained variance unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Normals on the plane z = x + y, anomalies lifted off it.
    fn plane_with_lifted_points() -> Dataset {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..24 {
            let x = ((i * 5) % 12) as f64 / 4.0 - 1.5;
            let y = ((i * 7) % 8) as f64 / 3.0 - 1.2;
            features.push(vec![x, y, x + y]);
            labels.push(0);
        }
        features.push(vec![0.5, 0.5, 4.0]);
        labels.push(1);
        features.push(vec![-0.5, 0.2, -3.0]);
        labels.push(1);
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn reconstruction_error_pipeline() {
        let data = plane_with_lifted_points();
        let outcome =
            detection_with_pca_reconstruction_error(&data, &data, 2, &DetectorConfig::default())
                .unwrap();

        assert!(outcome.threshold.found);
        assert_relative_eq!(outcome.testing.r_precision, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn gaussian_pipeline_runs_on_encoded_data() {
        let data = plane_with_lifted_points();
        let outcome =
            detection_with_pca_gaussian(&data, &data, 2, &DetectorConfig::new(2)).unwrap();

        assert_eq!(outcome.testing.r, 2);
        assert_eq!(outcome.testing.k, 2);
        assert!((0.0..=1.0).contains(&outcome.testing.f1));
    }

    #[test]
    fn retained_variance_is_skipped_for_constant_rows() {
        let constant = vec![vec![1.0, 1.0]; 4];
        assert_eq!(log_retained(&constant, &constant, 1), None);

        let data = vec![vec![1.0, 2.0], vec![3.0, 5.0]];
        let ratio = log_retained(&data, &data, 2).unwrap();
        assert_relative_eq!(ratio, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn too_many_components_is_rejected() {
        let data = plane_with_lifted_points();
        assert!(
            detection_with_pca_gaussian(&data, &data, 4, &DetectorConfig::default()).is_err()
        );
    }
}
