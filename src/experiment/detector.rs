//! Training and testing of a score-based detector.

use crate::core::{Dataset, Ranking, ScoreDirection};
use crate::error::{AnomalyError, Result};
use crate::experiment::DetectorConfig;
use crate::metrics::{evaluate, MetricReport};
use crate::models::ScoreProducer;
use crate::threshold::{apply_threshold, select_threshold, select_threshold_distance, ThresholdSelection};
use crate::utils::linalg::euclidean_distances;
use tracing::info;

/// Result of a train/test run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainTestOutcome {
    /// Threshold chosen on the training scores.
    pub threshold: ThresholdSelection,
    /// Metrics on the ranked test set.
    pub testing: MetricReport,
}

impl TrainTestOutcome {
    /// Metrics of the selected threshold on the ranked training set.
    pub fn training(&self) -> &MetricReport {
        &self.threshold.report
    }
}

/// An untrained detector: a score producer plus evaluation settings.
#[derive(Debug, Clone)]
pub struct Detector<P> {
    producer: P,
    config: DetectorConfig,
}

impl<P: ScoreProducer> Detector<P> {
    pub fn new(producer: P, config: DetectorConfig) -> Self {
        Self { producer, config }
    }

    /// Fit the producer on `data`, score it and pick the F1-optimal threshold.
    pub fn train(mut self, data: &Dataset) -> Result<TrainedDetector<P>> {
        if data.is_empty() {
            return Err(AnomalyError::EmptyData);
        }
        self.producer.fit(data.features())?;
        let scores = self.producer.score(data.features())?;
        let selection = select_threshold(
            &scores,
            data.labels(),
            self.producer.direction(),
            &self.config.threshold_config(),
        )?;

        info!(
            model = self.producer.name(),
            samples = data.len(),
            epsilon = selection.epsilon,
            f1 = selection.f1,
            "detector trained"
        );

        Ok(TrainedDetector {
            producer: self.producer,
            selection,
            config: self.config,
        })
    }
}

/// A fitted detector with a fixed threshold.
#[derive(Debug, Clone)]
pub struct TrainedDetector<P> {
    producer: P,
    selection: ThresholdSelection,
    config: DetectorConfig,
}

impl<P: ScoreProducer> TrainedDetector<P> {
    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub fn selection(&self) -> &ThresholdSelection {
        &self.selection
    }

    pub fn epsilon(&self) -> f64 {
        self.selection.epsilon
    }

    /// Binary predictions in input order.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<u8>> {
        let scores = self.producer.score(features)?;
        Ok(apply_threshold(
            &scores,
            self.selection.epsilon,
            self.producer.direction(),
        ))
    }

    /// Score `data`, rank it and evaluate the thresholded predictions.
    pub fn test(&self, data: &Dataset) -> Result<MetricReport> {
        let scores = self.producer.score(data.features())?;
        let (preds, ranked_labels) = rank_and_predict(
            &scores,
            data.labels(),
            self.selection.epsilon,
            self.producer.direction(),
        )?;
        let report = evaluate(&preds, &ranked_labels, self.config.k)?;

        info!(
            model = self.producer.name(),
            samples = data.len(),
            f1 = report.f1,
            r_precision = report.r_precision,
            precision_at_k = report.precision_at_k,
            "detector tested"
        );
        Ok(report)
    }
}

/// Rank scores by direction and threshold them.
///
/// Returns the predictions and the labels, both in rank order.
pub(crate) fn rank_and_predict(
    scores: &[f64],
    labels: &[u8],
    epsilon: f64,
    direction: ScoreDirection,
) -> Result<(Vec<u8>, Vec<u8>)> {
    if scores.len() != labels.len() {
        return Err(AnomalyError::DimensionMismatch {
            expected: labels.len(),
            got: scores.len(),
        });
    }
    let ranking = Ranking::by_score(scores, direction);
    let preds = apply_threshold(&ranking.apply(scores), epsilon, direction);
    Ok((preds, ranking.apply(labels)))
}

/// Train on `train`, then evaluate on `test`.
pub fn train_test<P: ScoreProducer>(
    producer: P,
    train: &Dataset,
    test: &Dataset,
    config: &DetectorConfig,
) -> Result<TrainTestOutcome> {
    let trained = Detector::new(producer, config.clone()).train(train)?;
    let testing = trained.test(test)?;
    Ok(TrainTestOutcome {
        threshold: trained.selection,
        testing,
    })
}

/// Train/test on reconstructions produced elsewhere.
///
/// Scores are the row-wise distances between each original matrix and its
/// decoded counterpart.
pub fn train_test_with_reconstruction_error(
    original_train: &[Vec<f64>],
    decoded_train: &[Vec<f64>],
    original_test: &[Vec<f64>],
    decoded_test: &[Vec<f64>],
    labels_train: &[u8],
    labels_test: &[u8],
    config: &DetectorConfig,
) -> Result<TrainTestOutcome> {
    let train_errors = euclidean_distances(original_train, decoded_train)?;
    let threshold =
        select_threshold_distance(&train_errors, labels_train, &config.threshold_config())?;

    let test_errors = euclidean_distances(original_test, decoded_test)?;
    let (preds, ranked_labels) = rank_and_predict(
        &test_errors,
        labels_test,
        threshold.epsilon,
        ScoreDirection::HigherIsAnomalous,
    )?;
    let testing = evaluate(&preds, &ranked_labels, config.k)?;

    info!(
        epsilon = threshold.epsilon,
        f1 = testing.f1,
        r_precision = testing.r_precision,
        "reconstruction error detector tested"
    );
    Ok(TrainTestOutcome { threshold, testing })
}
