//! Cross-validated choice of the whitening coefficient for the Gaussian
//! density model.

use crate::core::{Dataset, ScoreDirection};
use crate::error::{AnomalyError, Result};
use crate::experiment::detector::{rank_and_predict, train_test, TrainTestOutcome};
use crate::experiment::DetectorConfig;
use crate::metrics::evaluate_capped;
use crate::models::{GaussianDensity, ScoreProducer};
use crate::split::KFold;
use crate::threshold::{select_threshold_probability, ThresholdConfig};
use statrs::statistics::Statistics;
use tracing::{debug, info};

/// Lambda grid and cross-validation settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhiteningSearchConfig {
    /// Spacing of the lambda grid, starting at 0.
    pub lam_step: f64,
    /// Exclusive upper bound of the grid.
    pub lam_stop: f64,
    /// Number of K-fold splits per candidate.
    pub folds: usize,
    /// K for Precision@K.
    pub k: usize,
}

impl Default for WhiteningSearchConfig {
    fn default() -> Self {
        Self {
            lam_step: 0.09,
            lam_stop: 0.999,
            folds: 2,
            k: 10,
        }
    }
}

impl WhiteningSearchConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_lam_step(mut self, lam_step: f64) -> Self {
        self.lam_step = lam_step;
        self
    }

    pub fn with_lam_stop(mut self, lam_stop: f64) -> Self {
        self.lam_stop = lam_stop;
        self
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Candidate coefficients `0, step, 2 * step, ...` below `lam_stop`.
    pub fn lambdas(&self) -> Result<Vec<f64>> {
        if !(self.lam_step > 0.0 && self.lam_step.is_finite()) {
            return Err(AnomalyError::InvalidParameter(format!(
                "lam_step must be positive, got {}",
                self.lam_step
            )));
        }
        if !(self.lam_stop > 0.0 && self.lam_stop <= 1.0) {
            return Err(AnomalyError::InvalidParameter(format!(
                "lam_stop must be in (0, 1], got {}",
                self.lam_stop
            )));
        }
        Ok((0..)
            .map(|i| i as f64 * self.lam_step)
            .take_while(|&lam| lam < self.lam_stop)
            .collect())
    }
}

/// Fold-averaged metrics for one lambda.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LambdaScore {
    pub lam: f64,
    pub f1: f64,
    /// Sample standard deviation of F1 across folds.
    pub f1_std_dev: f64,
    pub r_precision: f64,
    pub precision_at_k: f64,
}

/// Outcome of [`fit_gaussian_with_whitening_cv`].
#[derive(Debug, Clone)]
pub struct WhiteningSearchResult {
    pub best_lam: f64,
    /// One entry per evaluated lambda, in grid order.
    pub candidates: Vec<LambdaScore>,
    /// Whitened Gaussian refitted on all data with `best_lam`.
    pub model: GaussianDensity,
}

impl WhiteningSearchResult {
    /// Score of the winning lambda.
    pub fn best(&self) -> Option<&LambdaScore> {
        self.candidates.iter().find(|c| c.lam == self.best_lam)
    }
}

/// Pick the whitening coefficient with the highest mean cross-validated F1.
///
/// For every lambda and fold, a whitened Gaussian is fitted on the training
/// fold, the density threshold is chosen on the training fold, and the
/// ranked held-out fold is evaluated with Precision@K capped at the number
/// of anomalies. Ties keep the first (smallest) lambda.
pub fn fit_gaussian_with_whitening_cv(
    data: &Dataset,
    config: &WhiteningSearchConfig,
) -> Result<WhiteningSearchResult> {
    let lambdas = config.lambdas()?;
    let folds = KFold::new(config.folds).split(data.len())?;
    let threshold_config = ThresholdConfig::new(config.k);

    let mut best_lam = 0.0;
    let mut best_f1 = -1.0;
    let mut candidates = Vec::with_capacity(lambdas.len());

    for lam in lambdas {
        let mut f1s = Vec::with_capacity(folds.len());
        let mut r_precisions = Vec::with_capacity(folds.len());
        let mut precisions_at_k = Vec::with_capacity(folds.len());

        for fold in &folds {
            let train = data.subset(&fold.train_indices)?;
            let test = data.subset(&fold.test_indices)?;

            let mut model = GaussianDensity::whitened(lam);
            model.fit(train.features())?;
            let train_densities = model.score(train.features())?;
            let threshold =
                select_threshold_probability(&train_densities, train.labels(), &threshold_config)?;

            let test_densities = model.score(test.features())?;
            let (preds, ranked_labels) = rank_and_predict(
                &test_densities,
                test.labels(),
                threshold.epsilon,
                ScoreDirection::LowerIsAnomalous,
            )?;
            let report = evaluate_capped(&preds, &ranked_labels, config.k)?;

            debug!(lam, fold = fold.fold_idx, f1 = report.f1, "fold evaluated");
            f1s.push(report.f1);
            r_precisions.push(report.r_precision);
            precisions_at_k.push(report.precision_at_k);
        }

        let score = LambdaScore {
            lam,
            f1: f1s.iter().mean(),
            f1_std_dev: f1s.iter().std_dev(),
            r_precision: r_precisions.iter().mean(),
            precision_at_k: precisions_at_k.iter().mean(),
        };
        debug!(
            lam,
            f1 = score.f1,
            r_precision = score.r_precision,
            precision_at_k = score.precision_at_k,
            "lambda evaluated"
        );

        if score.f1 > best_f1 {
            best_f1 = score.f1;
            best_lam = lam;
        }
        candidates.push(score);
    }

    let mut model = GaussianDensity::whitened(best_lam);
    model.fit(data.features())?;
    info!(best_lam, f1 = best_f1, "whitening coefficient selected");

    Ok(WhiteningSearchResult {
        best_lam,
        candidates,
        model,
    })
}

/// Gaussian density train/test, optionally with a cross-validated whitening
/// coefficient chosen on the training set.
pub fn train_test_with_gaussian(
    train: &Dataset,
    test: &Dataset,
    whitening: Option<&WhiteningSearchConfig>,
    config: &DetectorConfig,
) -> Result<(TrainTestOutcome, Option<WhiteningSearchResult>)> {
    match whitening {
        Some(search_config) => {
            let search = fit_gaussian_with_whitening_cv(train, search_config)?;
            let outcome = train_test(
                GaussianDensity::whitened(search.best_lam),
                train,
                test,
                config,
            )?;
            Ok((outcome, Some(search)))
        }
        None => Ok((train_test(GaussianDensity::new(), train, test, config)?, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{estimate_gaussian, whiten_covariance};
    use approx::assert_relative_eq;

    fn correlated_data() -> Dataset {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let t = ((i * 7) % 30) as f64 / 10.0 - 1.5;
            let wobble = ((i * 7) % 5) as f64 * 0.05;
            features.push(vec![t, t + wobble]);
            labels.push(0);
        }
        for (i, point) in [[1.0, -1.0], [-1.0, 1.0], [1.2, -0.8], [-0.9, 1.1]]
            .iter()
            .enumerate()
        {
            // Interleave anomalies so both folds see some.
            let at = i * 8 + 3;
            features.insert(at, point.to_vec());
            labels.insert(at, 1);
        }
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn default_grid_has_twelve_values() {
        let lambdas = WhiteningSearchConfig::default().lambdas().unwrap();
        assert_eq!(lambdas.len(), 12);
        assert_eq!(lambdas[0], 0.0);
        assert_relative_eq!(lambdas[11], 0.99, epsilon = 1e-12);
    }

    #[test]
    fn invalid_grid() {
        assert!(WhiteningSearchConfig::default()
            .with_lam_step(0.0)
            .lambdas()
            .is_err());
        assert!(WhiteningSearchConfig::default()
            .with_lam_stop(1.5)
            .lambdas()
            .is_err());
    }

    #[test]
    fn search_records_every_candidate() {
        let data = correlated_data();
        let result =
            fit_gaussian_with_whitening_cv(&data, &WhiteningSearchConfig::new(5)).unwrap();

        assert_eq!(result.candidates.len(), 12);
        assert!(result.model.is_fitted());
        assert_eq!(result.model.lam(), Some(result.best_lam));

        let best = result.best().unwrap();
        for c in &result.candidates {
            assert!(c.f1 <= best.f1);
            assert!((0.0..=1.0).contains(&c.r_precision));
        }
        // The first lambda reaching the top F1 is kept.
        let first_top = result
            .candidates
            .iter()
            .find(|c| c.f1 == best.f1)
            .unwrap();
        assert_eq!(first_top.lam, result.best_lam);
    }

    #[test]
    fn final_model_uses_winning_lambda_on_all_data() {
        let data = correlated_data();
        let result =
            fit_gaussian_with_whitening_cv(&data, &WhiteningSearchConfig::new(5)).unwrap();

        let (_, cov) = estimate_gaussian(data.features()).unwrap();
        let expected = whiten_covariance(&cov, result.best_lam);
        let fitted = result.model.covariance().unwrap();
        for (a, b) in expected.iter().flatten().zip(fitted.iter().flatten()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn gaussian_train_test_without_whitening() {
        let data = correlated_data();
        let (outcome, search) =
            train_test_with_gaussian(&data, &data, None, &DetectorConfig::default()).unwrap();
        assert!(search.is_none());
        assert!((0.0..=1.0).contains(&outcome.testing.f1));
    }

    #[test]
    fn gaussian_train_test_with_whitening() {
        let data = correlated_data();
        let (outcome, search) = train_test_with_gaussian(
            &data,
            &data,
            Some(&WhiteningSearchConfig::new(5)),
            &DetectorConfig::new(5),
        )
        .unwrap();
        let search = search.unwrap();
        assert!(search.best_lam < 1.0);
        assert_eq!(outcome.testing.k, 5);
    }
}
