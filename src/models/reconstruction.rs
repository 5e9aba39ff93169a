//! Reconstruction-error scoring.
//!
//! Rows the reducer cannot rebuild well sit far from the subspace learned on
//! training data, so larger errors are more anomalous.

use crate::core::ScoreDirection;
use crate::error::{AnomalyError, Result};
use crate::models::ScoreProducer;
use crate::reduction::DimensionReducer;
use crate::utils::linalg::euclidean_distances;

/// Scores each row by the Euclidean distance to its own reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructionError<R> {
    reducer: R,
    n_components: usize,
    fitted: bool,
}

impl<R: DimensionReducer> ReconstructionError<R> {
    pub fn new(reducer: R, n_components: usize) -> Self {
        Self {
            reducer,
            n_components,
            fitted: false,
        }
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }
}

impl<R: DimensionReducer> ScoreProducer for ReconstructionError<R> {
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<()> {
        self.reducer.fit(data, self.n_components)?;
        self.fitted = true;
        Ok(())
    }

    fn score(&self, data: &[Vec<f64>]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(AnomalyError::FitRequired);
        }
        let rebuilt = self.reducer.reconstruct(data)?;
        euclidean_distances(data, &rebuilt)
    }

    fn direction(&self) -> ScoreDirection {
        ScoreDirection::HigherIsAnomalous
    }

    fn name(&self) -> &str {
        "ReconstructionError"
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}
