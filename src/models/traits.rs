//! ScoreProducer trait defining the common interface for anomaly scorers.

use crate::core::ScoreDirection;
use crate::error::Result;

/// Common interface for models that turn feature rows into anomaly scores.
///
/// This trait is object-safe and can be used with `Box<dyn ScoreProducer>`.
pub trait ScoreProducer {
    /// Fit the model to training rows.
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<()>;

    /// One score per row of `data`.
    fn score(&self, data: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Which end of the score axis is anomalous.
    fn direction(&self) -> ScoreDirection;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed score producer trait objects.
///
/// # Example
///
/// ```
/// use anofox_anomaly::models::{BoxedScoreProducer, GaussianDensity, ScoreProducer};
///
/// let model: BoxedScoreProducer = Box::new(GaussianDensity::new());
/// assert_eq!(model.name(), "GaussianDensity");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedScoreProducer = Box<dyn ScoreProducer>;

impl<P: ScoreProducer + ?Sized> ScoreProducer for Box<P> {
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<()> {
        (**self).fit(data)
    }

    fn score(&self, data: &[Vec<f64>]) -> Result<Vec<f64>> {
        (**self).score(data)
    }

    fn direction(&self) -> ScoreDirection {
        (**self).direction()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }
}
