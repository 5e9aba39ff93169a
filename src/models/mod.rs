//! Anomaly scoring models.

mod traits;

pub mod gaussian;
pub mod reconstruction;

pub use gaussian::{estimate_gaussian, whiten_covariance, GaussianDensity};
pub use reconstruction::ReconstructionError;
pub use traits::{BoxedScoreProducer, ScoreProducer};
