//! Numerical helpers shared by the models and the reduction step.

pub mod linalg;

pub use linalg::{
    cholesky, column_means, covariance, euclidean_distances, forward_substitution,
    symmetric_eigen,
};
