//! Train/validation/test splitting.
//!
//! All splitters take the random generator from the caller so that a fixed
//! seed reproduces the same partition.
//!
//! # Example
//!
//! ```
//! use anofox_anomaly::split::split_train_val_test;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let labels = vec![0, 0, 0, 0, 0, 0, 1, 0, 1, 0];
//! let mut rng = StdRng::seed_from_u64(9001);
//! let split = split_train_val_test(&labels, 0.5, 0.0, &mut rng).unwrap();
//!
//! assert_eq!(split.train.len(), 5);
//! assert!(split.train.iter().all(|&i| labels[i] == 0));
//! assert!(split.validation.is_none());
//! ```

mod kfold;

pub use kfold::{FoldSplit, KFold};

use crate::core::{count_anomalies, validate_labels, Dataset};
use crate::error::{AnomalyError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Index sets produced by a splitter.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    /// `None` when no validation share was requested.
    pub validation: Option<Vec<usize>>,
    pub test: Vec<usize>,
}

/// Datasets materialized from a [`SplitIndices`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit {
    pub train: Dataset,
    pub validation: Option<Dataset>,
    pub test: Dataset,
}

impl DatasetSplit {
    pub fn from_indices(dataset: &Dataset, indices: &SplitIndices) -> Result<Self> {
        Ok(Self {
            train: dataset.subset(&indices.train)?,
            validation: indices
                .validation
                .as_ref()
                .map(|v| dataset.subset(v))
                .transpose()?,
            test: dataset.subset(&indices.test)?,
        })
    }
}

/// Ratios for the anomaly-free training split.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitConfig {
    /// Share of all samples used for training (normals only).
    pub train_ratio: f64,
    /// Share of all samples used for validation.
    pub val_ratio: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.6,
            val_ratio: 0.0,
        }
    }
}

impl SplitConfig {
    pub fn new(train_ratio: f64) -> Self {
        Self {
            train_ratio,
            ..Default::default()
        }
    }

    pub fn with_val_ratio(mut self, val_ratio: f64) -> Self {
        self.val_ratio = val_ratio;
        self
    }

    /// Split a dataset with [`split_train_val_test`].
    pub fn split<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<DatasetSplit> {
        let indices = split_train_val_test(dataset.labels(), self.train_ratio, self.val_ratio, rng)?;
        DatasetSplit::from_indices(dataset, &indices)
    }
}

fn check_ratio(name: &str, ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(AnomalyError::InvalidParameter(format!(
            "{} must be in [0, 1], got {}",
            name, ratio
        )));
    }
    Ok(())
}

/// Split so that training contains normal samples only.
///
/// Training takes the first `floor(m * train_ratio)` shuffled normals. The
/// remaining normals and every anomaly are shuffled together; validation
/// takes the first `floor(m * val_ratio)` of that pool and test the rest.
pub fn split_train_val_test<R: Rng + ?Sized>(
    labels: &[u8],
    train_ratio: f64,
    val_ratio: f64,
    rng: &mut R,
) -> Result<SplitIndices> {
    check_ratio("train_ratio", train_ratio)?;
    check_ratio("val_ratio", val_ratio)?;
    validate_labels(labels)?;
    if labels.is_empty() {
        return Err(AnomalyError::EmptyData);
    }

    let m = labels.len();
    let (anomalies, mut normals): (Vec<usize>, Vec<usize>) =
        (0..m).partition(|&i| labels[i] == 1);
    normals.shuffle(rng);

    let train_size = ((m as f64 * train_ratio).floor() as usize).min(normals.len());
    let mut pool = normals.split_off(train_size);
    let train = normals;
    pool.extend(anomalies);
    pool.shuffle(rng);

    let validation = if val_ratio == 0.0 {
        None
    } else {
        let val_size = ((m as f64 * val_ratio).floor() as usize).min(pool.len());
        let rest = pool.split_off(val_size);
        Some(std::mem::replace(&mut pool, rest))
    };

    debug!(
        train = train.len(),
        validation = validation.as_ref().map_or(0, Vec::len),
        test = pool.len(),
        "balanced split"
    );

    Ok(SplitIndices {
        train,
        validation,
        test: pool,
    })
}

/// Random permutation of `0..m` split into the first `floor(m * ratio)` and
/// the rest.
pub fn perm_and_split<R: Rng + ?Sized>(
    m: usize,
    ratio: f64,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<usize>)> {
    check_ratio("ratio", ratio)?;
    let mut indices: Vec<usize> = (0..m).collect();
    indices.shuffle(rng);
    let first_size = (m as f64 * ratio).floor() as usize;
    let second = indices.split_off(first_size);
    Ok((indices, second))
}

/// Permutation split where both sides contain at least one anomaly.
///
/// Permutations are redrawn until the constraint holds, at most
/// `max_attempts` times. Training may contain anomalies.
///
/// # Errors
/// `InsufficientAnomalies` when fewer than two anomalies exist or no accepted
/// permutation is found within `max_attempts`.
pub fn split_training<R: Rng + ?Sized>(
    labels: &[u8],
    ratio: f64,
    max_attempts: usize,
    rng: &mut R,
) -> Result<SplitIndices> {
    check_ratio("ratio", ratio)?;
    validate_labels(labels)?;
    if max_attempts == 0 {
        return Err(AnomalyError::InvalidParameter(
            "max_attempts must be at least 1".to_string(),
        ));
    }

    let anomalies = count_anomalies(labels);
    let m = labels.len();
    let train_size = (m as f64 * ratio).floor() as usize;
    if anomalies < 2 || train_size == 0 || train_size == m {
        return Err(AnomalyError::InsufficientAnomalies {
            anomalies,
            attempts: 0,
        });
    }

    let has_anomaly = |side: &[usize]| side.iter().any(|&i| labels[i] == 1);
    for attempt in 1..=max_attempts {
        let (train, test) = perm_and_split(m, ratio, rng)?;
        if has_anomaly(&train) && has_anomaly(&test) {
            debug!(attempt, train = train.len(), test = test.len(), "split accepted");
            return Ok(SplitIndices {
                train,
                validation: None,
                test,
            });
        }
    }

    Err(AnomalyError::InsufficientAnomalies {
        anomalies,
        attempts: max_attempts,
    })
}

/// [`split_training`] applied to a dataset, returning (train, test).
pub fn split_dataset<R: Rng + ?Sized>(
    dataset: &Dataset,
    ratio: f64,
    max_attempts: usize,
    rng: &mut R,
) -> Result<(Dataset, Dataset)> {
    let indices = split_training(dataset.labels(), ratio, max_attempts, rng)?;
    Ok((
        dataset.subset(&indices.train)?,
        dataset.subset(&indices.test)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn labels() -> Vec<u8> {
        let mut labels = vec![0u8; 20];
        labels[3] = 1;
        labels[11] = 1;
        labels[17] = 1;
        labels
    }

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn balanced_split_has_normal_training() {
        let labels = labels();
        let mut rng = StdRng::seed_from_u64(1);
        let split = split_train_val_test(&labels, 0.5, 0.2, &mut rng).unwrap();

        assert_eq!(split.train.len(), 10);
        assert!(split.train.iter().all(|&i| labels[i] == 0));

        let validation = split.validation.clone().unwrap();
        assert_eq!(validation.len(), 4);
        assert_eq!(split.test.len(), 6);

        let all: Vec<usize> = split
            .train
            .iter()
            .chain(&validation)
            .chain(&split.test)
            .copied()
            .collect();
        assert_eq!(sorted(all), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn training_is_capped_at_normal_count() {
        let labels = labels();
        let mut rng = StdRng::seed_from_u64(2);
        let split = split_train_val_test(&labels, 1.0, 0.0, &mut rng).unwrap();

        assert_eq!(split.train.len(), 17);
        assert_eq!(sorted(split.test), vec![3, 11, 17]);
    }

    #[test]
    fn balanced_split_is_seed_deterministic() {
        let labels = labels();
        let a = split_train_val_test(&labels, 0.6, 0.1, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = split_train_val_test(&labels, 0.6, 0.1, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ratios_out_of_range() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            split_train_val_test(&labels(), 1.5, 0.0, &mut rng),
            Err(AnomalyError::InvalidParameter(_))
        ));
        assert!(matches!(
            split_train_val_test(&labels(), 0.5, -0.1, &mut rng),
            Err(AnomalyError::InvalidParameter(_))
        ));
    }

    #[test]
    fn perm_split_sizes() {
        let mut rng = StdRng::seed_from_u64(3);
        let (a, b) = perm_and_split(10, 0.7, &mut rng).unwrap();
        assert_eq!(a.len(), 7);
        assert_eq!(b.len(), 3);

        let all: Vec<usize> = a.into_iter().chain(b).collect();
        assert_eq!(sorted(all), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn legacy_split_puts_anomalies_on_both_sides() {
        let labels = labels();
        let mut rng = StdRng::seed_from_u64(4);
        let split = split_training(&labels, 0.5, 1000, &mut rng).unwrap();

        assert_eq!(split.train.len(), 10);
        assert_eq!(split.test.len(), 10);
        assert!(split.train.iter().any(|&i| labels[i] == 1));
        assert!(split.test.iter().any(|&i| labels[i] == 1));
    }

    #[test]
    fn legacy_split_fails_fast_with_one_anomaly() {
        let mut labels = vec![0u8; 10];
        labels[4] = 1;
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(
            split_training(&labels, 0.5, 1000, &mut rng).unwrap_err(),
            AnomalyError::InsufficientAnomalies {
                anomalies: 1,
                attempts: 0
            }
        );
    }

    #[test]
    fn split_dataset_keeps_rows_and_labels_together() {
        let labels = labels();
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let dataset = Dataset::new(features, labels.clone()).unwrap();
        let mut rng = StdRng::seed_from_u64(6);

        let (train, test) = split_dataset(&dataset, 0.5, 100, &mut rng).unwrap();
        assert_eq!(train.len() + test.len(), 20);
        for (row, &label) in train.features().iter().zip(train.labels()) {
            assert_eq!(labels[row[0] as usize], label);
        }
    }

    #[test]
    fn config_split_materializes_datasets() {
        let labels = labels();
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 1.0]).collect();
        let dataset = Dataset::new(features, labels).unwrap();
        let mut rng = StdRng::seed_from_u64(8);

        let split = SplitConfig::new(0.5)
            .with_val_ratio(0.25)
            .split(&dataset, &mut rng)
            .unwrap();
        assert_eq!(split.train.n_anomalies(), 0);
        assert_eq!(split.validation.as_ref().map(Dataset::len), Some(5));
        assert_eq!(split.train.len() + 5 + split.test.len(), 20);
    }
}
