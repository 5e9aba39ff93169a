//! K-fold cross-validation splitter.

use crate::error::{AnomalyError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// One train/test pair of a K-fold split.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter with contiguous folds.
///
/// The first `n_samples % n_splits` folds receive one extra sample. Without
/// shuffling the folds follow input order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    /// Seed for the shuffle; ignored when `shuffle` is false.
    pub seed: u64,
}

impl Default for KFold {
    fn default() -> Self {
        Self {
            n_splits: 2,
            shuffle: false,
            seed: 0,
        }
    }
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            ..Default::default()
        }
    }

    /// Shuffle indices with the given seed before folding.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    /// Fold sizes for `n_samples`.
    pub fn fold_sizes(&self, n_samples: usize) -> Vec<usize> {
        let base = n_samples / self.n_splits.max(1);
        let remainder = n_samples % self.n_splits.max(1);
        (0..self.n_splits)
            .map(|i| if i < remainder { base + 1 } else { base })
            .collect()
    }

    /// Generate the train/test index pairs.
    ///
    /// # Errors
    /// `InvalidParameter` if `n_splits < 2` or `n_samples < n_splits`.
    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(AnomalyError::InvalidParameter(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(AnomalyError::InvalidParameter(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed);
            indices.shuffle(&mut rng);
        }

        let mut splits = Vec::with_capacity(self.n_splits);
        let mut current = 0;
        for (fold_idx, fold_size) in self.fold_sizes(n_samples).into_iter().enumerate() {
            let test_indices = indices[current..current + fold_size].to_vec();
            let train_indices = indices[..current]
                .iter()
                .chain(&indices[current + fold_size..])
                .copied()
                .collect();

            splits.push(FoldSplit {
                train_indices,
                test_indices,
                fold_idx,
            });
            current += fold_size;
        }

        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_folds_cover_everything() {
        let folds = KFold::new(3).split(10).unwrap();
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[0].test_indices, vec![0, 1, 2, 3]);
        assert_eq!(folds[1].test_indices, vec![4, 5, 6]);
        assert_eq!(folds[2].test_indices, vec![7, 8, 9]);

        for fold in &folds {
            assert_eq!(fold.train_indices.len() + fold.test_indices.len(), 10);
            assert!(fold
                .test_indices
                .iter()
                .all(|i| !fold.train_indices.contains(i)));
        }
    }

    #[test]
    fn two_fold_default() {
        let folds = KFold::default().split(5).unwrap();
        assert_eq!(folds[0].test_indices, vec![0, 1, 2]);
        assert_eq!(folds[0].train_indices, vec![3, 4]);
        assert_eq!(folds[1].test_indices, vec![3, 4]);
        assert_eq!(folds[1].fold_idx, 1);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let a = KFold::new(4).with_shuffle(42).split(20).unwrap();
        let b = KFold::new(4).with_shuffle(42).split(20).unwrap();
        assert_eq!(a, b);

        let mut all: Vec<usize> = a.iter().flat_map(|f| f.test_indices.clone()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn invalid_fold_counts() {
        assert!(KFold::new(1).split(10).is_err());
        assert!(KFold::new(5).split(3).is_err());
    }
}
