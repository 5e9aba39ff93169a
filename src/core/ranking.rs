//! Score direction and rank ordering.

/// Which end of the score axis indicates an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScoreDirection {
    /// Larger scores are more anomalous (distances, reconstruction errors).
    HigherIsAnomalous,
    /// Smaller scores are more anomalous (probability densities).
    LowerIsAnomalous,
}

impl ScoreDirection {
    /// Whether `score` falls on the anomalous side of `threshold`.
    ///
    /// The comparison is strict in both directions.
    #[inline]
    pub fn is_anomalous(self, score: f64, threshold: f64) -> bool {
        match self {
            Self::HigherIsAnomalous => score > threshold,
            Self::LowerIsAnomalous => score < threshold,
        }
    }
}

/// A permutation of sample indices, most anomalous first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    order: Vec<usize>,
}

impl Ranking {
    /// Rank scores by direction using a stable sort.
    ///
    /// Tied scores keep their input order. NaN scores sort after every finite
    /// score for `LowerIsAnomalous` and before them for `HigherIsAnomalous`.
    pub fn by_score(scores: &[f64], direction: ScoreDirection) -> Self {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        match direction {
            ScoreDirection::HigherIsAnomalous => {
                order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
            }
            ScoreDirection::LowerIsAnomalous => {
                order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));
            }
        }
        Self { order }
    }

    /// The ranked indices.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Reorder `values` by this ranking, returning a new vector.
    ///
    /// # Panics
    /// Panics if `values` is shorter than the ranking.
    pub fn apply<T: Clone>(&self, values: &[T]) -> Vec<T> {
        self.order.iter().map(|&i| values[i].clone()).collect()
    }
}
