//! Dense linear algebra on row-major `Vec<Vec<f64>>` matrices.
//!
//! Sized for the small covariance matrices of reduced feature spaces; none of
//! these routines try to be clever about cache layout.

use crate::error::{AnomalyError, Result};

/// Check that `data` is a non-empty rectangular matrix, returning its
/// column count.
pub fn check_matrix(data: &[Vec<f64>]) -> Result<usize> {
    let first = data.first().ok_or(AnomalyError::EmptyData)?;
    let dim = first.len();
    if dim == 0 {
        return Err(AnomalyError::EmptyData);
    }
    if let Some(row) = data.iter().find(|row| row.len() != dim) {
        return Err(AnomalyError::DimensionMismatch {
            expected: dim,
            got: row.len(),
        });
    }
    Ok(dim)
}

/// Mean of each column.
pub fn column_means(data: &[Vec<f64>]) -> Result<Vec<f64>> {
    let dim = check_matrix(data)?;
    let n = data.len() as f64;

    let mut means = vec![0.0; dim];
    for row in data {
        for (m, &x) in means.iter_mut().zip(row) {
            *m += x;
        }
    }
    for m in &mut means {
        *m /= n;
    }
    Ok(means)
}

/// Sample covariance (n - 1 denominator) of the columns of `data`.
pub fn covariance(data: &[Vec<f64>], means: &[f64]) -> Result<Vec<Vec<f64>>> {
    let dim = check_matrix(data)?;
    if means.len() != dim {
        return Err(AnomalyError::DimensionMismatch {
            expected: dim,
            got: means.len(),
        });
    }
    if data.len() < 2 {
        return Err(AnomalyError::InsufficientData {
            needed: 2,
            got: data.len(),
        });
    }

    let mut cov = vec![vec![0.0; dim]; dim];
    for row in data {
        let centered: Vec<f64> = row.iter().zip(means).map(|(x, m)| x - m).collect();
        for i in 0..dim {
            for j in 0..=i {
                cov[i][j] += centered[i] * centered[j];
            }
        }
    }

    let denom = (data.len() - 1) as f64;
    for i in 0..dim {
        for j in 0..=i {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    Ok(cov)
}

/// Cholesky decomposition A = L @ L'.
///
/// Returns the lower-triangular factor, or `None` if `a` is not positive
/// definite.
pub fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    if n == 0 || a.iter().any(|row| row.len() != n) {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve L @ y = b for lower-triangular `l`.
pub fn forward_substitution(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }
    y
}

/// Eigen-decomposition of a symmetric matrix with the cyclic Jacobi method.
///
/// Returns eigenvalues in descending order and the matching unit
/// eigenvectors (one `Vec` per eigenvector).
pub fn symmetric_eigen(a: &[Vec<f64>]) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    const MAX_SWEEPS: usize = 100;
    const TOL: f64 = 1e-12;

    let n = check_matrix(a)?;
    if a.len() != n {
        return Err(AnomalyError::DimensionMismatch {
            expected: n,
            got: a.len(),
        });
    }

    let mut m: Vec<Vec<f64>> = a.to_vec();
    // v[i][j]: component i of eigenvector j
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale: f64 = m
        .iter()
        .flat_map(|row| row.iter())
        .map(|x| x * x)
        .sum::<f64>()
        .sqrt()
        .max(f64::MIN_POSITIVE);

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| m[i][j] * m[i][j])
            .sum::<f64>()
            .sqrt();
        if off <= TOL * scale {
            return Ok(sorted_eigenpairs(&m, &v));
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if m[p][q].abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (m[q][q] - m[p][p]) / (2.0 * m[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let mkp = m[k][p];
                    let mkq = m[k][q];
                    m[k][p] = c * mkp - s * mkq;
                    m[k][q] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let mpk = m[p][k];
                    let mqk = m[q][k];
                    m[p][k] = c * mpk - s * mqk;
                    m[q][k] = s * mpk + c * mqk;
                }
                for row in v.iter_mut() {
                    let vkp = row[p];
                    let vkq = row[q];
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    Err(AnomalyError::ComputationError(
        "Jacobi eigen-decomposition did not converge".to_string(),
    ))
}

fn sorted_eigenpairs(m: &[Vec<f64>], v: &[Vec<f64>]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = m.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| m[b][b].total_cmp(&m[a][a]));

    let values = order.iter().map(|&j| m[j][j]).collect();
    let vectors = order
        .iter()
        .map(|&j| (0..n).map(|i| v[i][j]).collect())
        .collect();
    (values, vectors)
}

/// Euclidean distance between matching rows of two matrices.
pub fn euclidean_distances(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Vec<f64>> {
    if a.len() != b.len() {
        return Err(AnomalyError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            if x.len() != y.len() {
                return Err(AnomalyError::DimensionMismatch {
                    expected: x.len(),
                    got: y.len(),
                });
            }
            Ok(x.iter()
                .zip(y)
                .map(|(p, q)| (p - q).powi(2))
                .sum::<f64>()
                .sqrt())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn means_and_covariance() {
        let data = vec![vec![1.0, 2.0], vec![3.0, 6.0], vec![5.0, 10.0]];
        let means = column_means(&data).unwrap();
        assert_relative_eq!(means[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(means[1], 6.0, epsilon = 1e-12);

        let cov = covariance(&data, &means).unwrap();
        assert_relative_eq!(cov[0][0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(cov[1][1], 16.0, epsilon = 1e-12);
        assert_relative_eq!(cov[0][1], 8.0, epsilon = 1e-12);
        assert_relative_eq!(cov[1][0], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn covariance_needs_two_rows() {
        let data = vec![vec![1.0, 2.0]];
        let result = covariance(&data, &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(AnomalyError::InsufficientData { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn cholesky_reconstructs_matrix() {
        let a = vec![
            vec![4.0, 2.0, 0.4],
            vec![2.0, 5.0, 1.0],
            vec![0.4, 1.0, 3.0],
        ];
        let l = cholesky(&a).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let v: f64 = (0..3).map(|k| l[i][k] * l[j][k]).sum();
                assert_relative_eq!(v, a[i][j], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn cholesky_rejects_singular() {
        let a = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        assert!(cholesky(&a).is_none());
    }

    #[test]
    fn forward_substitution_solves_lower_system() {
        let l = vec![vec![2.0, 0.0], vec![1.0, 3.0]];
        let y = forward_substitution(&l, &[4.0, 11.0]);
        assert_relative_eq!(y[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(y[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn eigen_of_diagonal_matrix() {
        let a = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 5.0, 0.0],
            vec![0.0, 0.0, 3.0],
        ];
        let (values, vectors) = symmetric_eigen(&a).unwrap();
        assert_relative_eq!(values[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(values[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(values[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(vectors[0][1].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn eigen_satisfies_definition() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 2.0]];
        let (values, vectors) = symmetric_eigen(&a).unwrap();

        assert_relative_eq!(values[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(values[1], 1.0, epsilon = 1e-10);
        for (lambda, vec) in values.iter().zip(&vectors) {
            for i in 0..2 {
                let av: f64 = (0..2).map(|j| a[i][j] * vec[j]).sum();
                assert_relative_eq!(av, lambda * vec[i], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn row_distances() {
        let a = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        let b = vec![vec![3.0, 4.0], vec![1.0, 1.0]];
        let d = euclidean_distances(&a, &b).unwrap();
        assert_relative_eq!(d[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(d[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn row_distances_shape_mismatch() {
        let a = vec![vec![0.0, 0.0]];
        let b = vec![vec![3.0, 4.0], vec![1.0, 1.0]];
        assert!(euclidean_distances(&a, &b).is_err());
    }
}
