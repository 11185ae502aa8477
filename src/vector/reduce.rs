//! Orthogonal projection of the document matrix onto its dominant directions
//!
//! Equivalent to a truncated SVD of the document matrix: the document Gram
//! matrix `G = A·Aᵀ` is eigendecomposed (cyclic Jacobi, exact for the small
//! per-request batches this crate sees) and each document row is replaced by
//! its coordinates `U_k·Σ_k` in the top-k singular directions. Pairwise dot
//! products and cosines are preserved up to the truncation.

use crate::error::{RankError, Result};

const MAX_SWEEPS: usize = 50;

/// Project `matrix` rows onto a reduced orthogonal basis of `components`
/// dimensions, floored at 2 to stay numerically valid for very small batches.
pub fn project(matrix: &[Vec<f64>], components: usize) -> Result<Vec<Vec<f64>>> {
    let n = matrix.len();
    if n < 2 {
        return Err(RankError::reduction("fewer than two documents"));
    }
    let dim = matrix[0].len();
    if dim == 0 || matrix.iter().any(|row| row.len() != dim) {
        return Err(RankError::reduction("degenerate document matrix"));
    }

    let k = components.clamp(2, n);

    let mut gram = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let dot: f64 = matrix[i].iter().zip(&matrix[j]).map(|(a, b)| a * b).sum();
            gram[i][j] = dot;
            gram[j][i] = dot;
        }
    }

    let (eigenvalues, eigenvectors) = jacobi_eigen(gram)?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigenvalues[b]
            .partial_cmp(&eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut reduced = vec![vec![0.0; k]; n];
    for (c, &idx) in order.iter().take(k).enumerate() {
        let sigma = eigenvalues[idx].max(0.0).sqrt();
        for i in 0..n {
            reduced[i][c] = eigenvectors[i][idx] * sigma;
        }
    }

    if reduced
        .iter()
        .any(|row| row.iter().any(|v| !v.is_finite()))
    {
        return Err(RankError::reduction("non-finite projection coordinates"));
    }

    Ok(reduced)
}

/// Cyclic Jacobi eigendecomposition of a symmetric matrix.
///
/// Returns the eigenvalues and the matrix whose columns are the matching
/// eigenvectors (`v[i][j]` is component `i` of eigenvector `j`).
fn jacobi_eigen(mut a: Vec<Vec<f64>>) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    let n = a.len();
    let mut v = vec![vec![0.0; n]; n];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    let scale: f64 = (0..n).map(|i| a[i][i].abs()).sum::<f64>().max(f64::MIN_POSITIVE);

    for _sweep in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[i][j].abs())
            .sum();
        if off <= 1e-13 * scale {
            let eigenvalues = (0..n).map(|i| a[i][i]).collect();
            return Ok((eigenvalues, v));
        }

        for p in 0..n - 1 {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq.abs() <= 1e-300 {
                    continue;
                }

                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = if theta >= 0.0 {
                    1.0 / (theta + (1.0 + theta * theta).sqrt())
                } else {
                    1.0 / (theta - (1.0 + theta * theta).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;
                let tau = s / (1.0 + c);

                let app = a[p][p];
                let aqq = a[q][q];
                a[p][p] = app - t * apq;
                a[q][q] = aqq + t * apq;
                a[p][q] = 0.0;
                a[q][p] = 0.0;

                for i in 0..n {
                    if i == p || i == q {
                        continue;
                    }
                    let aip = a[i][p];
                    let aiq = a[i][q];
                    a[i][p] = aip - s * (aiq + tau * aip);
                    a[i][q] = aiq + s * (aip - tau * aiq);
                    a[p][i] = a[i][p];
                    a[q][i] = a[i][q];
                }

                for row in v.iter_mut() {
                    let vip = row[p];
                    let viq = row[q];
                    row[p] = vip - s * (viq + tau * vip);
                    row[q] = viq + s * (vip - tau * viq);
                }
            }
        }
    }

    Err(RankError::reduction("eigendecomposition did not converge"))
}
