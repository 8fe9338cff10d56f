//! Inversion of the small posterior precision matrices of the bayesian ridge.

use ndarray::{Array2, ArrayView2};

use crate::error::{MlErr, Result};

/// Returns the inverse of `a`.
///
/// # Errors
/// Fails if `a` is not square or is singular.
pub(crate) fn invert(a: ArrayView2<f64>) -> Result<Array2<f64>> {
    let identity = Array2::<f64>::eye(a.nrows());
    solve_matrix(a, identity.view())
}

/// Solves `a · x = b` for every column of `b` using Gaussian elimination with
/// partial pivoting.
///
/// # Errors
/// Fails on non square or mismatching inputs and when a pivot vanishes.
fn solve_matrix(a: ArrayView2<f64>, b: ArrayView2<f64>) -> Result<Array2<f64>> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(MlErr::SizeMismatch {
            a: "matrix columns",
            b: "matrix rows",
            got: a.ncols(),
            expected: n,
        });
    }

    if b.nrows() != n {
        return Err(MlErr::SizeMismatch {
            a: "right hand side",
            b: "matrix rows",
            got: b.nrows(),
            expected: n,
        });
    }

    let mut a = a.to_owned();
    let mut b = b.to_owned();
    let m = b.ncols();

    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tol = scale * n as f64 * f64::EPSILON;

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);

        if a[[pivot, col]].abs() <= tol {
            return Err(MlErr::SingularMatrix);
        }

        if pivot != col {
            for j in 0..n {
                a.swap([pivot, j], [col, j]);
            }
            for j in 0..m {
                b.swap([pivot, j], [col, j]);
            }
        }

        let diag = a[[col, col]];
        for row in col + 1..n {
            let factor = a[[row, col]] / diag;
            if factor == 0.0 {
                continue;
            }

            for j in col..n {
                let v = a[[col, j]];
                a[[row, j]] -= factor * v;
            }
            for j in 0..m {
                let v = b[[col, j]];
                b[[row, j]] -= factor * v;
            }
        }
    }

    let mut x = Array2::zeros((n, m));
    for j in 0..m {
        for row in (0..n).rev() {
            let mut acc = b[[row, j]];
            for k in row + 1..n {
                acc -= a[[row, k]] * x[[k, j]];
            }
            x[[row, j]] = acc / a[[row, row]];
        }
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_invert_needs_pivoting() {
        let a = array![[0.0, 2.0], [3.0, 1.0]];
        let inv = invert(a.view()).unwrap();

        let identity = a.dot(&inv);
        for ((i, j), v) in identity.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((v - expected).abs() < 1e-12, "entry ({i}, {j}) = {v}");
        }
    }

    #[test]
    fn test_singular_matrix() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(invert(a.view()), Err(MlErr::SingularMatrix)));

        let zeros = Array2::<f64>::zeros((3, 3));
        assert!(matches!(invert(zeros.view()), Err(MlErr::SingularMatrix)));
    }

    #[test]
    fn test_non_square_matrix() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert!(matches!(invert(a.view()), Err(MlErr::SizeMismatch { .. })));
    }
}
