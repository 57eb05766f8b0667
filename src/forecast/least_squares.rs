//! Ordinary least squares over an expanded design matrix.
//!
//! Solves the normal equations `(XᵀX) β = Xᵀy` with Gaussian elimination and
//! partial pivoting. Feature counts here are tiny (degree + 1 ≤ 7), so the
//! dense `O(p³)` solve is negligible next to building `XᵀX` in `O(n·p²)`.

/// Pivots smaller than this fraction of the largest diagonal entry are
/// treated as zero.
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-12;

/// Least-squares coefficients for `rows · β ≈ targets`.
///
/// Returns `None` when the system is rank-deficient or inputs are empty or
/// mismatched.
pub fn solve(rows: &[Vec<f64>], targets: &[f64]) -> Option<Vec<f64>> {
    if rows.is_empty() || rows.len() != targets.len() {
        return None;
    }
    let width = rows[0].len();
    if width == 0 || rows.iter().any(|r| r.len() != width) {
        return None;
    }

    let (gram, moment) = normal_equations(rows, targets, width);
    gaussian_elimination(gram, moment)
}

/// Build `XᵀX` and `Xᵀy`.
fn normal_equations(rows: &[Vec<f64>], targets: &[f64], width: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut gram = vec![vec![0.0; width]; width];
    let mut moment = vec![0.0; width];

    for (row, &y) in rows.iter().zip(targets) {
        for i in 0..width {
            moment[i] += row[i] * y;
            for j in i..width {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    // Symmetric: mirror the upper triangle.
    for i in 0..width {
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }

    (gram, moment)
}

/// Solve `a · x = b` in place.
fn gaussian_elimination(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0_f64, f64::max);
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    let tolerance = scale * RELATIVE_PIVOT_TOLERANCE;

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if a[pivot_row][col].abs() <= tolerance {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}
