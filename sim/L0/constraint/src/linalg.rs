//! Dense LU factorization with partial pivoting.
//!
//! The assembled joint system is a symmetric saddle-point matrix, which is
//! indefinite, so Cholesky does not apply. Systems are small (tens to low
//! hundreds of rows) and solved once per step.

use nalgebra::{DMatrix, DVector};
use sim_types::SimError;

/// Pivots smaller than this fraction of the largest matrix entry are
/// treated as zero.
pub const SINGULAR_PIVOT_TOLERANCE: f64 = 1e-12;

/// Factor A = P·L·U in place. Stores L (unit lower) and U (upper) in `a`.
/// Stores pivot rows in `piv`. O(n³/3).
///
/// # Errors
///
/// Returns [`SimError::SolverSingular`] if a pivot magnitude falls below
/// [`SINGULAR_PIVOT_TOLERANCE`] relative to the largest entry of `a`, and
/// [`SimError::Diverged`] if `a` contains `NaN` or `Inf`.
pub fn lu_factor_in_place(a: &mut DMatrix<f64>, piv: &mut [usize]) -> Result<(), SimError> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());
    debug_assert_eq!(n, piv.len());

    if !a.iter().all(|x| x.is_finite()) {
        return Err(SimError::diverged("non-finite entry in system matrix"));
    }

    let scale = a.amax();
    let threshold = SINGULAR_PIVOT_TOLERANCE * scale.max(f64::MIN_POSITIVE);

    for k in 0..n {
        // Partial pivot: find max |a[i,k]| for i in k..n
        let mut max_val = a[(k, k)].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = a[(i, k)].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }
        if max_val <= threshold {
            return Err(SimError::SolverSingular {
                size: n,
                pivot_row: k,
            });
        }
        piv[k] = max_row;

        if max_row != k {
            a.swap_rows(k, max_row);
        }

        for i in (k + 1)..n {
            a[(i, k)] /= a[(k, k)];
            let factor = a[(i, k)];
            if factor == 0.0 {
                continue;
            }
            for j in (k + 1)..n {
                a[(i, j)] -= factor * a[(k, j)];
            }
        }
    }
    Ok(())
}

/// Solve P·L·U·x = b using pre-computed factors. Non-destructive on `a`/`piv`.
#[allow(clippy::needless_range_loop)]
pub fn lu_solve_factored(a: &DMatrix<f64>, piv: &[usize], x: &mut DVector<f64>) {
    let n = a.nrows();

    // Apply row permutation to RHS
    for k in 0..n {
        if piv[k] != k {
            x.swap_rows(k, piv[k]);
        }
    }

    // Forward substitution (L·y = Pb)
    for i in 1..n {
        for k in 0..i {
            x[i] -= a[(i, k)] * x[k];
        }
    }

    // Back substitution (U·x = y)
    for i in (0..n).rev() {
        for k in (i + 1)..n {
            x[i] -= a[(i, k)] * x[k];
        }
        x[i] /= a[(i, i)];
    }
}

/// Solve `a · x = b`, consuming a copy of `a` for the factorization.
///
/// # Errors
///
/// See [`lu_factor_in_place`]; additionally returns [`SimError::Diverged`]
/// if `b` or the solution is not finite.
pub fn lu_solve(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, SimError> {
    if !b.iter().all(|x| x.is_finite()) {
        return Err(SimError::diverged("non-finite entry in right-hand side"));
    }

    let mut lu = a.clone();
    let mut piv = vec![0; a.nrows()];
    lu_factor_in_place(&mut lu, &mut piv)?;

    let mut x = b.clone();
    lu_solve_factored(&lu, &piv, &mut x);

    if !x.iter().all(|v| v.is_finite()) {
        return Err(SimError::diverged("non-finite solution of constraint system"));
    }
    Ok(x)
}
