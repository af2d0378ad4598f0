//! One-dimensional cubic spline on a uniform unit lattice.
//!
//! The spline interpolates samples `y[0..n]` placed at `t = 0, 1, .., n-1`
//! and uses not-a-knot end conditions: the third derivative is continuous
//! at `t = 1` and `t = n-2`. This is the same curve an interpolating
//! degree-3 B-spline with zero smoothing produces when its interior knots
//! are the data sites minus the second and penultimate ones.
//!
//! Written in terms of the second derivatives `M[i]` at the nodes, with unit
//! spacing:
//!
//! ```text
//! M[0]   - 2 M[1]   + M[2]   = 0
//! M[i-1] + 4 M[i]   + M[i+1] = 6 (y[i+1] - 2 y[i] + y[i-1])    1 <= i <= n-2
//! M[n-3] - 2 M[n-2] + M[n-1] = 0
//! ```

use nalgebra::{DMatrix, DVector};

use crate::error::{InterpError, InterpResult};

/// Fewest samples a not-a-knot cubic spline can be fitted to.
pub const MIN_SAMPLES: usize = 4;

/// A fitted cubic spline over samples at integer positions.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    values: Vec<f64>,
    moments: Vec<f64>,
}

impl CubicSpline {
    /// Fit a not-a-knot spline through `values`.
    ///
    /// # Errors
    ///
    /// Returns [`InterpError::TooFewPoints`] for fewer than four samples.
    pub fn fit(values: &[f64]) -> InterpResult<Self> {
        let n = values.len();
        if n < MIN_SAMPLES {
            return Err(InterpError::TooFewPoints {
                axis: "the spline",
                count: n,
                min: MIN_SAMPLES,
            });
        }

        let system = moment_system(n);
        let mut rhs = DVector::zeros(n);
        for i in 1..n - 1 {
            rhs[i] = 6.0 * (values[i + 1] - 2.0 * values[i] + values[i - 1]);
        }
        let moments = system
            .lu()
            .solve(&rhs)
            .ok_or(InterpError::Singular { count: n })?;

        Ok(Self {
            values: values.to_vec(),
            moments: moments.iter().copied().collect(),
        })
    }

    /// Number of samples the spline was fitted to.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; a fitted spline has at least four samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluate at `t`, clamped to `[0, n-1]`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn eval(&self, t: f64) -> f64 {
        let last = (self.values.len() - 1) as f64;
        let t = t.clamp(0.0, last);
        let i = (t.floor() as usize).min(self.values.len() - 2);
        let u = t - i as f64;
        let v = 1.0 - u;

        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.moments[i], self.moments[i + 1]);

        m0 * v * v * v / 6.0 + m1 * u * u * u / 6.0 + (y0 - m0 / 6.0) * v + (y1 - m1 / 6.0) * u
    }

    /// Evaluate at `(n-1) * per_segment + 1` evenly spaced positions from
    /// `0` to `n-1`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn resample(&self, per_segment: u32) -> Vec<f64> {
        let p = per_segment.max(1) as usize;
        let count = (self.values.len() - 1) * p + 1;
        (0..count)
            .map(|k| self.eval(k as f64 / p as f64))
            .collect()
    }
}

/// Coefficient matrix of the moment equations for `n` samples.
fn moment_system(n: usize) -> DMatrix<f64> {
    let mut a = DMatrix::zeros(n, n);
    a[(0, 0)] = 1.0;
    a[(0, 1)] = -2.0;
    a[(0, 2)] = 1.0;
    for i in 1..n - 1 {
        a[(i, i - 1)] = 1.0;
        a[(i, i)] = 4.0;
        a[(i, i + 1)] = 1.0;
    }
    a[(n - 1, n - 3)] = 1.0;
    a[(n - 1, n - 2)] = -2.0;
    a[(n - 1, n - 1)] = 1.0;
    a
}

/// Linear map from `n` samples to their spline resampled at
/// `(n-1) * per_segment + 1` points.
///
/// Row `k` holds the weights of every sample at dense position `k`. Built by
/// fitting the spline to each unit vector, which is valid because the
/// spline depends linearly on the samples.
///
/// # Errors
///
/// Same as [`CubicSpline::fit`].
pub fn resample_matrix(n: usize, per_segment: u32) -> InterpResult<DMatrix<f64>> {
    let p = per_segment.max(1) as usize;
    let dense = n.saturating_sub(1) * p + 1;
    let mut weights = DMatrix::zeros(dense, n);

    let mut basis = vec![0.0; n];
    for j in 0..n {
        basis[j] = 1.0;
        let column = CubicSpline::fit(&basis)?.resample(per_segment);
        basis[j] = 0.0;
        for (k, w) in column.into_iter().enumerate() {
            weights[(k, j)] = w;
        }
    }
    Ok(weights)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cubic(t: f64) -> f64 {
        0.5 * t * t * t - 2.0 * t * t + t - 3.0
    }

    #[test]
    fn too_few_samples() {
        assert!(matches!(
            CubicSpline::fit(&[1.0, 2.0, 3.0]),
            Err(InterpError::TooFewPoints { count: 3, .. })
        ));
    }

    #[test]
    fn passes_through_samples() {
        let values = [0.3, -0.1, 0.8, 0.2, -0.5, 0.0];
        let spline = CubicSpline::fit(&values).unwrap();
        for (i, &v) in values.iter().enumerate() {
            assert_relative_eq!(spline.eval(i as f64), v, epsilon = 1e-12);
        }
    }

    #[test]
    fn reproduces_cubic_polynomials() {
        // Not-a-knot end conditions reproduce any cubic exactly.
        for n in [4, 5, 10] {
            let values: Vec<f64> = (0..n).map(|i| cubic(i as f64)).collect();
            let spline = CubicSpline::fit(&values).unwrap();
            for k in 0..=(n - 1) * 8 {
                let t = k as f64 / 8.0;
                assert_relative_eq!(spline.eval(t), cubic(t), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn constant_stays_constant() {
        let spline = CubicSpline::fit(&[0.25; 7]).unwrap();
        for v in spline.resample(5) {
            assert_relative_eq!(v, 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn resample_length() {
        let spline = CubicSpline::fit(&[0.0; 10]).unwrap();
        assert_eq!(spline.resample(4).len(), 37);
        assert_eq!(spline.resample(1).len(), 10);
    }

    #[test]
    fn eval_clamps_outside_range() {
        let values = [1.0, 2.0, 0.0, 5.0];
        let spline = CubicSpline::fit(&values).unwrap();
        assert_relative_eq!(spline.eval(-3.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(spline.eval(10.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn resample_matrix_matches_direct_fit() {
        let values = [0.1, 0.4, -0.2, 0.3, 0.0];
        let direct = CubicSpline::fit(&values).unwrap().resample(3);
        let w = resample_matrix(values.len(), 3).unwrap();
        let mapped = &w * DVector::from_column_slice(&values);
        assert_eq!(mapped.len(), direct.len());
        for (a, b) in mapped.iter().zip(&direct) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn resample_rows_sum_to_one() {
        // Constants are reproduced, so every row of weights sums to one.
        let w = resample_matrix(6, 4).unwrap();
        for row in w.row_iter() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }
}
