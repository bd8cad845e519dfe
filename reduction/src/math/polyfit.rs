//! Unweighted least-squares quadratic fit with coefficient covariance.

/// Result of fitting `y = c0 + c1·x + c2·x²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticFit {
    /// `[c0, c1, c2]`.
    pub coefficients: [f64; 3],
    /// Inverse of the normal matrix (unit weights), indexed like `coefficients`.
    pub covariance: [[f64; 3]; 3],
    /// Sum of squared residuals.
    pub chi2: f64,
    /// Degrees of freedom: number of points minus 3.
    pub dof: usize,
}

impl QuadraticFit {
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        let [c0, c1, c2] = self.coefficients;
        c0 + x * (c1 + x * c2)
    }

    /// Abscissa of the parabola's extremum, `-c1 / (2·c2)`. `None` for a straight line.
    pub fn vertex(&self) -> Option<f64> {
        let [_, c1, c2] = self.coefficients;
        if c2 == 0.0 {
            return None;
        }
        Some(-c1 / (2.0 * c2))
    }
}

/// Fit a parabola through `(x, y)` with uniform weights.
///
/// Returns `None` with fewer than three points or a singular normal matrix
/// (fewer than three distinct abscissae).
pub fn fit_quadratic(x: &[f64], y: &[f64]) -> Option<QuadraticFit> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n < 3 {
        return None;
    }

    // Power sums S_k = Σ x^k and moments T_k = Σ x^k·y
    let mut s = [0.0f64; 5];
    let mut t = [0.0f64; 3];
    for (&xi, &yi) in x.iter().zip(y) {
        let mut p = 1.0;
        for (k, sk) in s.iter_mut().enumerate() {
            *sk += p;
            if k < 3 {
                t[k] += p * yi;
            }
            p *= xi;
        }
    }

    let normal = [[s[0], s[1], s[2]], [s[1], s[2], s[3]], [s[2], s[3], s[4]]];
    let inv = invert_symmetric3(&normal)?;

    let mut coefficients = [0.0; 3];
    for (row, c) in inv.iter().zip(coefficients.iter_mut()) {
        *c = row[0] * t[0] + row[1] * t[1] + row[2] * t[2];
    }

    let mut fit = QuadraticFit {
        coefficients,
        covariance: inv,
        chi2: 0.0,
        dof: n - 3,
    };
    fit.chi2 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - fit.eval(xi);
            r * r
        })
        .sum();
    Some(fit)
}

fn invert_symmetric3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let cof00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
    let cof01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
    let cof02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];
    let det = m[0][0] * cof00 + m[0][1] * cof01 + m[0][2] * cof02;

    // Scale-aware singularity test: the normal matrix of identical abscissae has
    // a determinant that is pure rounding noise relative to its entries.
    let scale = m[0][0] * m[1][1] * m[2][2];
    if !det.is_finite() || det.abs() <= scale.abs() * 1e-12 {
        return None;
    }
    let inv_det = 1.0 / det;

    Some([
        [
            cof00 * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            cof01 * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            cof02 * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ])
}
