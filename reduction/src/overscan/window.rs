//! Sliding row windows and the chi-square of a fitted level.

/// Inclusive row bounds of the window centred on `position`.
///
/// The half size shrinks equally on both sides near the edges of `rows`, so
/// the window stays centred and never leaves `0..rows`.
pub(crate) fn window_bounds(position: usize, half: usize, rows: usize) -> (usize, usize) {
    debug_assert!(position < rows);
    let h = half.min(position).min(rows - 1 - position);
    (position - h, position + h)
}

/// `(chi2, reduced chi2)` of `samples` against `fitted` with noise `ron`.
///
/// Reduced chi2 divides by `n - 1` and is NaN below two samples. Both are NaN
/// without samples or when the fitted level is NaN.
pub(crate) fn chi_square(samples: impl Iterator<Item = f64>, fitted: f64, ron: f64) -> (f64, f64) {
    let (chi2, n) = samples.fold((0.0, 0usize), |(sum, n), v| {
        let r = (v - fitted) / ron;
        (sum + r * r, n + 1)
    });
    match n {
        0 => (f64::NAN, f64::NAN),
        1 => (chi2, f64::NAN),
        _ => (chi2, chi2 / (n - 1) as f64),
    }
}
