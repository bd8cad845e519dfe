//! Statistical functions: median, MAD, mean, standard deviation and error propagation.

/// MAD (Median Absolute Deviation) to standard deviation conversion factor.
///
/// For a normal distribution, σ ≈ 1.4826 × MAD.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Ratio between the standard error of the median and of the mean for Gaussian
/// samples: sqrt(π / 2).
pub const MEDIAN_ERROR_FACTOR: f64 = 1.253_314_137_315_500_3;

/// Convert MAD to standard deviation (assuming normal distribution).
#[inline]
pub fn mad_to_sigma(mad: f64) -> f64 {
    mad * MAD_TO_SIGMA
}

/// Calculate the median of f64 values in-place using quickselect.
///
/// Mutates the input buffer (partial sort).
#[inline]
pub fn median_mut(data: &mut [f64]) -> f64 {
    debug_assert!(!data.is_empty());

    let len = data.len();
    let mid = len / 2;

    let (left, right_median, _) = data.select_nth_unstable_by(mid, f64::total_cmp);
    let right = *right_median;
    if len % 2 == 1 {
        right
    } else {
        // Left median is max of left partition
        let left = left.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (left + right) * 0.5
    }
}

/// Median of an ascending-sorted slice.
#[inline]
pub fn median_sorted(sorted: &[f64]) -> f64 {
    debug_assert!(!sorted.is_empty());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    }
}

/// Compute MAD (Median Absolute Deviation) using a scratch buffer.
///
/// MAD = median(|x_i - median|). Returns 0 for empty input.
pub fn mad_with_scratch(values: &[f64], median: f64, scratch: &mut Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    scratch.clear();
    scratch.extend(values.iter().map(|&v| (v - median).abs()));
    median_mut(scratch)
}

/// Arithmetic mean. NaN for empty input.
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). `None` for fewer than two values.
pub fn stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|&v| (v - m) * (v - m)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// sqrt(Σ e²).
#[inline]
pub fn quadrature_sum(errors: &[f64]) -> f64 {
    errors.iter().map(|&e| e * e).sum::<f64>().sqrt()
}

/// Error of the arithmetic mean of independent samples: sqrt(Σ e²) / n.
#[inline]
pub fn mean_error(errors: &[f64]) -> f64 {
    quadrature_sum(errors) / errors.len() as f64
}

/// Inverse-variance weighted mean and its error `1 / sqrt(Σ w)`, with `w = e⁻²`.
pub fn weighted_mean(values: &[f64], errors: &[f64]) -> (f64, f64) {
    debug_assert_eq!(values.len(), errors.len());
    let mut sum = 0.0;
    let mut weight_sum = 0.0;
    for (&v, &e) in values.iter().zip(errors) {
        let w = 1.0 / (e * e);
        sum += v * w;
        weight_sum += w;
    }
    (sum / weight_sum, 1.0 / weight_sum.sqrt())
}

/// Sort `values` ascending, applying the same permutation to `errors`.
///
/// Insertion sort for short sequences (typical stack depths), permutation sort otherwise.
pub fn sort_pairs_by_value(values: &mut [f64], errors: &mut [f64]) {
    const INSERTION_SORT_THRESHOLD: usize = 64;

    debug_assert_eq!(values.len(), errors.len());
    let n = values.len();

    if n <= INSERTION_SORT_THRESHOLD {
        for i in 1..n {
            let mut j = i;
            while j > 0 && values[j - 1] > values[j] {
                values.swap(j - 1, j);
                errors.swap(j - 1, j);
                j -= 1;
            }
        }
        return;
    }

    let mut perm: Vec<usize> = (0..n).collect();
    perm.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let old_values = values.to_vec();
    let old_errors = errors.to_vec();
    for (dst, &src) in perm.iter().enumerate() {
        values[dst] = old_values[src];
        errors[dst] = old_errors[src];
    }
}

#[cfg(test)]
mod tests;
