//! Tests for statistical functions.

use super::*;

// ---------------------------------------------------------------------------
// Median tests
// ---------------------------------------------------------------------------

#[test]
fn test_median_odd() {
    let mut values = [1.0, 3.0, 2.0, 5.0, 4.0];
    assert!((median_mut(&mut values) - 3.0).abs() < f64::EPSILON);
}

#[test]
fn test_median_even() {
    let mut values = [1.0, 2.0, 3.0, 4.0];
    assert!((median_mut(&mut values) - 2.5).abs() < f64::EPSILON);
}

#[test]
fn test_median_single() {
    let mut values = [42.0];
    assert!((median_mut(&mut values) - 42.0).abs() < f64::EPSILON);
}

#[test]
fn test_median_sorted_matches_quickselect() {
    let mut values = [9.0, -1.0, 4.0, 4.0, 7.0, 0.5];
    let mut sorted = values;
    sorted.sort_by(f64::total_cmp);
    assert_eq!(median_sorted(&sorted), median_mut(&mut values));
    assert!((median_sorted(&sorted) - 4.0).abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// MAD tests
// ---------------------------------------------------------------------------

#[test]
fn test_mad_with_scratch() {
    let values = [2.0, 4.0, 3.0];
    let mut scratch = Vec::new();
    let mad = mad_with_scratch(&values, 3.0, &mut scratch);
    assert!((mad - 1.0).abs() < 1e-12);
}

#[test]
fn test_mad_with_scratch_empty() {
    let mut scratch = Vec::new();
    assert_eq!(mad_with_scratch(&[], 0.0, &mut scratch), 0.0);
}

#[test]
fn test_mad_uniform_is_zero() {
    let values = [3.5; 6];
    let mut scratch = Vec::new();
    assert_eq!(mad_with_scratch(&values, 3.5, &mut scratch), 0.0);
}

#[test]
fn test_mad_to_sigma() {
    assert!((mad_to_sigma(2.0) - 2.9652).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Mean / stdev / error propagation
// ---------------------------------------------------------------------------

#[test]
fn test_mean_and_stdev() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    assert!((mean(&values) - 5.0).abs() < 1e-12);
    // Sample variance 32 / 7
    let expected = (32.0f64 / 7.0).sqrt();
    assert!((stdev(&values).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn test_stdev_needs_two_values() {
    assert_eq!(stdev(&[]), None);
    assert_eq!(stdev(&[1.0]), None);
    assert_eq!(stdev(&[1.0, 1.0]), Some(0.0));
}

#[test]
fn test_mean_error_constant() {
    let errors = [2.0; 4];
    // sqrt(4 * 4) / 4 = 1
    assert!((mean_error(&errors) - 1.0).abs() < 1e-12);
    assert!((quadrature_sum(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
}

#[test]
fn test_weighted_mean_prefers_small_errors() {
    let (m, e) = weighted_mean(&[0.0, 10.0], &[1.0, 3.0]);
    // weights 1 and 1/9
    let expected = 10.0 / 9.0 / (1.0 + 1.0 / 9.0);
    assert!((m - expected).abs() < 1e-12, "mean {m}, expected {expected}");
    assert!((e - 1.0 / (1.0f64 + 1.0 / 9.0).sqrt()).abs() < 1e-12);
}

#[test]
fn test_weighted_mean_equal_errors_is_plain_mean() {
    let values = [1.0, 2.0, 6.0];
    let (m, e) = weighted_mean(&values, &[2.0; 3]);
    assert!((m - 3.0).abs() < 1e-12);
    assert!((e - 2.0 / 3.0f64.sqrt()).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Pair sorting
// ---------------------------------------------------------------------------

#[test]
fn test_sort_pairs_small() {
    let mut values = [3.0, 1.0, 2.0];
    let mut errors = [0.3, 0.1, 0.2];
    sort_pairs_by_value(&mut values, &mut errors);
    assert_eq!(values, [1.0, 2.0, 3.0]);
    assert_eq!(errors, [0.1, 0.2, 0.3]);
}

#[test]
fn test_sort_pairs_large_keeps_pairing() {
    let n = 200;
    let mut values: Vec<f64> = (0..n).map(|i| ((i * 37) % n) as f64).collect();
    let mut errors: Vec<f64> = values.iter().map(|v| v * 0.5).collect();
    sort_pairs_by_value(&mut values, &mut errors);
    for i in 0..n {
        assert_eq!(values[i], i as f64);
        assert_eq!(errors[i], values[i] * 0.5, "pair broken at {i}");
    }
}
