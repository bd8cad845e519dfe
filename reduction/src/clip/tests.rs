use super::*;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn assert_close(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{what}: expected {expected}, got {actual}"
    );
}

// ---------------------------------------------------------------------------
// Kappa-sigma clipping
// ---------------------------------------------------------------------------

#[test]
fn test_sigclip_removes_outlier() {
    let values = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 100.0];
    let errors = [0.5; 8];
    let r = kappa_sigma_clip_copy(&values, &errors, 2.0, 2.0, 3).unwrap();

    assert_eq!(r.accepted, 7);
    assert_close(r.mean, 2.5, 1e-12, "mean");
    assert_close(r.error, 0.5 / 7.0f64.sqrt(), 1e-12, "error");
    // Second pass: median 2.5, MAD 1.0
    assert_close(r.reject_low, 2.5 - 2.0 * MAD_TO_SIGMA, 1e-12, "reject_low");
    assert_close(r.reject_high, 2.5 + 2.0 * MAD_TO_SIGMA, 1e-12, "reject_high");
}

#[test]
fn test_sigclip_single_value() {
    let r = kappa_sigma_clip_copy(&[5.0], &[0.3], 3.0, 3.0, 5).unwrap();
    assert_eq!(r.accepted, 1);
    assert_eq!(r.mean, 5.0);
    assert_close(r.error, 0.3, 1e-15, "error");
    assert_eq!(r.reject_low, 5.0);
    assert_eq!(r.reject_high, 5.0);
}

#[test]
fn test_sigclip_constant_values_keep_everything() {
    let r = kappa_sigma_clip_copy(&[7.0; 5], &[1.0; 5], 3.0, 3.0, 5).unwrap();
    assert_eq!(r.accepted, 5);
    assert_eq!(r.mean, 7.0);
    assert_close(r.error, 1.0 / 5.0f64.sqrt(), 1e-12, "error");
}

#[test]
fn test_sigclip_asymmetric_kappa() {
    // Low outlier survives a generous low threshold
    let values = [-8.0, 9.0, 10.0, 10.0, 11.0, 10.0, 9.5, 10.5];
    let r = kappa_sigma_clip_copy(&values, &[1.0; 8], 100.0, 3.0, 5).unwrap();
    assert_eq!(r.accepted, 8);

    let r = kappa_sigma_clip_copy(&values, &[1.0; 8], 3.0, 3.0, 5).unwrap();
    assert_eq!(r.accepted, 7);
}

#[test]
fn test_sigclip_owned_buffers_are_sorted_and_truncated() {
    let mut values = vec![100.0, 3.0, 1.0, 2.0, 2.5, 1.5];
    let mut errors = vec![9.0, 0.3, 0.1, 0.2, 0.25, 0.15];
    let r = kappa_sigma_clip(&mut values, &mut errors, 3.0, 3.0, 5).unwrap();

    assert_eq!(r.accepted, values.len());
    assert_eq!(values, vec![1.0, 1.5, 2.0, 2.5, 3.0]);
    for (v, e) in values.iter().zip(&errors) {
        assert_close(*e, v / 10.0, 1e-12, "pairing");
    }
}

#[test]
fn test_sigclip_copy_leaves_input_untouched() {
    let values = vec![100.0, 3.0, 1.0, 2.0];
    let errors = vec![1.0, 1.0, 1.0, 1.0];
    let before = values.clone();
    kappa_sigma_clip_copy(&values, &errors, 1.0, 1.0, 3).unwrap();
    assert_eq!(values, before);
}

#[test]
fn test_sigclip_accepted_never_grows_with_iterations() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..20 {
        let n = rng.random_range(3..60);
        let values: Vec<f64> = (0..n)
            .map(|_| {
                if rng.random_bool(0.1) {
                    rng.random_range(50.0..500.0)
                } else {
                    rng.random_range(-1.0..1.0)
                }
            })
            .collect();
        let errors = vec![1.0; n];

        let mut previous = n;
        for niter in 1..8 {
            let r = kappa_sigma_clip_copy(&values, &errors, 2.5, 2.5, niter).unwrap();
            assert!(
                r.accepted <= previous,
                "niter {niter}: accepted {} > {previous}",
                r.accepted
            );
            previous = r.accepted;
        }
    }
}

#[test]
fn test_sigclip_stable_after_convergence() {
    let values = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 100.0];
    let errors = [0.5; 8];
    let converged = kappa_sigma_clip_copy(&values, &errors, 2.0, 2.0, 2).unwrap();
    let more = kappa_sigma_clip_copy(&values, &errors, 2.0, 2.0, 50).unwrap();
    assert_eq!(converged, more);
}

#[test]
fn test_sigclip_argument_errors() {
    assert!(matches!(
        kappa_sigma_clip_copy(&[], &[], 3.0, 3.0, 3),
        Err(Error::NullInput(_))
    ));
    assert!(matches!(
        kappa_sigma_clip_copy(&[1.0, 2.0], &[1.0], 3.0, 3.0, 3),
        Err(Error::IncompatibleInput(_))
    ));
    assert!(matches!(
        kappa_sigma_clip_copy(&[1.0, 2.0], &[1.0, 1.0], 3.0, 3.0, 0),
        Err(Error::IllegalInput(_))
    ));
}

// ---------------------------------------------------------------------------
// Min-max trimming
// ---------------------------------------------------------------------------

#[test]
fn test_minmax_no_trim_is_plain_mean() {
    let values = [3.0, 1.0, 2.0];
    let errors = [0.1, 0.2, 0.3];
    let r = minmax_clip_copy(&values, &errors, 0.0, 0.0).unwrap();

    assert_eq!(r.accepted, 3);
    assert_close(r.mean, 2.0, 1e-15, "mean");
    let mean_sq = (0.01 + 0.04 + 0.09) / 3.0;
    assert_close(r.error, (mean_sq / 3.0f64).sqrt(), 1e-15, "error");
    assert_eq!(r.reject_low, 1.0);
    assert_eq!(r.reject_high, 3.0);
}

#[test]
fn test_minmax_trims_extremes() {
    let r = minmax_clip_copy(&[5.0, 1.0, 4.0, 2.0, 3.0], &[1.0; 5], 1.0, 1.0).unwrap();
    assert_eq!(r.accepted, 3);
    assert_close(r.mean, 3.0, 1e-15, "mean");
    assert_close(r.error, 3.0f64.sqrt() / 3.0, 1e-15, "error");
    assert_eq!(r.reject_low, 2.0);
    assert_eq!(r.reject_high, 4.0);
}

#[test]
fn test_minmax_rounds_counts() {
    let values = [5.0, 1.0, 4.0, 2.0, 3.0];
    let r = minmax_clip_copy(&values, &[1.0; 5], 0.6, 0.4).unwrap();
    assert_eq!(r.accepted, 4);
    assert_close(r.mean, 3.5, 1e-15, "mean");
}

#[test]
fn test_minmax_trim_everything() {
    let r = minmax_clip_copy(&[1.0, 2.0, 3.0], &[1.0; 3], 2.0, 1.0).unwrap();
    assert_eq!(r.accepted, 0);
    assert!(r.mean.is_nan());
    assert!(r.error.is_nan());
    assert!(r.reject_low.is_nan() && r.reject_high.is_nan());
}

#[test]
fn test_minmax_ties_at_high_boundary_keep_smallest_errors() {
    // Retained slots hold 1, 2, 2; the tied 2's carry errors {5, 1, 3}
    let values = [1.0, 2.0, 2.0, 2.0, 3.0];
    let errors = [1.0, 5.0, 1.0, 3.0, 1.0];
    let r = minmax_clip_copy(&values, &errors, 0.0, 2.0).unwrap();

    assert_eq!(r.accepted, 3);
    assert_close(r.mean, 5.0 / 3.0, 1e-15, "mean");
    assert_close(r.error, 11.0f64.sqrt() / 3.0, 1e-15, "error");
}

#[test]
fn test_minmax_ties_at_low_boundary_keep_smallest_errors() {
    let mut values = vec![2.0, 2.0, 2.0, 5.0];
    let mut errors = vec![4.0, 1.0, 2.0, 1.0];
    let r = minmax_clip(&mut values, &mut errors, 2.0, 0.0).unwrap();

    assert_eq!(r.accepted, 2);
    assert_eq!(values, vec![2.0, 5.0]);
    assert_eq!(errors, vec![1.0, 1.0]);
    assert_close(r.error, 2.0f64.sqrt() / 2.0, 1e-15, "error");
}

#[test]
fn test_minmax_ties_spanning_both_boundaries() {
    let values = [3.0; 5];
    let errors = [5.0, 4.0, 3.0, 2.0, 1.0];
    let r = minmax_clip_copy(&values, &errors, 1.0, 1.0).unwrap();
    assert_eq!(r.accepted, 3);
    assert_close(r.error, 14.0f64.sqrt() / 3.0, 1e-15, "error");
}

#[test]
fn test_minmax_argument_errors() {
    assert!(matches!(
        minmax_clip_copy(&[], &[], 0.0, 0.0),
        Err(Error::NullInput(_))
    ));
    assert!(matches!(
        minmax_clip_copy(&[1.0], &[1.0, 2.0], 0.0, 0.0),
        Err(Error::IncompatibleInput(_))
    ));
    assert!(matches!(
        minmax_clip_copy(&[1.0, 2.0], &[1.0, 1.0], -1.0, 0.0),
        Err(Error::IllegalInput(_))
    ));
    assert!(matches!(
        minmax_clip_copy(&[1.0, 2.0], &[1.0, 1.0], 0.0, f64::NAN),
        Err(Error::IllegalInput(_))
    ));
}
