//! Kappa-sigma clipping and min-max trimming over `(value, error)` samples.
//!
//! Each algorithm has two entry points. The plain one works on caller-owned
//! scratch vectors: they come back sorted by value and truncated to the
//! accepted samples. The `_copy` variant leaves borrowed inputs untouched.

use crate::error::{Error, Result};
use crate::math::{self, MAD_TO_SIGMA};

/// Outcome of a clipping pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipResult {
    /// Mean of the accepted values.
    pub mean: f64,
    /// `sqrt(Σ e²) / accepted` over the accepted samples.
    pub error: f64,
    pub accepted: usize,
    /// Lowest value still accepted (min-max) or final lower threshold (kappa-sigma).
    pub reject_low: f64,
    /// Highest value still accepted (min-max) or final upper threshold (kappa-sigma).
    pub reject_high: f64,
}

impl ClipResult {
    fn nothing_accepted() -> Self {
        Self {
            mean: f64::NAN,
            error: f64::NAN,
            accepted: 0,
            reject_low: f64::NAN,
            reject_high: f64::NAN,
        }
    }
}

fn check_samples(values: &[f64], errors: &[f64]) -> Result<()> {
    if values.is_empty() || errors.is_empty() {
        return Err(Error::null("empty sample sequence"));
    }
    if values.len() != errors.len() {
        return Err(Error::incompatible(format!(
            "{} values, {} errors",
            values.len(),
            errors.len()
        )));
    }
    Ok(())
}

/// Keep only `lo..hi` in both vectors.
fn retain_range(values: &mut Vec<f64>, errors: &mut Vec<f64>, lo: usize, hi: usize) {
    values.truncate(hi);
    errors.truncate(hi);
    values.drain(..lo);
    errors.drain(..lo);
}

/// Iterative kappa-sigma clipping around the median.
///
/// Each iteration keeps the samples inside
/// `[median - kappa_low·σ, median + kappa_high·σ]` with σ = 1.4826·MAD of the
/// current window. Stops after `niter` iterations or as soon as an iteration
/// rejects nothing. An iteration that would reject every sample is discarded
/// and ends the loop.
///
/// On return `values`/`errors` hold the accepted samples, sorted by value.
pub fn kappa_sigma_clip(
    values: &mut Vec<f64>,
    errors: &mut Vec<f64>,
    kappa_low: f64,
    kappa_high: f64,
    niter: u32,
) -> Result<ClipResult> {
    check_samples(values, errors)?;
    if niter == 0 {
        return Err(Error::illegal("niter must be positive"));
    }

    math::sort_pairs_by_value(values, errors);

    let n = values.len();
    let mut lo = 0;
    let mut hi = n;
    let mut reject_low = values[0];
    let mut reject_high = values[n - 1];

    if n > 1 {
        let mut scratch = Vec::with_capacity(n);
        for _ in 0..niter {
            let window = &values[lo..hi];
            let median = math::median_sorted(window);
            let mut sigma = math::mad_with_scratch(window, median, &mut scratch) * MAD_TO_SIGMA;
            if sigma <= 0.0 {
                sigma = f64::MIN_POSITIVE;
            }

            let lower = median - kappa_low * sigma;
            let upper = median + kappa_high * sigma;
            let new_lo = lo + window.partition_point(|&v| v < lower);
            let new_hi = lo + window.partition_point(|&v| v <= upper);

            if new_lo >= new_hi {
                break;
            }
            reject_low = lower;
            reject_high = upper;
            if new_lo == lo && new_hi == hi {
                break;
            }
            lo = new_lo;
            hi = new_hi;
        }
    }

    retain_range(values, errors, lo, hi);
    let accepted = values.len();
    Ok(ClipResult {
        mean: math::mean(values),
        error: math::mean_error(errors),
        accepted,
        reject_low,
        reject_high,
    })
}

/// [`kappa_sigma_clip`] on borrowed samples.
pub fn kappa_sigma_clip_copy(
    values: &[f64],
    errors: &[f64],
    kappa_low: f64,
    kappa_high: f64,
    niter: u32,
) -> Result<ClipResult> {
    kappa_sigma_clip(
        &mut values.to_vec(),
        &mut errors.to_vec(),
        kappa_low,
        kappa_high,
        niter,
    )
}

/// Reject the `round(nlow)` lowest and `round(nhigh)` highest samples.
///
/// When several samples share a boundary value, the accepted slots receive the
/// smallest errors among the tied samples. Trimming everything yields NaN
/// mean, error and thresholds with zero accepted samples.
///
/// On return `values`/`errors` hold the accepted samples, sorted by value.
pub fn minmax_clip(
    values: &mut Vec<f64>,
    errors: &mut Vec<f64>,
    nlow: f64,
    nhigh: f64,
) -> Result<ClipResult> {
    check_samples(values, errors)?;
    if nlow.is_nan() || nhigh.is_nan() || nlow < 0.0 || nhigh < 0.0 {
        return Err(Error::illegal(format!(
            "nlow ({nlow}) and nhigh ({nhigh}) must be non-negative"
        )));
    }

    let n = values.len();
    let nl = nlow.round() as usize;
    let nh = nhigh.round() as usize;
    if nl.saturating_add(nh) >= n {
        values.clear();
        errors.clear();
        return Ok(ClipResult::nothing_accepted());
    }

    math::sort_pairs_by_value(values, errors);

    let lo = nl;
    let hi = n - nh;
    assign_tied_errors(values, errors, lo, lo, hi);
    if values[hi - 1] != values[lo] {
        assign_tied_errors(values, errors, hi - 1, lo, hi);
    }

    let reject_low = values[lo];
    let reject_high = values[hi - 1];
    retain_range(values, errors, lo, hi);
    Ok(ClipResult {
        mean: math::mean(values),
        error: math::mean_error(errors),
        accepted: hi - lo,
        reject_low,
        reject_high,
    })
}

/// [`minmax_clip`] on borrowed samples.
pub fn minmax_clip_copy(
    values: &[f64],
    errors: &[f64],
    nlow: f64,
    nhigh: f64,
) -> Result<ClipResult> {
    minmax_clip(&mut values.to_vec(), &mut errors.to_vec(), nlow, nhigh)
}

/// Among the samples tied with `values[at]`, move the smallest errors into the
/// accepted slots `lo..hi`.
fn assign_tied_errors(values: &[f64], errors: &mut [f64], at: usize, lo: usize, hi: usize) {
    let v = values[at];
    let start = values.partition_point(|&x| x < v);
    let end = values.partition_point(|&x| x <= v);
    if start >= lo && end <= hi {
        return;
    }

    errors[start..end].sort_unstable_by(f64::total_cmp);
    let kept_start = start.max(lo);
    let kept_end = end.min(hi);

    // Ascending errors: rotating right moves the smallest ones to kept_start.
    errors[start..kept_end].rotate_right(kept_start - start);
}

#[cfg(test)]
mod tests;
