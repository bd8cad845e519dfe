//! Bootstrap error of the mode estimate.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::math;

use super::{ModeParameters, estimate};

/// Standard deviation of the mode over `iterations` resamples (with replacement)
/// of `values`.
///
/// Resample `i` draws from `ChaCha8Rng::seed_from_u64(base + i)`, so the result
/// depends only on the base seed, never on thread scheduling. Resamples whose
/// estimate fails are left out.
pub(super) fn bootstrap_error(
    values: &[f64],
    params: &ModeParameters,
    iterations: u32,
    seed: Option<u64>,
) -> Result<f64> {
    let base_seed = seed.unwrap_or_else(rand::random);
    let n = values.len();

    let modes: Vec<f64> = (0..iterations)
        .into_par_iter()
        .filter_map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let sample: Vec<f64> = (0..n).map(|_| values[rng.random_range(0..n)]).collect();
            estimate(&sample, params, false)
                .ok()
                .map(|peak| peak.mode)
                .filter(|m| m.is_finite())
        })
        .collect();

    tracing::debug!(
        iterations,
        successes = modes.len(),
        "Bootstrap mode resampling finished"
    );
    if (modes.len() as u64) * 2 < iterations as u64 {
        tracing::warn!(
            "Only {} of {} bootstrap resamples produced a mode",
            modes.len(),
            iterations
        );
    }

    math::stdev(&modes).ok_or_else(|| {
        Error::illegal_output(format!(
            "bootstrap produced {} usable modes out of {iterations}",
            modes.len()
        ))
    })
}
