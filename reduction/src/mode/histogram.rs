//! Histogram domain resolution and bin counting.

use crate::error::{Error, Result};
use crate::math::{self, MAD_TO_SIGMA};

use super::ModeParameters;

/// Upper bound on the number of bins a single histogram may allocate.
pub(crate) const MAX_BINS: usize = 1 << 24;

/// Resolved histogram geometry: `nbin` bins of width `bin_size` over `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Domain {
    pub min: f64,
    pub max: f64,
    pub bin_size: f64,
    pub nbin: usize,
}

/// Robust Scott's rule: `2 · 3.49 · σ_MAD / n^(1/3)`.
///
/// Degenerate spreads give the smallest positive double.
pub(crate) fn auto_bin_size(values: &[f64]) -> f64 {
    debug_assert!(!values.is_empty());
    let mut scratch = values.to_vec();
    let median = math::median_mut(&mut scratch);
    let mad = math::mad_with_scratch(values, median, &mut scratch);
    let size = 2.0 * 3.49 * mad * MAD_TO_SIGMA / (values.len() as f64).cbrt();
    if size > 0.0 { size } else { f64::MIN_POSITIVE }
}

fn bin_count(min: f64, max: f64, bin_size: f64) -> Result<usize> {
    let bins = ((max - min) / bin_size).floor() + 1.0;
    if !bins.is_finite() || bins > MAX_BINS as f64 {
        return Err(Error::illegal(format!(
            "histogram over [{min}, {max}) with bin size {bin_size} needs too many bins"
        )));
    }
    Ok(bins as usize)
}

/// Histogram domain for `values` under `params`.
///
/// A caller range (`histo_min < histo_max`) is kept at its lower edge and
/// snapped at its upper edge to a whole number of bins. Otherwise the range
/// spans the data padded by half a bin on each side.
pub(crate) fn resolve_domain(values: &[f64], params: &ModeParameters) -> Result<Domain> {
    debug_assert!(!values.is_empty());
    let bin_size = if params.bin_size <= f64::EPSILON {
        auto_bin_size(values)
    } else {
        params.bin_size
    };

    let (min, max) = if params.histo_min < params.histo_max {
        (params.histo_min, params.histo_max)
    } else {
        let (lo, hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        (lo - bin_size / 2.0, hi + bin_size / 2.0)
    };

    if min == max {
        let min = min.next_down();
        let max = max.next_up();
        return Ok(Domain {
            min,
            max,
            bin_size: max - min,
            nbin: 1,
        });
    }

    let nbin = bin_count(min, max, bin_size)?;
    Ok(Domain {
        min,
        max: min + nbin as f64 * bin_size,
        bin_size,
        nbin,
    })
}

/// Uniform-width bin counts.
#[derive(Debug, Clone)]
pub(crate) struct Histogram {
    domain: Domain,
    counts: Vec<u64>,
}

impl Histogram {
    /// Count `samples`, all of which must lie inside `domain`.
    pub(crate) fn build(samples: &[f64], domain: Domain) -> Self {
        let mut hist = Self {
            domain,
            counts: vec![0; domain.nbin],
        };
        for &v in samples {
            let bin = hist.bin_of(v);
            hist.counts[bin] += 1;
        }
        hist
    }

    #[inline]
    pub(crate) fn nbin(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub(crate) fn bin_size(&self) -> f64 {
        self.domain.bin_size
    }

    /// Count of bin `i`, zero outside the histogram.
    #[inline]
    pub(crate) fn count(&self, i: isize) -> u64 {
        if i < 0 {
            return 0;
        }
        self.counts.get(i as usize).copied().unwrap_or(0)
    }

    /// Lower edge of bin `i`.
    #[inline]
    pub(crate) fn edge(&self, i: usize) -> f64 {
        self.domain.min + i as f64 * self.domain.bin_size
    }

    /// Bin index of `v`; the upper domain edge falls into the last bin.
    #[inline]
    pub(crate) fn bin_of(&self, v: f64) -> usize {
        let idx = ((v - self.domain.min) / self.domain.bin_size).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.counts.len() - 1)
        }
    }

    /// Index of the most populated bin (lowest index on ties).
    pub(crate) fn peak(&self) -> usize {
        let mut best = 0;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > self.counts[best] {
                best = i;
            }
        }
        best
    }

    #[cfg(test)]
    pub(crate) fn counts(&self) -> &[u64] {
        &self.counts
    }
}
