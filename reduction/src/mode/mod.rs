//! Histogram-based mode estimation.
//!
//! One call runs bin sizing, domain trimming, histogram construction, peak
//! extraction with the selected [`ModeMethod`], and finally error estimation
//! (analytic, bootstrap, or none).

mod bootstrap;
mod histogram;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math;

use histogram::{Histogram, resolve_domain};

/// Bins on each side of the peak used by [`ModeMethod::Fit`].
pub const FIT_HALF_WINDOW: usize = 3;

/// How the mode is read off the histogram peak.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ModeMethod {
    /// Median of the samples falling into the most populated bin.
    #[default]
    Median,
    /// Peak bin edge shifted by the neighbour-count imbalance.
    Weighted,
    /// Vertex of a parabola fitted to the counts around the peak.
    Fit,
}

impl ModeMethod {
    /// Parse `"MEDIAN"`, `"WEIGHTED"` or `"FIT"`.
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| Error::unsupported(format!("unknown mode method '{name}'")))
    }
}

/// Error reported alongside the mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeErrorEstimate {
    /// Closed form of the selected method.
    #[default]
    Analytic,
    /// Standard deviation of the mode over resampled inputs.
    Bootstrap {
        iterations: u32,
        /// Base seed; iteration `i` uses `seed + i`. `None` draws one from the OS.
        seed: Option<u64>,
    },
    /// Report exactly zero.
    Skip,
}

impl ModeErrorEstimate {
    /// `0` → analytic, positive → that many bootstrap iterations, negative → skip.
    pub fn from_niter(niter: i32) -> Self {
        match niter {
            0 => Self::Analytic,
            n if n > 0 => Self::Bootstrap {
                iterations: n as u32,
                seed: None,
            },
            _ => Self::Skip,
        }
    }
}

/// Mode estimator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeParameters {
    /// Histogram lower edge; used only when `histo_min < histo_max`.
    pub histo_min: f64,
    /// Histogram upper edge; used only when `histo_min < histo_max`.
    pub histo_max: f64,
    /// Bin width; `<= f64::EPSILON` derives it from the data.
    pub bin_size: f64,
    pub method: ModeMethod,
    pub error: ModeErrorEstimate,
}

impl Default for ModeParameters {
    fn default() -> Self {
        Self {
            histo_min: 10.0,
            histo_max: 1.0,
            bin_size: 0.0,
            method: ModeMethod::Median,
            error: ModeErrorEstimate::Analytic,
        }
    }
}

impl ModeParameters {
    pub fn new(method: ModeMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Use a fixed histogram range `[min, max)`.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.histo_min = min;
        self.histo_max = max;
        self
    }

    pub fn with_bin_size(mut self, bin_size: f64) -> Self {
        self.bin_size = bin_size;
        self
    }

    pub fn with_error(mut self, error: ModeErrorEstimate) -> Self {
        self.error = error;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.histo_min.is_nan() || self.histo_max.is_nan() {
            return Err(Error::illegal("histogram range must not be NaN"));
        }
        if !self.bin_size.is_finite() {
            return Err(Error::illegal(format!(
                "bin size must be finite, got {}",
                self.bin_size
            )));
        }
        if let ModeErrorEstimate::Bootstrap { iterations: 0, .. } = self.error {
            return Err(Error::illegal("bootstrap needs at least one iteration"));
        }
        Ok(())
    }
}

/// Mode estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeResult {
    pub mode: f64,
    pub error: f64,
    /// Samples inside the histogram domain.
    pub used: usize,
}

/// Estimate the mode of `values`.
///
/// # Errors
///
/// * `IllegalInput` for an empty input, too few bins or a failed parabola fit.
/// * `NullInput` when no sample lies inside a caller-supplied range.
/// * `IllegalOutput` when the mode or its error is not finite.
pub fn compute_mode(values: &[f64], params: &ModeParameters) -> Result<ModeResult> {
    params.validate()?;
    if values.is_empty() {
        return Err(Error::illegal("no good samples for mode estimation"));
    }

    let analytic = matches!(params.error, ModeErrorEstimate::Analytic);
    let peak = estimate(values, params, analytic)?;

    let error = match params.error {
        ModeErrorEstimate::Analytic => peak.error,
        ModeErrorEstimate::Skip => 0.0,
        ModeErrorEstimate::Bootstrap { iterations, seed } => {
            bootstrap::bootstrap_error(values, params, iterations, seed)?
        }
    };

    if !peak.mode.is_finite() {
        return Err(Error::illegal_output(format!("mode is {}", peak.mode)));
    }
    if !error.is_finite() {
        return Err(Error::illegal_output(format!("mode error is {error}")));
    }
    Ok(ModeResult {
        mode: peak.mode,
        error,
        used: peak.used,
    })
}

struct PeakEstimate {
    mode: f64,
    error: f64,
    used: usize,
}

/// Mode and (when `with_error`) analytic error, without finiteness checks.
fn estimate(values: &[f64], params: &ModeParameters, with_error: bool) -> Result<PeakEstimate> {
    let domain = resolve_domain(values, params)?;

    let trimmed: Vec<f64> = if params.histo_min < params.histo_max {
        values
            .iter()
            .copied()
            .filter(|&v| v >= domain.min && v <= domain.max)
            .collect()
    } else {
        values.to_vec()
    };
    if trimmed.is_empty() {
        return Err(Error::null(format!(
            "no sample inside histogram range [{}, {}]",
            domain.min, domain.max
        )));
    }

    let hist = Histogram::build(&trimmed, domain);
    let peak = hist.peak();
    let (mode, error) = match params.method {
        ModeMethod::Median => median_of_peak(&trimmed, &hist, peak, with_error),
        ModeMethod::Weighted => weighted_peak(&hist, peak, with_error),
        ModeMethod::Fit => fit_peak(&hist, peak, with_error)?,
    };
    Ok(PeakEstimate {
        mode,
        error,
        used: trimmed.len(),
    })
}

fn median_of_peak(samples: &[f64], hist: &Histogram, peak: usize, with_error: bool) -> (f64, f64) {
    let mut in_peak: Vec<f64> = samples
        .iter()
        .copied()
        .filter(|&v| hist.bin_of(v) == peak)
        .collect();
    let error = if with_error {
        math::stdev(&in_peak).unwrap_or(0.0)
    } else {
        0.0
    };
    (math::median_mut(&mut in_peak), error)
}

fn weighted_peak(hist: &Histogram, peak: usize, with_error: bool) -> (f64, f64) {
    let m = peak as isize;
    let f0 = hist.count(m - 1) as f64;
    let f1 = hist.count(m) as f64;
    let f2 = hist.count(m + 1) as f64;
    let diff1 = f1 - f0;
    let diff2 = f1 - f2;
    let denom = diff1 + diff2;
    let bin = hist.bin_size();

    let flat = denom == 0.0 || denom.is_nan();
    let factor = if flat { 0.5 } else { diff1 / denom };
    let mode = hist.edge(peak) + bin * factor;

    let error = if !with_error {
        0.0
    } else if flat {
        // The peak position is only known to lie within its bin.
        0.5 * bin
    } else {
        // factor = d1 / (d1 + d2), σ(d1) = sqrt(f0 + f1), σ(d2) = sqrt(f1 + f2)
        let t1 = diff2 * (f0 + f1).sqrt();
        let t2 = diff1 * (f1 + f2).sqrt();
        bin * (t1 * t1 + t2 * t2).sqrt() / (denom * denom)
    };
    (mode, error)
}

fn fit_peak(hist: &Histogram, peak: usize, with_error: bool) -> Result<(f64, f64)> {
    let nbin = hist.nbin();
    if nbin < 3 {
        return Err(Error::illegal(format!(
            "parabola fit needs at least 3 histogram bins, got {nbin}"
        )));
    }

    let lo = peak.saturating_sub(FIT_HALF_WINDOW);
    let hi = (peak + FIT_HALF_WINDOW).min(nbin - 1);
    // Abscissae in bin units relative to the peak's lower edge
    let x: Vec<f64> = (lo..=hi).map(|i| i as f64 - peak as f64).collect();
    let y: Vec<f64> = (lo..=hi).map(|i| hist.count(i as isize) as f64).collect();

    let fit = math::fit_quadratic(&x, &y)
        .ok_or_else(|| Error::illegal("degenerate parabola fit around histogram peak"))?;
    let [_, c1, c2] = fit.coefficients;
    let vertex = match fit.vertex() {
        Some(v) if c2 < 0.0 => v,
        _ => return Err(Error::illegal("histogram peak is not a maximum of the fit")),
    };
    let top = fit.eval(vertex);
    let (x_lo, x_hi) = (x[0], x[x.len() - 1]);
    if top <= fit.eval(x_lo) || top <= fit.eval(x_hi) || vertex <= x_lo || vertex >= x_hi {
        return Err(Error::illegal(format!(
            "fitted peak at {vertex:.3} bins lies at the edge of the window [{x_lo}, {x_hi}]"
        )));
    }
    // The vertex must fall inside the peak bin, whose centre is x = 0.
    if vertex.abs() > 0.5 {
        return Err(Error::illegal(format!(
            "fitted peak is {vertex:.3} bins away from the histogram peak bin"
        )));
    }

    let bin = hist.bin_size();
    let mode = hist.edge(peak) + (vertex + 0.5) * bin;

    let error = if with_error {
        let d1 = -1.0 / (2.0 * c2);
        let d2 = c1 / (2.0 * c2 * c2);
        let cov = &fit.covariance;
        let var = d1 * d1 * cov[1][1] + d2 * d2 * cov[2][2] + 2.0 * d1 * d2 * cov[1][2];
        let scale = if fit.dof > 0 {
            fit.chi2 / fit.dof as f64
        } else {
            1.0
        };
        (var * scale).max(0.0).sqrt() * bin
    } else {
        0.0
    };
    Ok((mode, error))
}
