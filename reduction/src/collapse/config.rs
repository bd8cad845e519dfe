//! Collapse algorithm selection and per-algorithm parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mode::ModeParameters;

use super::StackReducer;
use super::reducers::{
    MeanReducer, MedianReducer, MinmaxReducer, ModeReducer, SigclipReducer, WeightedMeanReducer,
};

/// Kappa-sigma clipping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigclipParameters {
    /// Lower threshold in units of the robust sigma.
    pub kappa_low: f64,
    /// Upper threshold in units of the robust sigma.
    pub kappa_high: f64,
    /// Maximum number of clipping iterations.
    pub niter: u32,
}

impl Default for SigclipParameters {
    fn default() -> Self {
        Self {
            kappa_low: 3.0,
            kappa_high: 3.0,
            niter: 5,
        }
    }
}

impl SigclipParameters {
    pub fn new(kappa_low: f64, kappa_high: f64, niter: u32) -> Self {
        Self {
            kappa_low,
            kappa_high,
            niter,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.kappa_low.is_nan()
            || self.kappa_high.is_nan()
            || self.kappa_low < 0.0
            || self.kappa_high < 0.0
        {
            return Err(Error::illegal(format!(
                "kappa_low ({}) and kappa_high ({}) must be non-negative",
                self.kappa_low, self.kappa_high
            )));
        }
        if self.niter == 0 {
            return Err(Error::illegal("niter must be positive"));
        }
        Ok(())
    }
}

/// Min-max trimming parameters: counts rejected from each end (rounded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinmaxParameters {
    pub nlow: f64,
    pub nhigh: f64,
}

impl Default for MinmaxParameters {
    fn default() -> Self {
        Self {
            nlow: 1.0,
            nhigh: 1.0,
        }
    }
}

impl MinmaxParameters {
    pub fn new(nlow: f64, nhigh: f64) -> Self {
        Self { nlow, nhigh }
    }

    pub fn validate(&self) -> Result<()> {
        if self.nlow.is_nan() || self.nhigh.is_nan() || self.nlow < 0.0 || self.nhigh < 0.0 {
            return Err(Error::illegal(format!(
                "nlow ({}) and nhigh ({}) must be non-negative",
                self.nlow, self.nhigh
            )));
        }
        Ok(())
    }
}

/// Reduction algorithm applied along the stack axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Collapse {
    /// Arithmetic mean of the good samples.
    #[default]
    Mean,
    /// Inverse-variance weighted mean.
    WeightedMean,
    /// Median with the `sqrt(π/2)` error correction.
    Median,
    /// Mean after iterative kappa-sigma clipping.
    Sigclip(SigclipParameters),
    /// Mean after trimming the extreme samples.
    Minmax(MinmaxParameters),
    /// Histogram mode.
    Mode(ModeParameters),
}

impl Collapse {
    pub fn sigclip(kappa_low: f64, kappa_high: f64, niter: u32) -> Self {
        Self::Sigclip(SigclipParameters::new(kappa_low, kappa_high, niter))
    }

    pub fn minmax(nlow: f64, nhigh: f64) -> Self {
        Self::Minmax(MinmaxParameters::new(nlow, nhigh))
    }

    pub fn mode(params: ModeParameters) -> Self {
        Self::Mode(params)
    }

    /// Default-parameter variant for `"MEAN"`, `"WEIGHTED_MEAN"`, `"MEDIAN"`,
    /// `"SIGCLIP"`, `"MINMAX"` or `"MODE"`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "MEAN" => Ok(Self::Mean),
            "WEIGHTED_MEAN" => Ok(Self::WeightedMean),
            "MEDIAN" => Ok(Self::Median),
            "SIGCLIP" => Ok(Self::Sigclip(SigclipParameters::default())),
            "MINMAX" => Ok(Self::Minmax(MinmaxParameters::default())),
            "MODE" => Ok(Self::Mode(ModeParameters::default())),
            _ => Err(Error::unsupported(format!(
                "unknown collapse method '{name}'"
            ))),
        }
    }

    /// Whether the algorithm reports low/high rejection thresholds.
    pub fn has_rejection_thresholds(&self) -> bool {
        matches!(self, Self::Sigclip(_) | Self::Minmax(_))
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Mean | Self::WeightedMean | Self::Median => Ok(()),
            Self::Sigclip(p) => p.validate(),
            Self::Minmax(p) => p.validate(),
            Self::Mode(p) => p.validate(),
        }
    }

    /// Validated reducer implementing this algorithm.
    pub fn reducer(&self) -> Result<Box<dyn StackReducer>> {
        self.validate()?;
        Ok(match *self {
            Self::Mean => Box::new(MeanReducer),
            Self::WeightedMean => Box::new(WeightedMeanReducer),
            Self::Median => Box::new(MedianReducer),
            Self::Sigclip(p) => Box::new(SigclipReducer::new(p)),
            Self::Minmax(p) => Box::new(MinmaxReducer::new(p)),
            Self::Mode(p) => Box::new(ModeReducer::new(p)),
        })
    }
}

impl fmt::Display for Collapse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::WeightedMean => write!(f, "weighted_mean"),
            Self::Median => write!(f, "median"),
            Self::Sigclip(p) => write!(
                f,
                "sigclip({:?},{:?},{})",
                p.kappa_low, p.kappa_high, p.niter
            ),
            Self::Minmax(p) => write!(f, "minmax({:?},{:?})", p.nlow, p.nhigh),
            Self::Mode(p) => write!(f, "mode({})", p.method),
        }
    }
}
