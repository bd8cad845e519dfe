//! The six stack reducers and their sample-level kernels.

use crate::clip;
use crate::error::Result;
use crate::image::Image;
use crate::math::{self, MEDIAN_ERROR_FACTOR};
use crate::mode::{ModeParameters, compute_mode};

use super::config::{Collapse, MinmaxParameters, SigclipParameters};
use super::extra::{RejectionImages, RejectionVectors};
use super::stack::{self, SampleReduction};
use super::{PlaneReduction, StackReducer, StackReduction};

fn mean_kernel(values: &mut Vec<f64>, errors: &mut Vec<f64>) -> Result<SampleReduction> {
    Ok(SampleReduction {
        value: math::mean(values),
        error: math::mean_error(errors),
        contribution: values.len(),
        thresholds: None,
    })
}

fn weighted_mean_kernel(values: &mut Vec<f64>, errors: &mut Vec<f64>) -> Result<SampleReduction> {
    let (value, error) = math::weighted_mean(values, errors);
    Ok(SampleReduction {
        value,
        error,
        contribution: values.len(),
        thresholds: None,
    })
}

/// Median with the mean error scaled by `sqrt(π/2)` for more than two samples.
fn median_kernel(values: &mut Vec<f64>, errors: &mut Vec<f64>) -> Result<SampleReduction> {
    let n = values.len();
    let mut error = math::mean_error(errors);
    if n > 2 {
        error *= MEDIAN_ERROR_FACTOR;
    }
    Ok(SampleReduction {
        value: math::median_mut(values),
        error,
        contribution: n,
        thresholds: None,
    })
}

/// Arithmetic mean; error `sqrt(Σ e²) / n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReducer;

impl StackReducer for MeanReducer {
    fn collapse(&self) -> Collapse {
        Collapse::Mean
    }

    fn reduce(&self, data: &[Image], errors: &[Image]) -> Result<StackReduction> {
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::accumulate_planes(
            &views,
            |sum, sq_err, v, e| {
                *sum += v;
                *sq_err += e * e;
            },
            |sum, sq_err, n| (sum / n as f64, sq_err.sqrt() / n as f64),
        ))
    }

    fn reduce_planes(&self, data: &[Image], errors: &[Image]) -> Result<PlaneReduction> {
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_each_plane(&views, self, mean_kernel))
    }
}

/// Inverse-variance weighted mean; error `1 / sqrt(Σ e⁻²)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedMeanReducer;

impl StackReducer for WeightedMeanReducer {
    fn collapse(&self) -> Collapse {
        Collapse::WeightedMean
    }

    fn reduce(&self, data: &[Image], errors: &[Image]) -> Result<StackReduction> {
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::accumulate_planes(
            &views,
            |weighted_sum, weight_sum, v, e| {
                let w = 1.0 / (e * e);
                *weighted_sum += v * w;
                *weight_sum += w;
            },
            |weighted_sum, weight_sum, _| (weighted_sum / weight_sum, 1.0 / weight_sum.sqrt()),
        ))
    }

    fn reduce_planes(&self, data: &[Image], errors: &[Image]) -> Result<PlaneReduction> {
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_each_plane(&views, self, weighted_mean_kernel))
    }
}

/// Median; error is the mean error times `sqrt(π/2)` above two samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianReducer;

impl StackReducer for MedianReducer {
    fn collapse(&self) -> Collapse {
        Collapse::Median
    }

    fn reduce(&self, data: &[Image], errors: &[Image]) -> Result<StackReduction> {
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_pixels(&views, self, median_kernel))
    }

    fn reduce_planes(&self, data: &[Image], errors: &[Image]) -> Result<PlaneReduction> {
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_each_plane(&views, self, median_kernel))
    }
}

/// Kappa-sigma clipped mean with per-pixel rejection thresholds.
#[derive(Debug, Clone, Copy)]
pub struct SigclipReducer {
    params: SigclipParameters,
}

impl SigclipReducer {
    pub fn new(params: SigclipParameters) -> Self {
        Self { params }
    }

    fn kernel(&self, values: &mut Vec<f64>, errors: &mut Vec<f64>) -> Result<SampleReduction> {
        let p = &self.params;
        let r = clip::kappa_sigma_clip(values, errors, p.kappa_low, p.kappa_high, p.niter)?;
        Ok(SampleReduction {
            value: r.mean,
            error: r.error,
            contribution: r.accepted,
            thresholds: Some((r.reject_low, r.reject_high)),
        })
    }
}

impl StackReducer for SigclipReducer {
    fn collapse(&self) -> Collapse {
        Collapse::Sigclip(self.params)
    }

    fn reduce(&self, data: &[Image], errors: &[Image]) -> Result<StackReduction> {
        self.params.validate()?;
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_pixels(&views, self, |v, e| self.kernel(v, e)))
    }

    fn reduce_planes(&self, data: &[Image], errors: &[Image]) -> Result<PlaneReduction> {
        self.params.validate()?;
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_each_plane(&views, self, |v, e| self.kernel(v, e)))
    }

    fn create_extra(&self, width: usize, height: usize) -> Option<RejectionImages> {
        Some(RejectionImages::new(width, height))
    }

    fn create_plane_extra(&self, len: usize) -> Option<RejectionVectors> {
        Some(RejectionVectors::new(len))
    }
}

/// Min-max trimmed mean with per-pixel rejection thresholds.
#[derive(Debug, Clone, Copy)]
pub struct MinmaxReducer {
    params: MinmaxParameters,
}

impl MinmaxReducer {
    pub fn new(params: MinmaxParameters) -> Self {
        Self { params }
    }

    fn kernel(&self, values: &mut Vec<f64>, errors: &mut Vec<f64>) -> Result<SampleReduction> {
        let r = clip::minmax_clip(values, errors, self.params.nlow, self.params.nhigh)?;
        Ok(SampleReduction {
            value: r.mean,
            error: r.error,
            contribution: r.accepted,
            thresholds: Some((r.reject_low, r.reject_high)),
        })
    }
}

impl StackReducer for MinmaxReducer {
    fn collapse(&self) -> Collapse {
        Collapse::Minmax(self.params)
    }

    fn reduce(&self, data: &[Image], errors: &[Image]) -> Result<StackReduction> {
        self.params.validate()?;
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_pixels(&views, self, |v, e| self.kernel(v, e)))
    }

    fn reduce_planes(&self, data: &[Image], errors: &[Image]) -> Result<PlaneReduction> {
        self.params.validate()?;
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_each_plane(&views, self, |v, e| self.kernel(v, e)))
    }

    fn create_extra(&self, width: usize, height: usize) -> Option<RejectionImages> {
        Some(RejectionImages::new(width, height))
    }

    fn create_plane_extra(&self, len: usize) -> Option<RejectionVectors> {
        Some(RejectionVectors::new(len))
    }
}

/// Histogram mode; the input errors are not used.
#[derive(Debug, Clone, Copy)]
pub struct ModeReducer {
    params: ModeParameters,
}

impl ModeReducer {
    pub fn new(params: ModeParameters) -> Self {
        Self { params }
    }

    fn kernel(&self, values: &mut Vec<f64>, _errors: &mut Vec<f64>) -> Result<SampleReduction> {
        let r = compute_mode(values, &self.params)?;
        Ok(SampleReduction {
            value: r.mode,
            error: r.error,
            contribution: r.used,
            thresholds: None,
        })
    }
}

impl StackReducer for ModeReducer {
    fn collapse(&self) -> Collapse {
        Collapse::Mode(self.params)
    }

    fn reduce(&self, data: &[Image], errors: &[Image]) -> Result<StackReduction> {
        self.params.validate()?;
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_pixels(&views, self, |v, e| self.kernel(v, e)))
    }

    fn reduce_planes(&self, data: &[Image], errors: &[Image]) -> Result<PlaneReduction> {
        self.params.validate()?;
        let views = stack::prepare(&self.collapse(), data, errors)?;
        Ok(stack::reduce_each_plane(&views, self, |v, e| self.kernel(v, e)))
    }
}
