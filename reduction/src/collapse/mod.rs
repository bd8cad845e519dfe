//! Stack collapse: reduce an image stack to one image (per pixel) or to one
//! scalar per plane, with any of the [`Collapse`] algorithms.
//!
//! Every entry point takes a data stack and a matching error stack. The error
//! planes are bound to the data masks through [`MaskedView`](crate::image::MaskedView)s,
//! so a sample rejected in the data plane is ignored in the error plane too.

mod config;
mod extra;
mod reducers;
mod scratch;
mod stack;


use common::buffer2::Buffer2;

use crate::error::Result;
use crate::image::Image;

pub use config::{Collapse, MinmaxParameters, SigclipParameters};
pub use extra::{RejectionImages, RejectionVectors};
pub use reducers::{
    MeanReducer, MedianReducer, MinmaxReducer, ModeReducer, SigclipReducer, WeightedMeanReducer,
};

/// Per-pixel result of collapsing a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StackReduction {
    pub value: Image,
    pub error: Image,
    /// Number of planes that contributed to each pixel.
    pub contribution: Buffer2<u32>,
    /// Rejection thresholds, for the clipping algorithms only.
    pub extra: Option<RejectionImages>,
}

/// Per-plane result of collapsing a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneReduction {
    pub values: Vec<f64>,
    pub errors: Vec<f64>,
    pub contributions: Vec<u32>,
    pub extra: Option<RejectionVectors>,
}

impl PlaneReduction {
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A plane is rejected when nothing contributed to it.
    #[inline]
    pub fn is_rejected(&self, i: usize) -> bool {
        self.contributions[i] == 0
    }
}

/// One collapse algorithm.
///
/// Pixels (or planes) without good samples, or whose reduction fails, come
/// out as NaN, rejected, with contribution 0. Only argument errors are
/// returned as `Err`.
pub trait StackReducer: Send + Sync {
    /// Algorithm and parameters this reducer implements.
    fn collapse(&self) -> Collapse;

    /// Reduce along the stack axis, independently per pixel.
    fn reduce(&self, data: &[Image], errors: &[Image]) -> Result<StackReduction>;

    /// Reduce every plane to one scalar.
    fn reduce_planes(&self, data: &[Image], errors: &[Image]) -> Result<PlaneReduction>;

    /// Empty per-pixel extra output of the given shape, if the algorithm
    /// produces one. The drivers fill it and hand it back in the result.
    fn create_extra(&self, _width: usize, _height: usize) -> Option<RejectionImages> {
        None
    }

    /// Empty per-plane extra output of length `len`, if the algorithm produces one.
    fn create_plane_extra(&self, _len: usize) -> Option<RejectionVectors> {
        None
    }
}

/// Collapse `data` (with `errors`) to one image using `method`.
pub fn collapse_stack(
    data: &[Image],
    errors: &[Image],
    method: &Collapse,
) -> Result<StackReduction> {
    tracing::info!(method = %method, planes = data.len(), "Collapsing image stack per pixel");
    method.reducer()?.reduce(data, errors)
}

/// Collapse each plane of `data` (with `errors`) to one scalar using `method`.
pub fn collapse_planes(
    data: &[Image],
    errors: &[Image],
    method: &Collapse,
) -> Result<PlaneReduction> {
    tracing::info!(method = %method, planes = data.len(), "Collapsing image stack per plane");
    method.reducer()?.reduce_planes(data, errors)
}
