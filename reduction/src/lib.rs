//! Reduction - pixel-wise statistics for CCD frame stacks.
//!
//! This library provides:
//! - Robust sample statistics (kappa-sigma clipping, min-max trimming)
//! - Histogram mode estimation with analytic or bootstrap errors
//! - Stack collapse to an image (per pixel) or to one value per plane
//! - Overscan level estimation and correction
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reduction::{Collapse, Image, collapse_stack};
//!
//! let data: Vec<Image> = load_frames();
//! let errors: Vec<Image> = load_error_frames();
//!
//! let result = collapse_stack(&data, &errors, &Collapse::sigclip(3.0, 3.0, 5))?;
//! println!("{} pixels rejected", result.value.rejected_count());
//! ```

pub mod clip;
pub mod collapse;
pub mod error;
pub mod image;
pub mod math;
pub mod mode;
pub mod overscan;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Containers and errors
// ============================================================================

pub use error::{Error, Result};
pub use image::{Image, MaskedView, Region, sync_error_views};

// ============================================================================
// Sample statistics
// ============================================================================

pub use clip::{
    ClipResult, kappa_sigma_clip, kappa_sigma_clip_copy, minmax_clip, minmax_clip_copy,
};
pub use mode::{ModeErrorEstimate, ModeMethod, ModeParameters, ModeResult, compute_mode};

// ============================================================================
// Stack collapse
// ============================================================================

pub use collapse::{
    Collapse, MinmaxParameters, PlaneReduction, RejectionImages, RejectionVectors,
    SigclipParameters, StackReducer, StackReduction, collapse_planes, collapse_stack,
};

// ============================================================================
// Overscan
// ============================================================================

pub use overscan::{Axis, BoxSize, OverscanComputation, OverscanParameters};
