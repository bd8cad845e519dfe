//! Overscan level estimation.
//!
//! The overscan region is reduced to a 1-D correction: for every row (or
//! column, see [`Axis`]) a window of neighbouring rows is collapsed to one
//! scalar with any [`Collapse`] algorithm, using the read-out noise as the
//! per-pixel error, and the fit quality is reported as chi-square.

mod window;


use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collapse::{Collapse, PlaneReduction, RejectionVectors, StackReducer};
use crate::error::{Error, Result};
use crate::image::{Image, Region};

use window::{chi_square, window_bounds};

/// Direction along which the correction varies.
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
pub enum Axis {
    /// One value per column; rows are collapsed.
    X,
    /// One value per row; columns are collapsed.
    #[default]
    Y,
}

/// Number of neighbouring rows on each side of a position that enter its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxSize {
    /// One window covering the whole region, broadcast to every position.
    Full,
    /// Half window size; `Half(0)` uses the position's own row only.
    Half(usize),
}

impl BoxSize {
    /// `-1` selects [`BoxSize::Full`], other negatives are illegal.
    pub fn from_half_size(half: i64) -> Result<Self> {
        match half {
            -1 => Ok(Self::Full),
            h if h >= 0 => Ok(Self::Half(h as usize)),
            h => Err(Error::illegal(format!(
                "box half size must be -1 (full) or non-negative, got {h}"
            ))),
        }
    }
}

/// Overscan computation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverscanParameters {
    pub axis: Axis,
    /// Read-out noise, used as the error of every overscan pixel.
    pub ccd_ron: f64,
    pub box_size: BoxSize,
    pub collapse: Collapse,
    /// Overscan area of the input image; `None` uses the whole image.
    pub region: Option<Region>,
}

impl OverscanParameters {
    pub fn new(axis: Axis, ccd_ron: f64, box_size: BoxSize, collapse: Collapse) -> Self {
        Self {
            axis,
            ccd_ron,
            box_size,
            collapse,
            region: None,
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.ccd_ron.is_nan() || self.ccd_ron <= 0.0 || self.ccd_ron.is_infinite() {
            return Err(Error::illegal(format!(
                "ccd_ron must be positive and finite, got {}",
                self.ccd_ron
            )));
        }
        self.collapse.validate()
    }
}

/// 1-D overscan correction with its fit statistics.
///
/// Position `i` is a row of the overscan region for [`Axis::Y`] and a column
/// for [`Axis::X`].
#[derive(Debug, Clone, PartialEq)]
pub struct OverscanComputation {
    pub axis: Axis,
    pub correction: Vec<f64>,
    pub error: Vec<f64>,
    pub contribution: Vec<u32>,
    pub chi2: Vec<f64>,
    pub red_chi2: Vec<f64>,
    /// Final rejection thresholds, for the clipping algorithms only.
    pub thresholds: Option<RejectionVectors>,
}

impl OverscanComputation {
    #[inline]
    pub fn len(&self) -> usize {
        self.correction.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.correction.is_empty()
    }

    /// A position is rejected when no pixel of its window contributed.
    #[inline]
    pub fn is_rejected(&self, i: usize) -> bool {
        self.contribution[i] == 0
    }

    fn with_len(axis: Axis, len: usize, thresholds: Option<RejectionVectors>) -> Self {
        Self {
            axis,
            correction: vec![f64::NAN; len],
            error: vec![f64::NAN; len],
            contribution: vec![0; len],
            chi2: vec![f64::NAN; len],
            red_chi2: vec![f64::NAN; len],
            thresholds,
        }
    }

    fn set_fit(&mut self, i: usize, fit: &PlaneReduction) {
        if fit.is_rejected(0) {
            return;
        }
        self.correction[i] = fit.values[0];
        self.error[i] = fit.errors[0];
        self.contribution[i] = fit.contributions[0];
        if let (Some(dst), Some(src)) = (self.thresholds.as_mut(), fit.extra.as_ref()) {
            dst.merge(src.clone(), i);
        }
    }
}

/// Collapse one window to a scalar, with `ron` as the error of every pixel.
fn fit_window(reducer: &dyn StackReducer, window: &Image, ron: f64) -> Result<PlaneReduction> {
    let noise = Image::new_filled(window.width(), window.height(), ron);
    reducer.reduce_planes(std::slice::from_ref(window), std::slice::from_ref(&noise))
}

fn row_samples(image: &Image, y: usize) -> impl Iterator<Item = f64> + '_ {
    (0..image.width())
        .filter(move |&x| !image.is_rejected(x, y))
        .map(move |x| image.value(x, y))
}

/// Compute the overscan correction of `image`.
///
/// A position whose window has no good pixel, or whose reduction fails, is
/// NaN with contribution 0; this never aborts the other positions.
pub fn compute(image: &Image, params: &OverscanParameters) -> Result<OverscanComputation> {
    params.validate()?;
    if image.is_empty() {
        return Err(Error::null("overscan image is empty"));
    }
    let region = params
        .region
        .unwrap_or_else(|| Region::full(image.width(), image.height()));
    let area = image.extract(&region)?;
    // Work with one value per row; X is handled on the transposed area.
    let area = match params.axis {
        Axis::Y => area,
        Axis::X => area.transpose(),
    };
    let rows = area.height();
    let reducer = params.collapse.reducer()?;

    tracing::info!(
        axis = %params.axis,
        method = %params.collapse,
        box_size = ?params.box_size,
        positions = rows,
        "Computing overscan correction"
    );

    let thresholds = reducer.create_plane_extra(rows);
    let mut out = OverscanComputation::with_len(params.axis, rows, thresholds);
    match params.box_size {
        BoxSize::Full => {
            let fit = fit_window(reducer.as_ref(), &area, params.ccd_ron)?;
            for y in 0..rows {
                out.set_fit(y, &fit);
                (out.chi2[y], out.red_chi2[y]) =
                    chi_square(row_samples(&area, y), out.correction[y], params.ccd_ron);
            }
        }
        BoxSize::Half(half) => {
            let fits = (0..rows)
                .into_par_iter()
                .map(|y| -> Result<_> {
                    let (lo, hi) = window_bounds(y, half, rows);
                    let window = area.extract(&Region::new(0, area.width() - 1, lo, hi))?;
                    let fit = fit_window(reducer.as_ref(), &window, params.ccd_ron)?;
                    let stats = chi_square(window.good_values(), fit.values[0], params.ccd_ron);
                    Ok((fit, stats))
                })
                .collect::<Result<Vec<_>>>()?;
            for (y, (fit, (chi2, red_chi2))) in fits.iter().enumerate() {
                out.set_fit(y, fit);
                out.chi2[y] = *chi2;
                out.red_chi2[y] = *red_chi2;
            }
        }
    }

    tracing::debug!(
        rejected = out.contribution.iter().filter(|&&c| c == 0).count(),
        "Overscan correction finished"
    );
    Ok(out)
}

/// Subtract `overscan` from `data` along its axis.
///
/// Errors add in quadrature. Rows (columns for [`Axis::X`]) whose correction
/// is rejected are rejected in both outputs; the error output carries the
/// data mask.
pub fn correct(
    data: &Image,
    errors: &Image,
    overscan: &OverscanComputation,
) -> Result<(Image, Image)> {
    if data.width() != errors.width() || data.height() != errors.height() {
        return Err(Error::incompatible(format!(
            "data is {}x{}, errors {}x{}",
            data.width(),
            data.height(),
            errors.width(),
            errors.height()
        )));
    }
    let extent = match overscan.axis {
        Axis::Y => data.height(),
        Axis::X => data.width(),
    };
    if overscan.len() != extent {
        return Err(Error::incompatible(format!(
            "correction has {} entries, image extent along {} is {extent}",
            overscan.len(),
            overscan.axis
        )));
    }

    let mut value = data.clone();
    let mut error = errors.clone().with_mask(data.mask().clone());
    for y in 0..data.height() {
        for x in 0..data.width() {
            let i = match overscan.axis {
                Axis::Y => y,
                Axis::X => x,
            };
            if overscan.is_rejected(i) {
                value.reject(x, y);
                error.reject(x, y);
                continue;
            }
            value.set(x, y, data.value(x, y) - overscan.correction[i]);
            let (e, ce) = (errors.value(x, y), overscan.error[i]);
            error.set(x, y, (e * e + ce * ce).sqrt());
        }
    }
    Ok((value, error))
}
