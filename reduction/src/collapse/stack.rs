//! Shared drivers: input validation, per-pixel row-chunked reduction,
//! whole-plane accumulation and per-plane reduction.

use std::fmt::Display;
use std::ops::Range;

use common::buffer2::Buffer2;
use common::parallel::row_chunks;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::image::{Image, MaskedView, sync_error_views};

use super::extra::RejectionImages;
use super::scratch::VectorCache;
use super::{PlaneReduction, StackReducer, StackReduction};

/// Data planes and mask-synchronised error planes of one call.
pub(crate) struct StackViews<'a> {
    pub data: Vec<MaskedView<'a>>,
    pub errors: Vec<MaskedView<'a>>,
    pub width: usize,
    pub height: usize,
}

impl StackViews<'_> {
    #[inline]
    fn planes(&self) -> usize {
        self.data.len()
    }

    /// Good `(value, error)` samples of pixel `idx` across all planes.
    fn gather_pixel(&self, idx: usize, values: &mut Vec<f64>, errors: &mut Vec<f64>) {
        for (d, e) in self.data.iter().zip(&self.errors) {
            if !d.is_rejected_at(idx) {
                values.push(d.value_at(idx));
                errors.push(e.value_at(idx));
            }
        }
    }

    /// Good `(value, error)` samples of a whole plane.
    fn gather_plane(&self, plane: usize) -> (Vec<f64>, Vec<f64>) {
        let d = &self.data[plane];
        let e = &self.errors[plane];
        (0..d.len())
            .filter(|&i| !d.is_rejected_at(i))
            .map(|i| (d.value_at(i), e.value_at(i)))
            .unzip()
    }
}

/// Validate a data/error stack pair and bind the error planes to the data masks.
pub(crate) fn prepare<'a>(
    algorithm: &dyn Display,
    data: &'a [Image],
    errors: &'a [Image],
) -> Result<StackViews<'a>> {
    let Some(first) = data.first() else {
        return Err(Error::null("image stack is empty"));
    };
    let (width, height) = (first.width(), first.height());
    if let Some((i, img)) = data
        .iter()
        .enumerate()
        .find(|(_, img)| img.width() != width || img.height() != height)
    {
        return Err(Error::incompatible(format!(
            "plane {i} is {}x{}, plane 0 is {width}x{height}",
            img.width(),
            img.height()
        )));
    }
    let error_views = sync_error_views(data, errors)?;

    tracing::debug!(
        algorithm = %algorithm,
        planes = data.len(),
        width,
        height,
        "Reducing image stack"
    );

    Ok(StackViews {
        data: data.iter().map(Image::view).collect(),
        errors: error_views,
        width,
        height,
    })
}

/// Reduction of one sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SampleReduction {
    pub value: f64,
    pub error: f64,
    pub contribution: usize,
    pub thresholds: Option<(f64, f64)>,
}

/// Per-pixel output being assembled for a block of rows.
struct PixelOutputs {
    value: Image,
    error: Image,
    contribution: Buffer2<u32>,
    extra: Option<RejectionImages>,
}

impl PixelOutputs {
    fn new(width: usize, height: usize, extra: Option<RejectionImages>) -> Self {
        Self {
            value: Image::new(width, height),
            error: Image::new(width, height),
            contribution: Buffer2::new_default(width, height),
            extra,
        }
    }

    fn set(&mut self, x: usize, y: usize, r: &SampleReduction) {
        if r.contribution == 0 {
            self.set_rejected(x, y);
            return;
        }
        self.value.set(x, y, r.value);
        self.error.set(x, y, r.error);
        self.contribution[(x, y)] = r.contribution as u32;
        if let (Some(extra), Some((low, high))) = (self.extra.as_mut(), r.thresholds) {
            extra.set(x, y, low, high);
        }
    }

    fn set_rejected(&mut self, x: usize, y: usize) {
        self.value.set(x, y, f64::NAN);
        self.value.reject(x, y);
        self.error.set(x, y, f64::NAN);
        self.error.reject(x, y);
        self.contribution[(x, y)] = 0;
    }

    fn merge(&mut self, chunk: PixelOutputs, row_offset: usize) {
        self.value.paste_rows(&chunk.value, row_offset);
        self.error.paste_rows(&chunk.error, row_offset);
        self.contribution.paste_rows(&chunk.contribution, row_offset);
        if let (Some(dst), Some(src)) = (self.extra.as_mut(), chunk.extra) {
            dst.merge(src, row_offset);
        }
    }

    fn into_reduction(self) -> StackReduction {
        StackReduction {
            value: self.value,
            error: self.error,
            contribution: self.contribution,
            extra: self.extra,
        }
    }
}

struct ChunkResult {
    rows: Range<usize>,
    outputs: PixelOutputs,
    failures: usize,
    first_failure: Option<Error>,
}

/// Reduce every pixel's sample set with `reduce`.
///
/// Rows are split into chunks processed in parallel, each with its own scratch
/// cache and an extra output from `reducer`, then stitched in row order. A pixel without good
/// samples, or whose reduction fails or accepts nothing, is NaN, rejected and
/// has contribution 0. Failures never abort the other pixels.
pub(crate) fn reduce_pixels<R, F>(
    views: &StackViews<'_>,
    reducer: &R,
    reduce: F,
) -> StackReduction
where
    R: StackReducer + ?Sized,
    F: Fn(&mut Vec<f64>, &mut Vec<f64>) -> Result<SampleReduction> + Sync,
{
    let width = views.width;
    let chunks: Vec<ChunkResult> = row_chunks(views.height)
        .into_par_iter()
        .map(|rows| {
            let extra = reducer.create_extra(width, rows.len());
            reduce_chunk(views, rows, extra, &reduce)
        })
        .collect();

    let extra = reducer.create_extra(width, views.height);
    let mut out = PixelOutputs::new(width, views.height, extra);
    let mut failures = 0;
    let mut first_failure = None;
    for chunk in chunks {
        failures += chunk.failures;
        if first_failure.is_none() {
            first_failure = chunk.first_failure;
        }
        out.merge(chunk.outputs, chunk.rows.start);
    }

    tracing::debug!(
        rejected = out.value.rejected_count(),
        failures,
        "Per-pixel reduction finished"
    );
    if let Some(err) = first_failure {
        tracing::debug!("First failed pixel: {err}");
    }
    out.into_reduction()
}

fn reduce_chunk<F>(
    views: &StackViews<'_>,
    rows: Range<usize>,
    extra: Option<RejectionImages>,
    reduce: &F,
) -> ChunkResult
where
    F: Fn(&mut Vec<f64>, &mut Vec<f64>) -> Result<SampleReduction> + Sync,
{
    let width = views.width;
    let planes = views.planes();
    let mut outputs = PixelOutputs::new(width, rows.len(), extra);
    let mut cache = VectorCache::new();
    let mut failures = 0;
    let mut first_failure = None;

    for (local_y, y) in rows.clone().enumerate() {
        for x in 0..width {
            let mut values = cache.take(planes);
            let mut errors = cache.take(planes);
            views.gather_pixel(y * width + x, &mut values, &mut errors);

            if values.is_empty() {
                outputs.set_rejected(x, local_y);
            } else {
                match reduce(&mut values, &mut errors) {
                    Ok(r) => outputs.set(x, local_y, &r),
                    Err(err) => {
                        failures += 1;
                        first_failure.get_or_insert(err);
                        outputs.set_rejected(x, local_y);
                    }
                }
            }

            cache.give(values);
            cache.give(errors);
        }
    }

    ChunkResult {
        rows,
        outputs,
        failures,
        first_failure,
    }
}

/// Fold every good sample into per-pixel sums with `add(primary, secondary, value, error)`,
/// one plane at a time, then finish each pixel with `finish(primary, secondary, count)`.
pub(crate) fn accumulate_planes<A, G>(views: &StackViews<'_>, add: A, finish: G) -> StackReduction
where
    A: Fn(&mut f64, &mut f64, f64, f64) + Sync,
    G: Fn(f64, f64, u32) -> (f64, f64) + Sync,
{
    let len = views.width * views.height;
    let mut primary = vec![0.0; len];
    let mut secondary = vec![0.0; len];
    let mut count = vec![0u32; len];

    for (d, e) in views.data.iter().zip(&views.errors) {
        primary
            .par_iter_mut()
            .zip(secondary.par_iter_mut())
            .zip(count.par_iter_mut())
            .enumerate()
            .for_each(|(i, ((p, s), c))| {
                if !d.is_rejected_at(i) {
                    add(p, s, d.value_at(i), e.value_at(i));
                    *c += 1;
                }
            });
    }

    let mut out = PixelOutputs::new(views.width, views.height, None);
    for y in 0..views.height {
        for x in 0..views.width {
            let i = y * views.width + x;
            let n = count[i];
            if n == 0 {
                out.set_rejected(x, y);
                continue;
            }
            let (value, error) = finish(primary[i], secondary[i], n);
            out.set(
                x,
                y,
                &SampleReduction {
                    value,
                    error,
                    contribution: n as usize,
                    thresholds: None,
                },
            );
        }
    }

    tracing::debug!(
        rejected = out.value.rejected_count(),
        "Whole-plane reduction finished"
    );
    out.into_reduction()
}

/// Reduce each plane's good samples to one scalar with `reduce`.
///
/// Planes run in parallel. A plane without good samples or whose reduction
/// fails gets NaN and contribution 0.
pub(crate) fn reduce_each_plane<R, F>(
    views: &StackViews<'_>,
    reducer: &R,
    reduce: F,
) -> PlaneReduction
where
    R: StackReducer + ?Sized,
    F: Fn(&mut Vec<f64>, &mut Vec<f64>) -> Result<SampleReduction> + Sync,
{
    let results: Vec<Option<Result<SampleReduction>>> = (0..views.planes())
        .into_par_iter()
        .map(|plane| {
            let (mut values, mut errors) = views.gather_plane(plane);
            (!values.is_empty()).then(|| reduce(&mut values, &mut errors))
        })
        .collect();

    let n = results.len();
    let mut out = PlaneReduction {
        values: vec![f64::NAN; n],
        errors: vec![f64::NAN; n],
        contributions: vec![0; n],
        extra: reducer.create_plane_extra(n),
    };
    let mut failures = 0;
    for (i, result) in results.into_iter().enumerate() {
        match result {
            Some(Ok(r)) if r.contribution > 0 => {
                out.values[i] = r.value;
                out.errors[i] = r.error;
                out.contributions[i] = r.contribution as u32;
                if let (Some(extra), Some((low, high))) = (out.extra.as_mut(), r.thresholds) {
                    extra.set(i, low, high);
                }
            }
            Some(Err(err)) => {
                failures += 1;
                tracing::debug!("Plane {i} reduction failed: {err}");
            }
            _ => {}
        }
    }

    tracing::debug!(planes = n, failures, "Per-plane reduction finished");
    out
}
