//! Rejection-threshold side outputs of the clipping reducers.
//!
//! Lifecycle: create at the chunk's shape, fill per pixel, `merge` into the
//! full-size destination (consuming the chunk), then either hand the planes
//! to the caller with `into_parts` or simply drop.

use common::bit_buffer2::BitBuffer2;

use crate::image::Image;

/// Per-pixel low/high thresholds. Pixels never written stay NaN and rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionImages {
    low: Image,
    high: Image,
}

impl RejectionImages {
    pub fn new(width: usize, height: usize) -> Self {
        let low = Image::new_filled(width, height, f64::NAN)
            .with_mask(BitBuffer2::new_filled(width, height, true));
        Self {
            high: low.clone(),
            low,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.low.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.low.height()
    }

    pub fn set(&mut self, x: usize, y: usize, low: f64, high: f64) {
        self.low.set(x, y, low);
        self.low.accept(x, y);
        self.high.set(x, y, high);
        self.high.accept(x, y);
    }

    #[inline]
    pub fn low(&self) -> &Image {
        &self.low
    }

    #[inline]
    pub fn high(&self) -> &Image {
        &self.high
    }

    /// Move the rows of `src` into this output starting at `row_offset`.
    pub fn merge(&mut self, src: RejectionImages, row_offset: usize) {
        self.low.paste_rows(&src.low, row_offset);
        self.high.paste_rows(&src.high, row_offset);
    }

    /// Detach the `(low, high)` threshold images.
    pub fn into_parts(self) -> (Image, Image) {
        (self.low, self.high)
    }
}

/// Per-plane (or per-position) low/high thresholds. Unset entries are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionVectors {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl RejectionVectors {
    pub fn new(len: usize) -> Self {
        Self {
            low: vec![f64::NAN; len],
            high: vec![f64::NAN; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.low.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    #[inline]
    pub fn set(&mut self, i: usize, low: f64, high: f64) {
        self.low[i] = low;
        self.high[i] = high;
    }

    /// Move the entries of `src` into this output starting at `offset`.
    pub fn merge(&mut self, src: RejectionVectors, offset: usize) {
        let end = offset + src.len();
        self.low[offset..end].copy_from_slice(&src.low);
        self.high[offset..end].copy_from_slice(&src.high);
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.low, self.high)
    }
}
