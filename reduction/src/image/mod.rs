//! Masked double-precision images, non-owning masked views and pixel regions.

use common::bit_buffer2::BitBuffer2;
use common::buffer2::Buffer2;

use crate::error::{Error, Result};
use crate::math;

/// Inclusive pixel rectangle.
///
/// A pixel at (x, y) is inside if `x_min <= x <= x_max` and `y_min <= y <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
}

impl Region {
    #[inline]
    pub const fn new(x_min: usize, x_max: usize, y_min: usize, y_max: usize) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Region covering a whole `width x height` image.
    #[inline]
    pub const fn full(width: usize, height: usize) -> Self {
        Self::new(0, width.saturating_sub(1), 0, height.saturating_sub(1))
    }

    /// Number of columns.
    #[inline]
    pub const fn width(&self) -> usize {
        self.x_max.saturating_sub(self.x_min) + 1
    }

    /// Number of rows.
    #[inline]
    pub const fn height(&self) -> usize {
        self.y_max.saturating_sub(self.y_min) + 1
    }

    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Same rectangle with the axes swapped.
    #[inline]
    pub const fn transposed(&self) -> Self {
        Self::new(self.y_min, self.y_max, self.x_min, self.x_max)
    }

    /// Check that the region is well ordered and lies inside a `width x height` image.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        if self.x_min > self.x_max || self.y_min > self.y_max {
            return Err(Error::illegal(format!("region {self:?} has inverted bounds")));
        }
        if self.x_max >= width || self.y_max >= height {
            return Err(Error::incompatible(format!(
                "region {self:?} exceeds {width}x{height} image"
            )));
        }
        Ok(())
    }
}

/// Double-precision image with a bad-pixel mask (`true` = rejected).
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: Buffer2<f64>,
    mask: BitBuffer2,
}

impl Image {
    /// Zero-filled image with no rejected pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, 0.0)
    }

    pub fn new_filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            pixels: Buffer2::new_filled(width, height, value),
            mask: BitBuffer2::new_default(width, height),
        }
    }

    /// Wrap row-major pixels. Panics if `pixels.len() != width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<f64>) -> Self {
        Self {
            pixels: Buffer2::new(width, height, pixels),
            mask: BitBuffer2::new_default(width, height),
        }
    }

    /// Promote single-precision pixels to double precision.
    pub fn from_f32(width: usize, height: usize, pixels: &[f32]) -> Self {
        Self::from_pixels(width, height, pixels.iter().map(|&v| v as f64).collect())
    }

    /// Replace the bad-pixel mask. Panics on a dimension mismatch.
    pub fn with_mask(mut self, mask: BitBuffer2) -> Self {
        assert!(
            mask.width() == self.width() && mask.height() == self.height(),
            "mask {}x{} does not match image {}x{}",
            mask.width(),
            mask.height(),
            self.width(),
            self.height()
        );
        self.mask = mask;
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn pixels(&self) -> &Buffer2<f64> {
        &self.pixels
    }

    #[inline]
    pub fn mask(&self) -> &BitBuffer2 {
        &self.mask
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f64 {
        self.pixels[(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.pixels[(x, y)] = value;
    }

    #[inline]
    pub fn reject(&mut self, x: usize, y: usize) {
        self.mask.set_xy(x, y, true);
    }

    #[inline]
    pub fn accept(&mut self, x: usize, y: usize) {
        self.mask.set_xy(x, y, false);
    }

    #[inline]
    pub fn is_rejected(&self, x: usize, y: usize) -> bool {
        self.mask.get_xy(x, y)
    }

    #[inline]
    pub fn rejected_count(&self) -> usize {
        self.mask.count_ones()
    }

    #[inline]
    pub fn good_count(&self) -> usize {
        self.len() - self.rejected_count()
    }

    /// Values of all pixels not flagged as rejected, row-major.
    pub fn good_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.view().good_values()
    }

    /// Copy of the pixels and mask inside `region`.
    pub fn extract(&self, region: &Region) -> Result<Image> {
        region.validate(self.width(), self.height())?;
        let (x, y, w, h) = (region.x_min, region.y_min, region.width(), region.height());
        Ok(Self {
            pixels: self.pixels.extract(x, y, w, h),
            mask: self.mask.extract(x, y, w, h),
        })
    }

    /// Swap the x and y axes of pixels and mask.
    pub fn transpose(&self) -> Image {
        Self {
            pixels: self.pixels.transposed(),
            mask: self.mask.transposed(),
        }
    }

    /// Overwrite rows starting at `row_offset` with `src`.
    pub fn paste_rows(&mut self, src: &Image, row_offset: usize) {
        self.pixels.paste_rows(&src.pixels, row_offset);
        self.mask.paste_rows(&src.mask, row_offset);
    }

    /// Mean of the good pixels.
    pub fn mean(&self) -> Option<f64> {
        let (sum, n) = self
            .good_values()
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Median of the good pixels.
    pub fn median(&self) -> Option<f64> {
        let mut values: Vec<f64> = self.good_values().collect();
        (!values.is_empty()).then(|| math::median_mut(&mut values))
    }

    /// Sample standard deviation of the good pixels. `None` with fewer than two.
    pub fn stdev(&self) -> Option<f64> {
        let values: Vec<f64> = self.good_values().collect();
        math::stdev(&values)
    }

    /// Sum of squares of the good pixels.
    pub fn sqsum(&self) -> Option<f64> {
        let (sum, n) = self
            .good_values()
            .fold((0.0, 0usize), |(s, n), v| (s + v * v, n + 1));
        (n > 0).then_some(sum)
    }

    /// Borrow pixels and own mask.
    #[inline]
    pub fn view(&self) -> MaskedView<'_> {
        MaskedView {
            pixels: &self.pixels,
            mask: &self.mask,
        }
    }

    /// Borrow pixels together with a foreign mask of the same shape.
    pub fn view_with_mask<'a>(&'a self, mask: &'a BitBuffer2) -> MaskedView<'a> {
        assert!(
            mask.width() == self.width() && mask.height() == self.height(),
            "mask {}x{} does not match image {}x{}",
            mask.width(),
            mask.height(),
            self.width(),
            self.height()
        );
        MaskedView {
            pixels: &self.pixels,
            mask,
        }
    }
}

/// Non-owning pairing of a pixel buffer with a bad-pixel mask.
///
/// The mask need not belong to the same image as the pixels: error planes are
/// read through the mask of their data plane.
#[derive(Debug, Clone, Copy)]
pub struct MaskedView<'a> {
    pixels: &'a Buffer2<f64>,
    mask: &'a BitBuffer2,
}

impl<'a> MaskedView<'a> {
    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f64 {
        self.pixels[(x, y)]
    }

    #[inline]
    pub fn is_rejected(&self, x: usize, y: usize) -> bool {
        self.mask.get_xy(x, y)
    }

    /// Value at row-major index `idx`.
    #[inline]
    pub fn value_at(&self, idx: usize) -> f64 {
        self.pixels.pixels()[idx]
    }

    #[inline]
    pub fn is_rejected_at(&self, idx: usize) -> bool {
        self.mask.get(idx)
    }

    #[inline]
    pub fn good_count(&self) -> usize {
        self.len() - self.mask.count_ones()
    }

    /// Values of the pixels the mask keeps, row-major. Borrows the viewed
    /// buffers, not the view.
    pub fn good_values(self) -> impl Iterator<Item = f64> + 'a {
        self.pixels
            .iter()
            .zip(self.mask.iter())
            .filter_map(|(&v, rejected)| (!rejected).then_some(v))
    }

    /// Owned copy of the viewed pixels and mask.
    pub fn to_image(&self) -> Image {
        Image {
            pixels: self.pixels.clone(),
            mask: self.mask.clone(),
        }
    }
}

/// Views of `errors` that read each error plane through its data plane's mask.
///
/// Fails with `IncompatibleInput` when the stacks differ in length or any plane
/// pair differs in shape.
pub fn sync_error_views<'a>(data: &'a [Image], errors: &'a [Image]) -> Result<Vec<MaskedView<'a>>> {
    if data.len() != errors.len() {
        return Err(Error::incompatible(format!(
            "{} data planes, {} error planes",
            data.len(),
            errors.len()
        )));
    }
    data.iter()
        .zip(errors)
        .enumerate()
        .map(|(i, (d, e))| {
            if d.width() != e.width() || d.height() != e.height() {
                return Err(Error::incompatible(format!(
                    "plane {i}: data {}x{}, error {}x{}",
                    d.width(),
                    d.height(),
                    e.width(),
                    e.height()
                )));
            }
            Ok(e.view_with_mask(d.mask()))
        })
        .collect()
}
