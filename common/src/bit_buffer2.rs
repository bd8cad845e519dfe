//! Bit-packed 2D buffer for bad-pixel masks.
//!
//! Uses 1 bit per element instead of 1 byte.

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

/// A 2D buffer storing boolean values packed as bits in `u64` words (LSB first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer2 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    /// Total number of bits (width * height).
    len: usize,
}

impl BitBuffer2 {
    /// Create a new bit buffer filled with the given value.
    #[inline]
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let len = width * height;
        let mut buffer = Self {
            words: vec![0u64; len.div_ceil(BITS_PER_WORD)],
            width,
            height,
            len,
        };
        if value {
            buffer.fill(true);
        }
        buffer
    }

    /// Create a new bit buffer with all bits cleared.
    #[inline]
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, false)
    }

    /// Create a bit buffer from a slice of booleans of length `width * height`.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        let len = width * height;
        assert_eq!(
            data.len(),
            len,
            "data length {} does not match dimensions {}x{}={}",
            data.len(),
            width,
            height,
            len
        );

        let mut buffer = Self::new_default(width, height);
        for (i, _) in data.iter().enumerate().filter(|(_, v)| **v) {
            buffer.set(i, true);
        }
        buffer
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) {
        debug_assert!(idx < self.len);
        let bit = 1u64 << (idx % BITS_PER_WORD);
        let word = &mut self.words[idx / BITS_PER_WORD];
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.get(y * self.width + x)
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        self.set(y * self.width + x, value);
    }

    /// Fill all bits with the given value. Padding bits past `len` stay cleared.
    pub fn fill(&mut self, value: bool) {
        let fill = if value { !0u64 } else { 0u64 };
        self.words.fill(fill);
        let tail = self.len % BITS_PER_WORD;
        if value && tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of set bits in row `y`.
    pub fn count_ones_in_row(&self, y: usize) -> usize {
        (0..self.width).filter(|&x| self.get_xy(x, y)).count()
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// Copy of the rectangle starting at (`x`, `y`) with the given size.
    pub fn extract(&self, x: usize, y: usize, width: usize, height: usize) -> Self {
        assert!(
            x + width <= self.width && y + height <= self.height,
            "extract rectangle {}x{} at ({}, {}) exceeds {}x{} mask",
            width,
            height,
            x,
            y,
            self.width,
            self.height
        );
        let mut out = Self::new_default(width, height);
        for row in 0..height {
            for col in 0..width {
                if self.get_xy(x + col, y + row) {
                    out.set_xy(col, row, true);
                }
            }
        }
        out
    }

    /// Swap the x and y axes.
    pub fn transposed(&self) -> Self {
        let mut out = Self::new_default(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get_xy(x, y) {
                    out.set_xy(y, x, true);
                }
            }
        }
        out
    }

    /// Write `src` into this mask with its top-left corner at row `row_offset`.
    pub fn paste_rows(&mut self, src: &Self, row_offset: usize) {
        assert_eq!(self.width, src.width, "width mismatch");
        assert!(
            row_offset + src.height <= self.height,
            "pasted rows exceed mask height"
        );
        let base = row_offset * self.width;
        for i in 0..src.len {
            self.set(base + i, src.get(i));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_filled() {
        let buf = BitBuffer2::new_filled(10, 10, true);
        assert_eq!(buf.len(), 100);
        assert_eq!(buf.count_ones(), 100);
        assert!(buf.iter().all(|b| b));

        let buf = BitBuffer2::new_default(10, 10);
        assert_eq!(buf.count_ones(), 0);
    }

    #[test]
    fn test_set_get_across_words() {
        let mut buf = BitBuffer2::new_filled(64, 64, false);
        for idx in [0, 63, 64, 127] {
            buf.set(idx, true);
        }
        assert!(buf.get(0) && buf.get(63) && buf.get(64) && buf.get(127));
        assert!(!buf.get(1) && !buf.get(62) && !buf.get(65));

        buf.set(63, false);
        assert!(!buf.get(63));
        assert_eq!(buf.count_ones(), 3);
    }

    #[test]
    fn test_set_get_xy() {
        let mut buf = BitBuffer2::new_default(100, 100);
        buf.set_xy(50, 50, true);
        assert!(buf.get_xy(50, 50));
        assert!(buf.get(50 * 100 + 50));
        assert!(!buf.get_xy(50, 51));
    }

    #[test]
    fn test_from_slice() {
        let data = vec![true, false, true, false, false, true];
        let buf = BitBuffer2::from_slice(3, 2, &data);
        assert_eq!(buf.iter().collect::<Vec<_>>(), data);
    }

    #[test]
    #[should_panic(expected = "data length")]
    fn test_from_slice_wrong_length() {
        BitBuffer2::from_slice(2, 2, &[true, false, true]);
    }

    #[test]
    fn test_count_ones_in_row() {
        let mut buf = BitBuffer2::new_default(5, 3);
        buf.set_xy(0, 1, true);
        buf.set_xy(4, 1, true);
        buf.set_xy(2, 2, true);
        assert_eq!(buf.count_ones_in_row(0), 0);
        assert_eq!(buf.count_ones_in_row(1), 2);
        assert_eq!(buf.count_ones_in_row(2), 1);
    }

    #[test]
    fn test_extract_and_transpose() {
        let mut buf = BitBuffer2::new_default(4, 3);
        buf.set_xy(1, 1, true);
        buf.set_xy(3, 2, true);

        let sub = buf.extract(1, 1, 3, 2);
        assert_eq!(sub.width(), 3);
        assert!(sub.get_xy(0, 0));
        assert!(sub.get_xy(2, 1));
        assert_eq!(sub.count_ones(), 2);

        let t = buf.transposed();
        assert_eq!(t.width(), 3);
        assert_eq!(t.height(), 4);
        assert!(t.get_xy(1, 1));
        assert!(t.get_xy(2, 3));
        assert_eq!(t.transposed(), buf);
    }

    #[test]
    fn test_paste_rows() {
        let mut dst = BitBuffer2::new_default(3, 3);
        let src = BitBuffer2::from_slice(3, 1, &[true, false, true]);
        dst.paste_rows(&src, 2);
        assert!(dst.get_xy(0, 2) && dst.get_xy(2, 2));
        assert_eq!(dst.count_ones(), 2);
    }
}
